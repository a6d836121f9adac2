//! # ember_codec
//!
//! Document tree and codec layer for the ember scene core.
//!
//! Scenes, entities, and components are encoded into a single logical
//! document tree ([`Value`]) which can then be written in one of two wire
//! modes: a compact binary stream (MessagePack) or a human-readable text
//! tree (JSON). Both modes carry the identical logical structure, so
//! anything the scene core encodes round-trips through either.
//!
//! This crate provides:
//!
//! - [`Value`] — the in-memory document tree.
//! - [`Format`] — wire mode selection.
//! - [`codec`] — encode/decode helpers for both modes.
//! - [`EncodeError`] / [`DecodeError`] — the serialisation error taxonomy.

pub mod codec;
pub mod error;
pub mod value;

pub use codec::{Format, decode_value, encode_value, from_bytes, to_bytes};
pub use error::{DecodeError, EncodeError};
pub use value::{Value, member, member_array, member_str};
