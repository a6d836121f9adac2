//! Encode/decode helpers for both wire modes.
//!
//! Thin wrappers around `rmp-serde` (binary stream mode) and `serde_json`
//! (human-readable tree mode). The scene core always builds one [`Value`]
//! tree and hands it here; the mode only decides the byte layout.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{DecodeError, EncodeError};
use crate::value::Value;

/// Wire mode for an encoded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Compact MessagePack binary stream.
    Binary,
    /// Pretty-printed JSON text tree.
    Text,
}

/// Encode any serialisable value to bytes in the given mode.
///
/// # Errors
///
/// Returns [`EncodeError`] if serialisation fails.
pub fn to_bytes<T: Serialize>(value: &T, format: Format) -> Result<Vec<u8>, EncodeError> {
    match format {
        Format::Binary => Ok(rmp_serde::to_vec_named(value)?),
        Format::Text => Ok(serde_json::to_vec_pretty(value)?),
    }
}

/// Decode a document tree from bytes in the given mode.
///
/// # Errors
///
/// Returns [`DecodeError`] if the bytes are not a valid document in the
/// selected mode.
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8], format: Format) -> Result<T, DecodeError> {
    match format {
        Format::Binary => Ok(rmp_serde::from_slice(bytes)?),
        Format::Text => Ok(serde_json::from_slice(bytes)?),
    }
}

/// Encode a typed value into a document tree.
///
/// # Errors
///
/// Returns [`EncodeError::Tree`] if the value cannot be represented.
pub fn encode_value<T: Serialize>(value: &T) -> Result<Value, EncodeError> {
    Ok(serde_json::to_value(value)?)
}

/// Decode a typed value out of a document tree.
///
/// # Errors
///
/// Returns [`DecodeError::Text`] if the tree does not match the target type.
pub fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T, DecodeError> {
    Ok(serde_json::from_value(value)?)
}
