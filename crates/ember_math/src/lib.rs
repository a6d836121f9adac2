//! # ember_math
//!
//! Math types for the ember engine. Re-exports [`glam`] for linear algebra
//! and defines the built-in spatial component ([`Transform3D`]).

pub mod transform;

// Re-export glam types for convenience.
pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

pub use transform::Transform3D;
