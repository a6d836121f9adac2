//! The spatial component: local position, rotation, and scale.

use ember_scene::Component;
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position, rotation, and scale in 3D space.
///
/// The primary spatial component; nearly every visible entity carries one.
/// In a parent/child tree the values are local to the parent. Composing
/// them into world space is the renderer's job, not the scene core's.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform3D {
    /// Translation relative to the parent.
    #[serde(default)]
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    #[serde(default)]
    pub rotation: Quat,
    /// Per-axis scale factor.
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl Transform3D {
    /// The identity transform: origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// A transform at the given position with no rotation and unit scale.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// A transform from explicit parts.
    #[must_use]
    pub fn from_parts(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// The 4×4 model matrix composing scale, rotation, and translation.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// The local forward direction (negative Z, rotated).
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Move the transform by an offset.
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Rotate the transform to face `target`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        if forward != Vec3::ZERO {
            self.rotation = Quat::from_mat4(&Mat4::look_to_rh(Vec3::ZERO, forward, up)).inverse();
        }
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Component for Transform3D {
    fn type_name() -> &'static str {
        "Transform3D"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let transform = Transform3D::default();
        assert_eq!(transform, Transform3D::IDENTITY);
        assert_eq!(transform.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_matrix_applies_translation() {
        let transform = Transform3D::from_position(Vec3::new(1.0, 2.0, 3.0));
        let moved = transform.matrix().transform_point3(Vec3::ZERO);
        assert!((moved - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn test_look_at_faces_target() {
        let mut transform = Transform3D::from_position(Vec3::ZERO);
        transform.look_at(Vec3::new(0.0, 0.0, -5.0), Vec3::Y);
        assert!((transform.forward() - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_partial_document_decodes_with_defaults() {
        let doc = serde_json::json!({ "position": [1.0, 0.0, 0.0] });
        let transform: Transform3D = serde_json::from_value(doc).unwrap();
        assert_eq!(transform.position, Vec3::X);
        assert_eq!(transform.rotation, Quat::IDENTITY);
        assert_eq!(transform.scale, Vec3::ONE);
    }

    #[test]
    fn test_binary_roundtrip() {
        let transform = Transform3D::from_parts(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(0.5),
            Vec3::splat(2.0),
        );
        let bytes = rmp_serde::to_vec_named(&transform).unwrap();
        let restored: Transform3D = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(transform, restored);
    }

    #[test]
    fn test_registers_as_component() {
        let mut registry = ember_scene::ComponentRegistry::new();
        let id = registry.register::<Transform3D>().unwrap();
        assert_eq!(registry.type_name_of(id).unwrap(), "Transform3D");
    }
}
