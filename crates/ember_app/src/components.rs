//! Demo component definitions.
//!
//! These show how embedding code defines components that satisfy the
//! [`Component`] trait requirements: `Clone`, `Default`, `Serialize`,
//! `Deserialize`, and a stable type name.

use ember_math::Vec3;
use ember_scene::Component;
use serde::{Deserialize, Serialize};

/// Linear velocity in world units per second.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Velocity {
    /// Velocity vector.
    #[serde(default)]
    pub linear: Vec3,
}

impl Velocity {
    /// Create a new velocity.
    #[must_use]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            linear: Vec3::new(x, y, z),
        }
    }
}

impl Component for Velocity {
    fn type_name() -> &'static str {
        "Velocity"
    }
}

/// Hit points with a maximum.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Health {
    /// Current hit points.
    pub current: f32,
    /// Maximum hit points.
    pub max: f32,
}

impl Health {
    /// A health component at full hit points.
    #[must_use]
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Whether the entity still has hit points left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }
}

impl Component for Health {
    fn type_name() -> &'static str {
        "Health"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_full() {
        let health = Health::full(100.0);
        assert!(health.is_alive());
        assert_eq!(health.current, health.max);
    }

    #[test]
    fn test_velocity_partial_document() {
        let velocity: Velocity = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(velocity, Velocity::default());
    }
}
