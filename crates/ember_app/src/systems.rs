//! Demo systems.

use ember_math::{Transform3D, Vec3};
use ember_scene::{ComponentTypeId, EntityId, Scene, System};
use tracing::{debug, info};

use crate::components::Velocity;

/// Integrates [`Velocity`] into [`Transform3D`] each tick.
///
/// Iteration and mutation are split into two phases: the moves are
/// collected while the pools are borrowed, then applied afterwards.
#[derive(Default)]
pub struct MovementSystem {
    moving: usize,
}

impl System for MovementSystem {
    fn tick(&mut self, scene: &mut Scene, dt: f64) {
        let moves: Vec<(EntityId, Vec3)> = match scene.iter_components::<Velocity>() {
            Ok(iter) => iter
                .map(|(entity, velocity)| (entity.id(), velocity.linear * dt as f32))
                .collect(),
            Err(_) => return,
        };

        if moves.len() != self.moving {
            debug!(moving = moves.len(), "movement set changed");
            self.moving = moves.len();
        }
        for (entity, offset) in moves {
            if let Ok(transform) = scene.component_mut::<Transform3D>(entity) {
                transform.translate(offset);
            }
        }
    }

    fn component_added(&mut self, scene: &mut Scene, entity: EntityId, type_id: ComponentTypeId) {
        if let Ok(name) = scene.registries().components().type_name_of(type_id) {
            debug!(entity = entity.0, component = name, "component entered simulation");
        }
    }

    fn entity_destroyed(&mut self, _scene: &mut Scene, entity: EntityId) {
        debug!(entity = entity.0, "entity left simulation");
    }
}

/// Logs a population summary at a fixed tick interval.
#[derive(Default)]
pub struct CensusSystem {
    ticks: u64,
}

impl CensusSystem {
    const REPORT_INTERVAL: u64 = 60;
}

impl System for CensusSystem {
    fn tick(&mut self, scene: &mut Scene, _dt: f64) {
        self.ticks += 1;
        if self.ticks % Self::REPORT_INTERVAL == 0 {
            info!(
                tick = self.ticks,
                entities = scene.entity_count(),
                "census"
            );
        }
    }
}
