//! The system trait: per-scene logic observing entity and component
//! lifecycle.
//!
//! Systems are created through the [`SystemRegistry`](crate::SystemRegistry)
//! and owned by a [`Scene`](crate::Scene), which calls every hook
//! synchronously, inside the operation that triggered it, in
//! system-registration order. Component hooks for one entity fire in
//! component-type registration order.

use std::any::Any;

use ember_codec::{DecodeError, EncodeError, Value};

use crate::component::ComponentTypeId;
use crate::entity::EntityId;
use crate::scene::Scene;

/// A dense, process-wide identifier for a system *type*, assigned by the
/// [`SystemRegistry`](crate::SystemRegistry) in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemTypeId(pub u32);

/// Higher-level game logic attached to a scene.
///
/// All hooks default to no-ops so a system implements only what it
/// observes. Hooks receive the owning scene mutably; while a system's own
/// hook is running, re-entrant dispatch skips that system.
///
/// Systems wanting to overlap expensive work with the tick must run it on
/// an external task facility, must not touch the scene from the worker,
/// and must block on completion before the next mutation of the component
/// types they touched.
pub trait System: Any {
    /// Called once, when the system is added to a scene.
    fn initialize(&mut self, _scene: &mut Scene) {}

    /// Called once per simulation tick, in system-registration order.
    fn tick(&mut self, _scene: &mut Scene, _dt: f64) {}

    /// An activated entity gained a component (or an entity with the
    /// component was activated).
    fn component_added(&mut self, _scene: &mut Scene, _entity: EntityId, _type_id: ComponentTypeId) {
    }

    /// An activated entity is about to lose a component; the component is
    /// still present when this fires.
    fn component_removed(
        &mut self,
        _scene: &mut Scene,
        _entity: EntityId,
        _type_id: ComponentTypeId,
    ) {
    }

    /// An entity became activated. Fires after the entity's own
    /// `component_added` hooks and before any of its children activate.
    fn entity_activated(&mut self, _scene: &mut Scene, _entity: EntityId) {}

    /// An entity is about to be destroyed; its components are still
    /// present when this fires, its children are already gone.
    fn entity_destroyed(&mut self, _scene: &mut Scene, _entity: EntityId) {}

    /// Encode system state into the scene document.
    ///
    /// Must return an object; the scene adds the `"system_type"`
    /// discriminator member.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] if the state cannot be represented.
    fn encode(&self) -> Result<Value, EncodeError> {
        Ok(Value::Object(serde_json::Map::new()))
    }

    /// Decode system state from the scene document.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] on malformed state.
    fn decode(&mut self, _value: &Value) -> Result<(), DecodeError> {
        Ok(())
    }
}
