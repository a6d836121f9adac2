//! Dense, per-type component storage.

use std::any::Any;

use ember_codec::{DecodeError, EncodeError, Value};

use crate::component::{Component, ComponentId, ComponentTypeId};
use crate::entity::EntityId;
use crate::error::InvalidOperation;
use crate::handle::{ComponentHandle, ValidityCell};
use crate::id_pool::IdPool;

/// One stored component and the validity cell shared with its handles.
#[derive(Debug)]
struct Slot<T> {
    value: T,
    validity: ValidityCell,
}

/// Dense storage of all live `T` instances for one scene.
///
/// Instances are keyed by a pool-local [`ComponentId`] (recycled
/// lowest-first) with bidirectional entity ↔ component index maps. At most
/// one component of a given type per entity. Lifecycle mutation goes
/// through the owning [`Scene`](crate::Scene), which fires the system
/// hooks; the pool owns only the storage.
#[derive(Debug)]
pub struct ComponentPool<T: Component> {
    type_id: ComponentTypeId,
    slots: Vec<Option<Slot<T>>>,
    ids: IdPool,
    /// Indexed by entity id.
    entity_to_component: Vec<Option<ComponentId>>,
    /// Indexed by component id.
    component_to_entity: Vec<Option<EntityId>>,
}

impl<T: Component> ComponentPool<T> {
    pub(crate) fn new(type_id: ComponentTypeId) -> Self {
        Self {
            type_id,
            slots: Vec::new(),
            ids: IdPool::new(),
            entity_to_component: Vec::new(),
            component_to_entity: Vec::new(),
        }
    }

    /// The registered type id of `T`.
    #[must_use]
    pub fn type_id(&self) -> ComponentTypeId {
        self.type_id
    }

    /// Number of live components in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether the pool holds no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    /// Whether the entity has a component in this pool.
    #[must_use]
    pub fn has(&self, entity: EntityId) -> bool {
        self.component_id_of(entity).is_some()
    }

    /// The component id attached to `entity`, if any.
    #[must_use]
    pub fn component_id_of(&self, entity: EntityId) -> Option<ComponentId> {
        self.entity_to_component
            .get(entity.0 as usize)
            .copied()
            .flatten()
    }

    /// Insert a component for `entity`.
    ///
    /// # Errors
    ///
    /// Fails if the entity already has a component of this type; the
    /// existing component is unaffected.
    pub(crate) fn add(&mut self, entity: EntityId, value: T) -> Result<ComponentId, InvalidOperation> {
        if self.has(entity) {
            return Err(InvalidOperation::new(format!(
                "entity already has a component of type '{}'",
                T::type_name()
            )));
        }

        let id = ComponentId(self.ids.create());
        let index = id.0 as usize;
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index] = Some(Slot {
            value,
            validity: ValidityCell::new(),
        });

        expand(&mut self.entity_to_component, entity.0 as usize);
        self.entity_to_component[entity.0 as usize] = Some(id);
        expand(&mut self.component_to_entity, index);
        self.component_to_entity[index] = Some(entity);

        Ok(id)
    }

    /// Remove and return the entity's component, invalidating its handles
    /// and recycling its id.
    ///
    /// # Errors
    ///
    /// Fails if the entity has no component of this type.
    pub(crate) fn remove(&mut self, entity: EntityId) -> Result<T, InvalidOperation> {
        let id = self.component_id_of(entity).ok_or_else(|| {
            InvalidOperation::new(format!(
                "entity does not have a component of type '{}'",
                T::type_name()
            ))
        })?;

        let slot = self.slots[id.0 as usize]
            .take()
            .expect("index maps out of sync with slots");
        slot.validity.invalidate();
        self.ids.destroy(id.0);
        self.entity_to_component[entity.0 as usize] = None;
        self.component_to_entity[id.0 as usize] = None;
        Ok(slot.value)
    }

    /// Swap the entity's component value in place, keeping its id and
    /// outstanding handles.
    ///
    /// # Errors
    ///
    /// Fails if the entity has no component of this type.
    pub(crate) fn replace(&mut self, entity: EntityId, value: T) -> Result<ComponentId, InvalidOperation> {
        let id = self.component_id_of(entity).ok_or_else(|| {
            InvalidOperation::new(format!(
                "entity does not have a component of type '{}'",
                T::type_name()
            ))
        })?;
        self.slots[id.0 as usize]
            .as_mut()
            .expect("index maps out of sync with slots")
            .value = value;
        Ok(id)
    }

    /// Look up a component by its pool-local id.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] on a stale or out-of-range id.
    pub fn with_id(&self, id: ComponentId) -> Result<&T, InvalidOperation> {
        self.slots
            .get(id.0 as usize)
            .and_then(|slot| slot.as_ref())
            .map(|slot| &slot.value)
            .ok_or_else(|| InvalidOperation::new("component does not exist"))
    }

    /// Look up the component attached to `entity`.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if the entity has no component of
    /// this type.
    pub fn with_entity(&self, entity: EntityId) -> Result<&T, InvalidOperation> {
        let id = self.component_id_of(entity).ok_or_else(|| {
            InvalidOperation::new(format!(
                "entity does not have a component of type '{}'",
                T::type_name()
            ))
        })?;
        self.with_id(id)
    }

    pub(crate) fn with_entity_mut(&mut self, entity: EntityId) -> Result<&mut T, InvalidOperation> {
        let id = self.component_id_of(entity).ok_or_else(|| {
            InvalidOperation::new(format!(
                "entity does not have a component of type '{}'",
                T::type_name()
            ))
        })?;
        self.slots
            .get_mut(id.0 as usize)
            .and_then(|slot| slot.as_mut())
            .map(|slot| &mut slot.value)
            .ok_or_else(|| InvalidOperation::new("component does not exist"))
    }

    /// The entity a component belongs to, resolved through the pool.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if the id names no live component.
    pub fn entity_of(&self, id: ComponentId) -> Result<EntityId, InvalidOperation> {
        self.component_to_entity
            .get(id.0 as usize)
            .copied()
            .flatten()
            .ok_or_else(|| InvalidOperation::new("component does not have an associated entity"))
    }

    /// A weak reference to the entity's component.
    ///
    /// # Errors
    ///
    /// Fails if the entity has no component of this type.
    pub fn handle_of(&self, entity: EntityId) -> Result<ComponentHandle<T>, InvalidOperation> {
        let id = self.component_id_of(entity).ok_or_else(|| {
            InvalidOperation::new(format!(
                "entity does not have a component of type '{}'",
                T::type_name()
            ))
        })?;
        let slot = self.slots[id.0 as usize]
            .as_ref()
            .expect("index maps out of sync with slots");
        Ok(ComponentHandle::new(id, slot.validity.clone()))
    }

    /// Resolve a handle to its component.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] once the component has been removed,
    /// even if its id has been recycled.
    pub fn resolve(&self, handle: &ComponentHandle<T>) -> Result<&T, InvalidOperation> {
        if !handle.is_valid() {
            return Err(InvalidOperation::new("component handle is no longer valid"));
        }
        self.with_id(handle.id())
    }

    /// Iterate live components in ascending component-id order as
    /// `(owning entity, component)` pairs.
    ///
    /// Activation filtering happens at the scene layer, which owns the
    /// entity pool.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.slots.iter().enumerate().filter_map(move |(index, slot)| {
            let slot = slot.as_ref()?;
            let entity = self.component_to_entity[index]?;
            Some((entity, &slot.value))
        })
    }
}

/// Type-erased pool surface used by the scene for registration-order
/// iteration over all pools, by decode for name-dispatched construction,
/// and by tooling that enumerates registered types.
pub trait AnyComponentPool {
    fn type_id(&self) -> ComponentTypeId;
    fn type_name(&self) -> &'static str;
    fn has(&self, entity: EntityId) -> bool;
    fn remove(&mut self, entity: EntityId) -> Result<(), InvalidOperation>;

    /// Copy the source entity's component (if present) to the destination.
    fn clone_into(&mut self, source: EntityId, dest: EntityId) -> Result<(), InvalidOperation>;

    /// Encode the entity's component as `{"type": <name>, ...fields}`.
    ///
    /// Returns `Ok(None)` when the entity has no component in this pool.
    fn encode_component(&self, entity: EntityId) -> Result<Option<Value>, EncodeError>;

    /// Decode component fields onto the entity.
    ///
    /// If the entity already has a component of this type the named fields
    /// are merged over it (archetype-override semantics); otherwise the
    /// fields are merged over the type's default value and inserted.
    fn decode_component(&mut self, entity: EntityId, value: &Value) -> Result<(), DecodeError>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyComponentPool for ComponentPool<T> {
    fn type_id(&self) -> ComponentTypeId {
        self.type_id
    }

    fn type_name(&self) -> &'static str {
        T::type_name()
    }

    fn has(&self, entity: EntityId) -> bool {
        ComponentPool::has(self, entity)
    }

    fn remove(&mut self, entity: EntityId) -> Result<(), InvalidOperation> {
        ComponentPool::remove(self, entity).map(|_| ())
    }

    fn clone_into(&mut self, source: EntityId, dest: EntityId) -> Result<(), InvalidOperation> {
        if let Some(id) = self.component_id_of(source) {
            let value = self.with_id(id)?.clone();
            self.add(dest, value)?;
        }
        Ok(())
    }

    fn encode_component(&self, entity: EntityId) -> Result<Option<Value>, EncodeError> {
        let Some(id) = self.component_id_of(entity) else {
            return Ok(None);
        };
        let value = self
            .with_id(id)
            .expect("index maps out of sync with slots");
        let mut tree = serde_json::to_value(value)?;
        let Some(object) = tree.as_object_mut() else {
            return Err(EncodeError::NotAnObject {
                type_name: T::type_name().to_string(),
            });
        };
        object.insert("type".to_string(), Value::String(T::type_name().to_string()));
        Ok(Some(tree))
    }

    fn decode_component(&mut self, entity: EntityId, value: &Value) -> Result<(), DecodeError> {
        let fields = value
            .as_object()
            .ok_or_else(|| DecodeError::shape("components", "an array of objects"))?;

        // Start from the existing component (override) or the default value
        // (fresh insert), then lay the named fields over it.
        let base = match self.component_id_of(entity) {
            Some(id) => {
                let existing = self.with_id(id).expect("index maps out of sync with slots");
                serde_json::to_value(existing)
            }
            None => serde_json::to_value(T::default()),
        }
        .map_err(|err| DecodeError::Invalid(err.to_string()))?;

        let mut merged = base;
        let target = merged.as_object_mut().ok_or_else(|| DecodeError::shape(
            "components",
            "an object-encoded component type",
        ))?;
        for (name, field) in fields {
            if name != "type" {
                target.insert(name.clone(), field.clone());
            }
        }

        let decoded: T = serde_json::from_value(merged)?;
        match self.component_id_of(entity) {
            Some(_) => {
                self.replace(entity, decoded)?;
            }
            None => {
                self.add(entity, decoded)?;
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Grow an index map so `index` is addressable.
fn expand<V>(map: &mut Vec<Option<V>>, index: usize) {
    if index >= map.len() {
        map.resize_with(index + 1, || None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Position {
        x: f32,
        y: f32,
    }

    impl Component for Position {
        fn type_name() -> &'static str {
            "Position"
        }
    }

    fn pool() -> ComponentPool<Position> {
        ComponentPool::new(ComponentTypeId(0))
    }

    #[test]
    fn test_add_and_lookup() {
        let mut pool = pool();
        let entity = EntityId(0);
        let id = pool.add(entity, Position { x: 1.0, y: 2.0 }).unwrap();

        assert!(pool.has(entity));
        assert_eq!(pool.with_entity(entity).unwrap().x, 1.0);
        assert_eq!(pool.with_id(id).unwrap().y, 2.0);
        assert_eq!(pool.entity_of(id).unwrap(), entity);
    }

    #[test]
    fn test_duplicate_add_fails_and_keeps_first() {
        let mut pool = pool();
        let entity = EntityId(0);
        pool.add(entity, Position { x: 1.0, y: 1.0 }).unwrap();

        let err = pool.add(entity, Position { x: 9.0, y: 9.0 }).unwrap_err();
        assert!(err.message().contains("Position"));
        assert_eq!(pool.with_entity(entity).unwrap().x, 1.0);
    }

    #[test]
    fn test_remove_recycles_component_id() {
        let mut pool = pool();
        let a = pool.add(EntityId(0), Position::default()).unwrap();
        pool.add(EntityId(1), Position::default()).unwrap();

        pool.remove(EntityId(0)).unwrap();
        assert!(!pool.has(EntityId(0)));
        assert!(pool.with_id(a).is_err());

        // The freed id is handed to the next insertion.
        let reused = pool.add(EntityId(2), Position::default()).unwrap();
        assert_eq!(reused, a);
    }

    #[test]
    fn test_remove_absent_fails() {
        let mut pool = pool();
        let err = pool.remove(EntityId(0)).unwrap_err();
        assert!(err.message().contains("does not have a component"));
    }

    #[test]
    fn test_replace_keeps_id_and_handles() {
        let mut pool = pool();
        let entity = EntityId(0);
        let id = pool.add(entity, Position { x: 1.0, y: 1.0 }).unwrap();
        let handle = pool.handle_of(entity).unwrap();

        let replaced = pool.replace(entity, Position { x: 5.0, y: 5.0 }).unwrap();
        assert_eq!(replaced, id);
        assert!(handle.is_valid());
        assert_eq!(pool.resolve(&handle).unwrap().x, 5.0);
    }

    #[test]
    fn test_handle_invalidated_on_remove() {
        let mut pool = pool();
        let entity = EntityId(0);
        pool.add(entity, Position::default()).unwrap();
        let handle = pool.handle_of(entity).unwrap();

        pool.remove(entity).unwrap();
        assert!(!handle.is_valid());
        assert!(pool.resolve(&handle).is_err());

        // The recycled id must not resolve through the stale handle.
        pool.add(EntityId(1), Position { x: 3.0, y: 3.0 }).unwrap();
        assert!(pool.resolve(&handle).is_err());
    }

    #[test]
    fn test_clone_into_copies_value() {
        let mut pool = pool();
        pool.add(EntityId(0), Position { x: 4.0, y: 2.0 }).unwrap();

        AnyComponentPool::clone_into(&mut pool, EntityId(0), EntityId(1)).unwrap();
        assert_eq!(
            pool.with_entity(EntityId(1)).unwrap(),
            pool.with_entity(EntityId(0)).unwrap()
        );

        // Cloning from an entity without the component is a no-op.
        AnyComponentPool::clone_into(&mut pool, EntityId(5), EntityId(6)).unwrap();
        assert!(!pool.has(EntityId(6)));
    }

    #[test]
    fn test_encode_wraps_type_name() {
        let mut pool = pool();
        pool.add(EntityId(0), Position { x: 1.5, y: 2.5 }).unwrap();

        let tree = AnyComponentPool::encode_component(&pool, EntityId(0))
            .unwrap()
            .unwrap();
        assert_eq!(tree["type"], "Position");
        assert_eq!(tree["x"], 1.5);

        assert!(
            AnyComponentPool::encode_component(&pool, EntityId(9))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_decode_fresh_fills_unnamed_fields_from_default() {
        let mut pool = pool();
        let doc: Value = serde_json::json!({"type": "Position", "x": 7.0});
        AnyComponentPool::decode_component(&mut pool, EntityId(0), &doc).unwrap();

        let position = pool.with_entity(EntityId(0)).unwrap();
        assert_eq!(position.x, 7.0);
        assert_eq!(position.y, 0.0);
    }

    #[test]
    fn test_decode_over_existing_merges_fields() {
        let mut pool = pool();
        pool.add(EntityId(0), Position { x: 1.0, y: 2.0 }).unwrap();

        let doc: Value = serde_json::json!({"type": "Position", "y": 9.0});
        AnyComponentPool::decode_component(&mut pool, EntityId(0), &doc).unwrap();

        let position = pool.with_entity(EntityId(0)).unwrap();
        assert_eq!(position.x, 1.0);
        assert_eq!(position.y, 9.0);
    }

    #[test]
    fn test_iteration_in_component_id_order() {
        let mut pool = pool();
        pool.add(EntityId(3), Position { x: 0.0, y: 0.0 }).unwrap();
        pool.add(EntityId(1), Position { x: 1.0, y: 0.0 }).unwrap();
        pool.add(EntityId(2), Position { x: 2.0, y: 0.0 }).unwrap();
        pool.remove(EntityId(1)).unwrap();

        let entities: Vec<EntityId> = pool.iter().map(|(entity, _)| entity).collect();
        assert_eq!(entities, vec![EntityId(3), EntityId(2)]);
    }
}
