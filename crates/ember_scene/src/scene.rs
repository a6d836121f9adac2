//! The scene: aggregate root over the entity pool, the per-type component
//! pools, and the systems.
//!
//! All lifecycle mutation flows through here so that the pools, the
//! parent/child tree, the activation protocol, and the system hooks stay
//! consistent from an external observer's point of view. The scene is
//! single-threaded: every operation must originate from one logical
//! simulation thread per scene instance.

use std::sync::Arc;

use tracing::{debug, trace};

use ember_codec::{self as codec, DecodeError, EncodeError, Format, Value, member, member_array, member_str};

use crate::assets::AssetSource;
use crate::component::{Component, ComponentId, ComponentTypeId};
use crate::component_pool::{AnyComponentPool, ComponentPool};
use crate::entity::{Entity, EntityId};
use crate::entity_pool::EntityPool;
use crate::error::InvalidOperation;
use crate::handle::{ComponentHandle, EntityHandle};
use crate::registry::Registries;
use crate::system::{System, SystemTypeId};

/// A dense identifier for a scene *type*, assigned by the
/// [`SceneRegistry`](crate::SceneRegistry) in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneTypeId(pub u32);

/// A dynamic collection of entities, components, and systems.
///
/// Owns one [`EntityPool`] and one [`ComponentPool`](crate::ComponentPool)
/// per component type registered at construction time. Entities are created
/// unactivated, become visible to iteration and to systems when activated,
/// and cascade destruction to their children.
pub struct Scene {
    registries: Arc<Registries>,
    scene_type: Option<SceneTypeId>,
    entities: EntityPool,
    /// Indexed by component type id; `None` only for types registered after
    /// this scene was constructed.
    pools: Vec<Option<Box<dyn AnyComponentPool>>>,
    /// Pool type ids in registration order.
    pool_type_ids: Vec<ComponentTypeId>,
    /// Indexed by system type id.
    systems: Vec<Option<Box<dyn System>>>,
    /// System type ids in the order they were added.
    system_type_ids: Vec<SystemTypeId>,
    /// Number of activated entities.
    entity_count: usize,
    active: bool,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("scene_type", &self.scene_type)
            .field("pool_type_ids", &self.pool_type_ids)
            .field("system_type_ids", &self.system_type_ids)
            .field("entity_count", &self.entity_count)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Construct an empty scene with one component pool per type registered
    /// in `registries`.
    #[must_use]
    pub fn new(registries: Arc<Registries>) -> Self {
        let pool_type_ids: Vec<ComponentTypeId> = registries.components().type_ids().collect();
        let pools = registries
            .components()
            .create_pools()
            .into_iter()
            .map(Some)
            .collect();

        Self {
            registries,
            scene_type: None,
            entities: EntityPool::new(),
            pools,
            pool_type_ids,
            systems: Vec::new(),
            system_type_ids: Vec::new(),
            entity_count: 0,
            active: true,
        }
    }

    /// The registries this scene dispatches through.
    #[must_use]
    pub fn registries(&self) -> &Arc<Registries> {
        &self.registries
    }

    /// The scene's registered type, if it was created through the scene
    /// registry.
    #[must_use]
    pub fn scene_type(&self) -> Option<SceneTypeId> {
        self.scene_type
    }

    pub(crate) fn set_scene_type(&mut self, type_id: SceneTypeId) {
        self.scene_type = Some(type_id);
    }

    /// Whether the scene is active (ticking).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Set whether the scene is active.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Number of activated entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// The entity pool, for lookups and iteration.
    #[must_use]
    pub fn entities(&self) -> &EntityPool {
        &self.entities
    }

    // -- Entity lifecycle --

    /// Create a new unactivated entity.
    pub fn create_entity(&mut self) -> EntityId {
        let id = self.entities.create(None);
        trace!(entity = id.0, "created entity");
        id
    }

    /// Create a new unactivated entity with a display name.
    pub fn create_entity_named(&mut self, name: &str) -> EntityId {
        let id = self.entities.create(Some(name.to_string()));
        trace!(entity = id.0, name, "created entity");
        id
    }

    /// Resolve an entity id.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if `id` does not name a live entity.
    pub fn entity(&self, id: EntityId) -> Result<&Entity, InvalidOperation> {
        self.entities.entity_with_id(id)
    }

    /// Resolve an entity id mutably (for name/transient metadata).
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if `id` does not name a live entity.
    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, InvalidOperation> {
        self.entities.entity_with_id_mut(id)
    }

    /// Resolve an entity handle.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] once the entity has been destroyed.
    pub fn resolve(&self, handle: &EntityHandle) -> Result<&Entity, InvalidOperation> {
        self.entities.resolve(handle)
    }

    /// Activate an entity, making it visible to iteration and to systems,
    /// then cascade to its children (parent before children).
    ///
    /// For each component the entity carries, the systems' `component_added`
    /// hooks fire in component-type registration order, followed by
    /// `entity_activated`; only then do the children activate.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if the entity does not exist or is
    /// already activated.
    pub fn activate_entity(&mut self, id: EntityId) -> Result<(), InvalidOperation> {
        let entity = self.entities.entity_with_id(id)?;
        if entity.is_activated() {
            return Err(InvalidOperation::new("entity is already activated"));
        }
        self.activate_inner(id);
        Ok(())
    }

    fn activate_inner(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        entity.set_activated(true);
        self.entity_count += 1;
        trace!(entity = id.0, "activated entity");

        for type_id in self.pool_type_ids.clone() {
            if self.pool_has(type_id, id) {
                self.notify_component_added(id, type_id);
            }
        }
        self.notify_entity_activated(id);

        let children = self.children_of(id);
        for child in children {
            if self.entities.get(child).is_some_and(|e| !e.is_activated()) {
                self.activate_inner(child);
            }
        }
    }

    /// Destroy an entity: children first (depth-first), then its
    /// components, then the record itself. Every handle to the entity and
    /// its components is invalidated and the ids are recycled.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if `id` does not name a live entity.
    pub fn destroy_entity(&mut self, id: EntityId) -> Result<(), InvalidOperation> {
        self.entities.entity_with_id(id)?;
        self.destroy_inner(id);
        Ok(())
    }

    fn destroy_inner(&mut self, id: EntityId) {
        let children = self.children_of(id);
        for child in children {
            if self.entities.contains(child) {
                self.destroy_inner(child);
            }
        }

        self.notify_entity_destroyed(id);

        let activated = self
            .entities
            .get(id)
            .is_some_and(Entity::is_activated);
        for type_id in self.pool_type_ids.clone() {
            if self.pool_has(type_id, id) {
                if activated {
                    self.notify_component_removed(id, type_id);
                }
                if let Some(pool) = self.pool_mut(type_id) {
                    let _ = pool.remove(id);
                }
            }
        }

        if activated {
            self.entity_count -= 1;
        }

        if let Some(parent_id) = self.entities.get(id).and_then(Entity::parent)
            && let Some(parent) = self.entities.get_mut(parent_id)
        {
            parent.remove_child_id(id);
        }

        trace!(entity = id.0, "destroyed entity");
        let _ = self.entities.destroy(id);
    }

    /// Destroy every entity in the scene.
    pub fn destroy_all_entities(&mut self) {
        for id in self.entities.live_ids() {
            // A destroyed parent takes its children with it.
            if self.entities.contains(id) {
                self.destroy_inner(id);
            }
        }
    }

    /// Clone an entity: a new unactivated entity with
    /// component-for-component-equal values, the same name, and a
    /// structurally identical child subtree under fresh ids.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if the source entity does not exist.
    pub fn clone_entity(&mut self, source: EntityId) -> Result<EntityId, InvalidOperation> {
        let name = self
            .entities
            .entity_with_id(source)?
            .name()
            .map(str::to_string);
        let clone = self.entities.create(name);
        trace!(source = source.0, clone = clone.0, "cloned entity");

        for type_id in self.pool_type_ids.clone() {
            if let Some(pool) = self.pool_mut(type_id) {
                pool.clone_into(source, clone)?;
            }
        }

        let children = self.children_of(source);
        for child in children {
            let cloned_child = self.clone_entity(child)?;
            self.add_child(clone, cloned_child)?;
        }

        Ok(clone)
    }

    // -- Parent/child tree --

    /// Attach `child` under `parent` at the end of its child list.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if either entity does not exist, the
    /// child already has a parent, the pairing would mix activation states,
    /// or the attachment would create a cycle.
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), InvalidOperation> {
        if parent == child {
            return Err(InvalidOperation::new(
                "cannot add an entity as a child of itself",
            ));
        }
        let parent_activated = self.entities.entity_with_id(parent)?.is_activated();
        let child_entity = self.entities.entity_with_id(child)?;
        if child_entity.parent().is_some() {
            return Err(InvalidOperation::new(
                "cannot add a child entity which already has a parent",
            ));
        }
        if parent_activated && !child_entity.is_activated() {
            return Err(InvalidOperation::new(
                "cannot add an unactivated entity as a child of an activated entity",
            ));
        }
        if !parent_activated && child_entity.is_activated() {
            return Err(InvalidOperation::new(
                "cannot add an activated entity as a child of an unactivated entity",
            ));
        }

        // Walk up from the parent; finding the child there means a cycle.
        let mut ancestor = self.entities.entity_with_id(parent)?.parent();
        while let Some(id) = ancestor {
            if id == child {
                return Err(InvalidOperation::new(
                    "cannot add an ancestor entity as a child",
                ));
            }
            ancestor = self.entities.entity_with_id(id)?.parent();
        }

        self.entities.entity_with_id_mut(child)?.set_parent(Some(parent));
        self.entities.entity_with_id_mut(parent)?.push_child(child);
        Ok(())
    }

    /// Detach `child` from `parent`.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if either entity does not exist or
    /// `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), InvalidOperation> {
        self.entities.entity_with_id(parent)?;
        let child_entity = self.entities.entity_with_id(child)?;
        if child_entity.parent() != Some(parent) {
            return Err(InvalidOperation::new("entity is not a child of this entity"));
        }
        self.entities.entity_with_id_mut(child)?.set_parent(None);
        self.entities.entity_with_id_mut(parent)?.remove_child_id(child);
        Ok(())
    }

    /// The live child entities of `id`, in child-list order.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if `id` does not name a live entity.
    pub fn child_entities(
        &self,
        id: EntityId,
    ) -> Result<impl Iterator<Item = &Entity>, InvalidOperation> {
        let children = self.entities.entity_with_id(id)?.children();
        Ok(children.iter().filter_map(move |&child| self.entities.get(child)))
    }

    /// Find the first ancestor of `id` matching the predicate, walking
    /// towards the root.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if `id` does not name a live entity.
    pub fn find_first_ancestor(
        &self,
        id: EntityId,
        mut predicate: impl FnMut(&Entity) -> bool,
    ) -> Result<Option<EntityHandle>, InvalidOperation> {
        let mut current = self.entities.entity_with_id(id)?.parent();
        while let Some(parent_id) = current {
            let entity = self.entities.entity_with_id(parent_id)?;
            if predicate(entity) {
                return Ok(Some(entity.handle()));
            }
            current = entity.parent();
        }
        Ok(None)
    }

    /// Find the first descendant of `id` matching the predicate, in
    /// depth-first pre-order.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if `id` does not name a live entity.
    pub fn find_first_descendant(
        &self,
        id: EntityId,
        mut predicate: impl FnMut(&Entity) -> bool,
    ) -> Result<Option<EntityHandle>, InvalidOperation> {
        self.entities.entity_with_id(id)?;
        Ok(self.find_descendant_inner(id, &mut predicate))
    }

    fn find_descendant_inner(
        &self,
        id: EntityId,
        predicate: &mut impl FnMut(&Entity) -> bool,
    ) -> Option<EntityHandle> {
        let entity = self.entities.get(id)?;
        for &child_id in entity.children() {
            if let Some(child) = self.entities.get(child_id) {
                if predicate(child) {
                    return Some(child.handle());
                }
                if let Some(found) = self.find_descendant_inner(child_id, predicate) {
                    return Some(found);
                }
            }
        }
        None
    }

    // -- Components --

    /// The pool of components of type `T`.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if `T` is unregistered or was
    /// registered after this scene was constructed.
    pub fn components<T: Component>(&self) -> Result<&ComponentPool<T>, InvalidOperation> {
        let type_id = self.registries.components().type_id_of(T::type_name())?;
        let pool = self
            .pools
            .get(type_id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| Self::unsupported_component::<T>())?;
        pool.as_any()
            .downcast_ref::<ComponentPool<T>>()
            .ok_or_else(|| Self::unsupported_component::<T>())
    }

    fn components_mut<T: Component>(&mut self) -> Result<&mut ComponentPool<T>, InvalidOperation> {
        let type_id = self.registries.components().type_id_of(T::type_name())?;
        let pool = self
            .pools
            .get_mut(type_id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| Self::unsupported_component::<T>())?;
        pool.as_any_mut()
            .downcast_mut::<ComponentPool<T>>()
            .ok_or_else(|| Self::unsupported_component::<T>())
    }

    fn unsupported_component<T: Component>() -> InvalidOperation {
        InvalidOperation::new(format!(
            "scene does not support component type '{}'",
            T::type_name()
        ))
    }

    /// Add a component to an entity.
    ///
    /// If the entity is activated, the systems' `component_added` hooks
    /// fire synchronously before this returns.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if the entity does not exist or
    /// already has a component of this type (the existing component is
    /// unaffected).
    pub fn add_component<T: Component>(
        &mut self,
        entity: EntityId,
        value: T,
    ) -> Result<ComponentId, InvalidOperation> {
        self.entities.entity_with_id(entity)?;
        let type_id = self.registries.components().type_id_of(T::type_name())?;
        let id = self.components_mut::<T>()?.add(entity, value)?;
        if self.is_activated(entity) {
            self.notify_component_added(entity, type_id);
        }
        Ok(id)
    }

    /// Remove and return an entity's component.
    ///
    /// If the entity is activated, the systems' `component_removed` hooks
    /// fire before the slot is invalidated.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if the entity does not exist or has
    /// no component of this type.
    pub fn remove_component<T: Component>(&mut self, entity: EntityId) -> Result<T, InvalidOperation> {
        self.entities.entity_with_id(entity)?;
        let type_id = self.registries.components().type_id_of(T::type_name())?;
        if self.is_activated(entity) && self.pool_has(type_id, entity) {
            self.notify_component_removed(entity, type_id);
        }
        self.components_mut::<T>()?.remove(entity)
    }

    /// Swap an entity's component value in place, keeping its id and
    /// outstanding handles. Fires `component_removed` then
    /// `component_added` for activated entities.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if the entity does not exist or has
    /// no component of this type.
    pub fn replace_component<T: Component>(
        &mut self,
        entity: EntityId,
        value: T,
    ) -> Result<ComponentId, InvalidOperation> {
        self.entities.entity_with_id(entity)?;
        let type_id = self.registries.components().type_id_of(T::type_name())?;
        let activated = self.is_activated(entity);
        if activated && self.pool_has(type_id, entity) {
            self.notify_component_removed(entity, type_id);
        }
        let id = self.components_mut::<T>()?.replace(entity, value)?;
        if activated {
            self.notify_component_added(entity, type_id);
        }
        Ok(id)
    }

    /// Whether the entity has a component of type `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: EntityId) -> bool {
        self.components::<T>()
            .map(|pool| pool.has(entity))
            .unwrap_or(false)
    }

    /// The entity's component of type `T`.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if the entity does not exist or has
    /// no component of this type.
    pub fn component<T: Component>(&self, entity: EntityId) -> Result<&T, InvalidOperation> {
        self.entities.entity_with_id(entity)?;
        self.components::<T>()?.with_entity(entity)
    }

    /// The entity's component of type `T`, mutably.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if the entity does not exist or has
    /// no component of this type.
    pub fn component_mut<T: Component>(&mut self, entity: EntityId) -> Result<&mut T, InvalidOperation> {
        self.entities.entity_with_id(entity)?;
        self.components_mut::<T>()?.with_entity_mut(entity)
    }

    /// A weak reference to the entity's component of type `T`.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if the entity does not exist or has
    /// no component of this type.
    pub fn component_handle<T: Component>(
        &self,
        entity: EntityId,
    ) -> Result<ComponentHandle<T>, InvalidOperation> {
        self.entities.entity_with_id(entity)?;
        self.components::<T>()?.handle_of(entity)
    }

    /// Iterate `(entity, component)` pairs of type `T` for activated
    /// entities.
    ///
    /// The borrow checker prevents mutation while this iterator is alive;
    /// collect mutations and apply them afterwards.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if `T` is not supported by this
    /// scene.
    pub fn iter_components<T: Component>(
        &self,
    ) -> Result<impl Iterator<Item = (&Entity, &T)>, InvalidOperation> {
        let pool = self.components::<T>()?;
        Ok(pool.iter().filter_map(move |(entity_id, value)| {
            let entity = self.entities.get(entity_id)?;
            entity.is_activated().then_some((entity, value))
        }))
    }

    /// Find the first component of type `T` on an activated entity that
    /// matches the predicate.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if `T` is not supported by this
    /// scene.
    pub fn find_first_component<T: Component>(
        &self,
        mut predicate: impl FnMut(&T) -> bool,
    ) -> Result<Option<ComponentHandle<T>>, InvalidOperation> {
        let pool = self.components::<T>()?;
        for (entity_id, value) in pool.iter() {
            if self.is_activated(entity_id) && predicate(value) {
                return Ok(Some(pool.handle_of(entity_id)?));
            }
        }
        Ok(None)
    }

    /// Decode a component onto an entity by its registered type name.
    ///
    /// The single reconnection point between stringly-typed documents and
    /// statically-typed pools; used by entity decoding and by tooling.
    ///
    /// # Errors
    ///
    /// Fails with [`DecodeError::UnknownType`] for an unregistered name and
    /// other [`DecodeError`] variants for malformed component fields.
    pub fn add_component_by_type_name(
        &mut self,
        entity: EntityId,
        name: &str,
        value: &Value,
    ) -> Result<(), DecodeError> {
        self.entities.entity_with_id(entity)?;
        let type_id = self
            .registries
            .components()
            .type_id_of(name)
            .map_err(|_| DecodeError::UnknownType {
                kind: "component",
                name: name.to_string(),
            })?;

        let pool = self
            .pools
            .get_mut(type_id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| {
                DecodeError::Invalid(format!("scene does not support component type '{name}'"))
            })?;
        let had = pool.has(entity);
        pool.decode_component(entity, value)?;

        if !had && self.is_activated(entity) {
            self.notify_component_added(entity, type_id);
        }
        Ok(())
    }

    // -- Systems --

    /// Add a system to the scene by its registered type id and initialize
    /// it.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] on an unregistered type id or if the
    /// scene already has a system of this type.
    pub fn add_system(&mut self, type_id: SystemTypeId) -> Result<SystemTypeId, InvalidOperation> {
        if !self.registries.systems().is_registered_type_id(type_id) {
            return Err(InvalidOperation::new("unknown system type id"));
        }
        let index = type_id.0 as usize;
        if self.systems.get(index).is_some_and(Option::is_some) {
            let name = self.registries.systems().type_name_of(type_id)?;
            return Err(InvalidOperation::new(format!(
                "scene already supports system type '{name}'"
            )));
        }
        if index >= self.systems.len() {
            self.systems.resize_with(index + 1, || None);
        }

        let mut system = self.registries.systems().create(type_id)?;
        system.initialize(self);
        self.systems[index] = Some(system);
        self.system_type_ids.push(type_id);
        Ok(type_id)
    }

    /// Add a system to the scene by its registered name.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] on an unknown name or a duplicate
    /// system type.
    pub fn add_system_by_name(&mut self, name: &str) -> Result<SystemTypeId, InvalidOperation> {
        let type_id = self.registries.systems().type_id_of(name)?;
        self.add_system(type_id)
    }

    /// Whether the scene has a system of the given type.
    #[must_use]
    pub fn has_system_type(&self, type_id: SystemTypeId) -> bool {
        self.systems
            .get(type_id.0 as usize)
            .is_some_and(Option::is_some)
    }

    /// Typed access to a system.
    #[must_use]
    pub fn system<S: System>(&self) -> Option<&S> {
        let type_id = self.registries.systems().type_id_of_system::<S>()?;
        let system = self.systems.get(type_id.0 as usize)?.as_ref()?;
        let any: &dyn std::any::Any = system.as_ref();
        any.downcast_ref::<S>()
    }

    /// Typed mutable access to a system.
    pub fn system_mut<S: System>(&mut self) -> Option<&mut S> {
        let type_id = self.registries.systems().type_id_of_system::<S>()?;
        let system = self.systems.get_mut(type_id.0 as usize)?.as_mut()?;
        let any: &mut dyn std::any::Any = system.as_mut();
        any.downcast_mut::<S>()
    }

    /// Run one simulation tick: every system's `tick`, in the order the
    /// systems were added. Inactive scenes do not tick.
    pub fn tick(&mut self, dt: f64) {
        if !self.active {
            return;
        }
        self.for_each_system(|system, scene| system.tick(scene, dt));
    }

    // -- Hook dispatch --

    /// Run `f` over every system in addition order.
    ///
    /// Each system is taken out of its slot for the duration of its call so
    /// the hook can receive the scene mutably; re-entrant dispatch finds an
    /// empty slot and skips the system.
    fn for_each_system(&mut self, mut f: impl FnMut(&mut dyn System, &mut Scene)) {
        let order = self.system_type_ids.clone();
        for type_id in order {
            let index = type_id.0 as usize;
            let Some(mut system) = self.systems.get_mut(index).and_then(Option::take) else {
                continue;
            };
            f(system.as_mut(), self);
            self.systems[index] = Some(system);
        }
    }

    fn notify_component_added(&mut self, entity: EntityId, type_id: ComponentTypeId) {
        self.for_each_system(|system, scene| system.component_added(scene, entity, type_id));
    }

    fn notify_component_removed(&mut self, entity: EntityId, type_id: ComponentTypeId) {
        self.for_each_system(|system, scene| system.component_removed(scene, entity, type_id));
    }

    fn notify_entity_activated(&mut self, entity: EntityId) {
        self.for_each_system(|system, scene| system.entity_activated(scene, entity));
    }

    fn notify_entity_destroyed(&mut self, entity: EntityId) {
        self.for_each_system(|system, scene| system.entity_destroyed(scene, entity));
    }

    // -- Encode/decode --

    /// Encode the scene into a document tree.
    ///
    /// Activated root entities are encoded with their component data and
    /// children nested recursively; transient entities are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] if a component or system value cannot be
    /// represented.
    pub fn encode(&self) -> Result<Value, EncodeError> {
        let mut doc = serde_json::Map::new();

        if let Some(type_id) = self.scene_type {
            let name = self
                .registries
                .scenes()
                .type_name_of(type_id)
                .expect("scene type id was assigned by the registry");
            doc.insert("scene_type".to_string(), Value::String(name.to_string()));
        }

        let mut systems = Vec::new();
        for &type_id in &self.system_type_ids {
            let Some(system) = self.systems.get(type_id.0 as usize).and_then(Option::as_ref)
            else {
                continue;
            };
            let name = self
                .registries
                .systems()
                .type_name_of(type_id)
                .expect("system type id was assigned by the registry");
            let mut tree = system.encode()?;
            let Some(object) = tree.as_object_mut() else {
                return Err(EncodeError::NotAnObject {
                    type_name: name.to_string(),
                });
            };
            object.insert("system_type".to_string(), Value::String(name.to_string()));
            systems.push(tree);
        }
        doc.insert("systems".to_string(), Value::Array(systems));

        let mut entities = Vec::new();
        for entity in self.entities.iter() {
            if entity.parent().is_none() && !entity.is_transient() {
                entities.push(self.encode_entity(entity)?);
            }
        }
        doc.insert("entities".to_string(), Value::Array(entities));

        Ok(Value::Object(doc))
    }

    fn encode_entity(&self, entity: &Entity) -> Result<Value, EncodeError> {
        let mut doc = serde_json::Map::new();

        if let Some(name) = entity.name() {
            doc.insert("name".to_string(), Value::String(name.to_string()));
        }

        let mut components = Vec::new();
        for &type_id in &self.pool_type_ids {
            if let Some(pool) = self.pools.get(type_id.0 as usize).and_then(Option::as_ref)
                && let Some(tree) = pool.encode_component(entity.id())?
            {
                components.push(tree);
            }
        }
        doc.insert("components".to_string(), Value::Array(components));

        let mut children = Vec::new();
        for &child_id in entity.children() {
            if let Some(child) = self.entities.get(child_id)
                && !child.is_transient()
            {
                children.push(self.encode_entity(child)?);
            }
        }
        doc.insert("children".to_string(), Value::Array(children));

        Ok(Value::Object(doc))
    }

    /// Encode the scene to bytes in the given wire mode.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] if encoding fails.
    pub fn to_bytes(&self, format: Format) -> Result<Vec<u8>, EncodeError> {
        let tree = self.encode()?;
        codec::to_bytes(&tree, format)
    }

    /// Decode a scene document into this scene.
    ///
    /// A `"base"` member names a scene document merged in first. Decoded
    /// root entities are activated as they arrive.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] on malformed documents, unknown type names,
    /// or unresolvable asset references. A scene that failed mid-decode
    /// should be discarded.
    pub fn decode(&mut self, value: &Value, assets: &dyn AssetSource) -> Result<(), DecodeError> {
        if let Some(base) = member(value, "base") {
            let path = base
                .as_str()
                .ok_or_else(|| DecodeError::shape("base", "a string"))?;
            debug!(path, "merging base scene document");
            let doc = assets.load(path)?;
            self.decode(&doc, assets)?;
        }

        // The registry already picked this scene's constructor; the member
        // is read back only so encode and decode stay reflective.
        if member(value, "scene_type").is_some() {
            member_str(value, "scene_type")?;
        }

        if let Some(systems) = member_array(value, "systems")? {
            for doc in systems {
                let name = member_str(doc, "system_type")?;
                let type_id = self
                    .registries
                    .systems()
                    .type_id_of(name)
                    .map_err(|_| DecodeError::UnknownType {
                        kind: "system",
                        name: name.to_string(),
                    })?;
                let index = type_id.0 as usize;
                let Some(mut system) = self.systems.get_mut(index).and_then(Option::take) else {
                    return Err(DecodeError::Invalid(format!(
                        "scene does not support system type '{name}'"
                    )));
                };
                let result = system.decode(doc);
                self.systems[index] = Some(system);
                result?;
            }
        }

        if let Some(entities) = member_array(value, "entities")? {
            debug!(count = entities.len(), "decoding scene entities");
            for doc in entities {
                let id = self.create_entity();
                self.decode_entity(id, doc, assets)?;
                self.activate_entity(id)?;
            }
        }

        Ok(())
    }

    /// Decode an entity document onto an existing entity.
    ///
    /// An `"archetype"` member names an entity document whose components
    /// and children are merged in before the local members, so local
    /// components override the archetype's values field by field.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] on malformed documents or unknown component
    /// type names.
    pub fn decode_entity(
        &mut self,
        id: EntityId,
        value: &Value,
        assets: &dyn AssetSource,
    ) -> Result<(), DecodeError> {
        if let Some(archetype) = member(value, "archetype") {
            let path = archetype
                .as_str()
                .ok_or_else(|| DecodeError::shape("archetype", "a string"))?;
            let doc = assets.load(path)?;
            self.decode_entity(id, &doc, assets)?;
        }

        if let Some(name) = member(value, "name") {
            let name = name
                .as_str()
                .ok_or_else(|| DecodeError::shape("name", "a string"))?;
            self.entity_mut(id)?.set_name(Some(name.to_string()));
        }

        if let Some(components) = member_array(value, "components")? {
            for doc in components {
                let type_name = member_str(doc, "type")?;
                self.add_component_by_type_name(id, type_name, doc)?;
            }
        }

        if let Some(children) = member_array(value, "children")? {
            for doc in children {
                let child = self.create_entity();
                self.decode_entity(child, doc, assets)?;
                self.add_child(id, child)?;
            }
        }

        Ok(())
    }

    /// Create an unactivated entity from an entity document asset.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the asset cannot be resolved or decoded.
    pub fn load_entity(
        &mut self,
        path: &str,
        assets: &dyn AssetSource,
    ) -> Result<EntityId, DecodeError> {
        let doc = assets.load(path)?;
        let id = self.create_entity();
        self.decode_entity(id, &doc, assets)?;
        Ok(id)
    }

    /// Construct a scene from a document tree, dispatching on its
    /// `"scene_type"` member through the scene registry.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownType`] for an unregistered scene type
    /// and other [`DecodeError`] variants for malformed documents.
    pub fn from_document(
        value: &Value,
        registries: &Arc<Registries>,
        assets: &dyn AssetSource,
    ) -> Result<Self, DecodeError> {
        let name = member_str(value, "scene_type")?;
        registries
            .scenes()
            .type_id_of(name)
            .map_err(|_| DecodeError::UnknownType {
                kind: "scene",
                name: name.to_string(),
            })?;
        let mut scene = registries.create_scene(name)?;
        scene.decode(value, assets)?;
        Ok(scene)
    }

    /// Construct a scene from bytes in the given wire mode.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the bytes or the document are invalid.
    pub fn from_bytes(
        bytes: &[u8],
        format: Format,
        registries: &Arc<Registries>,
        assets: &dyn AssetSource,
    ) -> Result<Self, DecodeError> {
        let tree: Value = codec::from_bytes(bytes, format)?;
        Self::from_document(&tree, registries, assets)
    }

    // -- Internal helpers --

    fn is_activated(&self, id: EntityId) -> bool {
        self.entities.get(id).is_some_and(Entity::is_activated)
    }

    fn children_of(&self, id: EntityId) -> Vec<EntityId> {
        self.entities
            .get(id)
            .map(|entity| entity.children().to_vec())
            .unwrap_or_default()
    }

    fn pool_has(&self, type_id: ComponentTypeId, entity: EntityId) -> bool {
        self.pools
            .get(type_id.0 as usize)
            .and_then(Option::as_ref)
            .is_some_and(|pool| pool.has(entity))
    }

    fn pool_mut(&mut self, type_id: ComponentTypeId) -> Option<&mut Box<dyn AnyComponentPool>> {
        self.pools.get_mut(type_id.0 as usize).and_then(Option::as_mut)
    }
}
