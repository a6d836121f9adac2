//! Type registries: the point where stringly-typed documents reconnect to
//! statically-typed factories.
//!
//! Each registry maps a type's name and dense numeric id to a factory
//! function. Ids are assigned in registration order, so lookup by id is an
//! array index after an amortised O(1) name lookup. Registries are plain
//! values populated by explicit registration calls at startup; there is no
//! hidden global state, and tests construct isolated instances.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::component::{Component, ComponentTypeId};
use crate::component_pool::{AnyComponentPool, ComponentPool};
use crate::error::InvalidOperation;
use crate::scene::{Scene, SceneTypeId};
use crate::system::{System, SystemTypeId};

fn make_pool<T: Component>(type_id: ComponentTypeId) -> Box<dyn AnyComponentPool> {
    Box::new(ComponentPool::<T>::new(type_id))
}

fn make_system<S: System + Default>() -> Box<dyn System> {
    Box::new(S::default())
}

/// Constructs a configured [`Scene`], typically pre-adding its systems.
pub type SceneFactory = fn(Arc<Registries>) -> Result<Scene, InvalidOperation>;

struct ComponentEntry {
    name: &'static str,
    make_pool: fn(ComponentTypeId) -> Box<dyn AnyComponentPool>,
}

/// Registry of component types.
#[derive(Default)]
pub struct ComponentRegistry {
    entries: Vec<ComponentEntry>,
    ids_by_name: HashMap<&'static str, ComponentTypeId>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type, assigning the next dense type id.
    ///
    /// # Errors
    ///
    /// Fails if a type with the same name is already registered.
    pub fn register<T: Component>(&mut self) -> Result<ComponentTypeId, InvalidOperation> {
        let name = T::type_name();
        if self.ids_by_name.contains_key(name) {
            return Err(InvalidOperation::new(format!(
                "component type '{name}' is already registered"
            )));
        }
        let type_id = ComponentTypeId(self.entries.len() as u32);
        self.entries.push(ComponentEntry {
            name,
            make_pool: make_pool::<T>,
        });
        self.ids_by_name.insert(name, type_id);
        Ok(type_id)
    }

    /// Build an empty pool for the given type id, the type-erased container
    /// component instances of that type live in. Used at scene construction
    /// and by tooling.
    ///
    /// # Errors
    ///
    /// Fails on an unregistered type id.
    pub fn create_pool(
        &self,
        type_id: ComponentTypeId,
    ) -> Result<Box<dyn AnyComponentPool>, InvalidOperation> {
        let entry = self
            .entries
            .get(type_id.0 as usize)
            .ok_or_else(|| InvalidOperation::new("unknown component type id"))?;
        Ok((entry.make_pool)(type_id))
    }

    /// Build one pool per registered type, in type-id order.
    pub(crate) fn create_pools(&self) -> Vec<Box<dyn AnyComponentPool>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.make_pool)(ComponentTypeId(index as u32)))
            .collect()
    }

    /// The type id registered under `name`.
    ///
    /// # Errors
    ///
    /// Fails on an unregistered name.
    pub fn type_id_of(&self, name: &str) -> Result<ComponentTypeId, InvalidOperation> {
        self.ids_by_name.get(name).copied().ok_or_else(|| {
            InvalidOperation::new(format!("unknown component type name '{name}'"))
        })
    }

    /// The name registered under `type_id`.
    ///
    /// # Errors
    ///
    /// Fails on an unregistered type id.
    pub fn type_name_of(&self, type_id: ComponentTypeId) -> Result<&'static str, InvalidOperation> {
        self.entries
            .get(type_id.0 as usize)
            .map(|entry| entry.name)
            .ok_or_else(|| InvalidOperation::new("unknown component type id"))
    }

    /// Whether `type_id` names a registered component type.
    #[must_use]
    pub fn is_registered_type_id(&self, type_id: ComponentTypeId) -> bool {
        (type_id.0 as usize) < self.entries.len()
    }

    /// All registered type ids, in registration order.
    pub fn type_ids(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        (0..self.entries.len()).map(|index| ComponentTypeId(index as u32))
    }

    /// Number of registered component types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no component types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct SystemEntry {
    name: &'static str,
    make: fn() -> Box<dyn System>,
}

/// Registry of system types.
#[derive(Default)]
pub struct SystemRegistry {
    entries: Vec<SystemEntry>,
    ids_by_name: HashMap<&'static str, SystemTypeId>,
    ids_by_rust_type: HashMap<TypeId, SystemTypeId>,
}

impl SystemRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system type under `name`, assigning the next dense id.
    ///
    /// # Errors
    ///
    /// Fails if the name or the Rust type is already registered.
    pub fn register<S: System + Default>(
        &mut self,
        name: &'static str,
    ) -> Result<SystemTypeId, InvalidOperation> {
        if self.ids_by_name.contains_key(name) {
            return Err(InvalidOperation::new(format!(
                "system type '{name}' is already registered"
            )));
        }
        if self.ids_by_rust_type.contains_key(&TypeId::of::<S>()) {
            return Err(InvalidOperation::new(format!(
                "system type '{name}' is already registered under another name"
            )));
        }
        let type_id = SystemTypeId(self.entries.len() as u32);
        self.entries.push(SystemEntry {
            name,
            make: make_system::<S>,
        });
        self.ids_by_name.insert(name, type_id);
        self.ids_by_rust_type.insert(TypeId::of::<S>(), type_id);
        Ok(type_id)
    }

    /// Construct a new instance of the system registered under `type_id`.
    ///
    /// # Errors
    ///
    /// Fails on an unregistered type id.
    pub fn create(&self, type_id: SystemTypeId) -> Result<Box<dyn System>, InvalidOperation> {
        let entry = self
            .entries
            .get(type_id.0 as usize)
            .ok_or_else(|| InvalidOperation::new("unknown system type id"))?;
        Ok((entry.make)())
    }

    /// The type id registered under `name`.
    ///
    /// # Errors
    ///
    /// Fails on an unregistered name.
    pub fn type_id_of(&self, name: &str) -> Result<SystemTypeId, InvalidOperation> {
        self.ids_by_name
            .get(name)
            .copied()
            .ok_or_else(|| InvalidOperation::new(format!("unknown system type name '{name}'")))
    }

    /// The type id of the Rust system type `S`, if registered.
    #[must_use]
    pub fn type_id_of_system<S: System>(&self) -> Option<SystemTypeId> {
        self.ids_by_rust_type.get(&TypeId::of::<S>()).copied()
    }

    /// The name registered under `type_id`.
    ///
    /// # Errors
    ///
    /// Fails on an unregistered type id.
    pub fn type_name_of(&self, type_id: SystemTypeId) -> Result<&'static str, InvalidOperation> {
        self.entries
            .get(type_id.0 as usize)
            .map(|entry| entry.name)
            .ok_or_else(|| InvalidOperation::new("unknown system type id"))
    }

    /// Whether `type_id` names a registered system type.
    #[must_use]
    pub fn is_registered_type_id(&self, type_id: SystemTypeId) -> bool {
        (type_id.0 as usize) < self.entries.len()
    }

    /// All registered type ids, in registration order.
    pub fn type_ids(&self) -> impl Iterator<Item = SystemTypeId> + '_ {
        (0..self.entries.len()).map(|index| SystemTypeId(index as u32))
    }
}

struct SceneEntry {
    name: &'static str,
    make: SceneFactory,
}

/// Registry of scene types.
///
/// A scene "type" is a named factory that returns a configured [`Scene`]
/// (typically with its systems pre-added). The `"scene_type"` member of a
/// scene document selects the factory before the rest of the document is
/// decoded.
#[derive(Default)]
pub struct SceneRegistry {
    entries: Vec<SceneEntry>,
    ids_by_name: HashMap<&'static str, SceneTypeId>,
}

impl SceneRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scene type, assigning the next dense id.
    ///
    /// # Errors
    ///
    /// Fails if the name is already registered.
    pub fn register(
        &mut self,
        name: &'static str,
        factory: SceneFactory,
    ) -> Result<SceneTypeId, InvalidOperation> {
        if self.ids_by_name.contains_key(name) {
            return Err(InvalidOperation::new(format!(
                "scene type '{name}' is already registered"
            )));
        }
        let type_id = SceneTypeId(self.entries.len() as u32);
        self.entries.push(SceneEntry {
            name,
            make: factory,
        });
        self.ids_by_name.insert(name, type_id);
        Ok(type_id)
    }

    /// The type id registered under `name`.
    ///
    /// # Errors
    ///
    /// Fails on an unregistered name.
    pub fn type_id_of(&self, name: &str) -> Result<SceneTypeId, InvalidOperation> {
        self.ids_by_name
            .get(name)
            .copied()
            .ok_or_else(|| InvalidOperation::new(format!("unknown scene type name '{name}'")))
    }

    /// The name registered under `type_id`.
    ///
    /// # Errors
    ///
    /// Fails on an unregistered type id.
    pub fn type_name_of(&self, type_id: SceneTypeId) -> Result<&'static str, InvalidOperation> {
        self.entries
            .get(type_id.0 as usize)
            .map(|entry| entry.name)
            .ok_or_else(|| InvalidOperation::new("unknown scene type id"))
    }

    /// Whether `type_id` names a registered scene type.
    #[must_use]
    pub fn is_registered_type_id(&self, type_id: SceneTypeId) -> bool {
        (type_id.0 as usize) < self.entries.len()
    }

    pub(crate) fn factory_of(&self, type_id: SceneTypeId) -> Result<SceneFactory, InvalidOperation> {
        self.entries
            .get(type_id.0 as usize)
            .map(|entry| entry.make)
            .ok_or_else(|| InvalidOperation::new("unknown scene type id"))
    }
}

/// The bundle of registries one engine instance shares across its scenes.
///
/// Built and populated at startup, then wrapped in an [`Arc`]; scenes hold
/// a reference for dispatch during decode and pool construction.
#[derive(Default)]
pub struct Registries {
    components: ComponentRegistry,
    systems: SystemRegistry,
    scenes: SceneRegistry,
}

impl Registries {
    /// Create an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The component registry.
    #[must_use]
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// The component registry, for registration.
    pub fn components_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.components
    }

    /// The system registry.
    #[must_use]
    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    /// The system registry, for registration.
    pub fn systems_mut(&mut self) -> &mut SystemRegistry {
        &mut self.systems
    }

    /// The scene registry.
    #[must_use]
    pub fn scenes(&self) -> &SceneRegistry {
        &self.scenes
    }

    /// The scene registry, for registration.
    pub fn scenes_mut(&mut self) -> &mut SceneRegistry {
        &mut self.scenes
    }

    /// Construct a scene through its registered factory.
    ///
    /// # Errors
    ///
    /// Fails on an unknown scene type name, or if the factory itself fails.
    pub fn create_scene(self: &Arc<Self>, name: &str) -> Result<Scene, InvalidOperation> {
        let type_id = self.scenes.type_id_of(name)?;
        let factory = self.scenes.factory_of(type_id)?;
        let mut scene = factory(Arc::clone(self))?;
        scene.set_scene_type(type_id);
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Marker {
        tag: u32,
    }

    impl Component for Marker {
        fn type_name() -> &'static str {
            "Marker"
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Other {
        tag: u32,
    }

    impl Component for Other {
        fn type_name() -> &'static str {
            "Other"
        }
    }

    #[derive(Default)]
    struct NoopSystem;

    impl System for NoopSystem {}

    #[test]
    fn test_component_ids_are_dense_and_ordered() {
        let mut registry = ComponentRegistry::new();
        let a = registry.register::<Marker>().unwrap();
        let b = registry.register::<Other>().unwrap();
        assert_eq!(a, ComponentTypeId(0));
        assert_eq!(b, ComponentTypeId(1));

        let ids: Vec<ComponentTypeId> = registry.type_ids().collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_component_name_and_id_lookups_invert() {
        let mut registry = ComponentRegistry::new();
        let id = registry.register::<Marker>().unwrap();
        assert_eq!(registry.type_id_of("Marker").unwrap(), id);
        assert_eq!(registry.type_name_of(id).unwrap(), "Marker");
        assert!(registry.is_registered_type_id(id));
    }

    #[test]
    fn test_unknown_lookups_fail_with_distinct_messages() {
        let registry = ComponentRegistry::new();
        let by_name = registry.type_id_of("Ghost").unwrap_err();
        let by_id = registry.type_name_of(ComponentTypeId(7)).unwrap_err();
        assert!(by_name.message().contains("name 'Ghost'"));
        assert!(by_id.message().contains("type id"));
        assert!(!registry.is_registered_type_id(ComponentTypeId(7)));
    }

    #[test]
    fn test_duplicate_component_registration_fails() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Marker>().unwrap();
        assert!(registry.register::<Marker>().is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_instances_are_isolated() {
        let mut a = ComponentRegistry::new();
        let b = ComponentRegistry::new();
        a.register::<Marker>().unwrap();
        assert!(b.type_id_of("Marker").is_err());
    }

    #[test]
    fn test_pool_creation_by_type_id() {
        let mut registry = ComponentRegistry::new();
        let id = registry.register::<Marker>().unwrap();
        let pool = registry.create_pool(id).unwrap();
        assert_eq!(pool.type_id(), id);
        assert_eq!(pool.type_name(), "Marker");

        assert!(registry.create_pool(ComponentTypeId(3)).is_err());
    }

    #[test]
    fn test_system_registration_and_creation() {
        let mut registry = SystemRegistry::new();
        let id = registry.register::<NoopSystem>("Noop").unwrap();
        assert_eq!(registry.type_id_of("Noop").unwrap(), id);
        assert_eq!(registry.type_name_of(id).unwrap(), "Noop");
        assert_eq!(registry.type_id_of_system::<NoopSystem>(), Some(id));
        assert!(registry.create(id).is_ok());
        assert!(registry.create(SystemTypeId(9)).is_err());
    }

    #[test]
    fn test_duplicate_system_registration_fails() {
        let mut registry = SystemRegistry::new();
        registry.register::<NoopSystem>("Noop").unwrap();
        assert!(registry.register::<NoopSystem>("Noop").is_err());
        assert!(registry.register::<NoopSystem>("OtherName").is_err());
    }

    #[test]
    fn test_scene_registration_lookups() {
        let mut registry = SceneRegistry::new();
        let id = registry
            .register("Default", |registries| Ok(Scene::new(registries)))
            .unwrap();
        assert_eq!(registry.type_id_of("Default").unwrap(), id);
        assert_eq!(registry.type_name_of(id).unwrap(), "Default");
        assert!(registry.type_id_of("Ghost").is_err());
    }

    #[test]
    fn test_create_scene_through_bundle() {
        let mut registries = Registries::new();
        registries.components_mut().register::<Marker>().unwrap();
        registries
            .scenes_mut()
            .register("Default", |registries| Ok(Scene::new(registries)))
            .unwrap();
        let registries = Arc::new(registries);

        let scene = registries.create_scene("Default").unwrap();
        assert!(scene.scene_type().is_some());
        assert!(registries.create_scene("Ghost").is_err());
    }
}
