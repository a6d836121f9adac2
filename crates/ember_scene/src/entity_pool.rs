//! Slot-recycling arena owning all entity records for one scene.

use crate::entity::{Entity, EntityId};
use crate::error::InvalidOperation;
use crate::handle::EntityHandle;
use crate::id_pool::IdPool;

/// Dense storage for every [`Entity`] in a scene.
///
/// Slots are keyed by [`EntityId`]; destroyed ids are recycled lowest-first,
/// so the id space stays dense under create/destroy churn. Lifecycle
/// mutation goes through the owning [`Scene`](crate::Scene), which keeps
/// the component pools and tree structure consistent; the pool itself owns
/// only identity and metadata.
#[derive(Debug, Default)]
pub struct EntityPool {
    slots: Vec<Option<Entity>>,
    ids: IdPool,
}

impl EntityPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new unactivated entity with the lowest free id.
    pub(crate) fn create(&mut self, name: Option<String>) -> EntityId {
        let id = EntityId(self.ids.create());
        let index = id.0 as usize;
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index] = Some(Entity::new(id, name));
        id
    }

    /// Release an entity record and recycle its id.
    ///
    /// Invalidates every outstanding handle to the entity.
    ///
    /// # Errors
    ///
    /// Fails if `id` does not name a live entity.
    pub(crate) fn destroy(&mut self, id: EntityId) -> Result<(), InvalidOperation> {
        let slot = self
            .slots
            .get_mut(id.0 as usize)
            .ok_or_else(|| InvalidOperation::new("entity does not exist"))?;
        let entity = slot
            .take()
            .ok_or_else(|| InvalidOperation::new("entity does not exist"))?;
        entity.invalidate();
        self.ids.destroy(id.0);
        Ok(())
    }

    /// Whether `id` names a live entity.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        matches!(self.slots.get(id.0 as usize), Some(Some(_)))
    }

    /// Number of live entities, activated or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether the pool holds no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    /// Look up a live entity, if present.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.0 as usize).and_then(|slot| slot.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots
            .get_mut(id.0 as usize)
            .and_then(|slot| slot.as_mut())
    }

    /// Resolve an id to its entity record.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] if the id is stale or out of range.
    pub fn entity_with_id(&self, id: EntityId) -> Result<&Entity, InvalidOperation> {
        self.get(id)
            .ok_or_else(|| InvalidOperation::new("entity does not exist"))
    }

    pub(crate) fn entity_with_id_mut(
        &mut self,
        id: EntityId,
    ) -> Result<&mut Entity, InvalidOperation> {
        self.get_mut(id)
            .ok_or_else(|| InvalidOperation::new("entity does not exist"))
    }

    /// Resolve a handle to its entity record.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidOperation`] once the referenced entity has been
    /// destroyed, even if its id has been recycled.
    pub fn resolve(&self, handle: &EntityHandle) -> Result<&Entity, InvalidOperation> {
        if !handle.is_valid() {
            return Err(InvalidOperation::new("entity handle is no longer valid"));
        }
        self.entity_with_id(handle.id())
    }

    /// Iterate the live, *activated* entities in ascending id order.
    ///
    /// The sequence is lazy and restartable; unactivated entities are
    /// skipped.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref())
            .filter(|entity| entity.is_activated())
    }

    /// Find the first activated entity matching a predicate.
    #[must_use]
    pub fn find_first(&self, mut predicate: impl FnMut(&Entity) -> bool) -> Option<EntityHandle> {
        self.iter()
            .find(|entity| predicate(entity))
            .map(Entity::handle)
    }

    /// Find the first activated entity with the given display name.
    #[must_use]
    pub fn find_first_by_name(&self, name: &str) -> Option<EntityHandle> {
        self.find_first(|entity| entity.name() == Some(name))
    }

    /// Ids of every live entity, activated or not, in ascending order.
    pub(crate) fn live_ids(&self) -> Vec<EntityId> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(Entity::id))
            .collect()
    }
}
