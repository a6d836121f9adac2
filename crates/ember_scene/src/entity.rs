//! Entity identity and per-entity metadata.
//!
//! An entity is a logical row keyed by a small recyclable id. It carries
//! only metadata: activation state, its place in the parent/child tree, an
//! optional display name. Component data lives in the per-type pools and is
//! joined implicitly by [`EntityId`].

use serde::{Deserialize, Serialize};

use crate::handle::{EntityHandle, ValidityCell};

/// A scene-local entity identifier.
///
/// Unique among entities that are alive at the same time; ids are recycled
/// (lowest-first) after destruction, so a stored `EntityId` may later name
/// a different entity. Use an [`EntityHandle`] to detect that.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity {}", self.0)
    }
}

/// An entity record, owned by the [`EntityPool`](crate::EntityPool).
///
/// Created unactivated; becomes visible to iteration and to systems once
/// activated through the scene. Destroying the record invalidates every
/// outstanding handle to it.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    name: Option<String>,
    activated: bool,
    transient: bool,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    validity: ValidityCell,
}

impl Entity {
    pub(crate) fn new(id: EntityId, name: Option<String>) -> Self {
        Self {
            id,
            name,
            activated: false,
            transient: false,
            parent: None,
            children: Vec::new(),
            validity: ValidityCell::new(),
        }
    }

    /// The entity's id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The entity's display name, if it has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set or clear the display name.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Whether the entity has been activated.
    #[must_use]
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Whether the entity is skipped when the scene is encoded.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.transient
    }

    /// Mark the entity transient (excluded from scene encoding).
    pub fn set_transient(&mut self, transient: bool) {
        self.transient = transient;
    }

    /// The parent entity id, if this entity is in a tree.
    #[must_use]
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// The ordered child ids.
    #[must_use]
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Whether this entity has any children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// A weak reference to this entity.
    #[must_use]
    pub fn handle(&self) -> EntityHandle {
        EntityHandle::new(self.id, self.validity.clone())
    }

    pub(crate) fn set_activated(&mut self, activated: bool) {
        self.activated = activated;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<EntityId>) {
        self.parent = parent;
    }

    pub(crate) fn push_child(&mut self, child: EntityId) {
        self.children.push(child);
    }

    pub(crate) fn remove_child_id(&mut self, child: EntityId) {
        self.children.retain(|&id| id != child);
    }

    /// Flip every outstanding handle dead. Called once, on destruction.
    pub(crate) fn invalidate(&self) {
        self.validity.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entity_is_unactivated() {
        let entity = Entity::new(EntityId(0), None);
        assert!(!entity.is_activated());
        assert!(!entity.is_transient());
        assert!(entity.parent().is_none());
        assert!(!entity.has_children());
        assert!(entity.name().is_none());
    }

    #[test]
    fn test_name_roundtrip() {
        let mut entity = Entity::new(EntityId(1), Some("player".to_string()));
        assert_eq!(entity.name(), Some("player"));
        entity.set_name(None);
        assert!(entity.name().is_none());
    }

    #[test]
    fn test_child_list_is_ordered() {
        let mut entity = Entity::new(EntityId(0), None);
        entity.push_child(EntityId(2));
        entity.push_child(EntityId(1));
        entity.push_child(EntityId(3));
        assert_eq!(entity.children(), &[EntityId(2), EntityId(1), EntityId(3)]);

        entity.remove_child_id(EntityId(1));
        assert_eq!(entity.children(), &[EntityId(2), EntityId(3)]);
    }

    #[test]
    fn test_handle_invalidation() {
        let entity = Entity::new(EntityId(7), None);
        let handle = entity.handle();
        assert!(handle.is_valid());
        assert_eq!(handle.id(), EntityId(7));

        entity.invalidate();
        assert!(!handle.is_valid());
    }
}
