//! Weak references into the pools.
//!
//! A handle pairs an id with a *shared validity cell* owned by the
//! referenced entity or component. The cell is flipped exactly once, when
//! the referent is destroyed, so outstanding handles discover staleness
//! without any scan of live handles. Dereferencing goes through the owning
//! pool and reports `InvalidOperation` on a dead handle; it is never
//! undefined behaviour and never a silent resolve to a recycled slot.

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::component::{Component, ComponentId};
use crate::entity::EntityId;

/// Shared liveness flag between a pool slot and every handle to it.
///
/// All mutation happens on the owning scene thread; the atomic store/load
/// pair only guards against undefined reordering if a future caller reads
/// the flag from a worker thread.
#[derive(Debug, Clone)]
pub(crate) struct ValidityCell(Arc<AtomicBool>);

impl ValidityCell {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// Flip the cell dead. Called once, at destroy time.
    pub fn invalidate(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_valid(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A weak reference to an entity.
///
/// Obtained from [`Entity::handle`](crate::entity::Entity::handle) and
/// resolved through the owning pool or scene; resolution fails with
/// `InvalidOperation` once the entity has been destroyed, even if its id
/// has since been recycled for a new entity.
#[derive(Debug, Clone)]
pub struct EntityHandle {
    id: EntityId,
    cell: ValidityCell,
}

impl EntityHandle {
    pub(crate) fn new(id: EntityId, cell: ValidityCell) -> Self {
        Self { id, cell }
    }

    /// The id of the referenced entity.
    ///
    /// Only meaningful while [`is_valid`](Self::is_valid) holds.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Whether the referenced entity is still alive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.cell.is_valid()
    }
}

/// A weak reference to a component of type `T`.
///
/// Invalidated when the component is removed or its entity destroyed.
#[derive(Debug, Clone)]
pub struct ComponentHandle<T: Component> {
    id: ComponentId,
    cell: ValidityCell,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Component> ComponentHandle<T> {
    pub(crate) fn new(id: ComponentId, cell: ValidityCell) -> Self {
        Self {
            id,
            cell,
            _marker: PhantomData,
        }
    }

    /// The pool-local id of the referenced component.
    ///
    /// Only meaningful while [`is_valid`](Self::is_valid) holds.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Whether the referenced component is still in its pool.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.cell.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_starts_valid() {
        let cell = ValidityCell::new();
        assert!(cell.is_valid());
    }

    #[test]
    fn test_invalidation_is_shared() {
        let cell = ValidityCell::new();
        let handle = EntityHandle::new(EntityId(3), cell.clone());
        assert!(handle.is_valid());

        cell.invalidate();
        assert!(!handle.is_valid());
        assert_eq!(handle.id(), EntityId(3));
    }

    #[test]
    fn test_cloned_handles_share_the_cell() {
        let cell = ValidityCell::new();
        let a = EntityHandle::new(EntityId(0), cell.clone());
        let b = a.clone();

        cell.invalidate();
        assert!(!a.is_valid());
        assert!(!b.is_valid());
    }
}
