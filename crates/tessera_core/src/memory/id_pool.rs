//! # Id Pool
//!
//! LIFO stack of entity ids freed by `kill`, handed back before new ids
//! are minted.

use crate::ecs::EntityId;
use crate::error::{RegistryError, RegistryResult};

/// A growable stack of recyclable entity ids.
///
/// Push and pop are amortized O(1). The pool does not detect duplicate
/// pushes; the entity store guarantees each dead id is pushed once.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool = IdPool::new();
/// pool.push(EntityId::new(4));
/// pool.push(EntityId::new(9));
///
/// assert_eq!(pool.pop()?, EntityId::new(9)); // most recent first
/// ```
#[derive(Debug, Default, Clone)]
pub struct IdPool {
    /// Free ids, most recently freed last.
    free: Vec<EntityId>,
}

impl IdPool {
    /// Creates an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self { free: Vec::new() }
    }

    /// Returns the number of recyclable ids.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// Checks if no ids are waiting for reuse.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Stores an id for later reuse.
    #[inline]
    pub fn push(&mut self, id: EntityId) {
        self.free.push(id);
    }

    /// Removes and returns the most recently pushed id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PoolEmpty`] if there is nothing to reuse.
    #[inline]
    pub fn pop(&mut self) -> RegistryResult<EntityId> {
        self.free.pop().ok_or(RegistryError::PoolEmpty)
    }

    /// Drops every pending id.
    pub fn clear(&mut self) {
        self.free.clear();
    }
}
