//! # Query Engine
//!
//! Answers "which live entities carry all of these component types" by a
//! linear scan over the entity masks:
//!
//! ```text
//! query = {0, 2}        -> query mask 0b101
//! entity mask 0b111     -> 0b111 & 0b101 == 0b101  match
//! entity mask 0b011     -> 0b011 & 0b101 == 0b001  skip
//! ```
//!
//! Cost is O(issued entities) per query regardless of result size. Results
//! come out in ascending id order because the scan runs in id order.

use std::iter::Copied;
use std::slice;

use super::entity::{EntityFlags, EntityId, EntityStore};
use super::layout::{mask_bit, ComponentLayout, ComponentMask};
use crate::error::{RegistryError, RegistryResult};

/// Set of component types a query requires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct QueryMask(ComponentMask);

impl QueryMask {
    /// A mask requiring nothing; matches every live entity.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds a mask from type indices, validating each against `layout`.
    ///
    /// Duplicate indices are harmless.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] for any index outside
    /// the layout.
    pub fn from_types(types: &[usize], layout: &ComponentLayout) -> RegistryResult<Self> {
        types.iter().try_fold(Self::empty(), |mask, &t| mask.with(t, layout))
    }

    /// Adds one required type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] if out of range.
    pub fn with(self, type_index: usize, layout: &ComponentLayout) -> RegistryResult<Self> {
        layout.check_type(type_index)?;
        Ok(Self(self.0 | mask_bit(type_index)))
    }

    /// Raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> ComponentMask {
        self.0
    }

    /// True if an entity with `entity_mask` carries every required type.
    #[inline]
    #[must_use]
    pub const fn is_subset_of(self, entity_mask: ComponentMask) -> bool {
        entity_mask & self.0 == self.0
    }

    #[inline]
    fn accepts(self, mask: ComponentMask, flags: EntityFlags) -> bool {
        flags.is_alive() && self.is_subset_of(mask)
    }
}

/// Reusable result buffer.
///
/// Each [`QueryEngine::run`] overwrites the buffer; the returned
/// [`QueryResult`] borrows it, so a result cannot outlive the next query.
#[derive(Debug, Default)]
pub struct QueryEngine {
    /// Matching ids of the last query.
    results: Vec<EntityId>,
}

impl QueryEngine {
    /// Creates an engine whose buffer can hold `capacity` ids.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::OutOfMemory`] if the buffer cannot be
    /// allocated.
    pub fn new(capacity: usize) -> RegistryResult<Self> {
        let mut engine = Self::default();
        engine.reserve_to(capacity)?;
        Ok(engine)
    }

    /// Current buffer capacity in ids.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.results.capacity()
    }

    /// Ensures the buffer can hold `new_capacity` ids without reallocating
    /// during a scan.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::OutOfMemory`] if the reservation fails.
    pub fn reserve_to(&mut self, new_capacity: usize) -> RegistryResult<()> {
        let additional = new_capacity.saturating_sub(self.results.len());
        self.results
            .try_reserve_exact(additional)
            .map_err(|_| RegistryError::OutOfMemory {
                requested_bytes: additional * std::mem::size_of::<EntityId>(),
            })
    }

    /// Scans `entities` and fills the buffer with every live match.
    pub fn run(&mut self, query: QueryMask, entities: &EntityStore) -> QueryResult<'_> {
        self.results.clear();
        self.results.extend(scan(query, entities));
        QueryResult {
            ids: &self.results,
        }
    }
}

/// Builds a lazy scan over `entities` without touching any buffer.
#[must_use]
pub fn scan(query: QueryMask, entities: &EntityStore) -> QueryIter<'_> {
    QueryIter {
        masks: entities.masks(),
        flags: entities.flags(),
        query,
        next: 0,
    }
}

/// Borrowed view of the engine's result buffer.
///
/// Valid until the next query on the same registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryResult<'a> {
    /// Matching ids in ascending order.
    ids: &'a [EntityId],
}

impl<'a> QueryResult<'a> {
    /// Number of matches.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.ids.len()
    }

    /// Checks if nothing matched.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Matching ids in ascending order.
    #[inline]
    #[must_use]
    pub const fn as_slice(&self) -> &'a [EntityId] {
        self.ids
    }

    /// Iterates matching ids in ascending order.
    #[inline]
    pub fn iter(&self) -> Copied<slice::Iter<'a, EntityId>> {
        self.ids.iter().copied()
    }

    /// Checks membership by binary search over the sorted ids.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Copies the ids out so they survive the next query.
    #[must_use]
    pub fn to_vec(&self) -> Vec<EntityId> {
        self.ids.to_vec()
    }
}

impl<'a> IntoIterator for QueryResult<'a> {
    type Item = EntityId;
    type IntoIter = Copied<slice::Iter<'a, EntityId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter().copied()
    }
}

impl<'a> IntoIterator for &QueryResult<'a> {
    type Item = EntityId;
    type IntoIter = Copied<slice::Iter<'a, EntityId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter().copied()
    }
}

/// Lazy query scan. Same matching rule and ordering as [`QueryEngine::run`].
#[derive(Clone, Debug)]
pub struct QueryIter<'a> {
    masks: &'a [ComponentMask],
    flags: &'a [EntityFlags],
    query: QueryMask,
    next: usize,
}

impl Iterator for QueryIter<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        while self.next < self.masks.len() {
            let idx = self.next;
            self.next += 1;
            if self.query.accepts(self.masks[idx], self.flags[idx]) {
                return u32::try_from(idx).ok().map(EntityId::new);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.masks.len() - self.next))
    }
}
