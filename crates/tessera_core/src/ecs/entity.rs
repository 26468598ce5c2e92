//! # Entity Management
//!
//! Entities are plain 32-bit indices. Each index owns one slot in two
//! parallel arrays:
//! - A membership mask (which component types are attached)
//! - A liveness flag
//!
//! Killed indices are recycled through the [`IdPool`], so an id is unique
//! among live entities but may denote different entities over time.

use std::fmt;

use super::layout::{mask_bit, ComponentMask};
use crate::error::{RegistryError, RegistryResult};
use crate::memory::IdPool;

/// Identifier of an entity inside one registry.
///
/// Ids are dense: they are minted sequentially from zero and reused after
/// the entity is killed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates an entity id from its raw index.
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw 32-bit value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the id as an array index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Per-slot state bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct EntityFlags(u8);

impl EntityFlags {
    /// Set while the entity is live.
    pub const ALIVE: Self = Self(1);

    /// No flags set (dead or never issued).
    pub const EMPTY: Self = Self(0);

    /// Checks the alive bit.
    #[inline]
    #[must_use]
    pub const fn is_alive(self) -> bool {
        self.0 & Self::ALIVE.0 != 0
    }
}

/// Id-indexed masks and liveness flags, plus the pool of recycled ids.
///
/// Both arrays always have `capacity` slots; only `0..count` have ever been
/// issued. Growth is two-phase (`reserve_to` then `commit_growth`) so the
/// registry can grow every co-indexed array or none of them.
#[derive(Debug)]
pub struct EntityStore {
    /// Membership mask per slot.
    masks: Vec<ComponentMask>,
    /// Liveness flag per slot.
    flags: Vec<EntityFlags>,
    /// Ids freed by `kill`.
    pool: IdPool,
    /// Number of ids ever minted (live or dead).
    count: usize,
    /// Number of live entities.
    alive_count: usize,
    /// Number of slots backed by the arrays.
    capacity: usize,
}

impl EntityStore {
    /// Creates a store with `capacity` pre-allocated slots.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::OutOfMemory`] if the arrays cannot be
    /// allocated.
    pub fn new(capacity: usize) -> RegistryResult<Self> {
        let mut store = Self {
            masks: Vec::new(),
            flags: Vec::new(),
            pool: IdPool::new(),
            count: 0,
            alive_count: 0,
            capacity: 0,
        };
        store.reserve_to(capacity)?;
        store.commit_growth(capacity);
        Ok(store)
    }

    /// Number of ids minted so far, including dead ones.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Number of slots currently backed by memory.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of dead ids waiting for reuse.
    #[inline]
    #[must_use]
    pub fn recyclable(&self) -> usize {
        self.pool.len()
    }

    /// True when issuing another id requires growth.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.pool.is_empty() && self.count == self.capacity
    }

    /// Reserves memory so both arrays can hold `new_capacity` slots.
    ///
    /// Does not change any observable state.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::OutOfMemory`] if either reservation fails.
    pub fn reserve_to(&mut self, new_capacity: usize) -> RegistryResult<()> {
        let additional = new_capacity.saturating_sub(self.masks.len());
        self.masks.try_reserve_exact(additional).map_err(|_| {
            RegistryError::OutOfMemory {
                requested_bytes: additional * std::mem::size_of::<ComponentMask>(),
            }
        })?;
        self.flags.try_reserve_exact(additional).map_err(|_| {
            RegistryError::OutOfMemory {
                requested_bytes: additional * std::mem::size_of::<EntityFlags>(),
            }
        })?;
        Ok(())
    }

    /// Extends both arrays to `new_capacity` slots.
    ///
    /// Must follow a successful [`Self::reserve_to`] with the same capacity;
    /// the resize then never allocates.
    pub fn commit_growth(&mut self, new_capacity: usize) {
        if new_capacity <= self.capacity {
            return;
        }
        self.masks.resize(new_capacity, 0);
        self.flags.resize(new_capacity, EntityFlags::EMPTY);
        self.capacity = new_capacity;
    }

    /// Issues an id: a recycled one if available, else the next fresh one.
    ///
    /// The slot is reset to an empty mask and marked alive. The caller must
    /// have grown the store if [`Self::is_full`] was true.
    pub(crate) fn issue(&mut self) -> EntityId {
        let id = match self.pool.pop() {
            Ok(id) => id,
            Err(_) => {
                debug_assert!(self.count < self.capacity, "issue() on a full store");
                // Capacity never exceeds u32::MAX, so count fits.
                #[allow(clippy::cast_possible_truncation)]
                let id = EntityId::new(self.count as u32);
                self.count += 1;
                id
            }
        };

        let idx = id.index();
        self.masks[idx] = 0;
        self.flags[idx] = EntityFlags::ALIVE;
        self.alive_count += 1;
        id
    }

    /// Kills an entity and returns its id to the pool.
    ///
    /// Returns `Ok(false)` if the entity was already dead.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownEntity`] if the id was never issued.
    pub fn kill(&mut self, id: EntityId) -> RegistryResult<bool> {
        let idx = self.slot(id)?;
        if !self.flags[idx].is_alive() {
            return Ok(false);
        }

        self.flags[idx] = EntityFlags::EMPTY;
        self.masks[idx] = 0;
        self.alive_count -= 1;
        self.pool.push(id);
        Ok(true)
    }

    /// Checks whether `id` refers to a live entity.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        id.index() < self.count && self.flags[id.index()].is_alive()
    }

    /// Validates that `id` is live and returns its slot index.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownEntity`] for never-issued ids and
    /// [`RegistryError::DeadEntity`] for killed ones.
    pub fn check_alive(&self, id: EntityId) -> RegistryResult<usize> {
        let idx = self.slot(id)?;
        if self.flags[idx].is_alive() {
            Ok(idx)
        } else {
            Err(RegistryError::DeadEntity(id))
        }
    }

    /// Returns the membership mask of a live entity.
    ///
    /// # Errors
    ///
    /// See [`Self::check_alive`].
    pub fn mask(&self, id: EntityId) -> RegistryResult<ComponentMask> {
        let idx = self.check_alive(id)?;
        Ok(self.masks[idx])
    }

    /// Marks component type `type_index` as attached.
    ///
    /// `type_index` must already be validated against the layout.
    ///
    /// # Errors
    ///
    /// See [`Self::check_alive`].
    pub fn set_component(&mut self, id: EntityId, type_index: usize) -> RegistryResult<()> {
        let idx = self.check_alive(id)?;
        self.masks[idx] |= mask_bit(type_index);
        Ok(())
    }

    /// Marks component type `type_index` as detached. No-op if absent.
    ///
    /// # Errors
    ///
    /// See [`Self::check_alive`].
    pub fn clear_component(&mut self, id: EntityId, type_index: usize) -> RegistryResult<()> {
        let idx = self.check_alive(id)?;
        self.masks[idx] &= !mask_bit(type_index);
        Ok(())
    }

    /// Checks whether component type `type_index` is attached.
    ///
    /// # Errors
    ///
    /// See [`Self::check_alive`].
    pub fn has_component(&self, id: EntityId, type_index: usize) -> RegistryResult<bool> {
        let idx = self.check_alive(id)?;
        Ok(self.masks[idx] & mask_bit(type_index) != 0)
    }

    /// Masks of every issued slot, indexed by id.
    #[inline]
    #[must_use]
    pub fn masks(&self) -> &[ComponentMask] {
        &self.masks[..self.count]
    }

    /// Flags of every issued slot, indexed by id.
    #[inline]
    #[must_use]
    pub fn flags(&self) -> &[EntityFlags] {
        &self.flags[..self.count]
    }

    fn slot(&self, id: EntityId) -> RegistryResult<usize> {
        let idx = id.index();
        if idx < self.count {
            Ok(idx)
        } else {
            Err(RegistryError::UnknownEntity(id))
        }
    }
}
