//! # Component Storage
//!
//! One contiguous byte buffer holding a fixed-stride bundle per entity slot.
//!
//! The storage uses a packed bundle strategy:
//! - Every slot reserves space for every component type, attached or not
//! - Access is O(1) via `slot * stride + offset`
//! - Growth reallocates the whole buffer and preserves existing bytes
//!
//! Reserving space unconditionally wastes memory for sparse entities; in
//! exchange there is no per-type indirection.

use std::ops::Range;

use super::entity::EntityId;
use super::layout::ComponentLayout;
use crate::error::{RegistryError, RegistryResult};

/// Packed bundle buffer plus the layout describing it.
///
/// # Example
///
/// ```rust,ignore
/// let layout = ComponentLayout::from_sizes(&[4, 8])?;
/// let mut store = ComponentStore::new(layout, 32)?;
///
/// store.write(EntityId::new(0), 0, &[1, 2, 3, 4])?;
/// assert_eq!(store.component_bytes(EntityId::new(0), 0)?, &[1, 2, 3, 4]);
/// ```
#[derive(Debug)]
pub struct ComponentStore {
    /// Size/offset tables, fixed for the store's lifetime.
    layout: ComponentLayout,
    /// `capacity * stride` bytes.
    data: Vec<u8>,
    /// Number of bundle slots backed by `data`.
    capacity: usize,
}

impl ComponentStore {
    /// Creates a store with `capacity` zeroed bundle slots.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::OutOfMemory`] if the buffer cannot be
    /// allocated.
    pub fn new(layout: ComponentLayout, capacity: usize) -> RegistryResult<Self> {
        let mut store = Self {
            layout,
            data: Vec::new(),
            capacity: 0,
        };
        store.reserve_to(capacity)?;
        store.commit_growth(capacity);
        Ok(store)
    }

    /// Returns the layout.
    #[inline]
    #[must_use]
    pub const fn layout(&self) -> &ComponentLayout {
        &self.layout
    }

    /// Number of bundle slots.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total bytes backing the bundles.
    #[inline]
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Reserves memory for `new_capacity` slots without changing contents.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::OutOfMemory`] if the byte count overflows or
    /// the allocator refuses the reservation.
    pub fn reserve_to(&mut self, new_capacity: usize) -> RegistryResult<()> {
        let target = self.bytes_for(new_capacity)?;
        let additional = target.saturating_sub(self.data.len());
        self.data
            .try_reserve_exact(additional)
            .map_err(|_| RegistryError::OutOfMemory {
                requested_bytes: additional,
            })
    }

    /// Extends the buffer to `new_capacity` slots, zero-filling new bytes.
    ///
    /// Must follow a successful [`Self::reserve_to`]. Never shrinks.
    pub fn commit_growth(&mut self, new_capacity: usize) {
        if new_capacity <= self.capacity {
            return;
        }
        // reserve_to already proved the multiplication does not overflow
        let target = new_capacity * self.layout.stride();
        self.data.resize(target, 0);
        self.capacity = new_capacity;
    }

    /// Byte range of one component inside the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] for a bad type index
    /// or [`RegistryError::UnknownEntity`] if the slot is beyond capacity.
    pub fn address_of(&self, id: EntityId, type_index: usize) -> RegistryResult<Range<usize>> {
        let size = self.layout.size_of(type_index)?;
        let offset = self.layout.offset_of(type_index)?;
        let start = self.bundle_start(id)? + offset;
        Ok(start..start + size)
    }

    /// Bytes of one component.
    ///
    /// # Errors
    ///
    /// See [`Self::address_of`].
    #[inline]
    pub fn component_bytes(&self, id: EntityId, type_index: usize) -> RegistryResult<&[u8]> {
        let range = self.address_of(id, type_index)?;
        Ok(&self.data[range])
    }

    /// Mutable bytes of one component.
    ///
    /// # Errors
    ///
    /// See [`Self::address_of`].
    #[inline]
    pub fn component_bytes_mut(
        &mut self,
        id: EntityId,
        type_index: usize,
    ) -> RegistryResult<&mut [u8]> {
        let range = self.address_of(id, type_index)?;
        Ok(&mut self.data[range])
    }

    /// Copies `bytes` into a component's storage.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SizeMismatch`] if `bytes` is not exactly the
    /// registered size, or any error from [`Self::address_of`].
    pub fn write(&mut self, id: EntityId, type_index: usize, bytes: &[u8]) -> RegistryResult<()> {
        let range = self.address_of(id, type_index)?;
        if bytes.len() != range.len() {
            return Err(RegistryError::SizeMismatch {
                index: type_index,
                expected: range.len(),
                actual: bytes.len(),
            });
        }
        self.data[range].copy_from_slice(bytes);
        Ok(())
    }

    /// The whole bundle of one slot.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownEntity`] if the slot is beyond
    /// capacity.
    pub fn bundle(&self, id: EntityId) -> RegistryResult<&[u8]> {
        let start = self.bundle_start(id)?;
        Ok(&self.data[start..start + self.layout.stride()])
    }

    fn bundle_start(&self, id: EntityId) -> RegistryResult<usize> {
        if id.index() >= self.capacity {
            return Err(RegistryError::UnknownEntity(id));
        }
        Ok(id.index() * self.layout.stride())
    }

    fn bytes_for(&self, capacity: usize) -> RegistryResult<usize> {
        capacity
            .checked_mul(self.layout.stride())
            .ok_or(RegistryError::OutOfMemory {
                requested_bytes: usize::MAX,
            })
    }
}
