//! # Registry
//!
//! The public surface: composes the component store, entity store and
//! query engine, and keeps their capacities in lockstep.
//!
//! ## Growth
//!
//! ```text
//! create() with no recycled id and count == capacity:
//!   1. reserve  component buffer, masks, flags, query buffer  (fallible)
//!   2. commit   all four                                       (infallible)
//! ```
//!
//! A failed reservation returns `OutOfMemory` before anything is committed,
//! so a registry is never left partially grown.

use bytemuck::{bytes_of, pod_read_unaligned};

use super::component::{Component, ComponentType};
use super::entity::{EntityId, EntityStore};
use super::layout::{ComponentLayout, ComponentMask};
use super::query::{self, QueryEngine, QueryIter, QueryMask, QueryResult};
use super::storage::ComponentStore;
use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};

/// Largest number of entity slots a registry can address.
pub const MAX_ENTITIES: usize = u32::MAX as usize;

/// Entity-component registry with packed bundles and bitmask queries.
///
/// Not thread-safe: callers that share a registry must serialize access.
/// Slices handed out by [`Self::get`], [`Self::get_mut`] and [`Self::query`]
/// borrow the registry, so they cannot be held across a call that may grow
/// the buffers.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = Registry::with_sizes(&[4, 8])?;
///
/// let e = registry.create()?;
/// registry.add(e, 0, &[1, 2, 3, 4])?;
/// registry.add(e, 1, &[0; 8])?;
///
/// assert_eq!(registry.query(&[0, 1])?.as_slice(), &[e]);
/// ```
#[derive(Debug)]
pub struct Registry {
    /// Packed bundles and the layout.
    components: ComponentStore,
    /// Masks, liveness flags and the id pool.
    entities: EntityStore,
    /// Reused query buffer.
    queries: QueryEngine,
}

impl Registry {
    /// Builds a registry from a config.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] or
    /// [`RegistryError::TooManyComponentTypes`] for a bad config, and
    /// [`RegistryError::OutOfMemory`] if the initial buffers cannot be
    /// allocated.
    pub fn new(config: &RegistryConfig) -> RegistryResult<Self> {
        config.validate()?;
        let layout = ComponentLayout::new(&config.components)?;
        let capacity = config.initial_capacity;

        let registry = Self {
            components: ComponentStore::new(layout, capacity)?,
            entities: EntityStore::new(capacity)?,
            queries: QueryEngine::new(capacity)?,
        };

        tracing::info!(
            "registry initialized: {} component types, stride {} bytes, capacity {}",
            registry.layout().type_count(),
            registry.layout().stride(),
            capacity
        );
        Ok(registry)
    }

    /// Builds a registry from plain component sizes with default capacity.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn with_sizes(sizes: &[usize]) -> RegistryResult<Self> {
        Self::new(&RegistryConfig::from_sizes(sizes))
    }

    /// The component layout fixed at construction.
    #[inline]
    #[must_use]
    pub const fn layout(&self) -> &ComponentLayout {
        self.components.layout()
    }

    /// Number of slots backed by memory.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.entities.capacity()
    }

    /// Number of ids minted so far, including dead ones.
    #[inline]
    #[must_use]
    pub const fn entity_count(&self) -> usize {
        self.entities.count()
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.entities.alive_count()
    }

    /// Checks whether `id` refers to a live entity.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.is_alive(id)
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Creates an entity with no components.
    ///
    /// Reuses the most recently killed id if there is one, otherwise mints
    /// the next sequential id, doubling capacity when full.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::OutOfMemory`] if growth fails (the registry
    /// is unchanged) or [`RegistryError::EntityLimitReached`] once every
    /// 32-bit id is in use.
    pub fn create(&mut self) -> RegistryResult<EntityId> {
        if self.entities.is_full() {
            self.grow()?;
        }
        let id = self.entities.issue();
        tracing::trace!("created entity {}", id);
        Ok(id)
    }

    /// Kills an entity: clears its mask and recycles its id.
    ///
    /// Killing a dead entity is a no-op. Component bytes are left in place
    /// and overwritten by later adds.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownEntity`] if the id was never issued.
    pub fn kill(&mut self, id: EntityId) -> RegistryResult<()> {
        if self.entities.kill(id)? {
            tracing::trace!("killed entity {}", id);
        }
        Ok(())
    }

    fn grow(&mut self) -> RegistryResult<()> {
        let old = self.capacity();
        let new = old.saturating_mul(2).min(MAX_ENTITIES);
        if new <= old {
            return Err(RegistryError::EntityLimitReached { max: MAX_ENTITIES });
        }

        if let Err(err) = self.reserve_all(new) {
            tracing::warn!("registry growth {} -> {} failed: {}", old, new, err);
            return Err(err);
        }

        self.components.commit_growth(new);
        self.entities.commit_growth(new);
        tracing::debug!(
            "registry grew from {} to {} slots ({} bundle bytes)",
            old,
            new,
            self.components.byte_len()
        );
        Ok(())
    }

    fn reserve_all(&mut self, new_capacity: usize) -> RegistryResult<()> {
        self.components.reserve_to(new_capacity)?;
        self.entities.reserve_to(new_capacity)?;
        self.queries.reserve_to(new_capacity)
    }

    // =========================================================================
    // Raw component access
    // =========================================================================

    /// Copies `bytes` into a component slot and marks it attached.
    ///
    /// Adding a component that is already attached overwrites its data.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownEntity`], [`RegistryError::DeadEntity`],
    /// [`RegistryError::UnknownComponentType`], or
    /// [`RegistryError::SizeMismatch`] when `bytes` has the wrong length.
    /// Nothing is modified on error.
    pub fn add(&mut self, id: EntityId, type_index: usize, bytes: &[u8]) -> RegistryResult<()> {
        self.check(id, type_index)?;
        self.components.write(id, type_index, bytes)?;
        self.entities.set_component(id, type_index)
    }

    /// Detaches a component. Data bytes are left untouched.
    ///
    /// Removing an absent component is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownEntity`], [`RegistryError::DeadEntity`]
    /// or [`RegistryError::UnknownComponentType`].
    pub fn remove(&mut self, id: EntityId, type_index: usize) -> RegistryResult<()> {
        self.check(id, type_index)?;
        self.entities.clear_component(id, type_index)
    }

    /// Checks whether a component is attached.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownEntity`], [`RegistryError::DeadEntity`]
    /// or [`RegistryError::UnknownComponentType`].
    pub fn has(&self, id: EntityId, type_index: usize) -> RegistryResult<bool> {
        self.check(id, type_index)?;
        self.entities.has_component(id, type_index)
    }

    /// Membership mask of a live entity.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownEntity`] or [`RegistryError::DeadEntity`].
    pub fn mask(&self, id: EntityId) -> RegistryResult<ComponentMask> {
        self.entities.mask(id)
    }

    /// Storage bytes of a component slot.
    ///
    /// The slot exists whether or not the component is attached; after a
    /// `remove` it still holds the last added bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownEntity`], [`RegistryError::DeadEntity`]
    /// or [`RegistryError::UnknownComponentType`].
    pub fn get(&self, id: EntityId, type_index: usize) -> RegistryResult<&[u8]> {
        self.check(id, type_index)?;
        self.components.component_bytes(id, type_index)
    }

    /// Mutable storage bytes of a component slot. Does not touch the mask.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn get_mut(&mut self, id: EntityId, type_index: usize) -> RegistryResult<&mut [u8]> {
        self.check(id, type_index)?;
        self.components.component_bytes_mut(id, type_index)
    }

    fn check(&self, id: EntityId, type_index: usize) -> RegistryResult<()> {
        self.layout().check_type(type_index)?;
        self.entities.check_alive(id)?;
        Ok(())
    }

    // =========================================================================
    // Typed component access
    // =========================================================================

    /// Returns a typed handle for `type_index`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] if out of range, or
    /// [`RegistryError::SizeMismatch`] if `C` is not exactly the registered
    /// size.
    pub fn component_type<C: Component>(
        &self,
        type_index: usize,
    ) -> RegistryResult<ComponentType<C>> {
        let expected = self.layout().size_of(type_index)?;
        let actual = std::mem::size_of::<C>();
        if expected != actual {
            return Err(RegistryError::SizeMismatch {
                index: type_index,
                expected,
                actual,
            });
        }
        Ok(ComponentType::new(type_index))
    }

    /// Typed [`Self::add`].
    ///
    /// # Errors
    ///
    /// See [`Self::add`].
    pub fn insert<C: Component>(
        &mut self,
        id: EntityId,
        ty: ComponentType<C>,
        value: C,
    ) -> RegistryResult<()> {
        self.add(id, ty.index(), bytes_of(&value))
    }

    /// Copies out a component value, or `None` if it is not attached.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownEntity`] or [`RegistryError::DeadEntity`].
    pub fn read<C: Component>(
        &self,
        id: EntityId,
        ty: ComponentType<C>,
    ) -> RegistryResult<Option<C>> {
        if !self.has(id, ty.index())? {
            return Ok(None);
        }
        let bytes = self.components.component_bytes(id, ty.index())?;
        Ok(Some(pod_read_unaligned(bytes)))
    }

    /// Edits an attached component through a closure and stores the result.
    ///
    /// Returns `None` without calling `f` if the component is not attached.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownEntity`] or [`RegistryError::DeadEntity`].
    pub fn write_with<C: Component, R>(
        &mut self,
        id: EntityId,
        ty: ComponentType<C>,
        f: impl FnOnce(&mut C) -> R,
    ) -> RegistryResult<Option<R>> {
        if !self.has(id, ty.index())? {
            return Ok(None);
        }
        let bytes = self.components.component_bytes_mut(id, ty.index())?;
        let mut value: C = pod_read_unaligned(bytes);
        let out = f(&mut value);
        bytes.copy_from_slice(bytes_of(&value));
        Ok(Some(out))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All live entities carrying every type in `types`, ascending by id.
    ///
    /// The result borrows the registry's reused buffer and is overwritten by
    /// the next query. An empty `types` matches every live entity.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] for any bad index.
    pub fn query(&mut self, types: &[usize]) -> RegistryResult<QueryResult<'_>> {
        let mask = QueryMask::from_types(types, self.layout())?;
        Ok(self.query_mask(mask))
    }

    /// [`Self::query`] with a prebuilt mask.
    pub fn query_mask(&mut self, mask: QueryMask) -> QueryResult<'_> {
        self.queries.run(mask, &self.entities)
    }

    /// Lazy alternative to [`Self::query`] that does not use the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] for any bad index.
    pub fn query_iter(&self, types: &[usize]) -> RegistryResult<QueryIter<'_>> {
        let mask = QueryMask::from_types(types, self.layout())?;
        Ok(query::scan(mask, &self.entities))
    }

    /// Iterates every live entity in ascending id order.
    pub fn iter_alive(&self) -> QueryIter<'_> {
        query::scan(QueryMask::empty(), &self.entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::{Pod, Zeroable};

    #[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Position {
        x: f32,
        y: f32,
        z: f32,
    }

    impl Component for Position {}

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
    #[repr(C)]
    struct Health {
        current: u32,
    }

    impl Component for Health {}

    #[test]
    fn test_registry_creation() {
        let registry = Registry::with_sizes(&[4, 8]).unwrap();
        assert_eq!(registry.capacity(), 32);
        assert_eq!(registry.entity_count(), 0);
        assert_eq!(registry.layout().stride(), 12);
    }

    #[test]
    fn test_add_has_remove() {
        let mut registry = Registry::with_sizes(&[4, 8]).unwrap();
        let e = registry.create().unwrap();

        registry.add(e, 0, &[1, 2, 3, 4]).unwrap();
        assert!(registry.has(e, 0).unwrap());
        assert!(!registry.has(e, 1).unwrap());
        assert_eq!(registry.get(e, 0).unwrap(), &[1, 2, 3, 4]);

        registry.remove(e, 0).unwrap();
        registry.remove(e, 0).unwrap();
        assert!(!registry.has(e, 0).unwrap());
        // Stale bytes survive remove
        assert_eq!(registry.get(e, 0).unwrap(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_add_overwrites() {
        let mut registry = Registry::with_sizes(&[2]).unwrap();
        let e = registry.create().unwrap();
        registry.add(e, 0, &[1, 1]).unwrap();
        registry.add(e, 0, &[2, 2]).unwrap();
        assert_eq!(registry.get(e, 0).unwrap(), &[2, 2]);
    }

    #[test]
    fn test_get_mut_edits_in_place() {
        let mut registry = Registry::with_sizes(&[4]).unwrap();
        let e = registry.create().unwrap();
        registry.add(e, 0, &[0; 4]).unwrap();
        registry.get_mut(e, 0).unwrap()[0] = 42;
        assert_eq!(registry.get(e, 0).unwrap(), &[42, 0, 0, 0]);
    }

    #[test]
    fn test_failed_add_changes_nothing() {
        let mut registry = Registry::with_sizes(&[4]).unwrap();
        let e = registry.create().unwrap();

        let err = registry.add(e, 0, &[1, 2]).unwrap_err();
        assert!(matches!(err, RegistryError::SizeMismatch { .. }));
        assert!(!registry.has(e, 0).unwrap());
        assert_eq!(registry.get(e, 0).unwrap(), &[0; 4]);
    }

    #[test]
    fn test_dead_entity_access_is_error() {
        let mut registry = Registry::with_sizes(&[4]).unwrap();
        let e = registry.create().unwrap();
        registry.kill(e).unwrap();

        assert_eq!(registry.has(e, 0), Err(RegistryError::DeadEntity(e)));
        assert_eq!(registry.get(e, 0), Err(RegistryError::DeadEntity(e)));
        assert_eq!(registry.add(e, 0, &[0; 4]), Err(RegistryError::DeadEntity(e)));
        assert_eq!(registry.remove(e, 0), Err(RegistryError::DeadEntity(e)));
        assert_eq!(registry.kill(e), Ok(()));
    }

    #[test]
    fn test_unknown_entity_and_type() {
        let mut registry = Registry::with_sizes(&[4]).unwrap();
        let e = registry.create().unwrap();
        let stranger = EntityId::new(9);

        assert_eq!(registry.has(stranger, 0), Err(RegistryError::UnknownEntity(stranger)));
        assert_eq!(registry.kill(stranger), Err(RegistryError::UnknownEntity(stranger)));
        assert_eq!(
            registry.get(e, 1),
            Err(RegistryError::UnknownComponentType { index: 1, count: 1 })
        );
        assert!(registry.query(&[5]).is_err());
    }

    #[test]
    fn test_typed_access() {
        let config = RegistryConfig::default()
            .with_component(crate::config::ComponentDescriptor::of::<Position>())
            .with_component(crate::config::ComponentDescriptor::of::<Health>());
        let mut registry = Registry::new(&config).unwrap();
        let pos = registry.component_type::<Position>(0).unwrap();
        let hp = registry.component_type::<Health>(1).unwrap();

        let e = registry.create().unwrap();
        assert_eq!(registry.read(e, pos).unwrap(), None);

        registry
            .insert(e, pos, Position { x: 1.0, y: 2.0, z: 3.0 })
            .unwrap();
        registry.insert(e, hp, Health { current: 100 }).unwrap();

        // Health sits at offset 12; read must cope with any alignment.
        assert_eq!(registry.read(e, hp).unwrap(), Some(Health { current: 100 }));

        let out = registry.write_with(e, pos, |p| {
            p.x += 10.0;
            p.x
        });
        assert_eq!(out, Ok(Some(11.0)));
        let p = registry.read(e, pos).unwrap().unwrap();
        assert!((p.x - 11.0).abs() < f32::EPSILON);
        assert!((p.y - 2.0).abs() < f32::EPSILON);
        assert!((p.z - 3.0).abs() < f32::EPSILON);

        registry.remove(e, hp.index()).unwrap();
        assert_eq!(registry.write_with(e, hp, |h| h.current = 0), Ok(None));
    }

    #[test]
    fn test_typed_handle_size_check() {
        let registry = Registry::with_sizes(&[4, 8]).unwrap();
        assert!(registry.component_type::<Health>(0).is_ok());
        assert_eq!(
            registry.component_type::<Health>(1),
            Err(RegistryError::SizeMismatch {
                index: 1,
                expected: 8,
                actual: 4
            })
        );
    }

    #[test]
    fn test_queries() {
        let mut registry = Registry::with_sizes(&[1, 1, 1]).unwrap();
        let a = registry.create().unwrap();
        let b = registry.create().unwrap();
        let c = registry.create().unwrap();
        registry.add(a, 0, &[0]).unwrap();
        registry.add(b, 0, &[0]).unwrap();
        registry.add(b, 1, &[0]).unwrap();
        registry.add(c, 1, &[0]).unwrap();

        assert_eq!(registry.query(&[0]).unwrap().to_vec(), vec![a, b]);
        assert_eq!(registry.query(&[0, 1]).unwrap().to_vec(), vec![b]);
        assert_eq!(registry.query(&[1]).unwrap().to_vec(), vec![b, c]);
        assert!(registry.query(&[2]).unwrap().is_empty());

        registry.kill(b).unwrap();
        assert_eq!(registry.query(&[1]).unwrap().to_vec(), vec![c]);
        assert_eq!(registry.iter_alive().collect::<Vec<_>>(), vec![a, c]);

        let lazy: Vec<_> = registry.query_iter(&[0]).unwrap().collect();
        assert_eq!(lazy, vec![a]);
    }

    #[test]
    fn test_recycled_entity_starts_empty() {
        let mut registry = Registry::with_sizes(&[4]).unwrap();
        let e = registry.create().unwrap();
        registry.add(e, 0, &[1; 4]).unwrap();
        registry.kill(e).unwrap();

        let again = registry.create().unwrap();
        assert_eq!(again, e);
        assert!(registry.is_alive(again));
        assert_eq!(registry.mask(again).unwrap(), 0);
        assert!(!registry.has(again, 0).unwrap());
        assert_eq!(registry.alive_count(), 1);
    }

    #[test]
    fn test_growth_doubles_capacity() {
        let config = RegistryConfig::from_sizes(&[4]).with_initial_capacity(2);
        let mut registry = Registry::new(&config).unwrap();
        for _ in 0..5 {
            registry.create().unwrap();
        }
        assert_eq!(registry.capacity(), 8);
        assert_eq!(registry.entity_count(), 5);
    }
}
