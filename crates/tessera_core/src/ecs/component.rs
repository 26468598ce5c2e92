//! # Component System
//!
//! Components are pure data records with no behavior. The registry stores
//! them as raw bytes; the [`Component`] trait and [`ComponentType`] handle
//! add a typed, size-checked view on top.

use std::fmt;
use std::marker::PhantomData;

use bytemuck::{Pod, Zeroable};

/// Marker trait for typed component access.
///
/// Components must be:
/// - `Pod`: Plain old data, any byte pattern is a valid value
/// - `Zeroable`: Freshly grown bundle bytes are zero
///
/// Bundles are tightly packed, so component bytes may be unaligned; typed
/// reads and writes always copy.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Pod, Zeroable)]
/// #[repr(C)]
/// struct Health {
///     current: u32,
///     max: u32,
/// }
///
/// impl Component for Health {}
/// ```
pub trait Component: Pod + Zeroable + 'static {}

/// Typed handle to a registered component type.
///
/// Obtained from `Registry::component_type`, which checks that
/// `size_of::<C>()` matches the registered size, so typed access through
/// the handle never reads a short or oversized region.
pub struct ComponentType<C: Component> {
    /// Type index in the layout.
    index: usize,
    /// Marker for component type.
    _phantom: PhantomData<fn() -> C>,
}

impl<C: Component> ComponentType<C> {
    pub(crate) const fn new(index: usize) -> Self {
        Self {
            index,
            _phantom: PhantomData,
        }
    }

    /// Returns the type index this handle refers to.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }
}

impl<C: Component> Clone for ComponentType<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Component> Copy for ComponentType<C> {}

impl<C: Component> PartialEq for ComponentType<C> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<C: Component> Eq for ComponentType<C> {}

impl<C: Component> fmt::Debug for ComponentType<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentType")
            .field("index", &self.index)
            .field("type", &std::any::type_name::<C>())
            .finish()
    }
}
