//! # Component Layout
//!
//! Every entity slot owns one fixed-stride bundle holding space for every
//! registered component type, back to back:
//!
//! ```text
//! sizes   = [4, 8, 2]
//! offsets = [0, 4, 12]
//! stride  = 14
//!
//! bundle: | type 0 (4B) | type 1 (8B) | type 2 (2B) |
//! ```
//!
//! The layout is computed once and never changes, so the address of any
//! component is `slot * stride + offsets[type]`.

use crate::config::ComponentDescriptor;
use crate::error::{RegistryError, RegistryResult};

/// Membership bitmask: bit `i` set iff component type `i` is attached.
pub type ComponentMask = u32;

/// Maximum number of component types (width of [`ComponentMask`]).
pub const MAX_COMPONENT_TYPES: usize = ComponentMask::BITS as usize;

/// Returns the mask bit for a component type.
///
/// `type_index` must be below [`MAX_COMPONENT_TYPES`].
#[inline]
#[must_use]
pub const fn mask_bit(type_index: usize) -> ComponentMask {
    debug_assert!(type_index < MAX_COMPONENT_TYPES);
    1 << type_index
}

/// Immutable size/offset tables for the registered component types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentLayout {
    /// Size in bytes of each type.
    sizes: Box<[usize]>,
    /// Offset of each type within a bundle.
    offsets: Box<[usize]>,
    /// Diagnostic names.
    names: Box<[Option<String>]>,
    /// Sum of all sizes.
    stride: usize,
}

impl ComponentLayout {
    /// Builds a layout from ordered descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::TooManyComponentTypes`] if more than
    /// [`MAX_COMPONENT_TYPES`] descriptors are given, or
    /// [`RegistryError::InvalidConfig`] if the stride overflows.
    pub fn new(descriptors: &[ComponentDescriptor]) -> RegistryResult<Self> {
        if descriptors.len() > MAX_COMPONENT_TYPES {
            return Err(RegistryError::TooManyComponentTypes {
                count: descriptors.len(),
                max: MAX_COMPONENT_TYPES,
            });
        }

        let mut offsets = Vec::with_capacity(descriptors.len());
        let mut stride = 0usize;
        for descriptor in descriptors {
            offsets.push(stride);
            stride = stride.checked_add(descriptor.size).ok_or_else(|| {
                RegistryError::InvalidConfig("bundle stride overflows usize".to_string())
            })?;
        }

        Ok(Self {
            sizes: descriptors.iter().map(|d| d.size).collect(),
            offsets: offsets.into_boxed_slice(),
            names: descriptors.iter().map(|d| d.name.clone()).collect(),
            stride,
        })
    }

    /// Builds a layout from plain byte sizes.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_sizes(sizes: &[usize]) -> RegistryResult<Self> {
        let descriptors: Vec<_> = sizes.iter().copied().map(ComponentDescriptor::new).collect();
        Self::new(&descriptors)
    }

    /// Number of registered component types.
    #[inline]
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.sizes.len()
    }

    /// Bytes reserved per entity slot.
    #[inline]
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Validates a type index.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] if out of range.
    #[inline]
    pub fn check_type(&self, type_index: usize) -> RegistryResult<()> {
        if type_index < self.type_count() {
            Ok(())
        } else {
            Err(RegistryError::UnknownComponentType {
                index: type_index,
                count: self.type_count(),
            })
        }
    }

    /// Size in bytes of one instance of a type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] if out of range.
    #[inline]
    pub fn size_of(&self, type_index: usize) -> RegistryResult<usize> {
        self.check_type(type_index)?;
        Ok(self.sizes[type_index])
    }

    /// Offset of a type within a bundle.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] if out of range.
    #[inline]
    pub fn offset_of(&self, type_index: usize) -> RegistryResult<usize> {
        self.check_type(type_index)?;
        Ok(self.offsets[type_index])
    }

    /// Diagnostic name of a type, if one was configured.
    #[must_use]
    pub fn name_of(&self, type_index: usize) -> Option<&str> {
        self.names.get(type_index)?.as_deref()
    }

    /// Sizes in type-index order.
    #[must_use]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Offsets in type-index order.
    #[must_use]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }
}
