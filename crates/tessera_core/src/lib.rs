//! # TESSERA Core
//!
//! In-memory entity registry for real-time simulation loops:
//! - Fixed-stride component bundles with offsets computed once
//! - Entity ids recycled through a LIFO pool
//! - Bitmask queries answered by a linear scan, ascending id order
//!
//! ## Architecture Rules
//!
//! 1. **No unchecked access** - Every entity id and type index is validated
//! 2. **All-or-nothing growth** - Failed reservations leave the registry intact
//! 3. **Single-threaded** - Callers serialize access themselves
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::Registry;
//!
//! let mut registry = Registry::with_sizes(&[4, 8])?;
//! let e = registry.create()?;
//! registry.add(e, 0, &[1, 2, 3, 4])?;
//! assert!(registry.has(e, 0)?);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod memory;

pub use config::{ComponentDescriptor, RegistryConfig, DEFAULT_INITIAL_CAPACITY};
pub use ecs::{
    Component, ComponentLayout, ComponentMask, ComponentType, EntityId, QueryIter, QueryMask,
    QueryResult, Registry, MAX_COMPONENT_TYPES, MAX_ENTITIES,
};
pub use error::{RegistryError, RegistryResult};
pub use memory::IdPool;
