//! # Registry Error Types
//!
//! All errors that can occur while configuring or driving a registry.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors that can occur in the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A buffer could not be allocated or grown. Prior state is untouched.
    #[error("out of memory: failed to reserve {requested_bytes} bytes")]
    OutOfMemory {
        /// Number of bytes the failed reservation asked for.
        requested_bytes: usize,
    },

    /// Every addressable entity id is in use.
    #[error("entity limit reached: {max} slots")]
    EntityLimitReached {
        /// Largest slot count the id type can address.
        max: usize,
    },

    /// The entity id was never issued by this registry.
    #[error("unknown entity: {0}")]
    UnknownEntity(EntityId),

    /// The entity id was issued but has since been killed.
    #[error("entity {0} is dead")]
    DeadEntity(EntityId),

    /// The component type index is outside the configured layout.
    #[error("unknown component type {index} (registry has {count} types)")]
    UnknownComponentType {
        /// The requested type index.
        index: usize,
        /// Number of registered component types.
        count: usize,
    },

    /// The layout declares more component types than a mask can hold.
    #[error("too many component types: {count} (max {max})")]
    TooManyComponentTypes {
        /// Number of types requested.
        count: usize,
        /// Width of the membership mask.
        max: usize,
    },

    /// A payload or Rust type does not match the registered component size.
    #[error("size mismatch for component type {index}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Component type index.
        index: usize,
        /// Registered size in bytes.
        expected: usize,
        /// Size that was supplied.
        actual: usize,
    },

    /// Attempted to pop from an empty id pool.
    #[error("id pool is empty")]
    PoolEmpty,

    /// Invalid configuration value or file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("i/o error: {0}")]
    Io(String),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
