//! # Memory Management
//!
//! Recycling structures shared by the registry.
//!
//! ## Design Philosophy
//!
//! Memory is reserved in large steps and reused rather than freed:
//! - Killed entity ids go back to a LIFO pool
//! - Bundle slots of dead entities are overwritten, never released

mod id_pool;

pub use id_pool::IdPool;
