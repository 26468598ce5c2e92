//! # Entity Component System
//!
//! A packed-bundle ECS: every entity slot reserves a fixed-stride region
//! for every registered component type.
//!
//! ## Design Philosophy
//!
//! - The component layout is computed once at construction
//! - Entity ids are dense indices, recycled through a LIFO pool
//! - Membership is one 32-bit mask per entity
//! - Queries are a linear mask scan, results in ascending id order

mod component;
mod entity;
mod layout;
pub mod query;
mod registry;
mod storage;

pub use component::{Component, ComponentType};
pub use entity::{EntityFlags, EntityId, EntityStore};
pub use layout::{mask_bit, ComponentLayout, ComponentMask, MAX_COMPONENT_TYPES};
pub use query::{QueryEngine, QueryIter, QueryMask, QueryResult};
pub use registry::{Registry, MAX_ENTITIES};
pub use storage::ComponentStore;
