//! # Registry Configuration
//!
//! The component layout is fixed when a registry is built. It is described
//! by an ordered list of component descriptors; a descriptor's position in
//! the list becomes its type index for every later call.
//!
//! Configs may be built in code or loaded once at startup from TOML:
//!
//! ```toml
//! initial_capacity = 32
//!
//! [[components]]
//! name = "position"
//! size = 12
//!
//! [[components]]
//! name = "health"
//! size = 4
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};

/// Entity capacity used when a config does not name one.
pub const DEFAULT_INITIAL_CAPACITY: usize = 32;

/// Describes one component type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    /// Human-readable name, used only in diagnostics.
    #[serde(default)]
    pub name: Option<String>,
    /// Size of one instance in bytes.
    pub size: usize,
}

impl ComponentDescriptor {
    /// Creates an unnamed descriptor.
    #[must_use]
    pub const fn new(size: usize) -> Self {
        Self { name: None, size }
    }

    /// Creates a named descriptor.
    #[must_use]
    pub fn named(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: Some(name.into()),
            size,
        }
    }

    /// Creates a descriptor sized for the Rust type `C`.
    #[must_use]
    pub fn of<C: crate::ecs::Component>() -> Self {
        Self::named(std::any::type_name::<C>(), std::mem::size_of::<C>())
    }
}

/// Full registry configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Entity slots allocated up front. Doubles on demand.
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
    /// Ordered component types. Index in this list is the type index.
    #[serde(default)]
    pub components: Vec<ComponentDescriptor>,
}

fn default_initial_capacity() -> usize {
    DEFAULT_INITIAL_CAPACITY
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            components: Vec::new(),
        }
    }
}

impl RegistryConfig {
    /// Builds a config from plain byte sizes with the default capacity.
    #[must_use]
    pub fn from_sizes(sizes: &[usize]) -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            components: sizes.iter().copied().map(ComponentDescriptor::new).collect(),
        }
    }

    /// Overrides the initial entity capacity.
    #[must_use]
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Appends a component type, returning the config for chaining.
    #[must_use]
    pub fn with_component(mut self, descriptor: ComponentDescriptor) -> Self {
        self.components.push(descriptor);
        self
    }

    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] if the text is not valid
    /// TOML, does not match the schema, or fails [`Self::validate`].
    pub fn from_toml_str(text: &str) -> RegistryResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| RegistryError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Io`] if the file cannot be read, or any
    /// error from [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| RegistryError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Checks values that the layout itself cannot reject.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] if `initial_capacity` is zero
    /// or does not fit the 32-bit entity id space.
    pub fn validate(&self) -> RegistryResult<()> {
        if self.initial_capacity == 0 {
            return Err(RegistryError::InvalidConfig(
                "initial_capacity must be greater than zero".to_string(),
            ));
        }
        if self.initial_capacity > u32::MAX as usize {
            return Err(RegistryError::InvalidConfig(format!(
                "initial_capacity {} exceeds u32::MAX",
                self.initial_capacity
            )));
        }
        Ok(())
    }

    /// Byte sizes in type-index order.
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        self.components.iter().map(|c| c.size).collect()
    }
}
