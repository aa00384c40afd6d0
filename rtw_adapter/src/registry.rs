//! Registry of instance-style model factories.
//!
//! Constructed at startup, populated via `register()` and handed to the
//! binding factory by value. No global state.

use rtw_common::model::binding::BindingFactory;
use rtw_common::model::{ModelBinding, ModelError};
use std::collections::HashMap;

/// Registry of available instance models.
pub struct ModelRegistry {
    factories: HashMap<&'static str, BindingFactory>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a model factory.
    ///
    /// # Panics
    /// Panics if a model with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: BindingFactory) {
        if self.factories.contains_key(name) {
            panic!("Model '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a model factory by name.
    pub fn get_factory(&self, name: &str) -> Option<BindingFactory> {
        self.factories.get(name).copied()
    }

    /// Create a model instance by name.
    ///
    /// # Errors
    /// Returns `ModelError::UnknownModel` if no model with the given name is registered.
    pub fn create_model(&self, name: &str) -> Result<Box<dyn ModelBinding>, ModelError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| ModelError::UnknownModel(name.to_string()))?;
        Ok(factory())
    }

    /// List all registered model names, sorted.
    pub fn list_models(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
