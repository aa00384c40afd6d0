//! Model binding trait and error types.
//!
//! This module defines:
//! - `ModelBinding` trait - Interface over one generated model implementation
//! - `ModelError` enum - Error types for binding and adapter operations
//! - `BindingFactory` type alias - Factory function type

use crate::model::records::{InputRecord, OutputRecord};
use thiserror::Error;

/// Error types for model binding operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The generated model reported a fault through its error status.
    #[error("Model fault: {0}")]
    Fault(String),

    /// `step()` or `terminate()` called without a live model instance.
    #[error("Model not initialized")]
    NotInitialized,

    /// `initialize()` called while a model instance is already live.
    #[error("Model already initialized")]
    AlreadyInitialized,

    /// The adapter's single model instance was consumed by a failed
    /// `initialize()` and cannot be built again.
    #[error("Model instance unavailable")]
    InstanceUnavailable,

    /// No model registered under the requested name.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Model shared library could not be located.
    #[error("Model library not found: {0}")]
    LibraryNotFound(String),

    /// Model shared library could not be loaded.
    #[error("Failed to load model library: {0}")]
    LibraryLoad(String),

    /// Required symbol is missing from the model library.
    #[error("Missing model symbol: {0}")]
    SymbolMissing(String),
}

/// Factory function type for creating binding instances.
pub type BindingFactory = fn() -> Box<dyn ModelBinding>;

/// Trait defining the interface over a generated model.
///
/// The adapter drives every binding through this trait, so procedural
/// (free function) and instance (object) style models share one contract.
///
/// # Lifecycle
///
/// 1. `initialize()` - Called once, before any step
/// 2. `write_inputs()` → `step()` → `read_outputs()` - Once per discrete step
/// 3. `terminate()` - Called at most once, after the last step
///
/// `error_status()` is checked by the adapter before every step. A binding
/// never checks it itself.
pub trait ModelBinding {
    /// Returns the model's identifier (e.g., "echo", "controller").
    fn name(&self) -> &str;

    /// Run the model's one-time setup.
    fn initialize(&mut self) -> Result<(), ModelError>;

    /// Current fault message of the model, `None` while healthy.
    fn error_status(&self) -> Option<String>;

    /// Copy the record into the model's external inputs, field by field.
    fn write_inputs(&mut self, input: &InputRecord);

    /// Execute exactly one discrete model step.
    fn step(&mut self);

    /// Read the model's external outputs.
    fn read_outputs(&self) -> OutputRecord;

    /// Run the model's one-time teardown.
    fn terminate(&mut self);
}

impl<B: ModelBinding + ?Sized> ModelBinding for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn initialize(&mut self) -> Result<(), ModelError> {
        (**self).initialize()
    }

    fn error_status(&self) -> Option<String> {
        (**self).error_status()
    }

    fn write_inputs(&mut self, input: &InputRecord) {
        (**self).write_inputs(input)
    }

    fn step(&mut self) {
        (**self).step()
    }

    fn read_outputs(&self) -> OutputRecord {
        (**self).read_outputs()
    }

    fn terminate(&mut self) {
        (**self).terminate()
    }
}
