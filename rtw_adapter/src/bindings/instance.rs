//! Instance-style binding.
//!
//! Object-style generated code exposes one model class whose methods run
//! the lifecycle and whose accessors reach the external I/O. The
//! `GeneratedModel` trait is that class surface; `InstanceBinding` adapts
//! any implementation to `ModelBinding`.

use rtw_common::model::{InputRecord, ModelBinding, ModelError, OutputRecord};

/// Class surface of an object-style generated model.
///
/// `ExtU: From<InputRecord>` and `ExtY: Into<OutputRecord>` make the
/// record mapping part of each model's type, checked at build time.
pub trait GeneratedModel {
    /// Native external input struct.
    type ExtU: From<InputRecord>;
    /// Native external output struct.
    type ExtY: Into<OutputRecord>;

    /// Model name as generated.
    fn model_name(&self) -> &'static str;

    /// One-time setup.
    fn initialize(&mut self);

    /// One discrete step.
    fn step(&mut self);

    /// One-time teardown.
    fn terminate(&mut self);

    /// Error status of the real-time model object.
    fn error_status(&self) -> Option<&str>;

    /// Set the root inports.
    fn set_external_inputs(&mut self, inputs: Self::ExtU);

    /// Get the root outports.
    fn external_outputs(&self) -> Self::ExtY;
}

/// `ModelBinding` over a single generated model object.
#[derive(Debug)]
pub struct InstanceBinding<M: GeneratedModel> {
    model: M,
}

impl<M: GeneratedModel> InstanceBinding<M> {
    /// Wrap a model object.
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// The wrapped model object.
    pub fn inner(&self) -> &M {
        &self.model
    }
}

impl<M: GeneratedModel> ModelBinding for InstanceBinding<M> {
    fn name(&self) -> &str {
        self.model.model_name()
    }

    fn initialize(&mut self) -> Result<(), ModelError> {
        self.model.initialize();
        Ok(())
    }

    fn error_status(&self) -> Option<String> {
        self.model.error_status().map(str::to_string)
    }

    fn write_inputs(&mut self, input: &InputRecord) {
        self.model.set_external_inputs(M::ExtU::from(*input));
    }

    fn step(&mut self) {
        self.model.step();
    }

    fn read_outputs(&self) -> OutputRecord {
        self.model.external_outputs().into()
    }

    fn terminate(&mut self) {
        self.model.terminate();
    }
}
