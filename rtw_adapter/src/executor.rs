//! Step executor: adapter plus optional output cache.
//!
//! A cache hit answers without touching the model. A miss steps the model
//! through the adapter and stores the output; faulted steps are never
//! cached.

use crate::adapter::ModelAdapter;
use crate::bindings::{binding_factory, SelectedBinding};
use crate::cache::OutputCache;
use crate::config::{CacheSection, ModelSection};
use crate::error::ServiceError;
use crate::registry::ModelRegistry;
use rtw_common::model::{InputRecord, ModelBinding, OutputRecord};
use std::time::{Duration, Instant};
use tracing::warn;

/// Result of one executed input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Model outputs.
    pub output: OutputRecord,
    /// Served from the cache without stepping the model.
    pub from_cache: bool,
    /// Wall time spent, lookup included.
    pub elapsed: Duration,
}

/// Runs inputs through a [`ModelAdapter`], consulting a cache first.
pub struct Executor<B: ModelBinding> {
    adapter: ModelAdapter<B>,
    cache: Option<OutputCache>,
}

impl<B: ModelBinding> Executor<B> {
    /// Create an executor over `adapter`, with an optional `cache`.
    pub fn new(adapter: ModelAdapter<B>, cache: Option<OutputCache>) -> Self {
        Self { adapter, cache }
    }

    /// Initialize the underlying model.
    ///
    /// # Errors
    /// Propagates the adapter's initialization error.
    pub fn initialize(&mut self) -> Result<(), ServiceError> {
        self.adapter.initialize()?;
        Ok(())
    }

    /// Execute `input`.
    ///
    /// # Errors
    /// - `ServiceError::Model` if the model is faulted or not initialized
    /// - `ServiceError::Cache` if persisting a new entry fails
    pub fn execute(&mut self, input: &InputRecord) -> Result<StepOutcome, ServiceError> {
        let start = Instant::now();

        if let Some(output) = self.cache.as_mut().and_then(|c| c.get(input)) {
            return Ok(StepOutcome {
                output,
                from_cache: true,
                elapsed: start.elapsed(),
            });
        }

        let mut output = OutputRecord::default();
        self.adapter.step(input, &mut output)?;
        let elapsed = start.elapsed();

        if let Some(cache) = self.cache.as_mut() {
            cache.insert(input, output)?;
        }

        Ok(StepOutcome {
            output,
            from_cache: false,
            elapsed,
        })
    }

    /// Terminate the model and flush the cache.
    ///
    /// The cache is flushed even when termination fails.
    ///
    /// # Errors
    /// Returns the termination error first, then any flush error.
    pub fn terminate(&mut self) -> Result<(), ServiceError> {
        let terminated = self.adapter.terminate();
        if let Some(cache) = self.cache.as_mut() {
            if let Err(e) = cache.flush() {
                warn!("Failed to flush output cache: {}", e);
                terminated?;
                return Err(e.into());
            }
        }
        terminated?;
        Ok(())
    }

    /// The wrapped adapter.
    pub fn adapter(&self) -> &ModelAdapter<B> {
        &self.adapter
    }

    /// The output cache, if enabled.
    pub fn cache(&self) -> Option<&OutputCache> {
        self.cache.as_ref()
    }
}

impl Executor<SelectedBinding> {
    /// Build the executor for the compiled-in binding variant.
    ///
    /// # Errors
    /// - `ServiceError::Model` if the model cannot be bound
    /// - `ServiceError::Cache` if an enabled cache file cannot be opened
    pub fn from_config(
        model: &ModelSection,
        cache: &CacheSection,
        registry: ModelRegistry,
    ) -> Result<Self, ServiceError> {
        let factory = binding_factory(model, registry)?;
        let cache = if cache.enabled {
            Some(OutputCache::from_section(cache)?)
        } else {
            None
        };
        Ok(Self::new(ModelAdapter::new(factory), cache))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::instance::InstanceBinding;
    use crate::models::{EchoModel, LagModel};

    fn echo_executor(cache: Option<OutputCache>) -> Executor<InstanceBinding<EchoModel>> {
        let adapter = ModelAdapter::with_model(InstanceBinding::new(EchoModel::new()));
        Executor::new(adapter, cache)
    }

    #[test]
    fn uncached_executor_always_steps() {
        let mut exec = echo_executor(None);
        exec.initialize().unwrap();
        let input = InputRecord::new(1.0, 2.0, 3.0, 4.0);

        for _ in 0..3 {
            let outcome = exec.execute(&input).unwrap();
            assert!(!outcome.from_cache);
            assert_eq!(outcome.output, OutputRecord::new(1.0, 2.0, 3.0));
        }
        assert_eq!(exec.adapter().step_count(), 3);
        exec.terminate().unwrap();
    }

    #[test]
    fn repeated_input_served_from_cache() {
        let mut exec = echo_executor(Some(OutputCache::in_memory(None)));
        exec.initialize().unwrap();
        let input = InputRecord::new(0.5, 0.5, 0.5, 0.5);

        assert!(!exec.execute(&input).unwrap().from_cache);
        let second = exec.execute(&input).unwrap();
        assert!(second.from_cache);
        assert_eq!(second.output, OutputRecord::new(0.5, 0.5, 0.5));
        assert_eq!(exec.adapter().step_count(), 1);
        assert_eq!(exec.cache().map(OutputCache::hits), Some(1));
    }

    #[test]
    fn faulted_step_not_cached() {
        let adapter = ModelAdapter::with_model(InstanceBinding::new(LagModel::new()));
        let mut exec = Executor::new(adapter, Some(OutputCache::in_memory(None)));
        exec.initialize().unwrap();

        exec.execute(&InputRecord::new(f32::NAN, 0.0, 0.0, 0.0)).unwrap();
        let result = exec.execute(&InputRecord::default());
        assert!(matches!(result, Err(ServiceError::Model(_))));
        assert_eq!(exec.cache().map(OutputCache::len), Some(1));
    }

    #[test]
    fn execute_before_initialize_fails() {
        let mut exec = echo_executor(None);
        assert!(matches!(
            exec.execute(&InputRecord::default()),
            Err(ServiceError::Model(_))
        ));
    }
}
