//! Model adapter: the initialize / step / terminate contract.
//!
//! `ModelAdapter` exclusively owns one model instance. The instance is
//! constructed by the adapter's factory in `initialize()` and dropped in
//! `terminate()`; between the two every `step()` performs exactly one
//! underlying model step unless the model reports a fault.
//!
//! ```text
//! Uninitialized ──initialize()──► Initialized ──terminate()──► Terminated
//!                                   │     ▲
//!                                   └step()┘
//! ```

use rtw_common::model::{InputRecord, ModelBinding, ModelError, OutputRecord};
use tracing::{debug, error, info, warn};

/// Factory constructing the owned model instance at `initialize()`.
pub type ModelFactory<B> = Box<dyn FnMut() -> Result<B, ModelError>>;

/// Adapter lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// No model instance yet.
    Uninitialized,
    /// Model instance live, steps allowed.
    Initialized,
    /// Model torn down and released.
    Terminated,
}

/// Stable three-call interface over a generated model binding.
///
/// Single-threaded and non-reentrant: `&mut self` on every lifecycle call
/// rules out concurrent use of one instance.
pub struct ModelAdapter<B: ModelBinding> {
    factory: ModelFactory<B>,
    model: Option<B>,
    state: AdapterState,
    step_count: u64,
    fault_count: u64,
}

impl<B: ModelBinding> ModelAdapter<B> {
    /// Create an adapter that builds its model with `factory` on `initialize()`.
    pub fn new<F>(factory: F) -> Self
    where
        F: FnMut() -> Result<B, ModelError> + 'static,
    {
        Self {
            factory: Box::new(factory),
            model: None,
            state: AdapterState::Uninitialized,
            step_count: 0,
            fault_count: 0,
        }
    }

    /// Create an adapter around an already constructed model instance.
    ///
    /// The instance is handed over at `initialize()`. If that first
    /// `initialize()` fails, later attempts return
    /// `ModelError::InstanceUnavailable`.
    pub fn with_model(model: B) -> Self
    where
        B: 'static,
    {
        let mut slot = Some(model);
        Self::new(move || slot.take().ok_or(ModelError::InstanceUnavailable))
    }

    /// Construct the model instance and run its one-time setup.
    ///
    /// # Errors
    /// - `ModelError::AlreadyInitialized` unless the adapter is `Uninitialized`
    /// - Any error from the factory or the binding's setup
    pub fn initialize(&mut self) -> Result<(), ModelError> {
        if self.state != AdapterState::Uninitialized {
            return Err(ModelError::AlreadyInitialized);
        }

        let mut model = (self.factory)()?;
        info!("Call initialize() on model '{}'", model.name());
        model.initialize()?;

        self.model = Some(model);
        self.state = AdapterState::Initialized;
        Ok(())
    }

    /// Execute one discrete model step.
    ///
    /// Copies `input` into the model's external inputs, runs exactly one
    /// model step and reads the external outputs into `output`. If the
    /// model's error status is set, the step is refused and `output` is
    /// left untouched.
    ///
    /// # Errors
    /// - `ModelError::Fault` if the model reports an error status
    /// - `ModelError::NotInitialized` without a live model instance
    pub fn step(&mut self, input: &InputRecord, output: &mut OutputRecord) -> Result<(), ModelError> {
        let model = self.model.as_mut().ok_or(ModelError::NotInitialized)?;

        if let Some(status) = model.error_status().filter(|s| !s.is_empty()) {
            self.fault_count += 1;
            error!("{}", status);
            return Err(ModelError::Fault(status));
        }

        debug!("{}", input);
        model.write_inputs(input);

        model.step();
        self.step_count += 1;

        *output = model.read_outputs();
        debug!("{}", output);
        Ok(())
    }

    /// Execute one step into a fresh output record.
    ///
    /// # Errors
    /// Same as [`ModelAdapter::step`].
    pub fn step_record(&mut self, input: &InputRecord) -> Result<OutputRecord, ModelError> {
        let mut output = OutputRecord::default();
        self.step(input, &mut output)?;
        Ok(output)
    }

    /// Run the model's one-time teardown and release the instance.
    ///
    /// # Errors
    /// Returns `ModelError::NotInitialized` without a live model instance.
    pub fn terminate(&mut self) -> Result<(), ModelError> {
        let mut model = self.model.take().ok_or(ModelError::NotInitialized)?;
        info!(
            "Call terminate() on model '{}' after {} steps",
            model.name(),
            self.step_count
        );
        model.terminate();
        self.state = AdapterState::Terminated;
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AdapterState {
        self.state
    }

    /// Number of model steps executed.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Number of steps refused because of a model fault.
    pub fn fault_count(&self) -> u64 {
        self.fault_count
    }

    /// The live model instance, if any.
    pub fn model(&self) -> Option<&B> {
        self.model.as_ref()
    }
}

impl<B: ModelBinding> Drop for ModelAdapter<B> {
    fn drop(&mut self) {
        if let Some(mut model) = self.model.take() {
            warn!("Model '{}' dropped without terminate(), tearing down", model.name());
            model.terminate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Calls {
        init_calls: u32,
        step_calls: u32,
        terminate_calls: u32,
        last_input: InputRecord,
    }

    struct CountingModel {
        calls: Rc<RefCell<Calls>>,
        fault: Option<String>,
        init_error: Option<ModelError>,
    }

    impl ModelBinding for CountingModel {
        fn name(&self) -> &str {
            "counting"
        }

        fn initialize(&mut self) -> Result<(), ModelError> {
            self.calls.borrow_mut().init_calls += 1;
            match self.init_error.take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        fn error_status(&self) -> Option<String> {
            self.fault.clone()
        }

        fn write_inputs(&mut self, input: &InputRecord) {
            self.calls.borrow_mut().last_input = *input;
        }

        fn step(&mut self) {
            self.calls.borrow_mut().step_calls += 1;
        }

        fn read_outputs(&self) -> OutputRecord {
            let p = self.calls.borrow();
            OutputRecord::new(p.last_input.a, p.last_input.b, p.step_calls as f32)
        }

        fn terminate(&mut self) {
            self.calls.borrow_mut().terminate_calls += 1;
        }
    }

    fn counting_adapter(fault: Option<&str>) -> (ModelAdapter<CountingModel>, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let model = CountingModel {
            calls: Rc::clone(&calls),
            fault: fault.map(str::to_string),
            init_error: None,
        };
        (ModelAdapter::with_model(model), calls)
    }

    #[test]
    fn lifecycle_transitions() {
        let (mut adapter, calls) = counting_adapter(None);
        assert_eq!(adapter.state(), AdapterState::Uninitialized);
        assert!(adapter.model().is_none());

        adapter.initialize().unwrap();
        assert_eq!(adapter.state(), AdapterState::Initialized);
        assert_eq!(calls.borrow().init_calls, 1);

        adapter.terminate().unwrap();
        assert_eq!(adapter.state(), AdapterState::Terminated);
        assert!(adapter.model().is_none());
        assert_eq!(calls.borrow().terminate_calls, 1);
    }

    #[test]
    fn step_before_initialize_rejected() {
        let (mut adapter, calls) = counting_adapter(None);
        let mut out = OutputRecord::new(9.0, 9.0, 9.0);
        let err = adapter.step(&InputRecord::default(), &mut out).unwrap_err();
        assert_eq!(err, ModelError::NotInitialized);
        assert_eq!(out, OutputRecord::new(9.0, 9.0, 9.0));
        assert_eq!(calls.borrow().step_calls, 0);
    }

    #[test]
    fn double_initialize_rejected() {
        let (mut adapter, calls) = counting_adapter(None);
        adapter.initialize().unwrap();
        assert_eq!(adapter.initialize(), Err(ModelError::AlreadyInitialized));
        assert_eq!(calls.borrow().init_calls, 1);
    }

    #[test]
    fn step_after_terminate_rejected() {
        let (mut adapter, _calls) = counting_adapter(None);
        adapter.initialize().unwrap();
        adapter.terminate().unwrap();
        assert_eq!(
            adapter.step_record(&InputRecord::default()),
            Err(ModelError::NotInitialized)
        );
        assert_eq!(adapter.terminate(), Err(ModelError::NotInitialized));
    }

    #[test]
    fn empty_error_status_is_not_a_fault() {
        let (mut adapter, calls) = counting_adapter(Some(""));
        adapter.initialize().unwrap();
        adapter.step_record(&InputRecord::default()).unwrap();
        assert_eq!(calls.borrow().step_calls, 1);
        assert_eq!(adapter.fault_count(), 0);
    }

    #[test]
    fn fault_counts_refused_steps() {
        let (mut adapter, calls) = counting_adapter(Some("Overrun"));
        adapter.initialize().unwrap();
        for _ in 0..3 {
            assert_eq!(
                adapter.step_record(&InputRecord::default()),
                Err(ModelError::Fault("Overrun".to_string()))
            );
        }
        assert_eq!(adapter.fault_count(), 3);
        assert_eq!(adapter.step_count(), 0);
        assert_eq!(calls.borrow().step_calls, 0);
    }

    #[test]
    fn drop_tears_down_live_model() {
        let (mut adapter, calls) = counting_adapter(None);
        adapter.initialize().unwrap();
        drop(adapter);
        assert_eq!(calls.borrow().terminate_calls, 1);
    }

    #[test]
    fn failed_setup_consumes_handed_over_instance() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut adapter = ModelAdapter::with_model(CountingModel {
            calls: Rc::clone(&calls),
            fault: None,
            init_error: Some(ModelError::LibraryLoad("setup failed".to_string())),
        });

        assert_eq!(
            adapter.initialize(),
            Err(ModelError::LibraryLoad("setup failed".to_string()))
        );
        assert_eq!(adapter.state(), AdapterState::Uninitialized);

        assert_eq!(adapter.initialize(), Err(ModelError::InstanceUnavailable));
        assert_eq!(adapter.state(), AdapterState::Uninitialized);
        assert_eq!(calls.borrow().init_calls, 1);
    }

    #[test]
    fn factory_error_keeps_adapter_uninitialized() {
        let mut adapter: ModelAdapter<CountingModel> =
            ModelAdapter::new(|| Err(ModelError::UnknownModel("ghost".to_string())));
        assert_eq!(
            adapter.initialize(),
            Err(ModelError::UnknownModel("ghost".to_string()))
        );
        assert_eq!(adapter.state(), AdapterState::Uninitialized);
    }
}
