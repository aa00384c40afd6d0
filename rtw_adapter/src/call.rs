//! One-shot call runner: N steps on a fixed input.

use crate::error::ServiceError;
use crate::executor::Executor;
use rtw_common::model::{InputRecord, ModelBinding, ModelError, OutputRecord};
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::{info, warn};

/// Summary of a call run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CallReport {
    /// Steps requested.
    pub steps: u64,
    /// Steps that produced an output.
    pub executed: u64,
    /// Outputs served from the cache.
    pub from_cache: u64,
    /// Steps refused because of a model fault.
    pub faults: u64,
    /// Wall time of the step loop [us].
    pub total_us: u64,
    /// Output of the last successful step.
    pub last_output: Option<OutputRecord>,
}

impl fmt::Display for CallReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Model: {} steps executed for {} us ({} cached, {} faulted)",
            self.executed, self.total_us, self.from_cache, self.faults
        )
    }
}

/// Initialize the model, run `steps` executions of `input`, terminate.
///
/// With `step_output` set every step's time and output is logged.
/// Faulted steps are counted and the run continues.
///
/// # Errors
/// Returns initialization, termination or non-fault step errors.
pub fn run_call<B: ModelBinding>(
    executor: &mut Executor<B>,
    input: &InputRecord,
    steps: u64,
    step_output: bool,
) -> Result<CallReport, ServiceError> {
    executor.initialize()?;
    info!("Input: {}", input);

    let mut report = CallReport {
        steps,
        executed: 0,
        from_cache: 0,
        faults: 0,
        total_us: 0,
        last_output: None,
    };

    let start = Instant::now();
    for _ in 0..steps {
        match executor.execute(input) {
            Ok(outcome) => {
                report.executed += 1;
                if outcome.from_cache {
                    report.from_cache += 1;
                }
                report.last_output = Some(outcome.output);
                if step_output {
                    info!(
                        "Model step: {} Time: {} us",
                        if outcome.from_cache { "Cached" } else { "Non-cached" },
                        outcome.elapsed.as_micros()
                    );
                    info!("Output: {}", outcome.output);
                }
            }
            Err(ServiceError::Model(ModelError::Fault(status))) => {
                report.faults += 1;
                if step_output {
                    warn!("Model step refused: {}", status);
                }
            }
            Err(e) => {
                // Best effort; the step error is the one reported.
                let _ = executor.terminate();
                return Err(e);
            }
        }
    }
    report.total_us = start.elapsed().as_micros() as u64;

    executor.terminate()?;
    info!("{}", report);
    Ok(report)
}
