//! First-order lag model.
//!
//! Discrete first-order lag on inports `a` and `b`, sampled at a fixed
//! step size:
//!
//! ```text
//! s[k] = s[k-1] + alpha * (u[k] - s[k-1]),   alpha = Ts / (tau + Ts)
//! ```
//!
//! Outports: `x` = lagged `a`, `y` = lagged `b`, `z` = model time.
//! A non-finite state sets the error status, as generated code does with
//! `rtmSetErrorStatus`.

use crate::bindings::instance::GeneratedModel;
use crate::io::{ExtU, ExtY, RealT};

/// Default fixed step size [s].
pub const DEFAULT_SAMPLE_TIME: RealT = 0.01;

/// Default time constant [s].
pub const DEFAULT_TIME_CONSTANT: RealT = 0.1;

/// Error status set when the state stops being finite.
pub const NON_FINITE_STATE: &str = "Non-finite state";

/// Stateful first-order lag model.
#[derive(Debug)]
pub struct LagModel {
    sample_time: RealT,
    alpha: RealT,
    state: [RealT; 2],
    tick: u64,
    u: ExtU,
    y: ExtY,
    error_status: Option<&'static str>,
}

impl LagModel {
    /// Registry name.
    pub const NAME: &'static str = "lag";

    /// Create a lag model with the default step size and time constant.
    pub fn new() -> Self {
        Self::with_params(DEFAULT_SAMPLE_TIME, DEFAULT_TIME_CONSTANT)
    }

    /// Create a lag model with step size `sample_time` and time constant `tau`.
    pub fn with_params(sample_time: RealT, tau: RealT) -> Self {
        Self {
            sample_time,
            alpha: sample_time / (tau + sample_time),
            state: [0.0; 2],
            tick: 0,
            u: ExtU::default(),
            y: ExtY::default(),
            error_status: None,
        }
    }

    /// Filter coefficient.
    pub fn alpha(&self) -> RealT {
        self.alpha
    }
}

impl Default for LagModel {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratedModel for LagModel {
    type ExtU = ExtU;
    type ExtY = ExtY;

    fn model_name(&self) -> &'static str {
        Self::NAME
    }

    fn initialize(&mut self) {
        self.state = [0.0; 2];
        self.tick = 0;
        self.u = ExtU::default();
        self.y = ExtY::default();
        self.error_status = None;
    }

    fn step(&mut self) {
        let inputs = [self.u.a, self.u.b];
        for (s, u) in self.state.iter_mut().zip(inputs) {
            *s += self.alpha * (u - *s);
        }
        self.tick += 1;

        if self.state.iter().any(|s| !s.is_finite()) {
            self.error_status = Some(NON_FINITE_STATE);
        }

        self.y = ExtY {
            x: self.state[0],
            y: self.state[1],
            z: self.tick as RealT * self.sample_time,
        };
    }

    fn terminate(&mut self) {}

    fn error_status(&self) -> Option<&str> {
        self.error_status
    }

    fn set_external_inputs(&mut self, inputs: ExtU) {
        self.u = inputs;
    }

    fn external_outputs(&self) -> ExtY {
        self.y
    }
}
