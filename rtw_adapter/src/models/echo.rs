//! Echo model: outports copy the first three inports.

use crate::bindings::instance::GeneratedModel;
use crate::io::{ExtU, ExtY};

/// Stateless pass-through model (`x = a`, `y = b`, `z = c`).
#[derive(Debug, Default)]
pub struct EchoModel {
    u: ExtU,
    y: ExtY,
}

impl EchoModel {
    /// Registry name.
    pub const NAME: &'static str = "echo";

    /// Create an echo model.
    pub fn new() -> Self {
        Self::default()
    }
}

impl GeneratedModel for EchoModel {
    type ExtU = ExtU;
    type ExtY = ExtY;

    fn model_name(&self) -> &'static str {
        Self::NAME
    }

    fn initialize(&mut self) {
        self.u = ExtU::default();
        self.y = ExtY::default();
    }

    fn step(&mut self) {
        self.y = ExtY {
            x: self.u.a,
            y: self.u.b,
            z: self.u.c,
        };
    }

    fn terminate(&mut self) {}

    fn error_status(&self) -> Option<&str> {
        None
    }

    fn set_external_inputs(&mut self, inputs: ExtU) {
        self.u = inputs;
    }

    fn external_outputs(&self) -> ExtY {
        self.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_follow_inputs_after_step() {
        let mut model = EchoModel::new();
        model.initialize();
        model.set_external_inputs(ExtU { a: 1.0, b: 2.0, c: 3.0, d: 4.0 });
        assert_eq!(model.external_outputs(), ExtY::default());

        model.step();
        assert_eq!(model.external_outputs(), ExtY { x: 1.0, y: 2.0, z: 3.0 });
    }
}
