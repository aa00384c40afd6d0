//! Summing model.

use crate::bindings::instance::GeneratedModel;
use crate::io::{ExtU, ExtY};

/// Stateless summing model.
///
/// `x = a + b + c + d`, `y = a + b`, `z = c + d`.
#[derive(Debug, Default)]
pub struct SumModel {
    u: ExtU,
    y: ExtY,
}

impl SumModel {
    /// Registry name.
    pub const NAME: &'static str = "sum";

    /// Create a summing model.
    pub fn new() -> Self {
        Self::default()
    }
}

impl GeneratedModel for SumModel {
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
        let ExtU { a, b, c, d } = self.u;
        self.y = ExtY {
            x: a + b + c + d,
            y: a + b,
            z: c + d,
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
    fn sums_inports() {
        let mut model = SumModel::new();
        model.initialize();
        model.set_external_inputs(ExtU { a: 1.0, b: 2.0, c: 3.0, d: 4.0 });
        model.step();
        assert_eq!(model.external_outputs(), ExtY { x: 10.0, y: 3.0, z: 7.0 });
    }
}
