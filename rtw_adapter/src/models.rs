//! Built-in instance models.
//!
//! Object-style models compiled into the adapter, used for bring-up,
//! loopback testing and benchmarks without a generated library:
//!
//! - [`echo`] - Passes inports `a`, `b`, `c` straight to the outports
//! - [`sum`] - Stateless sums of the inports
//! - [`lag`] - Stateful first-order lag with a fault on non-finite state

pub mod echo;
pub mod lag;
pub mod sum;

pub use echo::EchoModel;
pub use lag::LagModel;
pub use sum::SumModel;

use crate::bindings::instance::InstanceBinding;
use crate::registry::ModelRegistry;
use rtw_common::model::ModelBinding;

fn create_echo() -> Box<dyn ModelBinding> {
    Box::new(InstanceBinding::new(EchoModel::new()))
}

fn create_sum() -> Box<dyn ModelBinding> {
    Box::new(InstanceBinding::new(SumModel::new()))
}

fn create_lag() -> Box<dyn ModelBinding> {
    Box::new(InstanceBinding::new(LagModel::new()))
}

/// Register all built-in models.
pub fn register_builtin_models(registry: &mut ModelRegistry) {
    registry.register(EchoModel::NAME, create_echo);
    registry.register(SumModel::NAME, create_sum);
    registry.register(LagModel::NAME, create_lag);
}

/// Registry holding every built-in model.
pub fn builtin_registry() -> ModelRegistry {
    let mut registry = ModelRegistry::new();
    register_builtin_models(&mut registry);
    registry
}
