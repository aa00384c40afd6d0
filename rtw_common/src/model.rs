//! Model records and binding contract.
//!
//! This module contains the application-facing records exchanged with a
//! generated model and the trait every model binding implements.

pub mod binding;
pub mod records;

pub use binding::{ModelBinding, ModelError};
pub use records::{InputRecord, OutputRecord};
