//! Prelude module for common re-exports.
//!
//! ```rust
//! use rtw_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig, Validate};

// ─── Model ──────────────────────────────────────────────────────────
pub use crate::model::binding::BindingFactory;
pub use crate::model::{InputRecord, ModelBinding, ModelError, OutputRecord};

// ─── Wire ───────────────────────────────────────────────────────────
pub use crate::wire::{TransportHeader, TransportMessage, WireError, WireMessage};
