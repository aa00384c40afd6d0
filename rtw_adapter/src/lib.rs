//! # RTW Adapter Library
//!
//! Adapter over generated real-time models plus the UDP model service
//! that drives it.
//!
//! Bindings implement the `ModelBinding` trait defined in
//! `rtw_common::model`. Which binding the service uses is chosen by cargo
//! features at build time.
//!
//! # Module Structure
//!
//! - [`adapter`] - `ModelAdapter`, the initialize / step / terminate contract
//! - [`bindings`] - Instance and procedural bindings, build-time selection
//! - [`io`] - Native external I/O structs and record mapping
//! - [`registry`] - Model factory registration
//! - [`models`] - Built-in instance models
//! - [`cache`] - Persistent output cache
//! - [`executor`] - Adapter plus cache
//! - [`listener`] - UDP input listener
//! - [`service`] - UDP model service loop
//! - [`call`] - One-shot call runner
//! - [`config`] - `adapter.toml` schema
//! - [`error`] - Service error type
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       rtw_adapter                                │
//! │  ┌─────────────┐    ┌──────────────┐    ┌─────────────────────┐  │
//! │  │ UdpListener │───►│ ModelService │───►│  UDP output socket  │  │
//! │  └─────────────┘    └──────┬───────┘    └─────────────────────┘  │
//! │                            ▼                                     │
//! │                   ┌────────────────┐    ┌─────────────────────┐  │
//! │                   │    Executor    │◄──►│    OutputCache      │  │
//! │                   └───────┬────────┘    └─────────────────────┘  │
//! │                           ▼                                      │
//! │                   ┌────────────────┐                             │
//! │                   │  ModelAdapter  │──► SelectedBinding          │
//! │                   └────────────────┘                             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod adapter;
pub mod bindings;
pub mod cache;
pub mod call;
pub mod config;
pub mod error;
pub mod executor;
pub mod io;
pub mod listener;
pub mod models;
pub mod registry;
pub mod service;

// Re-export key types for convenience
pub use crate::adapter::{AdapterState, ModelAdapter, ModelFactory};
pub use crate::bindings::{SelectedBinding, BINDING_VARIANT};
pub use crate::cache::OutputCache;
pub use crate::config::AdapterConfig;
pub use crate::error::ServiceError;
pub use crate::executor::{Executor, StepOutcome};
pub use crate::registry::ModelRegistry;
pub use crate::service::{ModelService, ServiceStats};
