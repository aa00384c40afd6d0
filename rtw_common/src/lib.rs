//! RTW Common Library
//!
//! This crate provides the records, model binding contract, wire codec and
//! configuration loading utilities shared by all RTW workspace crates.
//!
//! # Module Structure
//!
//! - [`model`] - Input/output records, the `ModelBinding` trait and `ModelError`
//! - [`wire`] - Network byte order codec for transport datagrams
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Workspace-wide constants
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use rtw_common::prelude::*;
//!
//! let input = InputRecord::new(1.0, 2.0, 3.0, 4.0);
//! let bytes = input.encode();
//! assert_eq!(InputRecord::decode(&bytes).unwrap(), input);
//! ```

pub mod config;
pub mod consts;
pub mod model;
pub mod prelude;
pub mod wire;
