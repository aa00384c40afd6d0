//! Application-facing model records.
//!
//! - `InputRecord` - One discrete-time sample of exogenous model input
//! - `OutputRecord` - One discrete-time sample of the model response
//!
//! Both are `#[repr(C)]` with `f32` fields so they match the C wrapper
//! structs (`input_data`, `output_data`) byte for byte.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;
use std::fmt;

/// Model input sample.
///
/// Size: 16 bytes (4×f32).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct InputRecord {
    /// First input channel.
    pub a: f32,
    /// Second input channel.
    pub b: f32,
    /// Third input channel.
    pub c: f32,
    /// Fourth input channel.
    pub d: f32,
}

const_assert_eq!(core::mem::size_of::<InputRecord>(), 16);

/// Model output sample.
///
/// Size: 12 bytes (3×f32).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct OutputRecord {
    /// First output channel.
    pub x: f32,
    /// Second output channel.
    pub y: f32,
    /// Third output channel.
    pub z: f32,
}

const_assert_eq!(core::mem::size_of::<OutputRecord>(), 12);

impl InputRecord {
    /// Create an input record from its four channels in declared order.
    pub const fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self { a, b, c, d }
    }

    /// Channels in declared order.
    pub const fn to_array(&self) -> [f32; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Build a record from channels in declared order.
    pub const fn from_array(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }

    /// Round every channel to `precision` decimal places.
    ///
    /// Scaling happens in `f64`. A channel whose scaled value is not
    /// finite is returned unchanged.
    pub fn rounded(&self, precision: u8) -> Self {
        let scale = 10f64.powi(i32::from(precision));
        Self::from_array(self.to_array().map(|v| {
            let scaled = f64::from(v) * scale;
            if scaled.is_finite() {
                (scaled.round() / scale) as f32
            } else {
                v
            }
        }))
    }
}

impl OutputRecord {
    /// Create an output record from its three channels in declared order.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Channels in declared order.
    pub const fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Build a record from channels in declared order.
    pub const fn from_array(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl fmt::Display for InputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "a: {:.2} b: {:.2} c: {:.2} d: {:.2}",
            self.a, self.b, self.c, self.d
        )
    }
}

impl fmt::Display for OutputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x: {:.2} y: {:.2} z: {:.2}", self.x, self.y, self.z)
    }
}
