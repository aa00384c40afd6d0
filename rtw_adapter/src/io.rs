//! Native external I/O layout of the generated models.
//!
//! Generated code declares its root-level ports as `ExtU_<model>_T` /
//! `ExtY_<model>_T` structs of `real_T` (double) in port order. These are
//! the Rust mirrors, plus the explicit mapping to and from the
//! application records. The mapping is name-matched: record field `a`
//! feeds port `a`, output port `x` feeds record field `x`.

use rtw_common::model::{InputRecord, OutputRecord};
use static_assertions::const_assert_eq;

/// Generated `real_T`.
pub type RealT = f64;

/// External inputs (root inports) in declared port order.
///
/// Size: 32 bytes (4×f64).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct ExtU {
    /// Inport `a`.
    pub a: RealT,
    /// Inport `b`.
    pub b: RealT,
    /// Inport `c`.
    pub c: RealT,
    /// Inport `d`.
    pub d: RealT,
}

const_assert_eq!(core::mem::size_of::<ExtU>(), 32);

/// External outputs (root outports) in declared port order.
///
/// Size: 24 bytes (3×f64).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct ExtY {
    /// Outport `x`.
    pub x: RealT,
    /// Outport `y`.
    pub y: RealT,
    /// Outport `z`.
    pub z: RealT,
}

const_assert_eq!(core::mem::size_of::<ExtY>(), 24);

impl From<InputRecord> for ExtU {
    fn from(input: InputRecord) -> Self {
        Self {
            a: RealT::from(input.a),
            b: RealT::from(input.b),
            c: RealT::from(input.c),
            d: RealT::from(input.d),
        }
    }
}

impl From<ExtY> for OutputRecord {
    // Narrowing to the record's f32 channels.
    fn from(outputs: ExtY) -> Self {
        Self {
            x: outputs.x as f32,
            y: outputs.y as f32,
            z: outputs.z as f32,
        }
    }
}
