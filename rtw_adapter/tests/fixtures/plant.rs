//! Procedural model library laid out like generated code, model `plant`.
//!
//! Outputs: `x = a + d`, `y = b`, `z = c`. A step that sees a negative `a`
//! sets the error status to "Negative input".

#![allow(non_upper_case_globals)]

use std::os::raw::c_char;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

#[repr(C)]
pub struct ExtU {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

#[repr(C)]
pub struct ExtY {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[repr(C)]
pub struct RtModel {
    error_status: AtomicPtr<c_char>,
}

static NEGATIVE_INPUT: &[u8] = b"Negative input\0";

static RT_MODEL: RtModel = RtModel {
    error_status: AtomicPtr::new(ptr::null_mut()),
};

#[no_mangle]
pub static mut plant_U: ExtU = ExtU {
    a: 0.0,
    b: 0.0,
    c: 0.0,
    d: 0.0,
};

#[no_mangle]
pub static mut plant_Y: ExtY = ExtY {
    x: 0.0,
    y: 0.0,
    z: 0.0,
};

#[no_mangle]
pub static plant_M: &RtModel = &RT_MODEL;

#[no_mangle]
pub extern "C" fn plant_initialize() {
    RT_MODEL.error_status.store(ptr::null_mut(), Ordering::SeqCst);
    unsafe {
        plant_Y = ExtY {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        };
    }
}

#[no_mangle]
pub extern "C" fn plant_step() {
    unsafe {
        plant_Y.x = plant_U.a + plant_U.d;
        plant_Y.y = plant_U.b;
        plant_Y.z = plant_U.c;
        if plant_U.a < 0.0 {
            RT_MODEL
                .error_status
                .store(NEGATIVE_INPUT.as_ptr() as *mut c_char, Ordering::SeqCst);
        }
    }
}

#[no_mangle]
pub extern "C" fn plant_terminate() {
    RT_MODEL.error_status.store(ptr::null_mut(), Ordering::SeqCst);
}
