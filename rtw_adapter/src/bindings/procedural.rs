//! Procedural binding over a generated model shared library.
//!
//! Procedural generated code exports free functions and module-level
//! storage named after the model:
//!
//! | Symbol              | Kind                             |
//! |---------------------|----------------------------------|
//! | `<model>_initialize`| `void (void)`                    |
//! | `<model>_step`      | `void (void)`                    |
//! | `<model>_terminate` | `void (void)`                    |
//! | `<model>_U`         | `ExtU_<model>_T` (root inports)  |
//! | `<model>_Y`         | `ExtY_<model>_T` (root outports) |
//! | `<model>_M`         | `RT_MODEL_<model>_T *const`      |
//!
//! Symbol names are derived from the configured model name at load time.
//! The library stays loaded for as long as the binding lives.

use crate::io::{ExtU, ExtY};
use libloading::{Library, Symbol};
use rtw_common::model::{InputRecord, ModelBinding, ModelError, OutputRecord};
use std::ffi::CStr;
use std::os::raw::c_char;
use std::path::Path;
use tracing::info;

type ModelFn = unsafe extern "C" fn();

/// Leading member of the generated real-time model object.
///
/// Generated `RT_MODEL` structs start with `const char_T *errorStatus`;
/// nothing past it is read.
#[repr(C)]
struct RtModelHead {
    error_status: *const c_char,
}

/// `ModelBinding` over a loaded procedural model library.
pub struct ProceduralBinding {
    name: String,
    initialize_fn: ModelFn,
    step_fn: ModelFn,
    terminate_fn: ModelFn,
    inputs: *mut ExtU,
    outputs: *const ExtY,
    rt_model: *const *const RtModelHead,
    // Declared last: symbols above point into the library.
    _lib: Library,
}

impl ProceduralBinding {
    /// Load `path` and resolve the symbols of model `name`.
    ///
    /// # Errors
    /// - `ModelError::LibraryLoad` if the library cannot be opened
    /// - `ModelError::SymbolMissing` if any model symbol is absent
    pub fn load(path: &Path, name: &str) -> Result<Self, ModelError> {
        info!("Loading library: {}", path.display());

        // SAFETY: Loading runs the library's initialisers; generated model
        // libraries have none beyond static data.
        let lib = unsafe { Library::new(path) }
            .map_err(|e| ModelError::LibraryLoad(format!("{}: {e}", path.display())))?;

        // SAFETY: Symbol types follow the generated code ABI documented above.
        let (initialize_fn, step_fn, terminate_fn, inputs, outputs, rt_model) = unsafe {
            (
                *resolve::<ModelFn>(&lib, name, "initialize")?,
                *resolve::<ModelFn>(&lib, name, "step")?,
                *resolve::<ModelFn>(&lib, name, "terminate")?,
                *resolve::<*mut ExtU>(&lib, name, "U")?,
                *resolve::<*const ExtY>(&lib, name, "Y")?,
                *resolve::<*const *const RtModelHead>(&lib, name, "M")?,
            )
        };

        Ok(Self {
            name: name.to_string(),
            initialize_fn,
            step_fn,
            terminate_fn,
            inputs,
            outputs,
            rt_model,
            _lib: lib,
        })
    }
}

/// Resolve `<model>_<suffix>` from `lib`.
///
/// # Safety
/// `T` must match the symbol's real type.
unsafe fn resolve<'lib, T>(
    lib: &'lib Library,
    model: &str,
    suffix: &str,
) -> Result<Symbol<'lib, T>, ModelError> {
    let symbol = format!("{model}_{suffix}");
    unsafe { lib.get::<T>(symbol.as_bytes()) }
        .map_err(|e| ModelError::SymbolMissing(format!("{symbol}: {e}")))
}

impl ModelBinding for ProceduralBinding {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) -> Result<(), ModelError> {
        // SAFETY: Resolved from the loaded library; no arguments.
        unsafe { (self.initialize_fn)() };
        Ok(())
    }

    fn error_status(&self) -> Option<String> {
        // SAFETY: `<model>_M` is a const pointer to the static model object;
        // the status is either null or a NUL-terminated static string.
        unsafe {
            let rtm = *self.rt_model;
            if rtm.is_null() || (*rtm).error_status.is_null() {
                return None;
            }
            Some(CStr::from_ptr((*rtm).error_status).to_string_lossy().into_owned())
        }
    }

    fn write_inputs(&mut self, input: &InputRecord) {
        // SAFETY: `<model>_U` is the model's static inport struct.
        unsafe { self.inputs.write(ExtU::from(*input)) };
    }

    fn step(&mut self) {
        // SAFETY: Resolved from the loaded library; no arguments.
        unsafe { (self.step_fn)() };
    }

    fn read_outputs(&self) -> OutputRecord {
        // SAFETY: `<model>_Y` is the model's static outport struct.
        unsafe { self.outputs.read() }.into()
    }

    fn terminate(&mut self) {
        // SAFETY: Resolved from the loaded library; no arguments.
        unsafe { (self.terminate_fn)() };
    }
}
