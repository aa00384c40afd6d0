//! Model bindings and build-time variant selection.
//!
//! - [`instance`] - Object-style generated models (always built)
//! - `procedural` - Free-function models in a shared library (feature `procedural`)
//!
//! The binding the service and CLI use is [`SelectedBinding`]; which type
//! that is gets decided by cargo features, never at runtime. Instance
//! models are picked by name from the [`ModelRegistry`]; procedural models
//! are bound by symbol name from the configured library.

pub mod instance;
#[cfg(feature = "procedural")]
pub mod procedural;

use crate::adapter::ModelFactory;
use crate::config::ModelSection;
use crate::registry::ModelRegistry;
use rtw_common::model::ModelError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Binding selected at build time.
#[cfg(feature = "procedural")]
pub type SelectedBinding = procedural::ProceduralBinding;

/// Binding selected at build time.
#[cfg(not(feature = "procedural"))]
pub type SelectedBinding = Box<dyn rtw_common::model::ModelBinding>;

/// Name of the binding variant compiled in.
pub const BINDING_VARIANT: &str = if cfg!(feature = "procedural") {
    "procedural"
} else {
    "instance"
};

/// Build the factory the adapter calls at `initialize()`.
///
/// The instance variant creates the registered model named in `model`.
#[cfg(not(feature = "procedural"))]
pub fn binding_factory(
    model: &ModelSection,
    registry: ModelRegistry,
) -> Result<ModelFactory<SelectedBinding>, ModelError> {
    if registry.get_factory(&model.name).is_none() {
        return Err(ModelError::UnknownModel(model.name.clone()));
    }
    info!("Binding variant: instance (model '{}')", model.name);
    let name = model.name.clone();
    Ok(Box::new(move || registry.create_model(&name)))
}

/// Build the factory the adapter calls at `initialize()`.
///
/// The procedural variant locates the model library now and loads it on
/// every `initialize()`.
#[cfg(feature = "procedural")]
pub fn binding_factory(
    model: &ModelSection,
    _registry: ModelRegistry,
) -> Result<ModelFactory<SelectedBinding>, ModelError> {
    let search_dirs = if model.search_dirs.is_empty() {
        default_search_dirs()
    } else {
        model.search_dirs.clone()
    };
    let path = locate_model_library(&model.library, &search_dirs)?;
    info!(
        "Binding variant: procedural (model '{}', library {})",
        model.name,
        path.display()
    );
    let name = model.name.clone();
    Ok(Box::new(move || {
        procedural::ProceduralBinding::load(&path, &name)
    }))
}

/// Standard library search directories, highest priority first.
///
/// `/usr/local/lib`, `/usr/lib`, the executable's directory and its `out/`
/// subdirectory.
pub fn default_search_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from("/usr/local/lib"), PathBuf::from("/usr/lib")];
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
    {
        let out_dir = exe_dir.join("out");
        dirs.push(exe_dir);
        dirs.push(out_dir);
    }
    dirs
}

/// Locate a model shared library.
///
/// An existing `library` path (absolute or relative to the working
/// directory) wins. Otherwise the bare file name is looked up in
/// `search_dirs` in order.
///
/// # Errors
/// Returns `ModelError::LibraryNotFound` if no candidate exists.
pub fn locate_model_library(library: &Path, search_dirs: &[PathBuf]) -> Result<PathBuf, ModelError> {
    if library.is_file() {
        return Ok(library.to_path_buf());
    }

    let file_name = library
        .file_name()
        .ok_or_else(|| ModelError::LibraryNotFound(library.display().to_string()))?;

    for dir in search_dirs {
        let candidate = dir.join(file_name);
        debug!("Looking for model library at {}", candidate.display());
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(ModelError::LibraryNotFound(library.display().to_string()))
}
