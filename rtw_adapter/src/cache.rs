//! Output cache for repeated model inputs.
//!
//! Outputs are keyed by the hex encoding of the input's wire bytes,
//! optionally after rounding the channels to `key_precision` decimals.
//! Entries are persisted with bincode so a restarted service keeps its
//! hits.

use crate::config::CacheSection;
use rtw_common::model::{InputRecord, OutputRecord};
use rtw_common::wire::WireMessage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Error types for cache persistence.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Cache file could not be read or written.
    #[error("Cache I/O error: {0}")]
    Io(String),

    /// Cache file could not be encoded or decoded.
    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

/// On-disk cache image.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CacheFile {
    /// Version of the file format.
    pub version: u32,
    /// Cached outputs by key.
    pub entries: HashMap<String, OutputRecord>,
    /// Timestamp of last save (Unix epoch seconds).
    pub saved_at: u64,
}

impl CacheFile {
    /// Current file format version.
    pub const CURRENT_VERSION: u32 = 1;
}

/// Memo of model outputs by input.
pub struct OutputCache {
    path: Option<PathBuf>,
    entries: HashMap<String, OutputRecord>,
    key_precision: Option<u8>,
    flush_interval: usize,
    pending: usize,
    hits: u64,
    misses: u64,
}

impl OutputCache {
    /// Cache that is never persisted.
    pub fn in_memory(key_precision: Option<u8>) -> Self {
        Self {
            path: None,
            entries: HashMap::new(),
            key_precision,
            flush_interval: usize::MAX,
            pending: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Open the cache file at `path`, starting empty if it does not exist.
    ///
    /// A file with another format version is ignored and overwritten on the
    /// next flush.
    ///
    /// # Errors
    /// Returns `CacheError` if an existing file cannot be read or decoded.
    pub fn open<P: AsRef<Path>>(
        path: P,
        key_precision: Option<u8>,
        flush_interval: usize,
    ) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        let entries = match load_file(&path)? {
            Some(file) if file.version == CacheFile::CURRENT_VERSION => {
                info!(
                    "Loaded {} cached outputs from {:?} (saved at {})",
                    file.entries.len(),
                    path,
                    file.saved_at
                );
                file.entries
            }
            Some(file) => {
                warn!(
                    "Cache file version {} differs from current {}, starting fresh",
                    file.version,
                    CacheFile::CURRENT_VERSION
                );
                HashMap::new()
            }
            None => {
                debug!("Cache file {:?} does not exist, starting fresh", path);
                HashMap::new()
            }
        };

        Ok(Self {
            path: Some(path),
            entries,
            key_precision,
            flush_interval: flush_interval.max(1),
            pending: 0,
            hits: 0,
            misses: 0,
        })
    }

    /// Open the cache described by a `[cache]` section.
    pub fn from_section(section: &CacheSection) -> Result<Self, CacheError> {
        Self::open(&section.path, section.key_precision, section.flush_interval)
    }

    /// Cache key of `input`.
    pub fn key(&self, input: &InputRecord) -> String {
        let keyed = match self.key_precision {
            Some(p) => input.rounded(p),
            None => *input,
        };
        keyed.encode().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Look up the output for `input`, counting the hit or miss.
    pub fn get(&mut self, input: &InputRecord) -> Option<OutputRecord> {
        let key = self.key(input);
        match self.entries.get(&key) {
            Some(output) => {
                self.hits += 1;
                debug!("Key: {} hit", key);
                Some(*output)
            }
            None => {
                self.misses += 1;
                debug!("Key: {} miss", key);
                None
            }
        }
    }

    /// Store the output for `input`; persists every `flush_interval` inserts.
    ///
    /// # Errors
    /// Returns `CacheError` if a triggered flush fails.
    pub fn insert(&mut self, input: &InputRecord, output: OutputRecord) -> Result<(), CacheError> {
        let key = self.key(input);
        self.entries.insert(key, output);
        self.pending += 1;
        if self.pending >= self.flush_interval {
            self.flush()?;
        }
        Ok(())
    }

    /// Persist unsaved entries.
    ///
    /// # Errors
    /// Returns `CacheError` if the file cannot be written.
    pub fn flush(&mut self) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            self.pending = 0;
            return Ok(());
        };
        if self.pending == 0 {
            return Ok(());
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| CacheError::Io(format!("Failed to create directory: {e}")))?;
        }

        let image = CacheFile {
            version: CacheFile::CURRENT_VERSION,
            entries: self.entries.clone(),
            saved_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        };

        let file = File::create(path)
            .map_err(|e| CacheError::Io(format!("Failed to create cache file: {e}")))?;
        bincode::serialize_into(BufWriter::new(file), &image)
            .map_err(|e| CacheError::Serialization(format!("Failed to serialize cache: {e}")))?;

        debug!("Saved {} cached outputs to {:?}", image.entries.len(), path);
        self.pending = 0;
        Ok(())
    }

    /// Flush and release the cache.
    pub fn close(mut self) -> Result<(), CacheError> {
        self.flush()
    }

    /// Number of cached outputs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that missed.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

fn load_file(path: &Path) -> Result<Option<CacheFile>, CacheError> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)
        .map_err(|e| CacheError::Io(format!("Failed to open cache file: {e}")))?;
    let image: CacheFile = bincode::deserialize_from(BufReader::new(file))
        .map_err(|e| CacheError::Serialization(format!("Failed to deserialize cache: {e}")))?;
    Ok(Some(image))
}
