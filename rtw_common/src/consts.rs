//! System-wide constants for the RTW workspace.
//!
//! Single source of truth for wire sizes, queue limits and default paths.

/// Maximum size of a transport datagram in bytes.
pub const MAX_DATAGRAM_SIZE: usize = 4096;

/// Transport header size in bytes (`!IIII`).
pub const TRANSPORT_HEADER_SIZE: usize = 16;

/// Transport type of an input message.
pub const TR_TYPE_INPUT: u32 = 1;

/// Transport type of an output message.
pub const TR_TYPE_OUTPUT: u32 = 2;

/// Capacity of the listener input queue (oldest message dropped on overflow).
pub const INPUT_QUEUE_DEPTH: usize = 20;

/// Default lifetime of the last received message when served from cache.
pub const DEFAULT_CACHED_MESSAGE_LIFETIME_S: u64 = 60;

/// Default number of messages executed per service iteration.
pub const DEFAULT_BATCH_SIZE: usize = 6;

/// Default listener bind address.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:1234";

/// Default output target address.
pub const DEFAULT_OUTPUT_ADDR: &str = "127.0.0.1:4321";

/// Default model shared library file name.
pub const DEFAULT_MODEL_LIBRARY: &str = "libmodel.so";

/// Default output cache file name.
pub const DEFAULT_CACHE_FILE: &str = "db";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/rtw/adapter.toml";
