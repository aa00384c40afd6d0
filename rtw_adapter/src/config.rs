//! Adapter service configuration (`adapter.toml`).
//!
//! ```toml
//! [shared]
//! service_name = "rtw-adapter-01"
//! log_level = "info"
//!
//! [model]
//! name = "echo"              # registry name, or symbol prefix when procedural
//! library = "libmodel.so"    # procedural only
//!
//! [listener]
//! bind = "0.0.0.0:1234"
//! cached_message_lifetime_s = 60
//!
//! [output]
//! target = "192.168.253.100:4321"
//! framed = false
//!
//! [service]
//! batch_size = 6
//! poll_interval_ms = 100
//!
//! [cache]
//! enabled = true
//! path = "db"
//! key_precision = 4
//! flush_interval = 64
//! ```

use rtw_common::config::{ConfigError, SharedConfig, Validate};
use rtw_common::consts::{
    DEFAULT_BATCH_SIZE, DEFAULT_CACHE_FILE, DEFAULT_CACHED_MESSAGE_LIFETIME_S,
    DEFAULT_LISTEN_ADDR, DEFAULT_MODEL_LIBRARY, DEFAULT_OUTPUT_ADDR,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level adapter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterConfig {
    /// Common fields.
    pub shared: SharedConfig,
    /// Model selection.
    pub model: ModelSection,
    /// Input listener.
    #[serde(default)]
    pub listener: ListenerSection,
    /// Output sender.
    #[serde(default)]
    pub output: OutputSection,
    /// Service loop.
    #[serde(default)]
    pub service: ServiceSection,
    /// Output cache.
    #[serde(default)]
    pub cache: CacheSection,
}

/// `[model]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSection {
    /// Registered model name (instance) or generated model name (procedural).
    pub name: String,
    /// Model shared library, path or bare file name.
    #[serde(default = "default_library")]
    pub library: PathBuf,
    /// Library search directories; empty means the standard ones.
    #[serde(default)]
    pub search_dirs: Vec<PathBuf>,
}

/// `[listener]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListenerSection {
    /// UDP bind address for input datagrams.
    #[serde(default = "default_listen_addr")]
    pub bind: String,
    /// How long the last message may be reused when the queue is empty [s].
    #[serde(default = "default_cached_message_lifetime_s")]
    pub cached_message_lifetime_s: u64,
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// UDP destination of output datagrams.
    #[serde(default = "default_output_addr")]
    pub target: String,
    /// Prefix outputs with a transport header.
    #[serde(default)]
    pub framed: bool,
}

/// `[service]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSection {
    /// Maximum messages executed per loop iteration.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Wait for input before re-checking the running flag [ms].
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    /// Serve repeated inputs from the output cache.
    #[serde(default)]
    pub enabled: bool,
    /// Cache file.
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
    /// Round inputs to this many decimals before keying.
    #[serde(default)]
    pub key_precision: Option<u8>,
    /// Persist after this many new entries.
    #[serde(default = "default_flush_interval")]
    pub flush_interval: usize,
}

fn default_library() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_LIBRARY)
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_cached_message_lifetime_s() -> u64 {
    DEFAULT_CACHED_MESSAGE_LIFETIME_S
}

fn default_output_addr() -> String {
    DEFAULT_OUTPUT_ADDR.to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_FILE)
}

fn default_flush_interval() -> usize {
    64
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            name: "echo".to_string(),
            library: default_library(),
            search_dirs: Vec::new(),
        }
    }
}

impl Default for ListenerSection {
    fn default() -> Self {
        Self {
            bind: default_listen_addr(),
            cached_message_lifetime_s: default_cached_message_lifetime_s(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            target: default_output_addr(),
            framed: false,
        }
    }
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_cache_path(),
            key_precision: None,
            flush_interval: default_flush_interval(),
        }
    }
}

impl AdapterConfig {
    /// Configuration with every section at its default, running `model`.
    pub fn for_model(model: &str) -> Self {
        Self {
            shared: SharedConfig {
                log_level: Default::default(),
                service_name: "rtw-adapter".to_string(),
            },
            model: ModelSection {
                name: model.to_string(),
                ..ModelSection::default()
            },
            listener: ListenerSection::default(),
            output: OutputSection::default(),
            service: ServiceSection::default(),
            cache: CacheSection::default(),
        }
    }

    /// Lifetime of the last received message.
    pub fn cached_message_lifetime(&self) -> Duration {
        Duration::from_secs(self.listener.cached_message_lifetime_s)
    }

    /// Input wait per loop iteration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.service.poll_interval_ms)
    }
}

/// Returns `true` if `name` can prefix C symbols (`[A-Za-z_][A-Za-z0-9_]*`).
fn is_symbol_prefix(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_addr(field: &str, value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .parse()
        .map_err(|e| ConfigError::ValidationError(format!("{field} '{value}': {e}")))
}

impl Validate for AdapterConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if !is_symbol_prefix(&self.model.name) {
            return Err(ConfigError::ValidationError(format!(
                "model.name '{}' is not a valid model identifier",
                self.model.name
            )));
        }

        parse_addr("listener.bind", &self.listener.bind)?;
        parse_addr("output.target", &self.output.target)?;

        if self.service.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "service.batch_size must be > 0".to_string(),
            ));
        }
        if self.service.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "service.poll_interval_ms must be > 0".to_string(),
            ));
        }

        if self.cache.enabled && self.cache.flush_interval == 0 {
            return Err(ConfigError::ValidationError(
                "cache.flush_interval must be > 0".to_string(),
            ));
        }
        if let Some(p) = self.cache.key_precision.filter(|p| *p > 7) {
            return Err(ConfigError::ValidationError(format!(
                "cache.key_precision {p} exceeds f32 precision (max 7)"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtw_common::config::ConfigLoader;

    const MINIMAL: &str = r#"
[shared]
service_name = "rtw-test"

[model]
name = "echo"
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = AdapterConfig::from_toml(MINIMAL).unwrap();
        config.validate().unwrap();

        assert_eq!(config.model.library, PathBuf::from("libmodel.so"));
        assert_eq!(config.listener.bind, "0.0.0.0:1234");
        assert_eq!(config.cached_message_lifetime(), Duration::from_secs(60));
        assert_eq!(config.service.batch_size, 6);
        assert!(!config.cache.enabled);
        assert!(!config.output.framed);
    }

    #[test]
    fn full_config_parses() {
        let config = AdapterConfig::from_toml(
            r#"
[shared]
service_name = "rtw-test"
log_level = "debug"

[model]
name = "plant_controller"
library = "/opt/models/libplant.so"
search_dirs = ["/opt/models"]

[listener]
bind = "127.0.0.1:5000"
cached_message_lifetime_s = 5

[output]
target = "127.0.0.1:5001"
framed = true

[service]
batch_size = 2
poll_interval_ms = 10

[cache]
enabled = true
path = "/tmp/rtw.db"
key_precision = 4
flush_interval = 8
"#,
        )
        .unwrap();
        config.validate().unwrap();

        assert_eq!(config.model.name, "plant_controller");
        assert_eq!(config.model.search_dirs, vec![PathBuf::from("/opt/models")]);
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.cache.key_precision, Some(4));
        assert!(config.output.framed);
    }

    #[test]
    fn shipped_config_valid() {
        let config = AdapterConfig::from_toml(include_str!("../config/adapter.toml")).unwrap();
        config.validate().unwrap();
        assert!(config.cache.enabled);
        assert_eq!(config.output.target, "192.168.253.100:4321");
    }

    #[test]
    fn realtime_section_rejected() {
        let text = format!("{MINIMAL}\n[realtime]\nenabled = true\n");
        assert!(AdapterConfig::from_toml(&text).is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let text = format!("{MINIMAL}\n[scheduler]\nrate = 10\n");
        assert!(matches!(
            AdapterConfig::from_toml(&text),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn invalid_model_name_rejected() {
        let mut config = AdapterConfig::for_model("9lives");
        assert!(config.validate().is_err());
        config.model.name = "plant-model".to_string();
        assert!(config.validate().is_err());
        config.model.name = "_plant_1".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_addresses_rejected() {
        let mut config = AdapterConfig::for_model("echo");
        config.output.target = "not-an-address".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn numeric_bounds_checked() {
        let mut config = AdapterConfig::for_model("echo");
        config.service.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = AdapterConfig::for_model("echo");
        config.cache.key_precision = Some(9);
        assert!(config.validate().is_err());

        let mut config = AdapterConfig::for_model("echo");
        config.service.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }
}
