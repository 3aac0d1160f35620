//! Bootstrap configuration loading
//!
//! Configuration sources, highest priority first:
//! 1. Command-line arguments (applied by the binary on top of the loaded file)
//! 2. Config file named by `--config` or the `TASTEVEC_CONFIG` environment variable
//! 3. Platform config file (`<config dir>/tastevec/config.toml`)
//! 4. Built-in defaults
//!
//! A missing config file is not an error: defaults are used and
//! [`ConfigSource`] tells the caller which case applied, so it can report
//! it once logging is up. A file that exists but cannot be parsed is a
//! configuration error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TASTEVEC_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub providers: ProviderConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Default: 5731
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    ///
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Tunables for the preference estimation pipeline
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Neighbour rank used for the k-distance curve
    #[serde(default = "default_k_neighbors")]
    pub k_neighbors: usize,

    /// Minimum neighbourhood size (including the point itself) for a core point
    #[serde(default = "default_min_pts")]
    pub min_pts: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            k_neighbors: default_k_neighbors(),
            min_pts: default_min_pts(),
        }
    }
}

/// External provider endpoints and fetch limits
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProviderConfig {
    #[serde(default = "default_acousticbrainz_base_url")]
    pub acousticbrainz_base_url: String,

    #[serde(default = "default_musicbrainz_base_url")]
    pub musicbrainz_base_url: String,

    #[serde(default = "default_coverart_base_url")]
    pub coverart_base_url: String,

    /// Application name sent in the User-Agent header
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Contact address sent in the User-Agent header
    #[serde(default = "default_contact_email")]
    pub contact_email: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on simultaneously outstanding feature requests
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Recordings per search page
    #[serde(default = "default_search_page_size")]
    pub search_page_size: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            acousticbrainz_base_url: default_acousticbrainz_base_url(),
            musicbrainz_base_url: default_musicbrainz_base_url(),
            coverart_base_url: default_coverart_base_url(),
            app_name: default_app_name(),
            contact_email: default_contact_email(),
            request_timeout_secs: default_request_timeout_secs(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            search_page_size: default_search_page_size(),
        }
    }
}

impl ProviderConfig {
    /// User-Agent string as requested by the MusicBrainz API etiquette
    pub fn user_agent(&self) -> String {
        format!("{} ({})", self.app_name, self.contact_email)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5731
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_k_neighbors() -> usize {
    2
}

fn default_min_pts() -> usize {
    2
}

fn default_acousticbrainz_base_url() -> String {
    "https://acousticbrainz.org/api/v1".to_string()
}

fn default_musicbrainz_base_url() -> String {
    "https://musicbrainz.org/ws/2".to_string()
}

fn default_coverart_base_url() -> String {
    "https://coverartarchive.org".to_string()
}

fn default_app_name() -> String {
    "MusicSearchApp".to_string()
}

fn default_contact_email() -> String {
    "your_email@example.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_fetches() -> usize {
    10
}

fn default_search_page_size() -> u32 {
    10
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from a file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read TOML failed ({}): {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration, falling back to defaults when no file is available
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match ConfigSource::of(path) {
            ConfigSource::File(path) => Self::load(&path),
            ConfigSource::MissingFile(_) | ConfigSource::BuiltIn => Ok(Self::default()),
        }
    }
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this file
    File(PathBuf),
    /// A file was named but does not exist; defaults apply
    MissingFile(PathBuf),
    /// No file was named; defaults apply
    BuiltIn,
}

impl ConfigSource {
    pub fn of(path: Option<&Path>) -> Self {
        match path {
            Some(path) if path.exists() => ConfigSource::File(path.to_path_buf()),
            Some(path) => ConfigSource::MissingFile(path.to_path_buf()),
            None => ConfigSource::BuiltIn,
        }
    }
}

/// Resolve which config file to read
///
/// Returns `None` when neither an explicit path nor a platform config file exists.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path().filter(|p| p.exists())
}

/// Platform config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tastevec").join("config.toml"))
}
