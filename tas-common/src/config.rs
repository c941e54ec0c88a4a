//! Configuration loading and resolution
//!
//! Bootstrap settings are resolved once at startup in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`TAS_*`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The resolved [`ServiceConfig`] is immutable for the lifetime of the process.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default bind address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8020;

/// Default keyword stop list identifier
pub const DEFAULT_KEYWORD_STOP_LIST: &str = "SmartStoplist.txt";

/// Default upper bound on a single content analysis
pub const DEFAULT_ANALYSIS_TIMEOUT_MS: u64 = 30_000;

/// Default request body limit, in bytes (2 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Default number of sentences in the generated summary
pub const DEFAULT_SUMMARY_SENTENCES: usize = 3;

/// Default metric name prefix for the process endpoint
pub const DEFAULT_METRICS_PREFIX: &str = "topicaxis.tas.processhtml";

/// Environment variable naming an explicit config file
pub const CONFIG_FILE_ENV: &str = "TAS_CONFIG";

const ENV_HOST: &str = "TAS_HOST";
const ENV_PORT: &str = "TAS_PORT";
const ENV_KEYWORD_STOP_LIST: &str = "TAS_KEYWORD_STOP_LIST";
const ENV_CONTENT_TYPE_MATCHING: &str = "TAS_CONTENT_TYPE_MATCHING";
const ENV_MAX_BODY_SIZE: &str = "TAS_MAX_BODY_SIZE";
const ENV_ANALYSIS_TIMEOUT_MS: &str = "TAS_ANALYSIS_TIMEOUT_MS";
const ENV_LOG_LEVEL: &str = "TAS_LOG_LEVEL";

/// How an incoming `content_type` is matched against registered processors
///
/// A deployment uses exactly one discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentTypeMatching {
    /// Case-insensitive equality with a short tag such as `html`
    #[default]
    Exact,
    /// Case-insensitive MIME prefix such as `text/html`
    Prefix,
}

impl FromStr for ContentTypeMatching {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "prefix" => Ok(Self::Prefix),
            other => Err(Error::Config(format!(
                "Unknown content type matching discipline: {} (expected \"exact\" or \"prefix\")",
                other
            ))),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// TOML configuration file contents
///
/// Every field is optional; missing values fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub keyword_stop_list: Option<String>,
    pub content_type_matching: Option<ContentTypeMatching>,
    /// Maximum accepted request body in bytes (0 disables the check)
    pub max_body_size: Option<usize>,
    pub analysis_timeout_ms: Option<u64>,
    pub summary_sentences: Option<usize>,
    pub metrics_prefix: Option<String>,
    pub logging: LoggingConfig,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub keyword_stop_list: Option<String>,
    pub content_type_matching: Option<ContentTypeMatching>,
    pub max_body_size: Option<usize>,
    pub analysis_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
}

/// Fully resolved, immutable service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub keyword_stop_list: String,
    pub content_type_matching: ContentTypeMatching,
    /// `None` disables the request body size check (configured as `0`)
    pub max_body_size: Option<usize>,
    pub analysis_timeout: Duration,
    pub summary_sentences: usize,
    pub metrics_prefix: String,
    pub logging: LoggingConfig,
    /// TOML file the configuration was read from, if any
    pub config_file: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            keyword_stop_list: DEFAULT_KEYWORD_STOP_LIST.to_string(),
            content_type_matching: ContentTypeMatching::default(),
            max_body_size: Some(DEFAULT_MAX_BODY_SIZE),
            analysis_timeout: Duration::from_millis(DEFAULT_ANALYSIS_TIMEOUT_MS),
            summary_sentences: DEFAULT_SUMMARY_SENTENCES,
            metrics_prefix: DEFAULT_METRICS_PREFIX.to_string(),
            logging: LoggingConfig::default(),
            config_file: None,
        }
    }
}

/// Resolves [`ServiceConfig`] from CLI overrides, environment, TOML and defaults
pub struct ConfigResolver {
    overrides: ConfigOverrides,
}

impl ConfigResolver {
    pub fn new(overrides: ConfigOverrides) -> Self {
        Self { overrides }
    }

    /// Resolve the configuration
    ///
    /// A missing implicit config file is not an error. An explicitly named
    /// file (CLI or `TAS_CONFIG`) that cannot be read is.
    pub fn resolve(&self) -> Result<ServiceConfig> {
        let (toml_config, config_file) = match self.locate_config_file()? {
            Some(path) => (load_toml_config(&path)?, Some(path)),
            None => (TomlConfig::default(), None),
        };

        let defaults = ServiceConfig::default();
        let o = &self.overrides;

        let host = o
            .host
            .clone()
            .or(env_value(ENV_HOST))
            .or(toml_config.host)
            .unwrap_or(defaults.host);

        let port = match o.port {
            Some(port) => port,
            None => env_parsed::<u16>(ENV_PORT)?
                .or(toml_config.port)
                .unwrap_or(defaults.port),
        };

        let keyword_stop_list = o
            .keyword_stop_list
            .clone()
            .or(env_value(ENV_KEYWORD_STOP_LIST))
            .or(toml_config.keyword_stop_list)
            .unwrap_or(defaults.keyword_stop_list);

        let content_type_matching = match o.content_type_matching {
            Some(matching) => matching,
            None => env_parsed::<ContentTypeMatching>(ENV_CONTENT_TYPE_MATCHING)?
                .or(toml_config.content_type_matching)
                .unwrap_or(defaults.content_type_matching),
        };

        let max_body_size = match o.max_body_size {
            Some(size) => size,
            None => env_parsed::<usize>(ENV_MAX_BODY_SIZE)?
                .or(toml_config.max_body_size)
                .unwrap_or(DEFAULT_MAX_BODY_SIZE),
        };
        let max_body_size = Some(max_body_size).filter(|size| *size > 0);

        let analysis_timeout_ms = match o.analysis_timeout_ms {
            Some(ms) => ms,
            None => env_parsed::<u64>(ENV_ANALYSIS_TIMEOUT_MS)?
                .or(toml_config.analysis_timeout_ms)
                .unwrap_or(DEFAULT_ANALYSIS_TIMEOUT_MS),
        };
        if analysis_timeout_ms == 0 {
            return Err(Error::Config(
                "analysis_timeout_ms must be greater than zero".to_string(),
            ));
        }

        let summary_sentences = toml_config
            .summary_sentences
            .unwrap_or(defaults.summary_sentences);
        if summary_sentences == 0 {
            return Err(Error::Config(
                "summary_sentences must be greater than zero".to_string(),
            ));
        }

        let mut logging = toml_config.logging;
        if let Some(level) = o.log_level.clone().or(env_value(ENV_LOG_LEVEL)) {
            logging.level = level;
        }

        Ok(ServiceConfig {
            host,
            port,
            keyword_stop_list,
            content_type_matching,
            max_body_size,
            analysis_timeout: Duration::from_millis(analysis_timeout_ms),
            summary_sentences,
            metrics_prefix: toml_config
                .metrics_prefix
                .unwrap_or(defaults.metrics_prefix),
            logging,
            config_file,
        })
    }

    /// Find the TOML file to load
    ///
    /// Explicit paths must exist; platform locations are optional.
    fn locate_config_file(&self) -> Result<Option<PathBuf>> {
        let explicit = self
            .overrides
            .config_file
            .clone()
            .or_else(|| env_value(CONFIG_FILE_ENV).map(PathBuf::from));

        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        Ok(default_config_paths().into_iter().find(|p| p.exists()))
    }
}

/// Platform config file locations, most specific first
///
/// Linux: `~/.config/tas/config.toml`, then `/etc/tas/config.toml`
fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("tas").join("config.toml"));
    }
    if cfg!(unix) {
        paths.push(PathBuf::from("/etc/tas/config.toml"));
    }
    paths
}

/// Load and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Non-empty environment variable value
fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parsed<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_value(name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid value for {}: {} ({})", name, raw, e))),
        None => Ok(None),
    }
}
