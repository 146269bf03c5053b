use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
    /// Upper bound on a JSON request body, covering both datasets
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_max_payload_bytes() -> usize { 32 * 1024 * 1024 }

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_output_file_name")]
    pub file_name: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            file_name: default_output_file_name(),
        }
    }
}

fn default_output_dir() -> PathBuf { PathBuf::from("uploads") }
fn default_output_file_name() -> String { "results.csv".to_string() }

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MatchingSettings {
    /// Largest radius in meters accepted over HTTP; unlimited when unset
    pub max_radius_m: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with GEOMATCH)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., GEOMATCH__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        settings.try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("GEOMATCH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
