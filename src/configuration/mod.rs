use serde::Deserialize;
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File read error")]
    FileError,

    #[error("Deserialization error:{0}")]
    DeserializationError(String),

    #[error("Missing configuration: {0}")]
    MissingValue(String),
}

/// Which configuration store the calculator reads tariffs from.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TariffSource {
    Standard,
    Enhanced,
    Snapshot,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub http: HttpConfig,
    pub tariff_source: TariffSource,
    /// JSON tariff file, used with `tariff_source = "snapshot"`
    pub snapshot_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
}

impl Context {
    pub fn new(config_file: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            config: Config::new(config_file)?,
        })
    }
}

impl Config {
    pub fn new(config_file: &str) -> Result<Self, ConfigError> {
        let config_str = fs::read_to_string(config_file).map_err(|_| ConfigError::FileError)?;
        Self::from_json(&config_str)
    }

    pub fn from_json(config_str: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(config_str)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;
        if config.tariff_source == TariffSource::Snapshot && config.snapshot_path.is_none() {
            return Err(ConfigError::MissingValue("snapshot_path".to_string()));
        }
        Ok(config)
    }
}
