//! Logging setup.
//!
//! Everything logs through the `log` facade; [`init`] installs `env_logger` with the levels
//! from [`LogConfig`]. A `RUST_LOG` value, when present, is applied last and wins.

use std::collections::BTreeMap;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

const VALID_LEVELS: [&str; 6] = ["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"];

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default log level for all modules
    pub level: String,
    /// Per-module levels, keyed by module path (e.g. `eldendata::ingest`)
    pub modules: BTreeMap<String, String>,
    pub include_timestamp: bool,
    pub include_module: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            modules: Self::default_modules(),
            include_timestamp: true,
            include_module: true,
        }
    }
}

impl LogConfig {
    fn default_modules() -> BTreeMap<String, String> {
        let mut modules = BTreeMap::new();
        modules.insert("sled".to_string(), "WARN".to_string());
        modules.insert("actix_server".to_string(), "INFO".to_string());
        modules
    }

    /// Checks every configured level.
    pub fn validate(&self) -> Result<(), LoggingError> {
        parse_level(&self.level)?;
        for (module, level) in &self.modules {
            parse_level(level)
                .map_err(|_| LoggingError::InvalidModuleLevel(module.clone(), level.clone()))?;
        }
        Ok(())
    }
}

/// Logging errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),
    #[error("Invalid log level for module '{0}': {1}")]
    InvalidModuleLevel(String, String),
    #[error("Logger already initialized: {0}")]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

/// Parses a level name, case-insensitively.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    let upper = level.trim().to_uppercase();
    if !VALID_LEVELS.contains(&upper.as_str()) {
        return Err(LoggingError::InvalidLevel(level.to_string()));
    }
    upper
        .parse::<LevelFilter>()
        .map_err(|_| LoggingError::InvalidLevel(level.to_string()))
}

fn builder(config: &LogConfig) -> Result<env_logger::Builder, LoggingError> {
    config.validate()?;
    let mut builder = env_logger::Builder::new();
    builder.filter_level(parse_level(&config.level)?);
    for (module, level) in &config.modules {
        builder.filter_module(module, parse_level(level)?);
    }
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    if config.include_timestamp {
        builder.format_timestamp_millis();
    } else {
        builder.format_timestamp(None);
    }
    builder.format_module_path(config.include_module);
    Ok(builder)
}

/// Installs the global logger. Fails if a logger is already installed.
pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
    builder(config)?.try_init()?;
    log::debug!("logging initialized at {}", config.level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels() {
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level(" WARN ").unwrap(), LevelFilter::Warn);
        assert!(matches!(parse_level("loud"), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn validation_names_the_module() {
        let mut config = LogConfig::default();
        assert!(config.validate().is_ok());
        config.modules.insert("eldendata::ingest".to_string(), "chatty".to_string());
        match config.validate() {
            Err(LoggingError::InvalidModuleLevel(module, _)) => assert_eq!(module, "eldendata::ingest"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn second_init_fails() {
        let config = LogConfig::default();
        let _ = init(&config);
        assert!(init(&config).is_err());
    }

    #[test]
    fn deserializes_partial_toml() {
        let config: LogConfig = toml::from_str("level = \"debug\"").unwrap();
        assert_eq!(config.level, "debug");
        assert!(config.include_timestamp);
        assert_eq!(config.modules["sled"], "WARN");
    }
}
