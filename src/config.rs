//! Application configuration.
//!
//! Loaded from a TOML file when one is given, otherwise defaults; `ELDENDATA_*` environment
//! variables override either.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EldenDataError, EldenDataResult};
use crate::logging::LogConfig;
use crate::service::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "ELDENDATA_CONFIG";

fn default_environment() -> String {
    "development".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("data/eldendata")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> usize {
    MAX_PAGE_SIZE
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/csv")
}

fn default_clean_reingest() -> Option<String> {
    Some("armors".to_string())
}

/// Batch ingestion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Directory holding the source CSV files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Collection dropped entirely before a run
    #[serde(default = "default_clean_reingest")]
    pub clean_reingest_collection: Option<String>,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            clean_reingest_collection: default_clean_reingest(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Directory of the sled database
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Allowed origins; `*` allows any
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            storage_path: default_storage_path(),
            host: default_host(),
            port: default_port(),
            api_prefix: default_api_prefix(),
            cors_origins: default_cors_origins(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            log: LogConfig::default(),
            ingestion: IngestionConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> EldenDataResult<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the file at `path`, or `ELDENDATA_CONFIG`, or falls back to defaults; then applies
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> EldenDataResult<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    EldenDataError::configuration_error(format!(
                        "cannot read config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                log::info!("Loading configuration from {}", path.display());
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> EldenDataResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `ELDENDATA_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> EldenDataResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(environment) = lookup("ELDENDATA_ENVIRONMENT") {
            self.environment = environment;
        }
        if let Some(path) = lookup("ELDENDATA_STORAGE_PATH") {
            self.storage_path = PathBuf::from(path);
        }
        if let Some(host) = lookup("ELDENDATA_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("ELDENDATA_PORT") {
            self.port = port.trim().parse().map_err(|_| {
                EldenDataError::configuration_error(format!("ELDENDATA_PORT is not a port: {}", port))
            })?;
        }
        if let Some(level) = lookup("ELDENDATA_LOG_LEVEL") {
            self.log.level = level;
        }
        if let Some(origins) = lookup("ELDENDATA_CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(dir) = lookup("ELDENDATA_DATA_DIR") {
            self.ingestion.data_dir = PathBuf::from(dir);
        }
        self.validate()
    }

    pub fn validate(&self) -> EldenDataResult<()> {
        if self.max_page_size == 0 {
            return Err(EldenDataError::configuration_error("max_page_size must be at least 1"));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(EldenDataError::configuration_error(format!(
                "default_page_size must be between 1 and {}",
                self.max_page_size
            )));
        }
        if !self.api_prefix.starts_with('/') {
            return Err(EldenDataError::configuration_error(format!(
                "api_prefix must start with '/', got '{}'",
                self.api_prefix
            )));
        }
        self.log
            .validate()
            .map_err(|e| EldenDataError::configuration_error(e.to_string()))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.ingestion.clean_reingest_collection.as_deref(), Some("armors"));
        assert!(config.allows_any_origin());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            port = 9100
            storage_path = "/tmp/elden"

            [log]
            level = "debug"

            [ingestion]
            data_dir = "csv"
            clean_reingest_collection = "weapons"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.storage_path, PathBuf::from("/tmp/elden"));
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.ingestion.data_dir, PathBuf::from("csv"));
        assert_eq!(config.ingestion.clean_reingest_collection.as_deref(), Some("weapons"));
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn invalid_files_are_configuration_errors() {
        assert!(matches!(
            AppConfig::from_toml_str("port = \"eighty\""),
            Err(EldenDataError::TomlDe(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("max_page_size = 10\ndefault_page_size = 20"),
            Err(EldenDataError::Config(_))
        ));
        assert!(matches!(
            AppConfig::load(Some(Path::new("/nonexistent/eldendata.toml"))),
            Err(EldenDataError::Config(_))
        ));
    }

    #[test]
    fn overrides() {
        let vars: HashMap<&str, &str> = [
            ("ELDENDATA_PORT", "9200"),
            ("ELDENDATA_HOST", "0.0.0.0"),
            ("ELDENDATA_CORS_ORIGINS", "http://localhost:3000, https://example.org"),
            ("ELDENDATA_DATA_DIR", "/srv/csv"),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:9200");
        assert_eq!(config.cors_origins, vec!["http://localhost:3000", "https://example.org"]);
        assert!(!config.allows_any_origin());
        assert_eq!(config.ingestion.data_dir, PathBuf::from("/srv/csv"));

        let mut config = AppConfig::default();
        assert!(config
            .apply_overrides(|key| (key == "ELDENDATA_PORT").then(|| "http".to_string()))
            .is_err());
    }
}
