// src/config/loader.rs
//! Layered configuration loading
//!
//! Sources, lowest precedence first: built-in defaults, the system file, the
//! local file (or explicitly supplied paths), then `EEG_`-prefixed environment
//! variables. Nested keys use a double underscore, e.g.
//! `EEG_SIMULATOR__EEG_CHANNEL_COUNT=32`.

use crate::config::constants::paths;
use crate::config::BoardConfig;
use crate::error::BoardError;
use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration validation error: {0}")]
    ValidationError(#[from] BoardError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for BoardError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ValidationError(inner) => inner,
            other => BoardError::Config(other.to_string()),
        }
    }
}

/// Configuration loader merging files and environment
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader using the standard system and local paths
    pub fn new() -> Self {
        Self::with_paths(vec![
            PathBuf::from(paths::SYSTEM_CONFIG_PATH),
            PathBuf::from(paths::LOCAL_CONFIG_FILE),
        ])
    }

    /// Create loader with custom paths; later paths override earlier ones
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            env_prefix: paths::ENV_PREFIX.to_string(),
        }
    }

    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Load and validate the merged configuration
    pub fn load(&self) -> Result<BoardConfig, ConfigError> {
        let defaults = toml::to_string(&BoardConfig::default())
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        let mut builder = Config::builder().add_source(File::from_str(&defaults, FileFormat::Toml));
        for path in &self.config_paths {
            debug!(path = %path.display(), exists = path.exists(), "config source");
            builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: BoardConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load a single file that must exist
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<BoardConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        BoardConfig::from_toml_str(&content)
    }

    /// Export configuration to file
    pub fn export_config<P: AsRef<Path>>(config: &BoardConfig, path: P) -> Result<(), ConfigError> {
        std::fs::write(path, config.to_toml_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn test_missing_files_fall_back_to_defaults() {
        let loader = ConfigLoader::with_paths(vec![PathBuf::from("/nonexistent/board.toml")])
            .with_env_prefix("EEG_TEST_NONE");
        assert_eq!(loader.load().unwrap(), BoardConfig::default());
    }

    #[test]
    #[serial]
    fn test_later_files_override_earlier() {
        let base = write_config("error_backoff_ms = 200\nidle_sleep_ms = 2\n");
        let local = write_config("error_backoff_ms = 300\n");

        let loader = ConfigLoader::with_paths(vec![base.path().to_path_buf(), local.path().to_path_buf()])
            .with_env_prefix("EEG_TEST_NONE");
        let config = loader.load().unwrap();

        assert_eq!(config.error_backoff_ms, 300);
        assert_eq!(config.idle_sleep_ms, 2);
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        let file = write_config("error_backoff_ms = 200\n");
        std::env::set_var("EEGLOADER_ERROR_BACKOFF_MS", "400");
        std::env::set_var("EEGLOADER_SIMULATOR__EEG_CHANNEL_COUNT", "16");

        let loader = ConfigLoader::with_paths(vec![file.path().to_path_buf()]).with_env_prefix("EEGLOADER");
        let result = loader.load();

        std::env::remove_var("EEGLOADER_ERROR_BACKOFF_MS");
        std::env::remove_var("EEGLOADER_SIMULATOR__EEG_CHANNEL_COUNT");

        let config = result.unwrap();
        assert_eq!(config.error_backoff_ms, 400);
        assert_eq!(config.simulator.unwrap().eeg_channel_count, 16);
    }

    #[test]
    #[serial]
    fn test_invalid_values_fail_validation() {
        let file = write_config("error_backoff_ms = 0\n");
        let loader = ConfigLoader::with_paths(vec![file.path().to_path_buf()]).with_env_prefix("EEG_TEST_NONE");

        assert!(matches!(loader.load(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_load_file_and_export() {
        assert!(matches!(
            ConfigLoader::load_file("/nonexistent/board.toml"),
            Err(ConfigError::FileNotFound(_))
        ));

        let mut config = BoardConfig::default();
        config.error_backoff_ms = 150;
        let file = NamedTempFile::new().unwrap();
        ConfigLoader::export_config(&config, file.path()).unwrap();

        assert_eq!(ConfigLoader::load_file(file.path()).unwrap(), config);
    }

    #[test]
    fn test_error_conversion() {
        let err: BoardError = ConfigError::ParseError("bad".to_string()).into();
        assert!(matches!(err, BoardError::Config(_)));

        let err: BoardError = ConfigError::ValidationError(BoardError::StreamNotRunning).into();
        assert_eq!(err, BoardError::StreamNotRunning);
    }
}
