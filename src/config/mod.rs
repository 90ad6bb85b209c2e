// src/config/mod.rs
//! Session configuration

pub mod constants;
pub mod loader;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};

use crate::acquisition::LoopTiming;
use crate::error::{BoardError, BoardResult};
use crate::hal::simulator::SimulatorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Settings for one board session
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BoardConfig {
    /// Vendor library to hand to the factory; resolved next to the executable when unset
    #[serde(default)]
    pub library_path: Option<PathBuf>,

    #[serde(default = "defaults::idle_sleep_ms")]
    pub idle_sleep_ms: u64,

    #[serde(default = "defaults::error_backoff_ms")]
    pub error_backoff_ms: u64,

    /// Frames kept by the session's ring buffer when the caller passes no size
    #[serde(default = "defaults::buffer_size")]
    pub buffer_size: usize,

    #[serde(default = "defaults::thread_name")]
    pub thread_name: String,

    #[serde(default)]
    pub simulator: Option<SimulatorConfig>,
}

/// Default value providers using constants
mod defaults {
    use crate::config::constants::*;

    pub fn idle_sleep_ms() -> u64 { acquisition::IDLE_SLEEP_MS }
    pub fn error_backoff_ms() -> u64 { acquisition::ERROR_BACKOFF_MS }
    pub fn buffer_size() -> usize { buffers::DEFAULT_BUFFER_SIZE }
    pub fn thread_name() -> String { acquisition::THREAD_NAME.to_string() }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            idle_sleep_ms: defaults::idle_sleep_ms(),
            error_backoff_ms: defaults::error_backoff_ms(),
            buffer_size: defaults::buffer_size(),
            thread_name: defaults::thread_name(),
            simulator: None,
        }
    }
}

impl BoardConfig {
    /// Validate configuration ranges
    pub fn validate(&self) -> BoardResult<()> {
        if self.error_backoff_ms == 0 || self.error_backoff_ms > acquisition::MAX_ERROR_BACKOFF_MS {
            return Err(BoardError::Config(format!(
                "error_backoff_ms must be in 1..={}, got {}",
                acquisition::MAX_ERROR_BACKOFF_MS,
                self.error_backoff_ms
            )));
        }
        if self.idle_sleep_ms < acquisition::MIN_IDLE_SLEEP_MS {
            return Err(BoardError::Config(format!(
                "idle_sleep_ms must be at least {}, got {}",
                acquisition::MIN_IDLE_SLEEP_MS,
                self.idle_sleep_ms
            )));
        }
        if self.idle_sleep_ms > self.error_backoff_ms {
            return Err(BoardError::Config(
                "idle_sleep_ms must not exceed error_backoff_ms".to_string(),
            ));
        }
        if self.buffer_size == 0 || self.buffer_size > buffers::MAX_CAPTURE_SAMPLES {
            return Err(BoardError::InvalidBufferSize {
                size: self.buffer_size,
                max: buffers::MAX_CAPTURE_SAMPLES,
            });
        }
        if self.thread_name.trim().is_empty() {
            return Err(BoardError::Config("thread_name cannot be empty".to_string()));
        }
        if let Some(simulator) = &self.simulator {
            simulator.validate()?;
        }
        Ok(())
    }

    /// Loop pauses derived from this configuration
    pub fn loop_timing(&self) -> LoopTiming {
        LoopTiming {
            idle_sleep: Duration::from_millis(self.idle_sleep_ms),
            error_backoff: Duration::from_millis(self.error_backoff_ms),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BoardConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BoardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.loop_timing(), LoopTiming::default());
    }

    #[test]
    fn test_toml_defaults_and_overrides() {
        let config = BoardConfig::from_toml_str(
            r#"
            error_backoff_ms = 250
            library_path = "/opt/eego/libeego-SDK.so"

            [simulator]
            eeg_channel_count = 32
            "#,
        )
        .unwrap();

        assert_eq!(config.error_backoff_ms, 250);
        assert_eq!(config.idle_sleep_ms, acquisition::IDLE_SLEEP_MS);
        assert_eq!(config.library_path, Some(PathBuf::from("/opt/eego/libeego-SDK.so")));
        assert_eq!(config.simulator.unwrap().eeg_channel_count, 32);
    }

    #[test]
    fn test_validation_failures() {
        let mut config = BoardConfig::default();
        config.error_backoff_ms = 0;
        assert!(config.validate().is_err());

        let mut config = BoardConfig::default();
        config.idle_sleep_ms = 500;
        assert!(config.validate().is_err());

        let mut config = BoardConfig::default();
        config.idle_sleep_ms = 0;
        assert!(matches!(config.validate(), Err(BoardError::Config(_))));

        let mut config = BoardConfig::default();
        config.buffer_size = 0;
        assert!(matches!(config.validate(), Err(BoardError::InvalidBufferSize { .. })));

        let mut config = BoardConfig::default();
        config.simulator = Some(SimulatorConfig {
            eeg_channel_count: 0,
            ..SimulatorConfig::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = BoardConfig::default();
        config.simulator = Some(SimulatorConfig::scripted(4));
        let text = config.to_toml_string().unwrap();
        assert_eq!(BoardConfig::from_toml_str(&text).unwrap(), config);
    }
}
