// src/config/constants.rs
//! System-wide configuration constants

/// Acquisition loop timing
pub mod acquisition {
    /// Pause after every batch so empty batches do not busy-spin
    pub const IDLE_SLEEP_MS: u64 = 1;
    pub const MIN_IDLE_SLEEP_MS: u64 = 1;
    /// Pause after a failed read cycle before retrying
    pub const ERROR_BACKOFF_MS: u64 = 100;
    pub const MAX_ERROR_BACKOFF_MS: u64 = 10_000;
    pub const THREAD_NAME: &str = "eeg-acquisition";
}

/// Frame buffer sizing
pub mod buffers {
    /// One day of samples at 250 Hz
    pub const MAX_CAPTURE_SAMPLES: usize = 86_400 * 250;
    pub const DEFAULT_BUFFER_SIZE: usize = 450_000;
}

/// Simulated amplifier defaults
pub mod simulator {
    pub const DEFAULT_EEG_CHANNELS: usize = 8;
    pub const MAX_EEG_CHANNELS: usize = 256;
    pub const DEFAULT_SIGNAL_AMPLITUDE_UV: f64 = 20.0;
    pub const DEFAULT_NOISE_UV: f64 = 2.0;
    pub const DEFAULT_ALPHA_FREQUENCY_HZ: f64 = 10.0;
    pub const DEFAULT_TRIGGER_INTERVAL_SAMPLES: u64 = 2000;
    pub const MAX_SAMPLES_PER_FETCH: usize = 512;
    pub const DEFAULT_SEED: u64 = 0x5eed_ee60;
}

/// File system paths
pub mod paths {
    pub const SYSTEM_CONFIG_PATH: &str = "/etc/eeg/board.toml";
    pub const LOCAL_CONFIG_FILE: &str = "board.toml";
    /// Prefix for environment overrides, e.g. `EEG_ERROR_BACKOFF_MS`
    pub const ENV_PREFIX: &str = "EEG";
}
