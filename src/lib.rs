//! EEG-Core: real-time acquisition core for ANT Neuro eego amplifiers
//!
//! This library connects to an amplifier through an injectable vendor
//! factory, runs a background acquisition thread and delivers every sample as
//! a fixed-layout frame. It features:
//!
//! - Hardware abstraction over the vendor factory, amplifier and stream handles
//! - Canonical frame remapping driven by board descriptors
//! - A fault-tolerant acquisition loop with typed errors
//! - A session state machine with host-compatible status codes
//! - Layered TOML and environment configuration
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use eeg_core::board::{AntNeuroBoard, BoardId};
//! use eeg_core::config::BoardConfig;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (mut board, _simulator) = AntNeuroBoard::simulated(BoardId::AntNeuroEe410, BoardConfig::default())?;
//!
//!     board.prepare_session()?;
//!     board.start_stream(45_000)?;
//!     std::thread::sleep(std::time::Duration::from_millis(100));
//!     board.stop_stream()?;
//!
//!     for frame in board.get_board_data(None)? {
//!         println!("Frame: {:?}", frame);
//!     }
//!     board.release_session()?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod acquisition;
pub mod board;
pub mod config;
pub mod error;
pub mod hal;
pub mod utils;

// Re-export commonly used types for convenience
pub use acquisition::{FrameRemapper, FrameSink, RingBufferSink, StatsSnapshot};
pub use board::{AntNeuroBoard, BoardDescriptor, BoardId, SessionState};
pub use config::{BoardConfig, ConfigLoader};
pub use error::{status_code, BoardError, BoardResult, DeviceError, ExitCode, StreamError};
pub use hal::{Amplifier, AmplifierFactory, AmplifierInfo, EegStream, RawBatch};
pub use utils::time::{get_timestamp, TimeProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Real-time EEG amplifier acquisition core".to_string(),
        boards: BoardId::ALL.iter().map(|id| format!("{:?} ({})", id, id.id())).collect(),
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// Supported board models
    pub boards: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert_eq!(info.name, NAME);
        assert_eq!(info.version, VERSION);
        assert_eq!(info.boards.len(), BoardId::ALL.len());
    }

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert!(!NAME.is_empty());
    }
}
