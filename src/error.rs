// src/error.rs
//! Unified error handling for the acquisition core
//!
//! Every public session operation returns [`BoardResult`]. Vendor-library faults
//! are typed as [`DeviceError`] (setup phase) or [`StreamError`] (steady state)
//! and converted here at the lowest possible point, so nothing below the session
//! boundary panics or unwinds into the host.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by the session controller
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoardError {
    /// The factory reported no attached amplifier
    #[error("No devices found: {0}")]
    DeviceNotFound(String),

    /// Unexpected factory or vendor library failure
    #[error("Failed to create amplifier from {library}: {reason}")]
    GeneralError { library: String, reason: String },

    /// Operation attempted before the session was prepared
    #[error("Board is not ready: {0}")]
    BoardNotReady(&'static str),

    #[error("Streaming thread already running")]
    StreamAlreadyRunning,

    #[error("Streaming thread is not running")]
    StreamNotRunning,

    /// The amplifier refused, failed or returned no stream
    #[error("Failed to start acquisition: {0}")]
    StreamThreadError(String),

    #[error("Invalid buffer size {size}, must be in 1..={max}")]
    InvalidBufferSize { size: usize, max: usize },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The operation is not offered by this device family
    #[error("{0} is not supported for this board")]
    UnsupportedOperation(&'static str),

    #[error("Invalid board descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Integer status codes understood by the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ExitCode {
    StatusOk = 0,
    BoardNotReady = 7,
    StreamAlreadyRun = 8,
    InvalidBufferSize = 9,
    StreamThread = 10,
    StreamThreadIsNotRunning = 11,
    InvalidArguments = 13,
    UnsupportedBoard = 14,
    General = 17,
}

impl BoardError {
    /// Host status code for this error
    pub fn code(&self) -> ExitCode {
        match self {
            // the vendor integration has always reported a missing device as "not ready"
            BoardError::DeviceNotFound(_) | BoardError::BoardNotReady(_) => ExitCode::BoardNotReady,
            BoardError::GeneralError { .. } | BoardError::Config(_) => ExitCode::General,
            BoardError::StreamAlreadyRunning => ExitCode::StreamAlreadyRun,
            BoardError::StreamNotRunning => ExitCode::StreamThreadIsNotRunning,
            BoardError::StreamThreadError(_) => ExitCode::StreamThread,
            BoardError::InvalidBufferSize { .. } => ExitCode::InvalidBufferSize,
            BoardError::InvalidArguments(_) | BoardError::InvalidDescriptor(_) => {
                ExitCode::InvalidArguments
            }
            BoardError::UnsupportedOperation(_) => ExitCode::UnsupportedBoard,
        }
    }
}

/// Collapse a session result into the host's integer status
pub fn status_code<T>(result: &BoardResult<T>) -> i32 {
    match result {
        Ok(_) => ExitCode::StatusOk as i32,
        Err(err) => err.code() as i32,
    }
}

/// Faults raised while creating an amplifier or opening a stream
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    /// No hardware attached
    #[error("amplifier not found: {0}")]
    NotFound(String),

    /// Missing or incompatible vendor library
    #[error("vendor library error: {0}")]
    Library(String),

    /// Requested sampling rate rejected by the amplifier
    #[error("sampling rate {0} Hz rejected")]
    RateRejected(u32),

    #[error("{0}")]
    Other(String),
}

/// Faults raised while fetching data from an open stream
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    #[error("transient I/O failure: {0}")]
    Io(String),

    #[error("malformed batch: {0}")]
    MalformedBatch(String),

    #[error("vendor library fault: {0}")]
    Vendor(String),
}

/// Result type alias for session operations
pub type BoardResult<T> = Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(BoardError::DeviceNotFound("x".into()).code(), ExitCode::BoardNotReady);
        assert_eq!(BoardError::StreamAlreadyRunning.code() as i32, 8);
        assert_eq!(BoardError::StreamNotRunning.code() as i32, 11);
        assert_eq!(BoardError::StreamThreadError("x".into()).code() as i32, 10);
        assert_eq!(BoardError::UnsupportedOperation("config_board").code() as i32, 14);
        assert_eq!(
            BoardError::GeneralError { library: "lib".into(), reason: "r".into() }.code() as i32,
            17
        );
    }

    #[test]
    fn test_status_code() {
        let ok: BoardResult<()> = Ok(());
        assert_eq!(status_code(&ok), 0);

        let err: BoardResult<()> = Err(BoardError::InvalidBufferSize { size: 0, max: 10 });
        assert_eq!(status_code(&err), 9);
    }

    #[test]
    fn test_error_display() {
        let err = BoardError::GeneralError {
            library: "libeego-SDK.so".to_string(),
            reason: "cannot open shared object".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("libeego-SDK.so"));
        assert!(display.contains("cannot open shared object"));

        let display = format!("{}", BoardError::UnsupportedOperation("config_board"));
        assert!(display.contains("config_board"));
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BoardError>();
        assert_send_sync::<DeviceError>();
        assert_send_sync::<StreamError>();
    }
}
