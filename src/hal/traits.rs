// src/hal/traits.rs
//! Capability traits standing in for the vendor amplifier SDK

use crate::error::{DeviceError, StreamError};
use crate::hal::types::{AmplifierInfo, RawBatch};
use std::path::Path;

/// Creates amplifier handles from a vendor library
pub trait AmplifierFactory: Send {
    /// Load the vendor library at `library_path` and open the first attached amplifier
    fn create_amplifier(&self, library_path: &Path) -> Result<Box<dyn Amplifier>, DeviceError>;

    /// Whether this factory loads the vendor SDK, which only ships for Linux and Windows
    fn requires_vendor_library(&self) -> bool {
        true
    }
}

/// Connection to one physical amplifier
///
/// Dropping the handle closes the connection.
pub trait Amplifier: Send {
    /// Open an EEG stream at `sampling_rate_hz`
    ///
    /// `Ok(None)` is a null stream from the vendor library and is treated as a failure.
    fn open_eeg_stream(
        &mut self,
        sampling_rate_hz: u32,
    ) -> Result<Option<Box<dyn EegStream>>, DeviceError>;

    /// Get amplifier information
    fn info(&self) -> AmplifierInfo;
}

/// An open acquisition stream, closed on drop
pub trait EegStream: Send {
    /// Fetch the next batch of raw samples; may block briefly or return an empty batch
    fn get_data(&mut self) -> Result<RawBatch, StreamError>;
}
