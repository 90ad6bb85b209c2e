// src/hal/types.rs
//! Core types exchanged with the amplifier

use serde::{Deserialize, Serialize};

/// Number of trailing raw columns reserved for trigger and sample counter
pub const RESERVED_RAW_CHANNELS: usize = 2;

/// One batch of vendor samples
///
/// Each row holds `channel_count` values: the EEG channels in vendor order,
/// followed by the trigger and the running sample counter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBatch {
    pub channel_count: usize,
    pub rows: Vec<Vec<f64>>,
}

impl RawBatch {
    pub fn new(channel_count: usize, rows: Vec<Vec<f64>>) -> Self {
        Self { channel_count, rows }
    }

    /// Batch without samples, as returned when the device has nothing new
    pub fn empty(channel_count: usize) -> Self {
        Self { channel_count, rows: Vec::new() }
    }

    pub fn sample_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of EEG columns in this batch
    pub fn eeg_channel_count(&self) -> usize {
        self.channel_count.saturating_sub(RESERVED_RAW_CHANNELS)
    }
}

/// Amplifier information reported after connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmplifierInfo {
    pub type_name: String,
    pub serial_number: String,
    pub channel_count: usize,
}
