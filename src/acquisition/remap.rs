// src/acquisition/remap.rs
//! Raw vendor sample to canonical frame mapping
//!
//! Raw rows carry the EEG channels in vendor order followed by the trigger and
//! the running sample counter. EEG columns map onto the descriptor's EEG slots
//! in order, truncated to whichever side is shorter. The scratch frame is
//! reused between rows, so slots without fresh data keep their previous value.

use crate::board::BoardDescriptor;
use crate::error::BoardResult;
use crate::hal::RESERVED_RAW_CHANNELS;
use thiserror::Error;

/// A raw row that cannot be mapped
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemapError {
    #[error("batch reports {0} channels, at least 2 are required for trigger and counter")]
    TooFewChannels(usize),

    #[error("raw row holds {actual} values, batch reports {expected} channels")]
    ShortRow { expected: usize, actual: usize },
}

/// Maps raw rows into a reused canonical frame
#[derive(Debug, Clone)]
pub struct FrameRemapper {
    descriptor: BoardDescriptor,
    frame: Vec<f64>,
}

impl FrameRemapper {
    /// Create a remapper with a zeroed frame of `num_rows` slots
    pub fn new(descriptor: BoardDescriptor) -> BoardResult<Self> {
        descriptor.validate()?;
        let frame = vec![0.0; descriptor.num_rows];
        Ok(Self { descriptor, frame })
    }

    /// Write one raw row into the frame and return it
    ///
    /// `channel_count` is the batch's reported width and is authoritative over
    /// any extra values the row may carry.
    pub fn remap(
        &mut self,
        row: &[f64],
        channel_count: usize,
        timestamp: f64,
    ) -> Result<&[f64], RemapError> {
        if channel_count < RESERVED_RAW_CHANNELS {
            return Err(RemapError::TooFewChannels(channel_count));
        }
        if row.len() < channel_count {
            return Err(RemapError::ShortRow {
                expected: channel_count,
                actual: row.len(),
            });
        }

        let descr = &self.descriptor;
        let eeg_count = descr
            .eeg_channels
            .len()
            .min(channel_count - RESERVED_RAW_CHANNELS);
        for (j, &slot) in descr.eeg_channels.iter().take(eeg_count).enumerate() {
            self.frame[slot] = row[j];
        }
        self.frame[descr.package_num_channel] = row[channel_count - 1];
        self.frame[descr.trigger_channel()] = row[channel_count - 2];
        self.frame[descr.timestamp_channel] = timestamp;

        Ok(&self.frame)
    }

    /// Write `value` into the marker slot, if the board has one
    pub fn stamp_marker(&mut self, value: f64) -> &[f64] {
        if let Some(slot) = self.descriptor.marker_channel {
            self.frame[slot] = value;
        }
        &self.frame
    }

    pub fn frame(&self) -> &[f64] {
        &self.frame
    }

    pub fn descriptor(&self) -> &BoardDescriptor {
        &self.descriptor
    }
}
