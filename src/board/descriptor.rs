// src/board/descriptor.rs
//! Static board descriptors
//!
//! A descriptor fixes the canonical frame layout of a device model: which frame
//! slots receive EEG data, the package counter, the trigger, the host
//! timestamp and the optional marker. The table ships embedded as JSON keyed by
//! numeric board id.

use crate::error::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

const BOARDS_JSON: &str = include_str!("boards.json");

/// Read-only metadata for one device model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDescriptor {
    #[serde(default)]
    pub name: String,
    pub sampling_rate: u32,
    pub num_rows: usize,
    pub eeg_channels: Vec<usize>,
    pub package_num_channel: usize,
    /// Auxiliary slots; index 0 receives the trigger
    pub other_channels: Vec<usize>,
    pub timestamp_channel: usize,
    #[serde(default)]
    pub marker_channel: Option<usize>,
}

impl BoardDescriptor {
    /// Check that every referenced slot fits the frame and no slot is used twice
    pub fn validate(&self) -> BoardResult<()> {
        if self.sampling_rate == 0 {
            return Err(BoardError::InvalidDescriptor(
                "sampling_rate must be positive".to_string(),
            ));
        }
        if self.other_channels.is_empty() {
            return Err(BoardError::InvalidDescriptor(
                "other_channels must hold the trigger slot".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for &index in self.referenced_slots() {
            if index >= self.num_rows {
                return Err(BoardError::InvalidDescriptor(format!(
                    "slot {} out of range for num_rows {}",
                    index, self.num_rows
                )));
            }
            if !seen.insert(index) {
                return Err(BoardError::InvalidDescriptor(format!(
                    "slot {} referenced more than once",
                    index
                )));
            }
        }
        Ok(())
    }

    /// Slot receiving the trigger column
    pub fn trigger_channel(&self) -> usize {
        self.other_channels[0]
    }

    fn referenced_slots(&self) -> impl Iterator<Item = &usize> {
        self.eeg_channels
            .iter()
            .chain(self.other_channels.iter())
            .chain(std::iter::once(&self.package_num_channel))
            .chain(std::iter::once(&self.timestamp_channel))
            .chain(self.marker_channel.iter())
    }
}

/// Supported ANT Neuro eego amplifier models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum BoardId {
    AntNeuroEe410 = 24,
    AntNeuroEe411 = 25,
    AntNeuroEe430 = 26,
    AntNeuroEe211 = 27,
    AntNeuroEe212 = 28,
    AntNeuroEe213 = 29,
    AntNeuroEe214 = 30,
    AntNeuroEe215 = 31,
    AntNeuroEe221 = 32,
    AntNeuroEe222 = 33,
    AntNeuroEe223 = 34,
    AntNeuroEe224 = 35,
    AntNeuroEe225 = 36,
}

impl BoardId {
    pub const ALL: [BoardId; 13] = [
        BoardId::AntNeuroEe410,
        BoardId::AntNeuroEe411,
        BoardId::AntNeuroEe430,
        BoardId::AntNeuroEe211,
        BoardId::AntNeuroEe212,
        BoardId::AntNeuroEe213,
        BoardId::AntNeuroEe214,
        BoardId::AntNeuroEe215,
        BoardId::AntNeuroEe221,
        BoardId::AntNeuroEe222,
        BoardId::AntNeuroEe223,
        BoardId::AntNeuroEe224,
        BoardId::AntNeuroEe225,
    ];

    pub fn id(self) -> i32 {
        self as i32
    }

    /// Look up a board by its numeric id
    pub fn from_id(id: i32) -> BoardResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|board| board.id() == id)
            .ok_or_else(|| BoardError::InvalidArguments(format!("unknown board id {}", id)))
    }

    /// Validated descriptor for this board
    pub fn descriptor(self) -> BoardResult<BoardDescriptor> {
        let mut table = load_descriptor_table()?;
        let descriptor = table.remove(&self.id().to_string()).ok_or_else(|| {
            BoardError::InvalidDescriptor(format!("no descriptor for board id {}", self.id()))
        })?;
        descriptor.validate()?;
        Ok(descriptor)
    }
}

fn load_descriptor_table() -> BoardResult<HashMap<String, BoardDescriptor>> {
    serde_json::from_str(BOARDS_JSON)
        .map_err(|e| BoardError::InvalidDescriptor(format!("board table: {}", e)))
}
