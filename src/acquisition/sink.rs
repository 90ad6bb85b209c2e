// src/acquisition/sink.rs
//! Frame sinks fed by the acquisition loop

use crate::config::constants::buffers::MAX_CAPTURE_SAMPLES;
use crate::error::{BoardError, BoardResult};
use crossbeam::channel::{Sender, TrySendError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// Destination for canonical frames
///
/// Pushes arrive from the acquisition thread while other threads may read,
/// so implementations must be thread-safe and must not block for long.
pub trait FrameSink: Send + Sync {
    /// Store a copy of `frame`
    fn push(&self, frame: &[f64]);
}

/// Bounded frame buffer that overwrites the oldest frame when full
pub struct RingBufferSink {
    frames: Mutex<VecDeque<Vec<f64>>>,
    capacity: usize,
    pushed: AtomicU64,
    overwritten: AtomicU64,
}

impl RingBufferSink {
    /// Create a buffer holding up to `capacity` frames
    pub fn new(capacity: usize) -> BoardResult<Self> {
        if capacity == 0 || capacity > MAX_CAPTURE_SAMPLES {
            return Err(BoardError::InvalidBufferSize {
                size: capacity,
                max: MAX_CAPTURE_SAMPLES,
            });
        }
        Ok(Self {
            frames: Mutex::new(VecDeque::new()),
            capacity,
            pushed: AtomicU64::new(0),
            overwritten: AtomicU64::new(0),
        })
    }

    /// Remove and return up to `max` of the oldest frames, or all of them
    pub fn get_board_data(&self, max: Option<usize>) -> Vec<Vec<f64>> {
        let taken = {
            let mut frames = self.frames.lock();
            match max {
                Some(max) if max < frames.len() => return frames.drain(..max).collect(),
                // collect outside the lock
                _ => std::mem::take(&mut *frames),
            }
        };
        Vec::from(taken)
    }

    /// Copy the latest `count` frames without removing them, oldest first
    pub fn get_current_board_data(&self, count: usize) -> Vec<Vec<f64>> {
        let frames = self.frames.lock();
        let skip = frames.len().saturating_sub(count);
        frames.iter().skip(skip).cloned().collect()
    }

    /// Number of frames currently buffered
    pub fn get_board_data_count(&self) -> usize {
        self.frames.lock().len()
    }

    /// Get current buffer utilization (0.0 to 1.0)
    pub fn utilization(&self) -> f32 {
        self.get_board_data_count() as f32 / self.capacity as f32
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames accepted since creation
    pub fn pushed(&self) -> u64 {
        self.pushed.load(Ordering::Relaxed)
    }

    /// Frames lost because the buffer was full
    pub fn overwritten(&self) -> u64 {
        self.overwritten.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.frames.lock().clear();
    }
}

impl FrameSink for RingBufferSink {
    fn push(&self, frame: &[f64]) {
        let mut frames = self.frames.lock();
        if frames.len() == self.capacity {
            frames.pop_front();
            self.overwritten.fetch_add(1, Ordering::Relaxed);
        }
        frames.push_back(frame.to_vec());
        self.pushed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Forward frames to a channel; frames are dropped when the channel is full or closed
impl FrameSink for Sender<Vec<f64>> {
    fn push(&self, frame: &[f64]) {
        match self.try_send(frame.to_vec()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => tracing::trace!("frame channel full, dropping frame"),
            Err(TrySendError::Disconnected(_)) => {
                tracing::trace!("frame channel disconnected, dropping frame")
            }
        }
    }
}
