// src/acquisition/worker.rs
//! Background acquisition loop
//!
//! One named thread per streaming session. It owns the stream for as long as it
//! runs and hands it back through the join handle, so the controller can only
//! close the stream once the thread is gone.

use crate::acquisition::remap::{FrameRemapper, RemapError};
use crate::acquisition::sink::FrameSink;
use crate::config::constants::acquisition::{ERROR_BACKOFF_MS, IDLE_SLEEP_MS, THREAD_NAME};
use crate::error::StreamError;
use crate::hal::EegStream;
use crate::utils::time::TimeProvider;
use crossbeam::queue::SegQueue;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

/// Pauses taken by the loop between read cycles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopTiming {
    /// After every successful cycle
    pub idle_sleep: Duration,
    /// After a failed cycle
    pub error_backoff: Duration,
}

impl Default for LoopTiming {
    fn default() -> Self {
        Self {
            idle_sleep: Duration::from_millis(IDLE_SLEEP_MS),
            error_backoff: Duration::from_millis(ERROR_BACKOFF_MS),
        }
    }
}

/// Everything the loop needs besides the stream and the remapper
pub struct WorkerContext {
    pub sink: Arc<dyn FrameSink>,
    pub markers: Arc<SegQueue<f64>>,
    pub clock: Arc<dyn TimeProvider>,
    pub timing: LoopTiming,
    pub thread_name: String,
}

/// Counters maintained by the acquisition thread
#[derive(Debug, Default)]
pub struct AcquisitionStats {
    frames_pushed: AtomicU64,
    batches: AtomicU64,
    faults: AtomicU64,
}

/// Point-in-time copy of [`AcquisitionStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub frames_pushed: u64,
    pub batches: u64,
    pub faults: u64,
}

impl AcquisitionStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_pushed: self.frames_pushed.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            faults: self.faults.load(Ordering::Relaxed),
        }
    }
}

/// A failed read cycle; logged and retried, never propagated
#[derive(Debug, Error)]
enum CycleError {
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Remap(#[from] RemapError),
}

/// Handle to a running acquisition thread
pub struct StreamWorker {
    keep_alive: Arc<AtomicBool>,
    stats: Arc<AcquisitionStats>,
    handle: JoinHandle<Box<dyn EegStream>>,
}

impl StreamWorker {
    /// Start the acquisition thread
    pub fn spawn(
        stream: Box<dyn EegStream>,
        remapper: FrameRemapper,
        context: WorkerContext,
    ) -> std::io::Result<Self> {
        let keep_alive = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(AcquisitionStats::default());

        let thread_keep_alive = keep_alive.clone();
        let thread_stats = stats.clone();
        let name = if context.thread_name.is_empty() {
            THREAD_NAME.to_string()
        } else {
            context.thread_name.clone()
        };

        let handle = thread::Builder::new().name(name).spawn(move || {
            let mut stream = stream;
            read_thread(stream.as_mut(), remapper, &context, &thread_keep_alive, &thread_stats);
            stream
        })?;

        Ok(Self {
            keep_alive,
            stats,
            handle,
        })
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Whether the thread is still executing
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Clear the run-flag and wait for the thread to exit
    ///
    /// Returns the stream for the caller to close, or `None` if the thread panicked.
    pub fn stop(self) -> Option<Box<dyn EegStream>> {
        self.keep_alive.store(false, Ordering::Release);
        match self.handle.join() {
            Ok(stream) => Some(stream),
            Err(_) => {
                error!("acquisition thread panicked");
                None
            }
        }
    }
}

fn read_thread(
    stream: &mut dyn EegStream,
    mut remapper: FrameRemapper,
    context: &WorkerContext,
    keep_alive: &AtomicBool,
    stats: &AcquisitionStats,
) {
    info!(board = %remapper.descriptor().name, "acquisition thread started");

    while keep_alive.load(Ordering::Acquire) {
        match read_cycle(stream, &mut remapper, context, stats) {
            Ok(_) => thread::sleep(context.timing.idle_sleep),
            Err(err) => {
                stats.faults.fetch_add(1, Ordering::Relaxed);
                error!(error = %err, "exception in data thread");
                thread::sleep(context.timing.error_backoff);
            }
        }
    }

    debug!(stats = ?stats.snapshot(), "acquisition thread exiting");
}

/// Fetch one batch and push every row in delivery order
fn read_cycle(
    stream: &mut dyn EegStream,
    remapper: &mut FrameRemapper,
    context: &WorkerContext,
    stats: &AcquisitionStats,
) -> Result<usize, CycleError> {
    let batch = stream.get_data()?;
    stats.batches.fetch_add(1, Ordering::Relaxed);

    for row in &batch.rows {
        remapper.remap(row, batch.channel_count, context.clock.now_secs())?;
        let marker = context.markers.pop().unwrap_or(0.0);
        context.sink.push(remapper.stamp_marker(marker));
        stats.frames_pushed.fetch_add(1, Ordering::Relaxed);
    }

    Ok(batch.sample_count())
}
