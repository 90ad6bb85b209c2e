// src/board/session.rs
//! Board session controller
//!
//! Coordinates the amplifier handle, the acquisition thread and the frame
//! buffer through the session lifecycle:
//!
//! ```text
//! Uninitialized --prepare--> Prepared --start--> Streaming --stop--> Prepared
//!       any state --release--> Released
//! ```
//!
//! Every operation reports failures as [`BoardError`] values; none of them
//! panic, and `release_session` (also run on drop) always succeeds.

use crate::acquisition::{FrameRemapper, FrameSink, RingBufferSink, StatsSnapshot, StreamWorker, WorkerContext};
use crate::board::descriptor::{BoardDescriptor, BoardId};
use crate::config::BoardConfig;
use crate::error::{BoardError, BoardResult, DeviceError};
use crate::hal::library::{ensure_platform_supported, resolve_library_path};
use crate::hal::simulator::{SimulatorFactory, SimulatorHandle};
use crate::hal::{Amplifier, AmplifierFactory};
use crate::utils::time::{SystemTimeProvider, TimeProvider};
use crossbeam::queue::SegQueue;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Externally visible lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Prepared,
    Streaming,
    Released,
}

/// Session with one ANT Neuro eego amplifier
pub struct AntNeuroBoard {
    descriptor: BoardDescriptor,
    config: BoardConfig,
    library_path: PathBuf,
    factory: Box<dyn AmplifierFactory>,
    clock: Arc<dyn TimeProvider>,

    initialized: bool,
    released: bool,
    amplifier: Option<Box<dyn Amplifier>>,
    worker: Option<StreamWorker>,
    buffer: Option<Arc<RingBufferSink>>,
    markers: Arc<SegQueue<f64>>,
}

impl AntNeuroBoard {
    /// Create a session for a known board model
    pub fn new(
        board_id: BoardId,
        factory: impl AmplifierFactory + 'static,
        config: BoardConfig,
    ) -> BoardResult<Self> {
        Self::with_descriptor(board_id.descriptor()?, factory, config)
    }

    /// Create a session with an explicit frame layout
    pub fn with_descriptor(
        descriptor: BoardDescriptor,
        factory: impl AmplifierFactory + 'static,
        config: BoardConfig,
    ) -> BoardResult<Self> {
        descriptor.validate()?;
        config.validate()?;

        let library_path = config
            .library_path
            .clone()
            .unwrap_or_else(resolve_library_path);
        debug!(board = %descriptor.name, library = %library_path.display(), "use dyn lib");

        Ok(Self {
            descriptor,
            config,
            library_path,
            factory: Box::new(factory),
            clock: Arc::new(SystemTimeProvider),
            initialized: false,
            released: false,
            amplifier: None,
            worker: None,
            buffer: None,
            markers: Arc::new(SegQueue::new()),
        })
    }

    /// Session backed by the in-process simulator configured in `config.simulator`
    pub fn simulated(board_id: BoardId, config: BoardConfig) -> BoardResult<(Self, SimulatorHandle)> {
        let factory = SimulatorFactory::new(config.simulator.clone().unwrap_or_default())?;
        let handle = factory.handle();
        Ok((Self::new(board_id, factory, config)?, handle))
    }

    /// Replace the clock used for frame timestamps
    pub fn with_clock(mut self, clock: Arc<dyn TimeProvider>) -> Self {
        self.clock = clock;
        self
    }

    pub fn descriptor(&self) -> &BoardDescriptor {
        &self.descriptor
    }

    pub fn library_path(&self) -> &Path {
        &self.library_path
    }

    pub fn state(&self) -> SessionState {
        if self.worker.is_some() {
            SessionState::Streaming
        } else if self.initialized {
            SessionState::Prepared
        } else if self.released {
            SessionState::Released
        } else {
            SessionState::Uninitialized
        }
    }

    pub fn is_prepared(&self) -> bool {
        self.initialized
    }

    pub fn is_streaming(&self) -> bool {
        self.worker.is_some()
    }

    /// Connect to the amplifier; a no-op when already prepared
    pub fn prepare_session(&mut self) -> BoardResult<()> {
        if self.initialized {
            info!("Session is already prepared");
            return Ok(());
        }
        if self.factory.requires_vendor_library() {
            ensure_platform_supported()?;
        }

        let amplifier = self
            .factory
            .create_amplifier(&self.library_path)
            .map_err(|err| match err {
                DeviceError::NotFound(reason) => {
                    error!(%reason, "No devices found");
                    BoardError::DeviceNotFound(reason)
                }
                other => {
                    error!(library = %self.library_path.display(), error = %other, "Failed to create factory");
                    BoardError::GeneralError {
                        library: self.library_path.display().to_string(),
                        reason: other.to_string(),
                    }
                }
            })?;

        let info = amplifier.info();
        info!(
            amplifier = %info.type_name,
            serial = %info.serial_number,
            channels = info.channel_count,
            "amplifier connected"
        );

        self.amplifier = Some(amplifier);
        self.initialized = true;
        self.released = false;
        Ok(())
    }

    /// Start streaming into a fresh ring buffer of `buffer_size` frames
    pub fn start_stream(&mut self, buffer_size: usize) -> BoardResult<()> {
        self.check_can_start()?;
        let buffer = Arc::new(RingBufferSink::new(buffer_size)?);
        self.launch(buffer.clone())?;
        self.buffer = Some(buffer);
        Ok(())
    }

    /// Start streaming with the configured default buffer size
    pub fn start_stream_default(&mut self) -> BoardResult<()> {
        self.start_stream(self.config.buffer_size)
    }

    /// Start streaming into a caller-owned sink
    pub fn start_stream_into(&mut self, sink: Arc<dyn FrameSink>) -> BoardResult<()> {
        self.check_can_start()?;
        self.launch(sink)?;
        self.buffer = None;
        Ok(())
    }

    fn check_can_start(&self) -> BoardResult<()> {
        if self.worker.is_some() {
            error!("Streaming thread already running");
            return Err(BoardError::StreamAlreadyRunning);
        }
        if self.amplifier.is_none() {
            error!("Amplifier is not created");
            return Err(BoardError::BoardNotReady("amplifier is not created"));
        }
        Ok(())
    }

    fn launch(&mut self, sink: Arc<dyn FrameSink>) -> BoardResult<()> {
        let sampling_rate = self.descriptor.sampling_rate;
        let amplifier = self
            .amplifier
            .as_mut()
            .ok_or(BoardError::BoardNotReady("amplifier is not created"))?;

        let stream = match amplifier.open_eeg_stream(sampling_rate) {
            Ok(Some(stream)) => stream,
            Ok(None) => {
                error!("Failed to start acquisition: amplifier returned no stream");
                return Err(BoardError::StreamThreadError("amplifier returned no stream".to_string()));
            }
            Err(err) => {
                error!(error = %err, "Failed to start acquisition");
                return Err(BoardError::StreamThreadError(err.to_string()));
            }
        };

        let remapper = FrameRemapper::new(self.descriptor.clone())?;
        let context = WorkerContext {
            sink,
            markers: self.markers.clone(),
            clock: self.clock.clone(),
            timing: self.config.loop_timing(),
            thread_name: self.config.thread_name.clone(),
        };
        let worker = StreamWorker::spawn(stream, remapper, context).map_err(|err| {
            error!(error = %err, "Failed to spawn acquisition thread");
            BoardError::StreamThreadError(err.to_string())
        })?;

        info!(sampling_rate, "streaming started");
        self.worker = Some(worker);
        Ok(())
    }

    /// Stop the acquisition thread and close the stream
    ///
    /// Returns once the thread has exited; no frame is pushed afterwards.
    pub fn stop_stream(&mut self) -> BoardResult<()> {
        let worker = self.worker.take().ok_or(BoardError::StreamNotRunning)?;
        let stats = worker.stats();
        if let Some(stream) = worker.stop() {
            drop(stream);
        }
        info!(
            frames = stats.frames_pushed,
            faults = stats.faults,
            "streaming stopped"
        );
        Ok(())
    }

    /// Stop streaming if needed, free buffers and close the amplifier
    ///
    /// Always succeeds and may be called any number of times.
    pub fn release_session(&mut self) -> BoardResult<()> {
        if self.initialized {
            if self.worker.is_some() {
                let _ = self.stop_stream();
            }
            self.free_packages();
            self.initialized = false;
        }
        if let Some(amplifier) = self.amplifier.take() {
            drop(amplifier);
            debug!("amplifier released");
        }
        self.released = true;
        Ok(())
    }

    fn free_packages(&mut self) {
        self.buffer = None;
        while self.markers.pop().is_some() {}
    }

    /// This device family has no runtime configuration channel
    pub fn config_board(&self, config: &str) -> BoardResult<String> {
        debug!(request = config, "config_board is not supported for AntNeuro");
        Err(BoardError::UnsupportedOperation("config_board"))
    }

    /// Queue `value` for the marker slot of the next frame
    ///
    /// Markers queued while no stream runs land on the first frames of the next stream.
    pub fn insert_marker(&self, value: f64) -> BoardResult<()> {
        if !self.initialized {
            return Err(BoardError::BoardNotReady("session is not prepared"));
        }
        if self.descriptor.marker_channel.is_none() {
            return Err(BoardError::UnsupportedOperation("insert_marker"));
        }
        if value == 0.0 || !value.is_finite() {
            return Err(BoardError::InvalidArguments(format!(
                "marker value must be finite and non-zero, got {}",
                value
            )));
        }
        self.markers.push(value);
        Ok(())
    }

    fn data_buffer(&self) -> BoardResult<&RingBufferSink> {
        self.buffer
            .as_deref()
            .ok_or(BoardError::BoardNotReady("no data buffer, start streaming first"))
    }

    /// Remove and return up to `max` of the oldest buffered frames
    pub fn get_board_data(&self, max: Option<usize>) -> BoardResult<Vec<Vec<f64>>> {
        Ok(self.data_buffer()?.get_board_data(max))
    }

    /// Copy the latest `count` frames without removing them
    pub fn get_current_board_data(&self, count: usize) -> BoardResult<Vec<Vec<f64>>> {
        Ok(self.data_buffer()?.get_current_board_data(count))
    }

    pub fn get_board_data_count(&self) -> BoardResult<usize> {
        Ok(self.data_buffer()?.get_board_data_count())
    }

    /// Counters of the running acquisition thread
    pub fn stats(&self) -> Option<StatsSnapshot> {
        self.worker.as_ref().map(StreamWorker::stats)
    }
}

impl Drop for AntNeuroBoard {
    fn drop(&mut self) {
        if self.initialized || self.amplifier.is_some() {
            warn!("board dropped without release_session, releasing");
        }
        let _ = self.release_session();
    }
}
