// src/hal/simulator.rs
//! Simulated eego-style amplifier
//!
//! Produces synthetic EEG (alpha rhythm plus noise) in the vendor raw layout,
//! with the trigger and sample counter in the last two columns. Tests and
//! hardware-free runs drive it through a [`SimulatorHandle`]: queue exact
//! batches, inject stream faults, or make the factory behave like a machine
//! with no amplifier attached.

use crate::config::constants::simulator::*;
use crate::error::{BoardError, DeviceError, StreamError};
use crate::hal::{Amplifier, AmplifierFactory, AmplifierInfo, EegStream, RawBatch, RESERVED_RAW_CHANNELS};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Simulator configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub eeg_channel_count: usize,
    pub signal_amplitude_uv: f64,
    pub noise_uv: f64,
    pub alpha_frequency_hz: f64,
    /// Raise the trigger column every N samples, 0 disables
    pub trigger_interval_samples: u64,
    pub max_samples_per_fetch: usize,
    /// Generate samples in real time when no scripted batch is queued
    pub synthetic: bool,
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            eeg_channel_count: DEFAULT_EEG_CHANNELS,
            signal_amplitude_uv: DEFAULT_SIGNAL_AMPLITUDE_UV,
            noise_uv: DEFAULT_NOISE_UV,
            alpha_frequency_hz: DEFAULT_ALPHA_FREQUENCY_HZ,
            trigger_interval_samples: DEFAULT_TRIGGER_INTERVAL_SAMPLES,
            max_samples_per_fetch: MAX_SAMPLES_PER_FETCH,
            synthetic: true,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimulatorConfig {
    /// Scripted-only simulator: batches come exclusively from the handle
    pub fn scripted(eeg_channel_count: usize) -> Self {
        Self {
            eeg_channel_count,
            synthetic: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), BoardError> {
        if self.eeg_channel_count == 0 || self.eeg_channel_count > MAX_EEG_CHANNELS {
            return Err(BoardError::Config(format!(
                "simulator eeg_channel_count must be in 1..={}, got {}",
                MAX_EEG_CHANNELS, self.eeg_channel_count
            )));
        }
        if self.max_samples_per_fetch == 0 {
            return Err(BoardError::Config(
                "simulator max_samples_per_fetch must be greater than 0".to_string(),
            ));
        }
        if self.signal_amplitude_uv < 0.0 || self.noise_uv < 0.0 {
            return Err(BoardError::Config(
                "simulator amplitude and noise must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    fn raw_channel_count(&self) -> usize {
        self.eeg_channel_count + RESERVED_RAW_CHANNELS
    }
}

/// Outcome of one scripted `get_data` call
#[derive(Debug, Clone)]
pub enum ScriptedFetch {
    Batch(RawBatch),
    Fault(StreamError),
}

#[derive(Debug, Default)]
struct SimulatorState {
    device_present: bool,
    library_error: Option<String>,
    rejected_rate: bool,
    null_stream: bool,
    script: VecDeque<ScriptedFetch>,
    requested_rates: Vec<u32>,
    fetch_count: u64,
    amplifiers_alive: usize,
    streams_alive: usize,
}

/// Control side of a simulator, shared with every amplifier and stream it creates
#[derive(Debug, Clone)]
pub struct SimulatorHandle {
    state: Arc<Mutex<SimulatorState>>,
}

impl SimulatorHandle {
    /// Make the factory report no attached hardware
    pub fn disconnect(&self) {
        self.state.lock().device_present = false;
    }

    pub fn connect(&self) {
        self.state.lock().device_present = true;
    }

    /// Make the factory fail as if the vendor library could not be loaded
    pub fn fail_library(&self, reason: &str) {
        self.state.lock().library_error = Some(reason.to_string());
    }

    pub fn reject_stream_rate(&self, reject: bool) {
        self.state.lock().rejected_rate = reject;
    }

    pub fn return_null_stream(&self, null: bool) {
        self.state.lock().null_stream = null;
    }

    pub fn queue_batch(&self, batch: RawBatch) {
        self.state.lock().script.push_back(ScriptedFetch::Batch(batch));
    }

    pub fn queue_fault(&self, fault: StreamError) {
        self.state.lock().script.push_back(ScriptedFetch::Fault(fault));
    }

    /// Scripted fetches not yet consumed by a stream
    pub fn pending(&self) -> usize {
        self.state.lock().script.len()
    }

    pub fn requested_rates(&self) -> Vec<u32> {
        self.state.lock().requested_rates.clone()
    }

    pub fn fetch_count(&self) -> u64 {
        self.state.lock().fetch_count
    }

    pub fn amplifiers_alive(&self) -> usize {
        self.state.lock().amplifiers_alive
    }

    pub fn streams_alive(&self) -> usize {
        self.state.lock().streams_alive
    }
}

/// Factory creating simulated amplifiers
pub struct SimulatorFactory {
    config: SimulatorConfig,
    state: Arc<Mutex<SimulatorState>>,
}

impl SimulatorFactory {
    /// Create new simulator factory with configuration validation
    pub fn new(config: SimulatorConfig) -> Result<Self, BoardError> {
        config.validate()?;
        let state = SimulatorState {
            device_present: true,
            ..SimulatorState::default()
        };
        Ok(Self {
            config,
            state: Arc::new(Mutex::new(state)),
        })
    }

    pub fn handle(&self) -> SimulatorHandle {
        SimulatorHandle {
            state: self.state.clone(),
        }
    }
}

impl AmplifierFactory for SimulatorFactory {
    fn create_amplifier(&self, library_path: &Path) -> Result<Box<dyn Amplifier>, DeviceError> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.library_error {
            return Err(DeviceError::Library(format!(
                "{}: {}",
                library_path.display(),
                reason
            )));
        }
        if !state.device_present {
            return Err(DeviceError::NotFound("no simulated amplifier attached".to_string()));
        }
        state.amplifiers_alive += 1;
        debug!(library = %library_path.display(), "simulated amplifier created");

        Ok(Box::new(SimulatedAmplifier {
            config: self.config.clone(),
            state: self.state.clone(),
            serial: format!("SIM-{:08X}", self.config.seed as u32),
        }))
    }

    fn requires_vendor_library(&self) -> bool {
        false
    }
}

/// Simulated amplifier handle
pub struct SimulatedAmplifier {
    config: SimulatorConfig,
    state: Arc<Mutex<SimulatorState>>,
    serial: String,
}

impl Amplifier for SimulatedAmplifier {
    fn open_eeg_stream(
        &mut self,
        sampling_rate_hz: u32,
    ) -> Result<Option<Box<dyn EegStream>>, DeviceError> {
        let mut state = self.state.lock();
        state.requested_rates.push(sampling_rate_hz);
        if state.rejected_rate || sampling_rate_hz == 0 {
            return Err(DeviceError::RateRejected(sampling_rate_hz));
        }
        if state.null_stream {
            return Ok(None);
        }
        state.streams_alive += 1;

        Ok(Some(Box::new(SimulatedStream {
            config: self.config.clone(),
            state: self.state.clone(),
            sampling_rate_hz,
            counter: 0,
            rng: StdRng::seed_from_u64(self.config.seed),
            started: Instant::now(),
        })))
    }

    fn info(&self) -> AmplifierInfo {
        AmplifierInfo {
            type_name: "eego simulator".to_string(),
            serial_number: self.serial.clone(),
            channel_count: self.config.raw_channel_count(),
        }
    }
}

impl Drop for SimulatedAmplifier {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.amplifiers_alive = state.amplifiers_alive.saturating_sub(1);
    }
}

/// Simulated acquisition stream
pub struct SimulatedStream {
    config: SimulatorConfig,
    state: Arc<Mutex<SimulatorState>>,
    sampling_rate_hz: u32,
    counter: u64,
    rng: StdRng,
    started: Instant,
}

impl SimulatedStream {
    /// Samples due since the stream opened that have not been delivered yet
    fn samples_due(&self) -> usize {
        let elapsed = self.started.elapsed().as_secs_f64();
        let due = (elapsed * self.sampling_rate_hz as f64) as u64;
        (due.saturating_sub(self.counter) as usize).min(self.config.max_samples_per_fetch)
    }

    fn generate_row(&mut self) -> Vec<f64> {
        let t = self.counter as f64 / self.sampling_rate_hz as f64;
        let mut row = Vec::with_capacity(self.config.raw_channel_count());

        for channel in 0..self.config.eeg_channel_count {
            let phase = channel as f64 * std::f64::consts::FRAC_PI_4;
            let alpha = (2.0 * std::f64::consts::PI * self.config.alpha_frequency_hz * t + phase).sin();
            let noise = if self.config.noise_uv > 0.0 {
                self.rng.gen_range(-self.config.noise_uv..self.config.noise_uv)
            } else {
                0.0
            };
            row.push(self.config.signal_amplitude_uv * alpha + noise);
        }

        let interval = self.config.trigger_interval_samples;
        let trigger = if interval > 0 && self.counter > 0 && self.counter % interval == 0 {
            1.0
        } else {
            0.0
        };
        row.push(trigger);
        row.push(self.counter as f64);

        self.counter += 1;
        row
    }
}

impl EegStream for SimulatedStream {
    fn get_data(&mut self) -> Result<RawBatch, StreamError> {
        let scripted = {
            let mut state = self.state.lock();
            state.fetch_count += 1;
            state.script.pop_front()
        };

        match scripted {
            Some(ScriptedFetch::Batch(batch)) => Ok(batch),
            Some(ScriptedFetch::Fault(fault)) => Err(fault),
            None if self.config.synthetic => {
                let due = self.samples_due();
                let rows = (0..due).map(|_| self.generate_row()).collect();
                Ok(RawBatch::new(self.config.raw_channel_count(), rows))
            }
            None => Ok(RawBatch::empty(self.config.raw_channel_count())),
        }
    }
}

impl Drop for SimulatedStream {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.streams_alive = state.streams_alive.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> &'static Path {
        Path::new("libeego-SDK.so")
    }

    #[test]
    fn test_config_validation() {
        assert!(SimulatorConfig::default().validate().is_ok());

        let mut config = SimulatorConfig::default();
        config.eeg_channel_count = 0;
        assert!(config.validate().is_err());

        let mut config = SimulatorConfig::default();
        config.noise_uv = -1.0;
        assert!(SimulatorFactory::new(config).is_err());
    }

    #[test]
    fn test_factory_failures() {
        let factory = SimulatorFactory::new(SimulatorConfig::default()).unwrap();
        let handle = factory.handle();

        handle.disconnect();
        assert!(matches!(
            factory.create_amplifier(library()),
            Err(DeviceError::NotFound(_))
        ));

        handle.connect();
        handle.fail_library("wrong ELF class");
        match factory.create_amplifier(library()) {
            Err(DeviceError::Library(reason)) => assert!(reason.contains("wrong ELF class")),
            _ => panic!("Expected library error"),
        }
    }

    #[test]
    fn test_scripted_stream() {
        let factory = SimulatorFactory::new(SimulatorConfig::scripted(2)).unwrap();
        let handle = factory.handle();
        let mut amp = factory.create_amplifier(library()).unwrap();
        let mut stream = amp.open_eeg_stream(500).unwrap().unwrap();

        handle.queue_batch(RawBatch::new(4, vec![vec![1.0, 2.0, 0.0, 7.0]]));
        handle.queue_fault(StreamError::Io("usb reset".to_string()));

        assert_eq!(stream.get_data().unwrap().sample_count(), 1);
        assert!(stream.get_data().is_err());
        let empty = stream.get_data().unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.channel_count, 4);
        assert_eq!(handle.requested_rates(), vec![500]);
    }

    #[test]
    fn test_synthetic_rows_layout() {
        let config = SimulatorConfig {
            eeg_channel_count: 3,
            trigger_interval_samples: 2,
            ..SimulatorConfig::default()
        };
        let factory = SimulatorFactory::new(config.clone()).unwrap();
        let mut amp = factory.create_amplifier(library()).unwrap();
        assert_eq!(amp.info().channel_count, 5);
        assert!(amp.open_eeg_stream(1000).unwrap().is_some());

        let mut stream = SimulatedStream {
            config,
            state: factory.state.clone(),
            sampling_rate_hz: 1000,
            counter: 0,
            rng: StdRng::seed_from_u64(1),
            started: Instant::now(),
        };

        let rows: Vec<Vec<f64>> = (0..4).map(|_| stream.generate_row()).collect();
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), 5);
            assert_eq!(row[4], i as f64);
        }
        assert_eq!(rows[2][3], 1.0);
        assert_eq!(rows[1][3], 0.0);
    }

    #[test]
    fn test_handles_are_counted() {
        let factory = SimulatorFactory::new(SimulatorConfig::scripted(4)).unwrap();
        let handle = factory.handle();

        let mut amp = factory.create_amplifier(library()).unwrap();
        let stream = amp.open_eeg_stream(2000).unwrap();
        assert_eq!(handle.amplifiers_alive(), 1);
        assert_eq!(handle.streams_alive(), 1);

        drop(stream);
        drop(amp);
        assert_eq!(handle.amplifiers_alive(), 0);
        assert_eq!(handle.streams_alive(), 0);
    }

    #[test]
    fn test_rejected_and_null_streams() {
        let factory = SimulatorFactory::new(SimulatorConfig::scripted(4)).unwrap();
        let handle = factory.handle();
        let mut amp = factory.create_amplifier(library()).unwrap();

        handle.reject_stream_rate(true);
        assert_eq!(amp.open_eeg_stream(2000).err(), Some(DeviceError::RateRejected(2000)));

        handle.reject_stream_rate(false);
        handle.return_null_stream(true);
        assert!(amp.open_eeg_stream(2000).unwrap().is_none());
        assert_eq!(handle.streams_alive(), 0);
    }
}
