use parking_lot::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Time provider trait for dependency injection and testing
pub trait TimeProvider: Send + Sync {
    /// Wall-clock seconds since the Unix epoch
    fn now_secs(&self) -> f64;
}

/// System time provider using actual system clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_secs(&self) -> f64 {
        get_timestamp()
    }
}

/// Mock time provider for deterministic testing
///
/// Every reading advances the clock by `step_secs`, so consecutive frames get
/// distinct, predictable timestamps.
pub struct MockTimeProvider {
    current: Mutex<f64>,
    step_secs: f64,
}

impl MockTimeProvider {
    pub fn new(initial_secs: f64) -> Self {
        Self::with_step(initial_secs, 0.0)
    }

    pub fn with_step(initial_secs: f64, step_secs: f64) -> Self {
        Self {
            current: Mutex::new(initial_secs),
            step_secs,
        }
    }

    pub fn set_time(&self, secs: f64) {
        *self.current.lock() = secs;
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_secs(&self) -> f64 {
        let mut current = self.current.lock();
        let now = *current;
        *current += self.step_secs;
        now
    }
}

/// Host timestamp written into the timestamp slot of every frame
pub fn get_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_timestamp_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(SystemTimeProvider.now_secs() > 1_577_836_800.0);
    }

    #[test]
    fn test_mock_time_steps() {
        let clock = MockTimeProvider::with_step(10.0, 0.5);
        assert_eq!(clock.now_secs(), 10.0);
        assert_eq!(clock.now_secs(), 10.5);

        clock.set_time(100.0);
        assert_eq!(clock.now_secs(), 100.0);

        let fixed = MockTimeProvider::new(3.0);
        assert_eq!(fixed.now_secs(), 3.0);
        assert_eq!(fixed.now_secs(), 3.0);
    }
}
