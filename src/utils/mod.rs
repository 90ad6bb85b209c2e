//! Common utilities for the acquisition core
//!
//! Currently the host clock and its test double.

pub mod time;

pub use time::{get_timestamp, MockTimeProvider, SystemTimeProvider, TimeProvider};
