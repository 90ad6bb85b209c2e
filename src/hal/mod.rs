// src/hal/mod.rs
//! Hardware abstraction layer for EEG amplifiers

pub mod library;
pub mod simulator;
pub mod traits;
pub mod types;


pub use traits::*;
pub use types::*;
