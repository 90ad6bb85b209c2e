// src/acquisition/mod.rs
//! Signal acquisition: frame remapping, sinks and the background loop

pub mod remap;
pub mod sink;
pub mod worker;

pub use remap::*;
pub use sink::*;
pub use worker::*;
