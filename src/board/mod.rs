// src/board/mod.rs
//! Board models and the session controller

pub mod descriptor;
pub mod session;

pub use descriptor::{BoardDescriptor, BoardId};
pub use session::{AntNeuroBoard, SessionState};
