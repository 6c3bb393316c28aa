pub mod cli;
pub mod core;
pub mod frame;
pub mod traits;

pub use crate::core::{Event, KeyPhase, Runtime, RuntimeConfig, RuntimeError};
pub use crate::frame::FrameInfo;
