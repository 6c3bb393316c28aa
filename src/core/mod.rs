pub mod callbacks;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod latch;
pub mod runtime;
pub mod scripted;
#[cfg(any(target_os = "linux", target_os = "windows"))]
pub mod winit_platform;

pub use callbacks::{Callbacks, EventHandler, Hook, LifecycleHandler};
pub use clock::Clock;
pub use config::{RuntimeConfig, WindowDimensions};
pub use error::{Result, RuntimeError};
pub use event::{Event, KeyPhase};
pub use latch::Latch;
pub use runtime::{Runtime, StopHandle};
pub use scripted::{PlatformLog, ScriptedPlatform, ScriptedWindow};
#[cfg(any(target_os = "linux", target_os = "windows"))]
pub use winit_platform::WinitPlatform;

// Re-export traits for convenience
pub use crate::traits::{Platform, PlatformWindow};
