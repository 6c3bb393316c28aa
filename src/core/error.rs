use thiserror::Error;

/// Errors surfaced by the runtime and its backends
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The native display or windowing subsystem cannot be reached
    #[error("windowing backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("runtime is already configured")]
    AlreadyConfigured,

    #[error("runtime is not configured; call configure() before {0}()")]
    NotConfigured(&'static str),

    #[error("runtime has already been started")]
    AlreadyStarted,

    #[error("runtime has not been started; call begin() before {0}()")]
    NotStarted(&'static str),

    #[error("runtime has been stopped")]
    Stopped,

    #[error("invalid window geometry {width}x{height}; both sides must be non-zero")]
    InvalidGeometry { width: u32, height: u32 },

    #[error("failed to spawn frame thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("frame thread panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
