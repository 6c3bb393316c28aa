use std::sync::Arc;

use crate::core::config::RuntimeConfig;
use crate::core::error::Result;
use crate::core::event::Event;

/// Handle to the created window, shareable with the caller's thread
pub trait PlatformWindow: Send + Sync {
    /// Make the window visible; calling it again is harmless
    fn show(&self);

    /// Replace the visible window title
    fn set_title(&self, title: &str);

    fn title(&self) -> String;
}

/// Windowing backend - everything the runtime needs from a native platform
///
/// Lives on the runtime's frame thread for its whole life.
pub trait Platform {
    /// Create the (still hidden) window
    ///
    /// An error here means the backend is unavailable; the runtime treats it as fatal.
    fn create_window(&mut self, config: &RuntimeConfig) -> Result<Arc<dyn PlatformWindow>>;

    /// Graphics context hook, runs between window creation and show
    fn init_graphics(&mut self) -> Result<()> {
        Ok(())
    }

    fn show_window(&mut self);

    /// Retrieve at most one pending event without blocking
    fn poll_once(&mut self) -> Event;

    /// Backend asks the loop to finish, e.g. the window was closed
    fn should_close(&self) -> bool {
        false
    }
}

impl<P: Platform + ?Sized> Platform for Box<P> {
    fn create_window(&mut self, config: &RuntimeConfig) -> Result<Arc<dyn PlatformWindow>> {
        (**self).create_window(config)
    }

    fn init_graphics(&mut self) -> Result<()> {
        (**self).init_graphics()
    }

    fn show_window(&mut self) {
        (**self).show_window()
    }

    fn poll_once(&mut self) -> Event {
        (**self).poll_once()
    }

    fn should_close(&self) -> bool {
        (**self).should_close()
    }
}
