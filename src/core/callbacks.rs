use std::fmt;

use super::event::Event;
use crate::frame::FrameInfo;

/// Handler for the begin and end hooks
pub type LifecycleHandler = Box<dyn FnMut() + Send>;

/// Handler for the event and key hooks
pub type EventHandler = Box<dyn FnMut(&FrameInfo, Event) + Send>;

/// Named callback slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Begin,
    End,
    Event,
    Key,
}

fn noop_lifecycle() -> LifecycleHandler {
    Box::new(|| {})
}

fn noop_event() -> EventHandler {
    Box::new(|_, _| {})
}

/// Callback registry - four hooks, each always holding a handler
///
/// Unset hooks hold a no-op. Setting a hook replaces the previous handler.
pub struct Callbacks {
    on_begin: LifecycleHandler,
    on_end: LifecycleHandler,
    on_event: EventHandler,
    on_key: EventHandler,
    replaced: [bool; 4],
}

impl Callbacks {
    pub fn new() -> Self {
        Self {
            on_begin: noop_lifecycle(),
            on_end: noop_lifecycle(),
            on_event: noop_event(),
            on_key: noop_event(),
            replaced: [false; 4],
        }
    }

    pub fn set_on_begin(&mut self, handler: impl FnMut() + Send + 'static) {
        self.on_begin = Box::new(handler);
        self.mark(Hook::Begin);
    }

    pub fn set_on_end(&mut self, handler: impl FnMut() + Send + 'static) {
        self.on_end = Box::new(handler);
        self.mark(Hook::End);
    }

    pub fn set_on_event(&mut self, handler: impl FnMut(&FrameInfo, Event) + Send + 'static) {
        self.on_event = Box::new(handler);
        self.mark(Hook::Event);
    }

    pub fn set_on_key(&mut self, handler: impl FnMut(&FrameInfo, Event) + Send + 'static) {
        self.on_key = Box::new(handler);
        self.mark(Hook::Key);
    }

    /// Whether a user handler has been installed for the hook
    pub fn is_set(&self, hook: Hook) -> bool {
        self.replaced[Self::slot(hook)]
    }

    pub fn fire_begin(&mut self) {
        (self.on_begin)();
    }

    pub fn fire_end(&mut self) {
        (self.on_end)();
    }

    /// Dispatch one poll result
    ///
    /// `None` fires nothing. A key event fires `on_event` then `on_key`,
    /// both with the same value. Returns the number of hooks fired.
    pub fn dispatch(&mut self, frame: &FrameInfo, event: Event) -> usize {
        if event.is_none() {
            return 0;
        }

        (self.on_event)(frame, event);
        if event.is_key() {
            (self.on_key)(frame, event);
            return 2;
        }
        1
    }

    fn mark(&mut self, hook: Hook) {
        self.replaced[Self::slot(hook)] = true;
    }

    fn slot(hook: Hook) -> usize {
        match hook {
            Hook::Begin => 0,
            Hook::End => 1,
            Hook::Event => 2,
            Hook::Key => 3,
        }
    }
}

impl Default for Callbacks {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_begin", &self.is_set(Hook::Begin))
            .field("on_end", &self.is_set(Hook::End))
            .field("on_event", &self.is_set(Hook::Event))
            .field("on_key", &self.is_set(Hook::Key))
            .finish()
    }
}
