use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

use super::config::RuntimeConfig;
use super::error::{Result, RuntimeError};
use super::event::Event;
use crate::traits::{Platform, PlatformWindow};

/// Shared record of what a scripted backend was asked to do
///
/// Clones share the same record, so a test can keep one and hand the other
/// to the runtime. Callbacks may push their own entries to interleave with
/// the backend's.
#[derive(Debug, Clone, Default)]
pub struct PlatformLog {
    entries: Arc<Mutex<Vec<&'static str>>>,
    polls: Arc<AtomicU64>,
}

impl PlatformLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: &'static str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries().iter().any(|e| *e == entry)
    }

    /// Number of `poll_once` calls so far
    pub fn polls(&self) -> u64 {
        self.polls.load(Ordering::Acquire)
    }

    fn count_poll(&self) {
        self.polls.fetch_add(1, Ordering::AcqRel);
    }
}

/// In-memory window used by the scripted backend
#[derive(Debug)]
pub struct ScriptedWindow {
    title: Mutex<String>,
    visible: AtomicBool,
    show_calls: AtomicUsize,
}

impl ScriptedWindow {
    fn new(title: &str) -> Self {
        Self {
            title: Mutex::new(title.to_owned()),
            visible: AtomicBool::new(false),
            show_calls: AtomicUsize::new(0),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    pub fn show_calls(&self) -> usize {
        self.show_calls.load(Ordering::Acquire)
    }
}

impl PlatformWindow for ScriptedWindow {
    fn show(&self) {
        self.show_calls.fetch_add(1, Ordering::AcqRel);
        self.visible.store(true, Ordering::Release);
    }

    fn set_title(&self, title: &str) {
        *self.title.lock().unwrap_or_else(PoisonError::into_inner) = title.to_owned();
    }

    fn title(&self) -> String {
        self.title
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Headless backend that replays a fixed list of poll results
///
/// Once the script is drained every poll yields `Event::None`, unless the
/// backend repeats the script or asks the loop to close.
#[derive(Debug)]
pub struct ScriptedPlatform {
    script: Vec<Event>,
    pending: VecDeque<Event>,
    repeat: bool,
    close_when_drained: bool,
    failure: Option<String>,
    window: Option<Arc<ScriptedWindow>>,
    windows_created: usize,
    log: PlatformLog,
}

impl ScriptedPlatform {
    pub fn new(script: impl IntoIterator<Item = Event>) -> Self {
        let script: Vec<Event> = script.into_iter().collect();
        Self {
            pending: script.iter().copied().collect(),
            script,
            repeat: false,
            close_when_drained: false,
            failure: None,
            window: None,
            windows_created: 0,
            log: PlatformLog::new(),
        }
    }

    /// Backend with nothing to say; polls forever yield `Event::None`
    pub fn idle() -> Self {
        Self::new(std::iter::empty())
    }

    /// Replay the script from the start whenever it runs out
    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Ask the loop to finish once every scripted event has been polled
    pub fn close_when_drained(mut self) -> Self {
        self.close_when_drained = true;
        self
    }

    /// Make window creation fail as if no display were reachable
    pub fn unavailable(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    pub fn with_log(mut self, log: PlatformLog) -> Self {
        self.log = log;
        self
    }

    pub fn log(&self) -> &PlatformLog {
        &self.log
    }

    pub fn window(&self) -> Option<&Arc<ScriptedWindow>> {
        self.window.as_ref()
    }

    pub fn windows_created(&self) -> usize {
        self.windows_created
    }

    fn drained(&self) -> bool {
        self.pending.is_empty() && !(self.repeat && !self.script.is_empty())
    }
}

impl Platform for ScriptedPlatform {
    fn create_window(&mut self, config: &RuntimeConfig) -> Result<Arc<dyn PlatformWindow>> {
        if let Some(reason) = &self.failure {
            return Err(RuntimeError::BackendUnavailable(reason.clone()));
        }

        let window = match &self.window {
            Some(window) => Arc::clone(window),
            None => {
                debug!(
                    "scripted window {}x{} at ({}, {}) titled {:?}",
                    config.dimensions.width, config.dimensions.height, config.x, config.y, config.title
                );
                self.windows_created += 1;
                let window = Arc::new(ScriptedWindow::new(&config.title));
                self.window = Some(Arc::clone(&window));
                window
            }
        };

        self.log.push("create_window");
        Ok(window)
    }

    fn init_graphics(&mut self) -> Result<()> {
        self.log.push("init_graphics");
        Ok(())
    }

    fn show_window(&mut self) {
        if let Some(window) = &self.window {
            window.show();
            self.log.push("show_window");
        }
    }

    fn poll_once(&mut self) -> Event {
        self.log.count_poll();

        if self.pending.is_empty() && self.repeat {
            self.pending.extend(self.script.iter().copied());
        }
        self.pending.pop_front().unwrap_or_default()
    }

    fn should_close(&self) -> bool {
        self.close_when_drained && self.drained()
    }
}
