use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info, trace};

use super::callbacks::Callbacks;
use super::clock::Clock;
use super::config::RuntimeConfig;
use super::error::{Result, RuntimeError};
use super::event::Event;
use super::latch::Latch;
use crate::frame::FrameInfo;
use crate::traits::{Platform, PlatformWindow};

const FRAME_THREAD_NAME: &str = "rapture-frame";

type PlatformFactory = Box<dyn FnOnce() -> Box<dyn Platform> + Send>;

/// State shared between the caller's thread and the frame thread
struct Shared {
    /// Window created, graphics initialized, window shown
    ready: Latch,
    /// Caller said go (or asked to stop before going)
    start: Latch,
    running: AtomicBool,
    stop: AtomicBool,
    finished: AtomicBool,
    delta_bits: AtomicU32,
    frames: AtomicU64,
    callbacks: Mutex<Callbacks>,
    window: OnceLock<Arc<dyn PlatformWindow>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            ready: Latch::new(),
            start: Latch::new(),
            running: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            delta_bits: AtomicU32::new(0.0f32.to_bits()),
            frames: AtomicU64::new(0),
            callbacks: Mutex::new(Callbacks::new()),
            window: OnceLock::new(),
        }
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn with_callbacks<R>(&self, f: impl FnOnce(&mut Callbacks) -> R) -> R {
        let mut callbacks = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut callbacks)
    }

    fn record_frame(&self, frame: &FrameInfo) {
        self.delta_bits.store(frame.delta.to_bits(), Ordering::Release);
        self.frames.store(frame.number + 1, Ordering::Release);
    }
}

/// Cloneable handle that ends the frame loop from any thread or handler
#[derive(Clone)]
pub struct StopHandle {
    shared: Arc<Shared>,
}

impl StopHandle {
    /// Ask the frame loop to finish after the current iteration
    ///
    /// Before `begin`, the frame thread leaves without firing `on_begin`.
    pub fn stop(&self) {
        if !self.shared.stop.swap(true, Ordering::AcqRel) {
            info!("stop requested");
        }
        self.shared.start.open();
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stop_requested()
    }
}

impl fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopHandle")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Opens the latch when dropped, so waiters are released even if setup unwinds
struct OpenOnDrop<'a>(&'a Latch);

impl Drop for OpenOnDrop<'_> {
    fn drop(&mut self) {
        self.0.open();
    }
}

/// Marks the loop finished when dropped, including while a handler panics
struct FinishOnDrop<'a>(&'a AtomicBool);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Single-window runtime
///
/// `configure` spawns the frame thread, which builds the platform, creates
/// and shows the window, then parks until `begin`. No callback fires before
/// `begin`, and `begin` never runs before the window exists from the frame
/// thread's point of view.
///
/// ```no_run
/// use rapture::core::{Event, Runtime, RuntimeConfig, ScriptedPlatform};
///
/// let mut runtime = Runtime::with_platform(|| ScriptedPlatform::new([Event::press()]));
/// runtime.on_key(|frame, event| println!("{:?} after {}s", event, frame.delta));
/// runtime.configure(RuntimeConfig::new(0, 0, 640, 480, "demo"))?;
/// runtime.begin(false)?;
/// runtime.stop();
/// runtime.join()?;
/// # Ok::<(), rapture::core::RuntimeError>(())
/// ```
pub struct Runtime {
    factory: Option<PlatformFactory>,
    config: Option<RuntimeConfig>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Runtime on the native winit backend
    #[cfg(any(target_os = "linux", target_os = "windows"))]
    pub fn new() -> Self {
        Self::with_platform(super::winit_platform::WinitPlatform::new)
    }

    /// Runtime on a custom backend
    ///
    /// The factory runs on the frame thread, so backends bound to the thread
    /// that created them work unchanged.
    pub fn with_platform<F, P>(factory: F) -> Self
    where
        F: FnOnce() -> P + Send + 'static,
        P: Platform + 'static,
    {
        Self {
            factory: Some(Box::new(move || Box::new(factory()) as Box<dyn Platform>)),
            config: None,
            shared: Arc::new(Shared::new()),
            worker: None,
        }
    }

    /// Record the window configuration and spawn the frame thread
    pub fn configure(&mut self, config: RuntimeConfig) -> Result<()> {
        if self.config.is_some() {
            return Err(RuntimeError::AlreadyConfigured);
        }
        config.validate()?;
        let factory = self.factory.take().ok_or(RuntimeError::AlreadyConfigured)?;

        let shared = Arc::clone(&self.shared);
        let worker_config = config.clone();
        let worker = thread::Builder::new()
            .name(FRAME_THREAD_NAME.to_owned())
            .spawn(move || run_worker(factory, worker_config, shared))?;

        debug!("spawned {} for {:?}", FRAME_THREAD_NAME, config);
        self.config = Some(config);
        self.worker = Some(worker);
        Ok(())
    }

    /// Release the frame loop
    ///
    /// With `blocking`, waits for the loop to finish; it finishes only when
    /// `stop` is called from a handler or another thread, or the backend
    /// asks to close.
    pub fn begin(&mut self, blocking: bool) -> Result<()> {
        if self.config.is_none() {
            return Err(RuntimeError::NotConfigured("begin"));
        }
        if self.shared.stop_requested() {
            return Err(RuntimeError::Stopped);
        }
        if self.shared.running.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyStarted);
        }

        info!("begin (blocking: {})", blocking);
        self.shared.start.open();

        if blocking {
            self.join()?;
        }
        Ok(())
    }

    /// Ask the frame loop to finish; see [`StopHandle::stop`]
    pub fn stop(&self) {
        self.stop_handle().stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Wait for the frame thread to exit
    pub fn join(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        if !self.shared.start.is_open() {
            self.worker = Some(worker);
            return Err(RuntimeError::NotStarted("join"));
        }

        worker.join().map_err(|_| RuntimeError::WorkerPanicked)
    }

    /// Block until the window is created and shown
    pub fn wait_ready(&self) -> Result<()> {
        if self.config.is_none() {
            return Err(RuntimeError::NotConfigured("wait_ready"));
        }
        self.shared.ready.wait();
        self.window().map(|_| ())
    }

    /// Like `wait_ready`, giving up after `timeout`; `Ok(false)` on timeout
    pub fn wait_ready_timeout(&self, timeout: Duration) -> Result<bool> {
        if self.config.is_none() {
            return Err(RuntimeError::NotConfigured("wait_ready_timeout"));
        }
        if !self.shared.ready.wait_timeout(timeout) {
            return Ok(false);
        }
        self.window().map(|_| true)
    }

    /// Retitle the window, waiting for it to exist first
    pub fn set_title(&self, title: &str) -> Result<()> {
        if self.config.is_none() {
            return Err(RuntimeError::NotConfigured("set_title"));
        }
        self.shared.ready.wait();
        let window = self.window()?;
        debug!("set_title {:?}", title);
        window.set_title(title);
        Ok(())
    }

    /// Current window title, once the window exists
    pub fn title(&self) -> Option<String> {
        self.shared.window.get().map(|window| window.title())
    }

    pub fn on_begin(&self, handler: impl FnMut() + Send + 'static) {
        self.shared.with_callbacks(|c| c.set_on_begin(handler));
    }

    pub fn on_end(&self, handler: impl FnMut() + Send + 'static) {
        self.shared.with_callbacks(|c| c.set_on_end(handler));
    }

    pub fn on_event(&self, handler: impl FnMut(&FrameInfo, Event) + Send + 'static) {
        self.shared.with_callbacks(|c| c.set_on_event(handler));
    }

    pub fn on_key(&self, handler: impl FnMut(&FrameInfo, Event) + Send + 'static) {
        self.shared.with_callbacks(|c| c.set_on_key(handler));
    }

    pub fn config(&self) -> Option<&RuntimeConfig> {
        self.config.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Started and the loop has not finished yet
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire) && !self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.shared.finished.load(Ordering::Acquire)
    }

    /// Seconds between the two most recent frames
    pub fn delta_time(&self) -> f32 {
        f32::from_bits(self.shared.delta_bits.load(Ordering::Acquire))
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.shared.frames.load(Ordering::Acquire)
    }

    fn window(&self) -> Result<Arc<dyn PlatformWindow>> {
        self.shared.window.get().cloned().ok_or_else(|| {
            RuntimeError::BackendUnavailable("window was never created".to_owned())
        })
    }
}

#[cfg(any(target_os = "linux", target_os = "windows"))]
impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        // Never leave the frame thread parked at the gate forever
        if self.worker.is_some() {
            self.shared.stop.store(true, Ordering::Release);
            self.shared.start.open();
        }
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("finished", &self.is_finished())
            .field("frames", &self.frame_count())
            .finish()
    }
}

fn run_worker(factory: PlatformFactory, config: RuntimeConfig, shared: Arc<Shared>) {
    let mut platform = factory();

    {
        let _ready = OpenOnDrop(&shared.ready);
        if let Err(err) = setup_window(&mut *platform, &config, &shared) {
            fatal(err);
        }
        debug!("window visible, awaiting start");
    }

    shared.start.wait();
    if shared.stop_requested() {
        info!("stopped before begin; frame loop never ran");
        return;
    }

    frame_loop(&mut *platform, &shared);
}

fn setup_window(platform: &mut dyn Platform, config: &RuntimeConfig, shared: &Shared) -> Result<()> {
    let window = platform.create_window(config)?;
    let _ = shared.window.set(window);
    debug!("window created");

    platform.init_graphics()?;
    platform.show_window();
    Ok(())
}

/// Backend failures at startup end the process
fn fatal(err: RuntimeError) -> ! {
    error!("{}", err);
    eprintln!("rapture: {}", err);
    std::process::exit(1);
}

fn frame_loop(platform: &mut dyn Platform, shared: &Shared) {
    let _finished = FinishOnDrop(&shared.finished);
    let mut clock = Clock::new();

    shared.with_callbacks(|c| c.fire_begin());
    info!("frame loop running");

    while !shared.stop_requested() && !platform.should_close() {
        let frame = clock.tick();
        shared.record_frame(&frame);

        let event = platform.poll_once();
        if !event.is_none() {
            trace!("frame {}: {:?}", frame.number, event);
            shared.with_callbacks(|c| c.dispatch(&frame, event));
        }
    }

    // Not reached after a handler panic, so on_end only fires on a clean exit
    shared.with_callbacks(|c| c.fire_end());
    info!("frame loop finished after {} frames", clock.frame_count());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scripted::ScriptedPlatform;

    #[test]
    fn begin_before_configure_is_rejected() {
        let mut runtime = Runtime::with_platform(ScriptedPlatform::idle);
        let err = runtime.begin(false).unwrap_err();
        assert!(matches!(err, RuntimeError::NotConfigured("begin")));
        assert!(!runtime.is_running());
    }

    #[test]
    fn configure_twice_is_rejected() {
        let mut runtime = Runtime::with_platform(ScriptedPlatform::idle);
        runtime.configure(RuntimeConfig::default()).unwrap();
        let err = runtime.configure(RuntimeConfig::default()).unwrap_err();
        assert!(matches!(err, RuntimeError::AlreadyConfigured));
    }

    #[test]
    fn invalid_geometry_spawns_nothing() {
        let mut runtime = Runtime::with_platform(ScriptedPlatform::idle);
        let err = runtime
            .configure(RuntimeConfig::default().with_size(0, 10))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidGeometry { .. }));
        assert!(!runtime.is_configured());

        // Still configurable after a rejected config
        runtime.configure(RuntimeConfig::default()).unwrap();
        assert!(runtime.is_configured());
    }

    #[test]
    fn join_before_begin_is_rejected() {
        let mut runtime = Runtime::with_platform(ScriptedPlatform::idle);
        runtime.configure(RuntimeConfig::default()).unwrap();
        assert!(matches!(
            runtime.join().unwrap_err(),
            RuntimeError::NotStarted("join")
        ));
    }

    #[test]
    fn begin_after_stop_is_rejected() {
        let mut runtime = Runtime::with_platform(ScriptedPlatform::idle);
        runtime.configure(RuntimeConfig::default()).unwrap();
        runtime.stop();
        assert!(matches!(runtime.begin(false).unwrap_err(), RuntimeError::Stopped));
        runtime.join().unwrap();
    }

    #[test]
    fn debug_shows_state() {
        let runtime = Runtime::with_platform(ScriptedPlatform::idle);
        let debug_str = format!("{:?}", runtime);
        assert!(debug_str.contains("Runtime"));
        assert!(debug_str.contains("running: false"));
    }
}
