use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use super::config::RuntimeConfig;
use super::error::{Result, RuntimeError};
use super::event::{Event, KeyPhase};
use crate::traits::{Platform, PlatformWindow};

const STARTUP_PUMPS: usize = 200;
const STARTUP_PUMP_TIMEOUT: Duration = Duration::from_millis(10);

impl PlatformWindow for Window {
    fn show(&self) {
        self.set_visible(true);
    }

    fn set_title(&self, title: &str) {
        Window::set_title(self, title);
    }

    fn title(&self) -> String {
        Window::title(self)
    }
}

/// Map a winit key state to the runtime's key phase
pub fn key_phase(state: ElementState) -> KeyPhase {
    match state {
        ElementState::Pressed => KeyPhase::Press,
        ElementState::Released => KeyPhase::Release,
    }
}

/// Translate a winit window event; anything but keyboard input is `Event::None`
pub fn translate(event: &WindowEvent) -> Event {
    match event {
        WindowEvent::KeyboardInput { event, .. } => Event::from(key_phase(event.state)),
        _ => Event::None,
    }
}

/// Handler state driven by `pump_app_events`
#[derive(Default)]
struct PumpState {
    attributes: Option<WindowAttributes>,
    window: Option<Arc<Window>>,
    creation_error: Option<String>,
    pending: VecDeque<Event>,
    close_requested: bool,
}

impl ApplicationHandler for PumpState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Some(attributes) = self.attributes.take() {
            match event_loop.create_window(attributes) {
                Ok(window) => self.window = Some(Arc::new(window)),
                Err(e) => self.creation_error = Some(e.to_string()),
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close_requested = true,
            other => {
                let event = translate(&other);
                if !event.is_none() {
                    self.pending.push_back(event);
                }
            }
        }
    }
}

/// Native backend on winit, pumped without blocking from the frame thread
///
/// The event loop is built lazily inside `create_window`, i.e. on the thread
/// that will keep polling it.
#[derive(Default)]
pub struct WinitPlatform {
    event_loop: Option<EventLoop<()>>,
    state: PumpState,
}

impl WinitPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn attributes(config: &RuntimeConfig) -> WindowAttributes {
        Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(PhysicalSize::new(
                config.dimensions.width,
                config.dimensions.height,
            ))
            .with_position(PhysicalPosition::new(config.x, config.y))
            .with_visible(false)
    }
}

fn build_event_loop() -> Result<EventLoop<()>> {
    let mut builder = EventLoop::builder();

    #[cfg(target_os = "linux")]
    winit::platform::x11::EventLoopBuilderExtX11::with_any_thread(&mut builder, true);
    #[cfg(target_os = "windows")]
    winit::platform::windows::EventLoopBuilderExtWindows::with_any_thread(&mut builder, true);

    builder
        .build()
        .map_err(|e| RuntimeError::BackendUnavailable(e.to_string()))
}

impl Platform for WinitPlatform {
    fn create_window(&mut self, config: &RuntimeConfig) -> Result<Arc<dyn PlatformWindow>> {
        if let Some(window) = &self.state.window {
            let window: Arc<dyn PlatformWindow> = window.clone();
            return Ok(window);
        }

        let event_loop = match self.event_loop.take() {
            Some(event_loop) => event_loop,
            None => build_event_loop()?,
        };
        let event_loop = self.event_loop.insert(event_loop);

        self.state.attributes = Some(Self::attributes(config));
        for _ in 0..STARTUP_PUMPS {
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(STARTUP_PUMP_TIMEOUT), &mut self.state)
            {
                return Err(RuntimeError::BackendUnavailable(format!(
                    "event loop exited with code {} during startup",
                    code
                )));
            }
            if let Some(err) = self.state.creation_error.take() {
                return Err(RuntimeError::BackendUnavailable(err));
            }
            if let Some(window) = &self.state.window {
                debug!("winit window {:?} created", window.id());
                // Input that arrived while hidden belongs to nobody
                self.state.pending.clear();
                let window: Arc<dyn PlatformWindow> = window.clone();
                return Ok(window);
            }
        }

        Err(RuntimeError::BackendUnavailable(
            "window was not created during startup".to_owned(),
        ))
    }

    fn show_window(&mut self) {
        if let Some(window) = &self.state.window {
            PlatformWindow::show(window.as_ref());
        }
    }

    fn poll_once(&mut self) -> Event {
        if self.state.pending.is_empty() {
            if let Some(event_loop) = self.event_loop.as_mut() {
                if let PumpStatus::Exit(_) =
                    event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state)
                {
                    self.state.close_requested = true;
                }
            }
        }
        self.state.pending.pop_front().unwrap_or_default()
    }

    fn should_close(&self) -> bool {
        self.state.close_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Winit key events carry private fields, so translation is checked through key_phase

    #[test]
    fn pressed_maps_to_press() {
        assert_eq!(key_phase(ElementState::Pressed), KeyPhase::Press);
        assert_eq!(Event::from(key_phase(ElementState::Pressed)), Event::press());
    }

    #[test]
    fn released_maps_to_release() {
        assert_eq!(key_phase(ElementState::Released), KeyPhase::Release);
    }

    #[test]
    fn uninteresting_events_become_none() {
        assert_eq!(translate(&WindowEvent::Focused(true)), Event::None);
        assert_eq!(translate(&WindowEvent::RedrawRequested), Event::None);
        assert_eq!(translate(&WindowEvent::Resized(PhysicalSize::new(1, 1))), Event::None);
    }

    #[test]
    fn attributes_start_hidden_with_configured_geometry() {
        let config = RuntimeConfig::new(0, 0, 640, 480, "T");
        let attributes = WinitPlatform::attributes(&config);

        assert_eq!(attributes.title, "T");
        assert!(!attributes.visible);
        assert_eq!(
            attributes.inner_size,
            Some(PhysicalSize::new(640u32, 480u32).into())
        );
    }

    #[test]
    fn new_platform_has_nothing_pending() {
        let mut platform = WinitPlatform::new();
        // No event loop yet, so polling must not touch the display
        assert_eq!(platform.poll_once(), Event::None);
        assert!(!platform.should_close());
    }
}
