use std::sync::Arc;

use rapture::core::{
    Event, Platform, PlatformLog, PlatformWindow, RuntimeConfig, RuntimeError, ScriptedPlatform,
};

/// Drives a backend through the same setup order the runtime uses
fn setup(platform: &mut dyn Platform, config: &RuntimeConfig) -> Arc<dyn PlatformWindow> {
    let window = platform.create_window(config).unwrap();
    platform.init_graphics().unwrap();
    platform.show_window();
    window
}

#[test]
fn test_show_twice_is_harmless() {
    let log = PlatformLog::new();
    let mut platform = ScriptedPlatform::idle().with_log(log.clone());
    setup(&mut platform, &RuntimeConfig::default());

    platform.show_window();

    assert_eq!(platform.windows_created(), 1);
    assert!(platform.window().unwrap().is_visible());
    assert_eq!(
        log.entries(),
        vec!["create_window", "init_graphics", "show_window", "show_window"]
    );
}

#[test]
fn test_creating_again_reuses_window() {
    let mut platform = ScriptedPlatform::idle();
    let first = setup(&mut platform, &RuntimeConfig::default());
    let second = platform.create_window(&RuntimeConfig::default()).unwrap();

    first.set_title("shared");
    assert_eq!(second.title(), "shared");
    assert_eq!(platform.windows_created(), 1);
}

#[test]
fn test_unavailable_backend() {
    let mut platform = ScriptedPlatform::idle().unavailable("cannot connect to display");

    match platform.create_window(&RuntimeConfig::default()) {
        Err(RuntimeError::BackendUnavailable(reason)) => {
            assert_eq!(reason, "cannot connect to display")
        }
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("window created without a backend"),
    }
}

#[test]
fn test_boxed_platform_delegates() {
    let mut platform: Box<dyn Platform> =
        Box::new(ScriptedPlatform::new([Event::press()]).close_when_drained());

    let window = setup(&mut platform, &RuntimeConfig::default().with_title("boxed"));
    assert_eq!(window.title(), "boxed");

    assert!(!platform.should_close());
    assert_eq!(platform.poll_once(), Event::press());
    assert!(platform.should_close());
    assert_eq!(platform.poll_once(), Event::None);
}

#[test]
fn test_poll_never_yields_more_than_one_event() {
    let script = [Event::press(), Event::press(), Event::release()];
    let mut platform = ScriptedPlatform::new(script);

    let polled: Vec<Event> = (0..3).map(|_| platform.poll_once()).collect();

    assert_eq!(polled, script.to_vec());
    assert_eq!(platform.log().polls(), 3);
}
