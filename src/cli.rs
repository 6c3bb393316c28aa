// cli.rs - Command-line interface configuration
use std::time::Duration;

use clap::Parser;

use crate::core::config::{DEFAULT_HEIGHT, DEFAULT_TITLE, DEFAULT_WIDTH, DEFAULT_X, DEFAULT_Y};
use crate::core::{Event, RuntimeConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "rapture")]
#[command(about = "Single-window runtime: opens a window and reports key events", long_about = None)]
pub struct Cli {
    /// Window x position
    #[arg(long, default_value_t = DEFAULT_X, allow_negative_numbers = true)]
    pub x: i32,

    /// Window y position
    #[arg(long, default_value_t = DEFAULT_Y, allow_negative_numbers = true)]
    pub y: i32,

    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: u32,

    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: u32,

    #[arg(long, default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Run without a display, replaying --script instead of native input
    #[arg(long = "headless", default_value = "false")]
    pub headless: bool,

    /// Comma-separated poll results for --headless: p (press), r (release), n (none)
    #[arg(long, value_delimiter = ',', value_parser = parse_event)]
    pub script: Vec<Event>,

    /// Stop after this many seconds instead of running until the window closes
    #[arg(long = "run-for", value_parser = parse_seconds, allow_negative_numbers = true)]
    pub run_for: Option<Duration>,
}

impl Cli {
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig::new(self.x, self.y, self.width, self.height, self.title.clone())
    }
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let seconds: f32 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", s))?;
    Duration::try_from_secs_f32(seconds)
        .map_err(|_| format!("'{}' must be a finite, non-negative number of seconds", s))
}

fn parse_event(s: &str) -> Result<Event, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "p" | "press" => Ok(Event::press()),
        "r" | "release" => Ok(Event::release()),
        "n" | "none" => Ok(Event::None),
        other => Err(format!("unknown event '{}', expected p, r or n", other)),
    }
}
