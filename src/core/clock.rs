use std::time::Instant;

use crate::frame::FrameInfo;

/// Minimal frame clock - tracks delta time between ticks
/// The first tick has no previous sample and reports a delta of zero
#[derive(Debug)]
pub struct Clock {
    frame_number: u64,
    start: Instant,
    last_tick: Option<Instant>,
}

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        Self {
            frame_number: 0,
            start: Instant::now(),
            last_tick: None,
        }
    }

    /// Sample the time, advance the clock and describe the new frame
    pub fn tick(&mut self) -> FrameInfo {
        let now = Instant::now();
        let delta = match self.last_tick {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        let time = now.saturating_duration_since(self.start).as_secs_f32();

        let info = FrameInfo::new(self.frame_number, time, delta);

        self.frame_number += 1;
        self.last_tick = Some(now);

        info
    }

    /// Number of ticks so far
    pub fn frame_count(&self) -> u64 {
        self.frame_number
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn first_tick_has_zero_delta() {
        let mut clock = Clock::new();
        thread::sleep(Duration::from_millis(5));

        let frame = clock.tick();
        assert_eq!(frame.number, 0);
        assert_eq!(frame.delta, 0.0);
    }

    #[test]
    fn clock_measures_delta() {
        let mut clock = Clock::new();
        clock.tick();

        thread::sleep(Duration::from_millis(10));
        let frame = clock.tick();

        // Roughly 10ms, generous upper bound for loaded CI machines
        assert!(frame.delta >= 0.009 && frame.delta <= 0.5);
        assert_eq!(frame.number, 1);
    }

    #[test]
    fn deltas_never_negative() {
        let mut clock = Clock::new();
        for _ in 0..1000 {
            assert!(clock.tick().delta >= 0.0);
        }
        assert_eq!(clock.frame_count(), 1000);
    }

    #[test]
    fn time_is_monotonic() {
        let mut clock = Clock::new();
        let mut previous = clock.tick().time;
        for _ in 0..100 {
            let time = clock.tick().time;
            assert!(time >= previous);
            previous = time;
        }
    }
}
