use std::time::Instant;

use crate::core::events::FrameEvent;

/// Counts frames and stamps each with the time it started
#[derive(Debug, Clone)]
pub struct FrameClock {
    frame_count: u64,
    start_time: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            start_time: Instant::now(),
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Seconds since the clock was created
    pub fn elapsed(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Event for a frame starting now
    pub fn tick(&mut self) -> FrameEvent {
        self.tick_at(Instant::now())
    }

    /// Event for a frame starting at `time`
    pub fn tick_at(&mut self, time: Instant) -> FrameEvent {
        let event = FrameEvent::new(self.frame_count, time);
        self.frame_count += 1;
        event
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for FrameClock {
    type Item = FrameEvent;

    fn next(&mut self) -> Option<FrameEvent> {
        Some(self.tick())
    }
}
