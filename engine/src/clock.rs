use std::time::{Duration, Instant};

/// Turns wall-clock frame callbacks into simulation steps.
///
/// The first call yields a zero step. Every later call yields the time since the previous
/// call, capped at `max_step` so a stalled window (minimised, dragged, debugger) does not
/// produce one huge integration step.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Option<Instant>,
    max_step: Duration,
}

impl FrameClock {
    pub fn new(max_step: Duration) -> Self {
        Self {
            last: None,
            max_step,
        }
    }

    pub fn max_step(&self) -> Duration {
        self.max_step
    }

    pub fn tick(&mut self, now: Instant) -> Duration {
        let raw = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        raw.min(self.max_step)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
