use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct StepTimings {
    /// Time spent inside `GameLogic::step`.
    pub step: Duration,
    pub total: Duration,
}

/// Hook for capturing per-step timings from a [`crate::HeadlessRunner`].
///
/// Has no knowledge of game-specific State/Input types.
pub trait Profiler {
    fn on_step(&mut self, _frame: usize, _timings: StepTimings) {}
}

/// Keeps the worst and the running total of step durations.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepStats {
    pub steps: usize,
    pub total: Duration,
    pub worst: Duration,
}

impl StepStats {
    pub fn mean(&self) -> Duration {
        if self.steps == 0 {
            return Duration::ZERO;
        }
        self.total / self.steps as u32
    }
}

impl Profiler for StepStats {
    fn on_step(&mut self, _frame: usize, timings: StepTimings) {
        self.steps += 1;
        self.total += timings.total;
        self.worst = self.worst.max(timings.total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_stats_tracks_worst_and_mean() {
        let mut stats = StepStats::default();
        assert_eq!(stats.mean(), Duration::ZERO);

        for ms in [2, 6, 4] {
            stats.on_step(
                0,
                StepTimings {
                    step: Duration::from_millis(ms),
                    total: Duration::from_millis(ms),
                },
            );
        }

        assert_eq!(stats.steps, 3);
        assert_eq!(stats.worst, Duration::from_millis(6));
        assert_eq!(stats.mean(), Duration::from_millis(4));
    }
}
