use std::time::{Duration, Instant};

use engine::GameLogic;

use crate::best_score::MemoryStore;
use crate::gesture_worker::GestureReport;
use crate::input_adapter::PlayerAction;
use crate::state::RunnerState;
use crate::tuning::Tuning;

/// One headless frame: inputs that arrived, then `dt` of simulation.
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub dt: f32,
    pub action: Option<PlayerAction>,
    pub gestures: Vec<GestureReport>,
}

impl FrameInput {
    pub fn idle(dt: f32) -> Self {
        Self {
            dt,
            ..Self::default()
        }
    }

    pub fn action(dt: f32, action: PlayerAction) -> Self {
        Self {
            dt,
            action: Some(action),
            gestures: Vec::new(),
        }
    }
}

/// The runner as a pure step function, for headless playthroughs.
///
/// Keyboard actions are stamped with a synthetic clock (`epoch` plus simulated time), so the
/// same inputs always give the same run.
#[derive(Debug, Clone)]
pub struct RunnerLogic {
    seed: u64,
    tuning: Tuning,
    epoch: Instant,
}

impl RunnerLogic {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            tuning,
            epoch: Instant::now(),
        }
    }

    pub fn with_epoch(mut self, epoch: Instant) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn epoch(&self) -> Instant {
        self.epoch
    }
}

impl GameLogic for RunnerLogic {
    type State = RunnerState<MemoryStore>;
    type Input = FrameInput;

    fn initial_state(&self) -> Self::State {
        RunnerState::new(self.tuning, self.seed, MemoryStore::new())
    }

    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State {
        let mut next = state.clone();
        let now = self.epoch + Duration::from_secs_f32(next.clock().max(0.0));

        if let Some(action) = input.action {
            next.handle_action(action, now);
        }
        for report in &input.gestures {
            next.handle_gesture(report);
        }
        next.tick(input.dt);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner_core::RunState;
    use engine::HeadlessRunner;

    #[test]
    fn headless_run_is_reproducible() {
        let play = |seed| {
            let mut runner = HeadlessRunner::new(RunnerLogic::new(seed, Tuning::default()));
            runner.step(FrameInput::action(1.0 / 60.0, PlayerAction::Jump));
            for _ in 0..300 {
                runner.step(FrameInput::idle(1.0 / 60.0));
            }
            runner.state().snapshot().session
        };
        assert_eq!(play(5), play(5));
    }

    #[test]
    fn doing_nothing_eventually_crashes() {
        let mut runner = HeadlessRunner::new(RunnerLogic::new(3, Tuning::default()));
        runner.step(FrameInput::action(1.0 / 60.0, PlayerAction::Restart));
        let mut frames = 0;
        while runner.state().state() == RunState::Running && frames < 60 * 30 {
            runner.step(FrameInput::idle(1.0 / 60.0));
            frames += 1;
        }
        assert_eq!(runner.state().state(), RunState::GameOver);
        assert_eq!(runner.state().store().writes(), 1);
    }
}
