use std::time::Instant;

use serde::Serialize;

use crate::best_score::{BEST_SCORE_KEY, BestScoreStore, MemoryStore};
use crate::gesture::HandLandmarks;
use crate::gesture_worker::{GestureReport, Observation};
use crate::input_adapter::PlayerAction;
use crate::intent::{IntentDebouncer, JumpIntent};
use crate::runner_core::{
    GameSession, JumpOutcome, RestartOutcome, RunState, SessionSnapshot, TickOutcome,
};
use crate::tuning::Tuning;

pub const TIP_MESSAGE: &str = "Tip: open hand to jump.";
pub const GAME_OVER_MESSAGE: &str = "Game over. Press Enter to restart.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "camelCase")]
pub enum HandStatus {
    Starting,
    Detected,
    NotDetected,
    Unavailable(String),
}

impl HandStatus {
    pub fn label(&self) -> &'static str {
        match self {
            HandStatus::Starting => "Hand: starting...",
            HandStatus::Detected => "Hand: detected",
            HandStatus::NotDetected => "Hand: not detected",
            HandStatus::Unavailable(_) => "Hand: failed to start",
        }
    }
}

/// Everything the renderer and status lines need for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerSnapshot {
    pub session: SessionSnapshot,
    pub hand: HandStatus,
    pub hand_line: String,
    pub message: String,
    pub landmarks: Option<HandLandmarks>,
    /// Seconds since launch, for decoration that keeps moving in every state.
    pub clock: f32,
}

/// The game thread's state: one session plus the input and persistence around it.
///
/// Keyboard actions and gesture reports are applied here in arrival order; nothing else
/// mutates the session.
#[derive(Debug, Clone)]
pub struct RunnerState<S = MemoryStore> {
    session: GameSession,
    debouncer: IntentDebouncer,
    store: S,
    hand: HandStatus,
    message: String,
    landmarks: Option<HandLandmarks>,
    clock: f32,
}

impl<S: BestScoreStore> RunnerState<S> {
    pub fn new(tuning: Tuning, seed: u64, store: S) -> Self {
        let best = u32::try_from(store.get(BEST_SCORE_KEY)).unwrap_or(u32::MAX);
        Self {
            session: GameSession::new(tuning, seed, best),
            debouncer: IntentDebouncer::new(tuning.gesture_cooldown()),
            store,
            hand: HandStatus::Starting,
            message: TIP_MESSAGE.to_string(),
            landmarks: None,
            clock: 0.0,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn debouncer(&self) -> &IntentDebouncer {
        &self.debouncer
    }

    pub fn hand(&self) -> &HandStatus {
        &self.hand
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn landmarks(&self) -> Option<&HandLandmarks> {
        self.landmarks.as_ref()
    }

    /// Applies a keyboard action. `Quit` is left to the caller.
    pub fn handle_action(&mut self, action: PlayerAction, now: Instant) {
        match action {
            PlayerAction::Jump => {
                let intent = self.debouncer.keyboard(now);
                self.apply_jump(intent);
            }
            PlayerAction::Restart => {
                if self.session.restart() == RestartOutcome::Restarted {
                    self.message = TIP_MESSAGE.to_string();
                }
            }
            PlayerAction::Quit => {}
        }
    }

    pub fn handle_gesture(&mut self, report: &GestureReport) -> Option<JumpOutcome> {
        match &report.observation {
            Observation::Absent => {
                self.hand = HandStatus::NotDetected;
                self.landmarks = None;
                self.message.clear();
                None
            }
            Observation::Hand { landmarks, open } => {
                self.hand = HandStatus::Detected;
                self.landmarks = Some(*landmarks);
                let intent = self.debouncer.gesture(*open, report.at)?;
                Some(self.apply_jump(intent))
            }
        }
    }

    fn apply_jump(&mut self, intent: JumpIntent) -> JumpOutcome {
        let outcome = self.session.jump(&intent);
        if outcome.accepted() {
            self.message = format!("Jump: {}", intent.source.label());
        }
        outcome
    }

    /// Advances the session. The best score is persisted once, on the tick that ends a run.
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        if dt.is_finite() && dt > 0.0 {
            self.clock += dt;
        }
        let outcome = self.session.tick(dt);
        if outcome.crashed {
            self.message = GAME_OVER_MESSAGE.to_string();
            let best = u64::from(self.session.best());
            match self.store.set(BEST_SCORE_KEY, best) {
                Ok(()) => log::info!("best score saved: {best}"),
                Err(err) => log::warn!("could not save best score: {err}"),
            }
        }
        outcome
    }

    /// Gesture input could not start; keyboard play carries on.
    pub fn set_sensor_unavailable(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("hand input unavailable: {reason}");
        self.message = format!("Landmark feed error: {reason}");
        self.hand = HandStatus::Unavailable(reason);
        self.landmarks = None;
    }

    pub fn state(&self) -> RunState {
        self.session.state()
    }

    /// Seconds of simulated time this state has been ticked through.
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn snapshot(&self) -> RunnerSnapshot {
        RunnerSnapshot {
            session: self.session.snapshot(),
            hand: self.hand.clone(),
            hand_line: self.hand.label().to_string(),
            message: self.message.clone(),
            landmarks: self.landmarks,
            clock: self.clock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{LANDMARK_COUNT, Landmark};

    #[test]
    fn clock_follows_ticks_and_matches_the_snapshot() {
        let mut state = RunnerState::new(Tuning::default(), 1, MemoryStore::new());
        assert_eq!(state.clock(), 0.0);
        state.tick(0.02);
        state.tick(0.02);
        assert!((state.clock() - 0.04).abs() < 1e-6);
        assert_eq!(state.clock(), state.snapshot().clock);
    }

    fn report(at: Instant, observation: Observation) -> GestureReport {
        GestureReport { at, observation }
    }

    #[test]
    fn no_hand_clears_overlay_and_message() {
        let mut state = RunnerState::new(Tuning::default(), 1, MemoryStore::new());
        let hand = HandLandmarks::new([Landmark::new(0.5, 0.5); LANDMARK_COUNT]);
        let t0 = Instant::now();

        state.handle_gesture(&report(
            t0,
            Observation::Hand {
                landmarks: hand,
                open: false,
            },
        ));
        assert_eq!(state.hand(), &HandStatus::Detected);
        assert!(state.landmarks().is_some());

        state.handle_gesture(&report(t0, Observation::Absent));
        assert_eq!(state.hand().label(), "Hand: not detected");
        assert!(state.landmarks().is_none());
        assert_eq!(state.message(), "");
    }

    #[test]
    fn keyboard_jump_from_ready_starts_and_reports_source() {
        let mut state = RunnerState::new(Tuning::default(), 1, MemoryStore::new());
        state.handle_action(PlayerAction::Jump, Instant::now());
        assert_eq!(state.state(), RunState::Running);
        assert_eq!(state.message(), "Jump: keyboard");
    }

    #[test]
    fn sensor_failure_keeps_keyboard_play() {
        let mut state = RunnerState::new(Tuning::default(), 1, MemoryStore::new());
        state.set_sensor_unavailable("address in use");
        assert_eq!(state.snapshot().hand_line, "Hand: failed to start");

        state.handle_action(PlayerAction::Jump, Instant::now());
        assert_eq!(state.state(), RunState::Running);
    }
}
