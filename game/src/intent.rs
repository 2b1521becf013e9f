use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IntentSource {
    Keyboard,
    Gesture,
}

impl IntentSource {
    /// Text for the status line, e.g. "Jump: open hand".
    pub fn label(self) -> &'static str {
        match self {
            IntentSource::Keyboard => "keyboard",
            IntentSource::Gesture => "open hand",
        }
    }
}

/// "The player wants to jump now."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpIntent {
    pub source: IntentSource,
    pub at: Instant,
}

impl JumpIntent {
    pub fn keyboard(at: Instant) -> Self {
        Self {
            source: IntentSource::Keyboard,
            at,
        }
    }

    pub fn gesture(at: Instant) -> Self {
        Self {
            source: IntentSource::Gesture,
            at,
        }
    }
}

/// Merges keyboard edges and the per-frame "open hand" level signal into jump intents.
///
/// Keyboard edges pass straight through. Gesture detections share one global cooldown: an
/// open hand held for a second produces roughly one intent per cooldown, not one per
/// classified frame. A detection inside the cooldown is dropped, never deferred.
#[derive(Debug, Clone)]
pub struct IntentDebouncer {
    cooldown: Duration,
    last_gesture_jump_at: Option<Instant>,
}

impl IntentDebouncer {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_gesture_jump_at: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn last_gesture_jump_at(&self) -> Option<Instant> {
        self.last_gesture_jump_at
    }

    pub fn keyboard(&mut self, at: Instant) -> JumpIntent {
        JumpIntent::keyboard(at)
    }

    /// Feeds one classifier result taken at `at`.
    ///
    /// The cooldown restarts whenever an intent is emitted, whether or not the game then
    /// accepts the jump.
    pub fn gesture(&mut self, open: bool, at: Instant) -> Option<JumpIntent> {
        if !open {
            return None;
        }
        if let Some(last) = self.last_gesture_jump_at {
            if at.saturating_duration_since(last) < self.cooldown {
                return None;
            }
        }
        self.last_gesture_jump_at = Some(at);
        Some(JumpIntent::gesture(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_open_hand_fires_immediately() {
        let mut d = IntentDebouncer::new(Duration::from_millis(350));
        let t0 = Instant::now();
        let intent = d.gesture(true, t0).expect("first detection should fire");
        assert_eq!(intent.source, IntentSource::Gesture);
        assert_eq!(d.last_gesture_jump_at(), Some(t0));
    }

    #[test]
    fn closed_hand_never_fires_or_touches_the_cooldown() {
        let mut d = IntentDebouncer::new(Duration::from_millis(350));
        assert!(d.gesture(false, Instant::now()).is_none());
        assert_eq!(d.last_gesture_jump_at(), None);
    }

    #[test]
    fn cooldown_boundary_is_inclusive() {
        let mut d = IntentDebouncer::new(Duration::from_millis(350));
        let t0 = Instant::now();
        d.gesture(true, t0);
        assert!(d.gesture(true, t0 + Duration::from_millis(349)).is_none());
        assert!(d.gesture(true, t0 + Duration::from_millis(350)).is_some());
    }

    #[test]
    fn keyboard_ignores_gesture_cooldown() {
        let mut d = IntentDebouncer::new(Duration::from_millis(350));
        let t0 = Instant::now();
        d.gesture(true, t0);
        let k = d.keyboard(t0 + Duration::from_millis(1));
        assert_eq!(k.source, IntentSource::Keyboard);
        assert_eq!(d.last_gesture_jump_at(), Some(t0));
    }
}
