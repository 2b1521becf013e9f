//! Seams between the game and whatever produces hand landmarks.
//!
//! A [`FrameSource`] hands out frames once it is ready; a [`HandDetector`] turns one frame
//! into zero or one hand. Detection is asynchronous so a real tracker can run out of
//! process; the worker awaits it on its own runtime.

use std::collections::VecDeque;
use std::future::Future;

use thiserror::Error;

use crate::gesture::HandLandmarks;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    #[error("detector is not available: {0}")]
    Unavailable(String),
    #[error("detection failed: {0}")]
    Failed(String),
}

pub trait HandDetector {
    type Frame;

    /// `Ok(None)` means the frame was processed and holds no hand.
    fn detect(
        &mut self,
        frame: Self::Frame,
    ) -> impl Future<Output = Result<Option<HandLandmarks>, DetectorError>>;
}

pub trait FrameSource {
    type Frame;

    fn is_ready(&self) -> bool;

    /// Takes the next frame, if one is waiting.
    fn grab(&mut self) -> Option<Self::Frame>;
}

/// A frame source with nothing to capture; every poll yields a unit frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

impl FrameSource for AlwaysReady {
    type Frame = ();

    fn is_ready(&self) -> bool {
        true
    }

    fn grab(&mut self) -> Option<()> {
        Some(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    Hand(HandLandmarks),
    NoHand,
    Fail(String),
}

/// Plays back a fixed list of detection results, one per call.
///
/// Once the script runs out it either starts over (`cycling`) or reports no hand forever.
#[derive(Debug, Clone)]
pub struct ScriptedDetector {
    script: Vec<ScriptStep>,
    pending: VecDeque<ScriptStep>,
    cycle: bool,
    calls: usize,
}

impl ScriptedDetector {
    pub fn new(script: Vec<ScriptStep>) -> Self {
        Self {
            pending: script.iter().cloned().collect(),
            script,
            cycle: false,
            calls: 0,
        }
    }

    pub fn cycling(script: Vec<ScriptStep>) -> Self {
        Self {
            cycle: true,
            ..Self::new(script)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn next_step(&mut self) -> ScriptStep {
        self.calls += 1;
        if self.pending.is_empty() && self.cycle {
            self.pending.extend(self.script.iter().cloned());
        }
        self.pending.pop_front().unwrap_or(ScriptStep::NoHand)
    }
}

impl HandDetector for ScriptedDetector {
    type Frame = ();

    async fn detect(&mut self, _frame: ()) -> Result<Option<HandLandmarks>, DetectorError> {
        match self.next_step() {
            ScriptStep::Hand(hand) => Ok(Some(hand)),
            ScriptStep::NoHand => Ok(None),
            ScriptStep::Fail(reason) => Err(DetectorError::Failed(reason)),
        }
    }
}
