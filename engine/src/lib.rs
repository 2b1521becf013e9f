pub mod app;
pub mod clock;
pub mod graphics;
pub mod pixels_renderer;
pub mod profiling;
pub mod surface;

use std::time::Instant;

/// Deterministic game rules: a pure function from (state, input) to the next state.
pub trait GameLogic {
    type State;
    type Input;

    fn initial_state(&self) -> Self::State;
    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State;
}

/// Drives a [`GameLogic`] without a window.
///
/// Only the latest state is kept; runs are not recorded.
#[derive(Debug)]
pub struct HeadlessRunner<G: GameLogic> {
    game: G,
    state: G::State,
    frame: usize,
}

impl<G: GameLogic> HeadlessRunner<G> {
    pub fn new(game: G) -> Self {
        let state = game.initial_state();
        Self {
            game,
            state,
            frame: 0,
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn state(&self) -> &G::State {
        &self.state
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn step(&mut self, input: G::Input) -> usize {
        self.state = self.game.step(&self.state, input);
        self.frame += 1;
        self.frame
    }

    pub fn step_profiled<P: profiling::Profiler>(
        &mut self,
        input: G::Input,
        profiler: &mut P,
    ) -> usize {
        let total_start = Instant::now();

        let step_start = Instant::now();
        let next_state = self.game.step(&self.state, input);
        let step_dt = step_start.elapsed();

        self.state = next_state;
        self.frame += 1;

        profiler.on_step(
            self.frame,
            profiling::StepTimings {
                step: step_dt,
                total: total_start.elapsed(),
            },
        );

        self.frame
    }

    pub fn run<I>(&mut self, inputs: I) -> usize
    where
        I: IntoIterator<Item = G::Input>,
    {
        for input in inputs {
            self.step(input);
        }
        self.frame
    }

    /// Throws away the current state and starts again from `initial_state`.
    pub fn reset(&mut self) {
        self.state = self.game.initial_state();
        self.frame = 0;
    }
}
