use std::error::Error;
use std::time::Duration;

use engine::HeadlessRunner;
use engine::graphics::CpuRenderer;
use engine::profiling::StepStats;
use engine::surface::{RgbaBufferSurface, Surface, SurfaceSize};

use gesture_runner::detector::{AlwaysReady, ScriptStep, ScriptedDetector};
use gesture_runner::gesture::{
    FINGER_PAIRS, GestureClassifier, HandLandmarks, LANDMARK_COUNT, Landmark,
};
use gesture_runner::gesture_worker::poll_once;
use gesture_runner::input_adapter::PlayerAction;
use gesture_runner::playtest::{FrameInput, RunnerLogic};
use gesture_runner::runner_core::RunState;
use gesture_runner::settings::{SettingsStore, env_u64};
use gesture_runner::view::draw_runner;

const FRAME_DT: f32 = 1.0 / 60.0;
const DEMO_SECONDS: f32 = 20.0;

/// A hand with the four voting fingers either raised well above their joints or curled.
fn demo_hand(open: bool) -> HandLandmarks {
    let mut points = [Landmark::new(0.5, 0.7); LANDMARK_COUNT];
    for (i, &(tip, pip)) in FINGER_PAIRS.iter().enumerate() {
        let x = 0.35 + 0.1 * i as f32;
        points[pip] = Landmark::new(x, 0.5);
        points[tip] = Landmark::new(x, if open { 0.3 } else { 0.55 });
    }
    HandLandmarks::new(points)
}

/// Mostly no hand, with a short burst of open-hand frames now and then.
fn demo_script() -> Vec<ScriptStep> {
    let mut script = Vec::new();
    script.extend(std::iter::repeat_n(ScriptStep::NoHand, 30));
    script.extend(std::iter::repeat_n(ScriptStep::Hand(demo_hand(false)), 10));
    script.extend(std::iter::repeat_n(ScriptStep::Hand(demo_hand(true)), 6));
    script.push(ScriptStep::Fail("dropped frame".into()));
    script
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let settings = SettingsStore::from_env().load();
    let seed = env_u64("RUNNER_SEED").or(settings.seed).unwrap_or(7);
    let tuning = settings.tuning;

    let logic = RunnerLogic::new(seed, tuning);
    let epoch = logic.epoch();
    let mut runner = HeadlessRunner::new(logic);
    let mut stats = StepStats::default();

    let rt = tokio::runtime::Builder::new_current_thread().build()?;
    let mut source = AlwaysReady;
    let mut detector = ScriptedDetector::cycling(demo_script());
    let classifier = GestureClassifier::from_tuning(&tuning);

    let mut sim_time = 0.0f32;
    let mut runs = 0u32;
    let mut game_over_for = 0.0f32;

    while sim_time < DEMO_SECONDS {
        let mut input = FrameInput::idle(FRAME_DT);

        match runner.state().state() {
            RunState::GameOver => {
                game_over_for += FRAME_DT;
                if game_over_for >= 1.0 {
                    input.action = Some(PlayerAction::Restart);
                    game_over_for = 0.0;
                    runs += 1;
                }
            }
            RunState::Ready | RunState::Running => {
                if let Some(mut report) =
                    rt.block_on(poll_once(&mut source, &mut detector, &classifier))
                {
                    // Stamp with simulated time so the run replays exactly.
                    report.at = epoch + Duration::from_secs_f32(sim_time);
                    input.gestures.push(report);
                }
            }
        }

        runner.step_profiled(input, &mut stats);
        sim_time += FRAME_DT;
    }

    let snapshot = runner.state().snapshot();
    let size = SurfaceSize::new(480, 270);
    let mut surface = RgbaBufferSurface::new(size);
    {
        let mut renderer = CpuRenderer::new(surface.frame_mut(), size);
        draw_runner(&mut renderer, &snapshot);
    }

    println!(
        "frames {} restarts {} state {:?} score {} best {} hand {:?}",
        runner.frame(),
        runs,
        snapshot.session.state,
        snapshot.session.score,
        snapshot.session.best,
        snapshot.hand_line,
    );
    println!(
        "step mean {:?} worst {:?} frame {}",
        stats.mean(),
        stats.worst,
        surface.digest()
    );
    Ok(())
}
