use std::time::Instant;

use engine::graphics::CpuRenderer;
use engine::surface::{RgbaBufferSurface, Surface, SurfaceSize};

use gesture_runner::best_score::MemoryStore;
use gesture_runner::gesture::{HandLandmarks, LANDMARK_COUNT, Landmark};
use gesture_runner::gesture_worker::{GestureReport, Observation};
use gesture_runner::input_adapter::PlayerAction;
use gesture_runner::state::{RunnerSnapshot, RunnerState};
use gesture_runner::tuning::Tuning;
use gesture_runner::view::{draw_runner, overlay_panel};

const SKY: [u8; 4] = [92, 148, 252, 255];
const GROUND: [u8; 4] = [200, 120, 60, 255];
const PLAYER: [u8; 4] = [255, 59, 59, 255];

fn render(snapshot: &RunnerSnapshot, size: SurfaceSize) -> RgbaBufferSurface {
    let mut surface = RgbaBufferSurface::new(size);
    let mut renderer = CpuRenderer::new(surface.frame_mut(), size);
    draw_runner(&mut renderer, snapshot);
    surface
}

fn state() -> RunnerState<MemoryStore> {
    RunnerState::new(Tuning::default(), 21, MemoryStore::new())
}

#[test]
fn same_snapshot_renders_the_same_frame() {
    let mut state = state();
    state.handle_action(PlayerAction::Jump, Instant::now());
    for _ in 0..40 {
        state.tick(1.0 / 60.0);
    }
    let snapshot = state.snapshot();
    let size = SurfaceSize::new(640, 360);

    assert_eq!(render(&snapshot, size).digest(), render(&snapshot, size).digest());
}

#[test]
fn field_fills_a_matching_surface() {
    let state = state();
    let frame = render(&state.snapshot(), SurfaceSize::new(960, 540));

    assert_eq!(frame.pixel(5, 300), Some(SKY));
    assert_eq!(frame.pixel(5, 530), Some(GROUND));
    // Player body below the face details, standing on the floor (y in [416, 470)).
    let bob = state.session().idle_bob();
    assert_eq!(bob, 0.0);
    assert_eq!(frame.pixel(152, 465), Some(PLAYER));
}

#[test]
fn wide_window_is_letterboxed() {
    let frame = render(&state().snapshot(), SurfaceSize::new(1200, 540));
    // 120 px bars left and right.
    assert_eq!(frame.pixel(60, 300), Some([12, 12, 20, 255]));
    assert_eq!(frame.pixel(125, 300), Some(SKY));
}

#[test]
fn state_changes_show_up_in_the_frame() {
    let size = SurfaceSize::new(480, 270);
    let mut state = state();
    let ready = render(&state.snapshot(), size).digest();

    state.handle_action(PlayerAction::Restart, Instant::now());
    let running = render(&state.snapshot(), size).digest();
    assert_ne!(ready, running);
}

#[test]
fn landmark_overlay_appears_and_clears_with_the_hand() {
    let size = SurfaceSize::new(960, 540);
    let panel = overlay_panel(size).expect("panel fits");
    let mut state = state();
    let empty = render(&state.snapshot(), size);

    let mut points = [Landmark::new(0.5, 0.5); LANDMARK_COUNT];
    points[8] = Landmark::new(0.25, 0.1);
    state.handle_gesture(&GestureReport {
        at: Instant::now(),
        observation: Observation::Hand {
            landmarks: HandLandmarks::new(points),
            open: false,
        },
    });
    let with_hand = render(&state.snapshot(), size);

    let cx = panel.x + panel.w / 2;
    let cy = panel.y + panel.h / 2;
    assert_ne!(with_hand.pixel(cx, cy), empty.pixel(cx, cy));

    state.handle_gesture(&GestureReport {
        at: Instant::now(),
        observation: Observation::Absent,
    });
    let cleared = render(&state.snapshot(), size);
    assert_eq!(cleared.pixel(cx, cy), empty.pixel(cx, cy));
}
