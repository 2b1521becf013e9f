use std::{
    io,
    time::{Duration, Instant},
};

use engine::app::{AppConfig, AppContext, AppFlow, GameApp, InputFrame, run_game};
use engine::graphics::Renderer2d;
use winit::dpi::PhysicalSize;

use gesture_runner::best_score::JsonFileStore;
use gesture_runner::gesture::GestureClassifier;
use gesture_runner::gesture_worker::GestureWorker;
use gesture_runner::input_adapter::{PlayerAction, collect_actions};
use gesture_runner::landmark_feed::{FeedCmd, FeedDetector, LandmarkFeedServer};
use gesture_runner::settings::{RunnerSettings, SettingsStore, env_bool, env_u64};
use gesture_runner::state::RunnerState;
use gesture_runner::view::draw_runner;

#[derive(Debug, Default, Clone)]
struct HeadfulCli {
    help: bool,
    seed: Option<u64>,
    port: Option<u16>,
    no_gestures: bool,
}

fn print_headful_help() {
    println!(
        r#"Gesture Runner

Usage:
  headful [--seed N] [--port N] [--no-gestures]

Options:
  --seed N          Fixed obstacle seed (default: settings file, else random).
  --port N          Landmark feed port on 127.0.0.1 (default: 7878).
  --no-gestures     Keyboard only; do not start the landmark feed.
  --help, -h        Show this help.

Controls:
  Space / Up        Jump (also starts a run)
  Enter             Restart after game over
  Esc               Quit

Env:
  RUST_LOG                 Log filter, e.g. info or gesture_runner=debug
  RUNNER_SETTINGS_PATH     Settings JSON (default: $XDG_CONFIG_HOME/gesture-runner/settings.json)
  RUNNER_SCORES_PATH       Best score JSON (default: scores.json next to settings)
  RUNNER_SEED              Same as --seed
  RUNNER_FEED_PORT         Same as --port
  RUNNER_GESTURES          0/1, same as --no-gestures when 0

Landmark feed:
  POST /api/landmarks  {{"landmarks": [{{"x":0.5,"y":0.4}}, ... 21 points] | null}}
  GET  /api/state      current game state
  GET  /api/health"#
    );
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> io::Result<T> {
    let Some(value) = value else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{flag} requires a value"),
        ));
    };
    value.parse::<T>().map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid value for {flag}: {value}"),
        )
    })
}

fn parse_headful_cli() -> io::Result<HeadfulCli> {
    let mut cli = HeadfulCli::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => cli.help = true,
            "--seed" => cli.seed = Some(parse_value("--seed", args.next())?),
            "--port" => cli.port = Some(parse_value("--port", args.next())?),
            "--no-gestures" => cli.no_gestures = true,
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unknown argument: {other} (try --help)"),
                ));
            }
        }
    }

    Ok(cli)
}

/// Settings file, then environment, then command line.
fn resolve_settings(cli: &HeadfulCli) -> RunnerSettings {
    let mut settings = SettingsStore::from_env().load();
    if let Some(seed) = cli.seed.or_else(|| env_u64("RUNNER_SEED")) {
        settings.seed = Some(seed);
    }
    let env_port = env_u64("RUNNER_FEED_PORT").and_then(|p| u16::try_from(p).ok());
    if let Some(port) = cli.port.or(env_port) {
        settings.gesture.feed_port = port;
    }
    if let Some(enabled) = env_bool("RUNNER_GESTURES") {
        settings.gesture.enabled = enabled;
    }
    if cli.no_gestures {
        settings.gesture.enabled = false;
    }
    settings
}

struct RunnerApp {
    settings: RunnerSettings,
    feed: Option<LandmarkFeedServer>,
    worker: Option<GestureWorker>,
}

impl RunnerApp {
    fn new(settings: RunnerSettings) -> Self {
        Self {
            settings,
            feed: None,
            worker: None,
        }
    }

    fn start_hand_input(&mut self, state: &mut RunnerState<JsonFileStore>) {
        if !self.settings.gesture.enabled {
            state.set_sensor_unavailable("hand input disabled");
            return;
        }

        let (server, feed) = match LandmarkFeedServer::start(self.settings.gesture.feed_port) {
            Ok(started) => started,
            Err(err) => {
                state.set_sensor_unavailable(err.to_string());
                return;
            }
        };

        let classifier = GestureClassifier::from_tuning(&self.settings.tuning);
        match GestureWorker::spawn(
            feed,
            FeedDetector,
            classifier,
            self.settings.gesture.poll_interval(),
        ) {
            Ok(worker) => {
                self.worker = Some(worker);
                self.feed = Some(server);
            }
            Err(err) => state.set_sensor_unavailable(err.to_string()),
        }
    }

    fn serve_feed_commands(&mut self, state: &RunnerState<JsonFileStore>) {
        let Some(feed) = self.feed.as_mut() else {
            return;
        };
        while let Some(cmd) = feed.try_recv() {
            match cmd {
                FeedCmd::GetState { respond } => {
                    let _ = respond.send(state.session().snapshot());
                }
            }
        }
    }
}

impl GameApp for RunnerApp {
    type State = RunnerState<JsonFileStore>;

    fn init_state(&mut self, _ctx: &mut AppContext) -> Self::State {
        let seed = self.settings.seed.unwrap_or_else(rand::random);
        log::info!("obstacle seed {seed}");

        let store = JsonFileStore::from_env();
        log::info!("best score file {}", store.path().display());

        let mut state = RunnerState::new(self.settings.tuning, seed, store);
        self.start_hand_input(&mut state);
        state
    }

    fn update(
        &mut self,
        state: &mut Self::State,
        input: &InputFrame,
        dt: Duration,
        now: Instant,
        _ctx: &mut AppContext,
    ) -> AppFlow {
        for action in collect_actions(input) {
            if action == PlayerAction::Quit {
                return AppFlow::Exit;
            }
            state.handle_action(action, now);
        }

        if let Some(worker) = self.worker.as_mut() {
            for report in worker.drain() {
                state.handle_gesture(&report);
            }
        }

        state.tick(dt.as_secs_f32());
        self.serve_feed_commands(state);
        AppFlow::Continue
    }

    fn render(&mut self, state: &Self::State, renderer: &mut dyn Renderer2d) {
        draw_runner(renderer, &state.snapshot());
    }

    fn on_exit(&mut self, state: &mut Self::State) {
        if let Some(worker) = self.worker.take() {
            worker.join();
        }
        if let Some(mut feed) = self.feed.take() {
            feed.shutdown();
        }
        log::info!(
            "exiting: score {} best {}",
            state.session().score(),
            state.session().best()
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = parse_headful_cli()?;
    if cli.help {
        print_headful_help();
        return Ok(());
    }

    let settings = resolve_settings(&cli);
    let tuning = settings.tuning;
    let config = AppConfig {
        title: "Gesture Runner".to_string(),
        desired_size: PhysicalSize::new(tuning.field_width as u32, tuning.field_height as u32),
        clamp_to_monitor: true,
        vsync: true,
        max_step: Duration::from_secs_f32(tuning.max_dt),
    };

    run_game(config, RunnerApp::new(settings))
}
