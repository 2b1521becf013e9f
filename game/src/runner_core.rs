use serde::{Deserialize, Serialize};

use crate::intent::JumpIntent;
use crate::spawner::ObstacleSpawner;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunState {
    Ready,
    Running,
    GameOver,
}

/// Axis-aligned box; `x`/`y` is the top-left corner, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Half-open overlap: boxes that only share an edge do not collide.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vy: f32,
    pub on_ground: bool,
}

impl Player {
    pub fn standing(tuning: &Tuning) -> Self {
        Self {
            x: tuning.player_x,
            y: tuning.ground_y() - tuning.player_height,
            w: tuning.player_width,
            h: tuning.player_height,
            vy: 0.0,
            on_ground: true,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.w, self.h)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Set once, the tick the trailing edge gets left of the player.
    pub passed: bool,
}

impl Obstacle {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.w, self.h)
    }
}

/// What a jump intent does in a given state, before anything is mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpTransition {
    pub next: RunState,
    /// Re-initialise the run (Ready -> Running).
    pub reset: bool,
    /// Apply the upward impulse.
    pub impulse: bool,
}

/// The single jump rule shared by keyboard and gesture input.
///
/// From Ready the same intent both starts the run and performs the first jump. Mid-air
/// jumps are dropped, not buffered.
pub fn resolve_jump(state: RunState, on_ground: bool) -> JumpTransition {
    match state {
        RunState::Ready => JumpTransition {
            next: RunState::Running,
            reset: true,
            impulse: true,
        },
        RunState::Running => JumpTransition {
            next: RunState::Running,
            reset: false,
            impulse: on_ground,
        },
        RunState::GameOver => JumpTransition {
            next: RunState::GameOver,
            reset: false,
            impulse: false,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    Started,
    Jumped,
    IgnoredAirborne,
    IgnoredGameOver,
}

impl JumpOutcome {
    pub fn accepted(self) -> bool {
        matches!(self, JumpOutcome::Started | JumpOutcome::Jumped)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    Restarted,
    IgnoredRunning,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub scored: u32,
    pub spawned: bool,
    /// The run ended during this tick.
    pub crashed: bool,
}

/// Read-only view of a session for rendering and the state endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: RunState,
    pub elapsed: f32,
    pub score: u32,
    pub best: u32,
    pub speed: f32,
    pub field_width: f32,
    pub field_height: f32,
    pub ground_y: f32,
    /// Includes the idle bob while Ready.
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
}

/// One player's runner game: state machine, physics, spawning and scoring.
#[derive(Debug, Clone)]
pub struct GameSession {
    tuning: Tuning,
    state: RunState,
    elapsed: f32,
    score: u32,
    best: u32,
    speed: f32,
    spawn_timer: f32,
    obstacles: Vec<Obstacle>,
    player: Player,
    spawner: ObstacleSpawner,
    idle_time: f32,
}

impl GameSession {
    pub fn new(tuning: Tuning, seed: u64, best: u32) -> Self {
        Self {
            state: RunState::Ready,
            elapsed: 0.0,
            score: 0,
            best,
            speed: tuning.speed_base,
            spawn_timer: 0.0,
            obstacles: Vec::new(),
            player: Player::standing(&tuning),
            spawner: ObstacleSpawner::new(seed),
            idle_time: 0.0,
            tuning,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn spawn_timer(&self) -> f32 {
        self.spawn_timer
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn ground_y(&self) -> f32 {
        self.tuning.ground_y()
    }

    /// Direct access for scripted scenarios (tests, demos).
    pub fn obstacles_mut(&mut self) -> &mut Vec<Obstacle> {
        &mut self.obstacles
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn set_spawn_timer(&mut self, seconds: f32) {
        self.spawn_timer = seconds;
    }

    pub fn jump(&mut self, intent: &JumpIntent) -> JumpOutcome {
        let transition = resolve_jump(self.state, self.player.on_ground);
        let outcome = match (self.state, transition.impulse) {
            (RunState::GameOver, _) => JumpOutcome::IgnoredGameOver,
            (RunState::Ready, _) => JumpOutcome::Started,
            (RunState::Running, true) => JumpOutcome::Jumped,
            (RunState::Running, false) => JumpOutcome::IgnoredAirborne,
        };

        if transition.reset {
            self.reset_run();
        }
        self.state = transition.next;
        if transition.impulse {
            self.player.vy = -self.tuning.jump_impulse;
            self.player.on_ground = false;
        }

        log::debug!("jump from {:?}: {:?}", intent.source, outcome);
        outcome
    }

    /// The confirm action: starts a fresh run (no jump) unless one is already going.
    pub fn restart(&mut self) -> RestartOutcome {
        if self.state == RunState::Running {
            return RestartOutcome::IgnoredRunning;
        }
        self.reset_run();
        RestartOutcome::Restarted
    }

    fn reset_run(&mut self) {
        self.elapsed = 0.0;
        self.score = 0;
        self.speed = self.tuning.speed_base;
        self.spawn_timer = 0.0;
        self.obstacles.clear();
        self.player = Player::standing(&self.tuning);
        self.state = RunState::Running;
        log::info!("run started");
    }

    /// Advances the simulation by `dt` seconds (clamped to `max_dt`).
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.tuning.max_dt)
        } else {
            0.0
        };

        match self.state {
            RunState::Running => self.tick_running(dt),
            RunState::Ready => {
                self.idle_time += dt;
                TickOutcome::default()
            }
            RunState::GameOver => TickOutcome::default(),
        }
    }

    fn tick_running(&mut self, dt: f32) -> TickOutcome {
        let t = self.tuning;
        let mut outcome = TickOutcome::default();

        self.elapsed += dt;
        self.speed = (t.speed_base + self.elapsed * t.speed_ramp).min(t.speed_cap);

        if let Some(obstacle) = self.spawner.advance(&mut self.spawn_timer, dt, &t) {
            self.obstacles.push(obstacle);
            outcome.spawned = true;
        }

        // Semi-implicit Euler: velocity first.
        let ground_y = t.ground_y();
        self.player.vy += t.gravity * dt;
        self.player.y += self.player.vy * dt;
        if self.player.y + self.player.h >= ground_y {
            self.player.y = ground_y - self.player.h;
            self.player.vy = 0.0;
            self.player.on_ground = true;
        }

        for obstacle in &mut self.obstacles {
            obstacle.x -= self.speed * dt;
        }

        for obstacle in &mut self.obstacles {
            if !obstacle.passed && obstacle.x + obstacle.w < self.player.x {
                obstacle.passed = true;
                self.score += 1;
                outcome.scored += 1;
            }
        }

        let player_box = self.player.bounds();
        if self
            .obstacles
            .iter()
            .any(|o| player_box.overlaps(&o.bounds()))
        {
            self.state = RunState::GameOver;
            self.best = self.best.max(self.score);
            outcome.crashed = true;
            log::info!("game over: score {} (best {})", self.score, self.best);
            return outcome;
        }

        self.obstacles.retain(|o| o.x + o.w > t.despawn_margin);
        outcome
    }

    /// Visual-only vertical offset while waiting in Ready.
    pub fn idle_bob(&self) -> f32 {
        if self.state != RunState::Ready {
            return 0.0;
        }
        (self.idle_time * self.tuning.idle_bob_rate).sin() * self.tuning.idle_bob_amplitude
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut player = self.player;
        player.y += self.idle_bob();
        SessionSnapshot {
            state: self.state,
            elapsed: self.elapsed,
            score: self.score,
            best: self.best,
            speed: self.speed,
            field_width: self.tuning.field_width,
            field_height: self.tuning.field_height,
            ground_y: self.tuning.ground_y(),
            player,
            obstacles: self.obstacles.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_jump_covers_every_state() {
        assert_eq!(
            resolve_jump(RunState::Ready, true),
            JumpTransition {
                next: RunState::Running,
                reset: true,
                impulse: true
            }
        );
        assert!(resolve_jump(RunState::Running, true).impulse);
        assert!(!resolve_jump(RunState::Running, false).impulse);
        let over = resolve_jump(RunState::GameOver, true);
        assert_eq!(over.next, RunState::GameOver);
        assert!(!over.impulse && !over.reset);
    }

    #[test]
    fn edge_contact_is_not_a_collision() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&Aabb::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.overlaps(&Aabb::new(0.0, 10.0, 5.0, 5.0)));
        assert!(a.overlaps(&Aabb::new(9.0, 9.0, 5.0, 5.0)));
    }

    #[test]
    fn idle_bob_only_applies_while_ready() {
        let mut session = GameSession::new(Tuning::default(), 0, 0);
        session.tick(0.02);
        session.tick(0.02);
        let bob = session.idle_bob();
        assert!(bob != 0.0 && bob.abs() <= 2.0);
        assert_eq!(session.player().y, 470.0 - 54.0);
        assert_eq!(session.snapshot().player.y, 470.0 - 54.0 + bob);

        session.restart();
        assert_eq!(session.idle_bob(), 0.0);
    }

    #[test]
    fn non_finite_dt_is_treated_as_zero() {
        let mut session = GameSession::new(Tuning::default(), 0, 0);
        session.restart();
        session.tick(f32::NAN);
        assert_eq!(session.elapsed(), 0.0);
    }
}
