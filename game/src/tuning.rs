use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Every gameplay constant in one place.
///
/// Distances are play-field pixels, times are seconds unless the name says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub field_width: f32,
    pub field_height: f32,
    /// Distance from the bottom of the field up to the ground line.
    pub ground_inset: f32,

    pub player_x: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub jump_impulse: f32,
    pub gravity: f32,

    pub speed_base: f32,
    pub speed_ramp: f32,
    pub speed_cap: f32,
    pub max_dt: f32,

    pub obstacle_width: f32,
    pub obstacle_min_height: u32,
    pub obstacle_max_height: u32,
    pub spawn_lead_margin: f32,
    pub spawn_min_interval: f32,
    pub spawn_max_interval: f32,
    pub despawn_margin: f32,

    pub gesture_cooldown_ms: u64,
    pub finger_extension_threshold: f32,
    pub fingers_required: usize,

    pub idle_bob_amplitude: f32,
    pub idle_bob_rate: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: 960.0,
            field_height: 540.0,
            ground_inset: 70.0,

            player_x: 150.0,
            player_width: 42.0,
            player_height: 54.0,
            jump_impulse: 860.0,
            gravity: 2500.0,

            speed_base: 420.0,
            speed_ramp: 10.0,
            speed_cap: 760.0,
            max_dt: 0.033,

            obstacle_width: 56.0,
            obstacle_min_height: 70,
            obstacle_max_height: 140,
            spawn_lead_margin: 30.0,
            spawn_min_interval: 1.1,
            spawn_max_interval: 1.8,
            despawn_margin: -50.0,

            gesture_cooldown_ms: 350,
            finger_extension_threshold: 0.045,
            fingers_required: 3,

            idle_bob_amplitude: 2.0,
            idle_bob_rate: 4.0,
        }
    }
}

impl Tuning {
    pub fn ground_y(&self) -> f32 {
        self.field_height - self.ground_inset
    }

    pub fn gesture_cooldown(&self) -> Duration {
        Duration::from_millis(self.gesture_cooldown_ms)
    }

    /// Repairs values a hand-edited settings file could get wrong.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        for (value, fallback) in [
            (&mut self.ground_inset, defaults.ground_inset),
            (&mut self.player_x, defaults.player_x),
            (&mut self.jump_impulse, defaults.jump_impulse),
            (&mut self.gravity, defaults.gravity),
            (&mut self.speed_base, defaults.speed_base),
            (&mut self.speed_ramp, defaults.speed_ramp),
            (&mut self.speed_cap, defaults.speed_cap),
            (&mut self.spawn_lead_margin, defaults.spawn_lead_margin),
            (&mut self.spawn_max_interval, defaults.spawn_max_interval),
            (&mut self.despawn_margin, defaults.despawn_margin),
            (
                &mut self.finger_extension_threshold,
                defaults.finger_extension_threshold,
            ),
            (&mut self.idle_bob_amplitude, defaults.idle_bob_amplitude),
            (&mut self.idle_bob_rate, defaults.idle_bob_rate),
        ] {
            if !value.is_finite() {
                *value = fallback;
            }
        }
        for (value, fallback) in [
            (&mut self.field_width, defaults.field_width),
            (&mut self.field_height, defaults.field_height),
            (&mut self.player_width, defaults.player_width),
            (&mut self.player_height, defaults.player_height),
            (&mut self.obstacle_width, defaults.obstacle_width),
            (&mut self.max_dt, defaults.max_dt),
            (&mut self.spawn_min_interval, defaults.spawn_min_interval),
        ] {
            if !(value.is_finite() && *value > 0.0) {
                *value = fallback;
            }
        }

        self.ground_inset = self.ground_inset.clamp(0.0, self.field_height);
        self.speed_cap = self.speed_cap.max(self.speed_base);
        if self.spawn_max_interval <= self.spawn_min_interval {
            self.spawn_max_interval = self.spawn_min_interval + 0.001;
        }
        self.obstacle_min_height = self.obstacle_min_height.max(1);
        if self.obstacle_max_height <= self.obstacle_min_height {
            self.obstacle_max_height = self.obstacle_min_height + 1;
        }
        self.fingers_required = self.fingers_required.clamp(1, 4);
        self
    }
}
