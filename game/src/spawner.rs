use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::runner_core::Obstacle;
use crate::tuning::Tuning;

/// Random source for obstacle heights and spawn gaps.
///
/// Seeded, so a headless run with the same seed and inputs replays identically. Spawn
/// gaps do not depend on elapsed time; only obstacle speed ramps.
#[derive(Debug, Clone)]
pub struct ObstacleSpawner {
    rng: SmallRng,
}

impl ObstacleSpawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Counts `timer` down by `dt`; when it runs out, returns a new obstacle and re-arms.
    pub fn advance(&mut self, timer: &mut f32, dt: f32, tuning: &Tuning) -> Option<Obstacle> {
        *timer -= dt;
        if *timer > 0.0 {
            return None;
        }
        let obstacle = self.spawn(tuning);
        *timer = self.next_interval(tuning);
        Some(obstacle)
    }

    /// One obstacle just right of the field, standing on the ground.
    pub fn spawn(&mut self, tuning: &Tuning) -> Obstacle {
        let h = self
            .rng
            .gen_range(tuning.obstacle_min_height..tuning.obstacle_max_height) as f32;
        Obstacle {
            x: tuning.field_width + tuning.spawn_lead_margin,
            y: tuning.ground_y() - h,
            w: tuning.obstacle_width,
            h,
            passed: false,
        }
    }

    pub fn next_interval(&mut self, tuning: &Tuning) -> f32 {
        self.rng
            .gen_range(tuning.spawn_min_interval..tuning.spawn_max_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_obstacles_stand_on_the_ground_inside_the_height_range() {
        let tuning = Tuning::default();
        let mut spawner = ObstacleSpawner::new(7);
        for _ in 0..200 {
            let o = spawner.spawn(&tuning);
            assert_eq!(o.x, 990.0);
            assert_eq!(o.w, 56.0);
            assert!(o.h >= 70.0 && o.h < 140.0);
            assert_eq!(o.h.fract(), 0.0);
            assert_eq!(o.y + o.h, tuning.ground_y());
            assert!(!o.passed);
        }
    }

    #[test]
    fn timer_fires_at_zero_and_rearms_inside_the_interval() {
        let tuning = Tuning::default();
        let mut spawner = ObstacleSpawner::new(1);
        let mut timer = 0.0;

        assert!(spawner.advance(&mut timer, 0.016, &tuning).is_some());
        assert!(timer >= 1.1 && timer < 1.8);

        let armed = timer;
        assert!(spawner.advance(&mut timer, 0.5, &tuning).is_none());
        assert!((timer - (armed - 0.5)).abs() < 1e-6);
    }

    #[test]
    fn same_seed_same_sequence() {
        let tuning = Tuning::default();
        let mut a = ObstacleSpawner::new(99);
        let mut b = ObstacleSpawner::new(99);
        for _ in 0..20 {
            assert_eq!(a.spawn(&tuning), b.spawn(&tuning));
            assert_eq!(a.next_interval(&tuning), b.next_interval(&tuning));
        }
    }
}
