//! Time-based spawn schedule

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{AiBehavior, EnemyId, EnemyKind};
use super::rng::SimRng;
use super::swarm::Swarm;
use crate::error::SimError;
use crate::polar_to_cartesian;
use crate::tuning::Tuning;

/// Seconds of run time over which enemy health doubles
const HEALTH_DOUBLING_SECS: f32 = 300.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spawner {
    /// Seconds until the next burst
    timer: f32,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Archetype mix shifts toward tougher enemies as the run goes on
    pub fn pick_kind(elapsed: f32, rng: &mut SimRng) -> EnemyKind {
        let roll = rng.random(0.0, 1.0);
        let minutes = elapsed / 60.0;
        let brute = (0.02 * minutes).min(0.15);
        let ghoul = (0.08 * minutes).min(0.35);
        let skeleton = (0.1 + 0.1 * minutes).min(0.4);
        if roll < brute {
            EnemyKind::Brute
        } else if roll < brute + ghoul {
            EnemyKind::Ghoul
        } else if roll < brute + ghoul + skeleton {
            EnemyKind::Skeleton
        } else {
            EnemyKind::Bat
        }
    }

    /// Health multiplier applied to newly spawned enemies
    pub fn health_scale(elapsed: f32) -> f32 {
        1.0 + elapsed.max(0.0) / HEALTH_DOUBLING_SECS
    }

    /// Advance the schedule and spawn a burst on the respawn circle when due
    pub fn update(
        &mut self,
        elapsed: f32,
        dt: f32,
        player: Vec2,
        swarm: &mut Swarm,
        rng: &mut SimRng,
        tuning: &Tuning,
    ) -> Result<Vec<EnemyId>, SimError> {
        let Some(stage) = tuning.wave_at(elapsed).copied() else {
            return Ok(Vec::new());
        };
        self.timer -= dt;
        if self.timer > 0.0 {
            return Ok(Vec::new());
        }
        self.timer = stage.interval_secs;

        let room = tuning.max_enemies.saturating_sub(swarm.alive_count());
        let count = (stage.count as usize).min(room);
        let mut spawned = Vec::with_capacity(count);
        for _ in 0..count {
            let kind = Self::pick_kind(elapsed, rng);
            let behavior = AiBehavior::roll(rng, tuning.chase_probability);
            let pos = player + polar_to_cartesian(tuning.respawn_radius, rng.angle());
            let id = swarm.spawn(kind, pos, behavior, rng, tuning)?;
            if let Some(enemy) = swarm.get_mut(id) {
                let scaled = kind.profile().max_health * Self::health_scale(elapsed);
                enemy.set_max_health(scaled)?;
            }
            spawned.push(id);
        }
        if !spawned.is_empty() {
            log::info!(
                "t={:.1}s spawned {} enemies ({} alive)",
                elapsed,
                spawned.len(),
                swarm.alive_count()
            );
        }
        Ok(spawned)
    }
}
