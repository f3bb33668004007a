//! Data-driven game balance
//!
//! Every balance constant the simulation reads lives in [`Tuning`]. Defaults
//! are the shipped values; a JSON document may override any subset of them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// One row of the spawn schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveStage {
    /// Elapsed run time (seconds) at which this stage takes over
    pub start_secs: f32,
    /// Seconds between spawn bursts
    pub interval_secs: f32,
    /// Enemies per burst
    pub count: u32,
}

/// Balance values for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    /// Half-extents of the playable area (player is clamped, enemies are not)
    pub world_bounds: Vec2,

    // === Player ===
    pub player_base_health: f32,
    pub player_base_speed: f32,
    pub player_radius: f32,
    pub player_base_pickup_radius: f32,
    /// Immunity after taking contact damage (seconds)
    pub invincibility_duration: f32,

    // === Activity tiering ===
    /// Enemies closer than this run AI and physics
    pub active_radius: f32,
    /// Enemies farther than this are relocated to the respawn circle
    pub teleport_radius: f32,
    /// Radius of the circle teleported enemies land on
    pub respawn_radius: f32,

    // === Steering ===
    /// Flankers chase directly inside this distance
    pub flank_near_range: f32,
    pub flank_reroll_interval: f32,
    /// Flank angle range in radians
    pub flank_angle_min: f32,
    pub flank_angle_max: f32,
    /// Probability a spawned enemy is a direct chaser (rest split between flanks)
    pub chase_probability: f32,

    // === Knockback ===
    /// Exponential decay rate per second
    pub knockback_decay: f32,
    /// Knockback speed below which it snaps to zero
    pub knockback_epsilon: f32,
    /// Knockback impulse of a weapon hit before modifiers
    pub knockback_base: f32,

    // === Separation ===
    pub separation_radius: f32,
    pub separation_strength: f32,
    /// Minimum push speed so overlapping pairs resolve in finite time
    pub separation_min_push: f32,

    // === Enemy lifecycle ===
    pub hit_reaction_duration: f32,
    pub death_duration: f32,
    pub max_enemies: usize,
    pub waves: Vec<WaveStage>,

    // === Weapon / projectiles ===
    pub weapon_base_damage: f32,
    /// Seconds between shots before fire-rate modifiers
    pub weapon_cooldown: f32,
    pub weapon_range: f32,
    pub crit_multiplier: f32,
    pub evolved_damage_factor: f32,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    /// Travel distance after which a projectile is culled
    pub projectile_max_travel: f32,

    // === Experience ===
    pub xp_base: u32,
    pub xp_growth: u32,
    /// Gems on the floor before new drops merge into the nearest one
    pub max_gems: usize,
    /// A drop this close to an existing gem merges into it
    pub gem_merge_radius: f32,

    /// Stacked damage reduction beyond 100% heals the player when true.
    /// When false the final damage taken is clamped at zero.
    pub allow_negative_damage_taken: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_bounds: Vec2::new(4000.0, 4000.0),

            player_base_health: 100.0,
            player_base_speed: 200.0,
            player_radius: 16.0,
            player_base_pickup_radius: 60.0,
            invincibility_duration: 0.5,

            active_radius: 1000.0,
            teleport_radius: 1500.0,
            respawn_radius: 700.0,

            flank_near_range: 150.0,
            flank_reroll_interval: 2.0,
            flank_angle_min: 0.35,
            flank_angle_max: 0.8,
            chase_probability: 0.5,

            knockback_decay: 8.0,
            knockback_epsilon: 1.0,
            knockback_base: 250.0,

            separation_radius: 40.0,
            separation_strength: 120.0,
            separation_min_push: 10.0,

            hit_reaction_duration: 0.2,
            death_duration: 0.5,
            max_enemies: 300,
            waves: vec![
                WaveStage {
                    start_secs: 0.0,
                    interval_secs: 4.0,
                    count: 2,
                },
                WaveStage {
                    start_secs: 60.0,
                    interval_secs: 2.5,
                    count: 4,
                },
                WaveStage {
                    start_secs: 180.0,
                    interval_secs: 1.5,
                    count: 8,
                },
                WaveStage {
                    start_secs: 360.0,
                    interval_secs: 1.0,
                    count: 12,
                },
                WaveStage {
                    start_secs: 600.0,
                    interval_secs: 0.7,
                    count: 18,
                },
            ],

            weapon_base_damage: 10.0,
            weapon_cooldown: 1.0,
            weapon_range: 500.0,
            crit_multiplier: 2.0,
            evolved_damage_factor: 1.5,
            projectile_speed: 400.0,
            projectile_radius: 6.0,
            projectile_max_travel: 900.0,

            xp_base: 5,
            xp_growth: 10,
            max_gems: 200,
            gem_merge_radius: 24.0,

            allow_negative_damage_taken: false,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check ordering and sign constraints the simulation relies on
    pub fn validate(&self) -> Result<(), SimError> {
        let scalars = [
            ("player_base_health", self.player_base_health),
            ("player_base_speed", self.player_base_speed),
            ("player_radius", self.player_radius),
            ("player_base_pickup_radius", self.player_base_pickup_radius),
            ("invincibility_duration", self.invincibility_duration),
            ("flank_near_range", self.flank_near_range),
            ("flank_angle_min", self.flank_angle_min),
            ("flank_angle_max", self.flank_angle_max),
            ("knockback_decay", self.knockback_decay),
            ("knockback_epsilon", self.knockback_epsilon),
            ("knockback_base", self.knockback_base),
            ("separation_strength", self.separation_strength),
            ("separation_min_push", self.separation_min_push),
            ("hit_reaction_duration", self.hit_reaction_duration),
            ("weapon_base_damage", self.weapon_base_damage),
            ("weapon_range", self.weapon_range),
            ("crit_multiplier", self.crit_multiplier),
            ("evolved_damage_factor", self.evolved_damage_factor),
            ("projectile_speed", self.projectile_speed),
            ("projectile_radius", self.projectile_radius),
            ("gem_merge_radius", self.gem_merge_radius),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidTuning(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        let positive = [
            ("respawn_radius", self.respawn_radius),
            ("flank_reroll_interval", self.flank_reroll_interval),
            ("separation_radius", self.separation_radius),
            ("death_duration", self.death_duration),
            ("weapon_cooldown", self.weapon_cooldown),
            ("projectile_max_travel", self.projectile_max_travel),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::InvalidTuning(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if !(self.respawn_radius < self.active_radius && self.active_radius < self.teleport_radius)
        {
            return Err(SimError::InvalidTuning(format!(
                "radii must satisfy respawn < active < teleport ({} / {} / {})",
                self.respawn_radius, self.active_radius, self.teleport_radius
            )));
        }
        if self.flank_angle_min > self.flank_angle_max {
            return Err(SimError::InvalidTuning(
                "flank_angle_min exceeds flank_angle_max".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.chase_probability) {
            return Err(SimError::InvalidTuning(format!(
                "chase_probability must be in [0, 1], got {}",
                self.chase_probability
            )));
        }
        if self.waves.iter().any(|w| w.interval_secs <= 0.0) {
            return Err(SimError::InvalidTuning(
                "wave interval_secs must be positive".to_string(),
            ));
        }
        if self.max_gems == 0 {
            return Err(SimError::InvalidTuning(
                "max_gems must be at least 1".to_string(),
            ));
        }
        if self.world_bounds.x <= 0.0 || self.world_bounds.y <= 0.0 {
            return Err(SimError::InvalidTuning(
                "world_bounds must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// The spawn stage in effect at `elapsed` seconds
    pub fn wave_at(&self, elapsed: f32) -> Option<&WaveStage> {
        self.waves.iter().rev().find(|w| elapsed >= w.start_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "max_enemies": 50, "death_duration": 1.25 }"#).unwrap();
        assert_eq!(tuning.max_enemies, 50);
        assert_eq!(tuning.death_duration, 1.25);
        assert_eq!(tuning.active_radius, Tuning::default().active_radius);
    }

    #[test]
    fn test_json_round_trip() {
        let tuning = Tuning::default();
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_rejects_unordered_radii() {
        let err = Tuning::from_json(r#"{ "respawn_radius": 2000.0 }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidTuning(_)));
    }

    #[test]
    fn test_rejects_gem_limits() {
        let err = Tuning::from_json(r#"{ "max_gems": 0 }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidTuning(_)));
        let err = Tuning::from_json(r#"{ "gem_merge_radius": -1.0 }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidTuning(_)));
    }

    #[test]
    fn test_rejects_bad_json() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SimError::TuningParse(_)));
    }

    #[test]
    fn test_wave_at() {
        let tuning = Tuning::default();
        assert_eq!(tuning.wave_at(0.0).unwrap().count, 2);
        assert_eq!(tuning.wave_at(61.0).unwrap().count, 4);
        assert_eq!(tuning.wave_at(10_000.0).unwrap().count, 18);
    }
}
