//! Hostile entities: steering, knockback, activity tiering and the
//! hit/death lifecycle
//!
//! Enemies are owned by [`Swarm`](super::swarm::Swarm), which runs the
//! separation pass and recycles dead enemies through its pool.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::SimRng;
use crate::error::SimError;
use crate::polar_to_cartesian;
use crate::tuning::Tuning;

/// Unique per spawn; never reused, even for pooled instances
pub type EnemyId = u32;

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Bat,
    Skeleton,
    Ghoul,
    Brute,
}

/// Base stats for an archetype
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProfile {
    pub speed: f32,
    pub max_health: f32,
    pub contact_damage: f32,
    pub radius: f32,
    pub xp: u32,
    /// Chance to drop an experience gem on death
    pub drop_chance: f32,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Bat,
        EnemyKind::Skeleton,
        EnemyKind::Ghoul,
        EnemyKind::Brute,
    ];

    pub fn profile(self) -> EnemyProfile {
        match self {
            EnemyKind::Bat => EnemyProfile {
                speed: 110.0,
                max_health: 8.0,
                contact_damage: 5.0,
                radius: 12.0,
                xp: 1,
                drop_chance: 0.7,
            },
            EnemyKind::Skeleton => EnemyProfile {
                speed: 80.0,
                max_health: 20.0,
                contact_damage: 8.0,
                radius: 16.0,
                xp: 2,
                drop_chance: 0.8,
            },
            EnemyKind::Ghoul => EnemyProfile {
                speed: 95.0,
                max_health: 35.0,
                contact_damage: 12.0,
                radius: 18.0,
                xp: 3,
                drop_chance: 0.9,
            },
            EnemyKind::Brute => EnemyProfile {
                speed: 55.0,
                max_health: 120.0,
                contact_damage: 20.0,
                radius: 26.0,
                xp: 10,
                drop_chance: 1.0,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Bat => "bat",
            EnemyKind::Skeleton => "skeleton",
            EnemyKind::Ghoul => "ghoul",
            EnemyKind::Brute => "brute",
        }
    }
}

/// Steering variant, fixed at spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiBehavior {
    /// Straight at the player
    Chase,
    /// Swing counter-clockwise around the player while approaching
    FlankLeft,
    /// Swing clockwise around the player while approaching
    FlankRight,
}

impl AiBehavior {
    /// Chase with `chase_probability`, otherwise one of the flanks
    pub fn roll(rng: &mut SimRng, chase_probability: f32) -> Self {
        if rng.chance(chase_probability) {
            AiBehavior::Chase
        } else if rng.chance(0.5) {
            AiBehavior::FlankLeft
        } else {
            AiBehavior::FlankRight
        }
    }

    /// Rotation sign applied to the flank angle
    pub fn flank_sign(self) -> f32 {
        match self {
            AiBehavior::Chase => 0.0,
            AiBehavior::FlankLeft => 1.0,
            AiBehavior::FlankRight => -1.0,
        }
    }
}

/// Coarse simulation state from distance to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityTier {
    Active,
    Sleeping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    Alive,
    /// Health hit zero; death animation playing
    Dying,
    /// Death animation finished; the owning swarm may reclaim it
    Removable,
}

/// Result of [`Enemy::take_damage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Not alive, non-finite amount, or a non-positive amount
    Ignored,
    /// Damaged but still alive
    Hurt,
    /// This call moved the enemy from Alive to Dying
    Killed,
}

/// What happened to an enemy during one update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyStep {
    Moved,
    Sleeping,
    Teleported,
    Dying,
    Finished,
}

/// A hostile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub speed: f32,
    pub contact_damage: f32,
    pub radius: f32,
    pub behavior: AiBehavior,
    /// Current knockback velocity (decays toward zero)
    pub knockback: Vec2,
    health: f32,
    max_health: f32,
    /// Unsigned flank rotation in radians; sign comes from `behavior`
    flank_angle: f32,
    /// Seconds until the flank angle is re-rolled
    flank_timer: f32,
    tier: ActivityTier,
    lifecycle: Lifecycle,
    /// Seconds of hit reaction left
    hit_timer: f32,
    /// Seconds since death started
    death_timer: f32,
}

impl Enemy {
    /// Create an enemy of `kind` at `pos` with full health
    pub fn spawn(
        id: EnemyId,
        kind: EnemyKind,
        pos: Vec2,
        behavior: AiBehavior,
        rng: &mut SimRng,
        tuning: &Tuning,
    ) -> Result<Self, SimError> {
        SimError::check_position("enemy", pos)?;
        let profile = kind.profile();
        Ok(Self {
            id,
            kind,
            pos,
            speed: profile.speed,
            contact_damage: profile.contact_damage,
            radius: profile.radius,
            behavior,
            knockback: Vec2::ZERO,
            health: profile.max_health,
            max_health: profile.max_health,
            flank_angle: rng.random(tuning.flank_angle_min, tuning.flank_angle_max),
            flank_timer: tuning.flank_reroll_interval,
            tier: ActivityTier::Active,
            lifecycle: Lifecycle::Alive,
            hit_timer: 0.0,
            death_timer: 0.0,
        })
    }

    /// Reset every field for reuse from a pool
    pub fn reinitialize(
        &mut self,
        id: EnemyId,
        kind: EnemyKind,
        pos: Vec2,
        behavior: AiBehavior,
        rng: &mut SimRng,
        tuning: &Tuning,
    ) -> Result<(), SimError> {
        *self = Self::spawn(id, kind, pos, behavior, rng, tuning)?;
        Ok(())
    }

    /// Override max health and refill
    pub fn set_max_health(&mut self, max_health: f32) -> Result<(), SimError> {
        if !max_health.is_finite() || max_health <= 0.0 {
            return Err(SimError::NonFiniteValue {
                what: "enemy max health",
                value: max_health,
            });
        }
        self.max_health = max_health;
        self.health = max_health;
        Ok(())
    }

    #[inline]
    pub fn health(&self) -> f32 {
        self.health
    }

    #[inline]
    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    #[inline]
    pub fn tier(&self) -> ActivityTier {
        self.tier
    }

    #[inline]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn flank_angle(&self) -> f32 {
        self.flank_angle
    }

    pub fn hit_timer(&self) -> f32 {
        self.hit_timer
    }

    pub fn death_timer(&self) -> f32 {
        self.death_timer
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.lifecycle == Lifecycle::Alive
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.tier == ActivityTier::Active
    }

    /// Alive and in the active tier; the only state that collides
    #[inline]
    pub fn is_targetable(&self) -> bool {
        self.is_alive() && self.is_active()
    }

    /// Playing its hit reaction
    pub fn is_flashing(&self) -> bool {
        self.is_alive() && self.hit_timer > 0.0
    }

    /// Death animation finished
    #[inline]
    pub fn should_remove(&self) -> bool {
        self.lifecycle == Lifecycle::Removable
    }

    /// Apply `amount` damage. Zero and negative amounts are ignored without
    /// touching health. Health never drops below zero; the Alive -> Dying
    /// transition happens at most once.
    pub fn take_damage(&mut self, amount: f32, tuning: &Tuning) -> DamageOutcome {
        if !amount.is_finite() {
            log::warn!("enemy {}: ignoring non-finite damage {}", self.id, amount);
            return DamageOutcome::Ignored;
        }
        if amount <= 0.0 || self.lifecycle != Lifecycle::Alive {
            return DamageOutcome::Ignored;
        }

        self.health = crate::clamp(self.health - amount, 0.0, self.max_health);
        if self.health <= 0.0 {
            self.lifecycle = Lifecycle::Dying;
            self.death_timer = 0.0;
            self.hit_timer = 0.0;
            self.knockback = Vec2::ZERO;
            return DamageOutcome::Killed;
        }
        self.hit_timer = tuning.hit_reaction_duration;
        DamageOutcome::Hurt
    }

    /// Add a knockback impulse (velocity, units/s)
    pub fn apply_knockback(&mut self, impulse: Vec2) {
        if !self.is_alive() || !crate::is_finite_vec(impulse) {
            return;
        }
        self.knockback += impulse;
    }

    /// Recompute the activity tier from distance to the player. Enemies past
    /// the teleport radius are moved onto the respawn circle. Returns true on
    /// teleport.
    pub fn update_tier(&mut self, player: Vec2, rng: &mut SimRng, tuning: &Tuning) -> bool {
        let dist = self.pos.distance(player);
        if dist > tuning.teleport_radius {
            self.teleport_to_random_edge(player, rng, tuning);
            return true;
        }
        self.tier = if dist < tuning.active_radius {
            ActivityTier::Active
        } else {
            ActivityTier::Sleeping
        };
        false
    }

    /// Move to a random point at `respawn_radius` from the player and wake up.
    /// Health, kind and behavior carry over.
    pub fn teleport_to_random_edge(&mut self, player: Vec2, rng: &mut SimRng, tuning: &Tuning) {
        let angle = rng.angle();
        self.pos = player + polar_to_cartesian(tuning.respawn_radius, angle);
        self.knockback = Vec2::ZERO;
        self.tier = ActivityTier::Active;
        log::debug!("enemy {} teleported to {:?}", self.id, self.pos);
    }

    /// Unit direction this enemy wants to move in
    pub fn steering_direction(&self, player: Vec2, tuning: &Tuning) -> Vec2 {
        let to_player = player - self.pos;
        let dist = to_player.length();
        let direct = to_player.normalize_or_zero();
        if self.behavior == AiBehavior::Chase || dist <= tuning.flank_near_range {
            return direct;
        }
        let angle = self.flank_angle * self.behavior.flank_sign();
        Vec2::from_angle(angle).rotate(direct).normalize_or_zero()
    }

    /// Integrate and decay knockback
    pub fn integrate_knockback(&mut self, dt: f32, tuning: &Tuning) {
        if self.knockback == Vec2::ZERO {
            return;
        }
        self.pos += self.knockback * dt;
        self.knockback *= (-tuning.knockback_decay * dt).exp();
        if self.knockback.length() < tuning.knockback_epsilon {
            self.knockback = Vec2::ZERO;
        }
    }

    /// Advance timers, tiering, steering, knockback and movement by `dt`.
    /// Separation is applied afterwards by the swarm.
    pub fn update(
        &mut self,
        player: Vec2,
        dt: f32,
        rng: &mut SimRng,
        tuning: &Tuning,
    ) -> EnemyStep {
        match self.lifecycle {
            Lifecycle::Removable => return EnemyStep::Finished,
            Lifecycle::Dying => {
                self.death_timer += dt;
                if self.death_timer > tuning.death_duration {
                    self.lifecycle = Lifecycle::Removable;
                    return EnemyStep::Finished;
                }
                return EnemyStep::Dying;
            }
            Lifecycle::Alive => {}
        }

        self.hit_timer = (self.hit_timer - dt).max(0.0);

        let teleported = self.update_tier(player, rng, tuning);
        if self.tier == ActivityTier::Sleeping {
            return EnemyStep::Sleeping;
        }

        self.flank_timer -= dt;
        if self.flank_timer <= 0.0 {
            self.flank_angle = rng.random(tuning.flank_angle_min, tuning.flank_angle_max);
            self.flank_timer += tuning.flank_reroll_interval;
            if self.flank_timer <= 0.0 {
                self.flank_timer = tuning.flank_reroll_interval;
            }
        }

        let dir = self.steering_direction(player, tuning);
        self.integrate_knockback(dt, tuning);
        self.pos += dir * self.speed * dt;

        if teleported {
            EnemyStep::Teleported
        } else {
            EnemyStep::Moved
        }
    }
}
