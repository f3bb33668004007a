//! The player: movement, health, regen, invincibility and experience

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::progression::AggregateModifiers;
use crate::tuning::Tuning;

/// Result of [`Player::take_damage`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerHit {
    /// Invincible or already dead
    Ignored,
    /// Damage applied (may be zero or, with negative damage enabled, a heal)
    Damaged(f32),
    /// This hit brought health to zero
    Killed(f32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    health: f32,
    /// Effective max health (base scaled by modifiers)
    max_health: f32,
    base_max_health: f32,
    base_speed: f32,
    pub radius: f32,
    base_pickup_radius: f32,
    invincible_timer: f32,
    pub level: u32,
    pub xp: u32,
    /// Set once the over-100% reduction warning has been logged
    #[serde(skip)]
    warned_negative_damage: bool,
}

impl Player {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Result<Self, SimError> {
        SimError::check_position("player", pos)?;
        Ok(Self {
            pos,
            health: tuning.player_base_health,
            max_health: tuning.player_base_health,
            base_max_health: tuning.player_base_health,
            base_speed: tuning.player_base_speed,
            radius: tuning.player_radius,
            base_pickup_radius: tuning.player_base_pickup_radius,
            invincible_timer: 0.0,
            level: 1,
            xp: 0,
            warned_negative_damage: false,
        })
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
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_timer > 0.0
    }

    pub fn speed(&self, mods: &AggregateModifiers) -> f32 {
        self.base_speed * mods.move_speed
    }

    pub fn pickup_radius(&self, mods: &AggregateModifiers) -> f32 {
        self.base_pickup_radius * (1.0 + mods.pickup_range)
    }

    /// Sync effective max health with the modifier snapshot. Growth adds the
    /// difference to current health; shrinking clamps it.
    pub fn apply_modifiers(&mut self, mods: &AggregateModifiers) {
        if self.is_dead() {
            return;
        }
        let new_max = (self.base_max_health * mods.max_health).max(1.0);
        if new_max > self.max_health {
            self.health += new_max - self.max_health;
        }
        self.max_health = new_max;
        self.health = crate::clamp(self.health, 0.0, self.max_health);
    }

    /// Count down invincibility and regenerate
    pub fn tick(&mut self, dt: f32, mods: &AggregateModifiers) {
        self.invincible_timer = (self.invincible_timer - dt).max(0.0);
        if !self.is_dead() && mods.regen > 0.0 {
            self.health = (self.health + mods.regen * dt).min(self.max_health);
        }
    }

    /// Move along `direction` (normalized so diagonals are not faster),
    /// clamped to the world bounds
    pub fn move_by(&mut self, direction: Vec2, dt: f32, mods: &AggregateModifiers, bounds: Vec2) {
        if self.is_dead() {
            return;
        }
        let dir = direction.normalize_or_zero();
        self.pos += dir * self.speed(mods) * dt;
        self.pos = self.pos.clamp(-bounds, bounds);
    }

    /// Apply contact damage scaled by incoming-damage modifiers and start the
    /// invincibility window
    pub fn take_damage(
        &mut self,
        raw: f32,
        mods: &AggregateModifiers,
        tuning: &Tuning,
    ) -> PlayerHit {
        if self.is_dead() || self.is_invincible() || !raw.is_finite() {
            return PlayerHit::Ignored;
        }
        let mut amount = raw * mods.incoming_damage;
        if amount < 0.0 && !tuning.allow_negative_damage_taken {
            if !self.warned_negative_damage {
                log::warn!(
                    "incoming damage factor {} is negative; clamping damage to zero",
                    mods.incoming_damage
                );
                self.warned_negative_damage = true;
            }
            amount = 0.0;
        }
        self.health = crate::clamp(self.health - amount, 0.0, self.max_health);
        self.invincible_timer = tuning.invincibility_duration;
        if self.is_dead() {
            PlayerHit::Killed(amount)
        } else {
            PlayerHit::Damaged(amount)
        }
    }

    /// Experience needed to reach the next level
    pub fn xp_to_next(&self, tuning: &Tuning) -> u32 {
        tuning.xp_base + tuning.xp_growth * (self.level - 1)
    }

    /// Add experience; returns the number of levels gained
    pub fn gain_xp(&mut self, amount: u32, tuning: &Tuning) -> u32 {
        self.xp += amount;
        let mut gained = 0;
        loop {
            let needed = self.xp_to_next(tuning).max(1);
            if self.xp < needed {
                break;
            }
            self.xp -= needed;
            self.level += 1;
            gained += 1;
        }
        gained
    }
}
