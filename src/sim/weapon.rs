//! Auto-targeting weapon driven by the progression ledger

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::projectile::{Pierce, ProjectileId, ProjectileSpec, Projectiles};
use super::rng::SimRng;
use super::swarm::Swarm;
use crate::error::SimError;
use crate::progression::{AggregateModifiers, ProgressionLedger, UpgradeKind};
use crate::tuning::Tuning;

/// A fired shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub projectile: ProjectileId,
    pub damage: f32,
    pub critical: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Weapon {
    /// Seconds until the next shot is allowed
    cooldown: f32,
    evolved: bool,
}

impl Weapon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_evolved(&self) -> bool {
        self.evolved
    }

    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Evolve once the ledger reports every requirement maxed
    pub fn try_evolve(&mut self, ledger: &ProgressionLedger) -> bool {
        if self.evolved || !ledger.evolution_ready() {
            return false;
        }
        self.evolved = true;
        true
    }

    /// Pierce budget for a weapon level: one extra hit every three levels,
    /// unlimited once evolved
    pub fn pierce_for(level: u32, evolved: bool) -> Pierce {
        if evolved {
            Pierce::Unlimited
        } else {
            Pierce::Limited(level / 3)
        }
    }

    /// Damage per shot before crits
    pub fn base_damage(
        &self,
        ledger: &ProgressionLedger,
        mods: &AggregateModifiers,
        tuning: &Tuning,
    ) -> f32 {
        let evolved = if self.evolved {
            tuning.evolved_damage_factor
        } else {
            1.0
        };
        tuning.weapon_base_damage * ledger.effect(UpgradeKind::Weapon) * mods.damage * evolved
    }

    /// Seconds between shots after fire-rate modifiers
    pub fn interval(mods: &AggregateModifiers, tuning: &Tuning) -> f32 {
        tuning.weapon_cooldown / mods.fire_rate.max(0.01)
    }

    /// Count down and fire at the nearest targetable enemy when ready.
    /// With no target in range the weapon stays ready.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt: f32,
        from: Vec2,
        swarm: &Swarm,
        projectiles: &mut Projectiles,
        ledger: &ProgressionLedger,
        mods: &AggregateModifiers,
        rng: &mut SimRng,
        tuning: &Tuning,
    ) -> Result<Option<Shot>, SimError> {
        self.cooldown = (self.cooldown - dt).max(0.0);
        if self.cooldown > 0.0 {
            return Ok(None);
        }
        let Some(target) = swarm.nearest_targetable(from, tuning.weapon_range) else {
            return Ok(None);
        };

        let critical = rng.chance(mods.crit_chance);
        let mut damage = self.base_damage(ledger, mods, tuning);
        if critical {
            damage *= tuning.crit_multiplier;
        }
        let projectile = projectiles.spawn(ProjectileSpec {
            origin: from,
            direction: target.pos - from,
            speed: tuning.projectile_speed,
            damage,
            radius: tuning.projectile_radius,
            pierce: Self::pierce_for(ledger.level(UpgradeKind::Weapon), self.evolved),
        })?;
        self.cooldown = Self::interval(mods, tuning);
        Ok(Some(Shot {
            projectile,
            damage,
            critical,
        }))
    }
}
