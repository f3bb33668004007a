//! Combat resolution: projectile hits and contact damage
//!
//! Both passes only consider enemies that are alive and in the active tier.

use glam::Vec2;

use super::enemy::{DamageOutcome, EnemyId, EnemyKind};
use super::player::{Player, PlayerHit};
use super::projectile::{HitOutcome, ProjectileId, Projectiles};
use super::swarm::Swarm;
use crate::progression::AggregateModifiers;
use crate::tuning::Tuning;

/// An enemy that died this step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kill {
    pub enemy: EnemyId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub projectile: ProjectileId,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitReport {
    /// Damaging hits applied
    pub hits: usize,
    pub kills: Vec<Kill>,
}

/// Test every active projectile against every targetable enemy and apply the
/// pierce contract, damage and knockback
pub fn resolve_projectile_hits(
    projectiles: &mut Projectiles,
    swarm: &mut Swarm,
    mods: &AggregateModifiers,
    tuning: &Tuning,
) -> HitReport {
    let mut report = HitReport::default();
    let knockback = tuning.knockback_base * mods.damage;

    for projectile in projectiles.iter_mut() {
        if !projectile.is_active() {
            continue;
        }
        for enemy in swarm.iter_mut() {
            if !enemy.is_targetable() {
                continue;
            }
            let reach = enemy.radius + projectile.radius;
            if enemy.pos.distance_squared(projectile.pos) >= reach * reach {
                continue;
            }

            let outcome = projectile.register_hit(enemy.id);
            if !outcome.deals_damage() {
                if outcome == HitOutcome::Inactive {
                    break;
                }
                continue;
            }

            report.hits += 1;
            if enemy.take_damage(projectile.damage, tuning) == DamageOutcome::Killed {
                report.kills.push(Kill {
                    enemy: enemy.id,
                    kind: enemy.kind,
                    pos: enemy.pos,
                    projectile: projectile.id,
                });
            } else {
                enemy.apply_knockback(projectile.direction() * knockback);
            }

            if outcome == HitOutcome::Consumed {
                break;
            }
        }
    }
    report
}

/// Apply contact damage from the first overlapping enemy. The invincibility
/// window started by a hit makes any further contacts this step no-ops.
pub fn resolve_contact_damage(
    player: &mut Player,
    swarm: &Swarm,
    mods: &AggregateModifiers,
    tuning: &Tuning,
) -> Option<(EnemyId, PlayerHit)> {
    if player.is_dead() || player.is_invincible() {
        return None;
    }
    for enemy in swarm.iter().filter(|e| e.is_targetable()) {
        let reach = enemy.radius + player.radius;
        if enemy.pos.distance_squared(player.pos) >= reach * reach {
            continue;
        }
        match player.take_damage(enemy.contact_damage, mods, tuning) {
            PlayerHit::Ignored => {}
            hit => return Some((enemy.id, hit)),
        }
    }
    None
}
