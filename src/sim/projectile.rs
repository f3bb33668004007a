//! Projectiles and the pierce contract
//!
//! A projectile is `Active` until its pierce budget runs out on a hit or it
//! travels past the maximum distance from its spawn origin. Each projectile
//! damages a given enemy at most once, no matter how many ticks they overlap.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyId;
use crate::consts::FALLBACK_AXIS;
use crate::error::SimError;

pub type ProjectileId = u32;

/// Additional hits allowed after the first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pierce {
    Limited(u32),
    Unlimited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestroyReason {
    /// Pierce budget spent on a hit
    Consumed,
    /// Traveled past the maximum distance
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileState {
    Active,
    Destroyed(DestroyReason),
}

/// Result of [`Projectile::register_hit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// This enemy was already hit; no damage, no budget spent
    AlreadyHit,
    /// Damage applies and the projectile keeps flying
    Continue,
    /// Damage applies and the projectile is destroyed
    Consumed,
    /// Projectile is already destroyed; nothing applies
    Inactive,
}

impl HitOutcome {
    /// Whether the caller should apply damage for this hit
    pub fn deals_damage(self) -> bool {
        matches!(self, HitOutcome::Continue | HitOutcome::Consumed)
    }
}

/// Launch parameters shared by construction and pool reuse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpec {
    pub origin: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub damage: f32,
    pub radius: f32,
    pub pierce: Pierce,
}

impl ProjectileSpec {
    fn validate(&self) -> Result<(), SimError> {
        SimError::check_position("projectile", self.origin)?;
        SimError::check_non_negative("projectile speed", self.speed)?;
        SimError::check_non_negative("projectile damage", self.damage)?;
        SimError::check_non_negative("projectile radius", self.radius)?;
        Ok(())
    }
}

/// Normalize, falling back to a fixed axis for zero-length or non-finite input
pub fn normalize_direction(direction: Vec2) -> Vec2 {
    let dir = direction.normalize_or_zero();
    if dir == Vec2::ZERO || !crate::is_finite_vec(dir) {
        FALLBACK_AXIS
    } else {
        dir
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: ProjectileId,
    pub pos: Vec2,
    origin: Vec2,
    direction: Vec2,
    pub speed: f32,
    pub damage: f32,
    pub radius: f32,
    pierce: Pierce,
    hits: HashSet<EnemyId>,
    state: ProjectileState,
}

impl Projectile {
    pub fn new(id: ProjectileId, spec: ProjectileSpec) -> Result<Self, SimError> {
        spec.validate()?;
        Ok(Self {
            id,
            pos: spec.origin,
            origin: spec.origin,
            direction: normalize_direction(spec.direction),
            speed: spec.speed,
            damage: spec.damage,
            radius: spec.radius,
            pierce: spec.pierce,
            hits: HashSet::new(),
            state: ProjectileState::Active,
        })
    }

    /// Reset every field for reuse from a pool. The hit-set is cleared so the
    /// new shot can damage enemies the previous one already hit. On error the
    /// projectile is left untouched.
    pub fn reinitialize(&mut self, id: ProjectileId, spec: ProjectileSpec) -> Result<(), SimError> {
        spec.validate()?;
        self.id = id;
        self.pos = spec.origin;
        self.origin = spec.origin;
        self.direction = normalize_direction(spec.direction);
        self.speed = spec.speed;
        self.damage = spec.damage;
        self.radius = spec.radius;
        self.pierce = spec.pierce;
        self.hits.clear();
        self.state = ProjectileState::Active;
        Ok(())
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn pierce(&self) -> Pierce {
        self.pierce
    }

    #[inline]
    pub fn state(&self) -> ProjectileState {
        self.state
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == ProjectileState::Active
    }

    pub fn has_hit(&self, enemy: EnemyId) -> bool {
        self.hits.contains(&enemy)
    }

    pub fn hit_count(&self) -> usize {
        self.hits.len()
    }

    pub fn traveled(&self) -> f32 {
        self.pos.distance(self.origin)
    }

    /// Move along the direction and cull once past `max_travel`.
    /// Returns true if the projectile is still active.
    pub fn advance(&mut self, dt: f32, max_travel: f32) -> bool {
        if !self.is_active() {
            return false;
        }
        self.pos += self.direction * self.speed * dt;
        if self.traveled() > max_travel {
            self.state = ProjectileState::Destroyed(DestroyReason::OutOfRange);
            return false;
        }
        true
    }

    /// Apply the pierce contract for a hit on `enemy`
    pub fn register_hit(&mut self, enemy: EnemyId) -> HitOutcome {
        if !self.is_active() {
            return HitOutcome::Inactive;
        }
        if !self.hits.insert(enemy) {
            return HitOutcome::AlreadyHit;
        }
        match self.pierce {
            Pierce::Unlimited => HitOutcome::Continue,
            Pierce::Limited(0) => {
                self.state = ProjectileState::Destroyed(DestroyReason::Consumed);
                HitOutcome::Consumed
            }
            Pierce::Limited(n) => {
                self.pierce = Pierce::Limited(n - 1);
                HitOutcome::Continue
            }
        }
    }
}

/// Live projectiles plus a free list of destroyed ones
#[derive(Debug, Default)]
pub struct Projectiles {
    live: Vec<Projectile>,
    pool: Vec<Projectile>,
    next_id: ProjectileId,
}

impl Projectiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launch a projectile, reusing a pooled instance when available
    pub fn spawn(&mut self, spec: ProjectileSpec) -> Result<ProjectileId, SimError> {
        let id = self.next_id;
        let projectile = match self.pool.pop() {
            Some(mut recycled) => {
                if let Err(err) = recycled.reinitialize(id, spec) {
                    self.pool.push(recycled);
                    return Err(err);
                }
                recycled
            }
            None => Projectile::new(id, spec)?,
        };
        self.next_id = self.next_id.wrapping_add(1);
        self.live.push(projectile);
        Ok(id)
    }

    /// Advance all live projectiles; returns ids culled by range this step
    pub fn advance(&mut self, dt: f32, max_travel: f32) -> Vec<ProjectileId> {
        let mut expired = Vec::new();
        for p in &mut self.live {
            if p.is_active() && !p.advance(dt, max_travel) {
                expired.push(p.id);
            }
        }
        expired
    }

    /// Move destroyed projectiles to the pool; returns how many were removed
    pub fn compact(&mut self) -> usize {
        let before = self.live.len();
        let mut i = 0;
        while i < self.live.len() {
            if self.live[i].is_active() {
                i += 1;
            } else {
                let dead = self.live.swap_remove(i);
                self.pool.push(dead);
            }
        }
        before - self.live.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.live.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Projectile> {
        self.live.iter_mut()
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.live.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn pooled(&self) -> usize {
        self.pool.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spec(pierce: Pierce) -> ProjectileSpec {
        ProjectileSpec {
            origin: Vec2::ZERO,
            direction: Vec2::new(3.0, 4.0),
            speed: 100.0,
            damage: 10.0,
            radius: 4.0,
            pierce,
        }
    }

    #[test]
    fn test_direction_normalized() {
        let p = Projectile::new(0, spec(Pierce::Limited(0))).unwrap();
        assert!((p.direction().length() - 1.0).abs() < 1e-6);
        assert!((p.direction() - Vec2::new(0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_zero_direction_falls_back() {
        let mut s = spec(Pierce::Limited(0));
        s.direction = Vec2::ZERO;
        let p = Projectile::new(0, s).unwrap();
        assert_eq!(p.direction(), FALLBACK_AXIS);

        s.direction = Vec2::new(f32::NAN, 1.0);
        let p = Projectile::new(0, s).unwrap();
        assert_eq!(p.direction(), FALLBACK_AXIS);
    }

    #[test]
    fn test_rejects_non_finite_origin() {
        let mut s = spec(Pierce::Limited(0));
        s.origin = Vec2::new(0.0, f32::INFINITY);
        assert!(Projectile::new(0, s).is_err());
    }

    #[test]
    fn test_pierce_two_sequence() {
        let mut p = Projectile::new(0, spec(Pierce::Limited(2))).unwrap();
        assert_eq!(p.register_hit(1), HitOutcome::Continue);
        assert_eq!(p.pierce(), Pierce::Limited(1));
        assert_eq!(p.register_hit(2), HitOutcome::Continue);
        assert_eq!(p.pierce(), Pierce::Limited(0));
        assert_eq!(p.register_hit(3), HitOutcome::Consumed);
        assert_eq!(p.state(), ProjectileState::Destroyed(DestroyReason::Consumed));
        // Re-overlap after destruction never deals damage
        assert!(!p.register_hit(1).deals_damage());
    }

    #[test]
    fn test_reoverlap_does_not_spend_budget() {
        let mut p = Projectile::new(0, spec(Pierce::Limited(2))).unwrap();
        assert_eq!(p.register_hit(7), HitOutcome::Continue);
        for _ in 0..10 {
            assert_eq!(p.register_hit(7), HitOutcome::AlreadyHit);
        }
        assert_eq!(p.pierce(), Pierce::Limited(1));
        assert!(p.is_active());
    }

    #[test]
    fn test_zero_pierce_consumed_on_first_hit() {
        let mut p = Projectile::new(0, spec(Pierce::Limited(0))).unwrap();
        assert_eq!(p.register_hit(1), HitOutcome::Consumed);
        assert!(!p.is_active());
    }

    #[test]
    fn test_unlimited_only_dies_by_range() {
        let mut p = Projectile::new(0, spec(Pierce::Unlimited)).unwrap();
        for id in 0..1000 {
            assert_eq!(p.register_hit(id), HitOutcome::Continue);
        }
        assert!(p.is_active());

        let mut ticks = 0;
        while p.advance(0.1, 55.0) {
            ticks += 1;
        }
        assert_eq!(ticks, 5);
        assert_eq!(p.state(), ProjectileState::Destroyed(DestroyReason::OutOfRange));
    }

    #[test]
    fn test_reinitialize_clears_hit_set() {
        let mut p = Projectile::new(0, spec(Pierce::Limited(0))).unwrap();
        p.register_hit(42);
        assert!(!p.is_active());

        let mut s = spec(Pierce::Limited(1));
        s.origin = Vec2::new(5.0, 5.0);
        p.reinitialize(1, s).unwrap();
        assert_eq!(p.id, 1);
        assert!(p.is_active());
        assert!(!p.has_hit(42));
        assert_eq!(p.hit_count(), 0);
        assert_eq!(p.pierce(), Pierce::Limited(1));
        assert_eq!(p.pos, Vec2::new(5.0, 5.0));
        assert_eq!(p.traveled(), 0.0);
        assert_eq!(p.register_hit(42), HitOutcome::Continue);
    }

    #[test]
    fn test_reinitialize_error_leaves_state() {
        let mut p = Projectile::new(3, spec(Pierce::Limited(0))).unwrap();
        let mut bad = spec(Pierce::Limited(0));
        bad.damage = f32::NAN;
        assert!(p.reinitialize(4, bad).is_err());
        assert_eq!(p.id, 3);
        assert!(p.is_active());
    }

    #[test]
    fn test_pool_reuses_without_stale_hits() {
        let mut set = Projectiles::new();
        let a = set.spawn(spec(Pierce::Limited(0))).unwrap();
        for p in set.iter_mut() {
            p.register_hit(9);
        }
        assert_eq!(set.compact(), 1);
        assert_eq!(set.pooled(), 1);

        let b = set.spawn(spec(Pierce::Limited(0))).unwrap();
        assert_ne!(a, b);
        assert_eq!(set.pooled(), 0);
        let p = set.get(b).unwrap();
        assert!(!p.has_hit(9));
        assert!(p.is_active());
    }

    #[test]
    fn test_set_advance_reports_expired() {
        let mut set = Projectiles::new();
        let id = set.spawn(spec(Pierce::Unlimited)).unwrap();
        assert!(set.advance(0.1, 100.0).is_empty());
        let expired = set.advance(1.0, 100.0);
        assert_eq!(expired, vec![id]);
        assert_eq!(set.compact(), 1);
        assert!(set.is_empty());
    }

    proptest! {
        #[test]
        fn limited_pierce_damages_budget_plus_one(budget in 0u32..20, targets in 1u32..40) {
            let mut p = Projectile::new(0, spec(Pierce::Limited(budget))).unwrap();
            let mut damaged = 0;
            for id in 0..targets {
                if p.register_hit(id).deals_damage() {
                    damaged += 1;
                }
                // Re-hitting the same target never counts
                prop_assert!(!p.register_hit(id).deals_damage());
            }
            prop_assert_eq!(damaged, targets.min(budget + 1));
            prop_assert_eq!(p.is_active(), targets <= budget);
        }
    }
}
