//! The hostile collection: per-enemy updates, the separation pass, and
//! mark-and-compact removal into a reuse pool

use glam::Vec2;

use super::enemy::{AiBehavior, Enemy, EnemyId, EnemyKind, EnemyStep};
use super::grid::SpatialGrid;
use super::rng::SimRng;
use crate::error::SimError;
use crate::tuning::Tuning;

/// Summary of one swarm update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwarmStep {
    pub teleported: Vec<EnemyId>,
    pub active: usize,
    pub sleeping: usize,
}

#[derive(Debug, Default)]
pub struct Swarm {
    enemies: Vec<Enemy>,
    pool: Vec<Enemy>,
    next_id: EnemyId,
    grid: SpatialGrid,
    /// Position snapshot read by the separation pass
    snapshot: Vec<Vec2>,
    pushes: Vec<Vec2>,
}

impl Swarm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an enemy, reusing a pooled instance when one is available
    pub fn spawn(
        &mut self,
        kind: EnemyKind,
        pos: Vec2,
        behavior: AiBehavior,
        rng: &mut SimRng,
        tuning: &Tuning,
    ) -> Result<EnemyId, SimError> {
        let id = self.next_id;
        let enemy = match self.pool.pop() {
            Some(mut recycled) => {
                if let Err(err) = recycled.reinitialize(id, kind, pos, behavior, rng, tuning) {
                    self.pool.push(recycled);
                    return Err(err);
                }
                recycled
            }
            None => Enemy::spawn(id, kind, pos, behavior, rng, tuning)?,
        };
        self.next_id = self.next_id.wrapping_add(1);
        self.enemies.push(enemy);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    /// Enemies that are still alive (not dying)
    pub fn alive_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.enemies.iter_mut()
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    /// Nearest alive, active enemy within `max_range` of `from`
    pub fn nearest_targetable(&self, from: Vec2, max_range: f32) -> Option<&Enemy> {
        self.enemies
            .iter()
            .filter(|e| e.is_targetable())
            .map(|e| (e, e.pos.distance_squared(from)))
            .filter(|(_, d2)| *d2 <= max_range * max_range)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(e, _)| e)
    }

    /// Advance every enemy, then run separation. All enemies see the same
    /// player position.
    pub fn update(
        &mut self,
        player: Vec2,
        dt: f32,
        rng: &mut SimRng,
        tuning: &Tuning,
    ) -> SwarmStep {
        let mut step = SwarmStep::default();
        for enemy in &mut self.enemies {
            match enemy.update(player, dt, rng, tuning) {
                EnemyStep::Moved => step.active += 1,
                EnemyStep::Teleported => {
                    step.active += 1;
                    step.teleported.push(enemy.id);
                }
                EnemyStep::Sleeping => step.sleeping += 1,
                EnemyStep::Dying | EnemyStep::Finished => {}
            }
        }
        self.separate(dt, tuning);
        step
    }

    /// Push overlapping active enemies apart.
    ///
    /// Reads positions from a snapshot and applies the summed pushes after
    /// the pass. Per pair each member moves
    /// `min(overlap / 2, (strength * overlap / radius + min_push) * dt)`,
    /// which is zero at or beyond the radius and never overshoots it.
    pub fn separate(&mut self, dt: f32, tuning: &Tuning) {
        let radius = tuning.separation_radius;
        if radius <= 0.0 || self.enemies.len() < 2 {
            return;
        }

        self.snapshot.clear();
        self.snapshot.extend(self.enemies.iter().map(|e| e.pos));
        self.pushes.clear();
        self.pushes.resize(self.enemies.len(), Vec2::ZERO);

        let eligible = |e: &Enemy| e.is_targetable();
        self.grid.rebuild(
            radius,
            self.enemies
                .iter()
                .enumerate()
                .filter(|(_, e)| eligible(e))
                .map(|(i, e)| (i, e.pos)),
        );

        for i in 0..self.enemies.len() {
            if !eligible(&self.enemies[i]) {
                continue;
            }
            let pos_i = self.snapshot[i];
            for j in self.grid.neighbors(pos_i) {
                if j <= i {
                    continue;
                }
                let delta = pos_i - self.snapshot[j];
                let dist = delta.length();
                if dist >= radius {
                    continue;
                }
                let overlap = radius - dist;
                let dir = if dist > 1e-4 {
                    delta / dist
                } else {
                    crate::consts::FALLBACK_AXIS
                };
                let strength = (tuning.separation_strength * overlap / radius
                    + tuning.separation_min_push)
                    * dt;
                let step = (overlap * 0.5).min(strength);
                self.pushes[i] += dir * step;
                self.pushes[j] -= dir * step;
            }
        }

        for (enemy, push) in self.enemies.iter_mut().zip(&self.pushes) {
            enemy.pos += *push;
        }
    }

    /// Move every removable enemy into the pool; returns how many were removed
    pub fn compact(&mut self) -> usize {
        let before = self.enemies.len();
        let mut i = 0;
        while i < self.enemies.len() {
            if self.enemies[i].should_remove() {
                let dead = self.enemies.swap_remove(i);
                self.pool.push(dead);
            } else {
                i += 1;
            }
        }
        before - self.enemies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn setup() -> (Swarm, SimRng, Tuning) {
        (Swarm::new(), SimRng::new(777), Tuning::default())
    }

    fn bat(swarm: &mut Swarm, pos: Vec2, rng: &mut SimRng, tuning: &Tuning) -> EnemyId {
        swarm
            .spawn(EnemyKind::Bat, pos, AiBehavior::Chase, rng, tuning)
            .unwrap()
    }

    #[test]
    fn test_spawn_assigns_unique_ids() {
        let (mut swarm, mut rng, tuning) = setup();
        let a = bat(&mut swarm, Vec2::ZERO, &mut rng, &tuning);
        let b = bat(&mut swarm, Vec2::ZERO, &mut rng, &tuning);
        assert_ne!(a, b);
        assert_eq!(swarm.len(), 2);
    }

    #[test]
    fn test_spawn_rejects_nan_and_keeps_pool() {
        let (mut swarm, mut rng, tuning) = setup();
        let nan = Vec2::new(f32::NAN, 1.0);
        assert!(swarm.spawn(EnemyKind::Bat, nan, AiBehavior::Chase, &mut rng, &tuning).is_err());
        assert!(swarm.is_empty());
    }

    #[test]
    fn test_separation_converges_without_oscillation() {
        let (mut swarm, mut rng, tuning) = setup();
        let a = swarm
            .spawn(EnemyKind::Skeleton, Vec2::new(0.0, 0.0), AiBehavior::Chase, &mut rng, &tuning)
            .unwrap();
        let b = swarm
            .spawn(EnemyKind::Skeleton, Vec2::new(5.0, 3.0), AiBehavior::Chase, &mut rng, &tuning)
            .unwrap();

        let dist = |s: &Swarm| s.get(a).unwrap().pos.distance(s.get(b).unwrap().pos);
        let mut last = dist(&swarm);
        assert!(last < tuning.separation_radius);

        for _ in 0..600 {
            swarm.separate(SIM_DT, &tuning);
            let now = dist(&swarm);
            assert!(now >= last - 1e-4, "distance shrank: {last} -> {now}");
            assert!(now <= tuning.separation_radius + 1e-3, "overshot: {now}");
            last = now;
        }
        assert!(last >= tuning.separation_radius - 1e-3);
    }

    #[test]
    fn test_separation_handles_coincident_entities() {
        let (mut swarm, mut rng, tuning) = setup();
        for _ in 0..2 {
            bat(&mut swarm, Vec2::new(10.0, 10.0), &mut rng, &tuning);
        }
        swarm.separate(SIM_DT, &tuning);
        let positions: Vec<Vec2> = swarm.iter().map(|e| e.pos).collect();
        assert!(positions.iter().all(|p| crate::is_finite_vec(*p)));
        assert!(positions[0].distance(positions[1]) > 0.0);
    }

    #[test]
    fn test_separation_ignores_far_and_dying() {
        let (mut swarm, mut rng, tuning) = setup();
        let a = bat(&mut swarm, Vec2::ZERO, &mut rng, &tuning);
        let far = Vec2::new(tuning.separation_radius + 1.0, 0.0);
        let b = bat(&mut swarm, far, &mut rng, &tuning);
        let c = bat(&mut swarm, Vec2::new(1.0, 0.0), &mut rng, &tuning);
        swarm.get_mut(c).unwrap().take_damage(1e6, &tuning);

        swarm.separate(SIM_DT, &tuning);
        assert_eq!(swarm.get(a).unwrap().pos, Vec2::ZERO);
        assert_eq!(swarm.get(b).unwrap().pos, far);
        assert_eq!(swarm.get(c).unwrap().pos, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_update_reports_tiers_and_teleports() {
        let (mut swarm, mut rng, tuning) = setup();
        bat(&mut swarm, Vec2::new(100.0, 0.0), &mut rng, &tuning);
        bat(&mut swarm, Vec2::new(tuning.active_radius + 50.0, 0.0), &mut rng, &tuning);
        let far = bat(&mut swarm, Vec2::new(tuning.teleport_radius + 50.0, 0.0), &mut rng, &tuning);

        let step = swarm.update(Vec2::ZERO, SIM_DT, &mut rng, &tuning);
        assert_eq!(step.active, 2);
        assert_eq!(step.sleeping, 1);
        assert_eq!(step.teleported, vec![far]);
    }

    #[test]
    fn test_compact_waits_for_death_animation() {
        let (mut swarm, mut rng, tuning) = setup();
        let id = bat(&mut swarm, Vec2::new(100.0, 0.0), &mut rng, &tuning);
        swarm.get_mut(id).unwrap().take_damage(1e6, &tuning);

        swarm.update(Vec2::ZERO, SIM_DT, &mut rng, &tuning);
        assert_eq!(swarm.compact(), 0);
        assert_eq!(swarm.len(), 1);

        let mut elapsed = SIM_DT;
        while elapsed <= tuning.death_duration + SIM_DT {
            swarm.update(Vec2::ZERO, SIM_DT, &mut rng, &tuning);
            elapsed += SIM_DT;
        }
        assert_eq!(swarm.compact(), 1);
        assert!(swarm.is_empty());
        assert_eq!(swarm.pooled(), 1);
    }

    #[test]
    fn test_pooled_enemy_is_fully_reset() {
        let (mut swarm, mut rng, tuning) = setup();
        let id = swarm
            .spawn(
                EnemyKind::Brute,
                Vec2::new(100.0, 0.0),
                AiBehavior::FlankLeft,
                &mut rng,
                &tuning,
            )
            .unwrap();
        {
            let e = swarm.get_mut(id).unwrap();
            e.apply_knockback(Vec2::new(50.0, 0.0));
            e.take_damage(1e6, &tuning);
        }
        for _ in 0..120 {
            swarm.update(Vec2::ZERO, SIM_DT, &mut rng, &tuning);
        }
        swarm.compact();

        let new_id = bat(&mut swarm, Vec2::new(-20.0, 0.0), &mut rng, &tuning);
        assert_eq!(swarm.pooled(), 0);
        let e = swarm.get(new_id).unwrap();
        assert_ne!(new_id, id);
        assert!(e.is_alive());
        assert_eq!(e.kind, EnemyKind::Bat);
        assert_eq!(e.behavior, AiBehavior::Chase);
        assert_eq!(e.health(), e.max_health());
        assert_eq!(e.knockback, Vec2::ZERO);
        assert_eq!(e.death_timer(), 0.0);
    }

    #[test]
    fn test_nearest_targetable() {
        let (mut swarm, mut rng, tuning) = setup();
        let near = bat(&mut swarm, Vec2::new(50.0, 0.0), &mut rng, &tuning);
        bat(&mut swarm, Vec2::new(80.0, 0.0), &mut rng, &tuning);
        assert_eq!(swarm.nearest_targetable(Vec2::ZERO, 100.0).map(|e| e.id), Some(near));
        assert!(swarm.nearest_targetable(Vec2::ZERO, 10.0).is_none());

        swarm.get_mut(near).unwrap().take_damage(1e6, &tuning);
        assert_ne!(swarm.nearest_targetable(Vec2::ZERO, 100.0).map(|e| e.id), Some(near));
    }
}
