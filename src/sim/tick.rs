//! Fixed timestep simulation tick
//!
//! Core loop that advances one run. The modifier snapshot is read once at
//! the top of the tick; level-ups earned during the tick are only queued.
//! Events accumulate in `GameState::events` until the host drains them.

use glam::Vec2;

use super::combat::{resolve_contact_damage, resolve_projectile_hits};
use super::player::PlayerHit;
use super::state::{GamePhase, GameState, SimEvent, drop_gem};
use crate::consts::*;
use crate::error::SimError;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    /// Raw movement direction (y up); not normalized
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i32 - neg as i32) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.down, self.up))
    }
}

/// Advance the game state by one fixed timestep. A NaN, infinite or
/// negative `dt` is rejected before anything changes.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Result<(), SimError> {
    if !dt.is_finite() || dt < 0.0 {
        return Err(SimError::NonFiniteValue {
            what: "dt",
            value: dt,
        });
    }
    if input.pause {
        match state.phase {
            GamePhase::Playing => state.phase = GamePhase::Paused,
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::GameOver => {}
        }
        return Ok(());
    }
    if state.phase != GamePhase::Playing {
        return Ok(());
    }

    state.time_ticks += 1;
    state.elapsed += dt;

    let mods = state.ledger.aggregate_modifiers();
    let tuning = &state.tuning;

    // Player
    state.player.apply_modifiers(&mods);
    state.player.tick(dt, &mods);
    state
        .player
        .move_by(input.direction(), dt, &mods, tuning.world_bounds);
    let player_pos = state.player.pos;

    // Spawning and enemy movement
    state.spawner.update(
        state.elapsed,
        dt,
        player_pos,
        &mut state.swarm,
        &mut state.rng,
        tuning,
    )?;
    let step = state.swarm.update(player_pos, dt, &mut state.rng, tuning);
    state.events.extend(
        step.teleported
            .into_iter()
            .map(|id| SimEvent::EnemyTeleported { id }),
    );

    // Weapon and projectiles
    state.weapon.update(
        dt,
        player_pos,
        &state.swarm,
        &mut state.projectiles,
        &state.ledger,
        &mods,
        &mut state.rng,
        tuning,
    )?;
    for id in state.projectiles.advance(dt, tuning.projectile_max_travel) {
        state.events.push(SimEvent::ProjectileExpired { id });
    }

    // Hits and gem drops
    let report = resolve_projectile_hits(
        &mut state.projectiles,
        &mut state.swarm,
        &mods,
        tuning,
    );
    for kill in report.kills {
        state.events.push(SimEvent::EnemyKilled {
            id: kill.enemy,
            kind: kill.kind,
            pos: kill.pos,
        });
        let profile = kill.kind.profile();
        if state.rng.chance(profile.drop_chance) {
            drop_gem(&mut state.gems, tuning, kill.pos, profile.xp);
        }
    }

    // Contact damage
    let contact = resolve_contact_damage(&mut state.player, &state.swarm, &mods, tuning);
    if let Some((by, hit)) = contact {
        match hit {
            PlayerHit::Damaged(amount) => {
                state.events.push(SimEvent::PlayerDamaged { by, amount });
            }
            PlayerHit::Killed(amount) => {
                state.events.push(SimEvent::PlayerDamaged { by, amount });
                state.events.push(SimEvent::PlayerDied);
                state.phase = GamePhase::GameOver;
                log::info!(
                    "game over at t={:.1}s (level {}, killed by enemy {})",
                    state.elapsed,
                    state.player.level,
                    by
                );
            }
            PlayerHit::Ignored => {}
        }
    }

    // Gem pickup
    if state.phase == GamePhase::Playing {
        let radius = state.player.pickup_radius(&mods);
        let mut collected = 0;
        let events = &mut state.events;
        state.gems.retain(|gem| {
            if gem.pos.distance_squared(player_pos) <= radius * radius {
                collected += gem.xp;
                events.push(SimEvent::GemCollected { xp: gem.xp });
                false
            } else {
                true
            }
        });
        if collected > 0 {
            let gained = state.player.gain_xp(collected, tuning);
            let first = state.player.level - gained;
            for level in first + 1..=state.player.level {
                state.events.push(SimEvent::LevelUp { level });
                log::debug!("player reached level {level}");
            }
            state.pending_level_ups += gained;
        }
    }

    // Deferred removal
    let removed = state.swarm.compact();
    let culled = state.projectiles.compact();
    if removed > 0 || culled > 0 {
        log::trace!("compacted {removed} enemies, {culled} projectiles");
    }
    Ok(())
}

/// Accumulates frame time and runs whole fixed steps
#[derive(Debug, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run as many `SIM_DT` ticks as the accumulated time allows (at most
    /// `MAX_SUBSTEPS`). One-shot inputs are cleared after the first tick.
    /// Events from every substep stay in `state.events`. A non-finite or
    /// negative `frame_dt` counts as zero. Returns the number of ticks run.
    pub fn advance(
        &mut self,
        state: &mut GameState,
        input: &mut TickInput,
        frame_dt: f32,
    ) -> Result<u32, SimError> {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt.min(0.1);
        } else if !frame_dt.is_finite() {
            log::warn!("ignoring non-finite frame time {frame_dt}");
        }

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(state, input, SIM_DT)?;
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.pause = false;
        }
        Ok(substeps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::UpgradeKind;
    use crate::sim::enemy::{AiBehavior, EnemyKind};
    use crate::sim::state::Gem;
    use crate::tuning::Tuning;

    fn new_state(seed: u64) -> GameState {
        GameState::new(seed, Tuning::default()).unwrap()
    }

    #[test]
    fn test_input_direction() {
        let input = TickInput {
            up: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(input.direction(), Vec2::new(1.0, 1.0));
        let both = TickInput {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(both.direction(), Vec2::ZERO);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = new_state(12345);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };

        tick(&mut state, &pause, SIM_DT).unwrap();
        assert_eq!(state.phase, GamePhase::Paused);

        tick(&mut state, &TickInput::default(), SIM_DT).unwrap();
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.elapsed, 0.0);

        tick(&mut state, &pause, SIM_DT).unwrap();
        assert_eq!(state.phase, GamePhase::Playing);
        tick(&mut state, &TickInput::default(), SIM_DT).unwrap();
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = new_state(99999);
        let mut state2 = new_state(99999);

        let inputs = [
            TickInput {
                up: true,
                ..Default::default()
            },
            TickInput {
                left: true,
                down: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for i in 0..900 {
            let input = &inputs[(i / 60) % inputs.len()];
            tick(&mut state1, input, SIM_DT).unwrap();
            tick(&mut state2, input, SIM_DT).unwrap();
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.player.pos, state2.player.pos);
        assert_eq!(state1.player.health(), state2.player.health());
        assert_eq!(state1.swarm.len(), state2.swarm.len());
        for (a, b) in state1.swarm.iter().zip(state2.swarm.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.pos, b.pos);
            assert_eq!(a.health(), b.health());
        }
        assert_eq!(state1.gems, state2.gems);
    }

    #[test]
    fn test_level_up_queued_not_applied() {
        let mut state = new_state(7);
        state.gems.push(Gem {
            pos: Vec2::new(5.0, 0.0),
            xp: 20,
        });
        let before = state.ledger.aggregate_modifiers();

        tick(&mut state, &TickInput::default(), SIM_DT).unwrap();

        assert!(state.gems.is_empty());
        assert!(state.pending_level_ups >= 1);
        assert!(state.events.contains(&SimEvent::GemCollected { xp: 20 }));
        assert!(state.events.contains(&SimEvent::LevelUp { level: 2 }));
        assert_eq!(state.ledger.aggregate_modifiers(), before);

        assert!(state.apply_upgrade(UpgradeKind::PowerGem));
        assert_ne!(state.ledger.aggregate_modifiers(), before);
    }

    #[test]
    fn test_game_over_on_lethal_contact() {
        let tuning = Tuning {
            player_base_health: 1.0,
            ..Tuning::default()
        };
        let mut state = GameState::new(3, tuning).unwrap();
        let mut rng = state.rng.clone();
        state
            .swarm
            .spawn(
                EnemyKind::Brute,
                Vec2::new(10.0, 0.0),
                AiBehavior::Chase,
                &mut rng,
                &state.tuning,
            )
            .unwrap();

        tick(&mut state, &TickInput::default(), SIM_DT).unwrap();
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.events.contains(&SimEvent::PlayerDied));

        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default(), SIM_DT).unwrap();
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_weapon_kills_and_drops_gem() {
        let mut state = new_state(11);
        let mut rng = state.rng.clone();
        let id = state
            .swarm
            .spawn(
                EnemyKind::Brute,
                Vec2::new(150.0, 0.0),
                AiBehavior::Chase,
                &mut rng,
                &state.tuning,
            )
            .unwrap();
        state.swarm.get_mut(id).unwrap().set_max_health(1.0).unwrap();

        let mut killed = false;
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), SIM_DT).unwrap();
            killed |= state
                .events
                .iter()
                .any(|e| matches!(e, SimEvent::EnemyKilled { id: k, .. } if *k == id));
            if killed {
                break;
            }
        }
        assert!(killed);
        // Brutes always drop
        assert_eq!(state.gems.len(), 1);
        assert_eq!(state.gems[0].xp, EnemyKind::Brute.profile().xp);
    }

    #[test]
    fn test_fixed_step_substeps() {
        let mut state = new_state(1);
        let mut stepper = FixedStep::new();
        let mut input = TickInput::default();

        assert_eq!(stepper.advance(&mut state, &mut input, 0.04).unwrap(), 2);
        assert_eq!(state.time_ticks, 2);

        // Frame time is capped
        let steps = stepper.advance(&mut state, &mut input, 5.0).unwrap();
        assert!(steps <= MAX_SUBSTEPS);
        assert!(steps >= 6);
    }

    #[test]
    fn test_fixed_step_pause_consumed_once() {
        let mut state = new_state(1);
        let mut stepper = FixedStep::new();
        let mut input = TickInput {
            pause: true,
            ..Default::default()
        };
        stepper.advance(&mut state, &mut input, 0.05).unwrap();
        assert!(!input.pause);
        assert_eq!(state.phase, GamePhase::Paused);
    }

    #[test]
    fn test_events_kept_across_substeps() {
        let mut state = new_state(1);
        state.gems.push(Gem {
            pos: Vec2::new(5.0, 0.0),
            xp: 1,
        });
        let mut stepper = FixedStep::new();
        let mut input = TickInput::default();

        // The gem is collected on the first of two substeps
        assert_eq!(stepper.advance(&mut state, &mut input, 0.04).unwrap(), 2);
        let events = state.drain_events();
        assert!(events.contains(&SimEvent::GemCollected { xp: 1 }));
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_paused_ticks_add_no_events() {
        let mut state = new_state(1);
        state.gems.push(Gem {
            pos: Vec2::new(5.0, 0.0),
            xp: 1,
        });
        tick(&mut state, &TickInput::default(), SIM_DT).unwrap();
        assert!(!state.drain_events().is_empty());

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT).unwrap();
        tick(&mut state, &TickInput::default(), SIM_DT).unwrap();
        assert_eq!(state.phase, GamePhase::Paused);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_evolution_event_survives_next_tick() {
        let mut state = new_state(1);
        state.pending_level_ups = 100;
        while state.apply_upgrade(UpgradeKind::Weapon) {}
        while state.apply_upgrade(UpgradeKind::PowerGem) {}
        assert!(state.weapon.is_evolved());

        tick(&mut state, &TickInput::default(), SIM_DT).unwrap();
        assert!(state.drain_events().contains(&SimEvent::WeaponEvolved));
    }

    #[test]
    fn test_bad_dt_rejected() {
        let mut state = new_state(1);
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        for dt in [f32::NAN, f32::INFINITY, -SIM_DT] {
            assert!(matches!(
                tick(&mut state, &input, dt),
                Err(SimError::NonFiniteValue { what: "dt", .. })
            ));
        }
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.player.pos, Vec2::ZERO);
    }

    #[test]
    fn test_fixed_step_ignores_bad_frame_time() {
        let mut state = new_state(1);
        let mut stepper = FixedStep::new();
        let mut input = TickInput::default();

        assert_eq!(stepper.advance(&mut state, &mut input, f32::NAN).unwrap(), 0);
        assert_eq!(stepper.advance(&mut state, &mut input, -1.0).unwrap(), 0);
        assert_eq!(state.time_ticks, 0);

        // The accumulator is not poisoned
        assert_eq!(stepper.advance(&mut state, &mut input, 0.06).unwrap(), 3);
        assert_eq!(state.time_ticks, 3);
    }
}
