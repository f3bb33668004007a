//! Game state and run-level types
//!
//! Everything one session owns lives in [`GameState`]; [`tick`](super::tick)
//! is the only thing that advances it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{EnemyId, EnemyKind};
use super::player::Player;
use super::projectile::{Projectiles, ProjectileId};
use super::rng::SimRng;
use super::spawner::Spawner;
use super::swarm::Swarm;
use super::weapon::Weapon;
use crate::error::SimError;
use crate::progression::{ProgressionLedger, UpgradeKind};
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Player died
    GameOver,
}

/// Things that happened in the simulation (for audio, UI, logs)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    EnemyKilled {
        id: EnemyId,
        kind: EnemyKind,
        pos: Vec2,
    },
    PlayerDamaged {
        by: EnemyId,
        amount: f32,
    },
    PlayerDied,
    GemCollected {
        xp: u32,
    },
    LevelUp {
        level: u32,
    },
    ProjectileExpired {
        id: ProjectileId,
    },
    EnemyTeleported {
        id: EnemyId,
    },
    WeaponEvolved,
}

/// Experience gem dropped by a dead enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gem {
    pub pos: Vec2,
    pub xp: u32,
}

/// Add `xp` at `pos`, merging into the nearest gem when it is within
/// `gem_merge_radius` or the floor already holds `max_gems`
pub(crate) fn drop_gem(gems: &mut Vec<Gem>, tuning: &Tuning, pos: Vec2, xp: u32) {
    let full = gems.len() >= tuning.max_gems;
    let merge_r2 = tuning.gem_merge_radius * tuning.gem_merge_radius;
    let nearest = gems
        .iter()
        .enumerate()
        .map(|(i, g)| (i, g.pos.distance_squared(pos)))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    match nearest {
        Some((i, d2)) if full || d2 <= merge_r2 => gems[i].xp += xp,
        _ => gems.push(Gem { pos, xp }),
    }
}

/// Complete state of one run
#[derive(Debug)]
pub struct GameState {
    pub tuning: Tuning,
    pub rng: SimRng,
    pub phase: GamePhase,
    /// Seconds of unpaused simulation
    pub elapsed: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    pub ledger: ProgressionLedger,
    pub weapon: Weapon,
    pub swarm: Swarm,
    pub projectiles: Projectiles,
    pub spawner: Spawner,
    pub gems: Vec<Gem>,
    /// Level-ups earned but not yet spent on an upgrade
    pub pending_level_ups: u32,
    /// Events since the host last called [`GameState::drain_events`]
    pub events: Vec<SimEvent>,
}

impl GameState {
    /// Create a new run with the given seed. The tuning is validated first.
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self, SimError> {
        tuning.validate()?;
        let player = Player::new(Vec2::ZERO, &tuning)?;
        log::info!("new run: seed={seed}");
        Ok(Self {
            tuning,
            rng: SimRng::new(seed),
            phase: GamePhase::Playing,
            elapsed: 0.0,
            time_ticks: 0,
            player,
            ledger: ProgressionLedger::new(),
            weapon: Weapon::new(),
            swarm: Swarm::new(),
            projectiles: Projectiles::new(),
            spawner: Spawner::new(),
            gems: Vec::new(),
            pending_level_ups: 0,
            events: Vec::new(),
        })
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Take every event recorded since the last call. Hosts call this once
    /// per frame, after any substeps and upgrade picks.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop an experience gem. A drop near an existing gem, or any drop once
    /// `max_gems` are on the floor, merges into the nearest gem instead.
    pub fn drop_gem(&mut self, pos: Vec2, xp: u32) {
        drop_gem(&mut self.gems, &self.tuning, pos, xp);
    }

    /// Spend a pending level-up on `kind`. Called between ticks so the
    /// modifier snapshot never changes mid-tick. Returns false when nothing
    /// is pending or the kind is already maxed.
    pub fn apply_upgrade(&mut self, kind: UpgradeKind) -> bool {
        if self.pending_level_ups == 0 || !self.ledger.level_up(kind) {
            return false;
        }
        self.pending_level_ups -= 1;
        let mods = self.ledger.aggregate_modifiers();
        self.player.apply_modifiers(&mods);
        self.try_evolve_weapon();
        true
    }

    /// Evolve the weapon if the ledger allows it
    pub fn try_evolve_weapon(&mut self) -> bool {
        if self.weapon.try_evolve(&self.ledger) {
            log::info!("weapon evolved at t={:.1}s", self.elapsed);
            self.events.push(SimEvent::WeaponEvolved);
            return true;
        }
        false
    }

    /// Offer up to `count` upgrade kinds for the next pick
    pub fn upgrade_choices(&mut self, count: usize) -> Vec<UpgradeKind> {
        self.ledger.upgrade_choices(&mut self.rng, count)
    }
}
