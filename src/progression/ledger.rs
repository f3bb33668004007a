//! Per-owner upgrade levels and the aggregate modifier snapshot derived from them

use serde::{Deserialize, Serialize};

use super::formula::{StatCategory, UpgradeGroup, UpgradeKind};
use crate::sim::rng::SimRng;

/// A level bounded by its kind's maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeLevel {
    pub kind: UpgradeKind,
    level: u32,
}

impl UpgradeLevel {
    pub fn new(kind: UpgradeKind, level: u32) -> Self {
        Self {
            kind,
            level: level.min(kind.max_level()),
        }
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_maxed(&self) -> bool {
        self.level >= self.kind.max_level()
    }

    /// Increment unless already at max; returns whether the level changed
    pub fn increment(&mut self) -> bool {
        if self.is_maxed() {
            return false;
        }
        self.level += 1;
        true
    }

    pub fn effect(&self) -> f32 {
        super::formula::effect(self.kind, self.level)
    }
}

/// Combined effect of every owned upgrade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateModifiers {
    pub damage: f32,
    pub fire_rate: f32,
    /// Fractional bonus added to the base pickup radius (0.2 = +20%)
    pub pickup_range: f32,
    pub move_speed: f32,
    /// Factor applied to incoming damage (below 1 = reduction)
    pub incoming_damage: f32,
    pub max_health: f32,
    /// Flat health regenerated per second
    pub regen: f32,
    /// Probability of a critical hit
    pub crit_chance: f32,
}

impl Default for AggregateModifiers {
    fn default() -> Self {
        Self {
            damage: 1.0,
            fire_rate: 1.0,
            pickup_range: 0.0,
            move_speed: 1.0,
            incoming_damage: 1.0,
            max_health: 1.0,
            regen: 0.0,
            crit_chance: 0.0,
        }
    }
}

impl AggregateModifiers {
    /// Fold one upgrade's effect into its bucket
    fn fold(&mut self, kind: UpgradeKind, value: f32) {
        match kind.category() {
            StatCategory::WeaponPower => {}
            StatCategory::Damage => self.damage *= value,
            StatCategory::FireRate => self.fire_rate *= value,
            StatCategory::PickupRange => self.pickup_range += value,
            StatCategory::MoveSpeed => self.move_speed *= value,
            StatCategory::IncomingDamage => self.incoming_damage *= value,
            StatCategory::MaxHealth => self.max_health *= value,
            StatCategory::Regen => self.regen += value,
            StatCategory::CritChance => self.crit_chance += value,
        }
    }
}

/// Upgrades owned by one player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionLedger {
    levels: [UpgradeLevel; UpgradeKind::COUNT],
    /// Cached fold of `levels`, rebuilt on every successful level-up
    modifiers: AggregateModifiers,
}

impl Default for ProgressionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressionLedger {
    /// Fresh ledger: weapon at level 1, everything else unowned
    pub fn new() -> Self {
        let levels = UpgradeKind::ALL.map(|kind| {
            let start = if kind == UpgradeKind::Weapon { 1 } else { 0 };
            UpgradeLevel::new(kind, start)
        });
        let mut ledger = Self {
            levels,
            modifiers: AggregateModifiers::default(),
        };
        ledger.recompute();
        ledger
    }

    #[inline]
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        self.levels[kind.index()].level()
    }

    pub fn is_maxed(&self, kind: UpgradeKind) -> bool {
        self.levels[kind.index()].is_maxed()
    }

    pub fn owns(&self, kind: UpgradeKind) -> bool {
        self.level(kind) > 0
    }

    /// Level `kind` up by one. Returns false, leaving state untouched, when
    /// the kind is already at its maximum.
    pub fn level_up(&mut self, kind: UpgradeKind) -> bool {
        if !self.levels[kind.index()].increment() {
            return false;
        }
        self.recompute();
        log::debug!(
            "{} -> level {}/{}",
            kind.as_str(),
            self.level(kind),
            kind.max_level()
        );
        true
    }

    /// Snapshot of the combined modifiers
    #[inline]
    pub fn aggregate_modifiers(&self) -> AggregateModifiers {
        self.modifiers
    }

    /// Effect of a single owned kind at its current level
    pub fn effect(&self, kind: UpgradeKind) -> f32 {
        self.levels[kind.index()].effect()
    }

    /// Weapon maxed and every owned passive item maxed (at least one owned)
    pub fn evolution_ready(&self) -> bool {
        if !self.is_maxed(UpgradeKind::Weapon) {
            return false;
        }
        let mut owned = self.levels.iter().filter(|l| l.kind.is_passive() && l.level() > 0);
        let mut any = false;
        let all_maxed = owned.all(|l| {
            any = true;
            l.is_maxed()
        });
        any && all_maxed
    }

    /// Up to `count` distinct kinds that can still be leveled, in random order
    pub fn upgrade_choices(&self, rng: &mut SimRng, count: usize) -> Vec<UpgradeKind> {
        let mut pool: Vec<UpgradeKind> = UpgradeKind::ALL
            .iter()
            .copied()
            .filter(|&k| !self.is_maxed(k))
            .collect();
        let mut picks = Vec::with_capacity(count.min(pool.len()));
        while picks.len() < count && !pool.is_empty() {
            let i = rng.random_index(pool.len());
            picks.push(pool.swap_remove(i));
        }
        picks
    }

    /// All kinds in a group with their levels
    pub fn levels_in(&self, group: UpgradeGroup) -> impl Iterator<Item = &UpgradeLevel> {
        self.levels.iter().filter(move |l| l.kind.group() == group)
    }

    fn recompute(&mut self) {
        let mut mods = AggregateModifiers::default();
        for level in &self.levels {
            mods.fold(level.kind, level.effect());
        }
        self.modifiers = mods;
    }
}
