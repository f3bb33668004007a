//! Stat composition engine
//!
//! Maps `(kind, level)` to a numeric effect. Each upgrade kind has a small
//! formula record in [`FORMULAS`]; evaluation is a pure table lookup plus one
//! of three shapes:
//! - multiplicative: `1 + level * rate`
//! - reduction:      `1 - level * rate` (not clamped, can go below zero)
//! - additive:       `level * rate`

use serde::{Deserialize, Serialize};

/// Every improvable stat or item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// The player's weapon
    Weapon,
    // Passive items
    PowerGem,
    Hourglass,
    Magnet,
    Wings,
    Armor,
    HollowHeart,
    Pummarola,
    Clover,
    // Generic stats
    Speed,
    Might,
    Vitality,
    Recovery,
    Reach,
}

/// Which family an upgrade belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeGroup {
    Weapon,
    Passive,
    Stat,
}

/// Aggregate bucket an effect is folded into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatCategory {
    /// Read by the weapon directly, not part of the aggregate snapshot
    WeaponPower,
    Damage,
    FireRate,
    PickupRange,
    MoveSpeed,
    IncomingDamage,
    MaxHealth,
    Regen,
    CritChance,
}

/// How level maps to effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Multiplicative,
    Reduction,
    Additive,
}

/// Formula record for one upgrade kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Formula {
    pub group: UpgradeGroup,
    pub category: StatCategory,
    pub shape: Shape,
    pub rate: f32,
    pub max_level: u32,
}

impl Formula {
    const fn new(
        group: UpgradeGroup,
        category: StatCategory,
        shape: Shape,
        rate: f32,
        max_level: u32,
    ) -> Self {
        Self {
            group,
            category,
            shape,
            rate,
            max_level,
        }
    }

    /// Evaluate at `level` (clamped to `max_level`)
    pub fn apply(&self, level: u32) -> f32 {
        let level = level.min(self.max_level) as f32;
        match self.shape {
            Shape::Multiplicative => 1.0 + level * self.rate,
            Shape::Reduction => 1.0 - level * self.rate,
            Shape::Additive => level * self.rate,
        }
    }

    /// Effect at level 0, the neutral element for folding
    pub fn identity(&self) -> f32 {
        match self.shape {
            Shape::Multiplicative | Shape::Reduction => 1.0,
            Shape::Additive => 0.0,
        }
    }
}

use Shape::*;
use StatCategory as C;
use UpgradeGroup as G;

/// Formula table indexed by `UpgradeKind as usize`
pub const FORMULAS: [Formula; UpgradeKind::COUNT] = [
    Formula::new(G::Weapon, C::WeaponPower, Multiplicative, 0.25, 8),
    Formula::new(G::Passive, C::Damage, Multiplicative, 0.10, 5),
    Formula::new(G::Passive, C::FireRate, Multiplicative, 0.08, 5),
    Formula::new(G::Passive, C::PickupRange, Additive, 0.20, 5),
    Formula::new(G::Passive, C::MoveSpeed, Multiplicative, 0.10, 5),
    Formula::new(G::Passive, C::IncomingDamage, Reduction, 0.05, 5),
    Formula::new(G::Passive, C::MaxHealth, Multiplicative, 0.20, 5),
    Formula::new(G::Passive, C::Regen, Additive, 0.20, 5),
    Formula::new(G::Passive, C::CritChance, Additive, 0.05, 5),
    Formula::new(G::Stat, C::MoveSpeed, Multiplicative, 0.05, 10),
    Formula::new(G::Stat, C::Damage, Multiplicative, 0.10, 10),
    Formula::new(G::Stat, C::MaxHealth, Multiplicative, 0.10, 10),
    Formula::new(G::Stat, C::Regen, Additive, 0.50, 10),
    Formula::new(G::Stat, C::PickupRange, Additive, 0.10, 10),
];

impl UpgradeKind {
    pub const COUNT: usize = 14;

    pub const ALL: [UpgradeKind; Self::COUNT] = [
        UpgradeKind::Weapon,
        UpgradeKind::PowerGem,
        UpgradeKind::Hourglass,
        UpgradeKind::Magnet,
        UpgradeKind::Wings,
        UpgradeKind::Armor,
        UpgradeKind::HollowHeart,
        UpgradeKind::Pummarola,
        UpgradeKind::Clover,
        UpgradeKind::Speed,
        UpgradeKind::Might,
        UpgradeKind::Vitality,
        UpgradeKind::Recovery,
        UpgradeKind::Reach,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn formula(self) -> &'static Formula {
        &FORMULAS[self.index()]
    }

    pub fn max_level(self) -> u32 {
        self.formula().max_level
    }

    pub fn group(self) -> UpgradeGroup {
        self.formula().group
    }

    pub fn category(self) -> StatCategory {
        self.formula().category
    }

    pub fn is_passive(self) -> bool {
        self.group() == UpgradeGroup::Passive
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::Weapon => "Weapon",
            UpgradeKind::PowerGem => "Power Gem",
            UpgradeKind::Hourglass => "Hourglass",
            UpgradeKind::Magnet => "Magnet",
            UpgradeKind::Wings => "Wings",
            UpgradeKind::Armor => "Armor",
            UpgradeKind::HollowHeart => "Hollow Heart",
            UpgradeKind::Pummarola => "Pummarola",
            UpgradeKind::Clover => "Clover",
            UpgradeKind::Speed => "Speed",
            UpgradeKind::Might => "Might",
            UpgradeKind::Vitality => "Vitality",
            UpgradeKind::Recovery => "Recovery",
            UpgradeKind::Reach => "Reach",
        }
    }
}

/// Numeric effect of `kind` at `level`
#[inline]
pub fn effect(kind: UpgradeKind, level: u32) -> f32 {
    kind.formula().apply(level)
}
