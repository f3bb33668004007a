//! Upgrade progression
//!
//! - `formula`: pure `(kind, level) -> effect` table
//! - `ledger`: owned levels and the aggregate modifier snapshot

pub mod formula;
pub mod ledger;

pub use formula::{Formula, Shape, StatCategory, UpgradeGroup, UpgradeKind, effect};
pub use ledger::{AggregateModifiers, ProgressionLedger, UpgradeLevel};
