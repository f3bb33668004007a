//! Simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep driven by [`tick`]
//! - One seeded [`SimRng`] threaded through every random draw
//! - Mark-and-compact removal with object pools
//! - No rendering or platform dependencies

pub mod combat;
pub mod enemy;
pub mod grid;
pub mod player;
pub mod projectile;
pub mod rng;
pub mod spawner;
pub mod state;
pub mod swarm;
pub mod tick;
pub mod weapon;

pub use combat::{HitReport, Kill, resolve_contact_damage, resolve_projectile_hits};
pub use enemy::{
    ActivityTier, AiBehavior, DamageOutcome, Enemy, EnemyId, EnemyKind, EnemyProfile, EnemyStep,
    Lifecycle,
};
pub use grid::SpatialGrid;
pub use player::{Player, PlayerHit};
pub use projectile::{
    DestroyReason, HitOutcome, Pierce, Projectile, ProjectileId, ProjectileSpec, ProjectileState,
    Projectiles,
};
pub use rng::SimRng;
pub use spawner::Spawner;
pub use state::{GamePhase, GameState, Gem, SimEvent};
pub use swarm::{Swarm, SwarmStep};
pub use tick::{FixedStep, TickInput, tick};
pub use weapon::{Shot, Weapon};
