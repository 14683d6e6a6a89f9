//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod ballistics;
pub mod collision;
pub mod enemy;
pub mod ledger;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod wave;

pub use ballistics::{Flight, FlightBounds, Projectile, launch_speed};
pub use collision::{Aabb, find_hit, find_splash_targets};
pub use enemy::{Damage, Enemy, EnemyKind, EnemyState, VariantDescriptor};
pub use ledger::{AmmoKind, LedgerSnapshot, ProjectileStock, Purchase, ResourceLedger};
pub use snapshot::{EnemyView, ProjectileView, Snapshot};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{Command, TickInput, TickOutcome, tick};
pub use wave::{SpawnEvent, WaveDef, WaveScheduler, default_campaign, load_waves};
