//! Read-only view of a tick for the presentation layer

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{EnemyKind, EnemyState};
use super::ledger::{AmmoKind, LedgerSnapshot};
use super::state::{GamePhase, GameState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: u32,
    pub kind: AmmoKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub landed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub health: u32,
    pub max_health: u32,
    pub state: EnemyState,
}

/// Everything a renderer or HUD needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub elapsed: f32,
    pub phase: GamePhase,
    /// Display name of the active wave, if any
    pub wave_name: Option<String>,
    pub wave_index: u32,
    pub wave_count: usize,
    pub ledger: LedgerSnapshot,
    pub selected_ammo: AmmoKind,
    /// Bow draw progress in `[0, 1]` while charging
    pub charge: Option<f32>,
    pub projectiles: Vec<ProjectileView>,
    pub enemies: Vec<EnemyView>,
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot {
        let max_charge = self.tuning.ballistics.max_charge_time.max(f32::EPSILON);
        Snapshot {
            tick: self.time_ticks,
            elapsed: self.elapsed,
            phase: self.phase,
            wave_name: self.scheduler.current_name().map(str::to_string),
            wave_index: self.scheduler.wave_index(),
            wave_count: self.scheduler.wave_count(),
            ledger: self.ledger.snapshot(),
            selected_ammo: self.selected_ammo,
            charge: self.charge.map(|c| (c / max_charge).clamp(0.0, 1.0)),
            projectiles: self
                .projectiles
                .iter()
                .filter(|p| !p.removed)
                .map(|p| ProjectileView {
                    id: p.id,
                    kind: p.kind,
                    pos: p.pos,
                    vel: p.vel,
                    landed: p.landed,
                })
                .collect(),
            enemies: self
                .enemies
                .iter()
                .filter(|e| !e.removed)
                .map(|e| EnemyView {
                    id: e.id,
                    kind: e.kind,
                    pos: e.pos,
                    health: e.health,
                    max_health: e.max_health,
                    state: e.state,
                })
                .collect(),
        }
    }
}
