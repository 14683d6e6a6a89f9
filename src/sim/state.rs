//! Game state and core simulation types
//!
//! Everything the combat loop mutates lives here. Two states built from the
//! same seed, tuning and waves, fed the same inputs, stay identical.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ballistics::Projectile;
use super::enemy::{Enemy, EnemyKind};
use super::ledger::{AmmoKind, ResourceLedger};
use super::wave::{WaveDef, WaveScheduler, WaveTransition, default_campaign};
use crate::tuning::Tuning;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active combat
    Running,
    /// Frozen until the next pause toggle
    Paused,
    /// Structure health hit zero
    Defeated,
    /// Every wave spawned and cleared
    Cleared,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Running => "running",
            GamePhase::Paused => "paused",
            GamePhase::Defeated => "defeated",
            GamePhase::Cleared => "cleared",
        }
    }

    /// Session is over; ticks no longer change anything
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::Defeated | GamePhase::Cleared)
    }
}

/// Notification for the presentation layer, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    WaveStarted { index: u32, name: String },
    AllWavesCleared,
    EnemySpawned { id: u32, kind: EnemyKind },
    EnemyEngaged { id: u32 },
    EnemyHit { id: u32, remaining: u32 },
    EnemyKilled { id: u32, kind: EnemyKind, reward: u32 },
    EnemyEscaped { id: u32 },
    StructureHit { id: u32, damage: u32, remaining: u32 },
    ProjectileFired { kind: AmmoKind, speed: f32, angle: f32 },
    FireRejected { kind: AmmoKind },
    ProjectileLanded { id: u32, pos: Vec2 },
    Detonation { pos: Vec2, victims: Vec<u32> },
    PurchaseCompleted { kind: AmmoKind, cost: u32 },
    PurchaseDeclined { kind: AmmoKind, cost: u32, balance: u32 },
    DefenseFailed,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulated seconds
    pub elapsed: f32,
    pub phase: GamePhase,
    pub ledger: ResourceLedger,
    pub scheduler: WaveScheduler,
    /// Live enemies (sorted by id for determinism)
    pub enemies: Vec<Enemy>,
    /// Live projectiles (sorted by id for determinism)
    pub projectiles: Vec<Projectile>,
    pub selected_ammo: AmmoKind,
    /// Seconds the bow has been drawn, `None` when not charging
    pub charge: Option<f32>,
    pub regen_timer: f32,
    events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// New session with default tuning and the built-in campaign
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, Tuning::default(), default_campaign())
    }

    /// New session; the first wave starts immediately
    pub fn with_config(seed: u64, tuning: Tuning, waves: Vec<WaveDef>) -> Self {
        let ledger = ResourceLedger::from_tuning(&tuning.economy);
        let scheduler = WaveScheduler::new(waves, tuning.waves.check_interval);
        let mut state = Self {
            seed,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            elapsed: 0.0,
            phase: GamePhase::Running,
            ledger,
            scheduler,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            selected_ammo: AmmoKind::Normal,
            charge: None,
            regen_timer: 0.0,
            events: Vec::new(),
            next_id: 1,
        };

        match state.scheduler.start() {
            WaveTransition::Started { index, name } => {
                state.push_event(GameEvent::WaveStarted { index, name });
            }
            WaveTransition::Cleared => {
                state.phase = GamePhase::Cleared;
                state.push_event(GameEvent::AllWavesCleared);
            }
        }
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn an enemy just off the right edge with a freshly drawn
    /// engagement threshold
    pub fn spawn_enemy(&mut self, kind: EnemyKind, wave: u32) -> u32 {
        let enemies = &self.tuning.enemies;
        let (lo, hi) = (enemies.threshold_min, enemies.threshold_max);
        let threshold_x = if hi > lo {
            self.rng.random_range(lo..=hi)
        } else {
            lo
        };

        let playfield = &self.tuning.playfield;
        let x = playfield.width + playfield.spawn_offset;
        let y = if kind.descriptor().flies {
            enemies.flyer_altitude
        } else {
            playfield.ground_y + enemies.body_size.y * 0.5
        };
        self.spawn_enemy_at(kind, wave, Vec2::new(x, y), threshold_x)
    }

    /// Spawn an enemy at an explicit position and threshold
    pub fn spawn_enemy_at(&mut self, kind: EnemyKind, wave: u32, pos: Vec2, threshold_x: f32) -> u32 {
        let id = self.next_entity_id();
        let enemy = Enemy::spawn(id, kind, wave, pos, threshold_x, &self.tuning.enemies);
        log::debug!(
            "Spawned {} #{} (wave {}) at x={:.0}, threshold {:.0}",
            kind.as_str(),
            id,
            wave + 1,
            pos.x,
            threshold_x
        );
        self.enemies.push(enemy);
        self.push_event(GameEvent::EnemySpawned { id, kind });
        id
    }

    /// Enemies from `wave` not yet removed (dying ones included)
    pub fn alive_in_wave(&self, wave: u32) -> usize {
        self.enemies
            .iter()
            .filter(|e| !e.removed && e.wave == wave)
            .count()
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop entities flagged for removal and restore id order
    pub fn compact(&mut self) {
        self.enemies.retain(|e| !e.removed);
        self.projectiles.retain(|p| !p.removed);
        self.normalize_order();
    }

    /// Ensure arenas are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
    }
}
