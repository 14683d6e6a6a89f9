//! Data-driven game balance
//!
//! Every number the simulation reads lives here so a session can be rebalanced
//! from a JSON file without touching code. Missing sections and fields fall
//! back to the built-in defaults.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::ledger::{AmmoKind, ProjectileStock};

/// Playfield layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayfieldTuning {
    pub width: f32,
    pub height: f32,
    /// Projectiles land when they reach this height
    pub ground_y: f32,
    /// Launch point of the defender on the castle wall
    pub defender: Vec2,
    /// Distance outside the visible bounds before a projectile is culled
    pub projectile_margin: f32,
    /// Distance past the left edge before an approaching enemy is culled
    pub enemy_exit_margin: f32,
    /// Enemies appear this far past the right edge
    pub spawn_offset: f32,
}

impl Default for PlayfieldTuning {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
            ground_y: GROUND_Y,
            defender: Vec2::new(120.0, 220.0),
            projectile_margin: 100.0,
            enemy_exit_margin: 50.0,
            spawn_offset: 50.0,
        }
    }
}

/// Projectile launch and flight
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallisticsTuning {
    /// Launch speed of an uncharged shot (px/s)
    pub min_speed: f32,
    /// Launch speed of a fully charged shot (px/s)
    pub max_speed: f32,
    /// Charge time that yields `max_speed` (s)
    pub max_charge_time: f32,
    /// Vertical acceleration (px/s², negative is down)
    pub gravity: f32,
    /// Linear shrink applied to projectile footprints for hit tests
    pub hitbox_scale: f32,
    pub arrow_size: Vec2,
    pub bomb_size: Vec2,
    pub splash_radius: f32,
    /// How long a landed arrow stays stuck in the ground (s)
    pub landed_fade: f32,
    /// Angle between the arrows of a triple shot (rad)
    pub triple_spread: f32,
}

impl Default for BallisticsTuning {
    fn default() -> Self {
        Self {
            min_speed: 200.0,
            max_speed: 900.0,
            max_charge_time: 1.5,
            gravity: -500.0,
            hitbox_scale: 0.7,
            arrow_size: Vec2::new(32.0, 8.0),
            bomb_size: Vec2::new(14.0, 14.0),
            splash_radius: 80.0,
            landed_fade: 0.5,
            triple_spread: 0.12,
        }
    }
}

/// Common enemy template, scaled per kind by its variant descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub base_health: u32,
    pub base_attack: u32,
    /// Walk speed (px/s)
    pub base_speed: f32,
    pub body_size: Vec2,
    pub flyer_size: Vec2,
    /// One attack animation cycle (s)
    pub attack_cycle: f32,
    /// Death animation length for ground enemies (s)
    pub death_duration: f32,
    /// Engagement threshold range, drawn once per enemy
    pub threshold_min: f32,
    pub threshold_max: f32,
    /// Cruise altitude flyers oscillate around
    pub flyer_altitude: f32,
    pub flyer_amplitude: f32,
    /// rad/s
    pub flyer_frequency: f32,
    /// Horizontal offset from the defender where a flyer hovers to attack
    pub flyer_engage_offset: f32,
    /// Fall acceleration of a dying flyer (px/s², negative is down)
    pub flyer_fall_gravity: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            base_health: 2,
            base_attack: 1,
            base_speed: 20.0,
            body_size: Vec2::new(48.0, 48.0),
            flyer_size: Vec2::new(72.0, 56.0),
            attack_cycle: 1.0,
            death_duration: 1.0,
            threshold_min: 150.0,
            threshold_max: 220.0,
            flyer_altitude: 300.0,
            flyer_amplitude: 60.0,
            flyer_frequency: 2.0,
            flyer_engage_offset: 70.0,
            flyer_fall_gravity: -600.0,
        }
    }
}

/// Currency cost of one unit of each stock type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmmoPrices {
    pub normal: u32,
    pub explosive: u32,
    pub triple_shot: u32,
}

impl Default for AmmoPrices {
    fn default() -> Self {
        Self {
            normal: 1,
            explosive: 6,
            triple_shot: 4,
        }
    }
}

impl AmmoPrices {
    pub fn price(&self, kind: AmmoKind) -> u32 {
        match kind {
            AmmoKind::Normal => self.normal,
            AmmoKind::Explosive => self.explosive,
            AmmoKind::TripleShot => self.triple_shot,
        }
    }
}

/// Structure health, currency and stock
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    pub structure_max: u32,
    pub starting_currency: u32,
    pub starting_stock: ProjectileStock,
    /// Regeneration never pushes normal stock past this
    pub normal_cap: u32,
    /// Seconds between normal stock regeneration ticks
    pub regen_interval: f32,
    pub prices: AmmoPrices,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            structure_max: 100,
            starting_currency: 0,
            starting_stock: ProjectileStock {
                normal: 10,
                explosive: 2,
                triple_shot: 1,
            },
            normal_cap: 20,
            regen_interval: 2.0,
            prices: AmmoPrices::default(),
        }
    }
}

/// Wave pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Cadence of the wave completion check (s)
    pub check_interval: f32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            check_interval: 0.5,
        }
    }
}

/// Complete balance sheet for a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub playfield: PlayfieldTuning,
    pub ballistics: BallisticsTuning,
    pub enemies: EnemyTuning,
    pub economy: EconomyTuning,
    pub waves: WaveTuning,
}

impl Tuning {
    /// Parse tuning from JSON text. `origin` names the source in errors.
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tuning = Self::from_json_str(&json, &path.display().to_string())?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.ballistics;
        if b.min_speed < 0.0 || b.max_speed < b.min_speed {
            return Err(ConfigError::invalid(
                "ballistics.speed",
                format!("need 0 <= min_speed <= max_speed, got {} / {}", b.min_speed, b.max_speed),
            ));
        }
        if b.max_charge_time <= 0.0 {
            return Err(ConfigError::invalid(
                "ballistics.max_charge_time",
                format!("must be positive, got {}", b.max_charge_time),
            ));
        }
        if b.splash_radius < 0.0 {
            return Err(ConfigError::invalid(
                "ballistics.splash_radius",
                format!("must not be negative, got {}", b.splash_radius),
            ));
        }
        let e = &self.enemies;
        if e.threshold_max < e.threshold_min {
            return Err(ConfigError::invalid(
                "enemies.threshold",
                format!("min {} exceeds max {}", e.threshold_min, e.threshold_max),
            ));
        }
        if e.attack_cycle <= 0.0 || e.death_duration < 0.0 {
            return Err(ConfigError::invalid(
                "enemies.timing",
                format!(
                    "attack_cycle must be positive and death_duration non-negative, got {} / {}",
                    e.attack_cycle, e.death_duration
                ),
            ));
        }
        if self.economy.structure_max == 0 {
            return Err(ConfigError::invalid("economy.structure_max", "must be at least 1"));
        }
        if self.economy.regen_interval <= 0.0 || self.waves.check_interval <= 0.0 {
            return Err(ConfigError::invalid(
                "intervals",
                "regen_interval and check_interval must be positive",
            ));
        }
        Ok(())
    }
}
