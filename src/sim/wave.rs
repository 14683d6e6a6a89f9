//! Wave scheduling
//!
//! A wave is a named list of timed spawn events. When a wave starts each
//! event gets a release cursor relative to the wave start. A wave ends only
//! when every cursor is exhausted and nothing it spawned is left on the
//! field; the completion check runs on a fixed cadence, not every tick.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use crate::error::ConfigError;
use crate::sanitize_dt;

/// One spawn event: `count` enemies of type `enemy` released at `offset`
/// seconds after wave start, `interval` seconds apart.
///
/// Accepts either an object or a compact `[offset, "type", count]` tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SpawnEventRepr")]
pub struct SpawnEvent {
    pub offset: f32,
    /// Enemy type name, resolved when the event fires
    pub enemy: String,
    pub count: u32,
    pub interval: f32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SpawnEventRepr {
    Tuple(f32, String, u32),
    Spaced(f32, String, u32, f32),
    Object {
        offset: f32,
        enemy: String,
        count: u32,
        #[serde(default)]
        interval: f32,
    },
}

impl From<SpawnEventRepr> for SpawnEvent {
    fn from(repr: SpawnEventRepr) -> Self {
        match repr {
            SpawnEventRepr::Tuple(offset, enemy, count) => SpawnEvent::new(offset, enemy, count),
            SpawnEventRepr::Spaced(offset, enemy, count, interval)
            | SpawnEventRepr::Object {
                offset,
                enemy,
                count,
                interval,
            } => SpawnEvent::spaced(offset, enemy, count, interval),
        }
    }
}

impl SpawnEvent {
    pub fn new(offset: f32, enemy: impl Into<String>, count: u32) -> Self {
        Self::spaced(offset, enemy, count, 0.0)
    }

    pub fn spaced(offset: f32, enemy: impl Into<String>, count: u32, interval: f32) -> Self {
        Self {
            offset,
            enemy: enemy.into(),
            count,
            interval,
        }
    }
}

/// A named batch of spawn events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveDef {
    pub name: String,
    pub events: Vec<SpawnEvent>,
}

impl WaveDef {
    pub fn new(name: impl Into<String>, events: Vec<SpawnEvent>) -> Self {
        Self {
            name: name.into(),
            events,
        }
    }

    /// Total enemies this wave releases (including unknown types)
    pub fn total_spawns(&self) -> u32 {
        self.events
            .iter()
            .fold(0u32, |total, e| total.saturating_add(e.count.min(MAX_EVENT_SPAWNS)))
    }
}

/// Built-in four-wave campaign
pub fn default_campaign() -> Vec<WaveDef> {
    vec![
        WaveDef::new("Scouts", vec![SpawnEvent::spaced(0.0, "basic", 3, 2.0)]),
        WaveDef::new(
            "War Band",
            vec![
                SpawnEvent::spaced(0.0, "basic", 2, 2.0),
                SpawnEvent::spaced(4.0, "heavy", 2, 3.0),
            ],
        ),
        WaveDef::new(
            "Dark Riders",
            vec![
                SpawnEvent::spaced(0.0, "relentless", 2, 3.0),
                SpawnEvent::spaced(3.0, "basic", 3, 1.5),
                SpawnEvent::new(8.0, "elite", 1),
            ],
        ),
        WaveDef::new(
            "Dragonfire",
            vec![
                SpawnEvent::new(0.0, "flyer", 1),
                SpawnEvent::spaced(2.0, "heavy", 2, 2.0),
                SpawnEvent::spaced(6.0, "elite", 2, 3.0),
                SpawnEvent::spaced(10.0, "flyer", 2, 4.0),
            ],
        ),
    ]
}

/// Parse a JSON array of waves. `origin` names the source in errors.
pub fn load_waves_from_str(json: &str, origin: &str) -> Result<Vec<WaveDef>, ConfigError> {
    serde_json::from_str(json).map_err(|source| ConfigError::Parse {
        path: origin.to_string(),
        source,
    })
}

/// Load waves from a JSON file
pub fn load_waves(path: impl AsRef<Path>) -> Result<Vec<WaveDef>, ConfigError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let waves = load_waves_from_str(&json, &path.display().to_string())?;
    log::info!("Loaded {} waves from {}", waves.len(), path.display());
    Ok(waves)
}

/// Scheduler phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// `start` not called yet
    Idle,
    Active,
    /// Every wave has been spawned and cleared
    Cleared,
}

/// An enemy the scheduler wants on the field now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnOrder {
    pub kind: EnemyKind,
    pub wave: u32,
}

/// Wave lifecycle notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaveTransition {
    Started { index: u32, name: String },
    Cleared,
}

/// Output of one scheduler step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveStep {
    pub spawns: Vec<SpawnOrder>,
    pub transition: Option<WaveTransition>,
}

/// Upper bound on `count` for a single spawn event
pub const MAX_EVENT_SPAWNS: u32 = 1000;

/// Release state of one spawn event
#[derive(Debug, Clone)]
struct Cursor {
    /// Wave time of the next release
    next_at: f32,
    interval: f32,
    remaining: u32,
    enemy: String,
}

/// Walks the wave list, releasing spawns and deciding when a wave is over
#[derive(Debug, Clone)]
pub struct WaveScheduler {
    waves: Vec<WaveDef>,
    index: usize,
    phase: WavePhase,
    /// Seconds since the current wave started
    elapsed: f32,
    /// One cursor per event with spawns left, in declaration order
    cursors: Vec<Cursor>,
    spawning_complete: bool,
    check_timer: f32,
    check_interval: f32,
}

impl WaveScheduler {
    pub fn new(waves: Vec<WaveDef>, check_interval: f32) -> Self {
        Self {
            waves,
            index: 0,
            phase: WavePhase::Idle,
            elapsed: 0.0,
            cursors: Vec::new(),
            spawning_complete: false,
            check_timer: 0.0,
            check_interval: check_interval.max(f32::EPSILON),
        }
    }

    /// Begin the first wave (or clear immediately if there are none)
    pub fn start(&mut self) -> WaveTransition {
        if self.waves.is_empty() {
            self.phase = WavePhase::Cleared;
            log::info!("No waves configured");
            return WaveTransition::Cleared;
        }
        self.begin_wave(0)
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Index of the wave in progress (the last index once cleared)
    pub fn wave_index(&self) -> u32 {
        self.index as u32
    }

    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    /// Display name of the wave in progress
    pub fn current_name(&self) -> Option<&str> {
        match self.phase {
            WavePhase::Active => self.waves.get(self.index).map(|w| w.name.as_str()),
            _ => None,
        }
    }

    /// Every spawn of the current wave has been released
    pub fn spawning_complete(&self) -> bool {
        self.spawning_complete
    }

    fn begin_wave(&mut self, index: usize) -> WaveTransition {
        self.index = index;
        self.phase = WavePhase::Active;
        self.elapsed = 0.0;
        self.check_timer = 0.0;

        let wave = &self.waves[index];
        self.cursors = wave
            .events
            .iter()
            .filter(|event| event.count > 0)
            .map(|event| {
                if event.count > MAX_EVENT_SPAWNS {
                    log::warn!(
                        "Wave {} ({}): {} x '{}' capped at {}",
                        index + 1,
                        wave.name,
                        event.count,
                        event.enemy,
                        MAX_EVENT_SPAWNS
                    );
                }
                Cursor {
                    next_at: event.offset.max(0.0),
                    interval: event.interval.max(0.0),
                    remaining: event.count.min(MAX_EVENT_SPAWNS),
                    enemy: event.enemy.clone(),
                }
            })
            .collect();
        self.spawning_complete = self.cursors.is_empty();

        log::info!(
            "Wave {} started: {} ({} spawns)",
            index + 1,
            wave.name,
            wave.total_spawns()
        );
        WaveTransition::Started {
            index: index as u32,
            name: wave.name.clone(),
        }
    }

    fn next_due(&self) -> Option<usize> {
        self.cursors
            .iter()
            .enumerate()
            .filter(|(_, c)| c.remaining > 0 && c.next_at <= self.elapsed)
            .min_by(|(ia, a), (ib, b)| a.next_at.total_cmp(&b.next_at).then(ia.cmp(ib)))
            .map(|(i, _)| i)
    }

    /// Advance wave time by `dt`. `alive_in_wave` is the number of enemies
    /// from the current wave still on the field.
    pub fn advance(&mut self, dt: f32, alive_in_wave: usize) -> WaveStep {
        let mut step = WaveStep::default();
        if self.phase != WavePhase::Active {
            return step;
        }
        let dt = sanitize_dt(dt);
        self.elapsed += dt;

        // Release due spawns in time order; ties go to the earlier event
        while let Some(i) = self.next_due() {
            let cursor = &mut self.cursors[i];
            cursor.remaining -= 1;
            cursor.next_at += cursor.interval;
            match EnemyKind::parse_name(&cursor.enemy) {
                Some(kind) => step.spawns.push(SpawnOrder {
                    kind,
                    wave: self.index as u32,
                }),
                None => log::warn!(
                    "Wave {} ({}): unknown enemy type '{}', spawn skipped",
                    self.index + 1,
                    self.waves[self.index].name,
                    cursor.enemy
                ),
            }
        }
        self.cursors.retain(|c| c.remaining > 0);
        if self.cursors.is_empty() && !self.spawning_complete {
            self.spawning_complete = true;
            log::debug!("Wave {} spawning complete", self.index + 1);
        }

        self.check_timer += dt;
        if self.check_timer < self.check_interval {
            return step;
        }
        self.check_timer = 0.0;

        if self.spawning_complete && alive_in_wave == 0 && step.spawns.is_empty() {
            let next = self.index + 1;
            step.transition = Some(if next < self.waves.len() {
                self.begin_wave(next)
            } else {
                self.phase = WavePhase::Cleared;
                self.cursors.clear();
                log::info!("All {} waves cleared", self.waves.len());
                WaveTransition::Cleared
            });
        }
        step
    }
}
