//! Fixed timestep simulation tick
//!
//! Core combat loop that advances the simulation deterministically. Each tick
//! runs the same fixed sequence: commands, charge, projectiles, collisions,
//! enemies, stock regeneration, waves, compaction.

use glam::Vec2;

use super::autopilot;
use super::ballistics::{Flight, FlightBounds, Projectile, launch_speed};
use super::collision::{find_hit, find_hit_box, find_splash_targets};
use super::enemy::{Damage, EnemyEvent};
use super::ledger::{AmmoKind, Purchase, StructureStatus};
use super::state::{GameEvent, GamePhase, GameState};
use super::wave::WaveTransition;
use crate::sanitize_dt;

/// Damage dealt by a direct hit, whatever the projectile kind
pub const HIT_DAMAGE: u32 = 1;
/// Damage dealt to everything inside a detonation radius
pub const SPLASH_DAMAGE: u32 = 1;

/// A player action queued between ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Start drawing the bow
    BeginCharge,
    /// Loose the drawn shot at `angle` (radians, 0 = right, counter-clockwise)
    ReleaseCharge { angle: f32 },
    SelectAmmo(AmmoKind),
    Purchase(AmmoKind),
    TogglePause,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Applied in order at the start of the tick
    pub commands: Vec<Command>,
    /// Idle/demo mode - the autopilot aims and fires
    pub autopilot: bool,
}

impl TickInput {
    pub fn with_commands(commands: Vec<Command>) -> Self {
        Self {
            commands,
            autopilot: false,
        }
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }
}

/// What the host should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    Paused,
    /// Structure health reached zero; the session is over
    DefenseFailed,
    /// Every wave spawned and cleared; the session is over
    Cleared,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> TickOutcome {
    match state.phase {
        GamePhase::Defeated => return TickOutcome::DefenseFailed,
        GamePhase::Cleared => return TickOutcome::Cleared,
        GamePhase::Running | GamePhase::Paused => {}
    }
    let dt = sanitize_dt(dt);

    // 1. Commands (player first, then the autopilot)
    let mut commands = input.commands.clone();
    if input.autopilot && state.phase == GamePhase::Running {
        commands.extend(autopilot::commands(state));
    }
    for command in commands {
        apply_command(state, command);
    }
    if state.phase == GamePhase::Paused {
        return TickOutcome::Paused;
    }

    state.time_ticks += 1;
    state.elapsed += dt;

    // 2. Charge accumulates from simulation time only
    if let Some(charge) = state.charge.as_mut() {
        *charge += dt;
    }

    // 3-4. Flight, then hits and impacts
    let flights = advance_projectiles(state, dt);
    resolve_collisions(state, &flights);

    // 5. Enemies
    advance_enemies(state, dt);
    if state.ledger.is_breached() {
        state.phase = GamePhase::Defeated;
        state.push_event(GameEvent::DefenseFailed);
        log::info!(
            "Defense failed at {:.1}s during wave {}",
            state.elapsed,
            state.scheduler.wave_index() + 1
        );
        state.compact();
        return TickOutcome::DefenseFailed;
    }

    // 6. Stock
    regenerate_stock(state, dt);

    // 7. Waves
    advance_waves(state, dt);

    // 8. Compaction
    state.compact();

    match state.phase {
        GamePhase::Cleared => TickOutcome::Cleared,
        _ => TickOutcome::Running,
    }
}

fn apply_command(state: &mut GameState, command: Command) {
    if state.phase == GamePhase::Paused && command != Command::TogglePause {
        log::debug!("Ignoring {:?} while paused", command);
        return;
    }

    match command {
        Command::TogglePause => {
            state.phase = match state.phase {
                GamePhase::Running => GamePhase::Paused,
                GamePhase::Paused => GamePhase::Running,
                other => other,
            };
        }
        Command::BeginCharge => {
            if state.charge.is_none() {
                state.charge = Some(0.0);
            }
        }
        Command::ReleaseCharge { angle } => fire(state, angle),
        Command::SelectAmmo(kind) => state.selected_ammo = kind,
        Command::Purchase(kind) => {
            let event = match state.ledger.purchase(kind, &state.tuning.economy.prices) {
                Purchase::Completed { kind, cost } => {
                    log::debug!("Bought {} for {}", kind.as_str(), cost);
                    GameEvent::PurchaseCompleted { kind, cost }
                }
                Purchase::Declined { kind, cost, balance } => {
                    log::debug!(
                        "Purchase of {} declined: costs {}, balance {}",
                        kind.as_str(),
                        cost,
                        balance
                    );
                    GameEvent::PurchaseDeclined {
                        kind,
                        cost,
                        balance,
                    }
                }
            };
            state.push_event(event);
        }
    }
}

/// Release the drawn shot. A release without a prior draw fires at minimum
/// speed.
fn fire(state: &mut GameState, angle: f32) {
    let charge = state.charge.take().unwrap_or(0.0);
    let kind = state.selected_ammo;
    if !state.ledger.take_shot(kind) {
        log::debug!("Fire rejected: no {} stock", kind.as_str());
        state.push_event(GameEvent::FireRejected { kind });
        return;
    }

    let angle = if angle.is_finite() { angle } else { 0.0 };
    let ballistics = state.tuning.ballistics.clone();
    let origin = state.tuning.playfield.defender;
    let speed = launch_speed(charge, &ballistics);

    match kind {
        AmmoKind::TripleShot => {
            let spread = ballistics.triple_spread;
            for offset in [-spread, 0.0, spread] {
                let id = state.next_entity_id();
                state.projectiles.push(Projectile::launch(
                    id,
                    AmmoKind::Normal,
                    origin,
                    angle + offset,
                    speed,
                    &ballistics,
                ));
            }
        }
        AmmoKind::Normal | AmmoKind::Explosive => {
            let id = state.next_entity_id();
            state
                .projectiles
                .push(Projectile::launch(id, kind, origin, angle, speed, &ballistics));
        }
    }
    state.push_event(GameEvent::ProjectileFired { kind, speed, angle });
}

fn advance_projectiles(state: &mut GameState, dt: f32) -> Vec<Flight> {
    let bounds = FlightBounds::from_tuning(&state.tuning.playfield);
    state
        .projectiles
        .iter_mut()
        .map(|p| p.advance(dt, &bounds))
        .collect()
}

fn resolve_collisions(state: &mut GameState, flights: &[Flight]) {
    for (index, flight) in flights.iter().enumerate() {
        if state.projectiles[index].removed {
            continue;
        }
        match *flight {
            Flight::Airborne => {
                if let Some(target) = find_hit(&state.projectiles[index], &state.enemies) {
                    strike(state, index, target);
                }
            }
            Flight::Landed(at) => {
                // An enemy under the landing point takes the hit, not the ground
                let hitbox = state.projectiles[index].hitbox();
                match find_hit_box(&hitbox, &state.enemies) {
                    Some(target) => strike(state, index, target),
                    None => ground_impact(state, index, at),
                }
            }
            Flight::Grounded => {}
            Flight::Expired | Flight::OutOfBounds => state.projectiles[index].removed = true,
        }
    }
}

/// Direct hit. Splash only happens on ground impact, so explosives striking
/// an enemy deal plain hit damage.
fn strike(state: &mut GameState, index: usize, target: u32) {
    state.projectiles[index].removed = true;
    damage_enemy(state, target, HIT_DAMAGE);
}

fn ground_impact(state: &mut GameState, index: usize, at: Vec2) {
    let projectile = &mut state.projectiles[index];
    if projectile.explosive {
        projectile.removed = true;
        let radius = projectile.splash_radius;
        detonate(state, at, radius);
    } else {
        let id = projectile.id;
        state.push_event(GameEvent::ProjectileLanded { id, pos: at });
    }
}

/// Splash damage around a ground impact at `at`
fn detonate(state: &mut GameState, at: Vec2, radius: f32) {
    let victims = find_splash_targets(at, radius, &state.enemies);
    for &id in &victims {
        damage_enemy(state, id, SPLASH_DAMAGE);
    }
    log::debug!(
        "Detonation at ({:.0}, {:.0}) caught {} enemies",
        at.x,
        at.y,
        victims.len()
    );
    state.push_event(GameEvent::Detonation { pos: at, victims });
}

fn damage_enemy(state: &mut GameState, id: u32, amount: u32) {
    let Some(enemy) = state.enemies.iter_mut().find(|e| e.id == id) else {
        return;
    };
    let kind = enemy.kind;
    match enemy.take_damage(amount) {
        Damage::Killed { reward } => {
            state.ledger.credit_kill(reward);
            log::debug!("Killed {} #{} (+{})", kind.as_str(), id, reward);
            state.push_event(GameEvent::EnemyKilled { id, kind, reward });
        }
        Damage::Wounded { remaining } => {
            state.push_event(GameEvent::EnemyHit { id, remaining });
        }
        Damage::Ignored => {}
    }
}

/// Stops at the attack that breaches the structure
fn advance_enemies(state: &mut GameState, dt: f32) {
    for index in 0..state.enemies.len() {
        let event =
            state.enemies[index].advance(dt, &state.tuning.enemies, &state.tuning.playfield);
        let id = state.enemies[index].id;
        match event {
            Some(EnemyEvent::Engaged) => {
                log::debug!("Enemy #{} reached the wall", id);
                state.push_event(GameEvent::EnemyEngaged { id });
            }
            Some(EnemyEvent::Attack(damage)) => {
                let status = state.ledger.debit_structure(damage);
                state.push_event(GameEvent::StructureHit {
                    id,
                    damage,
                    remaining: state.ledger.structure_health(),
                });
                if status == StructureStatus::Breached {
                    return;
                }
            }
            Some(EnemyEvent::Escaped) => {
                log::debug!("Enemy #{} slipped past", id);
                state.push_event(GameEvent::EnemyEscaped { id });
            }
            Some(EnemyEvent::Removed) | None => {}
        }
    }
}

fn regenerate_stock(state: &mut GameState, dt: f32) {
    let economy = &state.tuning.economy;
    if economy.regen_interval <= 0.0 {
        return;
    }
    let (interval, cap) = (economy.regen_interval, economy.normal_cap);
    state.regen_timer += dt;
    while state.regen_timer >= interval {
        state.regen_timer -= interval;
        state.ledger.regenerate(AmmoKind::Normal, cap);
    }
}

fn advance_waves(state: &mut GameState, dt: f32) {
    let alive = state.alive_in_wave(state.scheduler.wave_index());
    let step = state.scheduler.advance(dt, alive);

    for order in step.spawns {
        state.spawn_enemy(order.kind, order.wave);
    }

    match step.transition {
        Some(WaveTransition::Started { index, name }) => {
            state.push_event(GameEvent::WaveStarted { index, name });
        }
        Some(WaveTransition::Cleared) => {
            state.phase = GamePhase::Cleared;
            log::info!(
                "All waves cleared at {:.1}s with {} structure health left",
                state.elapsed,
                state.ledger.structure_health()
            );
            state.push_event(GameEvent::AllWavesCleared);
        }
        None => {}
    }
}
