//! Idle/demo mode: the defender aims and fires by itself
//!
//! For each candidate elevation the autopilot solves the projectile equation
//! for the launch speed that reaches the nearest raider's predicted position,
//! takes the first elevation whose speed the bow can produce, and draws for
//! exactly as long as that speed needs.

use glam::Vec2;

use super::ballistics::charge_for_speed;
use super::enemy::{Enemy, EnemyState};
use super::ledger::AmmoKind;
use super::state::GameState;
use super::tick::Command;

/// Candidate launch elevations (radians above horizontal), preferred first.
/// Raiders close to the wall need the downward ones.
pub const AIM_ANGLES: [f32; 6] = [0.6, 0.3, 0.0, -0.3, -0.6, -0.9];
/// Buy explosives when this many raiders stand within one splash radius
const CLUSTER_SIZE: usize = 3;
/// Lead refinement passes for moving targets
const LEAD_PASSES: usize = 3;

/// A planned shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotPlan {
    pub target: u32,
    pub angle: f32,
    pub speed: f32,
    /// Seconds to hold the draw
    pub charge: f32,
}

/// Launch speed that carries a projectile from the origin through `delta`
/// at elevation `angle` under vertical acceleration `gravity` (negative is
/// down). `None` when no speed reaches the point at that angle.
pub fn required_speed(delta: Vec2, angle: f32, gravity: f32) -> Option<f32> {
    let (dx, dy) = (delta.x, delta.y);
    let cos = angle.cos();
    if dx <= 0.0 || cos <= 0.0 {
        return None;
    }
    let g = -gravity;
    let rise = dx * angle.tan() - dy;
    if g <= f32::EPSILON {
        // Straight line: only reachable when already on the aim line
        return (rise.abs() < 1.0).then_some(f32::INFINITY);
    }
    if rise <= 0.0 {
        return None;
    }
    Some((g * dx * dx / (2.0 * cos * cos * rise)).sqrt())
}

/// Closest raider that can still be shot, by distance from the defender
pub fn pick_target<'a>(enemies: &'a [Enemy], defender: Vec2) -> Option<&'a Enemy> {
    enemies
        .iter()
        .filter(|e| e.is_targetable() && e.pos.x > defender.x)
        .min_by(|a, b| {
            a.pos
                .distance_squared(defender)
                .partial_cmp(&b.pos.distance_squared(defender))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        })
}

/// Plan a shot at the nearest raider
pub fn plan_shot(state: &GameState) -> Option<ShotPlan> {
    let ballistics = &state.tuning.ballistics;
    let origin = state.tuning.playfield.defender;
    let target = pick_target(&state.enemies, origin)?;

    let velocity = match target.state {
        EnemyState::Approaching => Vec2::new(-target.walk_speed, 0.0),
        _ => Vec2::ZERO,
    };

    let solutions: Vec<(f32, f32)> = AIM_ANGLES
        .iter()
        .filter_map(|&angle| {
            lead_speed(origin, target.pos, velocity, angle, ballistics.gravity)
                .map(|speed| (angle, speed))
        })
        .collect();
    let in_range = |s: f32| s >= ballistics.min_speed && s <= ballistics.max_speed;
    let (angle, speed) = solutions
        .iter()
        .copied()
        .find(|&(_, s)| in_range(s))
        .or_else(|| solutions.first().copied())?;

    let speed = speed.clamp(ballistics.min_speed, ballistics.max_speed);
    Some(ShotPlan {
        target: target.id,
        angle,
        speed,
        charge: charge_for_speed(speed, ballistics),
    })
}

/// Required speed at `angle` for a target moving at `velocity`, refined by
/// re-aiming at where the target will be after the flight time
fn lead_speed(origin: Vec2, pos: Vec2, velocity: Vec2, angle: f32, gravity: f32) -> Option<f32> {
    let mut aim = pos;
    let mut speed = required_speed(aim - origin, angle, gravity)?;
    for _ in 0..LEAD_PASSES {
        let flight_time = (aim.x - origin.x) / (speed * angle.cos());
        aim = pos + velocity * flight_time;
        speed = required_speed(aim - origin, angle, gravity)?;
    }
    Some(speed)
}

/// Ammo the autopilot wants loaded, given what is in stock
fn choose_ammo(state: &GameState, target: Vec2) -> AmmoKind {
    let stock = state.ledger.stock();
    let radius = state.tuning.ballistics.splash_radius;
    let clustered = state
        .enemies
        .iter()
        .filter(|e| e.is_targetable() && e.pos.distance(target) <= radius)
        .count();

    if clustered >= CLUSTER_SIZE && stock.explosive > 0 {
        AmmoKind::Explosive
    } else if stock.normal > 0 {
        AmmoKind::Normal
    } else if stock.triple_shot > 0 {
        AmmoKind::TripleShot
    } else {
        AmmoKind::Normal
    }
}

/// Commands for this tick
pub fn commands(state: &GameState) -> Vec<Command> {
    let mut commands = Vec::new();

    let prices = &state.tuning.economy.prices;
    let currency = state.ledger.kill_currency();
    if state.ledger.stock().explosive == 0 && currency >= prices.explosive {
        commands.push(Command::Purchase(AmmoKind::Explosive));
    } else if state.ledger.stock().normal == 0 && currency >= prices.normal {
        commands.push(Command::Purchase(AmmoKind::Normal));
    }

    let Some(plan) = plan_shot(state) else {
        return commands;
    };
    let Some(target) = state.enemy(plan.target) else {
        return commands;
    };

    match state.charge {
        None => {
            let ammo = choose_ammo(state, target.pos);
            if ammo != state.selected_ammo {
                commands.push(Command::SelectAmmo(ammo));
            }
            commands.push(Command::BeginCharge);
        }
        Some(charge) if charge >= plan.charge => {
            commands.push(Command::ReleaseCharge { angle: plan.angle });
        }
        Some(_) => {}
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::ballistics::{Flight, FlightBounds, Projectile};
    use crate::sim::enemy::EnemyKind;
    use crate::sim::state::GameEvent;
    use crate::sim::tick::{TickInput, tick};
    use crate::sim::wave::WaveDef;
    use crate::tuning::Tuning;

    #[test]
    fn test_required_speed_matches_range_formula() {
        // Level ground: range = v^2 sin(2a) / g
        let (v, a, g) = (400.0f32, 0.6f32, 500.0f32);
        let range = v * v * (2.0 * a).sin() / g;
        let speed = required_speed(Vec2::new(range, 0.0), a, -g).expect("reachable");
        assert!((speed - v).abs() < 0.5);
    }

    #[test]
    fn test_required_speed_unreachable() {
        assert_eq!(required_speed(Vec2::new(-10.0, 0.0), 0.6, -500.0), None);
        // Target above the aim line
        assert_eq!(required_speed(Vec2::new(100.0, 500.0), 0.6, -500.0), None);
    }

    #[test]
    fn test_planned_shot_passes_through_stationary_target() {
        let tuning = Tuning::default();
        let mut state = GameState::with_config(1, tuning, vec![WaveDef::new("hold", Vec::new())]);
        let id = state.spawn_enemy_at(EnemyKind::Basic, 0, Vec2::new(500.0, 124.0), 100.0);
        state.enemies[0].state = EnemyState::Engaging;

        let plan = plan_shot(&state).expect("target in range");
        assert_eq!(plan.target, id);

        let bounds = FlightBounds::from_tuning(&state.tuning.playfield);
        let mut p = Projectile::launch(
            1,
            AmmoKind::Normal,
            state.tuning.playfield.defender,
            plan.angle,
            plan.speed,
            &state.tuning.ballistics,
        );
        let target = state.enemies[0].pos;
        let mut closest = f32::MAX;
        while p.advance(SIM_DT, &bounds) == Flight::Airborne {
            closest = closest.min(p.pos.distance(target));
        }
        assert!(closest < 12.0, "closest approach {closest}");
    }

    #[test]
    fn test_engaged_raider_near_wall_is_reachable() {
        let mut state = GameState::with_config(1, Tuning::default(), vec![WaveDef::new("hold", Vec::new())]);
        state.spawn_enemy_at(EnemyKind::Basic, 0, Vec2::new(170.0, 124.0), 170.0);
        state.enemies[0].state = EnemyState::Engaging;

        let plan = plan_shot(&state).expect("target in range");
        assert!(plan.angle < 0.0);
        let b = &state.tuning.ballistics;
        assert!(plan.speed >= b.min_speed && plan.speed <= b.max_speed);
    }

    #[test]
    fn test_no_plan_without_targets() {
        let state = GameState::with_config(1, Tuning::default(), vec![WaveDef::new("hold", Vec::new())]);
        assert_eq!(plan_shot(&state), None);
        assert!(commands(&state).is_empty());
    }

    #[test]
    fn test_pick_target_skips_dying() {
        let mut state = GameState::new(1);
        let near = state.spawn_enemy_at(EnemyKind::Basic, 0, Vec2::new(300.0, 124.0), 100.0);
        let far = state.spawn_enemy_at(EnemyKind::Basic, 0, Vec2::new(600.0, 124.0), 100.0);
        let defender = state.tuning.playfield.defender;
        assert_eq!(pick_target(&state.enemies, defender).map(|e| e.id), Some(near));
        state.enemies[0].take_damage(100);
        assert_eq!(pick_target(&state.enemies, defender).map(|e| e.id), Some(far));
    }

    #[test]
    fn test_autopilot_scores_kills() {
        let mut state = GameState::new(21);
        let input = TickInput {
            commands: Vec::new(),
            autopilot: true,
        };
        let mut kills = 0;
        for _ in 0..(60 * 60) {
            tick(&mut state, &input, SIM_DT);
            kills += state
                .drain_events()
                .iter()
                .filter(|e| matches!(e, GameEvent::EnemyKilled { .. }))
                .count();
        }
        assert!(kills > 0);
    }
}
