//! Raider behaviour: approach, engage the castle, die
//!
//! Every raider shares one template; a kind only picks a [`VariantDescriptor`]
//! that scales the template's numbers and switches on flight.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::sanitize_dt;
use crate::tuning::{EnemyTuning, PlayfieldTuning};

/// Multipliers applied to the common enemy template
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantDescriptor {
    pub health_mult: u32,
    pub attack_mult: u32,
    pub speed_mult: f32,
    pub flies: bool,
    /// Linear shrink of the visual footprint used for hit tests
    pub hitbox_scale: f32,
}

const BASIC: VariantDescriptor = VariantDescriptor {
    health_mult: 1,
    attack_mult: 1,
    speed_mult: 1.0,
    flies: false,
    hitbox_scale: 0.7,
};

const HEAVY: VariantDescriptor = VariantDescriptor {
    health_mult: 2,
    attack_mult: 2,
    ..BASIC
};

const ELITE: VariantDescriptor = VariantDescriptor {
    health_mult: 3,
    attack_mult: 3,
    speed_mult: 3.0,
    ..BASIC
};

const RELENTLESS: VariantDescriptor = VariantDescriptor {
    health_mult: 3,
    attack_mult: 2,
    speed_mult: 2.0,
    ..BASIC
};

const FLYER: VariantDescriptor = VariantDescriptor {
    speed_mult: 5.0,
    flies: true,
    hitbox_scale: 0.6,
    ..BASIC
};

/// Raider kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Heavy,
    Elite,
    Relentless,
    Flyer,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Basic,
        EnemyKind::Heavy,
        EnemyKind::Elite,
        EnemyKind::Relentless,
        EnemyKind::Flyer,
    ];

    pub fn descriptor(&self) -> &'static VariantDescriptor {
        match self {
            EnemyKind::Basic => &BASIC,
            EnemyKind::Heavy => &HEAVY,
            EnemyKind::Elite => &ELITE,
            EnemyKind::Relentless => &RELENTLESS,
            EnemyKind::Flyer => &FLYER,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Basic => "basic",
            EnemyKind::Heavy => "heavy",
            EnemyKind::Elite => "elite",
            EnemyKind::Relentless => "relentless",
            EnemyKind::Flyer => "flyer",
        }
    }

    /// Parse a wave-data type name (case-insensitive, sprite names accepted)
    pub fn parse_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "basic" | "orc" => Some(EnemyKind::Basic),
            "heavy" | "big_orc" | "bigorc" => Some(EnemyKind::Heavy),
            "elite" | "wizard" | "wizzard" => Some(EnemyKind::Elite),
            "relentless" | "death" => Some(EnemyKind::Relentless),
            "flyer" | "dragon" => Some(EnemyKind::Flyer),
            _ => None,
        }
    }
}

/// Behaviour state. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    /// Walking (or flying) toward the castle
    Approaching,
    /// Halted at the wall, attacking on a fixed cadence
    Engaging,
    /// Playing the death sequence; immune to everything
    Dying,
}

/// Result of [`Enemy::take_damage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    /// Enemy was already dying or gone
    Ignored,
    Wounded { remaining: u32 },
    /// The killing blow; carries the kill reward (max health)
    Killed { reward: u32 },
}

/// Something the combat loop must react to after advancing an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyEvent {
    /// Reached its engagement threshold
    Engaged,
    /// Completed one or more attack cycles; total structure damage
    Attack(u32),
    /// Walked off the left edge while approaching
    Escaped,
    /// Death sequence finished
    Removed,
}

/// A raider instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    /// Index of the wave that spawned this enemy
    pub wave: u32,
    pub pos: Vec2,
    pub health: u32,
    pub max_health: u32,
    /// Structure damage per attack cycle
    pub attack_power: u32,
    pub walk_speed: f32,
    pub state: EnemyState,
    /// x at which the enemy stops and starts attacking
    pub threshold_x: f32,
    pub size: Vec2,
    pub hitbox_scale: f32,
    pub flies: bool,
    /// Altitude a flyer oscillates around
    pub base_y: f32,
    pub flight_time: f32,
    /// Vertical velocity while a flyer falls
    pub fall_speed: f32,
    pub attack_cycle: f32,
    pub attack_timer: f32,
    pub death_timer: f32,
    /// Pending removal at the end of the tick
    #[serde(skip)]
    pub removed: bool,
}

impl Enemy {
    /// Build an enemy of `kind` from the template. `threshold_x` is drawn by
    /// the caller once per instance.
    pub fn spawn(
        id: u32,
        kind: EnemyKind,
        wave: u32,
        pos: Vec2,
        threshold_x: f32,
        tuning: &EnemyTuning,
    ) -> Self {
        let d = kind.descriptor();
        let health = tuning.base_health.saturating_mul(d.health_mult).max(1);
        Self {
            id,
            kind,
            wave,
            pos,
            health,
            max_health: health,
            attack_power: tuning.base_attack.saturating_mul(d.attack_mult),
            walk_speed: tuning.base_speed * d.speed_mult,
            state: EnemyState::Approaching,
            threshold_x,
            size: if d.flies {
                tuning.flyer_size
            } else {
                tuning.body_size
            },
            hitbox_scale: d.hitbox_scale,
            flies: d.flies,
            base_y: pos.y,
            flight_time: 0.0,
            fall_speed: 0.0,
            attack_cycle: tuning.attack_cycle,
            attack_timer: 0.0,
            death_timer: tuning.death_duration,
            removed: false,
        }
    }

    /// Alive and not yet dying: can be hit
    pub fn is_targetable(&self) -> bool {
        !self.removed && self.state != EnemyState::Dying
    }

    pub fn is_dying(&self) -> bool {
        self.state == EnemyState::Dying
    }

    /// Shrunk collision box centred on the enemy
    pub fn hitbox(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size).scaled(self.hitbox_scale)
    }

    /// Subtract health. Enters Dying exactly once, on the blow that takes
    /// health to zero; later calls are no-ops.
    pub fn take_damage(&mut self, amount: u32) -> Damage {
        if self.removed || self.state == EnemyState::Dying {
            return Damage::Ignored;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health > 0 {
            return Damage::Wounded {
                remaining: self.health,
            };
        }
        self.state = EnemyState::Dying;
        self.fall_speed = 0.0;
        Damage::Killed {
            reward: self.max_health,
        }
    }

    /// Advance behaviour by `dt`
    pub fn advance(
        &mut self,
        dt: f32,
        tuning: &EnemyTuning,
        playfield: &PlayfieldTuning,
    ) -> Option<EnemyEvent> {
        if self.removed {
            return None;
        }
        let dt = sanitize_dt(dt);

        match self.state {
            EnemyState::Approaching => {
                self.pos.x -= self.walk_speed * dt;
                if self.flies {
                    self.flight_time += dt;
                    self.pos.y = self.base_y
                        + tuning.flyer_amplitude * (tuning.flyer_frequency * self.flight_time).sin();
                }

                if self.pos.x <= self.threshold_x {
                    if self.flies {
                        self.pos = playfield.defender + Vec2::new(tuning.flyer_engage_offset, 0.0);
                    }
                    self.state = EnemyState::Engaging;
                    self.attack_timer = 0.0;
                    return Some(EnemyEvent::Engaged);
                }

                if self.pos.x < -playfield.enemy_exit_margin {
                    self.removed = true;
                    return Some(EnemyEvent::Escaped);
                }
                None
            }

            EnemyState::Engaging => {
                self.attack_timer += dt;
                // A non-positive cycle attacks once per step
                let cycles = if self.attack_cycle > 0.0 {
                    let n = (self.attack_timer / self.attack_cycle).floor();
                    self.attack_timer -= n * self.attack_cycle;
                    n as u32
                } else {
                    self.attack_timer = 0.0;
                    1
                };
                (cycles > 0).then(|| EnemyEvent::Attack(self.attack_power.saturating_mul(cycles)))
            }

            EnemyState::Dying => {
                let done = if self.flies {
                    self.fall_speed += tuning.flyer_fall_gravity * dt;
                    self.pos.y += self.fall_speed * dt;
                    self.pos.y < -playfield.enemy_exit_margin
                } else {
                    self.death_timer -= dt;
                    self.death_timer <= 0.0
                };
                if done {
                    self.removed = true;
                    Some(EnemyEvent::Removed)
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> (EnemyTuning, PlayfieldTuning) {
        (EnemyTuning::default(), PlayfieldTuning::default())
    }

    fn basic(threshold_x: f32) -> Enemy {
        let (t, _) = tuning();
        Enemy::spawn(1, EnemyKind::Basic, 0, Vec2::new(300.0, 124.0), threshold_x, &t)
    }

    #[test]
    fn test_variant_stats() {
        let t = EnemyTuning::default();
        let at = Vec2::new(1000.0, 124.0);
        let heavy = Enemy::spawn(1, EnemyKind::Heavy, 0, at, 180.0, &t);
        assert_eq!((heavy.max_health, heavy.attack_power, heavy.walk_speed), (4, 2, 20.0));
        let elite = Enemy::spawn(2, EnemyKind::Elite, 0, at, 180.0, &t);
        assert_eq!((elite.max_health, elite.attack_power, elite.walk_speed), (6, 3, 60.0));
        let relentless = Enemy::spawn(3, EnemyKind::Relentless, 0, at, 180.0, &t);
        assert_eq!((relentless.max_health, relentless.attack_power, relentless.walk_speed), (6, 2, 40.0));
        let flyer = Enemy::spawn(4, EnemyKind::Flyer, 0, at, 180.0, &t);
        assert!(flyer.flies);
        assert_eq!(flyer.walk_speed, 100.0);
        assert_eq!(flyer.size, t.flyer_size);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(EnemyKind::parse_name("Basic"), Some(EnemyKind::Basic));
        assert_eq!(EnemyKind::parse_name(" dragon "), Some(EnemyKind::Flyer));
        assert_eq!(EnemyKind::parse_name("big_orc"), Some(EnemyKind::Heavy));
        assert_eq!(EnemyKind::parse_name("goblin"), None);
        for kind in EnemyKind::ALL {
            assert_eq!(EnemyKind::parse_name(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_approach_then_engage() {
        let (t, p) = tuning();
        let mut e = basic(290.0);
        // 20 px/s: 0.25 s moves 5 px
        assert_eq!(e.advance(0.25, &t, &p), None);
        assert_eq!(e.pos.x, 295.0);
        assert_eq!(e.advance(0.25, &t, &p), Some(EnemyEvent::Engaged));
        assert_eq!(e.state, EnemyState::Engaging);

        let x = e.pos.x;
        e.advance(0.5, &t, &p);
        assert_eq!(e.pos.x, x, "engaging enemies hold position");
    }

    #[test]
    fn test_attack_cadence() {
        let (t, p) = tuning();
        let mut e = basic(400.0);
        assert_eq!(e.advance(0.0, &t, &p), Some(EnemyEvent::Engaged));
        assert_eq!(e.advance(0.5, &t, &p), None);
        assert_eq!(e.advance(0.5, &t, &p), Some(EnemyEvent::Attack(1)));
        assert_eq!(e.advance(2.0, &t, &p), Some(EnemyEvent::Attack(2)));
    }

    #[test]
    fn test_huge_stats_saturate() {
        let t = EnemyTuning {
            base_health: 3_000_000_000,
            base_attack: 3_000_000_000,
            ..EnemyTuning::default()
        };
        let heavy = Enemy::spawn(1, EnemyKind::Heavy, 0, Vec2::new(1000.0, 124.0), 180.0, &t);
        assert_eq!(heavy.max_health, u32::MAX);
        assert_eq!(heavy.attack_power, u32::MAX);

        let (_, p) = tuning();
        let mut e = Enemy::spawn(2, EnemyKind::Basic, 0, Vec2::new(300.0, 124.0), 400.0, &t);
        e.advance(0.0, &t, &p);
        assert_eq!(e.advance(3.0, &t, &p), Some(EnemyEvent::Attack(u32::MAX)));
    }

    #[test]
    fn test_zero_attack_cycle_attacks_once_per_step() {
        let (mut t, p) = tuning();
        t.attack_cycle = 0.0;
        let mut e = basic(400.0);
        e.attack_cycle = 0.0;
        assert_eq!(e.advance(0.0, &t, &p), Some(EnemyEvent::Engaged));
        assert_eq!(e.advance(0.25, &t, &p), Some(EnemyEvent::Attack(1)));
        assert_eq!(e.advance(0.25, &t, &p), Some(EnemyEvent::Attack(1)));
    }

    #[test]
    fn test_take_damage_idempotent_once_dying() {
        let mut e = basic(100.0);
        assert_eq!(e.take_damage(1), Damage::Wounded { remaining: 1 });
        assert_eq!(e.take_damage(5), Damage::Killed { reward: 2 });
        assert_eq!(e.health, 0);
        assert!(e.is_dying());
        assert_eq!(e.take_damage(1), Damage::Ignored);
        assert_eq!(e.take_damage(0), Damage::Ignored);
        assert_eq!(e.health, 0);
    }

    #[test]
    fn test_dying_ignores_movement_and_is_removed_after_window() {
        let (t, p) = tuning();
        let mut e = basic(100.0);
        e.take_damage(10);
        let pos = e.pos;
        assert_eq!(e.advance(0.5, &t, &p), None);
        assert_eq!(e.pos, pos);
        assert_eq!(e.advance(0.5, &t, &p), Some(EnemyEvent::Removed));
        assert!(e.removed);
        assert_eq!(e.advance(1.0, &t, &p), None);
    }

    #[test]
    fn test_dying_while_engaging_stops_attacks() {
        let (t, p) = tuning();
        let mut e = basic(400.0);
        e.advance(0.0, &t, &p);
        e.take_damage(2);
        assert_eq!(e.advance(0.75, &t, &p), None);
    }

    #[test]
    fn test_escape_when_threshold_never_reached() {
        let (t, p) = tuning();
        let mut e = basic(-1000.0);
        e.pos.x = -p.enemy_exit_margin + 1.0;
        assert_eq!(e.advance(0.25, &t, &p), Some(EnemyEvent::Escaped));
        assert!(e.removed);
    }

    #[test]
    fn test_flyer_oscillates_then_hovers_by_defender() {
        let (t, p) = tuning();
        let mut f = Enemy::spawn(
            7,
            EnemyKind::Flyer,
            0,
            Vec2::new(600.0, t.flyer_altitude),
            500.0,
            &t,
        );
        f.advance(0.25, &t, &p);
        let expected = t.flyer_altitude + t.flyer_amplitude * (t.flyer_frequency * 0.25).sin();
        assert!((f.pos.y - expected).abs() < 1e-3);

        let mut engaged = false;
        for _ in 0..20 {
            if f.advance(0.25, &t, &p) == Some(EnemyEvent::Engaged) {
                engaged = true;
                break;
            }
        }
        assert!(engaged);
        assert_eq!(f.pos, p.defender + Vec2::new(t.flyer_engage_offset, 0.0));
    }

    #[test]
    fn test_dying_flyer_falls_out_of_playfield() {
        let (t, p) = tuning();
        let mut f = Enemy::spawn(7, EnemyKind::Flyer, 0, Vec2::new(600.0, 300.0), 150.0, &t);
        f.take_damage(10);
        let mut removed = false;
        let mut last_y = f.pos.y;
        for _ in 0..200 {
            match f.advance(1.0 / 60.0, &t, &p) {
                Some(EnemyEvent::Removed) => {
                    removed = true;
                    break;
                }
                _ => {
                    assert!(f.pos.y < last_y);
                    last_y = f.pos.y;
                }
            }
        }
        assert!(removed);
        assert!(f.pos.y < -p.enemy_exit_margin);
    }
}
