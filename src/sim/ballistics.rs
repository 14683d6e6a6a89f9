//! Projectile flight under gravity
//!
//! Integration is semi-implicit Euler: velocity first, then position with the
//! updated velocity. A projectile that reaches the ground line is frozen there.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::ledger::AmmoKind;
use crate::sanitize_dt;
use crate::tuning::{BallisticsTuning, PlayfieldTuning};

/// Result of advancing a projectile by one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flight {
    /// Still airborne
    Airborne,
    /// Touched the ground this step at the given point
    Landed(Vec2),
    /// Lying on the ground, fading out
    Grounded,
    /// Fade finished, ready for removal
    Expired,
    /// Left the playfield plus margin
    OutOfBounds,
}

/// Playfield bounds used to cull projectiles
#[derive(Debug, Clone, Copy)]
pub struct FlightBounds {
    pub min: Vec2,
    pub max: Vec2,
    pub ground_y: f32,
}

impl FlightBounds {
    pub fn from_tuning(playfield: &PlayfieldTuning) -> Self {
        let margin = Vec2::splat(playfield.projectile_margin);
        Self {
            min: -margin,
            max: Vec2::new(playfield.width, playfield.height) + margin,
            ground_y: playfield.ground_y,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Launch speed for a charge duration.
///
/// Ease-in over `[min_speed, max_speed]`: a half charge gives a quarter of the
/// extra speed, so full draws pay off disproportionately.
pub fn launch_speed(charge: f32, tuning: &BallisticsTuning) -> f32 {
    let max_charge = tuning.max_charge_time.max(f32::EPSILON);
    let t = charge.clamp(0.0, max_charge) / max_charge;
    tuning.min_speed + (tuning.max_speed - tuning.min_speed) * crate::ease_in_quad(t)
}

/// Charge duration needed to reach `speed` (inverse of [`launch_speed`])
pub fn charge_for_speed(speed: f32, tuning: &BallisticsTuning) -> f32 {
    let span = tuning.max_speed - tuning.min_speed;
    if span <= 0.0 {
        return 0.0;
    }
    let t = ((speed - tuning.min_speed) / span).clamp(0.0, 1.0).sqrt();
    t * tuning.max_charge_time
}

/// A projectile in flight or lying on the ground
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    /// Stock the shot was taken from
    pub kind: AmmoKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Constant vertical acceleration for this shot
    pub gravity: f32,
    pub launch_speed: f32,
    pub explosive: bool,
    /// Zero unless explosive
    pub splash_radius: f32,
    pub landed: bool,
    /// Seconds left before a landed projectile disappears
    pub fade: f32,
    /// Visual footprint
    pub size: Vec2,
    pub hitbox_scale: f32,
    /// Pending removal at the end of the tick
    #[serde(skip)]
    pub removed: bool,
}

impl Projectile {
    /// Create a projectile leaving `origin` at `angle` (radians, 0 = right,
    /// counter-clockwise) with the given speed.
    pub fn launch(
        id: u32,
        kind: AmmoKind,
        origin: Vec2,
        angle: f32,
        speed: f32,
        tuning: &BallisticsTuning,
    ) -> Self {
        let explosive = kind == AmmoKind::Explosive;
        Self {
            id,
            kind,
            pos: origin,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            gravity: tuning.gravity,
            launch_speed: speed,
            explosive,
            splash_radius: if explosive { tuning.splash_radius } else { 0.0 },
            landed: false,
            fade: tuning.landed_fade,
            size: if explosive {
                tuning.bomb_size
            } else {
                tuning.arrow_size
            },
            hitbox_scale: tuning.hitbox_scale,
            removed: false,
        }
    }

    /// Advance by `dt` seconds
    pub fn advance(&mut self, dt: f32, bounds: &FlightBounds) -> Flight {
        let dt = sanitize_dt(dt);

        if self.landed {
            self.fade -= dt;
            return if self.fade <= 0.0 {
                Flight::Expired
            } else {
                Flight::Grounded
            };
        }

        self.vel.y += self.gravity * dt;
        self.pos += self.vel * dt;

        if self.pos.y <= bounds.ground_y {
            self.pos.y = bounds.ground_y;
            self.vel = Vec2::ZERO;
            self.landed = true;
            return Flight::Landed(self.pos);
        }

        if !bounds.contains(self.pos) {
            return Flight::OutOfBounds;
        }

        Flight::Airborne
    }

    /// Shrunk collision box centred on the projectile
    pub fn hitbox(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size).scaled(self.hitbox_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bounds() -> FlightBounds {
        FlightBounds::from_tuning(&PlayfieldTuning::default())
    }

    fn arrow(vel: Vec2) -> Projectile {
        let tuning = BallisticsTuning::default();
        let mut p = Projectile::launch(1, AmmoKind::Normal, Vec2::new(200.0, 300.0), 0.0, 0.0, &tuning);
        p.vel = vel;
        p
    }

    #[test]
    fn test_launch_speed_endpoints() {
        let t = BallisticsTuning::default();
        assert_eq!(launch_speed(0.0, &t), t.min_speed);
        assert_eq!(launch_speed(t.max_charge_time, &t), t.max_speed);
        assert_eq!(launch_speed(-3.0, &t), t.min_speed);
        assert_eq!(launch_speed(t.max_charge_time * 4.0, &t), t.max_speed);
    }

    #[test]
    fn test_half_charge_is_quarter_extra_speed() {
        let t = BallisticsTuning::default();
        let half = launch_speed(t.max_charge_time / 2.0, &t);
        let expected = t.min_speed + (t.max_speed - t.min_speed) * 0.25;
        assert!((half - expected).abs() < 1e-3);
    }

    #[test]
    fn test_charge_for_speed_inverts_launch_speed() {
        let t = BallisticsTuning::default();
        for charge in [0.0, 0.3, 0.75, 1.2, 1.5] {
            let speed = launch_speed(charge, &t);
            assert!((charge_for_speed(speed, &t) - charge).abs() < 1e-3);
        }
    }

    #[test]
    fn test_launch_direction() {
        let t = BallisticsTuning::default();
        let p = Projectile::launch(1, AmmoKind::Normal, Vec2::ZERO, std::f32::consts::FRAC_PI_2, 300.0, &t);
        assert!(p.vel.x.abs() < 1e-3);
        assert!((p.vel.y - 300.0).abs() < 1e-3);
        assert!(!p.explosive);
        assert_eq!(p.splash_radius, 0.0);

        let bomb = Projectile::launch(2, AmmoKind::Explosive, Vec2::ZERO, 0.0, 300.0, &t);
        assert!(bomb.explosive);
        assert_eq!(bomb.splash_radius, t.splash_radius);
    }

    #[test]
    fn test_advance_integrates_velocity_then_position() {
        let mut p = arrow(Vec2::new(100.0, 50.0));
        let dt = 0.1;
        let g = p.gravity;
        let flight = p.advance(dt, &bounds());
        assert_eq!(flight, Flight::Airborne);
        let vy = 50.0 + g * dt;
        assert_eq!(p.vel.y, vy);
        assert_eq!(p.pos.y, 300.0 + vy * dt);
        assert_eq!(p.pos.x, 200.0 + 100.0 * dt);
    }

    #[test]
    fn test_negative_dt_is_zero() {
        let mut p = arrow(Vec2::new(100.0, 50.0));
        let before = (p.pos, p.vel);
        assert_eq!(p.advance(-1.0, &bounds()), Flight::Airborne);
        assert_eq!((p.pos, p.vel), before);
    }

    #[test]
    fn test_ground_impact_freezes_projectile() {
        let b = bounds();
        let mut p = arrow(Vec2::new(50.0, -400.0));
        let mut landed_at = None;
        for _ in 0..120 {
            if let Flight::Landed(at) = p.advance(1.0 / 60.0, &b) {
                landed_at = Some(at);
                break;
            }
        }
        let at = landed_at.expect("projectile should land");
        assert_eq!(at.y, b.ground_y);
        assert!(p.landed);
        assert_eq!(p.vel, Vec2::ZERO);

        let frozen = p.pos;
        assert_eq!(p.advance(0.1, &b), Flight::Grounded);
        assert_eq!(p.pos, frozen);
        assert_eq!(p.advance(1.0, &b), Flight::Expired);
        assert_eq!(p.pos, frozen);
    }

    #[test]
    fn test_out_of_bounds() {
        let b = bounds();
        let mut p = arrow(Vec2::new(5000.0, 0.0));
        p.gravity = 0.0;
        assert_eq!(p.advance(1.0, &b), Flight::OutOfBounds);
    }

    #[test]
    fn test_hitbox_is_shrunk_footprint() {
        let p = arrow(Vec2::ZERO);
        let hb = p.hitbox();
        assert!((hb.size().x - p.size.x * 0.7).abs() < 1e-4);
        assert!((hb.size().y - p.size.y * 0.7).abs() < 1e-4);
        assert_eq!(hb.center(), p.pos);
    }

    proptest! {
        #[test]
        fn prop_launch_speed_monotonic(a in 0.0f32..3.0, b in 0.0f32..3.0) {
            let t = BallisticsTuning::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let s_lo = launch_speed(lo, &t);
            let s_hi = launch_speed(hi, &t);
            prop_assert!(s_lo <= s_hi);
            prop_assert!(s_lo >= t.min_speed && s_hi <= t.max_speed);
        }

        #[test]
        fn prop_airborne_step_is_exact(
            vx in -300.0f32..300.0,
            vy in 0.0f32..300.0,
            dt in 0.0f32..0.05,
        ) {
            let mut p = arrow(Vec2::new(vx, vy));
            let (x0, y0, g) = (p.pos.x, p.pos.y, p.gravity);
            if p.advance(dt, &bounds()) == Flight::Airborne {
                let vy1 = vy + g * dt;
                prop_assert_eq!(p.vel.y, vy1);
                prop_assert_eq!(p.pos.y, y0 + vy1 * dt);
                prop_assert_eq!(p.pos.x, x0 + vx * dt);
            }
        }
    }
}
