//! Raid Defense - castle defense combat core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ballistics, collisions, enemies, waves)
//! - `tuning`: Data-driven game balance
//! - `error`: Configuration loading errors

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one sprite frame every 6 ticks)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Playfield dimensions (y-up, origin bottom-left)
    pub const PLAYFIELD_WIDTH: f32 = 960.0;
    pub const PLAYFIELD_HEIGHT: f32 = 540.0;
    /// Height of the ground line projectiles land on
    pub const GROUND_Y: f32 = 100.0;
}

/// Quadratic ease-in over `[0, 1]`
#[inline]
pub fn ease_in_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Clamp a frame delta to a usable timestep (negative and NaN become zero)
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_nan() { 0.0 } else { dt.max(0.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_in_quad_endpoints() {
        assert_eq!(ease_in_quad(0.0), 0.0);
        assert_eq!(ease_in_quad(1.0), 1.0);
        assert_eq!(ease_in_quad(0.5), 0.25);
        assert_eq!(ease_in_quad(2.0), 1.0);
    }

    #[test]
    fn test_sanitize_dt() {
        assert_eq!(sanitize_dt(-0.5), 0.0);
        assert_eq!(sanitize_dt(f32::NAN), 0.0);
        assert_eq!(sanitize_dt(0.25), 0.25);
    }
}
