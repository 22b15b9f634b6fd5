//! Endless Drive - simulation core for an endless arcade driving game
//!
//! Core modules:
//! - `sim`: Simulation (vehicle integrator, collisions, world stream, session)
//! - `config`: Load-time tuning with validation
//! - `input`: Input sources (keyboard, touch, tilt) behind one trait
//! - `levels`: Endless course and the finite preset levels
//! - `audio`: Engine tone and one-shot cue contract for the audio layer
//!
//! Rendering, sound synthesis and event capture live outside this crate and
//! talk to it through [`sim::FrameSnapshot`] and [`input::ControlInput`].

pub mod audio;
pub mod config;
pub mod input;
pub mod levels;
pub mod sim;

pub use config::{ConfigError, SimConfig};
pub use input::{ControlInput, InputSource};
pub use levels::Course;
pub use sim::{EndReason, FrameSnapshot, Session, SessionError, SessionMode};

use glam::Vec2;

/// Default tuning constants (mirrors the shipped arcade feel)
pub mod consts {
    /// Longest frame the integrator will simulate in one tick (ms)
    pub const MAX_FRAME_MS: f32 = 50.0;

    /// Vehicle forward acceleration (m/s²)
    pub const ENGINE_POWER: f32 = 280.0;
    /// Vehicle braking deceleration (m/s²)
    pub const BRAKE_POWER: f32 = 320.0;
    /// Full-authority steering rate (rad/s)
    pub const STEER_RATE: f32 = 4.2;
    /// Steering authority when stationary
    pub const STEER_BASE_AUTHORITY: f32 = 0.4;
    /// Authority gained per m/s of speed (full authority at 2.4 m/s)
    pub const STEER_AUTHORITY_GAIN: f32 = 0.25;
    /// Per-tick velocity decay
    pub const FRICTION: f32 = 0.98;
    /// Speed cap (m/s)
    pub const MAX_SPEED: f32 = 45.0;
    /// Vehicle footprint
    pub const VEHICLE_WIDTH: f32 = 1.8;
    pub const VEHICLE_DEPTH: f32 = 3.5;

    /// Endless road width
    pub const ROAD_WIDTH: f32 = 12.0;

    /// World streaming
    pub const SEGMENT_LENGTH: f32 = 100.0;
    pub const LOOKAHEAD_DISTANCE: f32 = 50.0;
    pub const CLEANUP_DISTANCE: f32 = 50.0;
    /// First segment starts this far behind the spawn point
    pub const GENERATION_BACKSET: f32 = 50.0;
    /// No obstacles are placed this close (along z) to the spawn point
    pub const SPAWN_CLEARANCE: f32 = 15.0;
    /// Obstacles per unit of forward distance
    pub const OBSTACLE_DENSITY: f32 = 0.08;
    /// Lateral band centers as a fraction of road width
    pub const OBSTACLE_BAND_OFFSET: f32 = 0.25;
    pub const PICKUP_BAND_OFFSET: f32 = 0.3;
    /// Distance between pickup clusters
    pub const PICKUP_SPACING: f32 = 20.0;
    /// Pickup collision radius
    pub const PICKUP_RADIUS: f32 = 0.5;

    /// Score bonus per pickup
    pub const PICKUP_BONUS: u64 = 100;
    /// Per-tick score is round(speed_kmh / SCORE_KMH_DIVISOR)
    pub const SCORE_KMH_DIVISOR: f32 = 10.0;
    /// Footprint growth used for the near-miss warning
    pub const NEAR_MISS_MARGIN: f32 = 1.0;
}

/// Unit forward vector for a heading (0 = +z, positive turns toward +x)
#[inline]
pub fn heading_dir(heading: f32) -> Vec2 {
    Vec2::new(heading.sin(), heading.cos())
}

/// Convert m/s to whole km/h
#[inline]
pub fn speed_to_kmh(speed: f32) -> u32 {
    (speed * 3.6).round().max(0.0) as u32
}

/// Replace NaN with zero and clamp into `[min, max]`
#[inline]
pub(crate) fn clamp_finite(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() { 0.0_f32.clamp(min, max) } else { value.clamp(min, max) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_heading_dir() {
        let fwd = heading_dir(0.0);
        assert!(fwd.x.abs() < 1e-6);
        assert!((fwd.y - 1.0).abs() < 1e-6);

        let right = heading_dir(FRAC_PI_2);
        assert!((right.x - 1.0).abs() < 1e-6);
        assert!(right.y.abs() < 1e-6);
    }

    #[test]
    fn test_speed_to_kmh() {
        assert_eq!(speed_to_kmh(0.0), 0);
        assert_eq!(speed_to_kmh(10.0), 36);
        assert_eq!(speed_to_kmh(45.0), 162);
    }

    #[test]
    fn test_clamp_finite() {
        assert_eq!(clamp_finite(f32::NAN, -1.0, 1.0), 0.0);
        assert_eq!(clamp_finite(3.0, -1.0, 1.0), 1.0);
        assert_eq!(clamp_finite(f32::NEG_INFINITY, 0.0, 1.0), 0.0);
    }
}
