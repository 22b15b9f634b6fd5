//! Vehicle integrator
//!
//! Arcade kinematics: thrust along the heading, speed-scaled steering,
//! per-tick friction and a hard speed cap. No tire or suspension model.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::VehicleParams;
use crate::input::ControlInput;
use crate::levels::Spawn;
use crate::{clamp_finite, heading_dir, speed_to_kmh};

/// Kinematic state of the player's car
///
/// `pos.y` / `vel.y` carry the world forward axis (z).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Radians, 0 = +z
    pub heading: f32,
    /// Always `vel.length()`, except exactly `max_speed` right after a clamp
    pub speed: f32,
    /// Remaining obstacle immunity (ms)
    #[serde(default)]
    pub invulnerable_ms: f32,
}

impl VehicleState {
    /// Stationary car at the spawn point
    pub fn at_spawn(spawn: &Spawn) -> Self {
        let finite = |v: f32| if v.is_finite() { v } else { 0.0 };
        Self {
            pos: Vec2::new(finite(spawn.x), finite(spawn.z)),
            vel: Vec2::ZERO,
            heading: finite(spawn.heading),
            speed: 0.0,
            invulnerable_ms: 0.0,
        }
    }

    /// World forward-axis position
    #[inline]
    pub fn z(&self) -> f32 {
        self.pos.y
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ms > 0.0
    }

    pub fn speed_kmh(&self) -> u32 {
        speed_to_kmh(self.speed)
    }
}

/// Clamp a frame delta to `[0, max_ms]`; NaN and negatives become 0
#[inline]
pub fn sanitize_dt(dt_ms: f32, max_ms: f32) -> f32 {
    clamp_finite(dt_ms, 0.0, max_ms.max(0.0))
}

/// Steering authority: reduced near standstill, full once moving
#[inline]
pub fn steer_authority(speed: f32, params: &VehicleParams) -> f32 {
    (params.steer_base_authority + speed * params.steer_authority_gain).min(1.0)
}

/// Advance the vehicle by one tick
///
/// `dt_ms` is the frame time in milliseconds. The friction decay is applied
/// once per call regardless of `dt_ms`, so damping depends on tick rate.
pub fn integrate(
    state: &VehicleState,
    input: &ControlInput,
    dt_ms: f32,
    params: &VehicleParams,
) -> VehicleState {
    let dt_ms = sanitize_dt(dt_ms, params.max_frame_ms);
    if dt_ms == 0.0 {
        return *state;
    }
    let dt = dt_ms * 0.001;
    let input = input.sanitized();
    let mut next = *state;

    // Thrust / brake along the current heading
    let forward = (input.accelerate * params.engine_power - input.brake * params.brake_power) * dt;
    next.vel += heading_dir(next.heading) * forward;

    next.speed = next.vel.length();
    next.heading += input.steer * params.steer_rate * dt * steer_authority(next.speed, params);

    next.pos += next.vel * dt;

    next.vel *= params.friction;
    next.speed = next.vel.length();

    if next.speed > params.max_speed {
        next.vel *= params.max_speed / next.speed;
        next.speed = params.max_speed;
    }

    next.invulnerable_ms = (next.invulnerable_ms - dt_ms).max(0.0);
    next
}
