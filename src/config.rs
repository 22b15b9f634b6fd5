//! Simulation tuning
//!
//! Every tunable the core reads lives here. Values are fixed for the lifetime
//! of a session; the core never writes to them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating a [`SimConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Vehicle handling constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    pub engine_power: f32,
    pub brake_power: f32,
    /// Heading change at full steer and full authority (rad/s)
    pub steer_rate: f32,
    /// Steering authority at standstill
    pub steer_base_authority: f32,
    /// Authority gained per m/s
    pub steer_authority_gain: f32,
    /// Multiplicative velocity decay applied once per tick
    pub friction: f32,
    pub max_speed: f32,
    pub width: f32,
    pub depth: f32,
    /// Frames longer than this are simulated as this long (ms)
    pub max_frame_ms: f32,
    /// Obstacle immunity after spawning (ms)
    pub spawn_grace_ms: f32,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            engine_power: ENGINE_POWER,
            brake_power: BRAKE_POWER,
            steer_rate: STEER_RATE,
            steer_base_authority: STEER_BASE_AUTHORITY,
            steer_authority_gain: STEER_AUTHORITY_GAIN,
            friction: FRICTION,
            max_speed: MAX_SPEED,
            width: VEHICLE_WIDTH,
            depth: VEHICLE_DEPTH,
            max_frame_ms: MAX_FRAME_MS,
            spawn_grace_ms: 0.0,
        }
    }
}

/// Procedural world streaming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldParams {
    pub segment_length: f32,
    pub lookahead_distance: f32,
    pub cleanup_distance: f32,
    pub generation_backset: f32,
    pub spawn_clearance: f32,
    pub obstacle_density: f32,
    pub obstacle_band_offset: f32,
    pub pickup_band_offset: f32,
    pub pickup_spacing: f32,
    pub pickup_radius: f32,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            segment_length: SEGMENT_LENGTH,
            lookahead_distance: LOOKAHEAD_DISTANCE,
            cleanup_distance: CLEANUP_DISTANCE,
            generation_backset: GENERATION_BACKSET,
            spawn_clearance: SPAWN_CLEARANCE,
            obstacle_density: OBSTACLE_DENSITY,
            obstacle_band_offset: OBSTACLE_BAND_OFFSET,
            pickup_band_offset: PICKUP_BAND_OFFSET,
            pickup_spacing: PICKUP_SPACING,
            pickup_radius: PICKUP_RADIUS,
        }
    }
}

/// Score rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    pub pickup_bonus: u64,
    pub kmh_divisor: f32,
    pub near_miss_margin: f32,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            pickup_bonus: PICKUP_BONUS,
            kmh_divisor: SCORE_KMH_DIVISOR,
            near_miss_margin: NEAR_MISS_MARGIN,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub vehicle: VehicleParams,
    pub world: WorldParams,
    pub scoring: ScoringParams,
}

impl SimConfig {
    /// Parse a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        log::info!(
            "Loaded sim config (max speed {}, density {})",
            config.vehicle.max_speed,
            config.world.obstacle_density
        );
        Ok(config)
    }

    /// Serialize to pretty JSON (for shipping a tuning file)
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would stall or destabilize the simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.vehicle;
        positive("vehicle.engine_power", v.engine_power)?;
        non_negative("vehicle.brake_power", v.brake_power)?;
        non_negative("vehicle.steer_rate", v.steer_rate)?;
        non_negative("vehicle.steer_base_authority", v.steer_base_authority)?;
        non_negative("vehicle.steer_authority_gain", v.steer_authority_gain)?;
        if !(v.friction > 0.0 && v.friction <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "vehicle.friction",
                reason: "must be in (0, 1]",
            });
        }
        positive("vehicle.max_speed", v.max_speed)?;
        positive("vehicle.width", v.width)?;
        positive("vehicle.depth", v.depth)?;
        positive("vehicle.max_frame_ms", v.max_frame_ms)?;
        non_negative("vehicle.spawn_grace_ms", v.spawn_grace_ms)?;

        let w = &self.world;
        // Zero would make the stream loop forever
        positive("world.segment_length", w.segment_length)?;
        non_negative("world.lookahead_distance", w.lookahead_distance)?;
        non_negative("world.cleanup_distance", w.cleanup_distance)?;
        non_negative("world.generation_backset", w.generation_backset)?;
        non_negative("world.spawn_clearance", w.spawn_clearance)?;
        non_negative("world.obstacle_density", w.obstacle_density)?;
        non_negative("world.obstacle_band_offset", w.obstacle_band_offset)?;
        non_negative("world.pickup_band_offset", w.pickup_band_offset)?;
        positive("world.pickup_spacing", w.pickup_spacing)?;
        non_negative("world.pickup_radius", w.pickup_radius)?;

        positive("scoring.kmh_divisor", self.scoring.kmh_divisor)?;
        non_negative("scoring.near_miss_margin", self.scoring.near_miss_margin)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be a finite value greater than zero",
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be a finite value of zero or more",
        })
    }
}
