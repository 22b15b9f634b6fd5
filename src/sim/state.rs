//! Session state and core simulation types
//!
//! The [`Session`] owns everything a run mutates: the car, the streamed world
//! and the score counters. Nothing here is global; callers hold the session
//! and hand it to [`super::tick::tick`] once per frame.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::collision::{Footprint, TrackBounds};
use super::vehicle::VehicleState;
use super::world::WorldStream;
use crate::config::{ConfigError, SimConfig};
use crate::input::ControlInput;
use crate::levels::Course;

/// Lateral placement band (used only for placement variety)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    Left,
    Right,
    Center,
}

/// A static hazard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Center on the ground plane (`y` = world z)
    pub pos: Vec2,
    /// Width (x) and depth (z)
    pub size: Vec2,
    pub band: Band,
}

impl Obstacle {
    pub fn new(id: u32, pos: Vec2, size: Vec2, band: Band) -> Self {
        Self { id, pos, size, band }
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }
}

/// A collectible coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub pos: Vec2,
    /// Set once when collected, never cleared
    pub collected: bool,
    /// Cosmetic rotation (radians) for presentation
    pub spin: f32,
}

impl Pickup {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            collected: false,
            spin: 0.0,
        }
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Hit an obstacle
    Crashed,
    /// Left the road sideways or behind the start line
    OffTrack,
    /// Reached the far end of a finite course
    Completed,
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    /// No run started yet
    Idle,
    /// Ticks advance the simulation
    Running,
    /// Ticks are ignored
    Paused,
    /// Terminal until the next `start()`
    Ended { reason: EndReason },
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Idle => f.write_str("idle"),
            SessionMode::Running => f.write_str("running"),
            SessionMode::Paused => f.write_str("paused"),
            SessionMode::Ended { reason } => write!(f, "ended ({reason:?})"),
        }
    }
}

/// Things that happened during a tick (audio/presentation triggers)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PickupCollected { id: u32, pos: Vec2 },
    /// Car passed within the warning margin of an obstacle
    NearMiss { obstacle_id: u32 },
    Crashed { obstacle_id: u32 },
    OffTrack,
    Completed,
}

/// Car pose for rendering (`z` is the forward axis)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehiclePose {
    pub x: f32,
    pub z: f32,
    pub heading: f32,
}

/// Read-only copy of the simulation after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub mode: SessionMode,
    pub vehicle: VehiclePose,
    pub obstacles: Vec<Obstacle>,
    pub pickups: Vec<Pickup>,
    pub speed_kmh: u32,
    pub score: u64,
    pub pickups_collected: u32,
    /// Speed as a fraction of max speed, 0-1 (drives engine pitch)
    pub engine_level: f32,
    /// Events raised by this tick only
    pub events: Vec<GameEvent>,
}

/// Errors from session setup and mode changes
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot {action} while {mode}")]
    InvalidTransition {
        mode: SessionMode,
        action: &'static str,
    },
}

/// One player's game: car, world, score and mode
#[derive(Debug, Clone)]
pub struct Session {
    pub config: SimConfig,
    pub course: Course,
    /// Base seed; each run derives its own
    pub seed: u64,
    /// Runs started so far
    pub runs: u32,
    pub mode: SessionMode,
    pub vehicle: VehicleState,
    pub world: WorldStream,
    pub score: u64,
    pub pickups_collected: u32,
    /// Ticks simulated in the current run
    pub time_ticks: u64,
    /// Obstacles inside the near-miss halo as of the last tick
    pub(crate) grazing: Vec<u32>,
}

impl Session {
    /// Create an idle session; call [`Session::start`] to begin a run
    pub fn new(config: SimConfig, course: Course, seed: u64) -> Result<Self, SessionError> {
        config.validate()?;
        validate_course(&course)?;

        let world = WorldStream::new(config.world.clone(), &course, seed);
        let vehicle = VehicleState::at_spawn(&course.spawn);
        Ok(Self {
            config,
            course,
            seed,
            runs: 0,
            mode: SessionMode::Idle,
            vehicle,
            world,
            score: 0,
            pickups_collected: 0,
            time_ticks: 0,
            grazing: Vec::new(),
        })
    }

    /// Begin a fresh run (also restarts a running or paused one)
    pub fn start(&mut self) {
        let run_seed = self
            .seed
            .wrapping_add(u64::from(self.runs).wrapping_mul(2654435761));
        self.runs += 1;

        self.vehicle = VehicleState::at_spawn(&self.course.spawn);
        self.vehicle.invulnerable_ms = self.config.vehicle.spawn_grace_ms;
        self.world = WorldStream::new(self.config.world.clone(), &self.course, run_seed);
        self.world.ensure_ahead(self.vehicle.z());
        self.score = 0;
        self.pickups_collected = 0;
        self.time_ticks = 0;
        self.grazing.clear();

        let from = self.mode;
        self.mode = SessionMode::Running;
        log::info!(
            "Run {} started from {} (seed {}, {} obstacles ahead)",
            self.runs,
            from,
            run_seed,
            self.world.obstacles().len()
        );
    }

    /// Suspend ticking
    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.transition(SessionMode::Running, SessionMode::Paused, "pause")
    }

    /// Continue a paused run
    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.transition(SessionMode::Paused, SessionMode::Running, "resume")
    }

    /// Pause if running, resume if paused (pause button)
    pub fn toggle_pause(&mut self) -> Result<(), SessionError> {
        match self.mode {
            SessionMode::Paused => self.resume(),
            _ => self.pause(),
        }
    }

    fn transition(
        &mut self,
        from: SessionMode,
        to: SessionMode,
        action: &'static str,
    ) -> Result<(), SessionError> {
        if self.mode != from {
            log::debug!("Ignoring {} while {}", action, self.mode);
            return Err(SessionError::InvalidTransition {
                mode: self.mode,
                action,
            });
        }
        self.mode = to;
        Ok(())
    }

    /// Advance one frame; see [`super::tick::tick`]
    pub fn tick(&mut self, input: &ControlInput, dt_ms: f32) -> FrameSnapshot {
        super::tick::tick(self, input, dt_ms)
    }

    pub fn is_running(&self) -> bool {
        self.mode == SessionMode::Running
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        match self.mode {
            SessionMode::Ended { reason } => Some(reason),
            _ => None,
        }
    }

    /// Enter the terminal state
    pub(crate) fn end(&mut self, reason: EndReason) {
        self.mode = SessionMode::Ended { reason };
        log::info!(
            "Run {} ended: {:?} at z={:.1} (score {}, pickups {}, ticks {})",
            self.runs,
            reason,
            self.vehicle.z(),
            self.score,
            self.pickups_collected,
            self.time_ticks
        );
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.config.vehicle.width, self.config.vehicle.depth)
    }

    pub fn bounds(&self) -> TrackBounds {
        TrackBounds {
            road_width: self.course.road_width,
            road_length: self.course.road_length,
        }
    }

    /// Speed as a fraction of the configured maximum
    pub fn engine_level(&self) -> f32 {
        (self.vehicle.speed / self.config.vehicle.max_speed).clamp(0.0, 1.0)
    }

    /// Copy out the current state for presentation
    pub fn snapshot(&self, events: Vec<GameEvent>) -> FrameSnapshot {
        FrameSnapshot {
            mode: self.mode,
            vehicle: VehiclePose {
                x: self.vehicle.pos.x,
                z: self.vehicle.pos.y,
                heading: self.vehicle.heading,
            },
            obstacles: self.world.obstacles().to_vec(),
            pickups: self.world.pickups().to_vec(),
            speed_kmh: self.vehicle.speed_kmh(),
            score: self.score,
            pickups_collected: self.pickups_collected,
            engine_level: self.engine_level(),
            events,
        }
    }
}

fn validate_course(course: &Course) -> Result<(), ConfigError> {
    if !(course.road_width.is_finite() && course.road_width > 0.0) {
        return Err(ConfigError::Invalid {
            field: "course.road_width",
            reason: "must be a finite value greater than zero",
        });
    }
    if course
        .road_length
        .is_some_and(|length| !(length.is_finite() && length > 0.0))
    {
        return Err(ConfigError::Invalid {
            field: "course.road_length",
            reason: "must be a finite value greater than zero",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::Spawn;

    fn session() -> Session {
        Session::new(SimConfig::default(), Course::endless(), 42).unwrap()
    }

    #[test]
    fn test_new_session_is_idle() {
        let s = session();
        assert_eq!(s.mode, SessionMode::Idle);
        assert!(s.world.obstacles().is_empty());
        assert_eq!(s.vehicle.pos, Vec2::new(0.0, -50.0));
    }

    #[test]
    fn test_start_generates_ahead_and_resets() {
        let mut s = session();
        s.start();
        assert!(s.is_running());
        assert!(s.world.last_generated_z() >= s.vehicle.z() + s.config.world.lookahead_distance);
        assert!(!s.world.obstacles().is_empty());

        s.score = 500;
        s.pickups_collected = 3;
        s.vehicle.pos.x = 4.0;
        s.end(EndReason::Crashed);
        s.start();
        assert!(s.is_running());
        assert_eq!(s.score, 0);
        assert_eq!(s.pickups_collected, 0);
        assert_eq!(s.vehicle.pos, Vec2::new(0.0, -50.0));
        assert_eq!(s.runs, 2);
    }

    #[test]
    fn test_each_run_gets_a_new_layout() {
        let mut s = session();
        s.start();
        let first = s.world.obstacles().to_vec();
        s.start();
        assert_ne!(first, s.world.obstacles());

        // Same base seed, same first run
        let mut other = session();
        other.start();
        assert_eq!(first, other.world.obstacles());
    }

    #[test]
    fn test_pause_resume_transitions() {
        let mut s = session();
        assert!(matches!(
            s.pause(),
            Err(SessionError::InvalidTransition { mode: SessionMode::Idle, .. })
        ));
        s.start();
        s.pause().unwrap();
        assert_eq!(s.mode, SessionMode::Paused);
        assert!(s.pause().is_err());
        s.resume().unwrap();
        assert!(s.is_running());
        s.toggle_pause().unwrap();
        assert_eq!(s.mode, SessionMode::Paused);
        s.toggle_pause().unwrap();
        assert!(s.is_running());
    }

    #[test]
    fn test_transition_error_message() {
        let mut s = session();
        s.start();
        s.end(EndReason::OffTrack);
        let err = s.resume().unwrap_err();
        assert_eq!(err.to_string(), "cannot resume while ended (OffTrack)");
        assert_eq!(s.end_reason(), Some(EndReason::OffTrack));
    }

    #[test]
    fn test_spawn_grace_applied_on_start() {
        let mut config = SimConfig::default();
        config.vehicle.spawn_grace_ms = 1500.0;
        let mut s = Session::new(config, Course::endless(), 1).unwrap();
        s.start();
        assert!(s.vehicle.is_invulnerable());
    }

    #[test]
    fn test_rejects_bad_course() {
        let course = Course {
            road_width: 0.0,
            road_length: None,
            spawn: Spawn::new(0.0, 0.0, 0.0),
            obstacles: Vec::new(),
        };
        let err = Session::new(SimConfig::default(), course, 0).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Config(ConfigError::Invalid {
                field: "course.road_width",
                ..
            })
        ));
    }

    #[test]
    fn test_snapshot_copies_state() {
        let mut s = session();
        s.start();
        let snap = s.snapshot(Vec::new());
        assert_eq!(snap.mode, SessionMode::Running);
        assert_eq!(snap.vehicle.z, -50.0);
        assert_eq!(snap.obstacles.len(), s.world.obstacles().len());
        assert_eq!(snap.engine_level, 0.0);
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"Running\""));
    }
}
