//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame time, clamped per tick
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;
pub mod vehicle;
pub mod world;

pub use collision::{Footprint, TrackBounds, TrackStatus, box_overlaps, track_status};
pub use state::{
    Band, EndReason, FrameSnapshot, GameEvent, Obstacle, Pickup, Session, SessionError,
    SessionMode, VehiclePose,
};
pub use tick::tick;
pub use vehicle::{VehicleState, integrate};
pub use world::WorldStream;
