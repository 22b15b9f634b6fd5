//! Per-frame simulation tick
//!
//! Stage order inside a tick is fixed and load-bearing:
//!
//! 1. integrate the car
//! 2. obstacle collision, then track containment (completion before exit)
//! 3. score and pickup collection
//! 4. near-miss warning for each obstacle newly inside the halo
//! 5. world streaming: generate ahead, then retire behind
//!
//! Retiring only happens after the collision test has been consumed, so an
//! obstacle is never pruned in the same tick it was tested against.

use super::collision::{TrackStatus, first_obstacle_hit, grazed_obstacles, track_status};
use super::state::{EndReason, FrameSnapshot, GameEvent, Session, SessionMode};
use super::vehicle::{integrate, sanitize_dt};
use crate::input::ControlInput;

/// Advance a running session by one frame of `dt_ms` milliseconds
///
/// Outside `Running`, or when `dt_ms` sanitizes to zero, nothing changes and
/// the current state is returned.
pub fn tick(session: &mut Session, input: &ControlInput, dt_ms: f32) -> FrameSnapshot {
    if session.mode != SessionMode::Running {
        return session.snapshot(Vec::new());
    }

    let dt_ms = sanitize_dt(dt_ms, session.config.vehicle.max_frame_ms);
    // Zero-length frame: nothing moves, nothing scores
    if dt_ms == 0.0 {
        return session.snapshot(Vec::new());
    }
    let mut events = Vec::new();
    session.time_ticks += 1;

    session.vehicle = integrate(&session.vehicle, input, dt_ms, &session.config.vehicle);
    let footprint = session.footprint();

    let hit = if session.vehicle.is_invulnerable() {
        None
    } else {
        first_obstacle_hit(&session.vehicle, &footprint, session.world.obstacles()).map(|o| o.id)
    };
    if let Some(obstacle_id) = hit {
        events.push(GameEvent::Crashed { obstacle_id });
        session.end(EndReason::Crashed);
        return session.snapshot(events);
    }

    match track_status(session.vehicle.pos, &session.bounds()) {
        TrackStatus::OnTrack => {}
        TrackStatus::Completed => {
            events.push(GameEvent::Completed);
            session.end(EndReason::Completed);
            return session.snapshot(events);
        }
        TrackStatus::OffTrack => {
            events.push(GameEvent::OffTrack);
            session.end(EndReason::OffTrack);
            return session.snapshot(events);
        }
    }

    // Distance score
    let kmh = session.vehicle.speed_kmh() as f32;
    session.score += (kmh / session.config.scoring.kmh_divisor).round() as u64;

    for (id, pos) in session.world.collect_touching(&session.vehicle, &footprint) {
        session.pickups_collected += 1;
        session.score += session.config.scoring.pickup_bonus;
        events.push(GameEvent::PickupCollected { id, pos });
    }

    let grazed: Vec<u32> = grazed_obstacles(
        &session.vehicle,
        &footprint,
        session.config.scoring.near_miss_margin,
        session.world.obstacles(),
    )
    .iter()
    .map(|o| o.id)
    .collect();
    for &obstacle_id in &grazed {
        if !session.grazing.contains(&obstacle_id) {
            events.push(GameEvent::NearMiss { obstacle_id });
        }
    }
    session.grazing = grazed;

    let z = session.vehicle.z();
    session.world.ensure_ahead(z);
    session.world.retire_behind(z);
    session.world.spin_pickups(dt_ms);

    session.snapshot(events)
}
