//! Collision and containment tests
//!
//! The car is an oriented rectangle; obstacles are axis-aligned rectangles.
//! Overlap is a separating-axis test on the car's two local axes only, which
//! is slightly generous on diagonal approaches but matches how the game has
//! always felt. Everything here is a pure predicate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Obstacle, Pickup};
use super::vehicle::VehicleState;

/// Rectangular collision extent of the car
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: f32,
    pub depth: f32,
}

impl Footprint {
    pub fn new(width: f32, depth: f32) -> Self {
        Self { width, depth }
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.depth / 2.0)
    }

    /// Footprint grown by `margin` on every side
    pub fn inflated(&self, margin: f32) -> Self {
        Self {
            width: self.width + margin * 2.0,
            depth: self.depth + margin * 2.0,
        }
    }
}

/// Road limits the car must stay within
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackBounds {
    pub road_width: f32,
    /// Finite tracks run from `-length/2` to `length/2`
    pub road_length: Option<f32>,
}

/// Result of the containment test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackStatus {
    OnTrack,
    /// Left the road sideways, or backed out behind the start line
    OffTrack,
    /// Reached the far end of a finite track
    Completed,
}

/// Oriented car box vs axis-aligned obstacle box
///
/// The obstacle center is moved into the car's local frame and its half
/// extents are projected onto the car's axes.
pub fn box_overlaps(
    car_pos: Vec2,
    heading: f32,
    car_half: Vec2,
    obstacle_pos: Vec2,
    obstacle_half: Vec2,
) -> bool {
    let (sin, cos) = heading.sin_cos();
    let d = obstacle_pos - car_pos;

    let local_x = d.x * cos + d.y * sin;
    let local_z = -d.x * sin + d.y * cos;

    let (ow, od) = (obstacle_half.x, obstacle_half.y);
    let proj_w = (ow * cos).abs() + (od * sin).abs();
    let proj_d = (ow * sin).abs() + (od * cos).abs();

    local_x.abs() < car_half.x + proj_w && local_z.abs() < car_half.y + proj_d
}

/// Does the car overlap this obstacle?
#[inline]
pub fn vehicle_hits_obstacle(car: &VehicleState, footprint: &Footprint, obstacle: &Obstacle) -> bool {
    box_overlaps(
        car.pos,
        car.heading,
        footprint.half_extents(),
        obstacle.pos,
        obstacle.half_extents(),
    )
}

/// First obstacle the car overlaps (stops at the first hit)
pub fn first_obstacle_hit<'a>(
    car: &VehicleState,
    footprint: &Footprint,
    obstacles: &'a [Obstacle],
) -> Option<&'a Obstacle> {
    obstacles
        .iter()
        .find(|o| vehicle_hits_obstacle(car, footprint, o))
}

pub fn hits_any_obstacle(car: &VehicleState, footprint: &Footprint, obstacles: &[Obstacle]) -> bool {
    first_obstacle_hit(car, footprint, obstacles).is_some()
}

/// First obstacle inside the `margin` halo around the car that the car
/// itself does not touch
pub fn near_miss<'a>(
    car: &VehicleState,
    footprint: &Footprint,
    margin: f32,
    obstacles: &'a [Obstacle],
) -> Option<&'a Obstacle> {
    let halo = footprint.inflated(margin);
    obstacles.iter().find(|o| grazes(car, footprint, &halo, o))
}

/// Every obstacle inside the `margin` halo that the car does not touch,
/// in list order
pub fn grazed_obstacles<'a>(
    car: &VehicleState,
    footprint: &Footprint,
    margin: f32,
    obstacles: &'a [Obstacle],
) -> Vec<&'a Obstacle> {
    let halo = footprint.inflated(margin);
    obstacles
        .iter()
        .filter(|o| grazes(car, footprint, &halo, o))
        .collect()
}

#[inline]
fn grazes(car: &VehicleState, footprint: &Footprint, halo: &Footprint, obstacle: &Obstacle) -> bool {
    vehicle_hits_obstacle(car, halo, obstacle) && !vehicle_hits_obstacle(car, footprint, obstacle)
}

/// Circular proximity test; collected pickups never match
pub fn touches_pickup(car: &VehicleState, footprint: &Footprint, pickup: &Pickup, radius: f32) -> bool {
    if pickup.collected {
        return false;
    }
    car.pos.distance(pickup.pos) < footprint.width / 2.0 + radius
}

/// Where the car is relative to the road
///
/// Completion is tested before the exit test so that reaching the far end of
/// a finite track is never reported as leaving it.
pub fn track_status(pos: Vec2, bounds: &TrackBounds) -> TrackStatus {
    let half_length = bounds.road_length.map(|l| l / 2.0);

    if half_length.is_some_and(|hl| pos.y >= hl) {
        return TrackStatus::Completed;
    }

    let off_side = pos.x.abs() > bounds.road_width / 2.0;
    let behind_start = half_length.is_some_and(|hl| pos.y < -hl);
    if off_side || behind_start {
        TrackStatus::OffTrack
    } else {
        TrackStatus::OnTrack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Band;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn car_at(x: f32, z: f32, heading: f32) -> VehicleState {
        VehicleState::at_spawn(&crate::levels::Spawn::new(x, z, heading))
    }

    fn footprint() -> Footprint {
        Footprint::new(1.8, 3.5)
    }

    fn obstacle(x: f32, z: f32) -> Obstacle {
        Obstacle::new(1, Vec2::new(x, z), Vec2::new(2.0, 2.0), Band::Center)
    }

    #[test]
    fn test_head_on_overlap() {
        let car = car_at(0.0, 0.0, 0.0);
        // half depth 1.75 + obstacle half 1.0 = 2.75
        assert!(vehicle_hits_obstacle(&car, &footprint(), &obstacle(0.0, 2.7)));
        assert!(!vehicle_hits_obstacle(&car, &footprint(), &obstacle(0.0, 2.8)));
    }

    #[test]
    fn test_sideways_car_uses_rotated_extents() {
        // Turned 90°: the long axis now lies along x
        let car = car_at(0.0, 0.0, FRAC_PI_2);
        assert!(vehicle_hits_obstacle(&car, &footprint(), &obstacle(2.7, 0.0)));
        assert!(!vehicle_hits_obstacle(&car, &footprint(), &obstacle(0.0, 2.7)));
        assert!(vehicle_hits_obstacle(&car, &footprint(), &obstacle(0.0, 1.8)));
    }

    #[test]
    fn test_diagonal_projection() {
        let car = car_at(0.0, 0.0, FRAC_PI_4);
        // Obstacle half extents project to 2·(1·0.7071) ≈ 1.414 on each local axis
        let o = obstacle(0.0, 3.0);
        // local_z = 3·cos45 ≈ 2.121 < 1.75 + 1.414; local_x ≈ 2.121 < 0.9 + 1.414
        assert!(vehicle_hits_obstacle(&car, &footprint(), &o));
        let far = obstacle(0.0, 4.0);
        // local_x ≈ 2.828 > 2.314
        assert!(!vehicle_hits_obstacle(&car, &footprint(), &far));
    }

    #[test]
    fn test_half_turn_symmetry() {
        // Rotating the car by 180° and mirroring the obstacle through the car
        // center must not change the outcome
        let cases = [
            (0.0, Vec2::new(0.0, 2.0), true),
            (0.3, Vec2::new(1.0, 2.0), true),
            (1.2, Vec2::new(-2.0, 0.5), true),
            (-0.7, Vec2::new(3.5, -1.0), false),
            (2.0, Vec2::new(0.0, 6.0), false),
            (FRAC_PI_4, Vec2::new(-4.0, -4.0), false),
        ];
        let half = footprint().half_extents();
        let ob = Vec2::new(1.0, 1.0);
        for (heading, offset, expected) in cases {
            let base = Vec2::new(5.0, -3.0);
            let a = box_overlaps(base, heading, half, base + offset, ob);
            let b = box_overlaps(base, heading + PI, half, base - offset, ob);
            assert_eq!(a, expected, "heading {heading} offset {offset}");
            assert_eq!(a, b, "heading {heading} offset {offset}");
        }
    }

    #[test]
    fn test_first_hit_short_circuits_in_order() {
        let car = car_at(0.0, 0.0, 0.0);
        let mut a = obstacle(0.0, 1.0);
        a.id = 7;
        let mut b = obstacle(0.5, -1.0);
        b.id = 8;
        let list = [obstacle(5.0, 0.0), a, b];
        assert_eq!(first_obstacle_hit(&car, &footprint(), &list).map(|o| o.id), Some(7));
        assert!(hits_any_obstacle(&car, &footprint(), &list));
        assert!(!hits_any_obstacle(&car, &footprint(), &list[..1]));
    }

    #[test]
    fn test_near_miss_excludes_real_hits() {
        let car = car_at(0.0, 0.0, 0.0);
        // Lateral gap: 0.9 + 1.0 = 1.9 contact; halo reaches 2.9
        let grazing = obstacle(2.5, 0.0);
        let hit = obstacle(1.5, 0.0);
        assert!(near_miss(&car, &footprint(), 1.0, &[hit]).is_none());
        assert!(near_miss(&car, &footprint(), 1.0, &[obstacle(3.5, 0.0)]).is_none());
        assert!(near_miss(&car, &footprint(), 1.0, &[grazing]).is_some());
    }

    #[test]
    fn test_grazed_obstacles_on_both_sides() {
        let car = car_at(0.0, 0.0, 0.0);
        let mut left = obstacle(-2.5, 0.0);
        left.id = 4;
        let mut right = obstacle(2.5, 0.0);
        right.id = 5;
        let list = [right, obstacle(1.5, 0.0), obstacle(6.0, 0.0), left];
        let ids: Vec<u32> = grazed_obstacles(&car, &footprint(), 1.0, &list)
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![5, 4]);
    }

    #[test]
    fn test_pickup_radius_and_collected_flag() {
        let car = car_at(0.0, 0.0, 0.0);
        let mut pickup = Pickup::new(1, Vec2::new(1.3, 0.0));
        // contact distance 0.9 + 0.5 = 1.4
        assert!(touches_pickup(&car, &footprint(), &pickup, 0.5));
        pickup.pos.x = 1.5;
        assert!(!touches_pickup(&car, &footprint(), &pickup, 0.5));
        pickup.pos.x = 0.0;
        pickup.collected = true;
        assert!(!touches_pickup(&car, &footprint(), &pickup, 0.5));
    }

    #[test]
    fn test_track_status_endless() {
        let bounds = TrackBounds {
            road_width: 12.0,
            road_length: None,
        };
        assert_eq!(track_status(Vec2::new(5.9, 1e6), &bounds), TrackStatus::OnTrack);
        assert_eq!(track_status(Vec2::new(0.0, -1e6), &bounds), TrackStatus::OnTrack);
        assert_eq!(track_status(Vec2::new(-6.1, 0.0), &bounds), TrackStatus::OffTrack);
        assert_eq!(track_status(Vec2::new(7.0, 0.0), &bounds), TrackStatus::OffTrack);
    }

    #[test]
    fn test_track_status_finite_completion_first() {
        let bounds = TrackBounds {
            road_width: 12.0,
            road_length: Some(80.0),
        };
        assert_eq!(track_status(Vec2::new(0.0, 40.0), &bounds), TrackStatus::Completed);
        // Past the end and off to the side still counts as finishing
        assert_eq!(track_status(Vec2::new(9.0, 41.0), &bounds), TrackStatus::Completed);
        assert_eq!(track_status(Vec2::new(0.0, -40.5), &bounds), TrackStatus::OffTrack);
        assert_eq!(track_status(Vec2::new(0.0, 39.9), &bounds), TrackStatus::OnTrack);
    }
}
