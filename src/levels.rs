//! Courses: the endless road and the finite preset levels

use serde::{Deserialize, Serialize};

use crate::consts::ROAD_WIDTH;

/// Where (and which way) the vehicle starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    pub x: f32,
    pub z: f32,
    /// Radians, 0 = facing +z
    pub heading: f32,
}

impl Spawn {
    pub const fn new(x: f32, z: f32, heading: f32) -> Self {
        Self { x, z, heading }
    }
}

/// A hand-placed obstacle on a finite course
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedObstacle {
    pub x: f32,
    pub z: f32,
    pub width: f32,
    pub depth: f32,
}

const fn block(x: f32, z: f32) -> PlacedObstacle {
    PlacedObstacle {
        x,
        z,
        width: 2.0,
        depth: 2.0,
    }
}

const fn small_block(x: f32, z: f32) -> PlacedObstacle {
    PlacedObstacle {
        x,
        z,
        width: 1.8,
        depth: 1.8,
    }
}

/// Road layout a session is played on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub road_width: f32,
    /// `None` = endless road (streamed); `Some` = finite, centered on z = 0
    pub road_length: Option<f32>,
    pub spawn: Spawn,
    /// Fixed obstacles (finite courses only)
    pub obstacles: Vec<PlacedObstacle>,
}

impl Default for Course {
    fn default() -> Self {
        Self::endless()
    }
}

impl Course {
    /// The endless procedurally generated road
    pub fn endless() -> Self {
        Self {
            road_width: ROAD_WIDTH,
            road_length: None,
            spawn: Spawn::new(0.0, -50.0, 0.0),
            obstacles: Vec::new(),
        }
    }

    /// Number of finite preset levels
    pub fn level_count() -> usize {
        5
    }

    /// Finite preset level (0-based), `None` past the last one
    pub fn level(index: usize) -> Option<Self> {
        let (road_width, road_length, spawn_z, obstacles): (f32, f32, f32, &[PlacedObstacle]) =
            match index {
                // Alternating left / center / right
                0 => (12.0, 80.0, -35.0, &LEVEL_1),
                // Center blocked more often
                1 => (10.0, 90.0, -40.0, &LEVEL_2),
                // Tighter zigzag
                2 => (9.0, 100.0, -45.0, &LEVEL_3),
                // Narrow gaps
                3 => (8.0, 110.0, -50.0, &LEVEL_4),
                // Hardest
                4 => (7.0, 120.0, -55.0, &LEVEL_5),
                _ => return None,
            };
        Some(Self {
            road_width,
            road_length: Some(road_length),
            spawn: Spawn::new(0.0, spawn_z, 0.0),
            obstacles: obstacles.to_vec(),
        })
    }

    /// Whether the world is streamed procedurally
    pub fn is_endless(&self) -> bool {
        self.road_length.is_none()
    }
}

const LEVEL_1: [PlacedObstacle; 6] = [
    block(3.0, -20.0),
    block(0.0, -10.0),
    block(-3.5, 0.0),
    block(0.0, 12.0),
    block(3.0, 24.0),
    block(-2.5, 30.0),
];

const LEVEL_2: [PlacedObstacle; 9] = [
    block(0.0, -32.0),
    block(-3.0, -24.0),
    block(2.5, -16.0),
    block(0.0, -8.0),
    block(3.0, 0.0),
    block(-2.5, 8.0),
    block(0.0, 16.0),
    block(-3.0, 24.0),
    block(2.0, 32.0),
];

const LEVEL_3: [PlacedObstacle; 10] = [
    block(2.2, -38.0),
    block(0.0, -30.0),
    block(-2.2, -22.0),
    block(0.0, -14.0),
    block(2.0, -6.0),
    block(-2.0, 2.0),
    block(0.0, 10.0),
    block(2.2, 18.0),
    block(-2.2, 26.0),
    block(0.0, 34.0),
];

const LEVEL_4: [PlacedObstacle; 15] = [
    block(0.0, -44.0),
    block(-2.2, -38.0),
    block(2.0, -32.0),
    block(0.0, -26.0),
    block(2.2, -20.0),
    block(-2.0, -14.0),
    block(0.0, -8.0),
    block(-2.2, -2.0),
    block(2.0, 4.0),
    block(0.0, 10.0),
    block(2.2, 16.0),
    block(-2.0, 22.0),
    block(0.0, 28.0),
    block(-2.2, 34.0),
    block(2.0, 40.0),
];

const LEVEL_5: [PlacedObstacle; 17] = [
    small_block(0.0, -48.0),
    small_block(-1.8, -42.0),
    small_block(1.8, -36.0),
    small_block(0.0, -30.0),
    small_block(1.8, -24.0),
    small_block(-1.8, -18.0),
    small_block(0.0, -12.0),
    small_block(-1.8, -6.0),
    small_block(1.8, 0.0),
    small_block(0.0, 6.0),
    small_block(1.8, 12.0),
    small_block(-1.8, 18.0),
    small_block(0.0, 24.0),
    small_block(-1.8, 30.0),
    small_block(1.8, 36.0),
    small_block(0.0, 42.0),
    small_block(-1.8, 48.0),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_fit_on_their_roads() {
        for i in 0..Course::level_count() {
            let course = Course::level(i).unwrap();
            let half_width = course.road_width / 2.0;
            let half_length = course.road_length.unwrap() / 2.0;
            assert!(course.spawn.z > -half_length && course.spawn.z < half_length);
            for o in &course.obstacles {
                assert!(o.x.abs() + o.width / 2.0 <= half_width, "level {i} obstacle off road");
                assert!(o.z.abs() < half_length);
            }
        }
        assert!(Course::level(Course::level_count()).is_none());
    }

    #[test]
    fn test_endless_course() {
        let course = Course::endless();
        assert!(course.is_endless());
        assert!(course.obstacles.is_empty());
        assert_eq!(course.spawn, Spawn::new(0.0, -50.0, 0.0));
    }
}
