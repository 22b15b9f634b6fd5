//! World streaming
//!
//! Generates obstacles and pickups in fixed-length segments ahead of the car
//! and retires them once they fall behind, so an endless run keeps a bounded
//! working set. Only the high-water mark `last_generated_z` is remembered;
//! segments are never revisited.
//!
//! Random draws come from one `Pcg32` per run, consumed in a fixed order per
//! segment: every obstacle (z, band, x jitter, width, depth), then every
//! pickup cluster (count, then band, x jitter, z jitter per pickup). A given
//! seed therefore always streams the same road.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{Footprint, touches_pickup};
use super::state::{Band, Obstacle, Pickup};
use super::vehicle::VehicleState;
use crate::config::WorldParams;
use crate::levels::Course;

/// Owner of every obstacle and pickup in a run
#[derive(Debug, Clone)]
pub struct WorldStream {
    params: WorldParams,
    road_width: f32,
    /// False for finite courses: the layout is fixed and never streamed
    streaming: bool,
    spawn_z: f32,
    obstacles: Vec<Obstacle>,
    pickups: Vec<Pickup>,
    last_generated_z: f32,
    segments_generated: u32,
    rng: Pcg32,
    next_id: u32,
}

impl WorldStream {
    /// Empty world for `course`; finite courses get their fixed obstacles
    pub fn new(params: WorldParams, course: &Course, seed: u64) -> Self {
        let mut world = Self {
            road_width: course.road_width,
            streaming: course.is_endless(),
            spawn_z: course.spawn.z,
            last_generated_z: course.spawn.z - params.generation_backset,
            params,
            obstacles: Vec::new(),
            pickups: Vec::new(),
            segments_generated: 0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };
        for o in &course.obstacles {
            world.place_obstacle(Vec2::new(o.x, o.z), Vec2::new(o.width, o.depth));
        }
        world
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    /// End of the generated world along z
    pub fn last_generated_z(&self) -> f32 {
        self.last_generated_z
    }

    pub fn segments_generated(&self) -> u32 {
        self.segments_generated
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Insert a hand-placed obstacle
    pub fn place_obstacle(&mut self, pos: Vec2, size: Vec2) -> u32 {
        let id = self.next_entity_id();
        let band = band_for_x(pos.x, self.road_width);
        self.obstacles.push(Obstacle::new(id, pos, size, band));
        id
    }

    /// Insert a hand-placed pickup
    pub fn place_pickup(&mut self, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.pickups.push(Pickup::new(id, pos));
        id
    }

    /// Generate segments until the world reaches `lookahead_distance` past
    /// `vehicle_z`. Returns how many segments were added.
    pub fn ensure_ahead(&mut self, vehicle_z: f32) -> u32 {
        if !self.streaming || !vehicle_z.is_finite() {
            return 0;
        }
        let mut added = 0;
        while vehicle_z > self.last_generated_z - self.params.lookahead_distance {
            let before = self.last_generated_z;
            self.generate_segment();
            added += 1;
            if self.last_generated_z <= before {
                log::warn!("Segment length below float precision at z={before}");
                break;
            }
        }
        added
    }

    /// Fill `[last_generated_z, last_generated_z + segment_length)`
    fn generate_segment(&mut self) {
        let z_start = self.last_generated_z;
        let length = self.params.segment_length;
        let z_end = z_start + length;

        let obstacle_count = (self.params.obstacle_density * length).ceil() as usize;
        let mut placed = 0;
        for _ in 0..obstacle_count {
            let z = z_start + self.rng.random::<f32>() * length;
            let band = pick_band(&mut self.rng);
            let x = band_x(
                &mut self.rng,
                band,
                self.road_width * self.params.obstacle_band_offset,
            );
            let width = 2.0 + self.rng.random::<f32>() * 0.5;
            let depth = 2.0 + self.rng.random::<f32>() * 0.5;

            // Keep the start line clear
            if (z - self.spawn_z).abs() < self.params.spawn_clearance {
                continue;
            }
            let id = self.next_entity_id();
            self.obstacles
                .push(Obstacle::new(id, Vec2::new(x, z), Vec2::new(width, depth), band));
            placed += 1;
        }

        let mut pickups = 0;
        let mut cluster_z = z_start;
        while cluster_z < z_end {
            let count = if self.rng.random_bool(0.5) { 2 } else { 1 };
            for _ in 0..count {
                let band = pick_band(&mut self.rng);
                let x = band_x(
                    &mut self.rng,
                    band,
                    self.road_width * self.params.pickup_band_offset,
                );
                let z = cluster_z + self.rng.random::<f32>() * 5.0;
                let id = self.next_entity_id();
                self.pickups.push(Pickup::new(id, Vec2::new(x, z)));
                pickups += 1;
            }
            cluster_z += self.params.pickup_spacing;
        }

        self.last_generated_z = z_end;
        self.segments_generated += 1;
        log::debug!(
            "Segment {} [{:.0}, {:.0}): {} obstacles, {} pickups",
            self.segments_generated,
            z_start,
            z_end,
            placed,
            pickups
        );
    }

    /// Drop obstacles and pickups more than `cleanup_distance` behind the
    /// car, plus every collected pickup. Returns how many entries went.
    ///
    /// Must run after the tick's collision test.
    pub fn retire_behind(&mut self, vehicle_z: f32) -> usize {
        let before = self.obstacles.len() + self.pickups.len();
        let cutoff = vehicle_z - self.params.cleanup_distance;

        if self.streaming {
            self.obstacles.retain(|o| o.pos.y > cutoff);
            self.pickups.retain(|p| !p.collected && p.pos.y > cutoff);
        } else {
            self.pickups.retain(|p| !p.collected);
        }

        let removed = before - (self.obstacles.len() + self.pickups.len());
        if removed > 0 {
            log::trace!("Retired {} entities behind z={:.1}", removed, cutoff);
        }
        removed
    }

    /// Mark every pickup the car touches as collected
    ///
    /// Returns `(id, position)` for each newly collected pickup.
    pub fn collect_touching(
        &mut self,
        car: &VehicleState,
        footprint: &Footprint,
    ) -> Vec<(u32, Vec2)> {
        let radius = self.params.pickup_radius;
        let mut collected = Vec::new();
        for pickup in &mut self.pickups {
            if touches_pickup(car, footprint, pickup, radius) {
                pickup.collected = true;
                collected.push((pickup.id, pickup.pos));
            }
        }
        collected
    }

    /// Advance the cosmetic pickup rotation
    pub fn spin_pickups(&mut self, dt_ms: f32) {
        for pickup in &mut self.pickups {
            pickup.spin = (pickup.spin + dt_ms * 0.003) % std::f32::consts::TAU;
        }
    }
}

/// Left / right / center with weights 0.33 / 0.33 / 0.34
fn pick_band(rng: &mut Pcg32) -> Band {
    let side: f32 = rng.random();
    if side < 0.33 {
        Band::Left
    } else if side < 0.66 {
        Band::Right
    } else {
        Band::Center
    }
}

/// Lateral position within a band; side bands jitter 2 units toward +x
fn band_x(rng: &mut Pcg32, band: Band, side_offset: f32) -> f32 {
    let jitter: f32 = rng.random();
    match band {
        Band::Left => -side_offset + jitter * 2.0,
        Band::Right => side_offset + jitter * 2.0,
        Band::Center => jitter * 4.0 - 2.0,
    }
}

/// Band tag for a hand-placed obstacle
fn band_for_x(x: f32, road_width: f32) -> Band {
    let third = road_width / 6.0;
    if x < -third {
        Band::Left
    } else if x > third {
        Band::Right
    } else {
        Band::Center
    }
}
