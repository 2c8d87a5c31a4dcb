//! Geometric constants of the hex map and the pure helpers built on them.
//!
//! Distances are in world units. Cells are pointy-top hexagons whose corners
//! sit [`OUTER_RADIUS`] from the center; the inner `SOLID_FACTOR` part of a
//! cell is flat, the remaining `BLEND_FACTOR` ring blends into its neighbors.

use bevy::prelude::*;

use super::direction::HexDirection;
use super::noise_source::NoiseSampler;

pub const OUTER_TO_INNER: f32 = 0.866_025_4;
pub const INNER_TO_OUTER: f32 = 1.0 / OUTER_TO_INNER;

pub const OUTER_RADIUS: f32 = 10.0;
pub const INNER_RADIUS: f32 = OUTER_RADIUS * OUTER_TO_INNER;

pub const SOLID_FACTOR: f32 = 0.8;
pub const BLEND_FACTOR: f32 = 1.0 - SOLID_FACTOR;

/// World height of one elevation level.
pub const ELEVATION_STEP: f32 = 3.0;

pub const TERRACES_PER_SLOPE: usize = 2;
pub const TERRACE_STEPS: usize = TERRACES_PER_SLOPE * 2 + 1;
pub const HORIZONTAL_TERRACE_STEP_SIZE: f32 = 1.0 / TERRACE_STEPS as f32;
pub const VERTICAL_TERRACE_STEP_SIZE: f32 = 1.0 / (TERRACES_PER_SLOPE as f32 + 1.0);

pub const CELL_PERTURB_STRENGTH: f32 = 4.0;
pub const ELEVATION_PERTURB_STRENGTH: f32 = 1.5;
pub const NOISE_SCALE: f32 = 0.003;

/// Elevation offsets (in levels) of river channels and water surfaces.
pub const STREAM_BED_ELEVATION_OFFSET: f32 = -1.75;
pub const RIVER_SURFACE_ELEVATION_OFFSET: f32 = -0.5;

/// Lift of road strips above the terrain they overlay.
pub const ROAD_ELEVATION_OFFSET: f32 = 0.05;

pub const CHUNK_SIZE_X: usize = 5;
pub const CHUNK_SIZE_Z: usize = 5;

/// Corner offsets from the cell center, clockwise from north. The seventh
/// entry repeats the first so `CORNERS[d + 1]` is always valid.
const CORNERS: [Vec3; 7] = [
    Vec3::new(0.0, 0.0, OUTER_RADIUS),
    Vec3::new(INNER_RADIUS, 0.0, 0.5 * OUTER_RADIUS),
    Vec3::new(INNER_RADIUS, 0.0, -0.5 * OUTER_RADIUS),
    Vec3::new(0.0, 0.0, -OUTER_RADIUS),
    Vec3::new(-INNER_RADIUS, 0.0, -0.5 * OUTER_RADIUS),
    Vec3::new(-INNER_RADIUS, 0.0, 0.5 * OUTER_RADIUS),
    Vec3::new(0.0, 0.0, OUTER_RADIUS),
];

/// Classification of the join between two adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum HexEdgeType {
    Flat,
    Slope,
    Cliff,
}

/// Edge type for two elevations: equal is flat, one level apart is a slope,
/// anything steeper is a cliff.
pub fn edge_type(elevation1: i32, elevation2: i32) -> HexEdgeType {
    match elevation1.abs_diff(elevation2) {
        0 => HexEdgeType::Flat,
        1 => HexEdgeType::Slope,
        _ => HexEdgeType::Cliff,
    }
}

pub fn first_corner(direction: HexDirection) -> Vec3 {
    CORNERS[direction.index()]
}

pub fn second_corner(direction: HexDirection) -> Vec3 {
    CORNERS[direction.index() + 1]
}

pub fn first_solid_corner(direction: HexDirection) -> Vec3 {
    CORNERS[direction.index()] * SOLID_FACTOR
}

pub fn second_solid_corner(direction: HexDirection) -> Vec3 {
    CORNERS[direction.index() + 1] * SOLID_FACTOR
}

pub fn solid_edge_middle(direction: HexDirection) -> Vec3 {
    (CORNERS[direction.index()] + CORNERS[direction.index() + 1]) * (0.5 * SOLID_FACTOR)
}

/// Offset from a solid edge to the facing solid edge of the neighbor.
pub fn bridge(direction: HexDirection) -> Vec3 {
    (CORNERS[direction.index()] + CORNERS[direction.index() + 1]) * BLEND_FACTOR
}

/// Position of terrace step `step` on the slope from `a` to `b`.
///
/// Horizontal progress is linear per step; vertical progress only advances on
/// odd steps, which produces the flat terrace ledges.
pub fn terrace_lerp(a: Vec3, b: Vec3, step: usize) -> Vec3 {
    let h = step as f32 * HORIZONTAL_TERRACE_STEP_SIZE;
    let v = ((step + 1) / 2) as f32 * VERTICAL_TERRACE_STEP_SIZE;
    Vec3::new(
        a.x + (b.x - a.x) * h,
        a.y + (b.y - a.y) * v,
        a.z + (b.z - a.z) * h,
    )
}

pub fn terrace_lerp_color(a: LinearRgba, b: LinearRgba, step: usize) -> LinearRgba {
    a.mix(&b, step as f32 * HORIZONTAL_TERRACE_STEP_SIZE)
}

/// Samples the noise source at the scaled planar position.
pub fn sample_noise(noise: &dyn NoiseSampler, position: Vec3) -> Vec4 {
    noise.sample(Vec2::new(position.x * NOISE_SCALE, position.z * NOISE_SCALE))
}

/// Horizontal noise displacement applied to mesh vertices.
pub fn perturb(noise: &dyn NoiseSampler, position: Vec3) -> Vec3 {
    let sample = sample_noise(noise, position);
    Vec3::new(
        position.x + (sample.x * 2.0 - 1.0) * CELL_PERTURB_STRENGTH,
        position.y,
        position.z + (sample.z * 2.0 - 1.0) * CELL_PERTURB_STRENGTH,
    )
}

/// Five points evenly spread along a cell edge, `v1` and `v5` at the corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeVertices {
    pub v1: Vec3,
    pub v2: Vec3,
    pub v3: Vec3,
    pub v4: Vec3,
    pub v5: Vec3,
}

impl EdgeVertices {
    pub fn new(corner1: Vec3, corner2: Vec3) -> Self {
        Self {
            v1: corner1,
            v2: corner1.lerp(corner2, 0.25),
            v3: corner1.lerp(corner2, 0.5),
            v4: corner1.lerp(corner2, 0.75),
            v5: corner2,
        }
    }

    /// Like [`EdgeVertices::new`] but with `v2`/`v4` placed `outer_step` in
    /// from the corners, used to widen river channels.
    pub fn with_outer_step(corner1: Vec3, corner2: Vec3, outer_step: f32) -> Self {
        Self {
            v1: corner1,
            v2: corner1.lerp(corner2, outer_step),
            v3: corner1.lerp(corner2, 0.5),
            v4: corner1.lerp(corner2, 1.0 - outer_step),
            v5: corner2,
        }
    }

    pub fn terrace_lerp(a: Self, b: Self, step: usize) -> Self {
        Self {
            v1: terrace_lerp(a.v1, b.v1, step),
            v2: terrace_lerp(a.v2, b.v2, step),
            v3: terrace_lerp(a.v3, b.v3, step),
            v4: terrace_lerp(a.v4, b.v4, step),
            v5: terrace_lerp(a.v5, b.v5, step),
        }
    }

    /// Returns a copy moved by `offset`.
    pub fn translated(self, offset: Vec3) -> Self {
        Self {
            v1: self.v1 + offset,
            v2: self.v2 + offset,
            v3: self.v3 + offset,
            v4: self.v4 + offset,
            v5: self.v5 + offset,
        }
    }
}
