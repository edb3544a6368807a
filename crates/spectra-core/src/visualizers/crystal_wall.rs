//! Infinite deterministic triangle mesh
//!
//! The wall is a virtual grid that extends forever in every direction. Only
//! the cells overlapping the viewport are sampled each frame. Each anchor's
//! position is a pure function of its integer grid coordinates, the shared
//! camera drift and the local jitter clock, so nothing per-node is stored.
//!
//! The drift is kept as a whole-cell shift plus a fractional offset inside
//! one cell, which keeps coordinates small no matter how long the wall runs.

use super::{LayerState, VizInput};
use crate::settings::CrystalWallSettings;
use crate::sim::SimState;
use crate::spectrum::pulse_energy;
use crate::surface::{Paint, Shape, Surface};
use glam::{IVec2, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use tracing::debug;

/// Simulated seconds per frame
const FRAME_TIME: f32 = 1.0 / 60.0;

/// Fraction of the remaining velocity error removed per frame
const DRIFT_EASING: f32 = 0.02;

/// Peak drift speed in pixels per frame
const DRIFT_SPEED: f32 = 0.8;

/// Retarget interval range in frames at anchor speed 1
const RETARGET_FRAMES: std::ops::Range<u32> = 90..300;

/// Anchor speeds below this do not lengthen the retarget interval further
const MIN_RETARGET_SPEED: f32 = 0.25;

/// Smallest cell edge in pixels
const MIN_CELL: f32 = 4.0;

/// Canvas size change (per axis) that forces a rebuild
const REBUILD_DELTA: f32 = 100.0;

/// Cells sampled beyond each viewport edge
const MARGIN_CELLS: i32 = 1;

/// Mix a grid coordinate and salt into a well-distributed 32-bit value
fn hash(col: i32, row: i32, salt: u32) -> u32 {
    let mut h = (col as u32).wrapping_mul(0x8da6_b343)
        ^ (row as u32).wrapping_mul(0xd816_3841)
        ^ salt.wrapping_mul(0xcb1a_b31f);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;
    h
}

fn unit(col: i32, row: i32, salt: u32) -> f32 {
    hash(col, row, salt) as f32 / u32::MAX as f32
}

/// Orbital displacement of the anchor at `(col, row)`
fn orbit(col: i32, row: i32, cell: Vec2, time: f32, orbit_scale: f32) -> Vec2 {
    let radius = (0.08 + 0.22 * unit(col, row, 1)) * cell.min_element() * orbit_scale;
    let speed = 0.5 + 1.5 * unit(col, row, 2);
    let phase = unit(col, row, 3) * TAU;
    let angle = phase + time * speed;
    Vec2::new(angle.cos(), angle.sin()) * radius
}

/// Position of the grid anchor at `(col, row)`.
///
/// Pure: identical arguments always give bit-identical results.
pub fn grid_anchor(col: i32, row: i32, cell: Vec2, drift: Vec2, time: f32, orbit_scale: f32) -> Vec2 {
    Vec2::new(col as f32, row as f32) * cell + drift + orbit(col, row, cell, time, orbit_scale)
}

/// Camera drift and jitter clock of one crystal wall layer
#[derive(Debug, Clone)]
pub struct CrystalSim {
    rng: StdRng,
    shift: IVec2,
    drift: Vec2,
    velocity: Vec2,
    target_velocity: Vec2,
    retarget_in: u32,
    local_time: f32,
    cell: Vec2,
    node_count: usize,
    bounds: Vec2,
}

impl CrystalSim {
    /// Start a wall sized for `settings.node_count` anchors over `bounds`
    pub fn new(seed: u64, settings: &CrystalWallSettings, bounds: Vec2) -> Self {
        let edge = (bounds.x * bounds.y / settings.node_count as f32)
            .sqrt()
            .max(MIN_CELL);
        let edge = if edge.is_finite() { edge } else { MIN_CELL };
        let mut sim = Self {
            rng: StdRng::seed_from_u64(seed),
            shift: IVec2::ZERO,
            drift: Vec2::ZERO,
            velocity: Vec2::ZERO,
            target_velocity: Vec2::ZERO,
            retarget_in: 0,
            local_time: 0.0,
            cell: Vec2::splat(edge),
            node_count: settings.node_count,
            bounds,
        };
        sim.retarget(settings.anchor_speed);
        sim
    }

    fn retarget(&mut self, anchor_speed: f32) {
        let heading = self.rng.gen::<f32>() * TAU;
        let magnitude = (0.5 + 0.5 * self.rng.gen::<f32>()) * DRIFT_SPEED;
        self.target_velocity = Vec2::new(heading.cos(), heading.sin()) * magnitude;
        let frames = self.rng.gen_range(RETARGET_FRAMES) as f32 / anchor_speed.max(MIN_RETARGET_SPEED);
        self.retarget_in = frames.round().max(1.0) as u32;
    }

    /// Advance drift and jitter by one frame
    pub fn step(&mut self, settings: &CrystalWallSettings) {
        self.retarget_in = self.retarget_in.saturating_sub(1);
        if self.retarget_in == 0 {
            self.retarget(settings.anchor_speed);
        }

        self.velocity += (self.target_velocity - self.velocity) * DRIFT_EASING;
        self.drift += self.velocity * settings.anchor_speed;
        self.normalize_drift();
        self.local_time += FRAME_TIME * settings.node_speed;
    }

    // Move whole cells from the fractional drift into the shift
    fn normalize_drift(&mut self) {
        let whole = (self.drift / self.cell).floor();
        if whole != Vec2::ZERO && whole.is_finite() {
            self.drift -= whole * self.cell;
            self.shift += whole.as_ivec2();
        }
    }

    /// Total drift offset in pixels
    pub fn drift(&self) -> Vec2 {
        self.shift.as_vec2() * self.cell + self.drift
    }

    /// Current eased drift velocity
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Velocity the drift is easing toward
    pub fn target_velocity(&self) -> Vec2 {
        self.target_velocity
    }

    /// Grid cell size
    pub fn cell(&self) -> Vec2 {
        self.cell
    }

    /// Jitter clock in seconds
    pub fn local_time(&self) -> f32 {
        self.local_time
    }

    /// Whether the state no longer matches the settings or canvas
    pub fn needs_rebuild(&self, settings: &CrystalWallSettings, bounds: Vec2) -> bool {
        let delta = (self.bounds - bounds).abs();
        self.node_count != settings.node_count || delta.x > REBUILD_DELTA || delta.y > REBUILD_DELTA
    }

    /// Scale the cell size and drift by `ratio` and adopt the new canvas size
    pub fn rescale(&mut self, ratio: Vec2, bounds: Vec2) {
        self.cell = (self.cell * ratio).max(Vec2::splat(MIN_CELL));
        self.drift *= ratio;
        self.bounds = bounds;
        self.normalize_drift();
    }

    /// Anchor for the on-screen grid index `(i, j)` at the current frame
    fn anchor(&self, i: i32, j: i32, orbit_scale: f32) -> Vec2 {
        let col = i.wrapping_sub(self.shift.x);
        let row = j.wrapping_sub(self.shift.y);
        Vec2::new(i as f32, j as f32) * self.cell
            + self.drift
            + orbit(col, row, self.cell, self.local_time, orbit_scale)
    }

    /// Visible on-screen grid index range (inclusive), margin included
    fn visible(&self, bounds: Vec2) -> (IVec2, IVec2) {
        let first = (-self.drift / self.cell).floor().as_ivec2() - IVec2::splat(MARGIN_CELLS);
        let last = ((bounds - self.drift) / self.cell).ceil().as_ivec2() + IVec2::splat(MARGIN_CELLS);
        (first, last)
    }

    /// Every triangle of the visible mesh for the current frame
    pub fn triangles(&self, bounds: Vec2, orbit_scale: f32) -> Vec<[Vec2; 3]> {
        let (first, last) = self.visible(bounds);
        let cols = (last.x - first.x + 1).max(0) as usize;
        let rows = (last.y - first.y + 1).max(0) as usize;
        if cols < 2 || rows < 2 {
            return Vec::new();
        }

        let mut anchors = Vec::with_capacity(cols * rows);
        for j in first.y..=last.y {
            for i in first.x..=last.x {
                anchors.push(self.anchor(i, j, orbit_scale));
            }
        }

        let mut triangles = Vec::with_capacity((cols - 1) * (rows - 1) * 2);
        for row in 0..rows - 1 {
            for col in 0..cols - 1 {
                let a = anchors[row * cols + col];
                let b = anchors[row * cols + col + 1];
                let c = anchors[(row + 1) * cols + col];
                let d = anchors[(row + 1) * cols + col + 1];
                triangles.push([a, b, d]);
                triangles.push([a, d, c]);
            }
        }
        triangles
    }
}

/// Advance the drift and fill the visible mesh
pub fn render(surface: &mut dyn Surface, input: &VizInput<'_>, state: &mut LayerState<'_>) {
    if input.spectrum.is_empty() {
        return;
    }

    let settings = state.settings.crystal_wall();
    let bounds = surface.size();

    let rebuild = match &*state.sim {
        SimState::Crystal(sim) => sim.needs_rebuild(&settings, bounds),
        _ => true,
    };
    if rebuild {
        debug!(count = settings.node_count, "Building crystal wall");
        *state.sim = SimState::Crystal(CrystalSim::new(state.seed, &settings, bounds));
    }
    let SimState::Crystal(sim) = &mut *state.sim else {
        return;
    };

    sim.step(&settings);

    let energy = pulse_energy(input.spectrum, settings.intensity);
    let orbit_scale = 1.0 + energy * settings.pulse_strength;
    let alpha = 0.05 + energy * 0.3;

    for triangle in sim.triangles(bounds, orbit_scale) {
        let centroid = (triangle[0] + triangle[1] + triangle[2]) / 3.0;
        let t = input.colors.source.select(centroid.x / bounds.x, energy);
        let color = input.colors.color_at(t);
        let shape = Shape::Polygon(triangle.to_vec());
        surface.fill(&shape, &Paint::Solid(color.with_alpha(alpha)));
        surface.stroke(&shape, &Paint::Solid(color.with_alpha(alpha * 0.5)), 1.0);
    }
}
