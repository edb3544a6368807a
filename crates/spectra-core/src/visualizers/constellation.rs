//! Proximity graph: bouncing nodes joined by fading edges
//!
//! Bass energy drives a pulse factor that speeds nodes up, grows them and
//! brightens edges. If integration ever produces a NaN coordinate the whole
//! state is dropped and rebuilt on the next frame.

use super::{bin_for, LayerState, VizInput};
use crate::settings::ConstellationSettings;
use crate::sim::SimState;
use crate::spectrum::pulse_energy;
use crate::surface::{Paint, Shape, Surface};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

/// Canvas size change (per axis) that forces a rebuild
const REBUILD_DELTA: f32 = 100.0;

/// Volume color positions divide raw magnitudes by this
const VOLUME_SCALE: f32 = 200.0;

/// A graph node
#[derive(Debug, Clone, PartialEq)]
pub struct ConstellationNode {
    /// Position in canvas pixels
    pub position: Vec2,
    /// Per-frame velocity before the pulse factor
    pub velocity: Vec2,
    /// Radius multiplier in `[0.5, 1)`
    pub relative_size: f32,
    /// Random stop index, fixed at creation
    pub color_index: usize,
}

/// State of one constellation layer
#[derive(Debug, Clone)]
pub struct ConstellationSim {
    nodes: Vec<ConstellationNode>,
    node_count: usize,
    bounds: Vec2,
}

impl ConstellationSim {
    /// Scatter `settings.node_count` nodes inside `bounds`
    pub fn new(seed: u64, settings: &ConstellationSettings, bounds: Vec2, stop_count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let stop_count = stop_count.max(1);
        let nodes = (0..settings.node_count)
            .map(|_| ConstellationNode {
                position: Vec2::new(rng.gen::<f32>() * bounds.x, rng.gen::<f32>() * bounds.y),
                velocity: Vec2::new(
                    (rng.gen::<f32>() - 0.5) * 1.5 * settings.speed,
                    (rng.gen::<f32>() - 0.5) * 1.5 * settings.speed,
                ),
                relative_size: rng.gen::<f32>() * 0.5 + 0.5,
                color_index: rng.gen_range(0..stop_count),
            })
            .collect();
        Self {
            nodes,
            node_count: settings.node_count,
            bounds,
        }
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether there are no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes
    pub fn nodes(&self) -> &[ConstellationNode] {
        &self.nodes
    }

    /// Mutable access to the nodes
    pub fn nodes_mut(&mut self) -> &mut [ConstellationNode] {
        &mut self.nodes
    }

    /// Canvas size the nodes are laid out for
    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    /// Whether the state no longer matches the settings or canvas
    pub fn needs_rebuild(&self, settings: &ConstellationSettings, bounds: Vec2) -> bool {
        let delta = (self.bounds - bounds).abs();
        self.node_count != settings.node_count || delta.x > REBUILD_DELTA || delta.y > REBUILD_DELTA
    }

    /// Move every node, reflecting off the edges. Returns false if any
    /// coordinate became NaN.
    pub fn step(&mut self, pulse: f32, node_speed: f32) -> bool {
        let bounds = self.bounds;
        let mut healthy = true;
        for node in &mut self.nodes {
            node.position += node.velocity * pulse * node_speed;
            if node.position.is_nan() {
                healthy = false;
            }
            if node.position.x < 0.0 || node.position.x > bounds.x {
                node.velocity.x = -node.velocity.x;
                node.position.x = node.position.x.clamp(0.0, bounds.x);
            }
            if node.position.y < 0.0 || node.position.y > bounds.y {
                node.velocity.y = -node.velocity.y;
                node.position.y = node.position.y.clamp(0.0, bounds.y);
            }
        }
        healthy
    }

    /// Scale positions by `ratio` and adopt the new canvas size
    pub fn rescale(&mut self, ratio: Vec2, bounds: Vec2) {
        for node in &mut self.nodes {
            node.position *= ratio;
        }
        self.bounds = bounds;
    }
}

/// Step the graph and draw nodes and edges
pub fn render(surface: &mut dyn Surface, input: &VizInput<'_>, state: &mut LayerState<'_>) {
    let len = input.spectrum.len();
    if len == 0 {
        return;
    }

    let settings = state.settings.constellation();
    let bounds = surface.size();

    let rebuild = match &*state.sim {
        SimState::Constellation(sim) => sim.needs_rebuild(&settings, bounds),
        _ => true,
    };
    if rebuild {
        debug!(count = settings.node_count, "Building constellation");
        *state.sim = SimState::Constellation(ConstellationSim::new(
            state.seed,
            &settings,
            bounds,
            input.colors.stops.len(),
        ));
    }
    let SimState::Constellation(sim) = &mut *state.sim else {
        return;
    };

    let energy = pulse_energy(input.spectrum, settings.intensity);
    let pulse = 1.0 + energy * settings.pulse_strength;

    if !sim.step(pulse, settings.node_speed) {
        warn!("Constellation produced NaN positions, rebuilding next frame");
        state.sim.invalidate();
        return;
    }

    let nodes = sim.nodes();
    let count = nodes.len();
    let max_dist_sq = settings.connect_distance * settings.connect_distance;

    for (i, a) in nodes.iter().enumerate() {
        let value = input.spectrum.get(bin_for(i, count, len)).copied().unwrap_or(0);
        let t = input
            .colors
            .source
            .select(i as f32 / count as f32, value as f32 / VOLUME_SCALE);
        let color = input.colors.color_at(t);

        surface.fill(
            &Shape::Circle {
                center: a.position,
                radius: a.relative_size * settings.base_size * pulse,
            },
            &Paint::solid(color),
        );

        for b in &nodes[i + 1..] {
            let dist_sq = a.position.distance_squared(b.position);
            if dist_sq < max_dist_sq {
                let alpha = (1.0 - dist_sq.sqrt() / settings.connect_distance) * (0.2 + energy * 0.8);
                surface.stroke(
                    &Shape::Segments(vec![(a.position, b.position)]),
                    &Paint::Solid(color.with_alpha(alpha)),
                    settings.line_weight,
                );
            }
        }
    }
}
