//! Per-layer simulation state
//!
//! The state is created lazily by the visualizer on its first frame and may
//! be reset to [`SimState::Empty`] at any time; the next frame rebuilds it
//! from the current settings.

use crate::visualizers::{ConstellationSim, CrystalSim, ParticleSim};
use glam::Vec2;

/// Visualizer-specific simulation state of one layer
#[derive(Debug, Clone, Default)]
pub enum SimState {
    /// Nothing built yet, or invalidated
    #[default]
    Empty,
    /// Particle system
    Particles(ParticleSim),
    /// Proximity graph
    Constellation(ConstellationSim),
    /// Crystal wall camera drift
    Crystal(CrystalSim),
}

impl SimState {
    /// Drop the state; the next frame rebuilds it
    pub fn invalidate(&mut self) {
        *self = SimState::Empty;
    }

    /// Whether nothing is built
    pub fn is_empty(&self) -> bool {
        matches!(self, SimState::Empty)
    }

    /// Number of simulated particles or nodes
    pub fn node_count(&self) -> usize {
        match self {
            SimState::Empty | SimState::Crystal(_) => 0,
            SimState::Particles(sim) => sim.len(),
            SimState::Constellation(sim) => sim.len(),
        }
    }

    /// Remap every stored coordinate from `old` to `new` canvas dimensions.
    /// Does nothing unless both sizes are strictly positive.
    pub fn rescale(&mut self, old: Vec2, new: Vec2) {
        if old.x <= 0.0 || old.y <= 0.0 || new.x <= 0.0 || new.y <= 0.0 {
            return;
        }
        let ratio = new / old;
        match self {
            SimState::Empty => {}
            SimState::Particles(sim) => sim.rescale(ratio, new),
            SimState::Constellation(sim) => sim.rescale(ratio, new),
            SimState::Crystal(sim) => sim.rescale(ratio, new),
        }
    }

    /// Particle state, if this is a particle system
    pub fn particles(&self) -> Option<&ParticleSim> {
        match self {
            SimState::Particles(sim) => Some(sim),
            _ => None,
        }
    }

    /// Mutable particle state
    pub fn particles_mut(&mut self) -> Option<&mut ParticleSim> {
        match self {
            SimState::Particles(sim) => Some(sim),
            _ => None,
        }
    }

    /// Constellation state, if this is a proximity graph
    pub fn constellation(&self) -> Option<&ConstellationSim> {
        match self {
            SimState::Constellation(sim) => Some(sim),
            _ => None,
        }
    }

    /// Mutable constellation state
    pub fn constellation_mut(&mut self) -> Option<&mut ConstellationSim> {
        match self {
            SimState::Constellation(sim) => Some(sim),
            _ => None,
        }
    }

    /// Crystal wall state
    pub fn crystal(&self) -> Option<&CrystalSim> {
        match self {
            SimState::Crystal(sim) => Some(sim),
            _ => None,
        }
    }
}
