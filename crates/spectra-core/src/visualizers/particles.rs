//! Drifting particles that pulse with their frequency bin
//!
//! Particles live on a torus: leaving one edge re-enters on the opposite
//! edge. Count changes append or truncate; existing particles keep their
//! position and velocity.

use super::{bin_for, LayerState, VizInput};
use crate::color::{ColorConfig, Rgb};
use crate::settings::ParticleSettings;
use crate::sim::SimState;
use crate::surface::{Paint, Shadow, Shape, Surface};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Maximum radius added by a full-scale bin
const PULSE_SIZE: f32 = 10.0;

/// Glow radius of a full-scale bin
const MAX_GLOW: f32 = 30.0;

/// Volume color positions divide raw magnitudes by this
const VOLUME_SCALE: f32 = 200.0;

/// A single particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Contiguous index, drives the bin lookup
    pub index: usize,
    /// Position in canvas pixels
    pub position: Vec2,
    /// Per-frame velocity
    pub velocity: Vec2,
    /// Radius without pulse
    pub base_size: f32,
    /// Radius drawn last frame
    pub size: f32,
    /// Magnitude sampled last frame
    pub value: u8,
    /// Color resolved last frame
    pub color: Rgb,
}

/// State of one particle layer
#[derive(Debug, Clone)]
pub struct ParticleSim {
    rng: StdRng,
    particles: Vec<Particle>,
    base_size: f32,
}

fn wrap(value: f32, extent: f32) -> f32 {
    if extent <= 0.0 {
        return 0.0;
    }
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

impl ParticleSim {
    /// Spawn `settings.particle_count` particles inside `bounds`
    pub fn new(seed: u64, settings: &ParticleSettings, bounds: Vec2) -> Self {
        let mut sim = Self {
            rng: StdRng::seed_from_u64(seed),
            particles: Vec::with_capacity(settings.particle_count),
            base_size: settings.base_size,
        };
        sim.set_count(settings.particle_count, bounds);
        sim
    }

    fn spawn(&mut self, index: usize, bounds: Vec2) -> Particle {
        let rng = &mut self.rng;
        let position = Vec2::new(rng.gen::<f32>() * bounds.x, rng.gen::<f32>() * bounds.y);
        let velocity = Vec2::new((rng.gen::<f32>() - 0.5) * 0.5, (rng.gen::<f32>() - 0.5) * 0.5);
        let base_size = rng.gen::<f32>() * self.base_size + 1.0;
        Particle {
            index,
            position,
            velocity,
            base_size,
            size: base_size,
            value: 0,
            color: Rgb::WHITE,
        }
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether there are no particles
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// All particles in index order
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access for external nudging
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Base size range the particles were last sized with
    pub fn base_size(&self) -> f32 {
        self.base_size
    }

    /// Append or truncate to `count`, keeping existing particles untouched
    pub fn set_count(&mut self, count: usize, bounds: Vec2) {
        let current = self.particles.len();
        if count > current {
            for index in current..count {
                let particle = self.spawn(index, bounds);
                self.particles.push(particle);
            }
        } else if count < current {
            self.particles.truncate(count);
            for (index, particle) in self.particles.iter_mut().enumerate() {
                particle.index = index;
            }
        }
    }

    /// Re-randomize every base size for a new size range; positions are kept
    pub fn set_base_size(&mut self, base_size: f32) {
        if base_size == self.base_size {
            return;
        }
        self.base_size = base_size;
        for particle in &mut self.particles {
            particle.base_size = self.rng.gen::<f32>() * base_size + 1.0;
        }
    }

    /// Advance one frame: move, wrap, sample the bin and resolve the color
    pub fn step(&mut self, spectrum: &[u8], colors: &ColorConfig, intensity: f32, bounds: Vec2) {
        let count = self.particles.len();
        for particle in &mut self.particles {
            let moved = particle.position + particle.velocity * intensity;
            particle.position = Vec2::new(wrap(moved.x, bounds.x), wrap(moved.y, bounds.y));

            let bin = bin_for(particle.index, count, spectrum.len());
            let value = spectrum.get(bin).copied().unwrap_or(0);
            particle.value = value;
            particle.size = particle.base_size + value as f32 / 255.0 * PULSE_SIZE * intensity;

            let t = colors.source.select(
                particle.index as f32 / count as f32,
                value as f32 / VOLUME_SCALE,
            );
            particle.color = colors.color_at(t);
        }
    }

    /// Scale positions by `ratio`, keeping them inside `bounds`
    pub fn rescale(&mut self, ratio: Vec2, bounds: Vec2) {
        for particle in &mut self.particles {
            let scaled = particle.position * ratio;
            particle.position = Vec2::new(wrap(scaled.x, bounds.x), wrap(scaled.y, bounds.y));
        }
    }
}

/// Step and draw every particle with a glow proportional to its magnitude
pub fn render(surface: &mut dyn Surface, input: &VizInput<'_>, state: &mut LayerState<'_>) {
    if input.spectrum.is_empty() {
        return;
    }

    let settings = state.settings.particles();
    let bounds = surface.size();

    if !matches!(state.sim, SimState::Particles(_)) {
        debug!(count = settings.particle_count, "Building particle system");
        *state.sim = SimState::Particles(ParticleSim::new(state.seed, &settings, bounds));
    }
    let SimState::Particles(sim) = &mut *state.sim else {
        return;
    };

    if sim.len() != settings.particle_count {
        sim.set_count(settings.particle_count, bounds);
    }
    sim.set_base_size(settings.base_size);
    sim.step(input.spectrum, input.colors, settings.intensity, bounds);

    for particle in sim.particles() {
        surface.set_shadow(Some(Shadow {
            blur: particle.value as f32 / 255.0 * MAX_GLOW,
            color: particle.color.into(),
        }));
        surface.fill(
            &Shape::Circle {
                center: particle.position,
                radius: particle.size,
            },
            &Paint::solid(particle.color),
        );
    }
    surface.set_shadow(None);
}
