//! Visualizer algorithms
//!
//! Every visualizer has the same shape: it reads one frequency buffer and a
//! color configuration, may read and mutate its layer's simulation state,
//! and issues drawing commands against a [`Surface`]. A missing buffer or a
//! zero-length buffer returns before any drawing call.

pub mod bars;
pub mod circle;
pub mod constellation;
pub mod crystal_wall;
pub mod flash;
pub mod particles;

use crate::color::ColorConfig;
use crate::gradient_cache::GradientCache;
use crate::settings::{VisualizerKind, VizSettings};
use crate::sim::SimState;
use crate::surface::Surface;

pub use constellation::{ConstellationNode, ConstellationSim};
pub use crystal_wall::{grid_anchor, CrystalSim};
pub use particles::{Particle, ParticleSim};

/// Read-only per-frame inputs of a visualizer
#[derive(Debug, Clone, Copy)]
pub struct VizInput<'a> {
    /// The layer's resolved frequency buffer
    pub spectrum: &'a [u8],
    /// The layer's effective color configuration
    pub colors: &'a ColorConfig,
}

/// Mutable per-layer state handed to a visualizer
#[derive(Debug)]
pub struct LayerState<'a> {
    /// Seed for rebuilding random initial layouts
    pub seed: u64,
    /// The layer's settings records
    pub settings: &'a VizSettings,
    /// Lazily created simulation state
    pub sim: &'a mut SimState,
    /// Gradient cache for this layer
    pub gradients: &'a mut GradientCache,
}

/// Signature shared by every visualizer
pub type RenderFn = fn(&mut dyn Surface, &VizInput<'_>, &mut LayerState<'_>);

/// Dispatch table from kind to render function
pub fn renderer(kind: VisualizerKind) -> RenderFn {
    match kind {
        VisualizerKind::Bars => bars::render,
        VisualizerKind::Circle => circle::render_mirrored,
        VisualizerKind::CircleLinear => circle::render_linear,
        VisualizerKind::Particles => particles::render,
        VisualizerKind::Constellation => constellation::render,
        VisualizerKind::CrystalWall => crystal_wall::render,
        VisualizerKind::Flash => flash::render,
    }
}

/// Render one layer with the visualizer for `kind`
pub fn render(
    kind: VisualizerKind,
    surface: &mut dyn Surface,
    input: &VizInput<'_>,
    state: &mut LayerState<'_>,
) {
    (renderer(kind))(surface, input, state)
}

/// Frequency bin sampled by element `index` of `count`
pub(crate) fn bin_for(index: usize, count: usize, len: usize) -> usize {
    if count == 0 {
        return 0;
    }
    ((index as f32 / count as f32) * (len as f32 * 0.5)).floor() as usize
}


#[cfg(test)]
mod tests {
    use super::test_support::Harness;
    use super::*;
    use crate::surface::CommandRecorder;

    #[test]
    fn test_every_kind_noops_on_empty_buffer() {
        for &kind in VisualizerKind::all() {
            let mut surface = CommandRecorder::new(320.0, 240.0);
            let mut harness = Harness::new(VizSettings::default());
            harness.run(kind, &mut surface, &[], &ColorConfig::default());
            assert_eq!(surface.draw_count(), 0, "{} drew on empty buffer", kind.tag());
            assert_eq!(surface.depth(), 0);
        }
    }

    #[test]
    fn test_bin_mapping() {
        assert_eq!(bin_for(0, 100, 1024), 0);
        assert_eq!(bin_for(50, 100, 1024), 256);
        assert_eq!(bin_for(99, 100, 1024), 506);
        assert_eq!(bin_for(3, 0, 1024), 0);
    }
}
