//! Proportional remapping of simulation state on canvas resize

use crate::layer::LayerStore;
use glam::Vec2;
use tracing::debug;

/// Rescale every layer's simulation coordinates from `old` to `new` canvas
/// dimensions and drop cached gradients (their geometry depends on size).
///
/// Nodes and particles are only moved, never added or removed. Returns the
/// number of layers whose state was remapped; a non-positive size on either
/// side leaves the coordinates untouched.
pub fn rescale_layers(store: &mut LayerStore, old: Vec2, new: Vec2) -> usize {
    let valid = old.cmpgt(Vec2::ZERO).all() && new.cmpgt(Vec2::ZERO).all();
    let mut remapped = 0;

    for layer in store.layers_mut() {
        layer.gradients.invalidate();
        if valid && !layer.sim.is_empty() {
            layer.sim.rescale(old, new);
            remapped += 1;
        }
    }

    debug!(
        from = ?old,
        to = ?new,
        layers = remapped,
        "Rescaled simulation state"
    );
    remapped
}
