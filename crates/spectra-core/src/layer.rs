//! Layer system for compositing independent visualizers
//!
//! A [`Layer`] pairs a visualizer with its own settings, colors, transform
//! and audio binding. The [`LayerStore`] owns the ordered layer list (later
//! layers draw on top) and is the only place layers are mutated, so every
//! invariant (at least one layer, cache invalidation on color changes,
//! state invalidation on structural changes) is enforced in one spot.

use crate::color::ColorConfig;
use crate::gradient_cache::GradientCache;
use crate::settings::{VisualizerKind, VizSettings};
use crate::sim::SimState;
use crate::visualizers::LayerState;
use crate::{CoreError, Result};
use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, warn};

/// Stable layer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

/// 2D placement of a layer around the canvas center
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayerTransform {
    /// Offset from the canvas center in pixels
    pub translate: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    /// Non-uniform scale, 1.0 = 100%
    pub scale: Vec2,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}

impl LayerTransform {
    /// Identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Whether this transform leaves the canvas unchanged
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Affine map for a canvas of `canvas` pixels: translate to center plus
    /// offset, rotate, scale, translate back
    pub fn to_affine(&self, canvas: Vec2) -> Affine2 {
        let center = canvas * 0.5;
        Affine2::from_translation(center + self.translate)
            * Affine2::from_angle(self.rotation)
            * Affine2::from_scale(self.scale)
            * Affine2::from_translation(-center)
    }
}

/// Decoded media owned by a layer; its analyser buffer is supplied by the
/// [`AudioFeed`](crate::AudioFeed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaBinding {
    /// Display name of the media (usually its file name)
    pub name: String,
}

/// Where transport commands (play, pause, seek) should go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportTarget {
    /// The global audio engine
    Engine,
    /// The media bound to this layer
    Layer(LayerId),
}

/// A single composited visualizer layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    /// Unique identifier
    pub id: LayerId,
    /// Display name
    pub name: String,
    /// Visibility state
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Opacity, 0.0 = transparent, 1.0 = opaque
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Visual algorithm
    #[serde(default)]
    pub kind: VisualizerKind,
    /// Per-kind settings records
    #[serde(default)]
    pub settings: VizSettings,
    /// Own color configuration; `None` uses the store default
    #[serde(default)]
    pub colors: Option<ColorConfig>,
    /// Placement on the canvas
    #[serde(default)]
    pub transform: LayerTransform,
    /// Bound media, if any
    #[serde(default)]
    pub media: Option<MediaBinding>,
    /// Simulation state, rebuilt lazily
    #[serde(skip)]
    pub sim: SimState,
    /// Cached gradients
    #[serde(skip)]
    pub gradients: GradientCache,
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

impl Layer {
    /// Create a bars layer
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            opacity: 1.0,
            kind: VisualizerKind::default(),
            settings: VizSettings::default(),
            colors: None,
            transform: LayerTransform::default(),
            media: None,
            sim: SimState::Empty,
            gradients: GradientCache::new(),
        }
    }

    /// Set the visualizer kind
    pub fn with_kind(mut self, kind: VisualizerKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set opacity
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = clamp_opacity(opacity);
        self
    }

    /// Give the layer its own colors
    pub fn with_colors(mut self, colors: ColorConfig) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Check if layer should be rendered
    pub fn should_render(&self) -> bool {
        self.visible && self.opacity > 0.0
    }

    /// Rename the layer
    pub fn rename(&mut self, new_name: impl Into<String>) {
        self.name = new_name.into();
    }

    /// The layer's colors, or `fallback` if it has none
    pub fn effective_colors<'a>(&'a self, fallback: &'a ColorConfig) -> &'a ColorConfig {
        self.colors.as_ref().unwrap_or(fallback)
    }

    /// Seed for the layer's random layouts
    pub fn seed(&self) -> u64 {
        self.id.0.wrapping_mul(0x9e37_79b9_7f4a_7c15)
    }

    /// Drop simulation state and cached gradients
    pub fn invalidate(&mut self) {
        self.sim.invalidate();
        self.gradients.invalidate();
    }

    /// Borrow the parts a visualizer mutates
    pub fn viz_state(&mut self) -> LayerState<'_> {
        LayerState {
            seed: self.seed(),
            settings: &self.settings,
            sim: &mut self.sim,
            gradients: &mut self.gradients,
        }
    }
}

fn clamp_opacity(opacity: f32) -> f32 {
    if opacity.is_nan() {
        0.0
    } else {
        opacity.clamp(0.0, 1.0)
    }
}

/// Ordered layer list plus selection and edit state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerStore {
    /// Layers in draw order
    layers: Vec<Layer>,
    /// Next available layer ID
    #[serde(default)]
    next_id: u64,
    /// Colors used by layers without their own
    #[serde(default)]
    default_colors: ColorConfig,
    #[serde(skip)]
    selection: BTreeSet<LayerId>,
    #[serde(skip)]
    editing: Option<LayerId>,
}

impl LayerStore {
    /// Create a store holding one bars layer
    pub fn new() -> Self {
        let mut store = Self {
            layers: Vec::new(),
            next_id: 1,
            default_colors: ColorConfig::default(),
            selection: BTreeSet::new(),
            editing: None,
        };
        store.add_layer(VisualizerKind::Bars);
        store
    }

    fn allocate_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create and append a layer of `kind`
    pub fn add_layer(&mut self, kind: VisualizerKind) -> LayerId {
        let id = self.allocate_id();
        let name = format!("Layer {}", self.layers.len() + 1);
        info!(%id, kind = kind.tag(), "Adding layer");
        self.layers.push(Layer::new(id, name).with_kind(kind));
        id
    }

    /// Append a prepared layer; a zero id is replaced by a fresh one
    pub fn push_layer(&mut self, mut layer: Layer) -> LayerId {
        if layer.id.0 == 0 || self.get(layer.id).is_some() {
            layer.id = self.allocate_id();
        } else {
            self.next_id = self.next_id.max(layer.id.0 + 1);
        }
        let id = layer.id;
        info!(%id, kind = layer.kind.tag(), "Adding layer");
        self.layers.push(layer);
        id
    }

    /// Remove a layer. The last remaining layer is never removed.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        if self.layers.len() <= 1 {
            warn!(%id, "Refusing to remove the last layer");
            return None;
        }
        let index = self.index_of(id)?;
        self.selection.remove(&id);
        if self.editing == Some(id) {
            self.editing = None;
        }
        info!(%id, "Removing layer");
        Some(self.layers.remove(index))
    }

    /// Duplicate a layer; the copy starts with fresh simulation state
    pub fn duplicate_layer(&mut self, id: LayerId) -> Option<LayerId> {
        let mut copy = self.get(id)?.clone();
        copy.id = self.allocate_id();
        copy.name = format!("{} (copy)", copy.name);
        copy.invalidate();
        let new_id = copy.id;
        info!(from = %id, to = %new_id, "Duplicating layer");
        self.layers.push(copy);
        Some(new_id)
    }

    /// Rename a layer
    pub fn rename_layer(&mut self, id: LayerId, new_name: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(layer) => {
                layer.rename(new_name);
                true
            }
            None => false,
        }
    }

    fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// Get a layer by ID
    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Get a mutable layer by ID
    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// All layers in draw order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Mutable layers in draw order
    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Layers that will be drawn, in draw order
    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|layer| layer.should_render())
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if the store is empty (only possible for a malformed scene)
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Move layer up in stack (drawn later)
    pub fn move_layer_up(&mut self, id: LayerId) -> bool {
        if let Some(index) = self.index_of(id) {
            if index + 1 < self.layers.len() {
                self.layers.swap(index, index + 1);
                return true;
            }
        }
        false
    }

    /// Move layer down in stack (drawn earlier)
    pub fn move_layer_down(&mut self, id: LayerId) -> bool {
        if let Some(index) = self.index_of(id) {
            if index > 0 {
                self.layers.swap(index, index - 1);
                return true;
            }
        }
        false
    }

    /// Move layer to a specific index
    pub fn move_layer_to(&mut self, id: LayerId, new_index: usize) -> bool {
        if let Some(old_index) = self.index_of(id) {
            if new_index < self.layers.len() {
                let layer = self.layers.remove(old_index);
                self.layers.insert(new_index, layer);
                return true;
            }
        }
        false
    }

    /// Flip visibility; returns the new state
    pub fn toggle_visibility(&mut self, id: LayerId) -> Option<bool> {
        let layer = self.get_mut(id)?;
        layer.visible = !layer.visible;
        Some(layer.visible)
    }

    /// Set opacity (clamped to `[0, 1]`)
    pub fn set_opacity(&mut self, id: LayerId, opacity: f32) -> bool {
        match self.get_mut(id) {
            Some(layer) => {
                layer.opacity = clamp_opacity(opacity);
                true
            }
            None => false,
        }
    }

    /// Add or remove a layer from the selection; returns whether it is now selected
    pub fn toggle_selection(&mut self, id: LayerId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        if self.selection.remove(&id) {
            false
        } else {
            self.selection.insert(id);
            true
        }
    }

    /// Select exactly one layer
    pub fn select_only(&mut self, id: LayerId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selection.clear();
        self.selection.insert(id);
        true
    }

    /// Deselect everything if every layer is selected, otherwise select all
    pub fn toggle_select_all(&mut self) {
        let all_selected = self.layers.iter().all(|l| self.selection.contains(&l.id));
        if all_selected {
            self.selection.clear();
        } else {
            self.selection = self.layers.iter().map(|l| l.id).collect();
        }
    }

    /// Clear the selection
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Whether a layer is selected
    pub fn is_selected(&self, id: LayerId) -> bool {
        self.selection.contains(&id)
    }

    /// Selected layer ids in draw order
    pub fn selected(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers
            .iter()
            .map(|l| l.id)
            .filter(|id| self.selection.contains(id))
    }

    /// Switch a layer's visualizer; its simulation state is discarded
    pub fn set_visualizer_kind(&mut self, id: LayerId, kind: VisualizerKind) -> bool {
        match self.get_mut(id) {
            Some(layer) => {
                if layer.kind != kind {
                    debug!(%id, from = layer.kind.tag(), to = kind.tag(), "Switching visualizer");
                    layer.kind = kind;
                    layer.invalidate();
                }
                true
            }
            None => false,
        }
    }

    /// Bind media to a layer
    pub fn assign_media(&mut self, id: LayerId, name: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(layer) => {
                let name = name.into();
                info!(%id, media = %name, "Binding media");
                layer.media = Some(MediaBinding { name });
                true
            }
            None => false,
        }
    }

    /// Unbind a layer's media
    pub fn clear_media(&mut self, id: LayerId) -> bool {
        match self.get_mut(id) {
            Some(layer) => layer.media.take().is_some(),
            None => false,
        }
    }

    /// First selected layer with bound media, else the engine
    pub fn transport_target(&self) -> TransportTarget {
        self.layers
            .iter()
            .find(|l| l.media.is_some() && self.selection.contains(&l.id))
            .map(|l| TransportTarget::Layer(l.id))
            .unwrap_or(TransportTarget::Engine)
    }

    /// Mutate a layer's settings records. Structural changes are picked up by
    /// the visualizer on its next frame.
    pub fn update_settings(&mut self, id: LayerId, update: impl FnOnce(&mut VizSettings)) -> Result<()> {
        let layer = self.get_mut(id).ok_or(CoreError::UnknownLayer(id))?;
        update(&mut layer.settings);
        Ok(())
    }

    fn update_layer(&mut self, id: LayerId, update: impl FnOnce(&mut Layer)) -> Result<()> {
        let layer = self.get_mut(id).ok_or_else(|| {
            warn!(%id, "Setting rejected for unknown layer");
            CoreError::UnknownLayer(id)
        })?;
        update(layer);
        Ok(())
    }

    /// Set the particle count, growing or truncating live particles at once
    pub fn set_particle_count(&mut self, id: LayerId, count: usize, bounds: Vec2) -> Result<()> {
        self.update_layer(id, |layer| {
            layer.settings.particles_mut().particle_count = count;
            let count = layer.settings.particles().particle_count;
            if let Some(sim) = layer.sim.particles_mut() {
                sim.set_count(count, bounds);
            }
        })
    }

    /// Set the particle base size
    pub fn set_particle_size(&mut self, id: LayerId, size: f32) -> Result<()> {
        self.update_layer(id, |layer| layer.settings.particles_mut().base_size = size)
    }

    /// Set the constellation node count
    pub fn set_constellation_node_count(&mut self, id: LayerId, count: usize) -> Result<()> {
        self.update_layer(id, |layer| layer.settings.constellation_mut().node_count = count)
    }

    /// Set the constellation node size
    pub fn set_constellation_node_size(&mut self, id: LayerId, size: f32) -> Result<()> {
        self.update_layer(id, |layer| layer.settings.constellation_mut().base_size = size)
    }

    /// Set the constellation edge width
    pub fn set_constellation_line_weight(&mut self, id: LayerId, weight: f32) -> Result<()> {
        self.update_layer(id, |layer| layer.settings.constellation_mut().line_weight = weight)
    }

    /// Set the constellation connect distance
    pub fn set_constellation_connect_distance(&mut self, id: LayerId, distance: f32) -> Result<()> {
        self.update_layer(id, |layer| {
            layer.settings.constellation_mut().connect_distance = distance
        })
    }

    /// Set the constellation per-frame motion multiplier
    pub fn set_constellation_node_speed(&mut self, id: LayerId, speed: f32) -> Result<()> {
        self.update_layer(id, |layer| layer.settings.constellation_mut().node_speed = speed)
    }

    /// Set the crystal wall anchor count
    pub fn set_crystal_node_count(&mut self, id: LayerId, count: usize) -> Result<()> {
        self.update_layer(id, |layer| layer.settings.crystal_wall_mut().node_count = count)
    }

    /// Set the crystal wall drift speed
    pub fn set_crystal_anchor_speed(&mut self, id: LayerId, speed: f32) -> Result<()> {
        self.update_layer(id, |layer| layer.settings.crystal_wall_mut().anchor_speed = speed)
    }

    /// Set the crystal wall jitter speed
    pub fn set_crystal_node_speed(&mut self, id: LayerId, speed: f32) -> Result<()> {
        self.update_layer(id, |layer| layer.settings.crystal_wall_mut().node_speed = speed)
    }

    /// Set the base radius of the layer's circle visualizer
    pub fn set_circle_radius(&mut self, id: LayerId, radius: f32) -> Result<()> {
        self.update_layer(id, |layer| match layer.kind {
            VisualizerKind::CircleLinear => layer.settings.circle_linear_mut().radius = radius,
            _ => layer.settings.circle_mut().radius = radius,
        })
    }

    /// Set the bar width multiplier
    pub fn set_bar_width_multiplier(&mut self, id: LayerId, multiplier: f32) -> Result<()> {
        self.update_layer(id, |layer| {
            layer.settings.bars_mut().bar_width_multiplier = multiplier
        })
    }

    /// Set the flash threshold
    pub fn set_flash_threshold(&mut self, id: LayerId, threshold: f32) -> Result<()> {
        self.update_layer(id, |layer| layer.settings.flash_mut().threshold = threshold)
    }

    /// Set the intensity of the layer's current visualizer
    pub fn set_intensity(&mut self, id: LayerId, intensity: f32) -> Result<()> {
        self.update_layer(id, |layer| {
            if !layer.settings.set_intensity(layer.kind, intensity) {
                debug!(kind = layer.kind.tag(), "Visualizer has no intensity setting");
            }
        })
    }

    /// Colors used by layers without their own
    pub fn default_colors(&self) -> &ColorConfig {
        &self.default_colors
    }

    /// Mutate a layer's colors (`Some`) or the shared default (`None`).
    ///
    /// A layer without its own colors starts from a copy of the default.
    /// Every gradient cache that could hold the old colors is dropped.
    pub fn update_colors(
        &mut self,
        target: Option<LayerId>,
        update: impl FnOnce(&mut ColorConfig),
    ) -> Result<()> {
        match target {
            Some(id) => {
                let default = &self.default_colors;
                let layer = self
                    .layers
                    .iter_mut()
                    .find(|l| l.id == id)
                    .ok_or(CoreError::UnknownLayer(id))?;
                update(layer.colors.get_or_insert_with(|| default.clone()));
                layer.gradients.invalidate();
            }
            None => {
                update(&mut self.default_colors);
                for layer in self.layers.iter_mut().filter(|l| l.colors.is_none()) {
                    layer.gradients.invalidate();
                }
            }
        }
        Ok(())
    }

    /// Drop a layer's own colors so it follows the default again
    pub fn reset_colors(&mut self, id: LayerId) -> Result<()> {
        self.update_layer(id, |layer| {
            layer.colors = None;
            layer.gradients.invalidate();
        })
    }

    /// Enter transform-edit mode for a layer
    pub fn begin_transform_edit(&mut self, id: LayerId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        debug!(%id, "Entering transform edit");
        self.editing = Some(id);
        true
    }

    /// Leave transform-edit mode
    pub fn end_transform_edit(&mut self) -> Option<LayerId> {
        self.editing.take()
    }

    /// Layer currently in transform-edit mode
    pub fn editing(&self) -> Option<LayerId> {
        self.editing
    }

    /// Replace a layer's transform
    pub fn set_transform(&mut self, id: LayerId, transform: LayerTransform) -> bool {
        match self.get_mut(id) {
            Some(layer) => {
                layer.transform = transform;
                true
            }
            None => false,
        }
    }

    /// Reset a layer's transform to identity
    pub fn reset_transform(&mut self, id: LayerId) -> bool {
        self.set_transform(id, LayerTransform::identity())
    }

    /// Drop every layer's simulation state and gradients
    pub fn invalidate_all(&mut self) {
        for layer in &mut self.layers {
            layer.invalidate();
        }
    }

    /// Make the id counter consistent with the loaded layers
    pub(crate) fn sync_next_id(&mut self) {
        let max = self.layers.iter().map(|l| l.id.0).max().unwrap_or(0);
        self.next_id = self.next_id.max(max + 1);
    }

    /// Layers and the default colors, borrowed together for rendering
    pub(crate) fn render_parts(&mut self) -> (&mut [Layer], &ColorConfig) {
        (&mut self.layers, &self.default_colors)
    }
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_layer_creation() {
        let layer = Layer::new(LayerId(1), "Test Layer")
            .with_kind(VisualizerKind::Particles)
            .with_opacity(0.5);

        assert_eq!(layer.id, LayerId(1));
        assert_eq!(layer.name, "Test Layer");
        assert_eq!(layer.kind, VisualizerKind::Particles);
        assert_eq!(layer.opacity, 0.5);
        assert!(layer.visible);
        assert!(layer.sim.is_empty());
        assert_eq!(layer.id.to_string(), "layer-1");
    }

    #[test]
    fn test_layer_should_render() {
        let mut layer = Layer::new(LayerId(1), "Test");
        assert!(layer.should_render());

        layer.visible = false;
        assert!(!layer.should_render());

        layer.visible = true;
        layer.opacity = 0.0;
        assert!(!layer.should_render());
    }

    #[test]
    fn test_store_starts_with_one_layer() {
        let store = LayerStore::new();
        assert_eq!(store.len(), 1);
        assert_eq!(store.layers()[0].kind, VisualizerKind::Bars);
    }

    #[test]
    fn test_store_reorder() {
        let mut store = LayerStore::new();
        let id1 = store.layers()[0].id;
        let id2 = store.add_layer(VisualizerKind::Circle);
        let id3 = store.add_layer(VisualizerKind::Flash);

        // Move layer 1 up: [2, 1, 3]
        store.move_layer_up(id1);
        assert_eq!(store.layers()[0].id, id2);
        assert_eq!(store.layers()[1].id, id1);

        // Move layer 3 down twice: [3, 2, 1]
        store.move_layer_down(id3);
        store.move_layer_down(id3);
        assert_eq!(store.layers()[0].id, id3);
        assert!(!store.move_layer_down(id3));
    }

    #[test]
    fn test_transform_identity_affine() {
        let affine = LayerTransform::identity().to_affine(Vec2::new(200.0, 100.0));
        let p = affine.transform_point2(Vec2::new(13.0, 7.0));
        assert!((p - Vec2::new(13.0, 7.0)).length() < 1e-5);
    }

    #[test]
    fn test_transform_rotates_around_center() {
        let transform = LayerTransform {
            rotation: std::f32::consts::PI,
            ..Default::default()
        };
        let affine = transform.to_affine(Vec2::new(200.0, 100.0));
        // Half turn maps the top-left corner onto the bottom-right corner
        let p = affine.transform_point2(Vec2::ZERO);
        assert!((p - Vec2::new(200.0, 100.0)).length() < 1e-3);
        // The center is fixed
        let c = affine.transform_point2(Vec2::new(100.0, 50.0));
        assert!((c - Vec2::new(100.0, 50.0)).length() < 1e-3);
    }

    #[test]
    fn test_transform_scale_and_offset() {
        let transform = LayerTransform {
            translate: Vec2::new(10.0, -5.0),
            rotation: 0.0,
            scale: Vec2::new(2.0, 0.5),
        };
        let affine = transform.to_affine(Vec2::new(100.0, 100.0));
        let p = affine.transform_point2(Vec2::new(100.0, 100.0));
        assert!((p - Vec2::new(160.0, 70.0)).length() < 1e-4);
    }

    #[test]
    fn test_layer_colors_fall_back_to_default() {
        let mut store = LayerStore::new();
        let id = store.layers()[0].id;
        let default = store.default_colors().clone();
        assert_eq!(store.get(id).unwrap().effective_colors(&default), &default);

        store
            .update_colors(Some(id), |c| *c = ColorConfig::single(Rgb::new(1, 2, 3)))
            .unwrap();
        let layer = store.get(id).unwrap();
        assert_eq!(layer.effective_colors(&default).primary(), Rgb::new(1, 2, 3));

        store.reset_colors(id).unwrap();
        assert!(store.get(id).unwrap().colors.is_none());
    }
}
