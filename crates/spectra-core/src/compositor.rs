//! Per-frame layer compositing
//!
//! The compositor runs in one of two modes. In normal mode every visible
//! layer is drawn in order with its own audio buffer, opacity and transform,
//! each framed by save/restore so no state leaks between layers. In edit
//! mode only the layer being transformed is drawn, fed with synthetic data,
//! with the transform gizmo on top.

use crate::color::{Rgb, Rgba};
use crate::gizmo::{GizmoHandle, TransformGizmo};
use crate::layer::{Layer, LayerStore};
use crate::resize::rescale_layers;
use crate::spectrum::{synthetic_decay, AudioFeed, DEFAULT_FFT_SIZE};
use crate::surface::Surface;
use crate::visualizers::{self, LayerState, VizInput};
use crate::ColorConfig;
use glam::Vec2;
use tracing::{debug, trace};

/// Neutral backdrop used while editing a transform
pub const EDIT_BACKGROUND: Rgb = Rgb::new(0x1a, 0x1a, 0x1a);

/// Which buffer a layer reads this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferSource {
    /// The global engine buffer
    Engine,
    /// The layer's own media analyser
    Media,
    /// The live microphone
    Microphone,
    /// A zeroed buffer
    Silence,
}

/// Pick the buffer for one layer.
///
/// With the microphone active, selected layers hear the microphone and the
/// rest keep their own ready media or go silent. Without it, ready media
/// wins, bound-but-loading media is silent and unbound layers use the engine.
pub fn select_source(layer: &Layer, selected: bool, feed: &dyn AudioFeed) -> BufferSource {
    let media_ready = layer.media.is_some() && feed.media_spectrum(layer.id).is_some();
    if feed.microphone_spectrum().is_some() {
        if selected {
            BufferSource::Microphone
        } else if media_ready {
            BufferSource::Media
        } else {
            BufferSource::Silence
        }
    } else if media_ready {
        BufferSource::Media
    } else if layer.media.is_some() {
        BufferSource::Silence
    } else {
        BufferSource::Engine
    }
}

/// Which mode rendered a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// All visible layers
    Normal,
    /// Single layer preview with gizmo
    Edit,
}

/// Summary of one rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Mode used
    pub mode: RenderMode,
    /// Number of layers drawn
    pub layers_drawn: usize,
    /// Whether the canvas size changed since the previous frame
    pub resized: bool,
}

/// Frame driver holding the reusable buffers and gizmo state
#[derive(Debug, Clone)]
pub struct Compositor {
    background: Rgba,
    silence: Vec<u8>,
    preview: Vec<u8>,
    last_size: Option<Vec2>,
    gizmo: TransformGizmo,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(Rgb::BLACK)
    }
}

fn draw_layer(
    surface: &mut dyn Surface,
    layer: &mut Layer,
    defaults: &ColorConfig,
    spectrum: &[u8],
    canvas: Vec2,
    opacity: f32,
) {
    surface.save();
    surface.set_global_alpha(opacity);
    if !layer.transform.is_identity() {
        surface.concat_transform(layer.transform.to_affine(canvas));
    }

    let input = VizInput {
        spectrum,
        colors: layer.colors.as_ref().unwrap_or(defaults),
    };
    let mut state = LayerState {
        seed: layer.seed(),
        settings: &layer.settings,
        sim: &mut layer.sim,
        gradients: &mut layer.gradients,
    };
    visualizers::render(layer.kind, surface, &input, &mut state);
    surface.restore();
}

impl Compositor {
    /// Create a compositor clearing to `background`
    pub fn new(background: Rgb) -> Self {
        Self {
            background: background.into(),
            silence: Vec::new(),
            preview: Vec::new(),
            last_size: None,
            gizmo: TransformGizmo::new(),
        }
    }

    /// Background color for normal mode
    pub fn background(&self) -> Rgba {
        self.background
    }

    /// Change the background color
    pub fn set_background(&mut self, background: Rgb) {
        self.background = background.into();
    }

    /// Last non-empty canvas size rendered
    pub fn last_size(&self) -> Option<Vec2> {
        self.last_size
    }

    fn sync_size(&mut self, store: &mut LayerStore, size: Vec2) -> bool {
        let resized = match self.last_size {
            Some(old) if old != size => {
                debug!(from = ?old, to = ?size, "Canvas resized");
                rescale_layers(store, old, size);
                true
            }
            _ => false,
        };
        self.last_size = Some(size);
        resized
    }

    /// Render one frame
    pub fn render_frame(
        &mut self,
        surface: &mut dyn Surface,
        store: &mut LayerStore,
        feed: &dyn AudioFeed,
    ) -> FrameStats {
        let size = surface.size();
        if size.x <= 0.0 || size.y <= 0.0 {
            // Sims never step against zero bounds; `last_size` stays at the
            // last drawable size so the next real frame rescales from it
            let mode = match store.editing() {
                Some(id) if store.get(id).is_some() => RenderMode::Edit,
                _ => RenderMode::Normal,
            };
            trace!(?size, "Skipping frame on empty canvas");
            return FrameStats {
                mode,
                layers_drawn: 0,
                resized: false,
            };
        }
        let resized = self.sync_size(store, size);

        let (mode, layers_drawn) = match store.editing() {
            Some(id) if store.get(id).is_some() => (RenderMode::Edit, self.render_edit(surface, store, feed, size)),
            _ => (RenderMode::Normal, self.render_normal(surface, store, feed, size)),
        };

        trace!(?mode, layers_drawn, "Frame rendered");
        FrameStats {
            mode,
            layers_drawn,
            resized,
        }
    }

    fn render_normal(
        &mut self,
        surface: &mut dyn Surface,
        store: &mut LayerStore,
        feed: &dyn AudioFeed,
        canvas: Vec2,
    ) -> usize {
        surface.clear(self.background);

        let engine = feed.engine_spectrum();
        let silent_len = if engine.is_empty() {
            DEFAULT_FFT_SIZE / 2
        } else {
            engine.len()
        };
        self.silence.clear();
        self.silence.resize(silent_len, 0);

        let sources: Vec<_> = store
            .layers()
            .iter()
            .map(|layer| select_source(layer, store.is_selected(layer.id), feed))
            .collect();

        let (layers, defaults) = store.render_parts();
        let mut drawn = 0;
        for (layer, source) in layers.iter_mut().zip(sources) {
            if !layer.should_render() {
                continue;
            }
            let spectrum: &[u8] = match source {
                BufferSource::Engine => engine,
                BufferSource::Media => feed.media_spectrum(layer.id).unwrap_or(self.silence.as_slice()),
                BufferSource::Microphone => feed.microphone_spectrum().unwrap_or(self.silence.as_slice()),
                BufferSource::Silence => self.silence.as_slice(),
            };
            let opacity = layer.opacity;
            draw_layer(surface, layer, defaults, spectrum, canvas, opacity);
            drawn += 1;
        }
        drawn
    }

    fn render_edit(
        &mut self,
        surface: &mut dyn Surface,
        store: &mut LayerStore,
        feed: &dyn AudioFeed,
        canvas: Vec2,
    ) -> usize {
        surface.clear(EDIT_BACKGROUND.into());

        let len = match feed.engine_spectrum().len() {
            0 => DEFAULT_FFT_SIZE / 2,
            n => n,
        };
        if self.preview.len() != len {
            self.preview.resize(len, 0);
            synthetic_decay(&mut self.preview);
        }

        let Some(id) = store.editing() else {
            return 0;
        };
        let (layers, defaults) = store.render_parts();
        let Some(layer) = layers.iter_mut().find(|l| l.id == id) else {
            return 0;
        };
        draw_layer(surface, layer, defaults, &self.preview, canvas, 1.0);
        TransformGizmo::draw(surface, &layer.transform, canvas);
        1
    }

    /// Start a gizmo drag on the edited layer
    pub fn pointer_down(&mut self, store: &LayerStore, canvas: Vec2, pointer: Vec2) -> Option<GizmoHandle> {
        let layer = store.get(store.editing()?)?;
        self.gizmo.pointer_down(&layer.transform, canvas, pointer)
    }

    /// Continue a gizmo drag; returns true if the edited layer's transform changed
    pub fn pointer_move(&mut self, store: &mut LayerStore, canvas: Vec2, pointer: Vec2) -> bool {
        let Some(id) = store.editing() else {
            return false;
        };
        match self.gizmo.pointer_move(canvas, pointer) {
            Some(transform) => store.set_transform(id, transform),
            None => false,
        }
    }

    /// End a gizmo drag
    pub fn pointer_up(&mut self) -> Option<GizmoHandle> {
        self.gizmo.pointer_up()
    }
}
