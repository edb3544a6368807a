//! Spectra Core - Layered Visualization Engine
//!
//! This crate contains the rendering core of Spectra, including:
//! - Color resolution (single, gradient, multi-gradient)
//! - Layer model and the layer store that owns every mutation
//! - Procedural visualizers with per-layer simulation state
//! - The per-frame compositor, resize rescaler and transform gizmo
//! - The drawing-surface contract implemented by render backends

#![warn(missing_docs)]

pub use glam::{Affine2, Vec2};
use thiserror::Error;

// Colors and gradients
pub mod color;
pub mod gradient_cache;
pub use color::{ColorConfig, ColorMode, ColorSource, ColorStop, GradientSegment, Rgb, Rgba, StopList};
pub use gradient_cache::{GradientCache, GradientKey};

// Drawing contract
pub mod surface;
pub use surface::{
    CommandRecorder, DrawCall, DrawState, Gradient, GradientKind, GradientStop, Paint, Shadow,
    Shape, Surface,
};

// Audio input
pub mod spectrum;
pub use spectrum::{AudioFeed, SpectrumBuffer};

// Layers
pub mod layer;
pub mod settings;
pub mod sim;
pub use layer::{Layer, LayerId, LayerStore, LayerTransform, MediaBinding, TransportTarget};
pub use settings::{
    BarsSettings, CircleSettings, ConstellationSettings, CrystalWallSettings, FlashSettings,
    ParticleSettings, VisualizerKind, VizSettings,
};
pub use sim::SimState;

// Rendering
pub mod compositor;
pub mod gizmo;
pub mod resize;
pub mod visualizers;
pub use compositor::{BufferSource, Compositor, FrameStats, RenderMode};
pub use gizmo::{GizmoHandle, TransformGizmo};

// Configuration
pub mod logging;
pub mod scene;
pub use logging::LogConfig;
pub use scene::{CanvasConfig, Scene};

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// A color string could not be parsed as `#rrggbb`
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Scene values out of range
    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    /// No layer with the given id
    #[error("Unknown layer: {0}")]
    UnknownLayer(LayerId),

    /// Scene (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
