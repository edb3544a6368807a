//! Scene files
//!
//! A scene is the persisted form of everything the driver needs: canvas
//! geometry, background, analyser detail, the layer store and logging.

use crate::color::Rgb;
use crate::layer::LayerStore;
use crate::logging::LogConfig;
use crate::spectrum::fft_size_for_detail;
use crate::{CoreError, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

/// Current scene file version
pub const SCENE_VERSION: u32 = 1;

/// Output canvas geometry and frame rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frames per second
    pub fps: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 60.0,
        }
    }
}

impl CanvasConfig {
    /// Size as a vector
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// A complete scene
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// Display name
    pub name: String,
    /// File format version
    pub version: u32,
    /// Canvas geometry
    pub canvas: CanvasConfig,
    /// Normal-mode background
    pub background: Rgb,
    /// Analyser detail level, 1..=6
    pub fft_detail: u8,
    /// Layers and default colors
    pub layers: LayerStore,
    /// Logging settings
    pub log: LogConfig,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            name: "Untitled".to_string(),
            version: SCENE_VERSION,
            canvas: CanvasConfig::default(),
            background: Rgb::BLACK,
            fft_detail: 3,
            layers: LayerStore::new(),
            log: LogConfig::default(),
        }
    }
}

impl Scene {
    /// Parse and validate a scene from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let mut scene: Scene = serde_json::from_str(json)?;
        scene.layers.sync_next_id();
        scene.validate()?;
        info!(
            name = %scene.name,
            layers = scene.layers.len(),
            "Loaded scene"
        );
        Ok(scene)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// FFT size implied by the detail level
    pub fn fft_size(&self) -> usize {
        fft_size_for_detail(self.fft_detail)
    }

    /// Check values a scene file could get wrong
    pub fn validate(&self) -> Result<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(CoreError::InvalidScene(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }
        if !self.canvas.fps.is_finite() || self.canvas.fps <= 0.0 {
            return Err(CoreError::InvalidScene(format!(
                "fps must be positive, got {}",
                self.canvas.fps
            )));
        }
        if !(1..=6).contains(&self.fft_detail) {
            return Err(CoreError::InvalidScene(format!(
                "fft_detail must be 1..=6, got {}",
                self.fft_detail
            )));
        }
        if self.layers.is_empty() {
            return Err(CoreError::InvalidScene("scene has no layers".to_string()));
        }

        let mut seen = HashSet::new();
        for layer in self.layers.layers() {
            if !seen.insert(layer.id) {
                return Err(CoreError::InvalidScene(format!("duplicate layer id {}", layer.id)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::VisualizerKind;

    #[test]
    fn test_default_scene_is_valid() {
        let scene = Scene::default();
        scene.validate().unwrap();
        assert_eq!(scene.fft_size(), 2048);
    }

    #[test]
    fn test_json_keeps_layers_and_colors() {
        let mut scene = Scene::default();
        let id = scene.layers.add_layer(VisualizerKind::Constellation);
        scene.layers.set_opacity(id, 0.4);
        scene.background = Rgb::new(0x10, 0x20, 0x30);

        let json = scene.to_json().unwrap();
        assert!(json.contains("\"#102030\""));

        let mut loaded = Scene::from_json(&json).unwrap();
        assert_eq!(loaded.layers.len(), 2);
        assert_eq!(loaded.layers.get(id).unwrap().kind, VisualizerKind::Constellation);
        assert_eq!(loaded.layers.get(id).unwrap().opacity, 0.4);

        // Ids continue after the loaded ones
        let next = loaded.layers.add_layer(VisualizerKind::Bars);
        assert!(next.0 > id.0);
    }

    #[test]
    fn test_partial_scene_uses_defaults() {
        let scene = Scene::from_json(r#"{ "name": "Partial" }"#).unwrap();
        assert_eq!(scene.name, "Partial");
        assert_eq!(scene.canvas, CanvasConfig::default());
        assert_eq!(scene.layers.len(), 1);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Scene::from_json(r#"{ "canvas": { "width": 0 } }"#),
            Err(CoreError::InvalidScene(_))
        ));
        assert!(matches!(
            Scene::from_json(r#"{ "fft_detail": 9 }"#),
            Err(CoreError::InvalidScene(_))
        ));
        assert!(matches!(
            Scene::from_json(r##"{ "background": "#zzzzzz" }"##),
            Err(CoreError::Serialization(_))
        ));
    }
}
