//! Vertical spectrum bars growing from the bottom edge

use super::{LayerState, VizInput};
use crate::color::{ColorMode, ColorSource};
use crate::surface::{GradientKind, Paint, Shape, Surface};
use glam::Vec2;

/// Draw one bar per bin
pub fn render(surface: &mut dyn Surface, input: &VizInput<'_>, state: &mut LayerState<'_>) {
    let len = input.spectrum.len();
    if len == 0 {
        return;
    }

    let settings = state.settings.bars();
    let size = surface.size();
    let slot = size.x / len as f32;
    let bar_width = slot * settings.bar_width_multiplier;
    let inset = (slot - bar_width) * 0.5;

    // Volume-driven gradients resolve a color per bar
    let shared = match (input.colors.mode, input.colors.source) {
        (ColorMode::Single, _) => Some(Paint::solid(input.colors.primary())),
        (_, ColorSource::Frequency) => Some(Paint::Gradient(state.gradients.resolve(
            input.colors,
            GradientKind::Linear {
                start: Vec2::ZERO,
                end: Vec2::new(size.x, 0.0),
            },
        ))),
        (_, ColorSource::Volume) => None,
    };

    for (i, &value) in input.spectrum.iter().enumerate() {
        let height = value as f32 / 255.0 * size.y * settings.intensity;
        let shape = Shape::Rect {
            origin: Vec2::new(i as f32 * slot + inset, size.y - height),
            size: Vec2::new(bar_width, height),
        };
        match &shared {
            Some(paint) => surface.fill(&shape, paint),
            None => {
                let color = input.colors.color_at(value as f32 / 255.0);
                surface.fill(&shape, &Paint::solid(color));
            }
        }
    }
}
