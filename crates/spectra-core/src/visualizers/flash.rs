//! Full-screen flash whose opacity follows the mean level

use super::{LayerState, VizInput};
use crate::color::Rgb;
use crate::spectrum::mean_level;
use crate::surface::{Paint, Shape, Surface};
use glam::Vec2;

/// Fill the canvas with the first configured stop when the mean level passes the threshold
pub fn render(surface: &mut dyn Surface, input: &VizInput<'_>, state: &mut LayerState<'_>) {
    if input.spectrum.is_empty() {
        return;
    }

    let level = mean_level(input.spectrum);
    if level < state.settings.flash().threshold {
        return;
    }

    // First stop as entered, not the lowest offset
    let color = input
        .colors
        .stops
        .stops()
        .first()
        .map(|s| s.color)
        .unwrap_or(Rgb::WHITE);

    let size = surface.size();
    surface.save();
    let alpha = surface.global_alpha() * level;
    surface.set_global_alpha(alpha);
    surface.fill(
        &Shape::Rect {
            origin: Vec2::ZERO,
            size,
        },
        &Paint::solid(color),
    );
    surface.restore();
}
