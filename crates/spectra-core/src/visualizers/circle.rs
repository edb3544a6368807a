//! Radial spectra: the mirrored circle and the full-turn circle-linear

use super::{LayerState, VizInput};
use crate::color::{ColorConfig, ColorMode, ColorSource, Rgba};
use crate::gradient_cache::GradientCache;
use crate::settings::CircleSettings;
use crate::surface::{GradientKind, Paint, Shape, Surface};
use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Share of the buffer drawn by the mirrored circle, in tenths
const MIRRORED_TENTHS: usize = 7;

/// Radial line length per unit of magnitude
const LINE_SCALE: f32 = 0.8;

/// Stroke width of the radial lines
const LINE_WIDTH: f32 = 2.0;

const BASE_RING: Rgba = Rgba {
    r: 255,
    g: 255,
    b: 255,
    a: 0.1,
};

/// One radial line with the magnitude that drove it
struct Spoke {
    start: Vec2,
    end: Vec2,
    value: u8,
}

fn spoke(center: Vec2, radius: f32, angle: f32, value: u8, intensity: f32) -> Spoke {
    let dir = Vec2::new(angle.cos(), angle.sin());
    let length = value as f32 * LINE_SCALE * intensity;
    Spoke {
        start: center + dir * radius,
        end: center + dir * (radius + length),
        value,
    }
}

/// Mirror the first `floor(len * 0.7)` bins left and right from the top
pub fn render_mirrored(surface: &mut dyn Surface, input: &VizInput<'_>, state: &mut LayerState<'_>) {
    if input.spectrum.is_empty() {
        return;
    }
    // Zero for one or two bins, leaving only the base ring
    let usable = input.spectrum.len() * MIRRORED_TENTHS / 10;

    let settings = state.settings.circle();
    let center = surface.size() * 0.5;
    let step = PI / usable.max(1) as f32;
    let top = PI * 1.5;

    let mut spokes = Vec::with_capacity(usable * 2);
    for (i, &value) in input.spectrum[..usable].iter().enumerate() {
        let offset = i as f32 * step;
        spokes.push(spoke(center, settings.radius, top + offset, value, settings.intensity));
        spokes.push(spoke(center, settings.radius, top - offset, value, settings.intensity));
    }

    let kind = GradientKind::Linear {
        start: Vec2::new(0.0, center.y - settings.radius - 50.0),
        end: Vec2::new(0.0, center.y + settings.radius + 50.0),
    };
    draw(surface, input.colors, state.gradients, &settings, center, kind, spokes);
}

/// Spread every bin over a full turn, clockwise from the top
pub fn render_linear(surface: &mut dyn Surface, input: &VizInput<'_>, state: &mut LayerState<'_>) {
    let len = input.spectrum.len();
    if len == 0 {
        return;
    }

    let settings = state.settings.circle_linear();
    let center = surface.size() * 0.5;
    let step = TAU / len as f32;

    let spokes = input
        .spectrum
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            spoke(
                center,
                settings.radius,
                PI * 1.5 + i as f32 * step,
                value,
                settings.intensity,
            )
        })
        .collect();

    let kind = GradientKind::Conic {
        center,
        start_angle: -FRAC_PI_2,
    };
    draw(surface, input.colors, state.gradients, &settings, center, kind, spokes);
}

fn draw(
    surface: &mut dyn Surface,
    colors: &ColorConfig,
    gradients: &mut GradientCache,
    settings: &CircleSettings,
    center: Vec2,
    kind: GradientKind,
    spokes: Vec<Spoke>,
) {
    surface.stroke(
        &Shape::Circle {
            center,
            radius: settings.radius,
        },
        &Paint::Solid(BASE_RING),
        1.0,
    );
    if spokes.is_empty() {
        return;
    }

    let paint = match (colors.mode, colors.source) {
        (ColorMode::Single, _) => Paint::solid(colors.primary()),
        (_, ColorSource::Frequency) => Paint::Gradient(gradients.resolve(colors, kind)),
        (_, ColorSource::Volume) => {
            // Each segment is restroked with its own color
            for spoke in &spokes {
                let color = colors.color_at(spoke.value as f32 / 255.0);
                surface.stroke(
                    &Shape::Segments(vec![(spoke.start, spoke.end)]),
                    &Paint::solid(color),
                    LINE_WIDTH,
                );
            }
            return;
        }
    };

    let segments = spokes.into_iter().map(|s| (s.start, s.end)).collect();
    surface.stroke(&Shape::Segments(segments), &paint, LINE_WIDTH);
}
