//! `tiny_skia` implementation of the drawing surface
//!
//! Linear gradients map onto `tiny_skia::LinearGradient`. Radial and conic
//! gradients are sampled at [`Shape::anchor`]: once per filled shape, and once
//! per line for stroked [`Shape::Segments`], so a ring of spokes sweeps through
//! the stops.

use crate::{RenderError, Result};
use glam::{Affine2, Vec2};
use spectra_core::{DrawState, Gradient, GradientKind, Paint, Rgba, Shadow, Shape, Surface};
use std::path::Path;
use tiny_skia::{
    Color, FillRule, GradientStop, LinearGradient, Path as SkPath, PathBuilder, Pixmap, Point,
    Rect, SpreadMode, Stroke, Transform,
};
use tracing::{debug, trace};

/// Rings drawn for a glow
const GLOW_RINGS: usize = 3;

/// Alpha of each glow ring relative to the glow color
const GLOW_RING_ALPHA: f32 = 0.15;

/// A raster surface backed by a premultiplied RGBA pixmap
pub struct PixmapSurface {
    pixmap: Pixmap,
    state: DrawState,
    stack: Vec<DrawState>,
}

fn to_skia_transform(affine: Affine2) -> Transform {
    let m = affine.matrix2;
    let t = affine.translation;
    Transform::from_row(m.x_axis.x, m.x_axis.y, m.y_axis.x, m.y_axis.y, t.x, t.y)
}

fn to_skia_color(color: Rgba, alpha: f32) -> Color {
    let a = (color.a * alpha).clamp(0.0, 1.0);
    Color::from_rgba8(color.r, color.g, color.b, (a * 255.0).round() as u8)
}

fn build_path(shape: &Shape) -> Option<SkPath> {
    match shape {
        Shape::Rect { origin, size } => {
            if size.x <= 0.0 || size.y <= 0.0 {
                return None;
            }
            let rect = Rect::from_xywh(origin.x, origin.y, size.x, size.y)?;
            Some(PathBuilder::from_rect(rect))
        }
        Shape::Circle { center, radius } if *radius > 0.0 => {
            PathBuilder::from_circle(center.x, center.y, *radius)
        }
        Shape::Circle { .. } => None,
        Shape::Polygon(points) => {
            let (first, rest) = points.split_first()?;
            let mut pb = PathBuilder::new();
            pb.move_to(first.x, first.y);
            for p in rest {
                pb.line_to(p.x, p.y);
            }
            pb.close();
            pb.finish()
        }
        Shape::Segments(segments) => {
            let mut pb = PathBuilder::new();
            for (a, b) in segments {
                pb.move_to(a.x, a.y);
                pb.line_to(b.x, b.y);
            }
            pb.finish()
        }
    }
}

fn linear_shader(gradient: &Gradient, start: Vec2, end: Vec2, alpha: f32) -> Option<tiny_skia::Shader<'static>> {
    let stops: Vec<GradientStop> = gradient
        .stops
        .iter()
        .map(|s| GradientStop::new(s.offset, to_skia_color(s.color.into(), alpha)))
        .collect();
    LinearGradient::new(
        Point::from_xy(start.x, start.y),
        Point::from_xy(end.x, end.y),
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    )
}

impl PixmapSurface {
    /// Allocate a transparent surface
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::ZeroSize { width, height })?;
        Ok(Self {
            pixmap,
            state: DrawState::default(),
            stack: Vec::new(),
        })
    }

    /// Reallocate at a new size; contents and state are reset
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if self.pixmap.width() == width && self.pixmap.height() == height {
            return Ok(());
        }
        debug!(width, height, "Resizing pixmap surface");
        *self = Self::new(width, height)?;
        Ok(())
    }

    /// The backing pixmap
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Unpremultiplied RGBA of one pixel, `None` outside the surface
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let p = self.pixmap.pixel(x, y)?.demultiply();
        Some([p.red(), p.green(), p.blue(), p.alpha()])
    }

    /// Encode the current contents as PNG
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Png(e.to_string()))
    }

    /// Write the current contents to a PNG file
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        trace!(path = %path.display(), "Writing frame");
        self.pixmap
            .save_png(path)
            .map_err(|e| RenderError::Png(format!("{}: {}", path.display(), e)))
    }

    fn paint_for(&self, shape: &Shape, paint: &Paint) -> Option<tiny_skia::Paint<'static>> {
        let alpha = self.state.alpha;
        let mut sk = tiny_skia::Paint {
            anti_alias: true,
            ..Default::default()
        };
        match paint {
            Paint::Solid(color) => sk.set_color(to_skia_color(*color, alpha)),
            Paint::Gradient(gradient) => match gradient.kind {
                GradientKind::Linear { start, end } if gradient.stops.len() > 1 => {
                    sk.shader = linear_shader(gradient, start, end, alpha)?;
                }
                _ => {
                    let color = gradient.color_at_point(shape.anchor());
                    sk.set_color(to_skia_color(color.into(), alpha));
                }
            },
        }
        Some(sk)
    }

    fn draw_glow(&mut self, shape: &Shape, shadow: Shadow, transform: Transform) {
        if shadow.blur <= 0.0 {
            return;
        }
        let color = shadow.color.fade(GLOW_RING_ALPHA);
        let mut paint = tiny_skia::Paint {
            anti_alias: true,
            ..Default::default()
        };
        paint.set_color(to_skia_color(color, self.state.alpha));

        for ring in 1..=GLOW_RINGS {
            let spread = shadow.blur * ring as f32 / GLOW_RINGS as f32;
            match shape {
                Shape::Circle { center, radius } => {
                    if let Some(path) = PathBuilder::from_circle(center.x, center.y, radius + spread) {
                        self.pixmap
                            .fill_path(&path, &paint, FillRule::Winding, transform, None);
                    }
                }
                _ => {
                    if let Some(path) = build_path(shape) {
                        let stroke = Stroke {
                            width: spread * 2.0,
                            ..Default::default()
                        };
                        self.pixmap.stroke_path(&path, &paint, &stroke, transform, None);
                    }
                }
            }
        }
    }
}

impl Surface for PixmapSurface {
    fn size(&self) -> Vec2 {
        Vec2::new(self.pixmap.width() as f32, self.pixmap.height() as f32)
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn global_alpha(&self) -> f32 {
        self.state.alpha
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
    }

    fn concat_transform(&mut self, transform: Affine2) {
        self.state.transform = self.state.transform * transform;
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.state.shadow = shadow;
    }

    fn clear(&mut self, color: Rgba) {
        self.pixmap.fill(to_skia_color(color, 1.0));
    }

    fn fill(&mut self, shape: &Shape, paint: &Paint) {
        if self.state.alpha <= 0.0 {
            return;
        }
        let transform = to_skia_transform(self.state.transform);
        if let Some(shadow) = self.state.shadow {
            self.draw_glow(shape, shadow, transform);
        }
        let (Some(path), Some(sk)) = (build_path(shape), self.paint_for(shape, paint)) else {
            return;
        };
        self.pixmap
            .fill_path(&path, &sk, FillRule::Winding, transform, None);
    }

    fn stroke(&mut self, shape: &Shape, paint: &Paint, width: f32) {
        if self.state.alpha <= 0.0 || width.is_nan() || width <= 0.0 {
            return;
        }
        let transform = to_skia_transform(self.state.transform);
        let stroke = Stroke {
            width,
            ..Default::default()
        };

        // Point-sampled gradients get one sample per segment
        if let (Shape::Segments(segments), Paint::Gradient(gradient)) = (shape, paint) {
            if !matches!(gradient.kind, GradientKind::Linear { .. }) {
                for &segment in segments {
                    let single = Shape::Segments(vec![segment]);
                    if let (Some(path), Some(sk)) = (build_path(&single), self.paint_for(&single, paint)) {
                        self.pixmap.stroke_path(&path, &sk, &stroke, transform, None);
                    }
                }
                return;
            }
        }

        let (Some(path), Some(sk)) = (build_path(shape), self.paint_for(shape, paint)) else {
            return;
        };
        self.pixmap.stroke_path(&path, &sk, &stroke, transform, None);
    }
}
