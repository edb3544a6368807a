//! Drawing surface contract
//!
//! The core never owns pixels. Visualizers issue drawing commands against a
//! [`Surface`], which a render backend rasterizes (see `spectra-render`) or
//! which [`CommandRecorder`] captures for inspection.

use crate::color::{Rgb, Rgba};
use glam::{Affine2, Vec2};
use std::f32::consts::TAU;
use std::sync::Arc;

/// Soft glow drawn under filled shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    /// Blur radius in pixels
    pub blur: f32,
    /// Glow color
    pub color: Rgba,
}

/// Geometry handed to the surface
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle
    Rect {
        /// Top-left corner
        origin: Vec2,
        /// Width and height
        size: Vec2,
    },
    /// Circle
    Circle {
        /// Center point
        center: Vec2,
        /// Radius
        radius: f32,
    },
    /// Closed polygon
    Polygon(Vec<Vec2>),
    /// Disjoint line segments (one subpath per segment)
    Segments(Vec<(Vec2, Vec2)>),
}

impl Shape {
    /// A representative point used when a paint must be sampled once per shape
    pub fn anchor(&self) -> Vec2 {
        match self {
            Shape::Rect { origin, size } => *origin + *size * 0.5,
            Shape::Circle { center, .. } => *center,
            Shape::Polygon(points) if !points.is_empty() => {
                points.iter().copied().sum::<Vec2>() / points.len() as f32
            }
            Shape::Segments(segments) if !segments.is_empty() => {
                segments.iter().map(|(a, b)| (*a + *b) * 0.5).sum::<Vec2>()
                    / segments.len() as f32
            }
            _ => Vec2::ZERO,
        }
    }
}

/// Gradient geometry, mirroring the canvas gradient constructors
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientKind {
    /// Linear gradient from `start` to `end`
    Linear {
        /// Offset 0 point
        start: Vec2,
        /// Offset 1 point
        end: Vec2,
    },
    /// Radial gradient between two concentric circles
    Radial {
        /// Shared center
        center: Vec2,
        /// Radius at offset 0
        inner: f32,
        /// Radius at offset 1
        outer: f32,
    },
    /// Conic (sweep) gradient around `center`, clockwise from `start_angle`
    Conic {
        /// Sweep center
        center: Vec2,
        /// Angle of offset 0, radians
        start_angle: f32,
    },
}

/// A gradient stop with offset in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position in `[0, 1]`
    pub offset: f32,
    /// Color at this position
    pub color: Rgb,
}

/// A canvas-style gradient object
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    /// Geometry
    pub kind: GradientKind,
    /// Stops sorted by offset
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    /// Build a gradient; stops are sorted (stably) by offset
    pub fn new(kind: GradientKind, stops: impl IntoIterator<Item = (f32, Rgb)>) -> Self {
        let mut stops: Vec<GradientStop> = stops
            .into_iter()
            .map(|(offset, color)| GradientStop {
                offset: offset.clamp(0.0, 1.0),
                color,
            })
            .collect();
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Self { kind, stops }
    }

    /// Gradient offset of `point` for this geometry (unclamped)
    pub fn offset_at(&self, point: Vec2) -> f32 {
        match self.kind {
            GradientKind::Linear { start, end } => {
                let axis = end - start;
                let len_sq = axis.length_squared();
                if len_sq <= f32::EPSILON {
                    0.0
                } else {
                    (point - start).dot(axis) / len_sq
                }
            }
            GradientKind::Radial {
                center,
                inner,
                outer,
            } => {
                let span = outer - inner;
                if span.abs() <= f32::EPSILON {
                    0.0
                } else {
                    ((point - center).length() - inner) / span
                }
            }
            GradientKind::Conic {
                center,
                start_angle,
            } => {
                let d = point - center;
                (d.y.atan2(d.x) - start_angle).rem_euclid(TAU) / TAU
            }
        }
    }

    /// Color at a gradient offset: clamped outside the stops, linear inside
    pub fn color_at_offset(&self, offset: f32) -> Rgb {
        let (first, last) = match self.stops.as_slice() {
            [] => return Rgb::BLACK,
            [only] => return only.color,
            [first, .., last] => (first, last),
        };
        if offset <= first.offset {
            return first.color;
        }
        if offset >= last.offset {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if offset >= a.offset && offset <= b.offset {
                let span = b.offset - a.offset;
                let t = if span <= 0.0 {
                    1.0
                } else {
                    (offset - a.offset) / span
                };
                let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
                return Rgb::new(mix(a.color.r, b.color.r), mix(a.color.g, b.color.g), mix(a.color.b, b.color.b));
            }
        }
        last.color
    }

    /// Color at a point in the gradient's coordinate space
    pub fn color_at_point(&self, point: Vec2) -> Rgb {
        self.color_at_offset(self.offset_at(point))
    }
}

/// How a shape is colored
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// A flat color
    Solid(Rgba),
    /// A shared, cached gradient
    Gradient(Arc<Gradient>),
}

impl Paint {
    /// Opaque flat color
    pub fn solid(color: Rgb) -> Self {
        Paint::Solid(color.into())
    }
}

/// Graphics state saved and restored by [`Surface::save`]/[`Surface::restore`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    /// Global alpha multiplier
    pub alpha: f32,
    /// Current transform
    pub transform: Affine2,
    /// Current glow
    pub shadow: Option<Shadow>,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            transform: Affine2::IDENTITY,
            shadow: None,
        }
    }
}

/// A 2D drawing surface with canvas-like state handling
pub trait Surface {
    /// Backing pixel dimensions
    fn size(&self) -> Vec2;
    /// Push the current [`DrawState`]
    fn save(&mut self);
    /// Pop the last saved [`DrawState`]; no-op on an empty stack
    fn restore(&mut self);
    /// Current global alpha
    fn global_alpha(&self) -> f32;
    /// Replace the global alpha
    fn set_global_alpha(&mut self, alpha: f32);
    /// Post-multiply the current transform
    fn concat_transform(&mut self, transform: Affine2);
    /// Set or clear the glow applied to fills
    fn set_shadow(&mut self, shadow: Option<Shadow>);
    /// Fill the whole surface, ignoring transform and alpha
    fn clear(&mut self, color: Rgba);
    /// Fill a shape
    fn fill(&mut self, shape: &Shape, paint: &Paint);
    /// Stroke a shape's outline
    fn stroke(&mut self, shape: &Shape, paint: &Paint, width: f32);
}

/// A recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// [`Surface::clear`]
    Clear(Rgba),
    /// [`Surface::fill`] with the state active at the time
    Fill {
        /// Shape filled
        shape: Shape,
        /// Paint used
        paint: Paint,
        /// State at call time
        state: DrawState,
    },
    /// [`Surface::stroke`] with the state active at the time
    Stroke {
        /// Shape stroked
        shape: Shape,
        /// Paint used
        paint: Paint,
        /// Line width
        width: f32,
        /// State at call time
        state: DrawState,
    },
}

/// A [`Surface`] that records calls instead of rasterizing
#[derive(Debug, Clone)]
pub struct CommandRecorder {
    size: Vec2,
    state: DrawState,
    stack: Vec<DrawState>,
    calls: Vec<DrawCall>,
}

impl CommandRecorder {
    /// Create a recorder reporting the given size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            state: DrawState::default(),
            stack: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// Change the reported size
    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    /// All recorded calls
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Number of fill and stroke calls (clears excluded)
    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| !matches!(call, DrawCall::Clear(_)))
            .count()
    }

    /// Drain recorded calls
    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    /// Current save-stack depth
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Current state
    pub fn state(&self) -> DrawState {
        self.state
    }
}

impl Surface for CommandRecorder {
    fn size(&self) -> Vec2 {
        self.size
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
        self.calls.push(DrawCall::Clear(color));
    }

    fn fill(&mut self, shape: &Shape, paint: &Paint) {
        self.calls.push(DrawCall::Fill {
            shape: shape.clone(),
            paint: paint.clone(),
            state: self.state,
        });
    }

    fn stroke(&mut self, shape: &Shape, paint: &Paint, width: f32) {
        self.calls.push(DrawCall::Stroke {
            shape: shape.clone(),
            paint: paint.clone(),
            width,
            state: self.state,
        });
    }
}
