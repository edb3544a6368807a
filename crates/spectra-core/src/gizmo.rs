//! On-canvas transform gizmo for edit mode
//!
//! The gizmo frames the edited layer's canvas rectangle as it appears after
//! the layer transform. Dragging inside it translates, the eight edge and
//! corner handles scale non-uniformly, and the handle above the top edge
//! rotates around the layer's current center.

use crate::color::Rgba;
use crate::layer::LayerTransform;
use crate::surface::{Paint, Shape, Surface};
use glam::{Affine2, Vec2};

/// Pick radius around a handle, in screen pixels
pub const HANDLE_RADIUS: f32 = 10.0;

/// Distance of the rotate handle above the top edge, in screen pixels
pub const ROTATE_OFFSET: f32 = 30.0;

/// Smallest scale a drag can produce on either axis
pub const MIN_SCALE: f32 = 0.05;

const OUTLINE: Rgba = Rgba {
    r: 0,
    g: 200,
    b: 255,
    a: 0.9,
};

const HANDLE_FILL: Rgba = Rgba {
    r: 255,
    g: 255,
    b: 255,
    a: 1.0,
};

/// A grabbable part of the gizmo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoHandle {
    /// Body of the frame
    Move,
    /// Edge or corner handle; each component is -1, 0 or 1 (0 leaves that axis alone)
    Scale {
        /// Horizontal side
        x: i8,
        /// Vertical side
        y: i8,
    },
    /// Handle above the top-center edge
    Rotate,
}

const SCALE_HANDLES: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

#[derive(Debug, Clone, Copy)]
struct Drag {
    handle: GizmoHandle,
    start_pointer: Vec2,
    start: LayerTransform,
}

/// Interaction state of the gizmo
#[derive(Debug, Clone, Default)]
pub struct TransformGizmo {
    dragging: Option<Drag>,
}

/// Local (untransformed canvas) position of a scale handle
fn scale_handle_local(x: i8, y: i8, canvas: Vec2) -> Vec2 {
    canvas * 0.5 + Vec2::new(x as f32, y as f32) * canvas * 0.5
}

fn rotate_handle_local(transform: &LayerTransform, canvas: Vec2) -> Vec2 {
    let sy = transform.scale.y.abs().max(MIN_SCALE);
    Vec2::new(canvas.x * 0.5, -ROTATE_OFFSET / sy)
}

/// Map a screen point into the layer's local canvas space
pub fn to_local(transform: &LayerTransform, canvas: Vec2, point: Vec2) -> Option<Vec2> {
    let affine = transform.to_affine(canvas);
    let det = affine.matrix2.determinant();
    if !det.is_finite() || det.abs() <= f32::EPSILON {
        return None;
    }
    Some(affine.inverse().transform_point2(point))
}

impl TransformGizmo {
    /// Create an idle gizmo
    pub fn new() -> Self {
        Self::default()
    }

    /// Screen positions of all handles
    pub fn handles(transform: &LayerTransform, canvas: Vec2) -> Vec<(GizmoHandle, Vec2)> {
        let affine = transform.to_affine(canvas);
        let mut handles: Vec<(GizmoHandle, Vec2)> = SCALE_HANDLES
            .iter()
            .map(|&(x, y)| {
                (
                    GizmoHandle::Scale { x, y },
                    affine.transform_point2(scale_handle_local(x, y, canvas)),
                )
            })
            .collect();
        handles.push((
            GizmoHandle::Rotate,
            affine.transform_point2(rotate_handle_local(transform, canvas)),
        ));
        handles
    }

    /// What a pointer at `pointer` would grab, if anything
    pub fn hit_test(transform: &LayerTransform, canvas: Vec2, pointer: Vec2) -> Option<GizmoHandle> {
        let handles = Self::handles(transform, canvas);
        // Rotate wins over overlapping scale handles
        if let Some((handle, _)) = handles
            .iter()
            .rev()
            .find(|(_, pos)| pos.distance(pointer) <= HANDLE_RADIUS)
        {
            return Some(*handle);
        }

        let local = to_local(transform, canvas, pointer)?;
        let inside = local.x >= 0.0 && local.x <= canvas.x && local.y >= 0.0 && local.y <= canvas.y;
        inside.then_some(GizmoHandle::Move)
    }

    /// Start a drag; returns the grabbed handle
    pub fn pointer_down(&mut self, transform: &LayerTransform, canvas: Vec2, pointer: Vec2) -> Option<GizmoHandle> {
        let handle = Self::hit_test(transform, canvas, pointer)?;
        self.dragging = Some(Drag {
            handle,
            start_pointer: pointer,
            start: *transform,
        });
        Some(handle)
    }

    /// Continue a drag; returns the updated transform while dragging
    pub fn pointer_move(&self, canvas: Vec2, pointer: Vec2) -> Option<LayerTransform> {
        let drag = self.dragging?;
        let mut next = drag.start;
        let center = canvas * 0.5 + drag.start.translate;

        match drag.handle {
            GizmoHandle::Move => {
                next.translate = drag.start.translate + (pointer - drag.start_pointer);
            }
            GizmoHandle::Scale { x, y } => {
                let local = Affine2::from_angle(-drag.start.rotation).transform_vector2(pointer - center);
                let half = canvas * 0.5;
                if x != 0 && half.x > 0.0 {
                    next.scale.x = (local.x * x as f32 / half.x).max(MIN_SCALE);
                }
                if y != 0 && half.y > 0.0 {
                    next.scale.y = (local.y * y as f32 / half.y).max(MIN_SCALE);
                }
            }
            GizmoHandle::Rotate => {
                let from = drag.start_pointer - center;
                let to = pointer - center;
                if from.length_squared() > 0.0 && to.length_squared() > 0.0 {
                    next.rotation = drag.start.rotation + (to.y.atan2(to.x) - from.y.atan2(from.x));
                }
            }
        }
        Some(next)
    }

    /// End the drag
    pub fn pointer_up(&mut self) -> Option<GizmoHandle> {
        self.dragging.take().map(|d| d.handle)
    }

    /// Handle being dragged
    pub fn active(&self) -> Option<GizmoHandle> {
        self.dragging.map(|d| d.handle)
    }

    /// Draw the frame, scale handles and rotate handle
    pub fn draw(surface: &mut dyn Surface, transform: &LayerTransform, canvas: Vec2) {
        let affine = transform.to_affine(canvas);
        let corners = [
            Vec2::ZERO,
            Vec2::new(canvas.x, 0.0),
            canvas,
            Vec2::new(0.0, canvas.y),
        ]
        .map(|p| affine.transform_point2(p));
        let outline = Paint::Solid(OUTLINE);
        surface.stroke(&Shape::Polygon(corners.to_vec()), &outline, 1.5);

        let handles = Self::handles(transform, canvas);
        let top_center = affine.transform_point2(Vec2::new(canvas.x * 0.5, 0.0));
        for (handle, pos) in handles {
            match handle {
                GizmoHandle::Rotate => {
                    surface.stroke(&Shape::Segments(vec![(top_center, pos)]), &outline, 1.0);
                    let dot = Shape::Circle {
                        center: pos,
                        radius: HANDLE_RADIUS * 0.6,
                    };
                    surface.fill(&dot, &Paint::Solid(HANDLE_FILL));
                    surface.stroke(&dot, &outline, 1.5);
                }
                _ => {
                    let half = Vec2::splat(HANDLE_RADIUS * 0.5);
                    let square = Shape::Rect {
                        origin: pos - half,
                        size: half * 2.0,
                    };
                    surface.fill(&square, &Paint::Solid(HANDLE_FILL));
                    surface.stroke(&square, &outline, 1.0);
                }
            }
        }
    }
}
