//! In-memory `DrawContext` that records every call as a display list.
//!
//! Used headless (offline rendering, snapshotting a frame) and as the
//! drawing context in tests. Alongside the flat op list it tracks the
//! context's global paint state and the geometry of the current path as a
//! `kurbo::BezPath`.

use crate::context::DrawContext;
use kurbo::{Arc, BezPath, PathEl, Point, Vec2};
use smallvec::SmallVec;
use std::f64::consts::TAU;

/// Curve flattening tolerance for recorded arcs.
const ARC_TOLERANCE: f64 = 0.1;

/// Tolerance floor relative to the radius, so the segment count of a
/// flattened arc stays bounded however large the radius is.
const ARC_RELATIVE_TOLERANCE: f64 = 1e-4;

/// One recorded drawing-context call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Arc {
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    ClosePath,
    Fill,
    Stroke,
    ClearRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    SetFillStyle(String),
    SetStrokeStyle(String),
    SetLineWidth(f64),
    SetGlobalAlpha(f64),
    SetShadowColor(String),
    SetShadowBlur(f64),
    SetShadowOffsetX(f64),
    SetShadowOffsetY(f64),
}

/// Global paint state as last set on the context.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintState {
    pub fill_style: String,
    pub stroke_style: String,
    pub line_width: f64,
    pub global_alpha: f64,
    pub shadow_color: String,
    pub shadow_blur: f64,
    pub shadow_offset_x: f64,
    pub shadow_offset_y: f64,
}

impl Default for PaintState {
    /// Canvas 2D initial state.
    fn default() -> Self {
        Self {
            fill_style: "#000000".to_string(),
            stroke_style: "#000000".to_string(),
            line_width: 1.0,
            global_alpha: 1.0,
            shadow_color: "rgba(0, 0, 0, 0)".to_string(),
            shadow_blur: 0.0,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    ops: Vec<DrawOp>,
    state: PaintState,
    path: BezPath,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drain the recorded ops, keeping paint state and the current path.
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn state(&self) -> &PaintState {
        &self.state
    }

    /// Geometry of the path started by the last `begin_path`.
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// Move-to and line-to points of the current path, in order.
    pub fn path_vertices(&self) -> SmallVec<[Point; 4]> {
        self.path
            .elements()
            .iter()
            .filter_map(|el| match *el {
                PathEl::MoveTo(p) | PathEl::LineTo(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// Number of `clear_rect` calls that covered the given area.
    pub fn clears_covering(&self, width: f64, height: f64) -> usize {
        self.ops
            .iter()
            .filter(|op| {
                matches!(op, DrawOp::ClearRect { x, y, width: w, height: h }
                    if *x <= 0.0 && *y <= 0.0 && *w >= width && *h >= height)
            })
            .count()
    }

    fn has_current_point(&self) -> bool {
        !self.path.elements().is_empty()
    }
}

impl DrawContext for RecordingContext {
    fn begin_path(&mut self) {
        self.ops.push(DrawOp::BeginPath);
        self.path = BezPath::new();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::MoveTo(x, y));
        self.path.move_to((x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::LineTo(x, y));
        if self.has_current_point() {
            self.path.line_to((x, y));
        } else {
            self.path.move_to((x, y));
        }
    }

    fn arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) {
        self.ops.push(DrawOp::Arc {
            x,
            y,
            radius,
            start_angle,
            end_angle,
            anticlockwise,
        });
        if ![x, y, radius, start_angle, end_angle]
            .iter()
            .all(|v| v.is_finite())
        {
            log::trace!("arc with non-finite geometry recorded without a path");
            return;
        }

        let sweep = if anticlockwise {
            let span = start_angle - end_angle;
            -(if span >= TAU { TAU } else { span.rem_euclid(TAU) })
        } else {
            let span = end_angle - start_angle;
            if span >= TAU { TAU } else { span.rem_euclid(TAU) }
        };
        let arc = Arc {
            center: Point::new(x, y),
            radii: Vec2::new(radius, radius),
            start_angle,
            sweep_angle: sweep,
            x_rotation: 0.0,
        };
        let start = Point::new(x + radius * start_angle.cos(), y + radius * start_angle.sin());
        if self.has_current_point() {
            self.path.line_to(start);
        } else {
            self.path.move_to(start);
        }
        let tolerance = ARC_TOLERANCE.max(radius.abs() * ARC_RELATIVE_TOLERANCE);
        self.path.extend(arc.append_iter(tolerance));
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
        });
        self.path.move_to((x, y));
        self.path.line_to((x + width, y));
        self.path.line_to((x + width, y + height));
        self.path.line_to((x, y + height));
        self.path.close_path();
    }

    fn close_path(&mut self) {
        self.ops.push(DrawOp::ClosePath);
        if self.has_current_point() {
            self.path.close_path();
        }
    }

    fn fill(&mut self) {
        self.ops.push(DrawOp::Fill);
    }

    fn stroke(&mut self) {
        self.ops.push(DrawOp::Stroke);
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(DrawOp::ClearRect {
            x,
            y,
            width,
            height,
        });
    }

    fn set_fill_style(&mut self, color: &str) {
        self.ops.push(DrawOp::SetFillStyle(color.to_string()));
        self.state.fill_style = color.to_string();
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.ops.push(DrawOp::SetStrokeStyle(color.to_string()));
        self.state.stroke_style = color.to_string();
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(DrawOp::SetLineWidth(width));
        self.state.line_width = width;
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ops.push(DrawOp::SetGlobalAlpha(alpha));
        self.state.global_alpha = alpha;
    }

    fn set_shadow_color(&mut self, color: &str) {
        self.ops.push(DrawOp::SetShadowColor(color.to_string()));
        self.state.shadow_color = color.to_string();
    }

    fn set_shadow_blur(&mut self, blur: f64) {
        self.ops.push(DrawOp::SetShadowBlur(blur));
        self.state.shadow_blur = blur;
    }

    fn set_shadow_offset_x(&mut self, offset: f64) {
        self.ops.push(DrawOp::SetShadowOffsetX(offset));
        self.state.shadow_offset_x = offset;
    }

    fn set_shadow_offset_y(&mut self, offset: f64) {
        self.ops.push(DrawOp::SetShadowOffsetY(offset));
        self.state.shadow_offset_y = offset;
    }
}
