//! Shape primitives: circle, rectangle, triangle.
//!
//! Each one follows the same sequence against the context: begin a path,
//! emit the geometry, fill, set the stroke parameters, stroke. Degenerate
//! geometry (zero radius, negative sizes) is passed through unchanged.

use crate::context::DrawContext;
use crate::model::{PaintStyle, Point, ShapeSize};
use std::f64::consts::TAU;

pub fn draw_circle<C: DrawContext + ?Sized>(
    ctx: &mut C,
    pos: Point,
    radius: f64,
    style: &PaintStyle,
) {
    log::trace!("CIRCLE at ({}, {}) r={radius}", pos.x, pos.y);
    ctx.begin_path();
    ctx.arc(pos.x, pos.y, radius, 0.0, TAU, false);
    fill_and_stroke(ctx, style);
}

/// Axis-aligned rectangle with its top-left corner at `pos`.
pub fn draw_rectangle<C: DrawContext + ?Sized>(
    ctx: &mut C,
    pos: Point,
    size: ShapeSize,
    style: &PaintStyle,
) {
    let size = size.normalize();
    log::trace!(
        "RECT at ({}, {}) {}x{}",
        pos.x,
        pos.y,
        size.width,
        size.height
    );
    ctx.begin_path();
    ctx.rect(pos.x, pos.y, size.width, size.height);
    fill_and_stroke(ctx, style);
}

/// Isosceles triangle with its apex at `pos` and a base of `size.width`
/// centered `size.height` below the apex.
pub fn draw_triangle<C: DrawContext + ?Sized>(
    ctx: &mut C,
    pos: Point,
    size: ShapeSize,
    style: &PaintStyle,
) {
    let size = size.normalize();
    log::trace!(
        "TRIANGLE apex ({}, {}) {}x{}",
        pos.x,
        pos.y,
        size.width,
        size.height
    );
    let half = size.width / 2.0;
    ctx.begin_path();
    ctx.move_to(pos.x, pos.y);
    ctx.line_to(pos.x + half, pos.y + size.height);
    ctx.line_to(pos.x - half, pos.y + size.height);
    ctx.close_path();
    fill_and_stroke(ctx, style);
}

fn fill_and_stroke<C: DrawContext + ?Sized>(ctx: &mut C, style: &PaintStyle) {
    ctx.set_fill_style(style.resolved_fill());
    ctx.fill();
    ctx.set_line_width(style.resolved_stroke_width());
    ctx.set_stroke_style(style.resolved_stroke_color());
    ctx.stroke();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DrawOp, RecordingContext};
    use pretty_assertions::assert_eq;

    #[test]
    fn circle_op_sequence() {
        let mut ctx = RecordingContext::new();
        draw_circle(&mut ctx, Point::new(5.0, 5.0), 20.0, &PaintStyle::new().fill("purple"));
        assert_eq!(
            ctx.ops(),
            &[
                DrawOp::BeginPath,
                DrawOp::Arc {
                    x: 5.0,
                    y: 5.0,
                    radius: 20.0,
                    start_angle: 0.0,
                    end_angle: TAU,
                    anticlockwise: false,
                },
                DrawOp::SetFillStyle("purple".to_string()),
                DrawOp::Fill,
                DrawOp::SetLineWidth(2.0),
                DrawOp::SetStrokeStyle("black".to_string()),
                DrawOp::Stroke,
            ]
        );
    }

    #[test]
    fn zero_radius_is_passed_through() {
        let mut ctx = RecordingContext::new();
        draw_circle(&mut ctx, Point::ORIGIN, 0.0, &PaintStyle::new());
        assert!(ctx.ops().iter().any(|op| matches!(op, DrawOp::Arc { radius, .. } if *radius == 0.0)));
    }

    #[test]
    fn rectangle_uniform_matches_explicit() {
        let mut uniform = RecordingContext::new();
        draw_rectangle(&mut uniform, Point::new(1.0, 2.0), 15.0.into(), &PaintStyle::new());
        let mut explicit = RecordingContext::new();
        draw_rectangle(
            &mut explicit,
            Point::new(1.0, 2.0),
            (15.0, 15.0).into(),
            &PaintStyle::new(),
        );
        assert_eq!(uniform.ops(), explicit.ops());
    }

    #[test]
    fn negative_rectangle_is_passed_through() {
        let mut ctx = RecordingContext::new();
        draw_rectangle(&mut ctx, Point::new(10.0, 10.0), (-4.0, 6.0).into(), &PaintStyle::new());
        assert_eq!(
            ctx.ops()[1],
            DrawOp::Rect {
                x: 10.0,
                y: 10.0,
                width: -4.0,
                height: 6.0,
            }
        );
    }

    #[test]
    fn triangle_vertices() {
        let mut ctx = RecordingContext::new();
        draw_triangle(&mut ctx, Point::new(5.0, 5.0), 20.0.into(), &PaintStyle::new());
        assert_eq!(
            ctx.path_vertices().as_slice(),
            &[
                Point::new(5.0, 5.0),
                Point::new(15.0, 25.0),
                Point::new(-5.0, 25.0)
            ]
        );
        assert!(ctx.ops().contains(&DrawOp::ClosePath));
    }

    #[test]
    fn triangle_non_square_size() {
        let mut ctx = RecordingContext::new();
        draw_triangle(&mut ctx, Point::new(0.0, 0.0), (10.0, 30.0).into(), &PaintStyle::new());
        assert_eq!(
            ctx.path_vertices().as_slice(),
            &[
                Point::new(0.0, 0.0),
                Point::new(5.0, 30.0),
                Point::new(-5.0, 30.0)
            ]
        );
    }
}
