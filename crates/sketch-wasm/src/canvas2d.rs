//! `DrawContext` over an HTML `<canvas>` 2D context.

use sketch_core::DrawContext;
use web_sys::CanvasRenderingContext2d;

pub struct Canvas2d {
    ctx: CanvasRenderingContext2d,
}

impl Canvas2d {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    pub fn raw(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }
}

impl DrawContext for Canvas2d {
    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
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
        // Negative radii throw IndexSizeError; like the canvas, draw nothing.
        let _ = self
            .ctx
            .arc_with_anticlockwise(x, y, radius, start_angle, end_angle, anticlockwise);
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.rect(x, y, width, height);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.clear_rect(x, y, width, height);
    }

    fn set_fill_style(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn set_shadow_color(&mut self, color: &str) {
        self.ctx.set_shadow_color(color);
    }

    fn set_shadow_blur(&mut self, blur: f64) {
        self.ctx.set_shadow_blur(blur);
    }

    fn set_shadow_offset_x(&mut self, offset: f64) {
        self.ctx.set_shadow_offset_x(offset);
    }

    fn set_shadow_offset_y(&mut self, offset: f64) {
        self.ctx.set_shadow_offset_y(offset);
    }
}
