//! The drawing-context capability the core draws through.
//!
//! Mirrors the subset of the Canvas 2D API the shape primitives and the
//! surface need. Style setters mutate global context state; nothing here
//! is scoped with save/restore.

pub trait DrawContext {
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    /// Arc centered at `(x, y)`, angles in radians.
    fn arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    );
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn set_fill_style(&mut self, color: &str);
    fn set_stroke_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_shadow_color(&mut self, color: &str);
    fn set_shadow_blur(&mut self, blur: f64);
    fn set_shadow_offset_x(&mut self, offset: f64);
    fn set_shadow_offset_y(&mut self, offset: f64);
}

/// Apply global alpha and shadow settings from surface options.
pub fn apply_options<C: DrawContext + ?Sized>(ctx: &mut C, options: &crate::SurfaceOptions) {
    ctx.set_global_alpha(options.alpha);
    ctx.set_shadow_color(&options.shadow_color);
    ctx.set_shadow_blur(options.shadow_blur);
    ctx.set_shadow_offset_x(options.shadow_offset_x);
    ctx.set_shadow_offset_y(options.shadow_offset_y);
}
