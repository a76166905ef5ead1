//! WASM bridge for Sketch: binds surfaces to HTML `<canvas>` elements.
//!
//! Compiled via `wasm-pack build --target web`. JS creates one [`Sketch`],
//! binds canvases through it, and drives each [`SketchSurface`]:
//!
//! ```js
//! const sketch = new Sketch();
//! const surface = sketch.bind(canvas, '{"alpha":0.8}');
//! surface.setAnim(() => surface.clear().drawCircle(x++, 40, 20));
//! surface.startAnim();
//! ```

mod canvas2d;
mod host;

pub use canvas2d::Canvas2d;
pub use host::WindowFrameHost;

use sketch_core::{
    AnimationClock, BindError, BindTarget, CallbackError, PaintStyle, ShapeSize, Size, Surface,
    SurfaceId, SurfaceOptions, SurfaceRegistry,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Entry point: owns the bindings of every canvas attached through it.
///
/// Canvases are keyed by object identity: a `WeakMap` from element to
/// registry key. A cloned or re-parsed canvas is a new element and gets
/// its own surface, and each `Sketch` keeps separate bindings.
#[wasm_bindgen]
pub struct Sketch {
    registry: SurfaceRegistry<Canvas2d>,
    keys: js_sys::WeakMap,
}

#[wasm_bindgen]
impl Sketch {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Sketch, JsError> {
        console_error_panic_hook_setup();
        let host = WindowFrameHost::new().ok_or_else(|| JsError::new("no window available"))?;
        Ok(Self {
            registry: SurfaceRegistry::new(AnimationClock::new(host)),
            keys: js_sys::WeakMap::new(),
        })
    }

    /// Bind `target` (must be a `<canvas>`), or return its existing surface.
    /// `options` is a JSON object; omitted keys take defaults.
    pub fn bind(
        &mut self,
        target: &JsValue,
        options: Option<String>,
    ) -> Result<SketchSurface, JsError> {
        let surface = self.bind_canvas(target, options.as_deref().unwrap_or(""))?;
        Ok(SketchSurface { surface })
    }

    /// Forget the surface bound to `target`, stopping its loop.
    pub fn unbind(&mut self, target: &JsValue) -> bool {
        let Some(canvas) = target.dyn_ref::<HtmlCanvasElement>() else {
            return false;
        };
        let Some(id) = self.key_of(canvas) else {
            return false;
        };
        self.keys.delete(canvas.as_ref());
        self.registry.unbind(id).is_some()
    }

    #[wasm_bindgen(getter, js_name = boundCount)]
    pub fn bound_count(&self) -> usize {
        self.registry.len()
    }

    /// Name of the frame primitive in use, e.g. `requestAnimationFrame`.
    #[wasm_bindgen(getter, js_name = frameSource)]
    pub fn frame_source(&self) -> String {
        self.registry.clock().source().to_string()
    }
}

impl Sketch {
    fn bind_canvas(
        &mut self,
        target: &JsValue,
        options: &str,
    ) -> Result<Surface<Canvas2d>, BindError> {
        let options = SurfaceOptions::from_json(options)?;
        let canvas = target
            .dyn_ref::<HtmlCanvasElement>()
            .ok_or(BindError::NotACanvas)?;
        let id = self.key_of(canvas).unwrap_or_else(SurfaceId::generate);

        let surface = self.registry.bind(id, options, || {
            Ok(BindTarget {
                context: Canvas2d::new(context_2d(canvas)?),
                width: canvas.width(),
                height: canvas.height(),
            })
        })?;
        self.keys
            .set(canvas.as_ref(), &JsValue::from_str(id.as_str()));
        Ok(surface)
    }

    fn key_of(&self, canvas: &HtmlCanvasElement) -> Option<SurfaceId> {
        self.keys
            .get(canvas.as_ref())
            .as_string()
            .and_then(|key| SurfaceId::lookup(&key))
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, BindError> {
    canvas
        .get_context("2d")
        .map_err(|err| BindError::ContextUnavailable(js_message(&err)))?
        .ok_or_else(|| BindError::ContextUnavailable("canvas returned no 2d context".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| BindError::ContextUnavailable("context is not 2d".into()))
}

/// JS handle to one bound surface. Drawing methods return a handle to the
/// same surface so calls chain.
#[wasm_bindgen]
pub struct SketchSurface {
    surface: Surface<Canvas2d>,
}

#[wasm_bindgen]
impl SketchSurface {
    #[wasm_bindgen(js_name = drawCircle)]
    pub fn draw_circle(
        &self,
        x: f64,
        y: f64,
        radius: f64,
        fill: Option<String>,
        stroke_width: Option<f64>,
        stroke_color: Option<String>,
    ) -> SketchSurface {
        let style = paint_style(fill, stroke_width, stroke_color);
        self.surface.draw_circle((x, y), radius, &style);
        self.handle()
    }

    /// `size` is a number (square) or `{width, height}`.
    #[wasm_bindgen(js_name = drawRectangle)]
    pub fn draw_rectangle(
        &self,
        x: f64,
        y: f64,
        size: &JsValue,
        fill: Option<String>,
        stroke_width: Option<f64>,
        stroke_color: Option<String>,
    ) -> Result<SketchSurface, JsError> {
        let style = paint_style(fill, stroke_width, stroke_color);
        self.surface.draw_rectangle((x, y), shape_size(size)?, &style);
        Ok(self.handle())
    }

    /// `size` is a number or `{width, height}`; the apex sits at `(x, y)`.
    #[wasm_bindgen(js_name = drawTriangle)]
    pub fn draw_triangle(
        &self,
        x: f64,
        y: f64,
        size: &JsValue,
        fill: Option<String>,
        stroke_width: Option<f64>,
        stroke_color: Option<String>,
    ) -> Result<SketchSurface, JsError> {
        let style = paint_style(fill, stroke_width, stroke_color);
        self.surface.draw_triangle((x, y), shape_size(size)?, &style);
        Ok(self.handle())
    }

    pub fn clear(&self) -> SketchSurface {
        self.surface.clear();
        self.handle()
    }

    /// Set the per-frame callback, called with no arguments.
    #[wasm_bindgen(js_name = setAnim)]
    pub fn set_anim(&self, callback: js_sys::Function) -> SketchSurface {
        self.surface.set_animation_callback(move || {
            callback
                .call0(&JsValue::NULL)
                .map(|_| ())
                .map_err(|err| CallbackError::new(js_message(&err)))
        });
        self.handle()
    }

    #[wasm_bindgen(js_name = startAnim)]
    pub fn start_anim(&self) -> Result<SketchSurface, JsError> {
        self.surface.start()?;
        Ok(self.handle())
    }

    #[wasm_bindgen(js_name = stopAnim)]
    pub fn stop_anim(&self) -> SketchSurface {
        self.surface.stop();
        self.handle()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    #[wasm_bindgen(getter)]
    pub fn animating(&self) -> bool {
        self.surface.is_running()
    }

    /// Ticks since the surface was bound.
    #[wasm_bindgen(getter)]
    pub fn frame(&self) -> f64 {
        self.surface.frame() as f64
    }

    /// Milliseconds between the last two frames.
    #[wasm_bindgen(getter, js_name = timeInterval)]
    pub fn time_interval(&self) -> f64 {
        self.surface.interval_ms()
    }

    #[wasm_bindgen(getter, js_name = elapsed)]
    pub fn elapsed(&self) -> f64 {
        self.surface.elapsed_ms()
    }

    /// The effective options as JSON.
    #[wasm_bindgen(js_name = optionsJson)]
    pub fn options_json(&self) -> String {
        serde_json::to_string(&self.surface.options()).unwrap_or_else(|_| "{}".to_string())
    }
}

impl SketchSurface {
    fn handle(&self) -> SketchSurface {
        SketchSurface {
            surface: self.surface.clone(),
        }
    }
}

fn paint_style(
    fill: Option<String>,
    stroke_width: Option<f64>,
    stroke_color: Option<String>,
) -> PaintStyle {
    PaintStyle {
        fill,
        stroke_width,
        stroke_color,
    }
}

/// Accept a number or a `{width, height}` object.
fn shape_size(value: &JsValue) -> Result<ShapeSize, JsError> {
    if let Some(n) = value.as_f64() {
        return Ok(ShapeSize::Uniform(n));
    }
    let dimension = |key: &str| {
        js_sys::Reflect::get(value, &JsValue::from_str(key))
            .ok()
            .and_then(|v| v.as_f64())
    };
    match (dimension("width"), dimension("height")) {
        (Some(width), Some(height)) => Ok(ShapeSize::Explicit(Size::new(width, height))),
        _ => Err(JsError::new("size must be a number or {width, height}")),
    }
}

/// Best-effort text for a thrown JS value.
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Sketch WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
