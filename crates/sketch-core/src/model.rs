//! Value types shared by the shape primitives and the surface.
//!
//! Positions and sizes reuse `kurbo` geometry. Paint parameters are plain
//! CSS color strings handed straight to the drawing context, so anything the
//! host understands (`"cyan"`, `"#FF00AA"`, `"rgba(0,0,0,0.5)"`) is valid.

pub use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

// ─── Sizes ───────────────────────────────────────────────────────────────

/// Size argument accepted by the rectangle and triangle primitives.
///
/// A bare number means a square (or equilateral-ish triangle box) with
/// both sides equal. Use [`ShapeSize::normalize`] to get width/height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeSize {
    Uniform(f64),
    Explicit(Size),
}

impl ShapeSize {
    pub fn normalize(self) -> Size {
        match self {
            ShapeSize::Uniform(n) => Size::new(n, n),
            ShapeSize::Explicit(size) => size,
        }
    }
}

impl From<f64> for ShapeSize {
    fn from(n: f64) -> Self {
        ShapeSize::Uniform(n)
    }
}

impl From<Size> for ShapeSize {
    fn from(size: Size) -> Self {
        ShapeSize::Explicit(size)
    }
}

impl From<(f64, f64)> for ShapeSize {
    fn from((width, height): (f64, f64)) -> Self {
        ShapeSize::Explicit(Size::new(width, height))
    }
}

// ─── Paint ───────────────────────────────────────────────────────────────

pub const DEFAULT_FILL: &str = "cyan";
pub const DEFAULT_STROKE: &str = "black";
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Fill/stroke parameters for a single shape call.
///
/// Every field is optional. Unset fields, empty color strings, and a zero
/// or NaN stroke width all fall back to the defaults
/// (`cyan` fill, `black` stroke, width `2`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaintStyle {
    pub fill: Option<String>,
    pub stroke_width: Option<f64>,
    pub stroke_color: Option<String>,
}

impl PaintStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill(mut self, color: impl Into<String>) -> Self {
        self.fill = Some(color.into());
        self
    }

    pub fn stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn stroke_color(mut self, color: impl Into<String>) -> Self {
        self.stroke_color = Some(color.into());
        self
    }

    pub fn resolved_fill(&self) -> &str {
        non_empty(self.fill.as_deref()).unwrap_or(DEFAULT_FILL)
    }

    pub fn resolved_stroke_color(&self) -> &str {
        non_empty(self.stroke_color.as_deref()).unwrap_or(DEFAULT_STROKE)
    }

    pub fn resolved_stroke_width(&self) -> f64 {
        match self.stroke_width {
            Some(w) if w != 0.0 && !w.is_nan() => w,
            _ => DEFAULT_STROKE_WIDTH,
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

// ─── Surface options ─────────────────────────────────────────────────────

/// Global paint configuration applied to a drawing context once, when a
/// surface is created.
///
/// Deserializes from a camelCase JSON object; missing keys take defaults
/// and unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurfaceOptions {
    /// Global opacity, 0.0 ..= 1.0.
    pub alpha: f64,
    pub shadow_blur: f64,
    pub shadow_color: String,
    pub shadow_offset_x: f64,
    pub shadow_offset_y: f64,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            shadow_blur: 0.0,
            shadow_color: "gray".to_string(),
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
        }
    }
}

impl SurfaceOptions {
    /// Parse options from JSON. An empty string yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
    }

    /// Clamp `alpha` into [0, 1] and `shadow_blur` to non-negative.
    pub fn sanitized(mut self) -> Self {
        if !(0.0..=1.0).contains(&self.alpha) {
            let clamped = if self.alpha.is_nan() {
                1.0
            } else {
                self.alpha.clamp(0.0, 1.0)
            };
            log::warn!("alpha {} out of range, using {clamped}", self.alpha);
            self.alpha = clamped;
        }
        if !(self.shadow_blur >= 0.0) {
            log::warn!("shadow blur {} is negative, using 0", self.shadow_blur);
            self.shadow_blur = 0.0;
        }
        self
    }
}
