//! A `Surface` that records what was drawn, for headless tests.
//!
//! Bounds are stored in device space (after the current transform) and
//! every op carries the effective global alpha at the time of the call.

use crate::surface::{Paint, Shadow, StrokeStyle, Surface, TextRun, font_px};
use kurbo::{Affine, BezPath, Shape as _};
use mc_core::color::Rgba;
use mc_core::geometry::Point;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Rgba),
    Fill {
        bounds: kurbo::Rect,
        paint: Paint,
        alpha: f32,
        shadow: Option<Shadow>,
    },
    Stroke {
        bounds: kurbo::Rect,
        paint: Paint,
        style: StrokeStyle,
        alpha: f32,
    },
    Clip(kurbo::Rect),
    Text {
        text: String,
        at: kurbo::Point,
        color: Rgba,
        alpha: f32,
    },
}

impl DrawOp {
    pub fn alpha(&self) -> Option<f32> {
        match self {
            DrawOp::Fill { alpha, .. }
            | DrawOp::Stroke { alpha, .. }
            | DrawOp::Text { alpha, .. } => Some(*alpha),
            _ => None,
        }
    }

    pub fn bounds(&self) -> Option<kurbo::Rect> {
        match self {
            DrawOp::Fill { bounds, .. } | DrawOp::Stroke { bounds, .. } | DrawOp::Clip(bounds) => {
                Some(*bounds)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct State {
    transform: Affine,
    alpha: f32,
    shadow: Option<Shadow>,
}

#[derive(Debug)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
    state: State,
    stack: Vec<State>,
    /// Advance per character used by `measure_text`, as a fraction of font size.
    pub char_width: f32,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            state: State {
                transform: Affine::IDENTITY,
                alpha: 1.0,
                shadow: None,
            },
            stack: Vec::new(),
            char_width: 0.55,
        }
    }

    /// Texts drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    fn device_bounds(&self, path: &BezPath) -> kurbo::Rect {
        self.state.transform.transform_rect_bbox(path.bounding_box())
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn transform(&mut self, affine: Affine) {
        self.state.transform *= affine;
    }

    fn global_alpha(&self) -> f32 {
        self.state.alpha
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.state.shadow = shadow;
    }

    fn clear(&mut self, color: Rgba) {
        self.ops.push(DrawOp::Clear(color));
    }

    fn fill(&mut self, path: &BezPath, paint: &Paint) {
        self.ops.push(DrawOp::Fill {
            bounds: self.device_bounds(path),
            paint: paint.clone(),
            alpha: self.state.alpha,
            shadow: self.state.shadow,
        });
    }

    fn stroke(&mut self, path: &BezPath, paint: &Paint, style: &StrokeStyle) {
        self.ops.push(DrawOp::Stroke {
            bounds: self.device_bounds(path),
            paint: paint.clone(),
            style: style.clone(),
            alpha: self.state.alpha,
        });
    }

    fn clip(&mut self, path: &BezPath) {
        let b = self.device_bounds(path);
        self.ops.push(DrawOp::Clip(b));
    }

    fn fill_text(&mut self, text: &str, at: Point, run: &TextRun<'_>) {
        let at = self.state.transform * kurbo::Point::new(at.x as f64, at.y as f64);
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            at,
            color: run.color,
            alpha: self.state.alpha,
        });
    }

    fn measure_text(&mut self, text: &str, font: &str) -> f32 {
        text.chars().count() as f32 * font_px(font) * self.char_width
    }
}
