//! Drawing-surface abstraction.
//!
//! Painters talk to a small Canvas2D-shaped trait so the same frame can
//! go to a browser canvas, a `vello::Scene`, or a recorder in tests.
//! State (transform, global alpha, shadow, clip) is saved and restored
//! as a stack, the way `CanvasRenderingContext2D` does it.

use kurbo::{Affine, BezPath};
use mc_core::color::Rgba;
use mc_core::geometry::Point;
use smallvec::SmallVec;

/// A gradient stop: offset in [0, 1] and color.
pub type Stop = (f32, Rgba);

/// Fill or stroke source.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Linear {
        start: Point,
        end: Point,
        stops: SmallVec<[Stop; 4]>,
    },
    Radial {
        center: Point,
        radius: f32,
        stops: SmallVec<[Stop; 4]>,
    },
}

impl Paint {
    pub fn linear(start: Point, end: Point, stops: &[Stop]) -> Self {
        Paint::Linear {
            start,
            end,
            stops: SmallVec::from_slice(stops),
        }
    }

    pub fn radial(center: Point, radius: f32, stops: &[Stop]) -> Self {
        Paint::Radial {
            center,
            radius: radius.max(f32::EPSILON),
            stops: SmallVec::from_slice(stops),
        }
    }

    /// Representative color (first stop for gradients).
    pub fn primary(&self) -> Rgba {
        match self {
            Paint::Solid(c) => *c,
            Paint::Linear { stops, .. } | Paint::Radial { stops, .. } => {
                stops.first().map(|s| s.1).unwrap_or(Rgba::TRANSPARENT)
            }
        }
    }
}

impl From<Rgba> for Paint {
    fn from(c: Rgba) -> Self {
        Paint::Solid(c)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub dash: SmallVec<[f32; 4]>,
    pub dash_offset: f32,
}

impl StrokeStyle {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            dash: SmallVec::new(),
            dash_offset: 0.0,
        }
    }

    pub fn with_dash(mut self, dash: &[f32], offset: f32) -> Self {
        self.dash = SmallVec::from_slice(dash);
        self.dash_offset = offset;
        self
    }

    pub fn is_dashed(&self) -> bool {
        !self.dash.is_empty()
    }
}

/// Drop shadow / glow applied to subsequent fills and strokes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Rgba,
    pub blur: f32,
    pub offset_y: f32,
}

impl Shadow {
    pub fn glow(color: Rgba, blur: f32) -> Self {
        Self {
            color,
            blur,
            offset_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// How to draw one line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRun<'a> {
    pub font: &'a str,
    pub color: Rgba,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

impl<'a> TextRun<'a> {
    pub fn centered(font: &'a str, color: Rgba) -> Self {
        Self {
            font,
            color,
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
        }
    }

    pub fn baseline(mut self, baseline: TextBaseline) -> Self {
        self.baseline = baseline;
        self
    }
}

/// An immediate-mode 2D target.
///
/// Implementations never fail: a draw the backend can't honor is dropped.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);

    /// Post-multiply the current transform.
    fn transform(&mut self, affine: Affine);

    fn global_alpha(&self) -> f32;
    fn set_global_alpha(&mut self, alpha: f32);

    fn set_shadow(&mut self, shadow: Option<Shadow>);

    /// Fill the whole surface, ignoring transform and clip.
    fn clear(&mut self, color: Rgba);

    fn fill(&mut self, path: &BezPath, paint: &Paint);
    fn stroke(&mut self, path: &BezPath, paint: &Paint, style: &StrokeStyle);

    /// Intersect the clip with `path` until the matching `restore`.
    fn clip(&mut self, path: &BezPath);

    fn fill_text(&mut self, text: &str, at: Point, run: &TextRun<'_>);
    fn measure_text(&mut self, text: &str, font: &str) -> f32;
}

/// Pixel size from a CSS font shorthand such as `13px "Segoe UI"`.
pub fn font_px(font: &str) -> f32 {
    font.split_whitespace()
        .find_map(|tok| tok.strip_suffix("px")?.parse::<f32>().ok())
        .unwrap_or(13.0)
}

/// Run `draw` with the global alpha multiplied by `factor`, then put it back.
pub fn with_alpha<S: Surface + ?Sized>(s: &mut S, factor: f32, draw: impl FnOnce(&mut S)) {
    if factor >= 1.0 {
        draw(s);
        return;
    }
    let prev = s.global_alpha();
    s.set_global_alpha(prev * factor);
    draw(s);
    s.set_global_alpha(prev);
}

/// Shorten `text` with a trailing `...` until it fits `max_width`.
pub fn fit_text<S: Surface + ?Sized>(s: &mut S, text: &str, font: &str, max_width: f32) -> String {
    let mut display = text.to_string();
    while s.measure_text(&display, font) > max_width && display.chars().count() > 3 {
        let keep = display.chars().count().saturating_sub(4);
        display = display.chars().take(keep).collect::<String>() + "...";
    }
    display
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_size_from_shorthand() {
        assert_eq!(font_px("13px \"Segoe UI\", sans-serif"), 13.0);
        assert_eq!(font_px("bold 11px sans-serif"), 11.0);
        assert_eq!(font_px("serif"), 13.0);
    }
}
