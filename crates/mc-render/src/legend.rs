//! Floating legend explaining what a block's color and shape mean.
//!
//! Shown above the block after a shape or color change; fully opaque for
//! `legend_duration_ms`, then fades out over `legend_fade_ms`.

use crate::path::rounded_rect;
use crate::surface::{Paint, StrokeStyle, Surface, TextBaseline, TextRun, with_alpha};
use mc_core::color::Rgba;
use mc_core::config::EngineConfig;
use mc_core::geometry::{Point, Rect};
use mc_core::model::{Block, ColorKind, ShapeKind};
use mc_core::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Legend {
    /// World point the legend box sits above (top-center of the block).
    pub anchor: Point,
    pub color: ColorKind,
    pub shape: ShapeKind,
    pub shown_at_ms: f64,
}

impl Legend {
    pub fn show(block: &Block, now_ms: f64) -> Self {
        Self {
            anchor: Point::new(block.x + block.w / 2.0, block.y),
            color: block.color,
            shape: block.shape,
            shown_at_ms: now_ms,
        }
    }

    /// Current opacity, or `None` once the fade has completed.
    pub fn opacity(&self, now_ms: f64, config: &EngineConfig) -> Option<f32> {
        let elapsed = now_ms - self.shown_at_ms;
        if elapsed <= config.legend_duration_ms {
            return Some(1.0);
        }
        let fade = config.legend_fade_ms.max(f64::EPSILON);
        let left = 1.0 - (elapsed - config.legend_duration_ms) / fade;
        (left > 0.0).then_some(left as f32)
    }

    /// The three lines: combined meaning, color meaning, shape meaning.
    pub fn lines(&self) -> Option<[&'static str; 3]> {
        let color = color_meaning(self.color)?;
        let combined = matrix_meaning(self.color, self.shape).unwrap_or(color);
        Some([combined, color, shape_meaning(self.shape)])
    }
}

pub fn color_meaning(color: ColorKind) -> Option<&'static str> {
    Some(match color {
        ColorKind::Green => "Raw material · Fact, data, observation",
        ColorKind::Orange => "Energy · Problem, friction, urgent question",
        ColorKind::Yellow => "Light · Solution, idea, breakthrough",
        ColorKind::Blue => "Logic · Analysis, argument, structure",
        ColorKind::Violet => "Deep meaning · Value, founding principle",
        ColorKind::Mauve => "Concept · Embryonic idea, hypothesis",
        ColorKind::Unknown => return None,
    })
}

pub fn shape_meaning(shape: ShapeKind) -> &'static str {
    match shape {
        ShapeKind::Cloud => "Living intuition · Low certainty",
        ShapeKind::RoundedRect => "Structured idea · Medium certainty",
        ShapeKind::Square => "Founding text · High certainty",
        ShapeKind::Oval => "Process · Variable certainty",
        ShapeKind::Circle => "Core / center · Maximal certainty",
    }
}

/// Meaning of a color × shape pair.
pub fn matrix_meaning(color: ColorKind, shape: ShapeKind) -> Option<&'static str> {
    use ShapeKind::*;
    let row: [&'static str; 5] = match color {
        ColorKind::Green => [
            "Blurry observation",
            "Established fact",
            "Reference data",
            "Factual process",
            "Factual pillar",
        ],
        ColorKind::Orange => [
            "Diffuse unease",
            "Identified problem",
            "Hard constraint",
            "Ongoing crisis",
            "Central tension",
        ],
        ColorKind::Yellow => [
            "Hunch of a solution",
            "Formulated solution",
            "Resolution rule",
            "Implementation",
            "Founding insight",
        ],
        ColorKind::Blue => [
            "Logical hypothesis",
            "Structured argument",
            "Axiom",
            "Reasoning",
            "Central logical frame",
        ],
        ColorKind::Violet => [
            "Inkling of meaning",
            "Articulated value",
            "Founding principle",
            "Search for meaning",
            "Deep conviction",
        ],
        ColorKind::Mauve => [
            "Seed of an idea",
            "Explored concept",
            "Working convention",
            "Exploration",
            "Pivot concept",
        ],
        ColorKind::Unknown => return None,
    };
    let col = match shape {
        Cloud => 0,
        RoundedRect => 1,
        Square => 2,
        Oval => 3,
        Circle => 4,
    };
    Some(row[col])
}

/// Draw the legend in world space. Returns `false` when nothing was drawn.
pub fn paint_legend<S: Surface + ?Sized>(
    s: &mut S,
    legend: &Legend,
    theme: &Theme,
    opacity: f32,
) -> bool {
    let (Some(lines), Some(pal)) = (legend.lines(), theme.palette(legend.color)) else {
        return false;
    };
    let st = &theme.legend;
    let font = theme.text.legend_font.as_str();
    let bold = format!("bold {font}");

    let widest = lines
        .iter()
        .enumerate()
        .map(|(i, line)| s.measure_text(line, if i == 0 { bold.as_str() } else { font }))
        .fold(0.0_f32, f32::max);
    let w = widest + st.padding * 2.0;
    let h = st.line_height * 3.0 + st.padding * 2.0;
    let top = legend.anchor.y + st.offset_y - h;
    let frame = rounded_rect(Rect::new(legend.anchor.x - w / 2.0, top, w, h), st.radius);

    let colors = [
        pal.glow,
        Rgba::rgb8a(200, 200, 210, 0.7),
        Rgba::rgb8a(160, 160, 180, 0.6),
    ];
    with_alpha(s, opacity, |s| {
        s.fill(&frame, &Paint::Solid(st.background));
        s.stroke(&frame, &Paint::Solid(pal.glow), &StrokeStyle::new(1.0));
        for (i, line) in lines.iter().enumerate() {
            let run = TextRun::centered(if i == 0 { bold.as_str() } else { font }, colors[i])
                .baseline(TextBaseline::Top);
            let y = top + st.padding + st.line_height * i as f32;
            s.fill_text(line, Point::new(legend.anchor.x, y), &run);
        }
    });
    true
}
