//! Declarative visual parameters consumed by the renderer.
//!
//! No logic lives here: colors, gradient stops, stroke widths and
//! sizes only. `Theme::dark()` is the canonical look; `Theme::light()`
//! swaps the background and text for bright host pages.

use crate::color::Rgba;
use crate::model::{ColorKind, ContentKind, LinkKind};

/// Colors of one semantic color kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Opaque base hue; gradients and tints are derived from it.
    pub base: Rgba,
    pub fill: Rgba,
    pub fill_end: Rgba,
    pub border: Rgba,
    pub glow: Rgba,
}

type Rgb8 = (u8, u8, u8);

const fn palette(base: Rgb8, fill: Rgb8, end: Rgb8, border: Rgb8, glow: Rgb8) -> Palette {
    Palette {
        base: Rgba::rgb8a(base.0, base.1, base.2, 1.0),
        fill: Rgba::rgb8a(fill.0, fill.1, fill.2, 0.85),
        fill_end: Rgba::rgb8a(end.0, end.1, end.2, 0.9),
        border: Rgba::rgb8a(border.0, border.1, border.2, 0.6),
        glow: Rgba::rgb8a(glow.0, glow.1, glow.2, 0.4),
    }
}

/// Layer parameters of the full-detail block rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStyle {
    pub elevation_blur: f32,
    pub elevation_offset_y: f32,
    pub elevation_alpha: f32,
    pub color_glow_blur: f32,
    pub color_glow_offset_y: f32,
    pub color_glow_alpha: f32,
    pub selection: Rgba,
    pub selection_glow_blur: f32,
    pub selection_glow_alpha: f32,
    /// Tint radial: center (fraction of w/h), radius fraction, stop alphas.
    pub tint_center: (f32, f32),
    pub tint_radius: f32,
    pub tint_alphas: [f32; 4],
    pub curvature_start: f32,
    pub curvature_alphas: (f32, f32),
    pub diffuse_alphas: (f32, f32),
    pub diffuse_fade_at: f32,
    pub specular_center: (f32, f32),
    pub specular_radius: f32,
    pub specular_alphas: (f32, f32),
    /// Counter reflection: side margin, height, distance from bottom (fractions).
    pub counter_margin: f32,
    pub counter_height: f32,
    pub counter_bottom: f32,
    pub counter_alphas: (f32, f32),
    pub border_width: f32,
    pub border_width_selected: f32,
    pub rim_alpha: f32,
    pub rim_depth: f32,
    /// Flat fill alpha of the minimal tier.
    pub minimal_fill_alpha: f32,
    pub minimal_border_alpha: f32,
    pub drag_hover: Rgba,
}

/// Stroke style of one link kind.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTypeStyle {
    pub dash: Vec<f32>,
    pub alpha: f32,
    pub width_bonus: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkStyle {
    pub width: f32,
    pub width_selected: f32,
    pub glow_blur: f32,
    pub glow_blur_selected: f32,
    pub glow_alpha: f32,
    /// Control points sit at these fractions of the anchor-to-anchor line…
    pub control_along: (f32, f32),
    /// …pushed sideways by this fraction of its length.
    pub control_bend: f32,
    /// Inset pass of the tube: width factor and darkening.
    pub inset_width: f32,
    pub inset_darken: f32,
    pub flow_dash: [f32; 2],
    pub flow_alpha: f32,
    pub pending_dash: [f32; 2],
    pub constellation_width: f32,
    pub highlight: Rgba,
    pub simple: LinkTypeStyle,
    pub logical: LinkTypeStyle,
    pub tension: LinkTypeStyle,
    pub anchored: LinkTypeStyle,
}

impl LinkStyle {
    pub fn for_kind(&self, kind: LinkKind) -> &LinkTypeStyle {
        match kind {
            LinkKind::Simple | LinkKind::Other => &self.simple,
            LinkKind::Logical => &self.logical,
            LinkKind::Tension => &self.tension,
            LinkKind::Anchored => &self.anchored,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorStyle {
    pub radius: f32,
    pub fill_alpha: f32,
    pub border_alpha: f32,
    pub glow_alpha: f32,
    pub glow_blur: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub color: Rgba,
    pub subtitle_color: Rgba,
    pub font: String,
    pub subtitle_font: String,
    pub minimal_font: String,
    pub legend_font: String,
    pub padding: f32,
    pub shadow: Rgba,
    pub shadow_blur: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandleStyle {
    pub size: f32,
    pub fill: Rgba,
    pub border: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconStyle {
    pub size: f32,
    pub spacing: f32,
    pub bottom_margin: f32,
    pub pill_padding: f32,
    pub pill_radius: f32,
    pub pill: Rgba,
    pub alpha: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendStyle {
    pub background: Rgba,
    pub padding: f32,
    pub radius: f32,
    pub offset_y: f32,
    pub line_height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Rgba,
    pub palettes: [Palette; 6],
    pub block: BlockStyle,
    pub link: LinkStyle,
    pub connector: ConnectorStyle,
    pub text: TextStyle,
    pub handle: HandleStyle,
    pub icon: IconStyle,
    pub legend: LegendStyle,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        let kind_style = |dash: Vec<f32>, alpha: f32, width_bonus: f32| LinkTypeStyle {
            dash,
            alpha,
            width_bonus,
        };
        Self {
            background: Rgba::rgb8a(10, 10, 15, 1.0),
            palettes: [
                palette((90, 150, 70), (60, 100, 50), (30, 60, 25), (100, 160, 80), (80, 140, 60)),
                palette(
                    (200, 130, 45),
                    (140, 90, 30),
                    (80, 50, 15),
                    (200, 140, 50),
                    (180, 120, 40),
                ),
                palette(
                    (200, 175, 55),
                    (140, 120, 40),
                    (80, 70, 20),
                    (200, 180, 60),
                    (180, 160, 50),
                ),
                palette((70, 100, 170), (40, 55, 90), (20, 30, 55), (70, 100, 160), (60, 90, 150)),
                palette((135, 70, 155), (80, 40, 90), (45, 20, 55), (130, 70, 150), (120, 60, 140)),
                palette((150, 80, 130), (90, 50, 80), (50, 25, 45), (150, 80, 130), (140, 70, 120)),
            ],
            block: BlockStyle {
                elevation_blur: 24.0,
                elevation_offset_y: 8.0,
                elevation_alpha: 0.55,
                color_glow_blur: 15.0,
                color_glow_offset_y: 4.0,
                color_glow_alpha: 0.35,
                selection: Rgba::rgb8a(255, 215, 0, 1.0),
                selection_glow_blur: 25.0,
                selection_glow_alpha: 0.6,
                tint_center: (0.5, 0.35),
                tint_radius: 0.75,
                tint_alphas: [0.95, 0.8, 0.55, 0.6],
                curvature_start: 0.55,
                curvature_alphas: (0.18, 0.38),
                diffuse_alphas: (0.14, 0.05),
                diffuse_fade_at: 0.7,
                specular_center: (0.32, 0.22),
                specular_radius: 0.35,
                specular_alphas: (0.38, 0.12),
                counter_margin: 0.2,
                counter_height: 0.18,
                counter_bottom: 0.06,
                counter_alphas: (0.1, 0.04),
                border_width: 1.5,
                border_width_selected: 2.5,
                rim_alpha: 0.35,
                rim_depth: 0.15,
                minimal_fill_alpha: 0.18,
                minimal_border_alpha: 0.4,
                drag_hover: Rgba::rgb8a(80, 200, 120, 1.0),
            },
            link: LinkStyle {
                width: 2.0,
                width_selected: 3.0,
                glow_blur: 12.0,
                glow_blur_selected: 20.0,
                glow_alpha: 0.5,
                control_along: (0.3, 0.7),
                control_bend: 0.12,
                inset_width: 0.45,
                inset_darken: 0.45,
                flow_dash: [6.0, 14.0],
                flow_alpha: 0.55,
                pending_dash: [6.0, 4.0],
                constellation_width: 1.0,
                highlight: Rgba::rgb8a(255, 215, 0, 0.8),
                simple: kind_style(Vec::new(), 0.6, 0.0),
                logical: kind_style(vec![8.0, 4.0], 0.7, 0.0),
                tension: kind_style(vec![3.0, 3.0], 0.8, 0.0),
                anchored: kind_style(Vec::new(), 0.9, 1.0),
            },
            connector: ConnectorStyle {
                radius: 5.0,
                fill_alpha: 0.9,
                border_alpha: 0.8,
                glow_alpha: 0.5,
                glow_blur: 8.0,
            },
            text: TextStyle {
                color: Rgba::rgb8a(220, 220, 230, 0.9),
                subtitle_color: Rgba::rgb8a(255, 255, 255, 0.55),
                font: "13px \"Segoe UI\", system-ui, sans-serif".into(),
                subtitle_font: "11px \"Segoe UI\", system-ui, sans-serif".into(),
                minimal_font: "14px \"Segoe UI\", system-ui, sans-serif".into(),
                legend_font: "11px \"Segoe UI\", system-ui, sans-serif".into(),
                padding: 16.0,
                shadow: Rgba::rgb8a(0, 0, 0, 0.8),
                shadow_blur: 3.0,
            },
            handle: HandleStyle {
                size: 7.0,
                fill: Rgba::rgb8a(255, 160, 60, 0.8),
                border: Rgba::rgb8a(255, 255, 255, 0.95),
            },
            icon: IconStyle {
                size: 14.0,
                spacing: 3.0,
                bottom_margin: 8.0,
                pill_padding: 4.0,
                pill_radius: 7.0,
                pill: Rgba::rgb8a(0, 0, 0, 0.55),
                alpha: 0.9,
            },
            legend: LegendStyle {
                background: Rgba::rgb8a(10, 10, 20, 0.85),
                padding: 8.0,
                radius: 4.0,
                offset_y: -20.0,
                line_height: 18.0,
            },
        }
    }

    pub fn light() -> Self {
        let mut theme = Self::dark();
        theme.background = Rgba::rgb8a(244, 244, 248, 1.0);
        theme.block.elevation_alpha = 0.25;
        theme.legend.background = Rgba::rgb8a(30, 30, 40, 0.85);
        theme
    }

    /// Palette of a color kind; `None` for colors the theme doesn't know,
    /// in which case the item is skipped.
    pub fn palette(&self, color: ColorKind) -> Option<&Palette> {
        let i = ColorKind::ALL.iter().position(|&c| c == color)?;
        self.palettes.get(i)
    }

    /// Tint of a content badge.
    pub fn icon_color(&self, kind: ContentKind) -> Rgba {
        let (r, g, b) = match kind {
            ContentKind::Pdf => (255, 120, 80),
            ContentKind::Image => (120, 200, 255),
            ContentKind::Video => (255, 80, 80),
            ContentKind::Url => (150, 180, 255),
            ContentKind::Citation => (200, 170, 255),
            ContentKind::Audio => (180, 140, 255),
            ContentKind::Code => (100, 220, 180),
            ContentKind::Docx => (80, 160, 255),
            _ => (180, 180, 200),
        };
        Rgba::rgb8a(r, g, b, self.icon.alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_color_has_no_palette() {
        let t = Theme::default();
        assert!(t.palette(ColorKind::Unknown).is_none());
        assert!(t.palette(ColorKind::Mauve).is_some());
    }

    #[test]
    fn link_type_styles() {
        let t = Theme::dark();
        assert_eq!(t.link.for_kind(LinkKind::Logical).dash, vec![8.0, 4.0]);
        assert_eq!(t.link.for_kind(LinkKind::Anchored).width_bonus, 1.0);
        assert_eq!(t.link.for_kind(LinkKind::Other), &t.link.simple);
    }
}
