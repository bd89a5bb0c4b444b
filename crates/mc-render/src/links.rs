//! Link geometry and the layered link renderer.
//!
//! A link runs between the two anchor points where the center-to-center
//! line crosses each block's contour. The curve is a cubic Bézier whose
//! control points sit at fixed fractions along that line, pushed sideways
//! by a fixed fraction of its length, so every link bows the same way.
//!
//! Layers, back to front:
//!
//! | Layer | When | Stroke |
//! |-------|------|--------|
//! | glow | selected or highlighted | wide, blurred, palette glow |
//! | tube | always | bright outer pass + darker inset pass, type dash |
//! | flow | always | sparse dashes, offset advancing with wall-clock time |

use crate::path::{kp, line};
use crate::surface::{Paint, Shadow, StrokeStyle, Surface};
use kurbo::{BezPath, CubicBez, ParamCurve};
use mc_core::config::Lod;
use mc_core::geometry::Point;
use mc_core::id::{BlockId, LinkId};
use mc_core::model::{Block, Link, LinkVisibility};
use mc_core::scene::Scene;
use mc_core::theme::{LinkStyle, Theme};
use std::collections::HashSet;

/// Resolved cubic of one link, world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkCurve {
    pub from: Point,
    pub c1: Point,
    pub c2: Point,
    pub to: Point,
}

impl LinkCurve {
    pub fn between(source: &Block, target: &Block, style: &LinkStyle) -> Self {
        let from = source.shape().anchor_towards(target.center());
        let to = target.shape().anchor_towards(source.center());
        Self::through(from, to, style)
    }

    /// Curve between two anchors using the style's control-point rule.
    pub fn through(from: Point, to: Point, style: &LinkStyle) -> Self {
        let d = to - from;
        let bend = d.perp().normalized() * (d.length() * style.control_bend);
        let (a1, a2) = style.control_along;
        Self {
            from,
            c1: from + d * a1 + bend,
            c2: from + d * a2 + bend,
            to,
        }
    }

    /// Straight segment between block centers, as the constellation tier
    /// draws it.
    pub fn straight(source: &Block, target: &Block) -> Self {
        let (from, to) = (source.center(), target.center());
        let d = to - from;
        Self {
            from,
            c1: from + d * (1.0 / 3.0),
            c2: from + d * (2.0 / 3.0),
            to,
        }
    }

    pub fn cubic(&self) -> CubicBez {
        CubicBez::new(kp(self.from), kp(self.c1), kp(self.c2), kp(self.to))
    }

    pub fn path(&self) -> BezPath {
        let mut p = BezPath::new();
        p.move_to(kp(self.from));
        p.curve_to(kp(self.c1), kp(self.c2), kp(self.to));
        p
    }

    pub fn eval(&self, t: f32) -> Point {
        let p = self.cubic().eval(t as f64);
        Point::new(p.x as f32, p.y as f32)
    }

    /// Minimum distance from `p` to `samples + 1` evenly spaced points on the curve.
    pub fn sampled_distance(&self, p: Point, samples: usize) -> f32 {
        let n = samples.max(1);
        (0..=n)
            .map(|i| self.eval(i as f32 / n as f32).distance(p))
            .fold(f32::INFINITY, f32::min)
    }
}

// ─── Visibility ──────────────────────────────────────────────────────────

/// Is this link eligible for display (and therefore for hit testing)?
pub fn is_visible(link: &Link, selected: Option<BlockId>, mode: LinkVisibility) -> bool {
    match mode {
        LinkVisibility::All => true,
        LinkVisibility::Color(color) => link.color == color,
        LinkVisibility::Selection => {
            link.kind.is_anchored() || selected.is_some_and(|id| link.touches(id))
        }
    }
}

/// Visible links with resolved endpoints, in paint order: non-anchored
/// first, anchored on top. Dangling links are skipped.
pub fn visible_links(scene: &Scene, mode: LinkVisibility) -> Vec<(&Link, &Block, &Block)> {
    let selected = scene.selected();
    let mut out = Vec::new();
    for anchored in [false, true] {
        for link in scene.links() {
            if link.kind.is_anchored() != anchored || !is_visible(link, selected, mode) {
                continue;
            }
            if let Some((a, b)) = scene.endpoints(link) {
                out.push((link, a, b));
            }
        }
    }
    out
}

/// Topmost visible link whose drawn stroke at `lod` passes within
/// `tolerance` of `p` (world units). Nearest wins when several qualify.
pub fn hit_test_link(
    scene: &Scene,
    mode: LinkVisibility,
    style: &LinkStyle,
    lod: Lod,
    p: Point,
    tolerance: f32,
    samples: usize,
) -> Option<LinkId> {
    let curve = |a: &Block, b: &Block| match lod {
        Lod::Constellation => LinkCurve::straight(a, b),
        Lod::Minimal | Lod::Full => LinkCurve::between(a, b, style),
    };
    visible_links(scene, mode)
        .into_iter()
        .rev()
        .map(|(l, a, b)| (l.id, curve(a, b).sampled_distance(p, samples)))
        .filter(|&(_, d)| d <= tolerance)
        .fold(None, |best: Option<(LinkId, f32)>, cur| match best {
            Some(b) if b.1 <= cur.1 => Some(b),
            _ => Some(cur),
        })
        .map(|(id, _)| id)
}

// ─── Painting ────────────────────────────────────────────────────────────

/// Per-link paint inputs.
#[derive(Debug, Clone, Copy)]
pub struct LinkPaint {
    /// Touches the selected block, or is the selected link.
    pub selected: bool,
    /// Part of an active search result.
    pub highlighted: bool,
    /// Wall-clock time in milliseconds.
    pub now_ms: f64,
    pub zoom: f32,
    /// Flow speed in screen pixels per second.
    pub flow_speed: f32,
}

/// Dash offset of the flow layer at `now_ms`: constant screen-pixel speed
/// regardless of frame rate.
pub fn flow_offset(now_ms: f64, speed: f32, zoom: f32) -> f32 {
    let px = (now_ms / 1000.0 * speed as f64) as f32;
    -(px / zoom.max(f32::EPSILON))
}

/// Paint one link. Returns `false` (and draws nothing) when its color
/// has no palette.
pub fn paint_link<S: Surface + ?Sized>(
    s: &mut S,
    link: &Link,
    curve: &LinkCurve,
    theme: &Theme,
    p: &LinkPaint,
) -> bool {
    let Some(palette) = theme.palette(link.color) else {
        log::trace!("link {} skipped: no palette for {:?}", link.id, link.color);
        return false;
    };
    let style = &theme.link;
    let kind = style.for_kind(link.kind);
    let path = curve.path();
    let base_width = if p.selected {
        style.width_selected
    } else {
        style.width
    } + kind.width_bonus;

    // Glow
    if p.selected || p.highlighted {
        let glow = if p.highlighted && !p.selected {
            style.highlight
        } else {
            palette.glow
        };
        let blur = if p.selected {
            style.glow_blur_selected
        } else {
            style.glow_blur
        };
        s.save();
        s.set_shadow(Some(Shadow::glow(glow, blur)));
        s.stroke(
            &path,
            &Paint::Solid(glow.with_alpha(style.glow_alpha)),
            &StrokeStyle::new(base_width * 3.0),
        );
        s.restore();
    }

    // Tube: bright outer pass, darker inset pass.
    let outer = if p.selected { palette.glow } else { palette.border };
    let outer = outer.with_alpha(kind.alpha);
    let tube = StrokeStyle::new(base_width).with_dash(&kind.dash, 0.0);
    s.stroke(&path, &Paint::Solid(outer), &tube);
    let inset = StrokeStyle::new(base_width * style.inset_width).with_dash(&kind.dash, 0.0);
    s.stroke(
        &path,
        &Paint::Solid(palette.fill.darken(style.inset_darken).with_alpha(kind.alpha)),
        &inset,
    );

    // Flow
    let flow = StrokeStyle::new(base_width * style.inset_width)
        .with_dash(&style.flow_dash, flow_offset(p.now_ms, p.flow_speed, p.zoom));
    s.stroke(
        &path,
        &Paint::Solid(palette.base.lighten(0.5).with_alpha(style.flow_alpha)),
        &flow,
    );
    true
}

/// Constellation-tier link: a thin straight line between centers. A
/// `glow` intensity above zero swaps it for a gold stroke whose blur,
/// alpha and width scale with the intensity.
pub fn paint_constellation_link<S: Surface + ?Sized>(
    s: &mut S,
    link: &Link,
    a: &Block,
    b: &Block,
    theme: &Theme,
    glow: f32,
    zoom: f32,
) -> bool {
    let Some(palette) = theme.palette(link.color) else {
        return false;
    };
    let path = line(a.center(), b.center());
    let width = theme.link.constellation_width / zoom.max(f32::EPSILON);
    if glow > 0.0 {
        let gold = theme.link.highlight;
        s.save();
        s.set_shadow(Some(Shadow::glow(gold.fade(glow), theme.link.glow_blur * glow)));
        s.stroke(
            &path,
            &Paint::Solid(gold.fade(glow)),
            &StrokeStyle::new(width * (1.0 + glow)),
        );
        s.restore();
    } else {
        s.stroke(&path, &Paint::Solid(palette.border), &StrokeStyle::new(width));
    }
    true
}

/// Whether a link belongs to the active search result.
pub fn in_search(link: &Link, highlighted: &HashSet<BlockId>) -> bool {
    highlighted.contains(&link.source) && highlighted.contains(&link.target)
}

/// Constellation glow intensity: full when both ends are highlighted or a
/// color filter is active, half when only one end is, zero otherwise.
pub fn search_glow(link: &Link, highlighted: &HashSet<BlockId>, color_filtered: bool) -> f32 {
    if color_filtered || in_search(link, highlighted) {
        1.0
    } else if highlighted.contains(&link.source) || highlighted.contains(&link.target) {
        0.5
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawOp, RecordingSurface};
    use mc_core::model::{ColorKind, LinkKind, ShapeKind, Snapshot};

    fn style() -> LinkStyle {
        Theme::dark().link
    }

    #[test]
    fn curve_endpoints_on_contours() {
        let a = Block::new(BlockId::intern("lk-a"), 50.0, 50.0, 100.0, 100.0)
            .with_shape(ShapeKind::Circle);
        let b = Block::new(BlockId::intern("lk-b"), 250.0, 50.0, 100.0, 100.0)
            .with_shape(ShapeKind::Square);
        let c = LinkCurve::between(&a, &b, &style());
        assert!((c.from.x - 150.0).abs() < 1e-3 && (c.from.y - 100.0).abs() < 1e-3);
        assert!((c.to.x - 250.0).abs() < 1e-3 && (c.to.y - 100.0).abs() < 1e-3);
        // Bowed, not straight.
        assert!((c.eval(0.5).y - 100.0).abs() > 1.0);
    }

    #[test]
    fn sampled_distance_hits_curve_points() {
        let c = LinkCurve::through(Point::new(0.0, 0.0), Point::new(300.0, 0.0), &style());
        let mid = c.eval(0.5);
        assert!(c.sampled_distance(mid, 30) < 1e-3);
        assert!(c.sampled_distance(Point::new(150.0, 200.0), 30) > 12.0);
    }

    #[test]
    fn search_glow_is_half_for_one_end() {
        let l = Link::new(
            LinkId::intern("lk-g"),
            BlockId::intern("lk-ga"),
            BlockId::intern("lk-gb"),
            LinkKind::Simple,
        );
        let mut hl = HashSet::new();
        assert_eq!(search_glow(&l, &hl, false), 0.0);
        assert_eq!(search_glow(&l, &hl, true), 1.0);
        hl.insert(BlockId::intern("lk-gb"));
        assert_eq!(search_glow(&l, &hl, false), 0.5);
        hl.insert(BlockId::intern("lk-ga"));
        assert_eq!(search_glow(&l, &hl, false), 1.0);
    }

    #[test]
    fn constellation_hit_follows_center_line() {
        let a = Block::new(BlockId::intern("lk-ha"), 0.0, 0.0, 100.0, 100.0);
        let b = Block::new(BlockId::intern("lk-hb"), 300.0, 0.0, 100.0, 100.0);
        let scene = Scene::from_snapshot(Snapshot {
            blocks: vec![a.clone(), b.clone()],
            links: vec![Link::new(
                LinkId::intern("lk-h"),
                a.id,
                b.id,
                LinkKind::Simple,
            )],
        });
        let st = style();
        let bowed = LinkCurve::between(&a, &b, &st).eval(0.5);
        let on_line = Point::new(200.0, 50.0);
        assert!(bowed.distance(on_line) > 8.0);
        let hit = |lod, p| hit_test_link(&scene, LinkVisibility::All, &st, lod, p, 4.0, 30);
        assert_eq!(hit(Lod::Full, bowed), Some(LinkId::intern("lk-h")));
        assert_eq!(hit(Lod::Full, on_line), None);
        assert_eq!(hit(Lod::Constellation, on_line), Some(LinkId::intern("lk-h")));
        assert_eq!(hit(Lod::Constellation, bowed), None);
    }

    #[test]
    fn flow_offset_follows_wall_clock() {
        let a = flow_offset(1000.0, 30.0, 1.0);
        let b = flow_offset(2000.0, 30.0, 1.0);
        assert!((a - b - 30.0).abs() < 1e-3);
        assert!((flow_offset(1000.0, 30.0, 2.0) - a / 2.0).abs() < 1e-3);
    }

    #[test]
    fn unknown_color_link_is_skipped() {
        let mut l = Link::new(
            LinkId::intern("lk-u"),
            BlockId::intern("lk-a"),
            BlockId::intern("lk-b"),
            LinkKind::Simple,
        );
        l.color = ColorKind::Unknown;
        let c = LinkCurve::through(Point::new(0.0, 0.0), Point::new(10.0, 0.0), &style());
        let mut s = RecordingSurface::new();
        let lp = LinkPaint {
            selected: false,
            highlighted: false,
            now_ms: 0.0,
            zoom: 1.0,
            flow_speed: 30.0,
        };
        assert!(!paint_link(&mut s, &l, &c, &Theme::dark(), &lp));
        assert!(s.ops.is_empty());
    }

    #[test]
    fn dash_follows_kind_and_flow_is_last() {
        let l = Link::new(
            LinkId::intern("lk-t"),
            BlockId::intern("lk-a"),
            BlockId::intern("lk-b"),
            LinkKind::Tension,
        );
        let c = LinkCurve::through(Point::new(0.0, 0.0), Point::new(100.0, 0.0), &style());
        let mut s = RecordingSurface::new();
        let lp = LinkPaint {
            selected: false,
            highlighted: false,
            now_ms: 500.0,
            zoom: 1.0,
            flow_speed: 30.0,
        };
        assert!(paint_link(&mut s, &l, &c, &Theme::dark(), &lp));
        let strokes: Vec<&StrokeStyle> = s
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Stroke { style, .. } => Some(style),
                _ => None,
            })
            .collect();
        assert_eq!(strokes.len(), 3);
        assert_eq!(strokes[0].dash.as_slice(), &[3.0, 3.0]);
        assert!((strokes[2].dash_offset + 15.0).abs() < 1e-3);
    }
}
