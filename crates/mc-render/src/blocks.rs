//! Block painters, one per level of detail.
//!
//! Full tier layers, back to front: elevation shadow and color glow (plus
//! a gold halo when selected), tint radial, curvature shadow, diffuse
//! light, specular highlight, counter-reflection, border with rim light,
//! title/subtitle, content badges, shape button, resize handles
//! (selected), connectors (selected or hovered).
//!
//! Every painter returns `false` without drawing when the block's color
//! has no palette.

use crate::path::{circle, polygon, rect, rounded_rect, shape_path};
use crate::surface::{
    Paint, Shadow, StrokeStyle, Surface, TextBaseline, TextRun, fit_text, with_alpha,
};
use kurbo::{BezPath, Ellipse, Shape as _};
use mc_core::color::Rgba;
use mc_core::geometry::{ButtonMetrics, Point, Rect, Shape};
use mc_core::model::{Block, ContentKind, ShapeKind};
use mc_core::theme::{Palette, Theme};
use smallvec::SmallVec;
use std::f32::consts::TAU;

fn palette_of<'t>(block: &Block, theme: &'t Theme) -> Option<&'t Palette> {
    let palette = theme.palette(block.color);
    if palette.is_none() {
        log::trace!("block {} skipped: no palette for {:?}", block.id, block.color);
    }
    palette
}

// ─── Full tier ───────────────────────────────────────────────────────────

pub fn paint_block_full<S: Surface + ?Sized>(
    s: &mut S,
    block: &Block,
    theme: &Theme,
    button: &ButtonMetrics,
    hovered: bool,
) -> bool {
    let Some(pal) = palette_of(block, theme) else {
        return false;
    };
    let st = &theme.block;
    let shape = block.shape();
    let outline = shape_path(&shape);
    let b = block.bounds();
    let box_path = rect(b);
    let at = |fx: f32, fy: f32| Point::new(b.x + b.w * fx, b.y + b.h * fy);

    // Shadows
    s.save();
    let carrier = Paint::Solid(Rgba::BLACK.with_alpha(0.01));
    s.set_shadow(Some(Shadow {
        color: Rgba::BLACK.with_alpha(st.elevation_alpha),
        blur: st.elevation_blur,
        offset_y: st.elevation_offset_y,
    }));
    s.fill(&outline, &carrier);
    s.set_shadow(Some(Shadow {
        color: pal.glow.with_alpha(st.color_glow_alpha),
        blur: st.color_glow_blur,
        offset_y: st.color_glow_offset_y,
    }));
    s.fill(&outline, &carrier);
    if block.selected {
        s.set_shadow(Some(Shadow::glow(
            st.selection.with_alpha(st.selection_glow_alpha),
            st.selection_glow_blur,
        )));
        s.fill(&outline, &carrier);
    }
    s.restore();

    // Tint
    let [t0, t1, t2, t3] = st.tint_alphas;
    s.fill(
        &outline,
        &Paint::radial(
            at(st.tint_center.0, st.tint_center.1),
            b.w.max(b.h) * st.tint_radius,
            &[
                (0.0, pal.fill.with_alpha(t0)),
                (0.38, pal.fill.with_alpha(t1)),
                (0.65, pal.fill_end.with_alpha(t2)),
                (1.0, Rgba::BLACK.with_alpha(t3)),
            ],
        ),
    );

    s.save();
    s.clip(&outline);

    // Curvature shadow
    let (cm, ce) = st.curvature_alphas;
    s.fill(
        &box_path,
        &Paint::linear(
            at(0.0, 0.0),
            at(0.0, 1.0),
            &[
                (0.0, Rgba::TRANSPARENT),
                (st.curvature_start, Rgba::TRANSPARENT),
                (0.78, Rgba::BLACK.with_alpha(cm)),
                (1.0, Rgba::BLACK.with_alpha(ce)),
            ],
        ),
    );

    // Diffuse light
    let (dt, dm) = st.diffuse_alphas;
    s.fill(
        &box_path,
        &Paint::linear(
            at(0.0, 0.0),
            at(0.3, 0.6),
            &[
                (0.0, Rgba::WHITE.with_alpha(dt)),
                (0.38, Rgba::WHITE.with_alpha(dm)),
                (st.diffuse_fade_at, Rgba::WHITE.with_alpha(0.0)),
            ],
        ),
    );

    // Specular highlight
    let (sc, sm) = st.specular_alphas;
    s.fill(
        &box_path,
        &Paint::radial(
            at(st.specular_center.0, st.specular_center.1),
            b.w.max(b.h) * st.specular_radius,
            &[
                (0.0, Rgba::WHITE.with_alpha(sc)),
                (0.45, Rgba::WHITE.with_alpha(sm)),
                (0.72, Rgba::WHITE.with_alpha(0.0)),
            ],
        ),
    );

    // Counter-reflection
    let ch = b.h * st.counter_height;
    let counter = Rect::new(
        b.x + b.w * st.counter_margin,
        b.y + b.h * (1.0 - st.counter_bottom) - ch,
        b.w * (1.0 - 2.0 * st.counter_margin),
        ch,
    );
    let (cb, cmid) = st.counter_alphas;
    s.fill(
        &rect(counter),
        &Paint::linear(
            Point::new(counter.x, counter.y + counter.h),
            Point::new(counter.x, counter.y),
            &[
                (0.0, Rgba::WHITE.with_alpha(cb)),
                (0.65, Rgba::WHITE.with_alpha(cmid)),
                (1.0, Rgba::WHITE.with_alpha(0.0)),
            ],
        ),
    );
    s.restore();

    // Border + rim light
    let (border, width) = if block.selected {
        (st.selection, st.border_width_selected)
    } else {
        (pal.border, st.border_width)
    };
    s.stroke(&outline, &Paint::Solid(border), &StrokeStyle::new(width));
    s.save();
    s.clip(&outline);
    s.stroke(
        &outline,
        &Paint::linear(
            at(0.0, 0.0),
            at(0.0, st.rim_depth),
            &[
                (0.0, Rgba::WHITE.with_alpha(st.rim_alpha)),
                (1.0, Rgba::WHITE.with_alpha(0.0)),
            ],
        ),
        &StrokeStyle::new(1.5),
    );
    s.restore();

    paint_text(s, block, theme);
    paint_content_icons(s, block, theme);
    paint_shape_button(s, block, pal, button);
    if block.selected {
        paint_handles(s, &shape, theme);
    }
    if block.selected || hovered {
        paint_connectors(s, &shape, pal, theme);
    }
    true
}

fn paint_text<S: Surface + ?Sized>(s: &mut S, block: &Block, theme: &Theme) {
    let t = &theme.text;
    let title = block.title.as_str();
    let subtitle = block.subtitle.as_deref().filter(|s| !s.is_empty());
    if title.is_empty() && subtitle.is_none() {
        return;
    }
    let c = block.center();
    let max_w = block.w - t.padding * 2.0;

    s.save();
    s.set_shadow(Some(Shadow::glow(t.shadow, t.shadow_blur)));
    match subtitle {
        Some(sub) if !title.is_empty() => {
            let shown = fit_text(s, title, &t.font, max_w);
            let run = TextRun::centered(&t.font, t.color).baseline(TextBaseline::Bottom);
            s.fill_text(&shown, Point::new(c.x, c.y - 2.0), &run);
            let shown = fit_text(s, sub, &t.subtitle_font, max_w);
            let run =
                TextRun::centered(&t.subtitle_font, t.subtitle_color).baseline(TextBaseline::Top);
            s.fill_text(&shown, Point::new(c.x, c.y + 3.0), &run);
        }
        _ => {
            let text = if title.is_empty() { subtitle.unwrap_or_default() } else { title };
            let shown = fit_text(s, text, &t.font, max_w);
            s.fill_text(&shown, c, &TextRun::centered(&t.font, t.color));
        }
    }
    s.restore();
}

// ─── Block furniture ─────────────────────────────────────────────────────

/// Connector dots on the contour (top, right, bottom, left).
pub fn paint_connectors<S: Surface + ?Sized>(
    s: &mut S,
    shape: &Shape,
    pal: &Palette,
    theme: &Theme,
) {
    let c = &theme.connector;
    let bright = pal.base.lighten(0.3);
    for p in shape.connector_points() {
        s.save();
        s.set_shadow(Some(Shadow::glow(pal.base.with_alpha(c.glow_alpha), c.glow_blur)));
        let dot = circle(p, c.radius);
        s.fill(
            &dot,
            &Paint::radial(
                Point::new(p.x - 1.0, p.y - 1.0),
                c.radius,
                &[(0.0, bright), (1.0, pal.base.with_alpha(c.fill_alpha))],
            ),
        );
        s.stroke(
            &dot,
            &Paint::Solid(bright.with_alpha(c.border_alpha)),
            &StrokeStyle::new(1.0),
        );
        s.restore();
    }
}

/// The eight resize handles.
pub fn paint_handles<S: Surface + ?Sized>(s: &mut S, shape: &Shape, theme: &Theme) {
    let h = &theme.handle;
    let half = h.size / 2.0;
    for (_, p) in shape.resize_handles() {
        let r = rect(Rect::new(p.x - half, p.y - half, h.size, h.size));
        s.fill(&r, &Paint::Solid(h.fill));
        s.stroke(&r, &Paint::Solid(h.border), &StrokeStyle::new(1.0));
    }
}

/// Shape/color button with a miniature of the current shape.
pub fn paint_shape_button<S: Surface + ?Sized>(
    s: &mut S,
    block: &Block,
    pal: &Palette,
    metrics: &ButtonMetrics,
) {
    let r = block.shape().button_rect(metrics);
    let frame = rounded_rect(r, 3.0);
    s.fill(&frame, &Paint::Solid(pal.base.with_alpha(0.35)));
    s.stroke(
        &frame,
        &Paint::Solid(Rgba::WHITE.with_alpha(0.45)),
        &StrokeStyle::new(1.0),
    );
    let mini = mini_shape(block.shape, r.center(), 6.0);
    s.fill(&mini, &Paint::Solid(pal.base.with_alpha(0.9)));
    s.stroke(
        &mini,
        &Paint::Solid(Rgba::WHITE.with_alpha(0.7)),
        &StrokeStyle::new(0.8),
    );
}

fn mini_shape(kind: ShapeKind, c: Point, size: f32) -> BezPath {
    match kind {
        ShapeKind::Cloud => {
            let steps = 20;
            let pts: Vec<Point> = (0..=steps)
                .map(|i| {
                    let a = i as f32 / steps as f32 * TAU;
                    let wobble = 1.0 + 0.15 * (3.0 * a).sin();
                    Point::new(
                        c.x + size * wobble * a.cos() * 0.9,
                        c.y + size * wobble * a.sin() * 0.7,
                    )
                })
                .collect();
            polygon(&pts)
        }
        ShapeKind::RoundedRect => rounded_rect(
            Rect::new(c.x - size, c.y - size * 0.65, size * 2.0, size * 1.3),
            2.0,
        ),
        ShapeKind::Square => rect(Rect::new(
            c.x - size * 0.7,
            c.y - size * 0.7,
            size * 1.4,
            size * 1.4,
        )),
        ShapeKind::Oval => Ellipse::new(
            (c.x as f64, c.y as f64),
            (size as f64, (size * 0.65) as f64),
            0.0,
        )
        .to_path(0.1),
        ShapeKind::Circle => circle(c, size * 0.75),
    }
}

/// Badges for attached content, centered in a pill along the bottom edge.
pub fn paint_content_icons<S: Surface + ?Sized>(s: &mut S, block: &Block, theme: &Theme) {
    let kinds: SmallVec<[ContentKind; 8]> =
        block.content.iter().copied().filter(|k| k.has_badge()).collect();
    if kinds.is_empty() {
        return;
    }
    let ic = &theme.icon;
    let step = ic.size + ic.spacing;
    let total = kinds.len() as f32 * step - ic.spacing + ic.pill_padding * 2.0;
    let c = block.center();
    let icon_y = block.y + block.h - ic.bottom_margin;
    let pill = Rect::new(
        c.x - total / 2.0,
        icon_y - ic.size / 2.0 - ic.pill_padding,
        total,
        ic.size + ic.pill_padding * 2.0,
    );
    s.fill(&rounded_rect(pill, ic.pill_radius), &Paint::Solid(ic.pill));

    let start_x = pill.x + ic.pill_padding;
    for (i, &kind) in kinds.iter().enumerate() {
        let center = Point::new(start_x + i as f32 * step + ic.size / 2.0, icon_y);
        paint_icon(s, kind, center, ic.size * 0.7, theme.icon_color(kind));
    }
}

fn paint_icon<S: Surface + ?Sized>(s: &mut S, kind: ContentKind, c: Point, size: f32, color: Rgba) {
    let hs = size / 2.0;
    let solid = Paint::Solid(color);
    let thin = StrokeStyle::new(1.0);
    match kind {
        ContentKind::Image => {
            s.stroke(&rect(Rect::new(c.x - hs, c.y - hs, size, size)), &solid, &thin);
            let mountain = polygon(&[
                Point::new(c.x - hs, c.y + hs),
                Point::new(c.x - hs * 0.2, c.y - hs * 0.2),
                Point::new(c.x + hs * 0.3, c.y + hs * 0.3),
                Point::new(c.x + hs, c.y + hs),
            ]);
            s.fill(&mountain, &solid);
        }
        ContentKind::Video => {
            let play = polygon(&[
                Point::new(c.x - hs * 0.6, c.y - hs),
                Point::new(c.x + hs, c.y),
                Point::new(c.x - hs * 0.6, c.y + hs),
            ]);
            s.fill(&play, &solid);
        }
        ContentKind::Url => {
            s.stroke(&circle(Point::new(c.x - hs * 0.35, c.y), hs * 0.55), &solid, &thin);
            s.stroke(&circle(Point::new(c.x + hs * 0.35, c.y), hs * 0.55), &solid, &thin);
        }
        ContentKind::Citation => {
            s.fill(&circle(Point::new(c.x - hs * 0.45, c.y - hs * 0.2), hs * 0.35), &solid);
            s.fill(&circle(Point::new(c.x + hs * 0.45, c.y - hs * 0.2), hs * 0.35), &solid);
        }
        ContentKind::Audio => {
            s.fill(&circle(Point::new(c.x - hs * 0.3, c.y + hs * 0.5), hs * 0.4), &solid);
            let stem = polygon(&[
                Point::new(c.x + hs * 0.05, c.y + hs * 0.5),
                Point::new(c.x + hs * 0.05, c.y - hs),
                Point::new(c.x + hs * 0.6, c.y - hs * 0.6),
            ]);
            s.stroke(&stem, &solid, &thin);
        }
        ContentKind::Code => {
            let left = crate::path::polyline(&[
                Point::new(c.x - hs * 0.2, c.y - hs * 0.7),
                Point::new(c.x - hs, c.y),
                Point::new(c.x - hs * 0.2, c.y + hs * 0.7),
            ]);
            let right = crate::path::polyline(&[
                Point::new(c.x + hs * 0.2, c.y - hs * 0.7),
                Point::new(c.x + hs, c.y),
                Point::new(c.x + hs * 0.2, c.y + hs * 0.7),
            ]);
            s.stroke(&left, &solid, &thin);
            s.stroke(&right, &solid, &thin);
        }
        _ => {
            // Document with a folded corner (pdf, docx, generic file).
            let fold = size * 0.3;
            let doc = polygon(&[
                Point::new(c.x - hs, c.y - hs),
                Point::new(c.x + hs - fold, c.y - hs),
                Point::new(c.x + hs, c.y - hs + fold),
                Point::new(c.x + hs, c.y + hs),
                Point::new(c.x - hs, c.y + hs),
            ]);
            s.fill(&doc, &solid);
            if kind == ContentKind::Docx {
                let lines = Paint::Solid(Rgba::BLACK.with_alpha(0.5));
                for dy in [-0.2, 0.2] {
                    let y = c.y + hs * dy;
                    let l = crate::path::line(
                        Point::new(c.x - hs * 0.6, y),
                        Point::new(c.x + hs * 0.6, y),
                    );
                    s.stroke(&l, &lines, &thin);
                }
            }
        }
    }
}

/// Soft radial halo centered on the block (drag-hover target, search hit).
/// `spread` scales the radius from the block's larger side.
pub fn paint_halo<S: Surface + ?Sized>(
    s: &mut S,
    block: &Block,
    color: Rgba,
    spread: f32,
    alpha: f32,
) {
    let c = block.center();
    let r = block.w.max(block.h) * spread;
    if r <= 0.0 {
        return;
    }
    let glow = Paint::radial(
        c,
        r,
        &[
            (0.0, color.with_alpha(0.4)),
            (0.5, color.with_alpha(0.15)),
            (1.0, color.with_alpha(0.0)),
        ],
    );
    with_alpha(s, alpha, |s| s.fill(&circle(c, r), &glow));
}

// ─── Minimal tier ────────────────────────────────────────────────────────

/// Flat silhouette, thin border, title only.
pub fn paint_block_minimal<S: Surface + ?Sized>(s: &mut S, block: &Block, theme: &Theme) -> bool {
    let Some(pal) = palette_of(block, theme) else {
        return false;
    };
    let st = &theme.block;
    let outline = shape_path(&block.shape());

    s.fill(&outline, &Paint::Solid(pal.base.with_alpha(st.minimal_fill_alpha)));
    if block.selected {
        s.save();
        s.set_shadow(Some(Shadow::glow(st.selection.with_alpha(0.4), 15.0)));
        s.stroke(
            &outline,
            &Paint::Solid(st.selection.with_alpha(0.8)),
            &StrokeStyle::new(2.0),
        );
        s.restore();
    } else {
        s.stroke(
            &outline,
            &Paint::Solid(pal.base.with_alpha(st.minimal_border_alpha)),
            &StrokeStyle::new(1.0),
        );
    }

    if !block.title.is_empty() {
        let t = &theme.text;
        s.save();
        s.set_shadow(Some(Shadow::glow(t.shadow, t.shadow_blur)));
        let shown = fit_text(s, &block.title, &t.minimal_font, block.w - 12.0);
        s.fill_text(&shown, block.center(), &TextRun::centered(&t.minimal_font, t.color));
        s.restore();
    }
    true
}

// ─── Constellation tier ──────────────────────────────────────────────────

/// Point radius, proportional to the block's perceived mass.
pub fn constellation_radius(block: &Block) -> f32 {
    ((block.w * block.h).max(0.0).sqrt() / 12.0).clamp(4.0, 14.0)
}

/// Glowing point: wide halo, bright core, white spark; selected points pulse.
pub fn paint_block_constellation<S: Surface + ?Sized>(
    s: &mut S,
    block: &Block,
    theme: &Theme,
    now_ms: f64,
) -> bool {
    let Some(pal) = palette_of(block, theme) else {
        return false;
    };
    let c = block.center();
    let pulse = if block.selected {
        1.0 + 0.15 * (now_ms / 400.0).sin() as f32
    } else {
        1.0
    };
    let r = constellation_radius(block) * pulse;
    let base = pal.base;

    s.fill(
        &circle(c, r * 4.0),
        &Paint::radial(
            c,
            r * 4.0,
            &[
                (0.0, base.with_alpha(0.25)),
                (0.4, base.with_alpha(0.08)),
                (1.0, base.with_alpha(0.0)),
            ],
        ),
    );
    s.fill(
        &circle(c, r),
        &Paint::radial(
            c,
            r,
            &[
                (0.0, base.lighten(0.3)),
                (0.5, base.with_alpha(0.85)),
                (1.0, base.with_alpha(0.3)),
            ],
        ),
    );
    s.fill(
        &circle(c, r * 0.35),
        &Paint::radial(
            c,
            r * 0.35,
            &[
                (0.0, Rgba::WHITE.with_alpha(0.9)),
                (1.0, Rgba::WHITE.with_alpha(0.0)),
            ],
        ),
    );
    if block.selected {
        let sel = theme.block.selection;
        s.save();
        s.set_shadow(Some(Shadow::glow(
            sel.with_alpha(theme.block.selection_glow_alpha),
            20.0,
        )));
        s.fill(&circle(c, r * 1.2), &Paint::Solid(sel.with_alpha(0.3)));
        s.restore();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawOp, RecordingSurface};
    use mc_core::id::BlockId;
    use mc_core::model::ColorKind;

    fn block(id: &str) -> Block {
        Block::new(BlockId::intern(id), 0.0, 0.0, 200.0, 120.0)
            .with_color(ColorKind::Green)
            .with_title("A rather long title that will not fit")
    }

    fn handle_fills(s: &RecordingSurface) -> usize {
        s.ops
            .iter()
            .filter(|op| match op {
                DrawOp::Fill { bounds, .. } => (bounds.width() - 7.0).abs() < 1e-6,
                _ => false,
            })
            .count()
    }

    #[test]
    fn unknown_color_is_skipped() {
        let mut s = RecordingSurface::new();
        let b = block("bk-u").with_color(ColorKind::Unknown);
        assert!(!paint_block_full(&mut s, &b, &Theme::dark(), &ButtonMetrics::default(), false));
        assert!(!paint_block_minimal(&mut s, &b, &Theme::dark()));
        assert!(!paint_block_constellation(&mut s, &b, &Theme::dark(), 0.0));
        assert!(s.ops.is_empty());
    }

    #[test]
    fn handles_only_when_selected() {
        let theme = Theme::dark();
        let m = ButtonMetrics::default();
        let mut s = RecordingSurface::new();
        paint_block_full(&mut s, &block("bk-h"), &theme, &m, false);
        assert_eq!(handle_fills(&s), 0);

        let mut selected = block("bk-h");
        selected.selected = true;
        let mut s = RecordingSurface::new();
        paint_block_full(&mut s, &selected, &theme, &m, false);
        assert_eq!(handle_fills(&s), 8);
        assert_eq!(s.save_depth(), 0);
    }

    #[test]
    fn title_is_truncated_to_padding() {
        let mut s = RecordingSurface::new();
        paint_block_full(&mut s, &block("bk-t"), &Theme::dark(), &ButtonMetrics::default(), false);
        let texts = s.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].ends_with("..."));
    }

    #[test]
    fn subtitle_draws_two_lines() {
        let mut b = block("bk-s").with_title("Idea");
        b.subtitle = Some("detail".into());
        let mut s = RecordingSurface::new();
        paint_block_full(&mut s, &b, &Theme::dark(), &ButtonMetrics::default(), false);
        assert_eq!(s.texts(), vec!["Idea", "detail"]);
    }

    #[test]
    fn constellation_radius_is_clamped() {
        let tiny = Block::new(BlockId::intern("bk-c1"), 0.0, 0.0, 10.0, 10.0);
        let huge = Block::new(BlockId::intern("bk-c2"), 0.0, 0.0, 5000.0, 5000.0);
        let mid = Block::new(BlockId::intern("bk-c3"), 0.0, 0.0, 120.0, 120.0);
        assert_eq!(constellation_radius(&tiny), 4.0);
        assert_eq!(constellation_radius(&huge), 14.0);
        assert!((constellation_radius(&mid) - 10.0).abs() < 1e-5);
    }

    #[test]
    fn badges_skip_inline_kinds() {
        let mut b = block("bk-i");
        b.content.extend([ContentKind::Note, ContentKind::Text]);
        let mut s = RecordingSurface::new();
        paint_content_icons(&mut s, &b, &Theme::dark());
        assert!(s.ops.is_empty());
        b.content.push(ContentKind::Pdf);
        paint_content_icons(&mut s, &b, &Theme::dark());
        // Pill + one document glyph.
        assert_eq!(s.ops.len(), 2);
    }
}
