//! One frame, start to finish.
//!
//! Background, world transform, level of detail from zoom, links under
//! blocks, blocks in paint order, overlays (halos, pending connector,
//! legend). Items that can't be drawn are counted and skipped; a frame
//! never aborts.

use crate::blocks::{
    paint_block_constellation, paint_block_full, paint_block_minimal, paint_halo,
};
use crate::legend::{Legend, paint_legend};
use crate::links::{
    LinkCurve, LinkPaint, in_search, paint_constellation_link, paint_link, search_glow,
    visible_links,
};
use crate::path::line;
use crate::surface::{Paint, StrokeStyle, Surface, with_alpha};
use kurbo::Affine;
use mc_core::config::{EngineConfig, Lod};
use mc_core::geometry::Point;
use mc_core::id::{BlockId, LinkId};
use mc_core::model::{ColorKind, LinkVisibility};
use mc_core::scene::Scene;
use mc_core::theme::Theme;
use mc_core::view::{Camera, Viewport};
use std::collections::HashSet;

/// Dashed line from a connector being dragged to the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingConnector {
    pub source: BlockId,
    /// Cursor, world coordinates.
    pub end: Point,
}

pub struct FrameInput<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub viewport: &'a Viewport,
    pub config: &'a EngineConfig,
    pub theme: &'a Theme,
    pub visibility: LinkVisibility,
    /// Search result; empty when no search is active.
    pub highlighted: &'a HashSet<BlockId>,
    pub hovered: Option<BlockId>,
    pub drag_hover: Option<BlockId>,
    pub selected_link: Option<LinkId>,
    pub pending: Option<PendingConnector>,
    pub legend: Option<&'a Legend>,
    pub now_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub lod: Lod,
    pub blocks_drawn: usize,
    pub links_drawn: usize,
    /// Blocks and links skipped (unknown color).
    pub skipped: usize,
}

impl FrameStats {
    fn new(lod: Lod) -> Self {
        Self {
            lod,
            blocks_drawn: 0,
            links_drawn: 0,
            skipped: 0,
        }
    }

    fn count_block(&mut self, drawn: bool) {
        if drawn {
            self.blocks_drawn += 1;
        } else {
            self.skipped += 1;
        }
    }

    fn count_link(&mut self, drawn: bool) {
        if drawn {
            self.links_drawn += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// World-to-device transform: device pixel ratio, then pan, then zoom.
pub fn world_transform(camera: &Camera, viewport: &Viewport) -> Affine {
    let offset = camera.offset();
    Affine::scale(viewport.dpr as f64)
        * Affine::translate((offset.x as f64, offset.y as f64))
        * Affine::scale(camera.zoom() as f64)
}

pub fn render_frame<S: Surface + ?Sized>(s: &mut S, input: &FrameInput<'_>) -> FrameStats {
    let FrameInput {
        scene,
        camera,
        config,
        theme,
        highlighted,
        now_ms,
        ..
    } = *input;
    let zoom = camera.zoom();
    let lod = config.lod(zoom);
    let mut stats = FrameStats::new(lod);
    let searching = !highlighted.is_empty();
    let dim = |lit: bool| if searching && !lit { config.search_dim_alpha } else { 1.0 };

    s.clear(theme.background);
    s.save();
    s.transform(world_transform(camera, input.viewport));

    // Links, under every block.
    let color_filtered = matches!(input.visibility, LinkVisibility::Color(_));
    let selected_block = scene.selected();
    for (link, a, b) in visible_links(scene, input.visibility) {
        let lit = searching && in_search(link, highlighted);
        let glow = match lod {
            Lod::Constellation => search_glow(link, highlighted, color_filtered),
            Lod::Minimal | Lod::Full => 0.0,
        };
        let mut drawn = false;
        with_alpha(s, dim(lit || glow > 0.0), |s| {
            drawn = match lod {
                Lod::Constellation => paint_constellation_link(s, link, a, b, theme, glow, zoom),
                Lod::Minimal | Lod::Full => {
                    let curve = LinkCurve::between(a, b, &theme.link);
                    let paint = LinkPaint {
                        selected: input.selected_link == Some(link.id)
                            || selected_block.is_some_and(|id| link.touches(id)),
                        highlighted: lit,
                        now_ms,
                        zoom,
                        flow_speed: config.flow_speed,
                    };
                    paint_link(s, link, &curve, theme, &paint)
                }
            };
        });
        stats.count_link(drawn);
    }

    // Blocks, selection on top.
    for block in scene.paint_order() {
        let lit = highlighted.contains(&block.id);
        let mut drawn = false;
        with_alpha(s, dim(lit), |s| {
            drawn = match lod {
                Lod::Constellation => paint_block_constellation(s, block, theme, now_ms),
                Lod::Minimal => paint_block_minimal(s, block, theme),
                Lod::Full => paint_block_full(
                    s,
                    block,
                    theme,
                    &config.shape_button,
                    input.hovered == Some(block.id),
                ),
            };
        });
        stats.count_block(drawn);
    }

    if lod == Lod::Full {
        if let Some(block) = input.drag_hover.and_then(|id| scene.block(id)) {
            let pulse = 0.5 + 0.15 * (now_ms / 350.0).sin() as f32;
            paint_halo(s, block, theme.block.drag_hover, 0.65, pulse);
        }
        if searching {
            let pulse = 0.4 + 0.1 * (now_ms / 600.0).sin() as f32;
            for block in scene.blocks().iter().filter(|b| highlighted.contains(&b.id)) {
                if let Some(pal) = theme.palette(block.color) {
                    paint_halo(s, block, pal.base, 0.7, pulse);
                }
            }
        }
    }

    if let Some(pending) = input.pending {
        paint_pending(s, scene, theme, &pending);
    }

    if let Some(legend) = input.legend
        && let Some(opacity) = legend.opacity(now_ms, config)
    {
        paint_legend(s, legend, theme, opacity);
    }

    s.restore();
    stats
}

fn paint_pending<S: Surface + ?Sized>(
    s: &mut S,
    scene: &Scene,
    theme: &Theme,
    pending: &PendingConnector,
) {
    let (Some(source), Some(pal)) = (scene.block(pending.source), theme.palette(ColorKind::Green))
    else {
        return;
    };
    let style = StrokeStyle::new(2.0).with_dash(&theme.link.pending_dash, 0.0);
    s.stroke(
        &line(source.center(), pending.end),
        &Paint::Solid(pal.base.with_alpha(0.6)),
        &style,
    );
}
