//! Integration tests: search dimming and link visibility through a full
//! frame (mc-render ↔ mc-core).
//!
//! Rendering goes to a `RecordingSurface`, so assertions read the effective
//! global alpha and device bounds of every recorded draw call.

use mc_core::model::*;
use mc_core::{BlockId, Camera, EngineConfig, LinkId, Scene, Theme, Viewport};
use mc_render::recording::DrawOp;
use mc_render::{FrameInput, PendingConnector, RecordingSurface, render_frame};
use std::collections::HashSet;

fn id(s: &str) -> BlockId {
    BlockId::intern(s)
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Three blocks in a row, linked a→b (simple) and b→c (tension).
fn row() -> Scene {
    init_logging();
    Scene::from_snapshot(Snapshot {
        blocks: vec![
            Block::new(id("sd-a"), 0.0, 0.0, 200.0, 120.0).with_title("Alpha"),
            Block::new(id("sd-b"), 400.0, 0.0, 200.0, 120.0).with_title("Beta"),
            Block::new(id("sd-c"), 800.0, 0.0, 200.0, 120.0).with_title("Gamma"),
        ],
        links: vec![
            Link::new(LinkId::intern("sd-ab"), id("sd-a"), id("sd-b"), LinkKind::Simple),
            Link::new(LinkId::intern("sd-bc"), id("sd-b"), id("sd-c"), LinkKind::Tension),
        ],
    })
}

struct Frame {
    camera: Camera,
    viewport: Viewport,
    config: EngineConfig,
    theme: Theme,
    visibility: LinkVisibility,
    highlighted: HashSet<BlockId>,
    pending: Option<PendingConnector>,
}

impl Frame {
    fn new() -> Self {
        let mut camera = Camera::default();
        camera.set_zoom(0.5);
        Self {
            camera,
            viewport: Viewport::default(),
            config: EngineConfig::default(),
            theme: Theme::dark(),
            visibility: LinkVisibility::All,
            highlighted: HashSet::new(),
            pending: None,
        }
    }

    fn draw(&self, scene: &Scene) -> RecordingSurface {
        let input = FrameInput {
            scene,
            camera: &self.camera,
            viewport: &self.viewport,
            config: &self.config,
            theme: &self.theme,
            visibility: self.visibility,
            highlighted: &self.highlighted,
            hovered: None,
            drag_hover: None,
            selected_link: None,
            pending: self.pending,
            legend: None,
            now_ms: 1_000.0,
        };
        let mut s = RecordingSurface::new();
        render_frame(&mut s, &input);
        s
    }
}

fn text_alpha(s: &RecordingSurface, text: &str) -> Option<f32> {
    s.ops.iter().find_map(|op| match op {
        DrawOp::Text { text: t, alpha, .. } if t == text => Some(*alpha),
        _ => None,
    })
}

fn stroke_alphas(s: &RecordingSurface) -> Vec<f32> {
    s.ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Stroke { alpha, .. } => Some(*alpha),
            _ => None,
        })
        .collect()
}

#[test]
fn no_search_draws_everything_opaque() {
    let s = Frame::new().draw(&row());
    for op in &s.ops {
        if let Some(alpha) = op.alpha() {
            assert_eq!(alpha, 1.0, "{op:?}");
        }
    }
}

#[test]
fn search_dims_blocks_outside_the_result() {
    let mut frame = Frame::new();
    frame.highlighted.insert(id("sd-a"));
    let s = frame.draw(&row());
    assert_eq!(text_alpha(&s, "Alpha"), Some(1.0));
    assert_eq!(text_alpha(&s, "Beta"), Some(0.18));
    assert_eq!(text_alpha(&s, "Gamma"), Some(0.18));
}

#[test]
fn link_is_lit_only_when_both_ends_match() {
    let mut frame = Frame::new();
    frame.highlighted.extend([id("sd-a"), id("sd-b")]);
    let s = frame.draw(&row());
    let alphas = stroke_alphas(&s);
    // a→b lit (glow + tube + inset + flow), then b→c dimmed, before any block.
    assert!(alphas.iter().take(4).all(|&a| a == 1.0), "{alphas:?}");
    assert!(alphas.iter().skip(4).take(3).all(|&a| a == 0.18), "{alphas:?}");
}

#[test]
fn selection_mode_hides_unrelated_links() {
    let mut frame = Frame::new();
    frame.visibility = LinkVisibility::Selection;
    let scene = row();
    assert!(stroke_alphas(&frame.draw(&scene)).len() == 3, "block borders only");

    let mut scene = row();
    scene.select(Some(id("sd-c")));
    // b→c touches the selection: glow + tube + inset + flow, then 3 borders.
    assert_eq!(stroke_alphas(&frame.draw(&scene)).len(), 7);
}

#[test]
fn color_filter_shows_matching_links_only() {
    let mut frame = Frame::new();
    frame.visibility = LinkVisibility::Color(ColorKind::Orange);
    // Tension links default to orange, simple links to blue.
    assert_eq!(stroke_alphas(&frame.draw(&row())).len(), 3 + 3);
}

#[test]
fn pending_connector_is_dashed() {
    let mut frame = Frame::new();
    frame.pending = Some(PendingConnector {
        source: id("sd-a"),
        end: mc_core::Point::new(300.0, 300.0),
    });
    let s = frame.draw(&row());
    let last = s.ops.iter().rev().find_map(|op| match op {
        DrawOp::Stroke { style, .. } => Some(style.clone()),
        _ => None,
    });
    let style = last.expect("pending line drawn");
    assert_eq!(style.dash.as_slice(), &[6.0, 4.0]);
}

#[test]
fn pending_from_missing_block_is_ignored() {
    let mut frame = Frame::new();
    let before = frame.draw(&row()).ops.len();
    frame.pending = Some(PendingConnector {
        source: id("sd-gone"),
        end: mc_core::Point::new(0.0, 0.0),
    });
    assert_eq!(frame.draw(&row()).ops.len(), before);
}

#[test]
fn constellation_lights_half_matched_links() {
    let mut frame = Frame::new();
    frame.camera.set_zoom(0.3);
    frame.highlighted.insert(id("sd-a"));
    let s = frame.draw(&row());
    let strokes: Vec<(f32, f32)> = s
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Stroke { style, alpha, .. } => Some((*alpha, style.width)),
            _ => None,
        })
        .collect();
    // a→b has one highlighted end: half glow, not dimmed. b→c is dimmed.
    assert_eq!(strokes.len(), 2, "{strokes:?}");
    assert_eq!(strokes[0].0, 1.0);
    assert_eq!(strokes[1].0, 0.18);
    assert!((strokes[0].1 / strokes[1].1 - 1.5).abs() < 1e-4, "{strokes:?}");
}
