//! Integration tests: pointer gestures through the engine façade
//! (mc-editor ↔ mc-render hit testing ↔ mc-core scene).
//!
//! The camera starts at pan (0, 0) and zoom 1, so screen and world
//! coordinates coincide unless a test changes them.

use mc_core::model::*;
use mc_core::theme::Theme;
use mc_core::{BlockId, LinkId};
use mc_editor::{CanvasEngine, CanvasEvent, Mode, Modifiers, PointerButton};
use mc_render::LinkCurve;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn id(s: &str) -> BlockId {
    BlockId::intern(s)
}

fn engine(blocks: Vec<Block>, links: Vec<Link>) -> (CanvasEngine, Rc<RefCell<Vec<CanvasEvent>>>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut engine = CanvasEngine::default();
    engine.resize(800.0, 600.0, 1.0);
    engine.load(Snapshot { blocks, links });
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    engine.on_any(move |e| sink.borrow_mut().push(e.clone()));
    (engine, log)
}

fn drain(log: &Rc<RefCell<Vec<CanvasEvent>>>) -> Vec<CanvasEvent> {
    log.borrow_mut().drain(..).collect()
}

fn click(e: &mut CanvasEngine, x: f32, y: f32) {
    e.pointer_down(x, y, PointerButton::Primary, Modifiers::NONE);
    e.pointer_up(x, y);
}

fn two_apart() -> Vec<Block> {
    vec![
        Block::new(id("g-a"), 0.0, 0.0, 200.0, 120.0),
        Block::new(id("g-b"), 400.0, 0.0, 200.0, 120.0),
    ]
}

// ─── Selection ──────────────────────────────────────────────────────────

#[test]
fn clicking_selected_block_cycles_to_the_one_underneath() {
    // Y first, X on top of it.
    let (mut e, log) = engine(
        vec![
            Block::new(id("g-y"), 100.0, 100.0, 200.0, 120.0),
            Block::new(id("g-x"), 150.0, 130.0, 200.0, 120.0),
        ],
        vec![],
    );
    click(&mut e, 200.0, 170.0);
    assert_eq!(e.selected_block(), Some(id("g-x")));
    assert_eq!(drain(&log), vec![CanvasEvent::BlockSelected { id: Some(id("g-x")) }]);

    click(&mut e, 200.0, 170.0);
    assert_eq!(e.selected_block(), Some(id("g-y")));
    assert_eq!(drain(&log), vec![CanvasEvent::BlockSelected { id: Some(id("g-y")) }]);
}

#[test]
fn empty_click_deselects_and_pans() {
    let (mut e, log) = engine(two_apart(), vec![]);
    click(&mut e, 60.0, 60.0);
    drain(&log);

    e.pointer_down(700.0, 500.0, PointerButton::Primary, Modifiers::NONE);
    assert_eq!(e.mode(), Mode::Pan);
    e.pointer_move(720.0, 530.0);
    assert_eq!(e.cursor(), "grabbing");
    e.pointer_up(720.0, 530.0);

    assert_eq!(e.selected_block(), None);
    assert_eq!(
        drain(&log),
        vec![
            CanvasEvent::BlockSelected { id: None },
            CanvasEvent::CanvasPanned { x: 20.0, y: 30.0 },
        ]
    );
}

#[test]
fn escape_clears_selection() {
    let (mut e, log) = engine(two_apart(), vec![]);
    click(&mut e, 60.0, 60.0);
    drain(&log);
    assert!(e.key("Escape", Modifiers::NONE));
    assert_eq!(e.selected_block(), None);
    assert_eq!(drain(&log), vec![CanvasEvent::BlockSelected { id: None }]);
    assert!(!e.key("q", Modifiers::NONE));
}

// ─── Drag and resize ────────────────────────────────────────────────────

#[test]
fn drag_moves_live_and_reports_once() {
    let (mut e, log) = engine(two_apart(), vec![]);
    e.pointer_down(60.0, 60.0, PointerButton::Primary, Modifiers::NONE);
    assert_eq!(e.mode(), Mode::DragBlock);
    drain(&log);

    e.pointer_move(80.0, 70.0);
    e.pointer_move(110.0, 80.0);
    let b = e.scene().block(id("g-a")).unwrap();
    assert_eq!((b.x, b.y), (50.0, 20.0));
    assert!(drain(&log).is_empty(), "nothing reported mid-drag");

    e.pointer_up(110.0, 80.0);
    assert_eq!(
        drain(&log),
        vec![CanvasEvent::BlockMoved { id: id("g-a"), x: 50.0, y: 20.0 }]
    );
    assert_eq!(e.mode(), Mode::Idle);
}

#[test]
fn click_without_motion_reports_no_move() {
    let (mut e, log) = engine(two_apart(), vec![]);
    click(&mut e, 60.0, 60.0);
    assert_eq!(drain(&log), vec![CanvasEvent::BlockSelected { id: Some(id("g-a")) }]);
}

#[test]
fn resize_from_west_clamps_and_keeps_east_edge() {
    let (mut e, log) = engine(vec![Block::new(id("g-r"), 100.0, 100.0, 200.0, 120.0)], vec![]);
    e.pointer_down(101.0, 130.0, PointerButton::Primary, Modifiers::NONE);
    assert_eq!(e.mode(), Mode::Resize);
    assert_eq!(e.cursor(), "ew-resize");
    e.pointer_move(600.0, 130.0);
    e.pointer_up(600.0, 130.0);

    let b = e.scene().block(id("g-r")).unwrap();
    assert_eq!((b.x, b.w), (220.0, 80.0));
    assert_eq!(b.x + b.w, 300.0);
    assert_eq!(
        drain(&log).last(),
        Some(&CanvasEvent::BlockResized {
            id: id("g-r"),
            x: 220.0,
            y: 100.0,
            w: 80.0,
            h: 120.0,
        })
    );
}

#[test]
fn lost_capture_commits_the_drag() {
    let (mut e, log) = engine(two_apart(), vec![]);
    e.pointer_down(60.0, 60.0, PointerButton::Primary, Modifiers::NONE);
    e.pointer_move(70.0, 60.0);
    drain(&log);
    e.pointer_cancel();
    assert_eq!(
        drain(&log),
        vec![CanvasEvent::BlockMoved { id: id("g-a"), x: 10.0, y: 0.0 }]
    );
    // A late pointer-up is a no-op.
    e.pointer_up(500.0, 500.0);
    assert!(drain(&log).is_empty());
}

// ─── Connectors ─────────────────────────────────────────────────────────

#[test]
fn connector_drag_creates_link_on_other_block() {
    let (mut e, log) = engine(two_apart(), vec![]);
    e.pointer_down(199.0, 60.0, PointerButton::Primary, Modifiers::NONE);
    assert_eq!(e.mode(), Mode::DragConnector);
    e.pointer_move(500.0, 60.0);
    e.pointer_up(500.0, 60.0);
    assert_eq!(
        drain(&log).last(),
        Some(&CanvasEvent::LinkCreated { source: id("g-a"), target: id("g-b") })
    );
}

#[test]
fn connector_dropped_on_nothing_or_self_creates_nothing() {
    let (mut e, log) = engine(two_apart(), vec![]);
    for (x, y) in [(300.0, 400.0), (60.0, 60.0)] {
        e.pointer_down(199.0, 60.0, PointerButton::Primary, Modifiers::NONE);
        e.pointer_move(x, y);
        e.pointer_up(x, y);
    }
    assert!(
        !drain(&log)
            .iter()
            .any(|ev| matches!(ev, CanvasEvent::LinkCreated { .. }))
    );
}

// ─── Shape button ───────────────────────────────────────────────────────

#[test]
fn shape_button_cycles_shape_then_color_with_alt() {
    let (mut e, log) = engine(two_apart(), vec![]);
    click(&mut e, 187.0, 13.0);
    assert_eq!(
        drain(&log),
        vec![CanvasEvent::BlockShapeChanged { id: id("g-a"), shape: ShapeKind::Square }]
    );
    assert!(e.legend().is_some());

    e.pointer_down(187.0, 13.0, PointerButton::Primary, Modifiers::ALT);
    e.pointer_up(187.0, 13.0);
    assert_eq!(
        drain(&log),
        vec![CanvasEvent::BlockColorChanged { id: id("g-a"), color: ColorKind::Violet }]
    );
    assert_eq!(e.mode(), Mode::Idle);
}

#[test]
fn shape_button_is_inert_below_full_detail() {
    let (mut e, log) = engine(two_apart(), vec![]);
    e.set_zoom(0.5);
    let p = e.world_to_screen(187.0, 13.0);
    e.pointer_down(p.x, p.y, PointerButton::Primary, Modifiers::NONE);
    assert_eq!(e.mode(), Mode::DragBlock);
    e.pointer_up(p.x, p.y);
    assert_eq!(drain(&log), vec![CanvasEvent::BlockSelected { id: Some(id("g-a")) }]);
    assert_eq!(e.scene().block(id("g-a")).map(|b| b.shape), Some(ShapeKind::RoundedRect));
    assert!(e.legend().is_none());
}

#[test]
fn connectors_do_not_start_links_below_full_detail() {
    let (mut e, log) = engine(two_apart(), vec![]);
    e.set_zoom(0.5);
    // Just inside the right edge, on the connector but clear of the border band.
    let p = e.world_to_screen(190.0, 60.0);
    e.pointer_down(p.x, p.y, PointerButton::Primary, Modifiers::NONE);
    assert_eq!(e.mode(), Mode::DragBlock);
    e.pointer_up(p.x, p.y);
    assert_eq!(drain(&log), vec![CanvasEvent::BlockSelected { id: Some(id("g-a")) }]);
}

// ─── Links ──────────────────────────────────────────────────────────────

fn linked() -> (CanvasEngine, Rc<RefCell<Vec<CanvasEvent>>>, mc_core::Point) {
    let blocks = two_apart();
    let mid = LinkCurve::between(&blocks[0], &blocks[1], &Theme::dark().link).eval(0.5);
    let link = Link::new(LinkId::intern("g-l"), id("g-a"), id("g-b"), LinkKind::Simple);
    let (mut e, log) = engine(blocks, vec![link]);
    e.set_link_visibility(LinkVisibility::All);
    (e, log, mid)
}

#[test]
fn right_click_selects_link_and_delete_reports_it() {
    let (mut e, log, mid) = linked();
    e.pointer_down(mid.x, mid.y, PointerButton::Secondary, Modifiers::NONE);
    e.pointer_up(mid.x, mid.y);
    assert_eq!(e.selected_link(), Some(LinkId::intern("g-l")));
    assert!(e.key("Delete", Modifiers::NONE));
    assert_eq!(
        drain(&log),
        vec![
            CanvasEvent::LinkSelected { id: Some(LinkId::intern("g-l")) },
            CanvasEvent::LinkDeleted { id: LinkId::intern("g-l") },
        ]
    );
    assert_eq!(e.selected_link(), None);
}

#[test]
fn hidden_links_are_not_hit() {
    let (mut e, log, mid) = linked();
    e.set_link_visibility(LinkVisibility::Selection);
    e.pointer_down(mid.x, mid.y, PointerButton::Secondary, Modifiers::NONE);
    assert_eq!(e.mode(), Mode::Pan);
    e.pointer_up(mid.x, mid.y);
    assert!(drain(&log).is_empty());
}

#[test]
fn constellation_links_are_hit_along_the_center_line() {
    let (mut e, log, mid) = linked();
    // Opposite the bow, 30 world units off the straight center line.
    let side = if mid.y > 60.0 { -30.0 } else { 30.0 };
    let off_curve = (300.0, 60.0 + side);

    let p = e.world_to_screen(off_curve.0, off_curve.1);
    e.pointer_down(p.x, p.y, PointerButton::Secondary, Modifiers::NONE);
    assert_eq!(e.mode(), Mode::Pan, "missed at full detail");
    e.pointer_up(p.x, p.y);

    e.set_zoom(0.3);
    let p = e.world_to_screen(off_curve.0, off_curve.1);
    e.pointer_down(p.x, p.y, PointerButton::Secondary, Modifiers::NONE);
    e.pointer_up(p.x, p.y);
    assert_eq!(e.selected_link(), Some(LinkId::intern("g-l")));
    assert_eq!(
        drain(&log),
        vec![CanvasEvent::LinkSelected { id: Some(LinkId::intern("g-l")) }]
    );
}

#[test]
fn block_wins_over_link_behind_it() {
    let (mut e, log, mid) = linked();
    let mut snapshot = e.snapshot();
    snapshot
        .blocks
        .push(Block::new(id("g-c"), mid.x - 50.0, mid.y - 50.0, 100.0, 100.0));
    e.load(snapshot);
    click(&mut e, mid.x, mid.y);
    assert_eq!(e.selected_block(), Some(id("g-c")));
    assert_eq!(e.selected_link(), None);
    assert_eq!(drain(&log), vec![CanvasEvent::BlockSelected { id: Some(id("g-c")) }]);
}

#[test]
fn recolor_reports_and_retype_is_silent() {
    let (mut e, log, _) = linked();
    let l = LinkId::intern("g-l");
    assert!(e.recolor_link(l, ColorKind::Orange));
    assert!(e.retype_link(l, LinkKind::Tension));
    assert!(!e.recolor_link(LinkId::intern("g-missing"), ColorKind::Orange));
    assert_eq!(
        drain(&log),
        vec![CanvasEvent::LinkRecolored { id: l, color: ColorKind::Orange }]
    );
    assert_eq!(e.scene().link(l).map(|l| l.kind), Some(LinkKind::Tension));
}

// ─── Wheel, double-click, keyboard zoom ─────────────────────────────────

#[test]
fn wheel_zooms_about_cursor() {
    let (mut e, log) = engine(two_apart(), vec![]);
    let before = e.screen_to_world(300.0, 200.0);
    e.wheel(300.0, 200.0, -100.0);
    let after = e.screen_to_world(300.0, 200.0);
    assert!((before.x - after.x).abs() < 1e-3 && (before.y - after.y).abs() < 1e-3);
    assert_eq!(drain(&log), vec![CanvasEvent::CanvasZoomed { zoom: 1.08 }]);
}

#[test]
fn wheel_at_limit_reports_nothing() {
    let (mut e, log) = engine(two_apart(), vec![]);
    e.set_zoom(5.0);
    e.wheel(300.0, 200.0, -100.0);
    assert!(drain(&log).is_empty());
}

#[test]
fn keyboard_zoom_and_reset() {
    let (mut e, _) = engine(two_apart(), vec![]);
    assert!(e.key("+", Modifiers::NONE));
    assert!((e.camera().zoom() - 1.08).abs() < 1e-6);
    assert!(e.key("0", Modifiers::NONE));
    assert_eq!(e.camera().zoom(), 1.0);
}

#[test]
fn double_click_opens_block() {
    let (mut e, log) = engine(two_apart(), vec![]);
    e.double_click(500.0, 60.0);
    e.double_click(300.0, 400.0);
    assert_eq!(drain(&log), vec![CanvasEvent::BlockOpened { id: id("g-b") }]);
}

#[test]
fn center_on_block_uses_comfortable_zoom() {
    let (mut e, _) = engine(two_apart(), vec![]);
    assert!(e.center_on_block(id("g-b")));
    assert_eq!(e.camera().zoom(), 1.2);
    let c = e.world_to_screen(500.0, 60.0);
    assert!((c.x - 400.0).abs() < 1e-3 && (c.y - 300.0).abs() < 1e-3);
    assert!(!e.center_on_block(id("g-nope")));
}
