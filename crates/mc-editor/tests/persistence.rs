//! Integration tests: committed geometry reaches the host sink after the
//! quiet period, coalesced per block and per kind of change.

use mc_core::BlockId;
use mc_core::model::{Block, Snapshot};
use mc_editor::{CanvasEngine, GeometryUpdate, Modifiers, PointerButton};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn id(s: &str) -> BlockId {
    BlockId::intern(s)
}

fn engine_with_sink() -> (CanvasEngine, Rc<RefCell<Vec<GeometryUpdate>>>) {
    let mut engine = CanvasEngine::default();
    engine.resize(800.0, 600.0, 1.0);
    engine.load(Snapshot {
        blocks: vec![Block::new(id("p-a"), 0.0, 0.0, 200.0, 120.0)],
        links: vec![],
    });
    let written = Rc::new(RefCell::new(Vec::new()));
    let sink = written.clone();
    engine.set_geometry_sink(move |u: GeometryUpdate| sink.borrow_mut().push(u));
    (engine, written)
}

fn drag(e: &mut CanvasEngine, from: (f32, f32), to: (f32, f32)) {
    e.pointer_down(from.0, from.1, PointerButton::Primary, Modifiers::NONE);
    e.pointer_move(to.0, to.1);
    e.pointer_up(to.0, to.1);
}

#[test]
fn move_is_written_after_quiet_period() {
    let (mut e, written) = engine_with_sink();
    e.tick(1000.0);
    drag(&mut e, (60.0, 60.0), (110.0, 80.0));
    assert_eq!(e.pending_persistence(), 1);

    e.tick(1299.0);
    assert!(written.borrow().is_empty());

    e.tick(1300.0);
    assert_eq!(
        *written.borrow(),
        vec![GeometryUpdate::Position { id: id("p-a"), x: 50.0, y: 20.0 }]
    );
    assert_eq!(e.pending_persistence(), 0);
}

#[test]
fn repeated_moves_coalesce_to_the_last() {
    let (mut e, written) = engine_with_sink();
    e.tick(0.0);
    drag(&mut e, (60.0, 60.0), (70.0, 60.0));
    e.tick(200.0);
    drag(&mut e, (70.0, 60.0), (90.0, 60.0));
    e.tick(400.0);
    assert!(written.borrow().is_empty(), "second move pushed the deadline back");

    e.tick(500.0);
    assert_eq!(
        *written.borrow(),
        vec![GeometryUpdate::Position { id: id("p-a"), x: 30.0, y: 0.0 }]
    );
}

#[test]
fn move_and_resize_are_independent() {
    let (mut e, written) = engine_with_sink();
    e.tick(0.0);
    drag(&mut e, (60.0, 60.0), (70.0, 60.0));
    // East border of the moved block now sits at x = 210.
    drag(&mut e, (211.0, 30.0), (251.0, 30.0));
    assert_eq!(e.pending_persistence(), 2);

    e.tick(300.0);
    assert_eq!(
        *written.borrow(),
        vec![
            GeometryUpdate::Position { id: id("p-a"), x: 10.0, y: 0.0 },
            GeometryUpdate::Size { id: id("p-a"), x: 10.0, y: 0.0, w: 240.0, h: 120.0 },
        ]
    );
}

#[test]
fn destroy_flushes_pending_writes() {
    let (mut e, written) = engine_with_sink();
    e.tick(0.0);
    drag(&mut e, (60.0, 60.0), (70.0, 60.0));
    e.destroy();
    assert_eq!(written.borrow().len(), 1);
    assert!(!e.is_running());
}

#[test]
fn without_sink_nothing_is_queued() {
    let mut e = CanvasEngine::default();
    e.resize(800.0, 600.0, 1.0);
    e.load(Snapshot {
        blocks: vec![Block::new(id("p-b"), 0.0, 0.0, 200.0, 120.0)],
        links: vec![],
    });
    drag(&mut e, (60.0, 60.0), (70.0, 60.0));
    assert_eq!(e.pending_persistence(), 0);
    assert_eq!(e.scene().block(id("p-b")).map(|b| b.x), Some(10.0));
}
