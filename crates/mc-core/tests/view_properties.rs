//! Property tests: zoom clamping and zoom-about-cursor.

use mc_core::geometry::Point;
use mc_core::view::Camera;
use proptest::prelude::*;

proptest! {
    #[test]
    fn zoom_is_always_clamped(z in -100.0f32..100.0) {
        let mut cam = Camera::new(0.1, 5.0);
        let stored = cam.set_zoom(z);
        prop_assert!((0.1..=5.0).contains(&stored));
        prop_assert_eq!(stored, cam.zoom());
    }

    #[test]
    fn wheel_keeps_world_point_under_cursor(
        cx in 0.0f32..1600.0,
        cy in 0.0f32..1200.0,
        ox in -2000.0f32..2000.0,
        oy in -2000.0f32..2000.0,
        zoom in 0.1f32..5.0,
        delta in prop::sample::select(vec![-120.0f32, -1.0, 1.0, 120.0]),
    ) {
        let mut cam = Camera::new(0.1, 5.0);
        cam.set_pan(ox, oy);
        cam.set_zoom(zoom);
        let cursor = Point::new(cx, cy);
        let before = cam.screen_to_world(cursor);
        cam.wheel(cursor, delta, 1.08);
        let after = cam.screen_to_world(cursor);
        let tol = 1e-3 * (1.0 + before.x.abs().max(before.y.abs()));
        prop_assert!((before.x - after.x).abs() <= tol, "{before:?} vs {after:?}");
        prop_assert!((before.y - after.y).abs() <= tol, "{before:?} vs {after:?}");
    }
}

#[test]
fn zoom_sequence_clamps_at_both_ends() {
    let mut cam = Camera::new(0.1, 5.0);
    assert_eq!(cam.zoom(), 1.0);
    assert_eq!(cam.set_zoom(0.05), 0.1);
    assert_eq!(cam.set_zoom(10.0), 5.0);
}

#[test]
fn zero_wheel_delta_is_ignored() {
    let mut cam = Camera::new(0.1, 5.0);
    cam.set_pan(12.0, 34.0);
    assert_eq!(cam.wheel(Point::new(100.0, 100.0), 0.0, 1.08), 1.0);
    assert_eq!(cam.offset(), Point::new(12.0, 34.0));
}
