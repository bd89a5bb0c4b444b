//! `mc-core` geometry → `kurbo` paths.

use kurbo::{BezPath, Circle, Ellipse, RoundedRect, Shape as _};
use mc_core::geometry::{Point, Rect, Shape};
use mc_core::model::ShapeKind;

const TOLERANCE: f64 = 0.1;

pub fn kp(p: Point) -> kurbo::Point {
    kurbo::Point::new(p.x as f64, p.y as f64)
}

pub fn krect(r: Rect) -> kurbo::Rect {
    kurbo::Rect::new(
        r.x as f64,
        r.y as f64,
        (r.x + r.w) as f64,
        (r.y + r.h) as f64,
    )
}

/// Outline of a block's silhouette. Same contour the hit tests use.
pub fn shape_path(shape: &Shape) -> BezPath {
    let c = shape.center();
    let (rx, ry) = shape.radii();
    match shape.kind {
        ShapeKind::Cloud => polygon(&shape.cloud_outline()),
        ShapeKind::Oval => Ellipse::new(kp(c), (rx as f64, ry as f64), 0.0).to_path(TOLERANCE),
        ShapeKind::Circle => circle(c, rx),
        ShapeKind::RoundedRect | ShapeKind::Square => {
            rounded_rect(shape.bounds, shape.corner_radius())
        }
    }
}

pub fn rounded_rect(r: Rect, radius: f32) -> BezPath {
    RoundedRect::from_rect(krect(r), radius as f64).to_path(TOLERANCE)
}

pub fn rect(r: Rect) -> BezPath {
    krect(r).to_path(TOLERANCE)
}

pub fn circle(center: Point, radius: f32) -> BezPath {
    Circle::new(kp(center), radius.max(0.0) as f64).to_path(TOLERANCE)
}

/// Closed polygon through `points`.
pub fn polygon(points: &[Point]) -> BezPath {
    let mut path = polyline(points);
    if !points.is_empty() {
        path.close_path();
    }
    path
}

/// Open polyline through `points`.
pub fn polyline(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(&first) = iter.next() {
        path.move_to(kp(first));
        for &p in iter {
            path.line_to(kp(p));
        }
    }
    path
}

pub fn line(a: Point, b: Point) -> BezPath {
    polyline(&[a, b])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_path_is_closed_polygon() {
        let s = Shape::new(ShapeKind::Cloud, Rect::new(0.0, 0.0, 200.0, 120.0));
        let path = shape_path(&s);
        assert!(path.segments().count() >= mc_core::geometry::CLOUD_STEPS);
        assert!(matches!(path.elements().last(), Some(kurbo::PathEl::ClosePath)));
    }

    #[test]
    fn box_path_bounds_match_block() {
        let s = Shape::new(ShapeKind::Square, Rect::new(10.0, 20.0, 100.0, 80.0));
        let bb = shape_path(&s).bounding_box();
        assert!((bb.x0 - 10.0).abs() < 1e-6 && (bb.y1 - 100.0).abs() < 1e-6);
    }
}
