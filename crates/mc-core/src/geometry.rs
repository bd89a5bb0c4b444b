//! Shape contour mathematics.
//!
//! Every query about where a block's edge lies (containment, anchor
//! projection, connector and handle placement, the resize band) goes
//! through one radius function per shape kind, so drawing, linking and
//! hit-testing agree on the same silhouette.
//!
//! | Kind | Contour | Hit test |
//! |------|---------|----------|
//! | circle | radius `min(w, h) / 2` | exact |
//! | oval | ellipse `w/2 × h/2` | exact |
//! | cloud | ellipse scaled by [`cloud_wobble`] | exact, same wobble |
//! | rounded-rect, square | bounding box | bounding box; corner rounding is cosmetic |

use crate::model::ShapeKind;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_4, PI};
use std::ops::{Add, Mul, Sub};

/// Amplitude of the three-lobed term of the cloud silhouette.
pub const CLOUD_WOBBLE_A: f32 = 0.08;
/// Amplitude of the five-lobed term of the cloud silhouette.
pub const CLOUD_WOBBLE_B: f32 = 0.05;
/// Segments used when tracing the cloud outline.
pub const CLOUD_STEPS: usize = 60;

/// Radius multiplier of the cloud contour at parametric angle `theta`.
pub fn cloud_wobble(theta: f32) -> f32 {
    1.0 + CLOUD_WOBBLE_A * (3.0 * theta).sin() + CLOUD_WOBBLE_B * (5.0 * theta).cos()
}

// ─── Points & rects ──────────────────────────────────────────────────────

/// A point in world (or screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f32 {
        (self - other).length()
    }

    /// Unit vector, or zero for a zero-length input.
    pub fn normalized(self) -> Point {
        let len = self.length();
        if len <= f32::EPSILON {
            Point::default()
        } else {
            Point::new(self.x / len, self.y / len)
        }
    }

    /// Rotate by +90° (screen coordinates, y down).
    pub fn perp(self) -> Point {
        Point::new(-self.y, self.x)
    }

    pub fn lerp(self, other: Point, t: f32) -> Point {
        self + (other - self) * t
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;
    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    /// Grow on all sides by `d`.
    pub fn inflate(&self, d: f32) -> Rect {
        Rect::new(self.x - d, self.y - d, self.w + 2.0 * d, self.h + 2.0 * d)
    }
}

// ─── Border edges ────────────────────────────────────────────────────────

/// One of the eight resize edges/corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderEdge {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl BorderEdge {
    /// Handle order: nw, n, ne, e, se, s, sw, w.
    pub const HANDLES: [BorderEdge; 8] = [
        BorderEdge::NW,
        BorderEdge::N,
        BorderEdge::NE,
        BorderEdge::E,
        BorderEdge::SE,
        BorderEdge::S,
        BorderEdge::SW,
        BorderEdge::W,
    ];

    /// Outward direction in screen coordinates (y down), not normalized.
    pub fn direction(self) -> Point {
        match self {
            BorderEdge::N => Point::new(0.0, -1.0),
            BorderEdge::NE => Point::new(1.0, -1.0),
            BorderEdge::E => Point::new(1.0, 0.0),
            BorderEdge::SE => Point::new(1.0, 1.0),
            BorderEdge::S => Point::new(0.0, 1.0),
            BorderEdge::SW => Point::new(-1.0, 1.0),
            BorderEdge::W => Point::new(-1.0, 0.0),
            BorderEdge::NW => Point::new(-1.0, -1.0),
        }
    }

    /// Edge whose octant contains the direction `d` (screen coordinates).
    pub fn from_direction(d: Point) -> BorderEdge {
        let octant = (d.y.atan2(d.x) / FRAC_PI_4).round() as i32;
        match octant.rem_euclid(8) {
            0 => BorderEdge::E,
            1 => BorderEdge::SE,
            2 => BorderEdge::S,
            3 => BorderEdge::SW,
            4 => BorderEdge::W,
            5 => BorderEdge::NW,
            6 => BorderEdge::N,
            _ => BorderEdge::NE,
        }
    }

    pub fn moves_north(self) -> bool {
        matches!(self, BorderEdge::N | BorderEdge::NE | BorderEdge::NW)
    }

    pub fn moves_south(self) -> bool {
        matches!(self, BorderEdge::S | BorderEdge::SE | BorderEdge::SW)
    }

    pub fn moves_east(self) -> bool {
        matches!(self, BorderEdge::E | BorderEdge::NE | BorderEdge::SE)
    }

    pub fn moves_west(self) -> bool {
        matches!(self, BorderEdge::W | BorderEdge::NW | BorderEdge::SW)
    }

    /// CSS cursor for hovering this edge.
    pub fn cursor(self) -> &'static str {
        match self {
            BorderEdge::N | BorderEdge::S => "ns-resize",
            BorderEdge::E | BorderEdge::W => "ew-resize",
            BorderEdge::NW | BorderEdge::SE => "nwse-resize",
            BorderEdge::NE | BorderEdge::SW => "nesw-resize",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BorderEdge::N => "n",
            BorderEdge::NE => "ne",
            BorderEdge::E => "e",
            BorderEdge::SE => "se",
            BorderEdge::S => "s",
            BorderEdge::SW => "sw",
            BorderEdge::W => "w",
            BorderEdge::NW => "nw",
        }
    }
}

// ─── Shape ───────────────────────────────────────────────────────────────

/// Sizing of the shape/color button drawn inside each block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ButtonMetrics {
    pub size: f32,
    /// Inset from the top-right corner for rectangular kinds.
    pub offset: f32,
    pub hit_padding: f32,
}

impl Default for ButtonMetrics {
    fn default() -> Self {
        Self {
            size: 14.0,
            offset: 6.0,
            hit_padding: 4.0,
        }
    }
}

/// A block's silhouette: a shape kind laid out in a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub bounds: Rect,
}

impl Shape {
    pub fn new(kind: ShapeKind, bounds: Rect) -> Self {
        Self { kind, bounds }
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Whether the contour is elliptical (as opposed to a box).
    pub fn is_round(&self) -> bool {
        matches!(
            self.kind,
            ShapeKind::Circle | ShapeKind::Oval | ShapeKind::Cloud
        )
    }

    /// Semi-axes of the base ellipse. Boxes report their half extents.
    pub fn radii(&self) -> (f32, f32) {
        let Rect { w, h, .. } = self.bounds;
        match self.kind {
            ShapeKind::Circle => {
                let r = w.min(h) / 2.0;
                (r, r)
            }
            _ => (w / 2.0, h / 2.0),
        }
    }

    /// Radius multiplier at parametric angle `theta` (1 except for clouds).
    pub fn radius_scale(&self, theta: f32) -> f32 {
        match self.kind {
            ShapeKind::Cloud => cloud_wobble(theta),
            _ => 1.0,
        }
    }

    /// Corner radius used when tracing rectangular kinds.
    pub fn corner_radius(&self) -> f32 {
        let m = self.bounds.w.min(self.bounds.h);
        match self.kind {
            ShapeKind::RoundedRect => m * 0.2,
            ShapeKind::Square => m * 0.1,
            _ => 0.0,
        }
    }

    /// Contour point at parametric angle `theta` (round kinds).
    pub fn contour_point(&self, theta: f32) -> Point {
        let c = self.center();
        let (rx, ry) = self.radii();
        let s = self.radius_scale(theta);
        Point::new(c.x + rx * s * theta.cos(), c.y + ry * s * theta.sin())
    }

    /// Closed polyline of the cloud contour, `CLOUD_STEPS + 1` points.
    pub fn cloud_outline(&self) -> Vec<Point> {
        (0..=CLOUD_STEPS)
            .map(|i| self.contour_point(i as f32 / CLOUD_STEPS as f32 * 2.0 * PI))
            .collect()
    }

    /// Is `p` inside the visible contour?
    pub fn contains(&self, p: Point) -> bool {
        if !self.is_round() {
            return self.bounds.contains(p);
        }
        let c = self.center();
        let (rx, ry) = self.radii();
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let nx = (p.x - c.x) / rx;
        let ny = (p.y - c.y) / ry;
        let theta = ny.atan2(nx);
        nx.hypot(ny) <= self.radius_scale(theta)
    }

    /// Where the ray from the center toward `target` crosses the contour.
    ///
    /// A target at the center itself anchors at the top of the shape.
    pub fn anchor_towards(&self, target: Point) -> Point {
        let c = self.center();
        let mut d = target - c;
        if d.length() <= f32::EPSILON {
            d = Point::new(0.0, -1.0);
        }

        if self.is_round() {
            let (rx, ry) = self.radii();
            if rx <= 0.0 || ry <= 0.0 {
                return c;
            }
            let nx = d.x / rx;
            let ny = d.y / ry;
            let t = self.radius_scale(ny.atan2(nx)) / nx.hypot(ny);
            return c + d * t;
        }

        let hw = self.bounds.w / 2.0;
        let hh = self.bounds.h / 2.0;
        let t = if d.x.abs() * hh > d.y.abs() * hw {
            hw / d.x.abs()
        } else {
            hh / d.y.abs()
        };
        c + d * t
    }

    /// Connector points, in order top, right, bottom, left.
    pub fn connector_points(&self) -> [Point; 4] {
        let c = self.center();
        [
            Point::new(0.0, -1.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(-1.0, 0.0),
        ]
        .map(|d| self.anchor_towards(c + d))
    }

    /// Index of the connector within `radius` of `p`, if any.
    pub fn hit_connector(&self, p: Point, radius: f32) -> Option<usize> {
        self.connector_points()
            .iter()
            .position(|&cp| cp.distance(p) <= radius)
    }

    /// The eight resize handle positions, in [`BorderEdge::HANDLES`] order.
    pub fn resize_handles(&self) -> [(BorderEdge, Point); 8] {
        let c = self.center();
        let (hw, hh) = (self.bounds.w / 2.0, self.bounds.h / 2.0);
        BorderEdge::HANDLES.map(|edge| {
            let d = edge.direction();
            let p = if self.is_round() {
                self.anchor_towards(c + d)
            } else {
                Point::new(c.x + d.x * hw, c.y + d.y * hh)
            };
            (edge, p)
        })
    }

    /// Resize edge under `p`, if it lies in the band of width `band`
    /// straddling the contour.
    pub fn border_edge(&self, p: Point, band: f32) -> Option<BorderEdge> {
        let hw = band / 2.0;
        if self.is_round() {
            let c = self.center();
            let d = p - c;
            if d.length() <= f32::EPSILON {
                return None;
            }
            let anchor = self.anchor_towards(p);
            if anchor.distance(p) > hw {
                return None;
            }
            return Some(BorderEdge::from_direction(d));
        }

        let Rect { x, y, w, h } = self.bounds;
        let in_x = p.x >= x && p.x <= x + w;
        let in_y = p.y >= y && p.y <= y + h;
        let on_left = (p.x - x).abs() <= hw && in_y;
        let on_right = (p.x - (x + w)).abs() <= hw && in_y;
        let on_top = (p.y - y).abs() <= hw && in_x;
        let on_bottom = (p.y - (y + h)).abs() <= hw && in_x;

        match (on_top, on_bottom, on_left, on_right) {
            (true, _, true, _) => Some(BorderEdge::NW),
            (true, _, _, true) => Some(BorderEdge::NE),
            (_, true, true, _) => Some(BorderEdge::SW),
            (_, true, _, true) => Some(BorderEdge::SE),
            (_, _, true, _) => Some(BorderEdge::W),
            (_, _, _, true) => Some(BorderEdge::E),
            (true, _, _, _) => Some(BorderEdge::N),
            (_, true, _, _) => Some(BorderEdge::S),
            _ => None,
        }
    }

    /// Rect of the shape/color button, placed inside the visible contour.
    pub fn button_rect(&self, m: &ButtonMetrics) -> Rect {
        let c = self.center();
        let s = m.size;
        match self.kind {
            ShapeKind::Circle => {
                let (r, _) = self.radii();
                let margin = r * 0.35;
                let a = -FRAC_PI_4;
                Rect::new(
                    c.x + margin * a.cos() - s / 2.0,
                    c.y + margin * a.sin() - s / 2.0,
                    s,
                    s,
                )
            }
            ShapeKind::Oval | ShapeKind::Cloud => {
                let (rx, ry) = self.radii();
                Rect::new(c.x + rx * 0.4 - s / 2.0, c.y - ry * 0.45 - s / 2.0, s, s)
            }
            ShapeKind::RoundedRect | ShapeKind::Square => Rect::new(
                self.bounds.x + self.bounds.w - m.offset - s,
                self.bounds.y + m.offset,
                s,
                s,
            ),
        }
    }

    pub fn hit_button(&self, p: Point, m: &ButtonMetrics) -> bool {
        self.button_rect(m).inflate(m.hit_padding).contains(p)
    }
}
