//! View transform: pan offset and zoom.
//!
//! `screen = world * zoom + offset`. The offset is in screen pixels,
//! so zoom scales about the world origin and the pan is applied after.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Visible surface size in CSS pixels plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub dpr: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            dpr: 1.0,
        }
    }
}

impl Viewport {
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Backing-store size in device pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        let px = |v: f32| (v * self.dpr).round().max(1.0) as u32;
        (px(self.width), px(self.height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    offset: Point,
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
}

impl Camera {
    pub fn new(min_zoom: f32, max_zoom: f32) -> Self {
        Self {
            offset: Point::default(),
            zoom: 1.0_f32.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
        }
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn limits(&self) -> (f32, f32) {
        (self.min_zoom, self.max_zoom)
    }

    pub fn set_pan(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.offset = Point::new(x, y);
        }
    }

    /// Clamp into `[min_zoom, max_zoom]`; non-finite input is ignored.
    /// Returns the stored zoom.
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
        self.zoom
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset.x) / self.zoom,
            (p.y - self.offset.y) / self.zoom,
        )
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(
            p.x * self.zoom + self.offset.x,
            p.y * self.zoom + self.offset.y,
        )
    }

    /// Change zoom keeping the world point under `cursor` fixed on screen.
    pub fn zoom_about(&mut self, cursor: Point, zoom: f32) -> f32 {
        let old = self.zoom;
        let new = self.set_zoom(zoom);
        let scale = new / old;
        self.offset = Point::new(
            cursor.x - (cursor.x - self.offset.x) * scale,
            cursor.y - (cursor.y - self.offset.y) * scale,
        );
        new
    }

    /// One wheel notch: `delta_y < 0` zooms in by `factor`, `> 0` out.
    pub fn wheel(&mut self, cursor: Point, delta_y: f32, factor: f32) -> f32 {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return self.zoom;
        }
        let target = if delta_y < 0.0 {
            self.zoom * factor
        } else {
            self.zoom / factor
        };
        self.zoom_about(cursor, target)
    }

    /// Put `world` at the viewport center at the given zoom.
    pub fn center_on(&mut self, world: Point, zoom: f32, viewport: &Viewport) {
        let z = self.set_zoom(zoom);
        let c = viewport.center();
        self.offset = Point::new(c.x - world.x * z, c.y - world.y * z);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(0.1, 5.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_clamps_to_limits() {
        let mut cam = Camera::new(0.1, 5.0);
        assert_eq!(cam.set_zoom(1.0), 1.0);
        assert_eq!(cam.set_zoom(0.05), 0.1);
        assert_eq!(cam.set_zoom(10.0), 5.0);
        assert_eq!(cam.set_zoom(f32::NAN), 5.0);
    }

    #[test]
    fn screen_world_roundtrip() {
        let mut cam = Camera::default();
        cam.set_pan(120.0, -40.0);
        cam.set_zoom(2.5);
        let w = Point::new(33.0, 77.0);
        let back = cam.screen_to_world(cam.world_to_screen(w));
        assert!((back.x - w.x).abs() < 1e-4 && (back.y - w.y).abs() < 1e-4);
    }

    #[test]
    fn center_on_puts_point_mid_screen() {
        let mut cam = Camera::default();
        let vp = Viewport {
            width: 1000.0,
            height: 800.0,
            dpr: 2.0,
        };
        cam.center_on(Point::new(300.0, 200.0), 1.2, &vp);
        let s = cam.world_to_screen(Point::new(300.0, 200.0));
        assert!((s.x - 500.0).abs() < 1e-3 && (s.y - 400.0).abs() < 1e-3);
        assert_eq!(vp.backing_size(), (2000, 1600));
    }
}
