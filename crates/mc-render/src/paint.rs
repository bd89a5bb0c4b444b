//! `Surface` backend that emits into a `vello::Scene`.
//!
//! Call [`render_frame`](crate::render_frame) with a freshly reset scene;
//! the caller presents it through its own wgpu setup. Text shaping needs
//! a font context and is deferred: text calls are traced, not drawn.

use crate::surface::{Paint, Shadow, StrokeStyle, Surface, TextRun, font_px};
use kurbo::{Affine, BezPath, Shape as _, Stroke as KurboStroke};
use mc_core::color::Rgba;
use mc_core::geometry::Point;
use peniko::{Brush, Color, ColorStop, Fill, Gradient, Mix};
use vello::Scene;

#[derive(Debug, Clone, Copy)]
struct State {
    transform: Affine,
    alpha: f32,
    shadow: Option<Shadow>,
    /// Clip layers pushed since the matching `save`.
    layers: usize,
}

pub struct VelloSurface<'a> {
    scene: &'a mut Scene,
    width: f64,
    height: f64,
    state: State,
    stack: Vec<State>,
}

impl<'a> VelloSurface<'a> {
    pub fn new(scene: &'a mut Scene, width: f64, height: f64) -> Self {
        Self {
            scene,
            width,
            height,
            state: State {
                transform: Affine::IDENTITY,
                alpha: 1.0,
                shadow: None,
                layers: 0,
            },
            stack: Vec::new(),
        }
    }

    fn color(&self, c: Rgba) -> Color {
        let [r, g, b, a] = c.fade(self.state.alpha).to_rgba8();
        Color::from_rgba8(r, g, b, a)
    }

    fn brush(&self, paint: &Paint) -> Brush {
        let stops = |stops: &[(f32, Rgba)]| -> Vec<ColorStop> {
            stops
                .iter()
                .map(|&(offset, c)| ColorStop::from((offset, self.color(c))))
                .collect()
        };
        match paint {
            Paint::Solid(c) => Brush::Solid(self.color(*c)),
            Paint::Linear { start, end, stops: s } => Brush::Gradient(
                Gradient::new_linear(
                    (start.x as f64, start.y as f64),
                    (end.x as f64, end.y as f64),
                )
                .with_stops(stops(s).as_slice()),
            ),
            Paint::Radial {
                center,
                radius,
                stops: s,
            } => Brush::Gradient(
                Gradient::new_radial((center.x as f64, center.y as f64), *radius)
                    .with_stops(stops(s).as_slice()),
            ),
        }
    }

    /// Vello has no shadow state; approximate with a blurred box behind the shape.
    fn draw_shadow(&mut self, path: &BezPath) {
        let Some(shadow) = self.state.shadow else {
            return;
        };
        if shadow.color.a <= 0.0 {
            return;
        }
        let bb = path.bounding_box() + kurbo::Vec2::new(0.0, shadow.offset_y as f64);
        let radius = bb.width().min(bb.height()) * 0.25;
        let color = self.color(shadow.color);
        self.scene.draw_blurred_rounded_rect(
            self.state.transform,
            bb,
            color,
            radius,
            (shadow.blur / 2.0) as f64,
        );
    }
}

impl Surface for VelloSurface<'_> {
    fn save(&mut self) {
        self.stack.push(self.state);
        self.state.layers = 0;
    }

    fn restore(&mut self) {
        for _ in 0..self.state.layers {
            self.scene.pop_layer();
        }
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn transform(&mut self, affine: Affine) {
        self.state.transform *= affine;
    }

    fn global_alpha(&self) -> f32 {
        self.state.alpha
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.state.shadow = shadow;
    }

    fn clear(&mut self, color: Rgba) {
        let full = kurbo::Rect::new(0.0, 0.0, self.width, self.height);
        let [r, g, b, a] = color.to_rgba8();
        self.scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            Color::from_rgba8(r, g, b, a),
            None,
            &full,
        );
    }

    fn fill(&mut self, path: &BezPath, paint: &Paint) {
        self.draw_shadow(path);
        let brush = self.brush(paint);
        self.scene
            .fill(Fill::NonZero, self.state.transform, &brush, None, path);
    }

    fn stroke(&mut self, path: &BezPath, paint: &Paint, style: &StrokeStyle) {
        let mut stroke = KurboStroke::new(style.width as f64);
        if style.is_dashed() {
            stroke = stroke.with_dashes(
                style.dash_offset as f64,
                style.dash.iter().map(|&d| d as f64),
            );
        }
        let brush = self.brush(paint);
        self.scene
            .stroke(&stroke, self.state.transform, &brush, None, path);
    }

    fn clip(&mut self, path: &BezPath) {
        self.scene
            .push_layer(Mix::Clip, 1.0, self.state.transform, path);
        self.state.layers += 1;
    }

    fn fill_text(&mut self, text: &str, at: Point, run: &TextRun<'_>) {
        log::trace!("TEXT {:?} at ({}, {}) font {}", text, at.x, at.y, run.font);
    }

    fn measure_text(&mut self, text: &str, font: &str) -> f32 {
        text.chars().count() as f32 * font_px(font) * 0.55
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameInput, render_frame};
    use kurbo::Shape as _;
    use mc_core::config::EngineConfig;
    use mc_core::id::BlockId;
    use mc_core::model::{Block, LinkVisibility, Snapshot};
    use mc_core::scene::Scene as CanvasScene;
    use mc_core::theme::Theme;
    use mc_core::view::{Camera, Viewport};
    use std::collections::HashSet;

    #[test]
    fn restore_pops_clip_layers_of_its_save() {
        let mut scene = Scene::new();
        let mut s = VelloSurface::new(&mut scene, 100.0, 100.0);
        let path = kurbo::Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1);
        s.clip(&path);
        s.save();
        s.clip(&path);
        s.clip(&path);
        assert_eq!(s.state.layers, 2);
        s.restore();
        assert_eq!(s.state.layers, 1);
        assert!(s.stack.is_empty());
    }

    #[test]
    fn global_alpha_is_saved_and_clamped() {
        let mut scene = Scene::new();
        let mut s = VelloSurface::new(&mut scene, 100.0, 100.0);
        s.set_global_alpha(0.5);
        s.save();
        s.set_global_alpha(3.0);
        assert_eq!(s.global_alpha(), 1.0);
        s.restore();
        assert_eq!(s.global_alpha(), 0.5);
    }

    #[test]
    fn full_frame_leaves_state_balanced() {
        let _ = env_logger::builder().is_test(true).try_init();
        let canvas = CanvasScene::from_snapshot(Snapshot {
            blocks: vec![
                Block::new(BlockId::intern("vs-a"), 0.0, 0.0, 200.0, 120.0).with_title("Vello"),
            ],
            links: Vec::new(),
        });
        let (camera, viewport, config, theme) = (
            Camera::default(),
            Viewport::default(),
            EngineConfig::default(),
            Theme::dark(),
        );
        let highlighted = HashSet::new();
        let input = FrameInput {
            scene: &canvas,
            camera: &camera,
            viewport: &viewport,
            config: &config,
            theme: &theme,
            visibility: LinkVisibility::All,
            highlighted: &highlighted,
            hovered: None,
            drag_hover: None,
            selected_link: None,
            pending: None,
            legend: None,
            now_ms: 0.0,
        };
        let mut scene = Scene::new();
        let mut s = VelloSurface::new(&mut scene, 800.0, 600.0);
        let stats = render_frame(&mut s, &input);
        assert_eq!(stats.blocks_drawn, 1);
        assert!(s.stack.is_empty());
        assert_eq!(s.state.layers, 0);
    }
}
