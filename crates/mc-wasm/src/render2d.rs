//! Canvas2D backend for [`Surface`].
//!
//! Maps the surface calls one-to-one onto `CanvasRenderingContext2d`.
//! The context keeps its own state stack, so `save`/`restore` and the
//! global alpha are delegated rather than mirrored.

use kurbo::{Affine, BezPath, PathEl};
use mc_core::color::Rgba;
use mc_core::geometry::Point;
use mc_render::surface::Stop;
use mc_render::{Paint, Shadow, StrokeStyle, Surface, TextAlign, TextBaseline, TextRun};
use wasm_bindgen::JsValue;
use web_sys::{CanvasGradient, CanvasRenderingContext2d};

pub struct Canvas2dSurface {
    ctx: CanvasRenderingContext2d,
}

impl Canvas2dSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    /// Trace `path` as the context's current path.
    fn trace(&self, path: &BezPath) {
        let ctx = &self.ctx;
        ctx.begin_path();
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => ctx.move_to(p.x, p.y),
                PathEl::LineTo(p) => ctx.line_to(p.x, p.y),
                PathEl::QuadTo(c, p) => ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
                PathEl::CurveTo(c1, c2, p) => ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
                PathEl::ClosePath => ctx.close_path(),
            }
        }
    }

    fn gradient(&self, paint: &Paint) -> Option<CanvasGradient> {
        let (grad, stops): (CanvasGradient, &[Stop]) = match paint {
            Paint::Solid(_) => return None,
            Paint::Linear { start, end, stops } => (
                self.ctx.create_linear_gradient(
                    start.x as f64,
                    start.y as f64,
                    end.x as f64,
                    end.y as f64,
                ),
                stops.as_slice(),
            ),
            Paint::Radial {
                center,
                radius,
                stops,
            } => {
                let (x, y) = (center.x as f64, center.y as f64);
                match self
                    .ctx
                    .create_radial_gradient(x, y, 0.0, x, y, *radius as f64)
                {
                    Ok(g) => (g, stops.as_slice()),
                    Err(e) => {
                        log::trace!("radial gradient rejected: {e:?}");
                        return None;
                    }
                }
            }
        };
        for (offset, color) in stops {
            // Out-of-range offsets throw; clamp instead.
            let _ = grad.add_color_stop(offset.clamp(0.0, 1.0), &color.to_css());
        }
        Some(grad)
    }

    fn set_fill(&self, paint: &Paint) {
        match self.gradient(paint) {
            Some(g) => self.ctx.set_fill_style_canvas_gradient(&g),
            None => self.ctx.set_fill_style_str(&paint.primary().to_css()),
        }
    }

    fn set_stroke(&self, paint: &Paint) {
        match self.gradient(paint) {
            Some(g) => self.ctx.set_stroke_style_canvas_gradient(&g),
            None => self.ctx.set_stroke_style_str(&paint.primary().to_css()),
        }
    }

    fn canvas_size(&self) -> (f64, f64) {
        self.ctx
            .canvas()
            .map(|c| (c.width() as f64, c.height() as f64))
            .unwrap_or((0.0, 0.0))
    }
}

impl Surface for Canvas2dSurface {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn transform(&mut self, affine: Affine) {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        let _ = self.ctx.transform(a, b, c, d, e, f);
    }

    fn global_alpha(&self) -> f32 {
        self.ctx.global_alpha() as f32
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0) as f64);
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        match shadow {
            Some(s) => {
                self.ctx.set_shadow_color(&s.color.to_css());
                self.ctx.set_shadow_blur(s.blur as f64);
                self.ctx.set_shadow_offset_x(0.0);
                self.ctx.set_shadow_offset_y(s.offset_y as f64);
            }
            None => {
                self.ctx.set_shadow_color("transparent");
                self.ctx.set_shadow_blur(0.0);
                self.ctx.set_shadow_offset_y(0.0);
            }
        }
    }

    fn clear(&mut self, color: Rgba) {
        let (w, h) = self.canvas_size();
        let ctx = &self.ctx;
        ctx.save();
        let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        ctx.set_global_alpha(1.0);
        ctx.clear_rect(0.0, 0.0, w, h);
        ctx.set_fill_style_str(&color.to_css());
        ctx.fill_rect(0.0, 0.0, w, h);
        ctx.restore();
    }

    fn fill(&mut self, path: &BezPath, paint: &Paint) {
        self.trace(path);
        self.set_fill(paint);
        self.ctx.fill();
    }

    fn stroke(&mut self, path: &BezPath, paint: &Paint, style: &StrokeStyle) {
        self.trace(path);
        self.set_stroke(paint);
        self.ctx.set_line_width(style.width as f64);
        let dash = js_sys::Array::new();
        for d in &style.dash {
            dash.push(&JsValue::from_f64(*d as f64));
        }
        let _ = self.ctx.set_line_dash(&dash);
        self.ctx.set_line_dash_offset(style.dash_offset as f64);
        self.ctx.stroke();
    }

    fn clip(&mut self, path: &BezPath) {
        self.trace(path);
        self.ctx.clip();
    }

    fn fill_text(&mut self, text: &str, at: Point, run: &TextRun<'_>) {
        let ctx = &self.ctx;
        ctx.set_font(run.font);
        ctx.set_fill_style_str(&run.color.to_css());
        ctx.set_text_align(match run.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
        });
        ctx.set_text_baseline(match run.baseline {
            TextBaseline::Top => "top",
            TextBaseline::Middle => "middle",
            TextBaseline::Bottom => "bottom",
        });
        let _ = ctx.fill_text(text, at.x as f64, at.y as f64);
    }

    fn measure_text(&mut self, text: &str, font: &str) -> f32 {
        self.ctx.set_font(font);
        match self.ctx.measure_text(text) {
            Ok(m) => m.width() as f32,
            Err(_) => text.chars().count() as f32 * mc_render::surface::font_px(font) * 0.55,
        }
    }
}
