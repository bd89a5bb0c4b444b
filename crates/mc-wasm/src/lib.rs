//! WASM bridge for Mind Canvas: exposes the canvas engine to a web page.
//!
//! Compiled via `wasm-pack build --target web`. The page hands over its
//! `<canvas>`, forwards DOM input, and subscribes to engine events by name.
//! Engine events and geometry writes are queued while the engine is
//! borrowed and handed to JavaScript afterwards, so a handler may call
//! straight back into the canvas.

mod console;
mod render2d;

use mc_core::config::EngineConfig;
use mc_core::error::CanvasError;
use mc_core::id::{BlockId, LinkId};
use mc_core::model::{ColorKind, LinkKind, LinkVisibility, Snapshot};
use mc_core::theme::Theme;
use mc_editor::{CanvasEngine, CanvasEvent, EventKind, GeometryUpdate, Modifiers, PointerButton};
use render2d::Canvas2dSurface;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

type FrameCallback = Closure<dyn FnMut(f64)>;

struct Host {
    engine: CanvasEngine,
    surface: Canvas2dSurface,
    canvas: HtmlCanvasElement,
}

/// Filled by the engine's bus and geometry sink, drained by `deliver`.
#[derive(Default)]
struct Outbox {
    events: Vec<CanvasEvent>,
    writes: Vec<GeometryUpdate>,
}

struct Listener {
    id: u32,
    /// `None` subscribes to every event.
    kind: Option<EventKind>,
    handler: js_sys::Function,
}

struct Shared {
    host: RefCell<Host>,
    outbox: Rc<RefCell<Outbox>>,
    listeners: RefCell<Vec<Listener>>,
    sink: RefCell<Option<js_sys::Function>>,
    next_listener: Cell<u32>,
    /// Pending `requestAnimationFrame` handle.
    frame: Cell<Option<i32>>,
}

impl Shared {
    /// Hand queued events and writes to JavaScript. Must run with no
    /// borrow of `host` held.
    fn deliver(&self) {
        loop {
            let (events, writes) = {
                let mut outbox = self.outbox.borrow_mut();
                (
                    std::mem::take(&mut outbox.events),
                    std::mem::take(&mut outbox.writes),
                )
            };
            if events.is_empty() && writes.is_empty() {
                return;
            }
            for event in &events {
                self.emit(event);
            }
            for update in &writes {
                self.persist(update);
            }
        }
    }

    fn emit(&self, event: &CanvasEvent) {
        let kind = event.kind();
        let handlers: Vec<js_sys::Function> = self
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.kind.is_none_or(|k| k == kind))
            .map(|l| l.handler.clone())
            .collect();
        if handlers.is_empty() {
            return;
        }
        let payload = match event_payload(event) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("dropping {}: {e:?}", kind.as_str());
                return;
            }
        };
        for handler in handlers {
            if let Err(e) = handler.call1(&JsValue::NULL, &payload) {
                log::warn!("{} handler threw: {e:?}", kind.as_str());
            }
        }
    }

    fn persist(&self, update: &GeometryUpdate) {
        let Some(sink) = self.sink.borrow().clone() else {
            return;
        };
        let payload = js_sys::JSON::parse(&geometry_json(update).to_string());
        match payload {
            Ok(payload) => {
                if let Err(e) = sink.call1(&JsValue::NULL, &payload) {
                    log::warn!("geometry sink threw: {e:?}");
                }
            }
            Err(e) => log::warn!("geometry update not serializable: {e:?}"),
        }
    }
}

/// The page-facing canvas controller.
#[wasm_bindgen]
pub struct MindCanvas {
    shared: Rc<Shared>,
    raf: Rc<RefCell<Option<FrameCallback>>>,
}

#[wasm_bindgen]
impl MindCanvas {
    /// Bind to `canvas`. Fails if the 2D context is unavailable or the
    /// optional config override doesn't parse.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        config_json: Option<String>,
    ) -> Result<MindCanvas, JsValue> {
        console_error_panic_hook_setup();
        console::init(log::LevelFilter::Warn);

        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|obj| obj.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| CanvasError::ContextUnavailable("canvas has no 2d context".into()))
            .map_err(to_js)?;

        let config = match config_json {
            Some(json) => EngineConfig::from_json(&json).map_err(to_js)?,
            None => EngineConfig::default(),
        };
        let mut engine = CanvasEngine::new(config).map_err(to_js)?;

        let outbox = Rc::new(RefCell::new(Outbox::default()));
        let events = outbox.clone();
        engine.on_any(move |e| events.borrow_mut().events.push(e.clone()));
        let writes = outbox.clone();
        engine.set_geometry_sink(move |u: GeometryUpdate| writes.borrow_mut().writes.push(u));

        let width = canvas.client_width().max(0) as f32;
        let height = canvas.client_height().max(0) as f32;
        let mut host = Host {
            engine,
            surface: Canvas2dSurface::new(ctx),
            canvas,
        };
        let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        resize_host(&mut host, width, height, dpr as f32);

        Ok(Self {
            shared: Rc::new(Shared {
                host: RefCell::new(host),
                outbox,
                listeners: RefCell::new(Vec::new()),
                sink: RefCell::new(None),
                next_listener: Cell::new(1),
                frame: Cell::new(None),
            }),
            raf: Rc::new(RefCell::new(None)),
        })
    }

    // ─── Data ────────────────────────────────────────────────────────────

    /// Replace every block and link from the store's JSON snapshot.
    pub fn load_json(&self, json: &str) -> Result<(), JsValue> {
        self.with_engine(|e| e.load_json(json)).map_err(to_js)
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.with_engine(|e| e.snapshot().to_json()).map_err(to_js)
    }

    pub fn set_config_json(&self, json: &str) -> Result<(), JsValue> {
        let config = EngineConfig::from_json(json).map_err(to_js)?;
        self.with_engine(|e| e.set_config(config)).map_err(to_js)
    }

    /// `"dark"` or `"light"`. Returns `false` for anything else.
    pub fn set_theme(&self, name: &str) -> bool {
        let theme = match name {
            "dark" => Theme::dark(),
            "light" => Theme::light(),
            _ => return false,
        };
        self.with_engine(|e| e.set_theme(theme));
        true
    }

    // ─── View control ────────────────────────────────────────────────────

    /// New CSS size and device pixel ratio; resizes the backing store.
    pub fn resize(&self, width: f32, height: f32, dpr: f32) {
        resize_host(&mut self.shared.host.borrow_mut(), width, height, dpr);
    }

    pub fn set_pan(&self, x: f32, y: f32) {
        self.with_engine(|e| e.set_pan(x, y));
    }

    /// Clamped to the configured range; returns the zoom applied.
    pub fn set_zoom(&self, zoom: f32) -> f32 {
        self.with_engine(|e| e.set_zoom(zoom))
    }

    /// `{"x":…,"y":…,"zoom":…}`.
    pub fn view(&self) -> String {
        let host = self.shared.host.borrow();
        let camera = host.engine.camera();
        let offset = camera.offset();
        serde_json::json!({ "x": offset.x, "y": offset.y, "zoom": camera.zoom() }).to_string()
    }

    /// `"selection"`, `"all"`, or a color name.
    pub fn set_link_visibility(&self, mode: &str) -> bool {
        match LinkVisibility::parse(mode) {
            Some(mode) => {
                self.with_engine(|e| e.set_link_visibility(mode));
                true
            }
            None => false,
        }
    }

    /// Search result ids; an empty array ends the search.
    pub fn set_highlighted(&self, ids: &js_sys::Array) {
        let ids: Vec<BlockId> = ids
            .iter()
            .filter_map(|v| v.as_string())
            .map(|s| BlockId::intern(&s))
            .collect();
        self.with_engine(|e| e.set_highlighted(ids));
    }

    /// `[x, y]` in world units.
    pub fn screen_to_world(&self, x: f32, y: f32) -> Vec<f32> {
        let p = self.shared.host.borrow().engine.screen_to_world(x, y);
        vec![p.x, p.y]
    }

    pub fn world_to_screen(&self, x: f32, y: f32) -> Vec<f32> {
        let p = self.shared.host.borrow().engine.world_to_screen(x, y);
        vec![p.x, p.y]
    }

    pub fn center_on_block(&self, id: &str) -> bool {
        let id = BlockId::intern(id);
        self.with_engine(|e| e.center_on_block(id))
    }

    // ─── Input ───────────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    pub fn pointer_down(
        &self,
        x: f32,
        y: f32,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.with_engine(|e| e.pointer_down(x, y, PointerButton::from_dom(button), mods));
    }

    pub fn pointer_move(&self, x: f32, y: f32) {
        self.with_engine(|e| e.pointer_move(x, y));
    }

    pub fn pointer_up(&self, x: f32, y: f32) {
        self.with_engine(|e| e.pointer_up(x, y));
    }

    /// Lost capture or window blur: commits the running gesture.
    pub fn pointer_cancel(&self) {
        self.with_engine(|e| e.pointer_cancel());
    }

    pub fn wheel(&self, x: f32, y: f32, delta_y: f32) {
        self.with_engine(|e| e.wheel(x, y, delta_y));
    }

    pub fn double_click(&self, x: f32, y: f32) {
        self.with_engine(|e| e.double_click(x, y));
    }

    /// Returns `true` if the key was consumed (call `preventDefault`).
    pub fn key(&self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.with_engine(|e| e.key(key, mods))
    }

    /// CSS cursor for the canvas element.
    pub fn cursor(&self) -> String {
        self.shared.host.borrow().engine.cursor().to_string()
    }

    // ─── Selection and links ─────────────────────────────────────────────

    pub fn selected_block(&self) -> Option<String> {
        let host = self.shared.host.borrow();
        host.engine.selected_block().map(|id| id.as_str().to_string())
    }

    pub fn select_block(&self, id: Option<String>) {
        let id = id.map(|s| BlockId::intern(&s));
        self.with_engine(|e| e.select_block(id));
    }

    pub fn selected_link(&self) -> Option<String> {
        let host = self.shared.host.borrow();
        host.engine.selected_link().map(|id| id.as_str().to_string())
    }

    pub fn select_link(&self, id: Option<String>) {
        let id = id.map(|s| LinkId::intern(&s));
        self.with_engine(|e| e.select_link(id));
    }

    pub fn recolor_link(&self, id: &str, color: &str) -> bool {
        let color = ColorKind::parse(color);
        if color == ColorKind::Unknown {
            return false;
        }
        let id = LinkId::intern(id);
        self.with_engine(|e| e.recolor_link(id, color))
    }

    pub fn retype_link(&self, id: &str, kind: &str) -> bool {
        let Ok(kind) = serde_json::from_value::<LinkKind>(serde_json::Value::from(kind)) else {
            return false;
        };
        let id = LinkId::intern(id);
        self.with_engine(|e| e.retype_link(id, kind))
    }

    // ─── Events ──────────────────────────────────────────────────────────

    /// Subscribe `handler` to an event name such as `"block:move"`, or
    /// `"*"` for all. Returns an id for [`MindCanvas::off`].
    pub fn on(&self, event: &str, handler: js_sys::Function) -> Result<u32, JsValue> {
        let kind = subscription_kind(event).map_err(|e| JsValue::from(js_sys::Error::new(&e)))?;
        let id = self.shared.next_listener.get();
        self.shared.next_listener.set(id + 1);
        self.shared
            .listeners
            .borrow_mut()
            .push(Listener { id, kind, handler });
        Ok(id)
    }

    pub fn off(&self, id: u32) -> bool {
        let mut listeners = self.shared.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    /// Receives debounced `{key, id, x, y[, w, h]}` writes. `null` detaches.
    pub fn set_geometry_sink(&self, sink: Option<js_sys::Function>) {
        *self.shared.sink.borrow_mut() = sink;
    }

    // ─── Frame loop ──────────────────────────────────────────────────────

    /// Start the `requestAnimationFrame` loop. Idempotent.
    pub fn start(&self) -> Result<(), JsValue> {
        if self.shared.frame.get().is_some() {
            return Ok(());
        }
        self.shared.host.borrow_mut().engine.start();
        if self.raf.borrow().is_none() {
            let cb = frame_callback(self.shared.clone(), Rc::downgrade(&self.raf));
            *self.raf.borrow_mut() = Some(cb);
        }
        schedule(&self.shared, &self.raf)
    }

    pub fn stop(&self) {
        self.shared.host.borrow_mut().engine.stop();
        self.cancel_frame();
    }

    pub fn is_running(&self) -> bool {
        self.shared.host.borrow().engine.is_running()
    }

    /// Draw a single frame outside the loop.
    pub fn render(&self, now_ms: f64) {
        {
            let mut host = self.shared.host.borrow_mut();
            let Host {
                engine, surface, ..
            } = &mut *host;
            engine.frame(surface, now_ms);
        }
        self.shared.deliver();
    }

    /// Stop the loop, flush pending geometry writes and drop every
    /// subscription.
    pub fn destroy(&self) {
        self.cancel_frame();
        self.with_engine(|e| e.destroy());
        self.shared.listeners.borrow_mut().clear();
        *self.shared.sink.borrow_mut() = None;
        self.raf.borrow_mut().take();
    }
}

impl MindCanvas {
    /// Run `f` on the engine, then hand whatever it queued to JavaScript.
    fn with_engine<R>(&self, f: impl FnOnce(&mut CanvasEngine) -> R) -> R {
        let out = f(&mut self.shared.host.borrow_mut().engine);
        self.shared.deliver();
        out
    }

    fn cancel_frame(&self) {
        if let Some(id) = self.shared.frame.take()
            && let Some(window) = web_sys::window()
        {
            let _ = window.cancel_animation_frame(id);
        }
    }
}

impl Drop for MindCanvas {
    fn drop(&mut self) {
        self.cancel_frame();
    }
}

fn resize_host(host: &mut Host, width: f32, height: f32, dpr: f32) {
    let (w, h) = host.engine.resize(width, height, dpr);
    host.canvas.set_width(w);
    host.canvas.set_height(h);
}

/// Per-frame callback: draw, deliver, reschedule while running. Holds the
/// slot weakly so dropping the canvas frees it.
fn frame_callback(shared: Rc<Shared>, slot: Weak<RefCell<Option<FrameCallback>>>) -> FrameCallback {
    Closure::new(move |now_ms: f64| {
        shared.frame.set(None);
        let running = match shared.host.try_borrow_mut() {
            Ok(mut host) => {
                let Host {
                    engine, surface, ..
                } = &mut *host;
                if engine.is_running() {
                    engine.frame(surface, now_ms);
                }
                engine.is_running()
            }
            Err(_) => true,
        };
        shared.deliver();
        if running
            && let Some(slot) = slot.upgrade()
            && let Err(e) = schedule(&shared, &slot)
        {
            log::error!("frame loop stopped: {e:?}");
        }
    })
}

fn schedule(shared: &Shared, slot: &RefCell<Option<FrameCallback>>) -> Result<(), JsValue> {
    let window = web_sys::window()
        .ok_or_else(|| to_js(CanvasError::ContextUnavailable("no window".into())))?;
    if let Some(cb) = slot.borrow().as_ref() {
        let id = window.request_animation_frame(cb.as_ref().unchecked_ref())?;
        shared.frame.set(Some(id));
    }
    Ok(())
}

fn to_js(e: CanvasError) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

fn event_payload(event: &CanvasEvent) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(event).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&json)
}

/// `"*"` subscribes to everything; otherwise a known event name.
fn subscription_kind(name: &str) -> Result<Option<EventKind>, String> {
    if name == "*" {
        return Ok(None);
    }
    EventKind::parse(name)
        .map(Some)
        .ok_or_else(|| format!("unknown event `{name}`"))
}

fn geometry_json(update: &GeometryUpdate) -> serde_json::Value {
    let key = update.key().to_string();
    match *update {
        GeometryUpdate::Position { id, x, y } => serde_json::json!({
            "key": key,
            "id": id.as_str(),
            "x": x,
            "y": y,
        }),
        GeometryUpdate::Size { id, x, y, w, h } => serde_json::json!({
            "key": key,
            "id": id.as_str(),
            "x": x,
            "y": y,
            "w": w,
            "h": h,
        }),
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Mind Canvas WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone helpers (no canvas needed) ───────────────────────────────

/// Set the console log level: `error`, `warn`, `info`, `debug`, `trace`
/// or `off`. Returns `false` for an unknown level.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> bool {
    match level.parse::<log::LevelFilter>() {
        Ok(level) => {
            console::init(level);
            true
        }
        Err(_) => false,
    }
}

/// Check a snapshot without loading it. Returns JSON:
/// `{"ok":true,"blocks":n,"links":m}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_snapshot(json: &str) -> String {
    let result = match Snapshot::from_json(json) {
        Ok(s) => serde_json::json!({
            "ok": true,
            "blocks": s.blocks.len(),
            "links": s.links.len(),
        }),
        Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }),
    };
    result.to_string()
}
