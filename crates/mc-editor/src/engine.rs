//! `CanvasEngine`: the façade a host drives.
//!
//! Owns the scene, camera, gesture state, event bus and persistence
//! queue. The host feeds it input events and calls [`CanvasEngine::frame`]
//! once per display refresh; the engine answers with draw calls on the
//! supplied surface and `CanvasEvent`s on its bus.

use crate::events::{CanvasEvent, EventBus, EventKind, SubscriptionId};
use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::interaction::{Context, Events, Interaction, Mode};
use crate::persist::{GeometrySink, GeometryUpdate, Persistence};
use mc_core::config::EngineConfig;
use mc_core::error::Result;
use mc_core::geometry::Point;
use mc_core::id::{BlockId, LinkId};
use mc_core::model::{ColorKind, LinkKind, LinkVisibility, Snapshot};
use mc_core::scene::Scene;
use mc_core::theme::Theme;
use mc_core::view::{Camera, Viewport};
use mc_render::{FrameInput, FrameStats, Legend, Surface, render_frame};
use std::collections::HashSet;

#[derive(Debug)]
pub struct CanvasEngine {
    scene: Scene,
    camera: Camera,
    viewport: Viewport,
    config: EngineConfig,
    theme: Theme,
    visibility: LinkVisibility,
    highlighted: HashSet<BlockId>,
    interaction: Interaction,
    bus: EventBus,
    persistence: Persistence,
    legend: Option<Legend>,
    /// Timestamp of the latest frame/tick; gestures are stamped with it.
    now_ms: f64,
    running: bool,
}

impl Default for CanvasEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default(), Theme::default())
    }
}

impl CanvasEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, Theme::default()))
    }

    fn build(config: EngineConfig, theme: Theme) -> Self {
        Self {
            scene: Scene::new(),
            camera: config.camera(),
            viewport: Viewport::default(),
            persistence: Persistence::new(config.persist_debounce_ms),
            config,
            theme,
            visibility: LinkVisibility::default(),
            highlighted: HashSet::new(),
            interaction: Interaction::new(),
            bus: EventBus::new(),
            legend: None,
            now_ms: 0.0,
            running: false,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    // ─── Data ────────────────────────────────────────────────────────────

    /// Full replace of blocks and links from the external store.
    pub fn load(&mut self, snapshot: Snapshot) {
        self.scene.replace(snapshot);
        self.interaction.retain_existing(&self.scene);
        log::info!(
            "loaded {} blocks, {} links",
            self.scene.blocks().len(),
            self.scene.links().len()
        );
    }

    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let snapshot = Snapshot::from_json(json)?;
        self.load(snapshot);
        Ok(())
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn snapshot(&self) -> Snapshot {
        self.scene.to_snapshot()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Swap the tunables. Pan survives; zoom is re-clamped to the new range.
    pub fn set_config(&mut self, config: EngineConfig) -> Result<()> {
        config.validate()?;
        let (offset, zoom) = (self.camera.offset(), self.camera.zoom());
        self.camera = config.camera();
        self.camera.set_pan(offset.x, offset.y);
        self.camera.set_zoom(zoom);
        self.persistence.set_delay_ms(config.persist_debounce_ms);
        self.config = config;
        log::debug!("config updated: {:?}", self.config);
        Ok(())
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    // ─── View control ────────────────────────────────────────────────────

    pub fn set_pan(&mut self, x: f32, y: f32) {
        self.camera.set_pan(x, y);
    }

    /// Clamped to `[min_zoom, max_zoom]`; returns the zoom actually applied.
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        self.camera.set_zoom(zoom)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_link_visibility(&mut self, mode: LinkVisibility) {
        self.visibility = mode;
    }

    pub fn link_visibility(&self) -> LinkVisibility {
        self.visibility
    }

    /// Search result; an empty set ends the search.
    pub fn set_highlighted(&mut self, ids: impl IntoIterator<Item = BlockId>) {
        self.highlighted = ids.into_iter().collect();
    }

    pub fn highlighted(&self) -> &HashSet<BlockId> {
        &self.highlighted
    }

    pub fn screen_to_world(&self, x: f32, y: f32) -> Point {
        self.camera.screen_to_world(Point::new(x, y))
    }

    pub fn world_to_screen(&self, x: f32, y: f32) -> Point {
        self.camera.world_to_screen(Point::new(x, y))
    }

    /// Center the viewport on a block at the configured comfortable zoom.
    /// Unknown ids are ignored.
    pub fn center_on_block(&mut self, id: BlockId) -> bool {
        let Some(center) = self.scene.block(id).map(|b| b.center()) else {
            return false;
        };
        self.camera
            .center_on(center, self.config.center_zoom, &self.viewport);
        true
    }

    /// New CSS size and pixel ratio; returns the backing-store size.
    pub fn resize(&mut self, width: f32, height: f32, dpr: f32) -> (u32, u32) {
        self.viewport = Viewport {
            width: width.max(0.0),
            height: height.max(0.0),
            dpr: if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 },
        };
        self.viewport.backing_size()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    // ─── Input ───────────────────────────────────────────────────────────

    fn context(&mut self) -> (&mut Interaction, Context<'_>) {
        (
            &mut self.interaction,
            Context {
                scene: &mut self.scene,
                camera: &mut self.camera,
                viewport: &self.viewport,
                config: &self.config,
                link_style: &self.theme.link,
                visibility: self.visibility,
            },
        )
    }

    pub fn pointer_down(&mut self, x: f32, y: f32, button: PointerButton, modifiers: Modifiers) {
        let (it, mut cx) = self.context();
        let events = it.pointer_down(&mut cx, x, y, button, modifiers);
        self.dispatch(events);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let (it, mut cx) = self.context();
        it.pointer_move(&mut cx, x, y);
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        let (it, mut cx) = self.context();
        let events = it.pointer_up(&mut cx, x, y);
        self.dispatch(events);
    }

    /// Pointer capture lost mid-gesture; commits as a pointer-up would.
    pub fn pointer_cancel(&mut self) {
        let (it, mut cx) = self.context();
        let events = it.pointer_cancel(&mut cx);
        self.dispatch(events);
    }

    pub fn wheel(&mut self, x: f32, y: f32, delta_y: f32) {
        let (it, mut cx) = self.context();
        let events = it.wheel(&mut cx, x, y, delta_y);
        self.dispatch(events);
    }

    pub fn double_click(&mut self, x: f32, y: f32) {
        let (it, mut cx) = self.context();
        let events = it.double_click(&mut cx, x, y);
        self.dispatch(events);
    }

    /// Returns whether the key was consumed.
    pub fn key(&mut self, key: &str, modifiers: Modifiers) -> bool {
        let (it, mut cx) = self.context();
        match it.key(&mut cx, key, modifiers) {
            Some(events) => {
                self.dispatch(events);
                true
            }
            None => false,
        }
    }

    /// Route a normalized input event. Returns whether it was consumed.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        match event {
            &InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => self.pointer_down(x, y, button, modifiers),
            &InputEvent::PointerMove { x, y, .. } => self.pointer_move(x, y),
            &InputEvent::PointerUp { x, y, .. } => self.pointer_up(x, y),
            InputEvent::PointerCancel => self.pointer_cancel(),
            &InputEvent::Wheel { x, y, delta_y } => self.wheel(x, y, delta_y),
            &InputEvent::DoubleClick { x, y } => self.double_click(x, y),
            InputEvent::Key { key, modifiers } => return self.key(key, *modifiers),
        }
        true
    }

    pub fn mode(&self) -> Mode {
        self.interaction.mode()
    }

    pub fn cursor(&self) -> &'static str {
        self.interaction.cursor()
    }

    pub fn hovered(&self) -> Option<BlockId> {
        self.interaction.hovered()
    }

    // ─── Selection and link actions ──────────────────────────────────────

    pub fn selected_block(&self) -> Option<BlockId> {
        self.scene.selected()
    }

    pub fn select_block(&mut self, id: Option<BlockId>) {
        let events = self.interaction.select(&mut self.scene, id);
        self.dispatch(events);
    }

    pub fn selected_link(&self) -> Option<LinkId> {
        self.interaction.selected_link()
    }

    pub fn select_link(&mut self, id: Option<LinkId>) {
        let id = id.filter(|&id| self.scene.link(id).is_some());
        let events = self.interaction.set_selected_link(id);
        self.dispatch(events);
    }

    /// Returns `false` for an unknown link.
    pub fn recolor_link(&mut self, id: LinkId, color: ColorKind) -> bool {
        let Some(link) = self.scene.link_mut(id) else {
            return false;
        };
        if link.color != color {
            link.color = color;
            self.dispatch(Events::from_iter([CanvasEvent::LinkRecolored { id, color }]));
        }
        true
    }

    /// Store-driven; no event.
    pub fn retype_link(&mut self, id: LinkId, kind: LinkKind) -> bool {
        match self.scene.link_mut(id) {
            Some(link) => {
                link.kind = kind;
                true
            }
            None => false,
        }
    }

    pub fn legend(&self) -> Option<&Legend> {
        self.legend.as_ref()
    }

    // ─── Events and persistence ──────────────────────────────────────────

    pub fn on(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&CanvasEvent) + 'static,
    ) -> SubscriptionId {
        self.bus.on(kind, handler)
    }

    pub fn on_any(&mut self, handler: impl FnMut(&CanvasEvent) + 'static) -> SubscriptionId {
        self.bus.on_any(handler)
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.bus.off(id)
    }

    pub fn set_geometry_sink(&mut self, sink: impl GeometrySink + 'static) {
        self.persistence.set_sink(Some(Box::new(sink)));
    }

    pub fn pending_persistence(&self) -> usize {
        self.persistence.pending()
    }

    fn dispatch(&mut self, events: Events) {
        for event in events {
            match event {
                CanvasEvent::BlockMoved { id, x, y } => {
                    self.persistence
                        .commit(GeometryUpdate::Position { id, x, y }, self.now_ms);
                }
                CanvasEvent::BlockResized { id, x, y, w, h } => {
                    self.persistence
                        .commit(GeometryUpdate::Size { id, x, y, w, h }, self.now_ms);
                }
                CanvasEvent::BlockShapeChanged { id, .. }
                | CanvasEvent::BlockColorChanged { id, .. } => {
                    self.legend = self.scene.block(id).map(|b| Legend::show(b, self.now_ms));
                }
                _ => {}
            }
            self.bus.emit(&event);
        }
    }

    // ─── Frame loop ──────────────────────────────────────────────────────

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop, flush pending persistence and drop every subscriber.
    pub fn destroy(&mut self) {
        self.running = false;
        self.persistence.flush();
        self.bus.clear();
        self.legend = None;
    }

    /// Advance the clock: deliver due persistence, expire the legend.
    pub fn tick(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
        self.persistence.tick(now_ms);
        if self
            .legend
            .is_some_and(|l| l.opacity(now_ms, &self.config).is_none())
        {
            self.legend = None;
        }
    }

    /// Tick, then draw one frame onto `surface`.
    pub fn frame<S: Surface + ?Sized>(&mut self, surface: &mut S, now_ms: f64) -> FrameStats {
        self.tick(now_ms);
        let input = FrameInput {
            scene: &self.scene,
            camera: &self.camera,
            viewport: &self.viewport,
            config: &self.config,
            theme: &self.theme,
            visibility: self.visibility,
            highlighted: &self.highlighted,
            hovered: self.interaction.hovered(),
            drag_hover: self.interaction.drag_hover(),
            selected_link: self.interaction.selected_link(),
            pending: self.interaction.pending_connector(),
            legend: self.legend.as_ref(),
            now_ms,
        };
        render_frame(surface, &input)
    }
}
