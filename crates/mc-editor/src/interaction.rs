//! Pointer gesture state machine.
//!
//! Exactly one gesture is active at a time, chosen at pointer-down by a
//! fixed priority:
//!
//! | # | Hit | Result |
//! |---|-----|--------|
//! | 1 | shape button | cycle shape (Alt: color), stay idle |
//! | 2 | connector | `DragConnector` |
//! | 3 | border band | `Resize` with the edge under the pointer |
//! | 4 | interior | `DragBlock`, or cycle to the block underneath if already selected |
//! | 5 | link curve | select the link |
//! | 6 | nothing | deselect, `Pan` |
//!
//! Moves and resizes mutate the scene immediately; their events fire once,
//! at pointer-up.

use crate::events::CanvasEvent;
use crate::input::{Modifiers, PointerButton};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use mc_core::config::EngineConfig;
use mc_core::geometry::{BorderEdge, Point, Rect};
use mc_core::id::{BlockId, LinkId};
use mc_core::model::LinkVisibility;
use mc_core::scene::Scene;
use mc_core::theme::LinkStyle;
use mc_core::view::{Camera, Viewport};
use mc_render::PendingConnector;
use mc_render::hit::{BlockPart, block_at, next_block_below, pick};
use mc_render::links::hit_test_link;
use smallvec::SmallVec;

pub type Events = SmallVec<[CanvasEvent; 2]>;

/// Everything a gesture may read or mutate.
pub struct Context<'a> {
    pub scene: &'a mut Scene,
    pub camera: &'a mut Camera,
    pub viewport: &'a Viewport,
    pub config: &'a EngineConfig,
    pub link_style: &'a LinkStyle,
    pub visibility: LinkVisibility,
}

impl Context<'_> {
    fn world(&self, screen: Point) -> Point {
        self.camera.screen_to_world(screen)
    }

    fn link_at(&self, world: Point) -> Option<LinkId> {
        let lod = self.config.lod(self.camera.zoom());
        let zoom = self.camera.zoom().max(f32::EPSILON);
        hit_test_link(
            self.scene,
            self.visibility,
            self.link_style,
            lod,
            world,
            self.config.link_hit_tolerance / zoom,
            self.config.link_hit_samples,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Pan,
    DragBlock,
    DragConnector,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Pan {
        /// Screen position at pointer-down.
        start: Point,
        /// Camera offset at pointer-down.
        offset: Point,
    },
    DragBlock {
        id: BlockId,
        /// Pointer position relative to the block origin, world units.
        grab: Point,
        origin: Point,
    },
    Resize {
        id: BlockId,
        edge: BorderEdge,
        /// World position at pointer-down.
        start: Point,
        rect: Rect,
    },
    DragConnector {
        source: BlockId,
        end: Point,
    },
}

impl Gesture {
    pub fn mode(&self) -> Mode {
        match self {
            Gesture::Idle => Mode::Idle,
            Gesture::Pan { .. } => Mode::Pan,
            Gesture::DragBlock { .. } => Mode::DragBlock,
            Gesture::Resize { .. } => Mode::Resize,
            Gesture::DragConnector { .. } => Mode::DragConnector,
        }
    }
}

/// Geometry after dragging `edge` by `delta` from `start`, clamped to
/// `min` (w, h). Edges moving north or west keep the opposite edge fixed.
pub fn resize_rect(start: Rect, edge: BorderEdge, delta: Point, min: (f32, f32)) -> Rect {
    let Rect { x, y, w, h } = start;
    let mut out = start;
    if edge.moves_east() {
        out.w = (w + delta.x).max(min.0);
    }
    if edge.moves_west() {
        out.w = (w - delta.x).max(min.0);
        out.x = x + w - out.w;
    }
    if edge.moves_south() {
        out.h = (h + delta.y).max(min.1);
    }
    if edge.moves_north() {
        out.h = (h - delta.y).max(min.1);
        out.y = y + h - out.h;
    }
    out
}

#[derive(Debug, Clone)]
pub struct Interaction {
    gesture: Gesture,
    /// Last known pointer position, screen.
    pointer: Point,
    hovered: Option<BlockId>,
    drag_hover: Option<BlockId>,
    selected_link: Option<LinkId>,
    cursor: &'static str,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            gesture: Gesture::Idle,
            pointer: Point::default(),
            hovered: None,
            drag_hover: None,
            selected_link: None,
            cursor: "default",
        }
    }
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn mode(&self) -> Mode {
        self.gesture.mode()
    }

    pub fn hovered(&self) -> Option<BlockId> {
        self.hovered
    }

    pub fn drag_hover(&self) -> Option<BlockId> {
        self.drag_hover
    }

    pub fn selected_link(&self) -> Option<LinkId> {
        self.selected_link
    }

    /// CSS cursor for the current hover or gesture.
    pub fn cursor(&self) -> &'static str {
        self.cursor
    }

    pub fn pending_connector(&self) -> Option<PendingConnector> {
        match self.gesture {
            Gesture::DragConnector { source, end } => Some(PendingConnector { source, end }),
            _ => None,
        }
    }

    /// Drop references to items that left the scene (after a reload).
    pub fn retain_existing(&mut self, scene: &Scene) {
        let gone = |id: Option<BlockId>| id.is_some_and(|id| scene.block(id).is_none());
        if gone(self.hovered) {
            self.hovered = None;
        }
        if gone(self.drag_hover) {
            self.drag_hover = None;
        }
        if self.selected_link.is_some_and(|id| scene.link(id).is_none()) {
            self.selected_link = None;
        }
        let active = match self.gesture {
            Gesture::DragBlock { id, .. } | Gesture::Resize { id, .. } => Some(id),
            Gesture::DragConnector { source, .. } => Some(source),
            Gesture::Idle | Gesture::Pan { .. } => None,
        };
        if gone(active) {
            log::debug!("gesture target vanished, back to idle");
            self.gesture = Gesture::Idle;
        }
    }

    // ─── Selection helpers ───────────────────────────────────────────────

    fn select_block(scene: &mut Scene, id: Option<BlockId>, out: &mut Events) {
        if scene.select(id) {
            out.push(CanvasEvent::BlockSelected { id: scene.selected() });
        }
    }

    fn select_link(&mut self, id: Option<LinkId>, out: &mut Events) {
        if self.selected_link != id {
            self.selected_link = id;
            out.push(CanvasEvent::LinkSelected { id });
        }
    }

    /// Programmatic block selection (no gesture).
    pub fn select(&mut self, scene: &mut Scene, id: Option<BlockId>) -> Events {
        let mut out = Events::new();
        Self::select_block(scene, id, &mut out);
        out
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    pub fn pointer_down(
        &mut self,
        cx: &mut Context<'_>,
        x: f32,
        y: f32,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> Events {
        let mut out = Events::new();
        let screen = Point::new(x, y);
        self.pointer = screen;
        if self.gesture != Gesture::Idle {
            // A stray second button while a gesture runs.
            return out;
        }
        let world = cx.world(screen);

        match button {
            PointerButton::Primary => {}
            PointerButton::Secondary => {
                match cx.link_at(world) {
                    Some(link) => self.select_link(Some(link), &mut out),
                    None => self.begin_pan(cx, screen),
                }
                return out;
            }
            PointerButton::Middle => {
                self.begin_pan(cx, screen);
                return out;
            }
            PointerButton::Other(_) => return out,
        }

        let Some((id, part)) = pick(cx.scene, world, cx.config, cx.camera.zoom()) else {
            match cx.link_at(world) {
                Some(link) => self.select_link(Some(link), &mut out),
                None => {
                    Self::select_block(cx.scene, None, &mut out);
                    self.select_link(None, &mut out);
                    self.begin_pan(cx, screen);
                }
            }
            return out;
        };

        self.select_link(None, &mut out);
        match part {
            BlockPart::Button => {
                if let Some(block) = cx.scene.block_mut(id) {
                    out.push(if modifiers.alt {
                        block.color = block.color.next();
                        CanvasEvent::BlockColorChanged { id, color: block.color }
                    } else {
                        block.shape = block.shape.next();
                        CanvasEvent::BlockShapeChanged { id, shape: block.shape }
                    });
                }
            }
            BlockPart::Connector(_) => {
                Self::select_block(cx.scene, Some(id), &mut out);
                self.gesture = Gesture::DragConnector { source: id, end: world };
            }
            BlockPart::Border(edge) => {
                Self::select_block(cx.scene, Some(id), &mut out);
                if let Some(block) = cx.scene.block(id) {
                    self.gesture = Gesture::Resize {
                        id,
                        edge,
                        start: world,
                        rect: block.bounds(),
                    };
                }
            }
            BlockPart::Body => {
                let already = cx.scene.selected() == Some(id);
                match next_block_below(cx.scene, world, id).filter(|_| already) {
                    Some(below) => Self::select_block(cx.scene, Some(below), &mut out),
                    None => {
                        Self::select_block(cx.scene, Some(id), &mut out);
                        if let Some(block) = cx.scene.block(id) {
                            let origin = Point::new(block.x, block.y);
                            self.gesture = Gesture::DragBlock {
                                id,
                                grab: world - origin,
                                origin,
                            };
                        }
                    }
                }
            }
        }
        self.refresh_cursor(cx, world);
        out
    }

    fn begin_pan(&mut self, cx: &Context<'_>, screen: Point) {
        self.gesture = Gesture::Pan {
            start: screen,
            offset: cx.camera.offset(),
        };
        self.cursor = "grabbing";
    }

    pub fn pointer_move(&mut self, cx: &mut Context<'_>, x: f32, y: f32) {
        let screen = Point::new(x, y);
        self.pointer = screen;
        let world = cx.world(screen);

        match self.gesture {
            Gesture::Idle => {
                self.hovered = pick(cx.scene, world, cx.config, cx.camera.zoom()).map(|(id, _)| id);
            }
            Gesture::Pan { start, offset } => {
                let d = screen - start;
                cx.camera.set_pan(offset.x + d.x, offset.y + d.y);
            }
            Gesture::DragBlock { id, grab, .. } => {
                if let Some(block) = cx.scene.block_mut(id) {
                    block.x = world.x - grab.x;
                    block.y = world.y - grab.y;
                }
            }
            Gesture::Resize { id, edge, start, rect } => {
                let min = (cx.config.min_block_width, cx.config.min_block_height);
                let r = resize_rect(rect, edge, world - start, min);
                if let Some(block) = cx.scene.block_mut(id) {
                    block.x = r.x;
                    block.y = r.y;
                    block.w = r.w;
                    block.h = r.h;
                }
            }
            Gesture::DragConnector { source, .. } => {
                self.gesture = Gesture::DragConnector { source, end: world };
                self.drag_hover = block_at(cx.scene, world).filter(|&id| id != source);
            }
        }
        self.refresh_cursor(cx, world);
    }

    /// Finish the active gesture. A pointer-up with no gesture is a no-op.
    pub fn pointer_up(&mut self, cx: &mut Context<'_>, x: f32, y: f32) -> Events {
        self.pointer = Point::new(x, y);
        self.finish(cx)
    }

    /// Lost pointer capture: commit the gesture at the last known position.
    pub fn pointer_cancel(&mut self, cx: &mut Context<'_>) -> Events {
        self.finish(cx)
    }

    fn finish(&mut self, cx: &mut Context<'_>) -> Events {
        let mut out = Events::new();
        let world = cx.world(self.pointer);
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => {}
            Gesture::Pan { offset, .. } => {
                let now = cx.camera.offset();
                if now != offset {
                    out.push(CanvasEvent::CanvasPanned { x: now.x, y: now.y });
                }
            }
            Gesture::DragBlock { id, origin, .. } => {
                if let Some(b) = cx.scene.block(id)
                    && (b.x, b.y) != (origin.x, origin.y)
                {
                    out.push(CanvasEvent::BlockMoved { id, x: b.x, y: b.y });
                }
            }
            Gesture::Resize { id, rect, .. } => {
                if let Some(b) = cx.scene.block(id)
                    && b.bounds() != rect
                {
                    out.push(CanvasEvent::BlockResized {
                        id,
                        x: b.x,
                        y: b.y,
                        w: b.w,
                        h: b.h,
                    });
                }
            }
            Gesture::DragConnector { source, .. } => {
                self.drag_hover = None;
                if let Some(target) = block_at(cx.scene, world).filter(|&t| t != source) {
                    out.push(CanvasEvent::LinkCreated { source, target });
                }
            }
        }
        self.hovered = pick(cx.scene, world, cx.config, cx.camera.zoom()).map(|(id, _)| id);
        self.refresh_cursor(cx, world);
        out
    }

    fn refresh_cursor(&mut self, cx: &Context<'_>, world: Point) {
        self.cursor = match self.gesture {
            Gesture::Pan { .. } | Gesture::DragBlock { .. } => "grabbing",
            Gesture::Resize { edge, .. } => edge.cursor(),
            Gesture::DragConnector { .. } => "crosshair",
            Gesture::Idle => match pick(cx.scene, world, cx.config, cx.camera.zoom()) {
                Some((_, BlockPart::Button)) => "pointer",
                Some((_, BlockPart::Connector(_))) => "crosshair",
                Some((_, BlockPart::Border(edge))) => edge.cursor(),
                Some((_, BlockPart::Body)) => "grab",
                None if cx.link_at(world).is_some() => "pointer",
                None => "default",
            },
        };
    }

    // ─── Wheel, double-click, keyboard ───────────────────────────────────

    pub fn wheel(&mut self, cx: &mut Context<'_>, x: f32, y: f32, delta_y: f32) -> Events {
        let mut out = Events::new();
        let before = cx.camera.zoom();
        let zoom = cx.camera.wheel(Point::new(x, y), delta_y, cx.config.wheel_zoom_factor);
        if zoom != before {
            out.push(CanvasEvent::CanvasZoomed { zoom });
        }
        out
    }

    pub fn double_click(&mut self, cx: &mut Context<'_>, x: f32, y: f32) -> Events {
        let world = cx.world(Point::new(x, y));
        block_at(cx.scene, world)
            .map(|id| CanvasEvent::BlockOpened { id })
            .into_iter()
            .collect()
    }

    /// Returns `None` when the key has no binding (let the host handle it).
    pub fn key(&mut self, cx: &mut Context<'_>, key: &str, modifiers: Modifiers) -> Option<Events> {
        let action = ShortcutMap::resolve(key, modifiers)?;
        let mut out = Events::new();
        let center = cx.viewport.center();
        let factor = cx.config.wheel_zoom_factor;
        let zoom_to = |camera: &mut Camera, target: f32, out: &mut Events| {
            let before = camera.zoom();
            let zoom = camera.zoom_about(center, target);
            if zoom != before {
                out.push(CanvasEvent::CanvasZoomed { zoom });
            }
        };
        match action {
            ShortcutAction::Delete => {
                if let Some(id) = self.selected_link.take() {
                    out.push(CanvasEvent::LinkDeleted { id });
                }
            }
            ShortcutAction::Deselect => {
                Self::select_block(cx.scene, None, &mut out);
                self.select_link(None, &mut out);
            }
            ShortcutAction::ZoomIn => {
                let target = cx.camera.zoom() * factor;
                zoom_to(&mut *cx.camera, target, &mut out);
            }
            ShortcutAction::ZoomOut => {
                let target = cx.camera.zoom() / factor;
                zoom_to(&mut *cx.camera, target, &mut out);
            }
            ShortcutAction::ResetZoom => zoom_to(&mut *cx.camera, 1.0, &mut out),
        }
        Some(out)
    }

    /// Programmatic link selection.
    pub fn set_selected_link(&mut self, id: Option<LinkId>) -> Events {
        let mut out = Events::new();
        self.select_link(id, &mut out);
        out
    }
}
