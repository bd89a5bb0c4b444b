//! Outbound events and the bus that delivers them.
//!
//! The engine never calls the host directly: each completed gesture
//! becomes exactly one `CanvasEvent`, delivered to every subscriber of its
//! kind. The bus is owned by the engine and torn down with it.

use mc_core::id::{BlockId, LinkId};
use mc_core::model::{ColorKind, ShapeKind};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CanvasEvent {
    BlockSelected { id: Option<BlockId> },
    BlockOpened { id: BlockId },
    BlockMoved { id: BlockId, x: f32, y: f32 },
    /// Final geometry; `x`/`y` change too when resizing from n or w.
    BlockResized { id: BlockId, x: f32, y: f32, w: f32, h: f32 },
    BlockShapeChanged { id: BlockId, shape: ShapeKind },
    BlockColorChanged { id: BlockId, color: ColorKind },
    LinkCreated { source: BlockId, target: BlockId },
    LinkSelected { id: Option<LinkId> },
    LinkDeleted { id: LinkId },
    LinkRecolored { id: LinkId, color: ColorKind },
    CanvasZoomed { zoom: f32 },
    CanvasPanned { x: f32, y: f32 },
}

/// Subscription key, one per `CanvasEvent` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BlockSelected,
    BlockOpened,
    BlockMoved,
    BlockResized,
    BlockShapeChanged,
    BlockColorChanged,
    LinkCreated,
    LinkSelected,
    LinkDeleted,
    LinkRecolored,
    CanvasZoomed,
    CanvasPanned,
}

impl EventKind {
    pub const ALL: [EventKind; 12] = [
        EventKind::BlockSelected,
        EventKind::BlockOpened,
        EventKind::BlockMoved,
        EventKind::BlockResized,
        EventKind::BlockShapeChanged,
        EventKind::BlockColorChanged,
        EventKind::LinkCreated,
        EventKind::LinkSelected,
        EventKind::LinkDeleted,
        EventKind::LinkRecolored,
        EventKind::CanvasZoomed,
        EventKind::CanvasPanned,
    ];

    /// Channel name used by script hosts.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::BlockSelected => "block:select",
            EventKind::BlockOpened => "block:open",
            EventKind::BlockMoved => "block:move",
            EventKind::BlockResized => "block:resize",
            EventKind::BlockShapeChanged => "block:shape",
            EventKind::BlockColorChanged => "block:color",
            EventKind::LinkCreated => "link:create",
            EventKind::LinkSelected => "link:select",
            EventKind::LinkDeleted => "link:delete",
            EventKind::LinkRecolored => "link:recolor",
            EventKind::CanvasZoomed => "canvas:zoom",
            EventKind::CanvasPanned => "canvas:pan",
        }
    }

    pub fn parse(name: &str) -> Option<EventKind> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl CanvasEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CanvasEvent::BlockSelected { .. } => EventKind::BlockSelected,
            CanvasEvent::BlockOpened { .. } => EventKind::BlockOpened,
            CanvasEvent::BlockMoved { .. } => EventKind::BlockMoved,
            CanvasEvent::BlockResized { .. } => EventKind::BlockResized,
            CanvasEvent::BlockShapeChanged { .. } => EventKind::BlockShapeChanged,
            CanvasEvent::BlockColorChanged { .. } => EventKind::BlockColorChanged,
            CanvasEvent::LinkCreated { .. } => EventKind::LinkCreated,
            CanvasEvent::LinkSelected { .. } => EventKind::LinkSelected,
            CanvasEvent::LinkDeleted { .. } => EventKind::LinkDeleted,
            CanvasEvent::LinkRecolored { .. } => EventKind::LinkRecolored,
            CanvasEvent::CanvasZoomed { .. } => EventKind::CanvasZoomed,
            CanvasEvent::CanvasPanned { .. } => EventKind::CanvasPanned,
        }
    }
}

/// Handle returned by `EventBus::on`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&CanvasEvent)>;

struct Subscriber {
    id: SubscriptionId,
    /// `None` listens to every kind.
    kind: Option<EventKind>,
    handler: Handler,
}

/// Typed publish/subscribe, single-threaded.
#[derive(Default)]
pub struct EventBus {
    next: u64,
    subscribers: Vec<Subscriber>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&CanvasEvent) + 'static,
    ) -> SubscriptionId {
        self.subscribe(Some(kind), Box::new(handler))
    }

    pub fn on_any(&mut self, handler: impl FnMut(&CanvasEvent) + 'static) -> SubscriptionId {
        self.subscribe(None, Box::new(handler))
    }

    fn subscribe(&mut self, kind: Option<EventKind>, handler: Handler) -> SubscriptionId {
        self.next += 1;
        let id = SubscriptionId(self.next);
        self.subscribers.push(Subscriber { id, kind, handler });
        id
    }

    /// Returns whether the subscription existed.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Deliver to every matching subscriber, in subscription order.
    /// Returns how many handlers ran.
    pub fn emit(&mut self, event: &CanvasEvent) -> usize {
        let kind = event.kind();
        log::debug!("emit {} {event:?}", kind.as_str());
        let mut delivered = 0;
        for sub in &mut self.subscribers {
            if sub.kind.is_none_or(|k| k == kind) {
                (sub.handler)(event);
                delivered += 1;
            }
        }
        delivered
    }

    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
