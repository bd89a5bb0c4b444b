//! Debounced persistence of committed geometry.
//!
//! Every completed move or resize is queued under its `PersistKey`; after
//! the configured quiet period the latest geometry for that key reaches
//! the host's `GeometrySink`. Nothing comes back: a failed write is the
//! sink's business and never alters the scene.

use crate::debounce::Debouncer;
use mc_core::id::BlockId;
use std::fmt;

/// Moves and resizes of the same block debounce separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersistKey {
    Move(BlockId),
    Resize(BlockId),
}

impl fmt::Display for PersistKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistKey::Move(id) => write!(f, "{id}"),
            PersistKey::Resize(id) => write!(f, "resize-{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryUpdate {
    Position { id: BlockId, x: f32, y: f32 },
    Size { id: BlockId, x: f32, y: f32, w: f32, h: f32 },
}

impl GeometryUpdate {
    pub fn key(&self) -> PersistKey {
        match *self {
            GeometryUpdate::Position { id, .. } => PersistKey::Move(id),
            GeometryUpdate::Size { id, .. } => PersistKey::Resize(id),
        }
    }
}

/// Host-side writer for geometry, e.g. a REST client.
pub trait GeometrySink {
    fn persist(&mut self, update: GeometryUpdate);
}

impl<F: FnMut(GeometryUpdate)> GeometrySink for F {
    fn persist(&mut self, update: GeometryUpdate) {
        self(update)
    }
}

/// Debouncer plus optional sink.
pub struct Persistence {
    queue: Debouncer<PersistKey, GeometryUpdate>,
    sink: Option<Box<dyn GeometrySink>>,
}

impl fmt::Debug for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persistence")
            .field("queue", &self.queue)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl Persistence {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            queue: Debouncer::new(delay_ms),
            sink: None,
        }
    }

    pub fn set_sink(&mut self, sink: Option<Box<dyn GeometrySink>>) {
        self.sink = sink;
    }

    pub fn set_delay_ms(&mut self, delay_ms: f64) {
        self.queue.set_delay_ms(delay_ms);
    }

    /// Queue an update; without a sink there is nothing to do.
    pub fn commit(&mut self, update: GeometryUpdate, now_ms: f64) {
        if self.sink.is_some() {
            self.queue.schedule(update.key(), update, now_ms);
        }
    }

    /// Deliver due updates. Returns how many reached the sink.
    pub fn tick(&mut self, now_ms: f64) -> usize {
        let due = self.queue.poll(now_ms);
        self.deliver(due)
    }

    /// Deliver everything immediately (teardown).
    pub fn flush(&mut self) -> usize {
        let all = self.queue.flush();
        self.deliver(all)
    }

    fn deliver(&mut self, updates: Vec<(PersistKey, GeometryUpdate)>) -> usize {
        let Some(sink) = self.sink.as_mut() else {
            return 0;
        };
        let n = updates.len();
        for (key, update) in updates {
            log::debug!("persist {key}");
            sink.persist(update);
        }
        n
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
