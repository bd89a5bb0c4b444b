//! Trailing-edge debouncer on an externally supplied clock.
//!
//! Scheduling a key that is already pending replaces its value and pushes
//! its deadline back; nothing stacks. `poll` hands back every entry whose
//! deadline has passed, oldest deadline first.

#[derive(Debug, Clone)]
struct Pending<K, V> {
    key: K,
    value: V,
    due_ms: f64,
}

#[derive(Debug, Clone)]
pub struct Debouncer<K, V> {
    delay_ms: f64,
    pending: Vec<Pending<K, V>>,
}

impl<K: PartialEq, V> Debouncer<K, V> {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            pending: Vec::new(),
        }
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    pub fn set_delay_ms(&mut self, delay_ms: f64) {
        self.delay_ms = delay_ms.max(0.0);
    }

    pub fn schedule(&mut self, key: K, value: V, now_ms: f64) {
        self.pending.retain(|p| p.key != key);
        self.pending.push(Pending {
            key,
            value,
            due_ms: now_ms + self.delay_ms,
        });
    }

    /// Entries due at `now_ms`, removed from the queue.
    pub fn poll(&mut self, now_ms: f64) -> Vec<(K, V)> {
        if !self.pending.iter().any(|p| p.due_ms <= now_ms) {
            return Vec::new();
        }
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due_ms <= now_ms);
        self.pending = rest;
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        due.into_iter().map(|p| (p.key, p.value)).collect()
    }

    /// Everything still pending, regardless of deadline.
    pub fn flush(&mut self) -> Vec<(K, V)> {
        self.pending.drain(..).map(|p| (p.key, p.value)).collect()
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| &p.key != key);
        self.pending.len() != before
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
