//! Monitor Registry (spec §4.2): the current display snapshot plus its
//! 150 ms coalescing timer.
//!
//! The timer itself is driven from outside this type (a background
//! thread owned by the engine posts a coalesced-tick command back onto
//! the UI-thread command queue — spec §5's "single re-armable timer slot
//! on the owning thread," spec §9 Design Note on coalescing timers).
//! `MonitorRegistry` only tracks which generation is current so a timer
//! that fires for a notification superseded by a newer one is a no-op.

use halo_core::{Error, MonitorRecord, MonitorTable, Result};

type Subscriber = Box<dyn Fn(MonitorTable) + Send>;

pub struct MonitorRegistry {
    snapshot: Option<MonitorTable>,
    coalesce_ms: u64,
    generation: u64,
    pending: Option<MonitorTable>,
    subscribers: Vec<Subscriber>,
}

impl MonitorRegistry {
    pub fn new(coalesce_ms: u64) -> Self {
        Self {
            snapshot: None,
            coalesce_ms,
            generation: 0,
            pending: None,
            subscribers: Vec::new(),
        }
    }

    pub fn coalesce_ms(&self) -> u64 {
        self.coalesce_ms
    }

    /// `list()` per spec §4.2: `NoDisplays` if no snapshot has arrived yet.
    pub fn list(&self) -> Result<&[MonitorRecord]> {
        self.snapshot
            .as_ref()
            .map(MonitorTable::list)
            .ok_or(Error::NoDisplays)
    }

    pub fn subscribe(&mut self, sink: Subscriber) {
        self.subscribers.push(sink);
    }

    /// Record a raw native notification. Returns the generation the
    /// caller should arm a `coalesce_ms`-delayed timer for.
    pub fn record_notification(&mut self, snapshot: MonitorTable) -> u64 {
        self.pending = Some(snapshot);
        self.generation += 1;
        self.generation
    }

    /// Apply a pending notification if `generation` is still the latest
    /// (i.e. no newer notification arrived and superseded it during the
    /// coalescing window). Notifies subscribers with a defensive clone of
    /// the new snapshot and returns it; `None` if this tick was stale.
    pub fn apply_if_current(&mut self, generation: u64) -> Option<MonitorTable> {
        if generation != self.generation {
            return None;
        }
        let snapshot = self.pending.take()?;
        self.snapshot = Some(snapshot.clone());
        for sink in &self.subscribers {
            sink(snapshot.clone());
        }
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn table(name: &str) -> MonitorTable {
        MonitorTable::new(vec![MonitorRecord::new(name, 0.0, 0.0, 1440.0, 900.0)])
    }

    #[test]
    fn list_before_first_snapshot_is_no_displays() {
        let registry = MonitorRegistry::new(150);
        assert!(matches!(registry.list(), Err(Error::NoDisplays)));
    }

    #[test]
    fn single_notification_applies_and_notifies_subscribers() {
        let mut registry = MonitorRegistry::new(150);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        registry.subscribe(Box::new(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let generation = registry.record_notification(table("primary"));
        let applied = registry.apply_if_current(generation).unwrap();
        assert_eq!(applied.list()[0].name, "primary");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stale_tick_after_newer_notification_is_a_no_op() {
        let mut registry = MonitorRegistry::new(150);
        let first_generation = registry.record_notification(table("first"));
        let second_generation = registry.record_notification(table("second"));
        assert_ne!(first_generation, second_generation);

        // The first timer fires after being superseded: no-op.
        assert!(registry.apply_if_current(first_generation).is_none());

        // The second (current) timer fires: applies "second", not "first".
        let applied = registry.apply_if_current(second_generation).unwrap();
        assert_eq!(applied.list()[0].name, "second");
    }
}
