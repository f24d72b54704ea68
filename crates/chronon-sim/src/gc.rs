//! Bulk tracking of event handles with amortized cleanup.
//!
//! Models that schedule many short-lived timers (retransmissions, keep-alives)
//! hand every handle to an [`EventGarbageCollector`] and forget about it.
//! When the collector is dropped, every event it still tracks is cancelled.
//!
//! Cleanup is amortized: it only runs when the tracked count reaches a
//! threshold, and the threshold adapts to the workload:
//!
//! ```text
//!   grow:    threshold < max_chunk ? threshold * 2 : threshold + max_chunk
//!   shrink:  threshold < max_chunk ? threshold / 2 : threshold - max_chunk
//! ```

use std::collections::BTreeMap;

use tracing::trace;

use crate::EventHandle;
use crate::event::EventKey;

pub const CHUNK_INIT_SIZE: usize = 8;
pub const CHUNK_MAX_SIZE: usize = 128;

/// Owns a set of event handles and cancels the pending ones on drop.
#[derive(Debug)]
pub struct EventGarbageCollector {
    /// Ordered by schedule time, so the soonest-to-expire come first.
    /// The owner id keeps handles from different simulators apart.
    events: BTreeMap<(EventKey, u64), EventHandle>,
    next_cleanup: usize,
    initial_chunk: usize,
    max_chunk: usize,
}

impl EventGarbageCollector {
    pub fn new() -> Self {
        Self::with_chunks(CHUNK_INIT_SIZE, CHUNK_MAX_SIZE)
    }

    /// # Panics
    ///
    /// Panics unless `0 < initial_chunk <= max_chunk`.
    pub fn with_chunks(initial_chunk: usize, max_chunk: usize) -> Self {
        assert!(
            initial_chunk > 0 && initial_chunk <= max_chunk,
            "invalid garbage collector chunks: initial {initial_chunk}, max {max_chunk}"
        );
        Self {
            events: BTreeMap::new(),
            next_cleanup: initial_chunk,
            initial_chunk,
            max_chunk,
        }
    }

    /// Takes ownership of `handle`. Null and already expired handles are
    /// ignored.
    pub fn track(&mut self, handle: EventHandle) {
        let Some(record) = handle.record() else {
            return;
        };
        if handle.is_expired() {
            return;
        }
        let slot = (record.key(), record.owner());
        self.events.insert(slot, handle);
        if self.events.len() >= self.next_cleanup {
            self.cleanup();
        }
    }

    /// Drops expired handles from the front of the schedule and retunes the
    /// cleanup threshold.
    ///
    /// Scanning stops at the first pending event; expired handles behind it
    /// are collected by a later pass.
    pub fn cleanup(&mut self) {
        let before = self.events.len();
        while let Some(entry) = self.events.first_entry() {
            if !entry.get().is_expired() {
                break;
            }
            entry.remove();
        }

        if self.events.len() >= self.next_cleanup {
            self.grow();
        } else {
            while self.next_cleanup > self.events.len() && self.next_cleanup > self.initial_chunk {
                self.shrink();
            }
            self.grow();
        }
        trace!(
            removed = before - self.events.len(),
            tracked = self.events.len(),
            threshold = self.next_cleanup,
            "event garbage collector cleanup"
        );
    }

    fn grow(&mut self) {
        if self.next_cleanup < self.max_chunk {
            self.next_cleanup *= 2;
        } else {
            self.next_cleanup += self.max_chunk;
        }
    }

    fn shrink(&mut self) {
        if self.next_cleanup < self.max_chunk {
            self.next_cleanup /= 2;
        } else {
            self.next_cleanup -= self.max_chunk;
        }
        self.next_cleanup = self.next_cleanup.max(self.initial_chunk);
    }

    /// Number of handles currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Tracked count at which the next cleanup runs.
    pub fn threshold(&self) -> usize {
        self.next_cleanup
    }
}

impl Default for EventGarbageCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EventGarbageCollector {
    fn drop(&mut self) {
        for handle in self.events.values() {
            handle.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Simulator;
    use chronon_time::VirtualTime;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn ticks(n: i64) -> VirtualTime {
        VirtualTime::from_ticks(n)
    }

    #[test]
    fn ignores_null_and_expired_handles() {
        let mut sim = Simulator::new();
        let mut gc = EventGarbageCollector::new();

        let cancelled = sim.schedule(ticks(5), |_| {});
        sim.cancel(&cancelled);
        gc.track(cancelled);
        gc.track(EventHandle::null());

        assert!(gc.is_empty());
    }

    #[test]
    fn drop_cancels_pending_events() {
        let mut sim = Simulator::new();
        let fired = Rc::new(Cell::new(0));

        {
            let mut gc = EventGarbageCollector::new();
            for i in 0..20 {
                let fired = Rc::clone(&fired);
                gc.track(sim.schedule(ticks(i), move |_| fired.set(fired.get() + 1)));
            }
        }
        let survivor_count = Rc::clone(&fired);
        sim.schedule(ticks(100), move |_| survivor_count.set(survivor_count.get() + 100));
        sim.run();

        assert_eq!(fired.get(), 100);
    }

    #[test]
    fn cleanup_stops_at_first_pending_event() {
        let mut sim = Simulator::new();
        let mut gc = EventGarbageCollector::new();

        let handles: Vec<EventHandle> = (0..7).map(|i| sim.schedule(ticks(i), |_| {})).collect();
        for handle in &handles {
            gc.track(handle.clone());
        }
        // Expire everything except the event at t=2.
        for (i, handle) in handles.iter().enumerate() {
            if i != 2 {
                handle.cancel();
            }
        }
        gc.cleanup();

        // t=0 and t=1 are gone; t=2 blocks the scan.
        assert_eq!(gc.len(), 5);
    }

    #[test]
    fn threshold_grows_while_everything_stays_pending() {
        let mut sim = Simulator::new();
        let mut gc = EventGarbageCollector::new();

        for i in 0..8 {
            gc.track(sim.schedule(ticks(i), |_| {}));
        }
        assert_eq!(gc.threshold(), 16);

        for i in 8..16 {
            gc.track(sim.schedule(ticks(i), |_| {}));
        }
        assert_eq!(gc.threshold(), 32);
        assert_eq!(gc.len(), 16);
    }

    #[test]
    fn threshold_steps_by_max_chunk_past_the_cap() {
        let mut sim = Simulator::new();
        let mut gc = EventGarbageCollector::with_chunks(2, 4);

        // 2 -> 4 -> 8 -> 12: doubles below the cap, then adds the cap.
        for i in 0..8 {
            gc.track(sim.schedule(ticks(i), |_| {}));
        }
        assert_eq!(gc.threshold(), 12);
    }

    #[test]
    fn threshold_shrinks_back_after_mass_expiry() {
        let mut sim = Simulator::new();
        let mut gc = EventGarbageCollector::new();

        let handles: Vec<EventHandle> = (0..64).map(|i| sim.schedule(ticks(i), |_| {})).collect();
        for handle in &handles {
            gc.track(handle.clone());
        }
        assert!(gc.threshold() > 64);

        for handle in &handles {
            handle.cancel();
        }
        gc.cleanup();

        assert!(gc.is_empty());
        assert_eq!(gc.threshold(), 2 * CHUNK_INIT_SIZE);
    }

    #[test]
    #[should_panic(expected = "invalid garbage collector chunks")]
    fn rejects_zero_initial_chunk() {
        let _ = EventGarbageCollector::with_chunks(0, 8);
    }

    proptest! {
        /// With at most `window` events pending at a time, the collector never
        /// holds more than a small multiple of the window plus one chunk.
        #[test]
        fn tracked_count_stays_bounded(
            total in 100usize..2_000,
            window in 1usize..16,
        ) {
            let mut sim = Simulator::new();
            let mut gc = EventGarbageCollector::new();
            let mut live: std::collections::VecDeque<EventHandle> = Default::default();
            let mut peak = 0;

            for i in 0..total {
                let handle = sim.schedule(ticks(i as i64), |_| {});
                gc.track(handle.clone());
                live.push_back(handle);
                if live.len() > window {
                    if let Some(oldest) = live.pop_front() {
                        oldest.cancel();
                    }
                }
                peak = peak.max(gc.len());
            }

            prop_assert!(peak <= 2 * (window + CHUNK_MAX_SIZE));
        }
    }
}
