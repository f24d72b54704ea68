//! Event queue backends.
//!
//! Every backend stores [`ScheduledEvent`]s ordered by [`EventKey`] and
//! implements the same [`Scheduler`] interface, so the choice of backend
//! affects performance only, never dispatch order.
//!
//! | Backend | insert | pop_next | remove |
//! |---|---|---|---|
//! | [`HeapScheduler`] (default) | O(log n) | O(log n) | O(log n) |
//! | [`ListScheduler`] | O(n) | O(1) | O(n) |
//! | [`MapScheduler`] | O(log n) | O(log n) | O(log n) |
//!
//! The simulator holds an [`EventQueue`], a closed enum over the three, so
//! backend dispatch is a match rather than a virtual call.

mod heap;
mod list;
mod map;

use std::fmt;
use std::str::FromStr;

pub use heap::HeapScheduler;
pub use list::ListScheduler;
pub use map::MapScheduler;

use crate::SimError;
use crate::event::{EventKey, ScheduledEvent};

/// Time-ordered storage for pending events.
pub trait Scheduler {
    /// Adds an event. Keys are unique per simulator.
    fn insert(&mut self, event: ScheduledEvent);

    /// Returns the earliest event without removing it.
    fn peek_next(&self) -> Option<&ScheduledEvent>;

    /// Removes and returns the earliest event.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty; callers check `is_empty` first.
    fn pop_next(&mut self) -> ScheduledEvent;

    /// Removes the event with `key`, wherever it sits in the queue.
    fn remove(&mut self, key: EventKey) -> Option<ScheduledEvent>;

    /// Number of queued entries, cancelled tombstones included.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keeps only the entries for which `keep` returns true.
    fn retain(&mut self, keep: &mut dyn FnMut(&ScheduledEvent) -> bool);

    /// Removes every entry, returned in dispatch order.
    fn drain(&mut self) -> Vec<ScheduledEvent>;
}

/// Selects an event queue backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchedulerKind {
    #[default]
    Heap,
    List,
    Map,
}

impl SchedulerKind {
    pub const ALL: [SchedulerKind; 3] = [SchedulerKind::Heap, SchedulerKind::List, SchedulerKind::Map];

    pub const fn name(self) -> &'static str {
        match self {
            SchedulerKind::Heap => "heap",
            SchedulerKind::List => "list",
            SchedulerKind::Map => "map",
        }
    }
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchedulerKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heap" => Ok(SchedulerKind::Heap),
            "list" => Ok(SchedulerKind::List),
            "map" => Ok(SchedulerKind::Map),
            _ => Err(SimError::InvalidScheduler(s.to_string())),
        }
    }
}

/// The simulator's event queue: one of the backends above.
#[derive(Debug)]
pub enum EventQueue {
    Heap(HeapScheduler),
    List(ListScheduler),
    Map(MapScheduler),
}

impl EventQueue {
    pub fn new(kind: SchedulerKind) -> Self {
        match kind {
            SchedulerKind::Heap => EventQueue::Heap(HeapScheduler::new()),
            SchedulerKind::List => EventQueue::List(ListScheduler::new()),
            SchedulerKind::Map => EventQueue::Map(MapScheduler::new()),
        }
    }

    pub fn kind(&self) -> SchedulerKind {
        match self {
            EventQueue::Heap(_) => SchedulerKind::Heap,
            EventQueue::List(_) => SchedulerKind::List,
            EventQueue::Map(_) => SchedulerKind::Map,
        }
    }

    fn backend(&self) -> &dyn Scheduler {
        match self {
            EventQueue::Heap(q) => q,
            EventQueue::List(q) => q,
            EventQueue::Map(q) => q,
        }
    }

    fn backend_mut(&mut self) -> &mut dyn Scheduler {
        match self {
            EventQueue::Heap(q) => q,
            EventQueue::List(q) => q,
            EventQueue::Map(q) => q,
        }
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(SchedulerKind::default())
    }
}

// Hot-path operations match directly; the rest go through `dyn Scheduler`.
impl Scheduler for EventQueue {
    fn insert(&mut self, event: ScheduledEvent) {
        match self {
            EventQueue::Heap(q) => q.insert(event),
            EventQueue::List(q) => q.insert(event),
            EventQueue::Map(q) => q.insert(event),
        }
    }

    fn peek_next(&self) -> Option<&ScheduledEvent> {
        match self {
            EventQueue::Heap(q) => q.peek_next(),
            EventQueue::List(q) => q.peek_next(),
            EventQueue::Map(q) => q.peek_next(),
        }
    }

    fn pop_next(&mut self) -> ScheduledEvent {
        match self {
            EventQueue::Heap(q) => q.pop_next(),
            EventQueue::List(q) => q.pop_next(),
            EventQueue::Map(q) => q.pop_next(),
        }
    }

    fn remove(&mut self, key: EventKey) -> Option<ScheduledEvent> {
        self.backend_mut().remove(key)
    }

    fn len(&self) -> usize {
        self.backend().len()
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&ScheduledEvent) -> bool) {
        self.backend_mut().retain(keep);
    }

    fn drain(&mut self) -> Vec<ScheduledEvent> {
        self.backend_mut().drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::detached_event;
    use test_case::test_case;

    fn queue_with(kind: SchedulerKind, entries: &[(i64, u64)]) -> EventQueue {
        let mut queue = EventQueue::new(kind);
        for &(ts, uid) in entries {
            queue.insert(detached_event(ts, uid));
        }
        queue
    }

    fn pop_all(queue: &mut EventQueue) -> Vec<(i64, u64)> {
        let mut out = Vec::new();
        while !queue.is_empty() {
            let event = queue.pop_next();
            out.push((event.ts().ticks(), event.uid()));
        }
        out
    }

    #[test_case(SchedulerKind::Heap)]
    #[test_case(SchedulerKind::List)]
    #[test_case(SchedulerKind::Map)]
    fn pops_in_time_then_uid_order(kind: SchedulerKind) {
        let mut queue = queue_with(kind, &[(5, 0), (5, 1), (5, 2), (3, 3), (10, 4), (3, 5)]);

        assert_eq!(queue.len(), 6);
        assert_eq!(queue.peek_next().map(ScheduledEvent::uid), Some(3));
        assert_eq!(
            pop_all(&mut queue),
            vec![(3, 3), (3, 5), (5, 0), (5, 1), (5, 2), (10, 4)]
        );
    }

    #[test_case(SchedulerKind::Heap)]
    #[test_case(SchedulerKind::List)]
    #[test_case(SchedulerKind::Map)]
    fn removes_arbitrary_entries(kind: SchedulerKind) {
        let mut queue = queue_with(kind, &[(4, 0), (1, 1), (9, 2), (4, 3), (2, 4), (7, 5)]);

        let key = |ts, uid| EventKey {
            ts: chronon_time::VirtualTime::from_ticks(ts),
            uid,
        };
        assert_eq!(queue.remove(key(4, 0)).map(|e| e.uid()), Some(0));
        assert_eq!(queue.remove(key(1, 1)).map(|e| e.uid()), Some(1));
        assert!(queue.remove(key(4, 0)).is_none());
        assert!(queue.remove(key(8, 5)).is_none());

        assert_eq!(pop_all(&mut queue), vec![(2, 4), (4, 3), (7, 5), (9, 2)]);
    }

    #[test_case(SchedulerKind::Heap)]
    #[test_case(SchedulerKind::List)]
    #[test_case(SchedulerKind::Map)]
    fn retain_and_drain_preserve_order(kind: SchedulerKind) {
        let entries: Vec<(i64, u64)> = (0..20).map(|i| ((i * 7) % 11, i as u64)).collect();
        let mut queue = queue_with(kind, &entries);

        queue.retain(&mut |event| event.uid() % 3 != 0);
        assert_eq!(queue.len(), 13);

        let drained: Vec<(i64, u64)> = queue
            .drain()
            .iter()
            .map(|e| (e.ts().ticks(), e.uid()))
            .collect();
        let mut expected: Vec<(i64, u64)> =
            entries.into_iter().filter(|(_, uid)| uid % 3 != 0).collect();
        expected.sort_unstable();

        assert_eq!(drained, expected);
        assert!(queue.is_empty());
    }

    #[test_case(SchedulerKind::Heap)]
    #[test_case(SchedulerKind::List)]
    #[test_case(SchedulerKind::Map)]
    #[should_panic(expected = "empty event queue")]
    fn pop_on_empty_queue_panics(kind: SchedulerKind) {
        let mut queue = EventQueue::new(kind);
        let _ = queue.pop_next();
    }

    #[test]
    fn scheduler_kind_parses_known_names() {
        assert_eq!("heap".parse::<SchedulerKind>().unwrap(), SchedulerKind::Heap);
        assert_eq!(" List ".parse::<SchedulerKind>().unwrap(), SchedulerKind::List);
        assert_eq!("map".parse::<SchedulerKind>().unwrap(), SchedulerKind::Map);
        assert!(matches!(
            "calendar".parse::<SchedulerKind>(),
            Err(SimError::InvalidScheduler(name)) if name == "calendar"
        ));
    }

    #[test]
    fn queue_reports_its_kind() {
        for kind in SchedulerKind::ALL {
            assert_eq!(EventQueue::new(kind).kind(), kind);
        }
        assert_eq!(EventQueue::default().kind(), SchedulerKind::Heap);
    }
}
