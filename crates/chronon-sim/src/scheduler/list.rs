//! Sorted deque backend.
//!
//! Insertion scans from the back, so workloads that mostly schedule into the
//! future (the common case) touch only a few entries. Popping is O(1).

use std::collections::VecDeque;

use super::Scheduler;
use crate::event::{EventKey, ScheduledEvent};

#[derive(Debug, Default)]
pub struct ListScheduler {
    events: VecDeque<ScheduledEvent>,
}

impl ListScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: EventKey) -> Option<usize> {
        self.events
            .binary_search_by_key(&key, ScheduledEvent::key)
            .ok()
    }
}

impl Scheduler for ListScheduler {
    fn insert(&mut self, event: ScheduledEvent) {
        let key = event.key();
        let index = self
            .events
            .iter()
            .rposition(|queued| queued.key() < key)
            .map_or(0, |index| index + 1);
        self.events.insert(index, event);
    }

    fn peek_next(&self) -> Option<&ScheduledEvent> {
        self.events.front()
    }

    fn pop_next(&mut self) -> ScheduledEvent {
        match self.events.pop_front() {
            Some(event) => event,
            None => panic!("pop_next called on an empty event queue"),
        }
    }

    fn remove(&mut self, key: EventKey) -> Option<ScheduledEvent> {
        let index = self.position(key)?;
        self.events.remove(index)
    }

    fn len(&self) -> usize {
        self.events.len()
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&ScheduledEvent) -> bool) {
        self.events.retain(|event| keep(event));
    }

    fn drain(&mut self) -> Vec<ScheduledEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::detached_event;

    #[test]
    fn out_of_order_inserts_land_in_sorted_position() {
        let mut list = ListScheduler::new();
        for (ts, uid) in [(10, 0), (30, 1), (20, 2), (5, 3), (30, 4)] {
            list.insert(detached_event(ts, uid));
        }

        let order: Vec<u64> = list.events.iter().map(ScheduledEvent::uid).collect();
        assert_eq!(order, vec![3, 0, 2, 1, 4]);
    }
}
