//! Indexed binary min-heap.
//!
//! A plain binary heap cannot remove an arbitrary element without a linear
//! scan. This one keeps a `uid -> slot` index that is updated on every swap,
//! so `remove` finds its entry in O(1) and restores the heap in O(log n).

use std::collections::HashMap;

use super::Scheduler;
use crate::event::{EventKey, ScheduledEvent};

#[derive(Debug, Default)]
pub struct HeapScheduler {
    heap: Vec<ScheduledEvent>,
    /// Position of each event in `heap`, by uid.
    slots: HashMap<u64, usize>,
}

impl HeapScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            slots: HashMap::with_capacity(capacity),
        }
    }

    fn less(&self, a: usize, b: usize) -> bool {
        self.heap[a].key() < self.heap[b].key()
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.slots.insert(self.heap[a].uid(), a);
        self.slots.insert(self.heap[b].uid(), b);
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.less(index, parent) {
                break;
            }
            self.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.less(right, left) {
                right
            } else {
                left
            };
            if !self.less(child, index) {
                break;
            }
            self.swap(index, child);
            index = child;
        }
    }

    /// Removes the entry at `index`, refilling the hole with the last entry.
    fn take(&mut self, index: usize) -> ScheduledEvent {
        let last = self.heap.len() - 1;
        if index != last {
            self.swap(index, last);
        }
        let Some(event) = self.heap.pop() else {
            unreachable!("take called with a valid index on an empty heap");
        };
        self.slots.remove(&event.uid());
        if index < self.heap.len() {
            self.sift_down(index);
            self.sift_up(index);
        }
        event
    }

    fn rebuild(&mut self) {
        self.slots.clear();
        for (index, event) in self.heap.iter().enumerate() {
            self.slots.insert(event.uid(), index);
        }
        for index in (0..self.heap.len() / 2).rev() {
            self.sift_down(index);
        }
    }
}

impl Scheduler for HeapScheduler {
    fn insert(&mut self, event: ScheduledEvent) {
        let index = self.heap.len();
        let previous = self.slots.insert(event.uid(), index);
        assert!(previous.is_none(), "duplicate event uid {}", event.uid());
        self.heap.push(event);
        self.sift_up(index);
    }

    fn peek_next(&self) -> Option<&ScheduledEvent> {
        self.heap.first()
    }

    fn pop_next(&mut self) -> ScheduledEvent {
        assert!(!self.heap.is_empty(), "pop_next called on an empty event queue");
        self.take(0)
    }

    fn remove(&mut self, key: EventKey) -> Option<ScheduledEvent> {
        let index = *self.slots.get(&key.uid)?;
        if self.heap[index].key() != key {
            return None;
        }
        Some(self.take(index))
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&ScheduledEvent) -> bool) {
        self.heap.retain(|event| keep(event));
        self.rebuild();
    }

    fn drain(&mut self) -> Vec<ScheduledEvent> {
        self.slots.clear();
        let mut events = std::mem::take(&mut self.heap);
        events.sort_unstable_by_key(ScheduledEvent::key);
        events
    }
}
