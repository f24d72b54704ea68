//! Ordered map backend keyed by `EventKey`.

use std::collections::BTreeMap;

use super::Scheduler;
use crate::event::{EventKey, ScheduledEvent};

#[derive(Debug, Default)]
pub struct MapScheduler {
    events: BTreeMap<EventKey, ScheduledEvent>,
}

impl MapScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for MapScheduler {
    fn insert(&mut self, event: ScheduledEvent) {
        let key = event.key();
        let previous = self.events.insert(key, event);
        assert!(previous.is_none(), "duplicate event key {key:?}");
    }

    fn peek_next(&self) -> Option<&ScheduledEvent> {
        self.events.first_key_value().map(|(_, event)| event)
    }

    fn pop_next(&mut self) -> ScheduledEvent {
        match self.events.pop_first() {
            Some((_, event)) => event,
            None => panic!("pop_next called on an empty event queue"),
        }
    }

    fn remove(&mut self, key: EventKey) -> Option<ScheduledEvent> {
        self.events.remove(&key)
    }

    fn len(&self) -> usize {
        self.events.len()
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&ScheduledEvent) -> bool) {
        self.events.retain(|_, event| keep(event));
    }

    fn drain(&mut self) -> Vec<ScheduledEvent> {
        std::mem::take(&mut self.events).into_values().collect()
    }
}
