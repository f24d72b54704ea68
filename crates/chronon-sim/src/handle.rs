//! Caller-side references to scheduled events.

use std::fmt;
use std::rc::Rc;

use chronon_time::VirtualTime;

use crate::event::{EventKey, EventRecord, EventState};

/// A cheap, clonable reference to a scheduled event.
///
/// A handle never owns the event's callback and stays valid after the event
/// has run, been cancelled, or outlived its simulator: it then simply reports
/// itself as expired. The default handle is null and always expired.
///
/// Two handles are equal when they refer to the same event.
#[derive(Clone, Default)]
pub struct EventHandle(Option<Rc<EventRecord>>);

impl EventHandle {
    /// A handle that refers to no event.
    pub const fn null() -> Self {
        Self(None)
    }

    pub(crate) fn new(record: Rc<EventRecord>) -> Self {
        Self(Some(record))
    }

    pub(crate) fn record(&self) -> Option<&Rc<EventRecord>> {
        self.0.as_ref()
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// True unless the event is still waiting to run.
    ///
    /// An event is expired while its own callback executes, after it ran,
    /// after it was cancelled or removed, and after the simulator discarded
    /// it. Null handles are expired.
    pub fn is_expired(&self) -> bool {
        self.0
            .as_ref()
            .is_none_or(|record| record.state() != EventState::Pending)
    }

    pub fn is_pending(&self) -> bool {
        !self.is_expired()
    }

    /// True if the event was cancelled or removed before it ran.
    pub fn is_cancelled(&self) -> bool {
        self.state() == Some(EventState::Cancelled)
    }

    pub fn state(&self) -> Option<EventState> {
        self.0.as_ref().map(|record| record.state())
    }

    pub fn key(&self) -> Option<EventKey> {
        self.0.as_ref().map(|record| record.key())
    }

    /// Virtual time at which the event is (or was) due.
    pub fn timestamp(&self) -> Option<VirtualTime> {
        self.key().map(|key| key.ts)
    }

    pub fn uid(&self) -> Option<u64> {
        self.key().map(|key| key.uid)
    }

    pub fn context(&self) -> Option<u32> {
        self.0.as_ref().map(|record| record.context())
    }

    /// Cancels the event without touching the queue.
    ///
    /// Same effect as [`Simulator::cancel`](crate::Simulator::cancel). The
    /// entry stays queued as a tombstone and is skipped when popped. No-op if
    /// the event is not pending.
    pub fn cancel(&self) {
        if let Some(record) = &self.0 {
            record.cancel();
        }
    }
}

impl PartialEq for EventHandle {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for EventHandle {}

impl fmt::Debug for EventHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(record) => f
                .debug_struct("EventHandle")
                .field("ts", &record.key().ts)
                .field("uid", &record.key().uid)
                .field("state", &record.state())
                .finish(),
            None => f.write_str("EventHandle(null)"),
        }
    }
}
