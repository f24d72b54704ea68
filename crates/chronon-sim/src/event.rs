//! Scheduled events and the shared records that back event handles.
//!
//! ```text
//!            ┌──────────────────────────┐
//!            │ ScheduledEvent (queue)   │
//!            │   callback: Box<FnOnce>  │──┐
//!            └──────────────────────────┘  │ Rc
//!                                          ▼
//!   EventHandle ──Rc──▶ EventRecord { key, context, state: Cell<EventState> }
//!   EventHandle ──Rc──┘
//! ```
//!
//! The queue owns the callback. Handles only share the record, so a handle
//! can be queried or cancelled long after the event has run or the
//! simulator has been dropped.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use chronon_time::VirtualTime;

use crate::{EventHandle, Simulator};

/// Boxed event body. It receives the simulator so it can schedule more work.
pub type Callback = Box<dyn FnOnce(&mut Simulator)>;

/// Total order of events: timestamp first, then insertion sequence.
///
/// `uid` grows monotonically per simulator, which makes events sharing a
/// timestamp dispatch in FIFO order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventKey {
    pub ts: VirtualTime,
    pub uid: u64,
}

/// Lifecycle of a scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    /// Queued and still going to run.
    Pending,
    /// The callback is executing right now.
    Running,
    /// Cancelled or removed before it ran.
    Cancelled,
    /// Ran to completion, or was discarded by `destroy`.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventKind {
    Regular,
    /// Runs once at simulator teardown.
    Destroy,
}

#[derive(Debug)]
pub(crate) struct EventRecord {
    key: EventKey,
    context: u32,
    kind: EventKind,
    /// Id of the simulator that issued the event.
    owner: u64,
    state: Cell<EventState>,
    /// Count of cancelled-but-queued events in the owning simulator.
    tombstones: Rc<Cell<usize>>,
}

impl EventRecord {
    pub(crate) fn new(
        key: EventKey,
        context: u32,
        kind: EventKind,
        owner: u64,
        tombstones: Rc<Cell<usize>>,
    ) -> Self {
        Self {
            key,
            context,
            kind,
            owner,
            state: Cell::new(EventState::Pending),
            tombstones,
        }
    }

    pub(crate) fn key(&self) -> EventKey {
        self.key
    }

    pub(crate) fn context(&self) -> u32 {
        self.context
    }

    pub(crate) fn kind(&self) -> EventKind {
        self.kind
    }

    pub(crate) fn owner(&self) -> u64 {
        self.owner
    }

    pub(crate) fn state(&self) -> EventState {
        self.state.get()
    }

    pub(crate) fn set_state(&self, state: EventState) {
        self.state.set(state);
    }

    /// Lazy cancellation: flags the record and leaves the entry queued.
    ///
    /// Returns false if the event was not pending.
    pub(crate) fn cancel(&self) -> bool {
        if self.state.get() != EventState::Pending {
            return false;
        }
        self.state.set(EventState::Cancelled);
        if self.kind == EventKind::Regular {
            self.tombstones.set(self.tombstones.get() + 1);
        }
        true
    }
}

/// A queue entry: the event's record plus its callback.
pub struct ScheduledEvent {
    record: Rc<EventRecord>,
    callback: Callback,
}

impl ScheduledEvent {
    pub(crate) fn new(record: Rc<EventRecord>, callback: Callback) -> Self {
        Self { record, callback }
    }

    pub fn key(&self) -> EventKey {
        self.record.key
    }

    pub fn ts(&self) -> VirtualTime {
        self.record.key.ts
    }

    pub fn uid(&self) -> u64 {
        self.record.key.uid
    }

    pub fn is_cancelled(&self) -> bool {
        self.record.state() == EventState::Cancelled
    }

    /// Returns a new handle to this event.
    pub fn handle(&self) -> EventHandle {
        EventHandle::new(Rc::clone(&self.record))
    }

    pub(crate) fn into_parts(self) -> (Rc<EventRecord>, Callback) {
        (self.record, self.callback)
    }
}

impl fmt::Debug for ScheduledEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledEvent")
            .field("key", &self.record.key)
            .field("context", &self.record.context)
            .field("state", &self.record.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) fn detached_event(ts: i64, uid: u64) -> ScheduledEvent {
    let key = EventKey {
        ts: VirtualTime::from_ticks(ts),
        uid,
    };
    let record = EventRecord::new(key, 0, EventKind::Regular, u64::MAX, Rc::default());
    ScheduledEvent::new(Rc::new(record), Box::new(|_| {}))
}
