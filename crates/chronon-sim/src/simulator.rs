//! The discrete-event simulation engine.
//!
//! ```text
//!                  run()                 stop() / stop event
//!   NotStarted ───────────▶ Running ─────────────────────────▶ Stopping
//!                            ▲   │ queue drained                  │
//!                     run()  │   ▼                                │
//!                           Stopped ◀─────────────────────────────┘
//!
//!   any state (outside a callback) ── destroy() ──▶ Destroyed
//! ```
//!
//! The engine owns its event queue and passes itself to every callback as
//! `&mut Simulator`. The event being dispatched has already been popped, so
//! a callback may schedule, cancel, remove or stop freely; new events land
//! in the queue and run in a later iteration.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use chronon_time::{Resolution, VirtualTime};
use tracing::{debug, trace};

use crate::event::{Callback, EventKey, EventKind, EventRecord, EventState, ScheduledEvent};
use crate::realtime::{Pacer, PacingStats, RealtimeConfig};
use crate::scheduler::{EventQueue, Scheduler, SchedulerKind};
use crate::{EventHandle, SimError};

/// Context value outside of any event, and the default for new events
/// scheduled from outside the run loop.
pub const NO_CONTEXT: u32 = u32::MAX;

/// Cancelled entries are compacted out of the queue once there are at least
/// this many and they make up more than half of it.
const COMPACTION_MIN_TOMBSTONES: usize = 64;

static NEXT_SIMULATOR_ID: AtomicU64 = AtomicU64::new(0);

/// Lifecycle of a [`Simulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    NotStarted,
    Running,
    /// A stop was requested; the current callback is finishing.
    Stopping,
    /// The run loop returned. `run` may be called again.
    Stopped,
    Destroyed,
}

// ============================================================================
// Builder
// ============================================================================

/// Configures a [`Simulator`] before construction.
#[derive(Debug, Default)]
pub struct SimulatorBuilder {
    scheduler: SchedulerKind,
    pacer: Option<Pacer>,
}

impl SimulatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduler(mut self, kind: SchedulerKind) -> Self {
        self.scheduler = kind;
        self
    }

    /// Paces the run against the real wall clock.
    pub fn realtime(mut self, config: RealtimeConfig) -> Self {
        self.pacer = Some(Pacer::wall_clock(config));
        self
    }

    /// Paces the run with a caller-supplied pacer.
    pub fn pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = Some(pacer);
        self
    }

    pub fn build(self) -> Simulator {
        let mut sim = Simulator::with_scheduler(self.scheduler);
        sim.pacer = self.pacer;
        sim
    }
}

// ============================================================================
// Simulator
// ============================================================================

/// A single-threaded discrete-event simulator.
///
/// Events are dispatched in `(timestamp, insertion order)` order. Virtual
/// time only moves forward, jumping straight to the next event.
///
/// # Example
///
/// ```
/// use chronon_sim::Simulator;
/// use chronon_time::VirtualTime;
///
/// let mut sim = Simulator::new();
/// let ms = |n| VirtualTime::from_millis(n).unwrap();
///
/// let retransmit = sim.schedule(ms(200), |_| panic!("acknowledged in time"));
/// sim.schedule(ms(50), move |sim| sim.cancel(&retransmit));
/// sim.run();
///
/// assert_eq!(sim.now(), ms(50));
/// ```
pub struct Simulator {
    id: u64,
    queue: EventQueue,
    now: VirtualTime,
    next_uid: u64,
    context: u32,
    state: SimState,
    stop_requested: bool,
    /// Teardown callbacks, in registration order.
    destroy_events: VecDeque<ScheduledEvent>,
    /// Cancelled events still sitting in `queue`.
    tombstones: Rc<Cell<usize>>,
    dispatched: u64,
    pacer: Option<Pacer>,
}

impl Simulator {
    /// Creates a simulator backed by the default (heap) event queue.
    pub fn new() -> Self {
        Self::with_scheduler(SchedulerKind::default())
    }

    pub fn with_scheduler(kind: SchedulerKind) -> Self {
        Self {
            id: NEXT_SIMULATOR_ID.fetch_add(1, Ordering::Relaxed),
            queue: EventQueue::new(kind),
            now: VirtualTime::ZERO,
            next_uid: 0,
            context: NO_CONTEXT,
            state: SimState::NotStarted,
            stop_requested: false,
            destroy_events: VecDeque::new(),
            tombstones: Rc::new(Cell::new(0)),
            dispatched: 0,
            pacer: None,
        }
    }

    pub fn builder() -> SimulatorBuilder {
        SimulatorBuilder::new()
    }

    // ------------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------------

    /// Schedules `callback` to run `delay` after the current time.
    ///
    /// The new event inherits the context of the running event.
    ///
    /// # Panics
    ///
    /// Panics if `delay` is negative, if `now + delay` overflows, or if the
    /// simulator has been destroyed.
    pub fn schedule<F>(&mut self, delay: VirtualTime, callback: F) -> EventHandle
    where
        F: FnOnce(&mut Simulator) + 'static,
    {
        self.schedule_with_context(self.context, delay, callback)
    }

    /// Schedules `callback` to run `delay` from now with an explicit context.
    pub fn schedule_with_context<F>(
        &mut self,
        context: u32,
        delay: VirtualTime,
        callback: F,
    ) -> EventHandle
    where
        F: FnOnce(&mut Simulator) + 'static,
    {
        assert!(
            !delay.is_strictly_negative(),
            "Simulator::schedule: negative delay {delay}"
        );
        let ts = self.now + delay;
        self.insert_event(ts, context, Box::new(callback))
    }

    /// Schedules `callback` at absolute virtual time `time`.
    ///
    /// # Panics
    ///
    /// Panics if `time` is earlier than [`now`](Self::now).
    pub fn schedule_at<F>(&mut self, time: VirtualTime, callback: F) -> EventHandle
    where
        F: FnOnce(&mut Simulator) + 'static,
    {
        assert!(
            time >= self.now,
            "Simulator::schedule_at: {time} is earlier than the current time {}",
            self.now
        );
        self.insert_event(time, self.context, Box::new(callback))
    }

    /// Schedules `callback` at the current time, after every event already
    /// queued for it (including the one running now).
    pub fn schedule_now<F>(&mut self, callback: F) -> EventHandle
    where
        F: FnOnce(&mut Simulator) + 'static,
    {
        self.schedule(VirtualTime::ZERO, callback)
    }

    /// Registers `callback` to run once during [`destroy`](Self::destroy).
    ///
    /// Destroy callbacks run in registration order and never as part of
    /// `run`.
    pub fn schedule_destroy<F>(&mut self, callback: F) -> EventHandle
    where
        F: FnOnce(&mut Simulator) + 'static,
    {
        self.assert_not_destroyed("schedule_destroy");
        let record = self.new_record(self.now, self.context, EventKind::Destroy);
        let handle = EventHandle::new(Rc::clone(&record));
        trace!(uid = record.key().uid, "registered destroy event");
        self.destroy_events
            .push_back(ScheduledEvent::new(record, Box::new(callback)));
        handle
    }

    /// Schedules relative to the wall clock when realtime pacing is active.
    ///
    /// The target is `max(now, realtime_now) + delay`, so an event scheduled
    /// while the host is behind still lands `delay` after the real present.
    /// Without pacing this is identical to [`schedule`](Self::schedule).
    pub fn schedule_realtime<F>(&mut self, delay: VirtualTime, callback: F) -> EventHandle
    where
        F: FnOnce(&mut Simulator) + 'static,
    {
        assert!(
            !delay.is_strictly_negative(),
            "Simulator::schedule_realtime: negative delay {delay}"
        );
        let base = self.now.max(self.realtime_now());
        self.insert_event(base + delay, self.context, Box::new(callback))
    }

    fn insert_event(&mut self, ts: VirtualTime, context: u32, callback: Callback) -> EventHandle {
        self.assert_not_destroyed("schedule");
        let record = self.new_record(ts, context, EventKind::Regular);
        let handle = EventHandle::new(Rc::clone(&record));
        trace!(ts = %ts, uid = record.key().uid, context, "scheduled event");
        self.queue.insert(ScheduledEvent::new(record, callback));
        handle
    }

    fn new_record(&mut self, ts: VirtualTime, context: u32, kind: EventKind) -> Rc<EventRecord> {
        Resolution::freeze();
        let uid = self.next_uid;
        self.next_uid += 1;
        Rc::new(EventRecord::new(
            EventKey { ts, uid },
            context,
            kind,
            self.id,
            Rc::clone(&self.tombstones),
        ))
    }

    // ------------------------------------------------------------------------
    // Cancellation
    // ------------------------------------------------------------------------

    /// Lazily cancels an event: it stays queued but will never run.
    ///
    /// Null, expired and foreign handles are ignored.
    pub fn cancel(&mut self, handle: &EventHandle) {
        let Some(record) = self.owned_record(handle) else {
            return;
        };
        if record.cancel() {
            trace!(uid = record.key().uid, "cancelled event");
            self.compact_if_needed();
        }
    }

    /// Cancels an event and removes it from the queue immediately.
    ///
    /// Null, expired and foreign handles are ignored.
    pub fn remove(&mut self, handle: &EventHandle) {
        let Some(record) = self.owned_record(handle) else {
            return;
        };
        if record.state() != EventState::Pending {
            return;
        }
        let key = record.key();
        match record.kind() {
            EventKind::Regular => {
                self.queue.remove(key);
            }
            EventKind::Destroy => {
                self.destroy_events.retain(|event| event.key() != key);
            }
        }
        record.set_state(EventState::Cancelled);
        trace!(uid = key.uid, "removed event");
    }

    /// True unless the event is still waiting to run.
    pub fn is_expired(&self, handle: &EventHandle) -> bool {
        handle.is_expired()
    }

    /// Virtual time until the event fires; zero once it has expired.
    pub fn delay_left(&self, handle: &EventHandle) -> VirtualTime {
        match handle.record() {
            Some(record)
                if record.state() == EventState::Pending && record.kind() == EventKind::Regular =>
            {
                record.key().ts.saturating_sub(self.now)
            }
            _ => VirtualTime::ZERO,
        }
    }

    fn owned_record(&self, handle: &EventHandle) -> Option<Rc<EventRecord>> {
        handle
            .record()
            .filter(|record| record.owner() == self.id)
            .cloned()
    }

    fn compact_if_needed(&mut self) {
        let tombstones = self.tombstones.get();
        if tombstones >= COMPACTION_MIN_TOMBSTONES && tombstones * 2 > self.queue.len() {
            let before = self.queue.len();
            self.queue.retain(&mut |event| !event.is_cancelled());
            self.tombstones.set(0);
            trace!(removed = before - self.queue.len(), "compacted cancelled events");
        }
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    /// Dispatches events until the queue drains or a stop is requested.
    ///
    /// May be called again after it returns; virtual time resumes where it
    /// left off.
    ///
    /// # Panics
    ///
    /// Panics when called from inside an event callback or after destroy.
    pub fn run(&mut self) {
        self.assert_not_destroyed("run");
        assert!(
            !matches!(self.state, SimState::Running | SimState::Stopping),
            "Simulator::run called from inside a running event"
        );
        self.state = SimState::Running;
        self.stop_requested = false;
        debug!(
            now = %self.now,
            pending = self.pending_count(),
            scheduler = %self.queue.kind(),
            "simulation run starting"
        );

        if let Some(pacer) = self.pacer.as_mut() {
            pacer.start(self.now);
        }
        while !self.stop_requested && self.step() {}

        self.state = SimState::Stopped;
        self.context = NO_CONTEXT;
        debug!(
            now = %self.now,
            dispatched = self.dispatched,
            pending = self.pending_count(),
            "simulation run stopped"
        );
    }

    /// Pops and dispatches the next live event. False once the queue is empty.
    fn step(&mut self) -> bool {
        self.compact_if_needed();
        loop {
            if self.queue.is_empty() {
                return false;
            }
            let (record, callback) = self.queue.pop_next().into_parts();
            if record.state() == EventState::Cancelled {
                self.tombstones.set(self.tombstones.get().saturating_sub(1));
                continue;
            }

            let key = record.key();
            assert!(
                key.ts >= self.now,
                "event queue order violated: popped event {} at {} while the clock is at {}",
                key.uid,
                key.ts,
                self.now
            );
            if let Some(pacer) = self.pacer.as_mut() {
                pacer.pace(key.ts);
                pacer.event_start();
            }

            self.now = key.ts;
            self.context = record.context();
            self.dispatched += 1;
            record.set_state(EventState::Running);
            trace!(ts = %key.ts, uid = key.uid, context = self.context, "dispatching event");

            callback(self);

            record.set_state(EventState::Expired);
            if let Some(pacer) = self.pacer.as_mut() {
                pacer.event_end();
            }
            return true;
        }
    }

    /// Requests the run loop to return after the current event.
    ///
    /// Ignored when the simulation is not running.
    pub fn stop(&mut self) {
        if self.state == SimState::Running {
            self.state = SimState::Stopping;
            self.stop_requested = true;
            debug!(now = %self.now, "simulation stop requested");
        }
    }

    /// Schedules a stop `delay` from now.
    ///
    /// Events already queued for the stop time run first. The returned
    /// handle can cancel the stop.
    pub fn stop_at(&mut self, delay: VirtualTime) -> EventHandle {
        self.schedule_with_context(NO_CONTEXT, delay, Simulator::stop)
    }

    /// Schedules a stop at absolute time `time`.
    ///
    /// A time in the past stops right after the running event; outside a
    /// run it is treated as a stop at the current time.
    pub fn stop_at_time(&mut self, time: VirtualTime) -> EventHandle {
        if time >= self.now {
            return self.insert_event(time, NO_CONTEXT, Box::new(Simulator::stop));
        }
        if matches!(self.state, SimState::Running | SimState::Stopping) {
            self.stop();
            EventHandle::null()
        } else {
            self.insert_event(self.now, NO_CONTEXT, Box::new(Simulator::stop))
        }
    }

    /// Tears the simulator down.
    ///
    /// Every pending event is discarded unrun (its handle becomes expired),
    /// then destroy callbacks run once each in registration order. Events
    /// scheduled by destroy callbacks are discarded too.
    ///
    /// # Panics
    ///
    /// Panics if called twice or from inside a running event.
    pub fn destroy(&mut self) {
        assert!(
            self.state != SimState::Destroyed,
            "Simulator::destroy called twice"
        );
        assert!(
            !matches!(self.state, SimState::Running | SimState::Stopping),
            "Simulator::destroy called from inside a running event"
        );
        let discarded = self.discard_pending();
        debug!(
            now = %self.now,
            discarded,
            destroy_callbacks = self.destroy_events.len(),
            "destroying simulator"
        );

        while let Some(event) = self.destroy_events.pop_front() {
            let (record, callback) = event.into_parts();
            if record.state() != EventState::Pending {
                continue;
            }
            record.set_state(EventState::Expired);
            callback(self);
        }

        self.discard_pending();
        self.state = SimState::Destroyed;
    }

    fn discard_pending(&mut self) -> usize {
        let events = self.queue.drain();
        let count = events.len();
        for event in events {
            let (record, _callback) = event.into_parts();
            if record.state() == EventState::Pending {
                record.set_state(EventState::Expired);
            }
        }
        self.tombstones.set(0);
        count
    }

    fn assert_not_destroyed(&self, operation: &str) {
        assert!(
            self.state != SimState::Destroyed,
            "Simulator::{operation} called after destroy"
        );
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    /// Swaps the event queue backend, migrating every pending event.
    ///
    /// Cancelled entries are dropped during the move. Fails with
    /// [`SimError::SchedulerLocked`] while the simulation is running.
    pub fn set_scheduler(&mut self, kind: SchedulerKind) -> Result<(), SimError> {
        self.assert_not_destroyed("set_scheduler");
        if matches!(self.state, SimState::Running | SimState::Stopping) {
            return Err(SimError::SchedulerLocked);
        }
        let previous = self.queue.kind();
        let mut queue = EventQueue::new(kind);
        let mut migrated = 0usize;
        for event in self.queue.drain() {
            if !event.is_cancelled() {
                queue.insert(event);
                migrated += 1;
            }
        }
        self.queue = queue;
        self.tombstones.set(0);
        debug!(from = %previous, to = %kind, migrated, "switched event scheduler");
        Ok(())
    }

    /// Installs or removes realtime pacing.
    pub fn set_realtime(&mut self, pacer: Option<Pacer>) -> Result<(), SimError> {
        if matches!(self.state, SimState::Running | SimState::Stopping) {
            return Err(SimError::RealtimeLocked);
        }
        self.pacer = pacer;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Current virtual time.
    pub fn now(&self) -> VirtualTime {
        self.now
    }

    /// The wall clock expressed as virtual time under realtime pacing;
    /// otherwise the same as [`now`](Self::now).
    pub fn realtime_now(&self) -> VirtualTime {
        match &self.pacer {
            Some(pacer) if matches!(self.state, SimState::Running | SimState::Stopping) => {
                pacer.realtime_now()
            }
            _ => self.now,
        }
    }

    /// Context of the running event, or [`NO_CONTEXT`].
    pub fn context(&self) -> u32 {
        self.context
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    /// True when there is nothing left to run or a stop is pending.
    pub fn is_finished(&self) -> bool {
        self.stop_requested || self.pending_count() == 0
    }

    /// Number of callbacks dispatched so far.
    pub fn event_count(&self) -> u64 {
        self.dispatched
    }

    /// Number of queued events that will still run.
    pub fn pending_count(&self) -> usize {
        self.queue.len().saturating_sub(self.tombstones.get())
    }

    pub fn scheduler_kind(&self) -> SchedulerKind {
        self.queue.kind()
    }

    /// Latest representable virtual time.
    pub fn maximum_simulation_time(&self) -> VirtualTime {
        VirtualTime::MAX
    }

    pub fn pacing_stats(&self) -> Option<PacingStats> {
        self.pacer.as_ref().map(Pacer::stats)
    }

    #[cfg(test)]
    pub(crate) fn queued_entries(&self) -> usize {
        self.queue.len()
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("now", &self.now)
            .field("state", &self.state)
            .field("scheduler", &self.queue.kind())
            .field("pending", &self.pending_count())
            .field("dispatched", &self.dispatched)
            .finish_non_exhaustive()
    }
}

/// Dropping without `destroy` discards pending events silently; destroy
/// callbacks do not run.
impl Drop for Simulator {
    fn drop(&mut self) {
        if self.state == SimState::Destroyed {
            return;
        }
        self.discard_pending();
        for event in self.destroy_events.drain(..) {
            let (record, _callback) = event.into_parts();
            if record.state() == EventState::Pending {
                record.set_state(EventState::Expired);
            }
        }
    }
}
