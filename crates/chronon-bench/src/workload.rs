//! Seeded retransmission-timer workload.
//!
//! A driver event arms one timer per step and reschedules itself after a
//! random gap. A fraction of the timers get an "ack" event scheduled
//! strictly before their deadline which cancels them, so every timer either
//! fires or is cancelled, never both. Handles are parked in an
//! [`EventGarbageCollector`] the way long-lived models keep them.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Result, ensure};
use chronon_sim::{CHUNK_INIT_SIZE, CHUNK_MAX_SIZE, EventGarbageCollector, Simulator};
use chronon_time::VirtualTime;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::LatencyTracker;

/// Shape of a timer workload. Delays are in ticks of the active resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadConfig {
    pub seed: u64,
    /// Number of timers armed over the run.
    pub timers: u64,
    /// Probability in `[0, 1]` that a timer is cancelled before it fires.
    pub cancel_ratio: f64,
    /// Timer deadlines are drawn from `1..=max_delay_ticks`.
    pub max_delay_ticks: i64,
    /// Gaps between armings are drawn from `0..=max_gap_ticks`.
    pub max_gap_ticks: i64,
    pub gc_initial_chunk: usize,
    pub gc_max_chunk: usize,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            timers: 10_000,
            cancel_ratio: 0.5,
            max_delay_ticks: 1_000_000,
            max_gap_ticks: 1_000,
            gc_initial_chunk: CHUNK_INIT_SIZE,
            gc_max_chunk: CHUNK_MAX_SIZE,
        }
    }
}

impl WorkloadConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.cancel_ratio),
            "cancel ratio must be within [0, 1], got {}",
            self.cancel_ratio
        );
        ensure!(self.max_delay_ticks >= 1, "max delay must be at least one tick");
        ensure!(self.max_gap_ticks >= 0, "max gap must not be negative");
        ensure!(
            self.gc_initial_chunk > 0 && self.gc_initial_chunk <= self.gc_max_chunk,
            "gc chunks must satisfy 0 < initial ({}) <= max ({})",
            self.gc_initial_chunk,
            self.gc_max_chunk
        );
        Ok(())
    }
}

/// Outcome of one workload run.
#[derive(Debug, Clone)]
pub struct WorkloadReport {
    pub armed: u64,
    pub fired: u64,
    pub cancelled: u64,
    /// Events dispatched during the run, including drivers and acks.
    pub dispatched: u64,
    /// Live events left when the run returned early.
    pub pending: usize,
    pub start_time: VirtualTime,
    pub end_time: VirtualTime,
    pub wall: Duration,
    /// Largest number of handles the collector held at once.
    pub gc_peak: usize,
    /// Wall-clock gap between consecutive dispatches.
    pub dispatch_gaps: LatencyTracker,
}

impl WorkloadReport {
    pub fn events_per_sec(&self) -> f64 {
        let secs = self.wall.as_secs_f64();
        if secs > 0.0 {
            self.dispatched as f64 / secs
        } else {
            0.0
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "armed": self.armed,
            "fired": self.fired,
            "cancelled": self.cancelled,
            "dispatched": self.dispatched,
            "pending": self.pending,
            "start_time": self.start_time.to_string(),
            "end_time": self.end_time.to_string(),
            "wall_ns": self.wall.as_nanos() as u64,
            "events_per_sec": self.events_per_sec(),
            "gc_peak": self.gc_peak,
            "dispatch_gaps": self.dispatch_gaps.to_json(),
        })
    }
}

struct Workload {
    config: WorkloadConfig,
    rng: RefCell<SmallRng>,
    gc: RefCell<EventGarbageCollector>,
    armed: Cell<u64>,
    fired: Cell<u64>,
    cancelled: Cell<u64>,
    gc_peak: Cell<usize>,
    last_dispatch: Cell<Option<Instant>>,
    gaps: RefCell<LatencyTracker>,
}

impl Workload {
    fn mark_dispatch(&self) {
        let now = Instant::now();
        if let Some(previous) = self.last_dispatch.replace(Some(now)) {
            self.gaps.borrow_mut().record_duration(now - previous);
        }
    }

    fn drive(self: Rc<Self>, sim: &mut Simulator) {
        self.mark_dispatch();

        let (delay, ack, gap) = {
            let mut rng = self.rng.borrow_mut();
            let delay = rng.gen_range(1..=self.config.max_delay_ticks);
            let ack = rng
                .gen_bool(self.config.cancel_ratio)
                .then(|| rng.gen_range(0..delay));
            let gap = rng.gen_range(0..=self.config.max_gap_ticks);
            (delay, ack, gap)
        };

        let workload = Rc::clone(&self);
        let timer = sim.schedule(VirtualTime::from_ticks(delay), move |_| {
            workload.mark_dispatch();
            workload.fired.set(workload.fired.get() + 1);
        });

        if let Some(ack) = ack {
            let workload = Rc::clone(&self);
            let target = timer.clone();
            sim.schedule(VirtualTime::from_ticks(ack), move |sim| {
                workload.mark_dispatch();
                if target.is_pending() {
                    workload.cancelled.set(workload.cancelled.get() + 1);
                }
                sim.cancel(&target);
            });
        }

        {
            let mut gc = self.gc.borrow_mut();
            gc.track(timer);
            self.gc_peak.set(self.gc_peak.get().max(gc.len()));
        }

        let armed = self.armed.get() + 1;
        self.armed.set(armed);
        if armed < self.config.timers {
            sim.schedule(VirtualTime::from_ticks(gap), move |sim| self.drive(sim));
        }
    }
}

/// Runs the timer workload on `sim` and returns what happened.
///
/// The simulator's own configuration (backend, realtime pacing, a stop
/// time already scheduled) is used as is.
pub fn run_timer_workload(sim: &mut Simulator, config: &WorkloadConfig) -> Result<WorkloadReport> {
    config.validate()?;

    let workload = Rc::new(Workload {
        config: config.clone(),
        rng: RefCell::new(SmallRng::seed_from_u64(config.seed)),
        gc: RefCell::new(EventGarbageCollector::with_chunks(
            config.gc_initial_chunk,
            config.gc_max_chunk,
        )),
        armed: Cell::new(0),
        fired: Cell::new(0),
        cancelled: Cell::new(0),
        gc_peak: Cell::new(0),
        last_dispatch: Cell::new(None),
        gaps: RefCell::new(LatencyTracker::new()),
    });

    let start_time = sim.now();
    let dispatched_before = sim.event_count();
    if config.timers > 0 {
        let driver = Rc::clone(&workload);
        sim.schedule_now(move |sim| driver.drive(sim));
    }

    debug!(
        seed = config.seed,
        timers = config.timers,
        scheduler = %sim.scheduler_kind(),
        "timer workload starting"
    );
    let started = Instant::now();
    sim.run();
    let wall = started.elapsed();

    let report = WorkloadReport {
        armed: workload.armed.get(),
        fired: workload.fired.get(),
        cancelled: workload.cancelled.get(),
        dispatched: sim.event_count() - dispatched_before,
        pending: sim.pending_count(),
        start_time,
        end_time: sim.now(),
        wall,
        gc_peak: workload.gc_peak.get(),
        dispatch_gaps: workload.gaps.borrow().clone(),
    };
    debug!(
        fired = report.fired,
        cancelled = report.cancelled,
        dispatched = report.dispatched,
        "timer workload finished"
    );
    Ok(report)
}
