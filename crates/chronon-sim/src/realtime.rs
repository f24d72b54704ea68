//! Realtime pacing: dispatch events no earlier than their virtual time
//! measured on a wall clock.
//!
//! ```text
//!   virtual   origin_v ────────── ts ─────────────▶
//!                 │                │
//!   wall      origin_w ─── sleep ──● target = origin_w + (ts - origin_v)
//!                                  │
//!                                  └─ |wall - target| > hard_limit ?
//!                                       BestEffort: warn, keep going
//!                                       HardLimit:  abort the run
//! ```
//!
//! Each target is computed from the origin anchor rather than from the
//! previous sleep, so oversleeping on one event does not push every later
//! event back.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::{Duration, Instant};

use chronon_time::{TimeUnit, VirtualTime};
use tracing::warn;

use crate::SimError;

/// Default tolerance between wall clock and virtual time.
pub const DEFAULT_HARD_LIMIT: Duration = Duration::from_millis(100);

/// What to do when the wall clock drifts past the hard limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Log and continue, running events as fast as possible until caught up.
    #[default]
    BestEffort,
    /// Treat drift beyond the limit as fatal.
    HardLimit,
}

impl SyncMode {
    pub const fn name(self) -> &'static str {
        match self {
            SyncMode::BestEffort => "best-effort",
            SyncMode::HardLimit => "hard-limit",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SyncMode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best-effort" | "besteffort" | "best_effort" => Ok(SyncMode::BestEffort),
            "hard-limit" | "hardlimit" | "hard_limit" => Ok(SyncMode::HardLimit),
            _ => Err(SimError::InvalidSyncMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealtimeConfig {
    pub mode: SyncMode,
    /// Maximum tolerated |wall - virtual| at dispatch.
    pub hard_limit: Duration,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            mode: SyncMode::BestEffort,
            hard_limit: DEFAULT_HARD_LIMIT,
        }
    }
}

// ============================================================================
// Synchronizers
// ============================================================================

/// Wall-clock source used by realtime pacing.
pub trait Synchronizer {
    /// Anchors wall time zero at the current instant.
    fn set_origin(&mut self);

    /// Wall nanoseconds elapsed since the origin.
    fn elapsed_ns(&self) -> u64;

    /// Blocks until at least `target_ns` have elapsed since the origin and
    /// returns the elapsed time observed on waking.
    fn synchronize(&mut self, target_ns: u64) -> u64;

    /// Called just before an event callback runs.
    fn event_start(&mut self) {}

    /// Called just after an event callback returns.
    fn event_end(&mut self) {}
}

/// Paces against `std::time::Instant` using `thread::sleep`.
#[derive(Debug)]
pub struct WallClockSynchronizer {
    origin: Instant,
}

impl WallClockSynchronizer {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClockSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synchronizer for WallClockSynchronizer {
    fn set_origin(&mut self) {
        self.origin = Instant::now();
    }

    fn elapsed_ns(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn synchronize(&mut self, target_ns: u64) -> u64 {
        loop {
            let elapsed = self.elapsed_ns();
            if elapsed >= target_ns {
                return elapsed;
            }
            std::thread::sleep(Duration::from_nanos(target_ns - elapsed));
        }
    }
}

/// Shared, manually advanced wall clock for deterministic tests.
///
/// Clones observe the same time, so a test can keep one and hand another to
/// a [`ManualSynchronizer`] owned by the simulator.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ns(&self) -> u64 {
        self.0.get()
    }

    pub fn advance(&self, ns: u64) {
        self.0.set(self.0.get().saturating_add(ns));
    }

    pub fn set(&self, ns: u64) {
        self.0.set(ns);
    }
}

/// Synchronizer that never sleeps: waiting jumps the manual clock forward.
///
/// `oversleep_ns` is added to every wait and `callback_cost_ns` to every
/// callback, which lets tests reproduce a slow host.
#[derive(Debug, Default)]
pub struct ManualSynchronizer {
    clock: ManualClock,
    origin_ns: u64,
    oversleep_ns: u64,
    callback_cost_ns: u64,
}

impl ManualSynchronizer {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            ..Self::default()
        }
    }

    pub fn with_oversleep(mut self, ns: u64) -> Self {
        self.oversleep_ns = ns;
        self
    }

    pub fn with_callback_cost(mut self, ns: u64) -> Self {
        self.callback_cost_ns = ns;
        self
    }
}

impl Synchronizer for ManualSynchronizer {
    fn set_origin(&mut self) {
        self.origin_ns = self.clock.now_ns();
    }

    fn elapsed_ns(&self) -> u64 {
        self.clock.now_ns().saturating_sub(self.origin_ns)
    }

    fn synchronize(&mut self, target_ns: u64) -> u64 {
        let elapsed = self.elapsed_ns();
        if elapsed < target_ns {
            self.clock
                .set(self.origin_ns + target_ns + self.oversleep_ns);
        }
        self.elapsed_ns()
    }

    fn event_end(&mut self) {
        self.clock.advance(self.callback_cost_ns);
    }
}

// ============================================================================
// Pacer
// ============================================================================

/// Counters collected while pacing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacingStats {
    /// Events dispatched under pacing.
    pub paced: u64,
    /// Dispatches where the drift exceeded the hard limit.
    pub overruns: u64,
    /// Largest |wall - virtual| observed, in nanoseconds.
    pub max_drift_ns: u64,
}

/// Couples a [`Synchronizer`] with a [`RealtimeConfig`] for one simulator.
pub struct Pacer {
    config: RealtimeConfig,
    sync: Box<dyn Synchronizer>,
    origin: VirtualTime,
    stats: PacingStats,
}

impl Pacer {
    pub fn new(config: RealtimeConfig, sync: Box<dyn Synchronizer>) -> Self {
        Self {
            config,
            sync,
            origin: VirtualTime::ZERO,
            stats: PacingStats::default(),
        }
    }

    /// Pacer on the real wall clock.
    pub fn wall_clock(config: RealtimeConfig) -> Self {
        Self::new(config, Box::new(WallClockSynchronizer::new()))
    }

    pub fn config(&self) -> RealtimeConfig {
        self.config
    }

    pub fn stats(&self) -> PacingStats {
        self.stats
    }

    /// Anchors virtual `now` to the current wall instant.
    pub(crate) fn start(&mut self, now: VirtualTime) {
        self.origin = now;
        self.sync.set_origin();
    }

    /// Wall-clock position expressed as virtual time.
    pub(crate) fn realtime_now(&self) -> VirtualTime {
        let elapsed = i64::try_from(self.sync.elapsed_ns()).unwrap_or(i64::MAX);
        let offset = VirtualTime::from_unit_truncating(elapsed, TimeUnit::Ns)
            .unwrap_or(VirtualTime::MAX);
        self.origin.checked_add(offset).unwrap_or(VirtualTime::MAX)
    }

    /// Waits until `ts` on the wall clock and enforces the drift policy.
    pub(crate) fn pace(&mut self, ts: VirtualTime) {
        let offset = ts.saturating_sub(self.origin).as_nanos_i128();
        let target = u64::try_from(offset.max(0)).unwrap_or(u64::MAX);
        let actual = self.sync.synchronize(target);

        let drift = actual.abs_diff(target);
        let limit = u64::try_from(self.config.hard_limit.as_nanos()).unwrap_or(u64::MAX);
        self.stats.paced += 1;
        self.stats.max_drift_ns = self.stats.max_drift_ns.max(drift);

        if drift > limit {
            self.stats.overruns += 1;
            match self.config.mode {
                SyncMode::HardLimit => panic!(
                    "realtime hard limit exceeded at {ts}: wall clock drifted {drift}ns (limit {limit}ns)"
                ),
                SyncMode::BestEffort => warn!(
                    virtual_time = %ts,
                    drift_ns = drift,
                    limit_ns = limit,
                    "realtime pacing fell behind"
                ),
            }
        }
    }

    pub(crate) fn event_start(&mut self) {
        self.sync.event_start();
    }

    pub(crate) fn event_end(&mut self) {
        self.sync.event_end();
    }
}

impl fmt::Debug for Pacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pacer")
            .field("config", &self.config)
            .field("origin", &self.origin)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
