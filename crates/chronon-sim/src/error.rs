//! Simulation error types

use chronon_time::TimeError;
use thiserror::Error;

/// Recoverable errors reported by the simulation engine.
///
/// Invariant violations (negative delays, scheduling into the past, use
/// after destroy) are programming errors and panic instead.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("unknown event scheduler '{0}' (expected heap, list or map)")]
    InvalidScheduler(String),

    #[error("unknown realtime synchronization mode '{0}' (expected best-effort or hard-limit)")]
    InvalidSyncMode(String),

    #[error("cannot change the event scheduler while the simulation is running")]
    SchedulerLocked,

    #[error("cannot reconfigure realtime pacing while the simulation is running")]
    RealtimeLocked,

    #[error(transparent)]
    Time(#[from] TimeError),
}
