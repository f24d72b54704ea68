//! # Chronon
//!
//! Deterministic discrete-event simulation core.
//!
//! Chronon advances a virtual clock from one scheduled event to the next,
//! independent of wall-clock time. Models built on top of it (network
//! stacks, protocols, timers) get:
//!
//! - **Deterministic ordering** - events sharing a timestamp run in the
//!   order they were scheduled
//! - **Cheap cancellation** - handles cancel in O(1); the queue compacts
//!   tombstones lazily
//! - **Pluggable queues** - heap, sorted list or ordered map backends
//! - **Optional realtime pacing** - runs can be slowed to track the wall clock
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           chronon                            │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐  │
//! │  │ chronon-time │ → │ chronon-sim  │ ← │ chronon-config   │  │
//! │  │ VirtualTime  │   │ Simulator    │   │ chronon.toml     │  │
//! │  │ Resolution   │   │ EventQueue   │   │ CHRONON_* env    │  │
//! │  └──────────────┘   └──────────────┘   └──────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use chronon::{ChrononConfig, FromConfig, Simulator, VirtualTime};
//!
//! let mut config = ChrononConfig::default();
//! config.simulator.stop_time = Some("1s".to_string());
//!
//! let mut sim = Simulator::from_config(&config)?;
//! sim.schedule(VirtualTime::from_millis(250)?, |sim| {
//!     println!("tick at {}", sim.now());
//! });
//! sim.run();
//!
//! assert_eq!(sim.now(), VirtualTime::from_secs(1)?);
//! # Ok::<(), chronon::ChrononError>(())
//! ```

mod error;
mod setup;

pub use error::{ChrononError, Result};
pub use setup::FromConfig;

// Virtual time
pub use chronon_time::{
    Resolution, TimeError, TimeUnit, TimeWithUnit, VirtualTime, parse_duration,
};

// Simulation engine
pub use chronon_sim::{
    Callback, EventGarbageCollector, EventHandle, EventKey, EventQueue, EventState, NO_CONTEXT,
    Pacer, PacingStats, RealtimeConfig, ScheduledEvent, Scheduler, SchedulerKind, SimError,
    SimState, Simulator, SimulatorBuilder, SyncMode, Synchronizer,
};

// Realtime clocks
pub use chronon_sim::{ManualClock, ManualSynchronizer, WallClockSynchronizer};

// Configuration
pub use chronon_config::{ChrononConfig, ConfigError, ConfigLoader};
