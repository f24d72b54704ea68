//! # chronon-sim: Discrete-event simulation engine
//!
//! A single-threaded simulator that advances virtual time by jumping from
//! one scheduled event to the next. It is the core that protocol and
//! network models run on: they schedule callbacks, cancel timers, read the
//! clock and start or stop the run.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           Simulator                              │
//! │   now: VirtualTime    state: SimState    context: u32            │
//! │                                                                  │
//! │   ┌────────────────────────────┐    ┌─────────────────────────┐  │
//! │   │ EventQueue                 │    │ destroy callbacks       │  │
//! │   │  Heap | List | Map         │    │ (registration order)    │  │
//! │   │  ordered by (ts, uid)      │    └─────────────────────────┘  │
//! │   └────────────────────────────┘                                 │
//! │                                     ┌─────────────────────────┐  │
//! │                                     │ Pacer (optional)        │  │
//! │                                     │  Synchronizer + policy  │  │
//! │                                     └─────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//!          ▲ schedule / cancel / stop              │ callback(&mut Simulator)
//!          └───────────────── model code ◀─────────┘
//! ```
//!
//! ## Guarantees
//!
//! - **Monotonic time**: dispatched timestamps never decrease.
//! - **FIFO ties**: events sharing a timestamp run in scheduling order,
//!   whichever backend is selected.
//! - **Safe handles**: an [`EventHandle`] can be queried or cancelled at any
//!   time, including after the event ran or the simulator was dropped.
//! - **Reentrancy**: callbacks receive `&mut Simulator` and may schedule,
//!   cancel or stop; a zero-delay event always runs after the current one.
//!
//! ## Example
//!
//! ```
//! use chronon_sim::Simulator;
//! use chronon_time::VirtualTime;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut sim = Simulator::new();
//! let log = Rc::new(RefCell::new(Vec::new()));
//!
//! for (label, delay_ms) in [("b", 5), ("a", 3)] {
//!     let log = Rc::clone(&log);
//!     sim.schedule(VirtualTime::from_millis(delay_ms).unwrap(), move |sim| {
//!         log.borrow_mut().push((label, sim.now()));
//!     });
//! }
//! sim.run();
//!
//! let order: Vec<&str> = log.borrow().iter().map(|(label, _)| *label).collect();
//! assert_eq!(order, ["a", "b"]);
//! ```

mod error;
mod event;
mod gc;
mod handle;
mod realtime;
pub mod scheduler;
mod simulator;


pub use error::SimError;
pub use event::{Callback, EventKey, EventState, ScheduledEvent};
pub use gc::{CHUNK_INIT_SIZE, CHUNK_MAX_SIZE, EventGarbageCollector};
pub use handle::EventHandle;
pub use realtime::{
    DEFAULT_HARD_LIMIT, ManualClock, ManualSynchronizer, Pacer, PacingStats, RealtimeConfig,
    SyncMode, Synchronizer, WallClockSynchronizer,
};
pub use scheduler::{EventQueue, Scheduler, SchedulerKind};
pub use simulator::{NO_CONTEXT, SimState, Simulator, SimulatorBuilder};

pub use chronon_time::{TimeUnit, VirtualTime};
