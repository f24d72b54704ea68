//! # chronon-time: Virtual time for discrete-event simulation
//!
//! Virtual time is a signed, fixed-point count of a process-wide resolution
//! unit (nanoseconds unless configured otherwise). It is completely decoupled
//! from wall-clock time: a simulation may cover hours of virtual time in
//! milliseconds of real time.
//!
//! ## Resolution
//!
//! ```text
//!   Resolution::set(Us)      first event scheduled       Resolution::set(Ns)
//!  ───────────●─────────────────────●─────────────────────────────●──────────▶
//!          accepted            Resolution::freeze()        ResolutionFrozen
//! ```
//!
//! The resolution may be changed freely until the simulator schedules its
//! first event. From then on it is frozen for the lifetime of the process.
//! A `VirtualTime` stores raw ticks, so values created before a resolution
//! change are reinterpreted in the new unit.
//!
//! ## Example
//!
//! ```
//! use chronon_time::{TimeUnit, VirtualTime};
//!
//! let rto: VirtualTime = "200ms".parse().unwrap();
//! let now = VirtualTime::from_secs(3).unwrap();
//! let deadline = now + rto;
//!
//! assert_eq!(deadline.as_unit(TimeUnit::Ms), 3_200);
//! assert!(deadline > now);
//! ```

mod error;
mod parse;
mod resolution;
mod time;
mod unit;

pub use error::TimeError;
pub use parse::parse_duration;
pub use resolution::Resolution;
pub use time::{TimeWithUnit, VirtualTime};
pub use unit::TimeUnit;
