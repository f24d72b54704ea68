//! # chronon-bench: Synthetic workloads and benchmarks for Chronon
//!
//! Provides a seeded timer workload that stresses the simulator the way a
//! protocol model does (arm a timer, usually cancel it before it fires) and
//! a latency histogram for the wall-clock gaps between dispatches.

// Benchmark code intentionally uses patterns that trigger some clippy lints
#![allow(clippy::cast_precision_loss)] // Latency stats use f64 for rates and means
#![allow(clippy::cast_possible_truncation)] // Nanosecond durations fit in u64
//!
//! ## Benchmarks
//!
//! - **scheduler**: insert/pop, cancellation and the full timer workload
//!   for each event queue backend
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p chronon-bench
//!
//! # Save baseline for comparison
//! cargo bench -p chronon-bench --bench scheduler -- --save-baseline main
//!
//! # Compare against baseline
//! cargo bench -p chronon-bench --bench scheduler -- --baseline main
//! ```

mod latency;
mod workload;

pub use latency::LatencyTracker;
pub use workload::{WorkloadConfig, WorkloadReport, run_timer_workload};
