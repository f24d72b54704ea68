//! Synthetic workload command.

use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use chronon::{ChrononConfig, FromConfig, Resolution, SchedulerKind, Simulator, VirtualTime};
use chronon_bench::{WorkloadConfig, WorkloadReport, run_timer_workload};

use crate::style::colors::SemanticStyle;
use crate::style::{latency_table, print_spacer, print_warn, summary_table};

pub struct RunArgs {
    pub project: PathBuf,
    pub seed: u64,
    pub timers: u64,
    pub cancel_ratio: f64,
    pub max_delay: String,
    pub max_gap: String,
    pub scheduler: Option<SchedulerKind>,
    pub realtime: bool,
    pub stop_time: Option<String>,
    pub json: bool,
}

/// Applies command-line overrides on top of the loaded configuration.
fn effective_config(args: &RunArgs) -> Result<ChrononConfig> {
    let mut config =
        ChrononConfig::load_from_dir(&args.project).context("Failed to load configuration")?;
    if let Some(kind) = args.scheduler {
        config.simulator.scheduler = kind.name().to_string();
    }
    if args.realtime {
        config.realtime.enabled = true;
    }
    if let Some(stop_time) = &args.stop_time {
        config.simulator.stop_time = Some(stop_time.clone());
    }
    config.validate()?;
    Ok(config)
}

fn parse_ticks(flag: &str, literal: &str) -> Result<i64> {
    let time: VirtualTime = literal
        .parse()
        .with_context(|| format!("invalid {flag} '{literal}'"))?;
    ensure!(!time.is_strictly_negative(), "{flag} must not be negative");
    Ok(time.ticks())
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = effective_config(args)?;
    let mut sim = Simulator::from_config(&config)?;

    let (gc_initial_chunk, gc_max_chunk) = config.gc_chunks()?;
    let workload = WorkloadConfig {
        seed: args.seed,
        timers: args.timers,
        cancel_ratio: args.cancel_ratio,
        max_delay_ticks: parse_ticks("--max-delay", &args.max_delay)?,
        max_gap_ticks: parse_ticks("--max-gap", &args.max_gap)?,
        gc_initial_chunk,
        gc_max_chunk,
    };
    let report = run_timer_workload(&mut sim, &workload)?;

    if args.json {
        let mut json = report.to_json();
        json["scheduler"] = sim.scheduler_kind().name().into();
        json["resolution"] = Resolution::get().suffix().into();
        json["seed"] = args.seed.into();
        if let Some(stats) = sim.pacing_stats() {
            json["pacing"] = serde_json::json!({
                "paced": stats.paced,
                "overruns": stats.overruns,
                "max_drift_ns": stats.max_drift_ns,
            });
        }
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    print_report(&sim, args.seed, &report);
    Ok(())
}

fn print_report(sim: &Simulator, seed: u64, report: &WorkloadReport) {
    println!("{}", "Timer workload".header());
    let mut entries = vec![
        ("Scheduler", sim.scheduler_kind().to_string()),
        ("Resolution", Resolution::get().to_string()),
        ("Seed", seed.to_string()),
        ("Armed", report.armed.to_string()),
        ("Fired", report.fired.to_string()),
        ("Cancelled", report.cancelled.to_string()),
        ("Dispatched", report.dispatched.to_string()),
        ("Pending", report.pending.to_string()),
        ("Virtual end", report.end_time.to_string()),
        ("Wall time", format!("{:.3} ms", report.wall.as_secs_f64() * 1000.0)),
        ("Events/sec", format!("{:.0}", report.events_per_sec())),
        ("GC peak", report.gc_peak.to_string()),
    ];
    if let Some(stats) = sim.pacing_stats() {
        entries.push(("Paced", stats.paced.to_string()));
        entries.push(("Max drift", format!("{} ns", stats.max_drift_ns)));
    }
    println!("{}", summary_table("Metric", &entries));

    if report.dispatch_gaps.count() > 0 {
        print_spacer();
        println!("{}", "Dispatch gaps (wall clock)".header());
        println!("{}", latency_table(&report.dispatch_gaps.summary_rows()));
    }

    if let Some(stats) = sim.pacing_stats() {
        if stats.overruns > 0 {
            print_spacer();
            print_warn(&format!(
                "{} dispatches fell behind the wall clock by more than the hard limit",
                stats.overruns
            ));
        }
    }
}
