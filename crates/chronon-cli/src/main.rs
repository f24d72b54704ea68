//! Chronon command-line interface.
//!
//! Runs seeded synthetic workloads on the discrete-event simulator and
//! inspects the layered configuration.
//!
//! # Quick Start
//!
//! ```bash
//! # Run 10k retransmission timers, half of them cancelled
//! chronon run --timers 10000 --cancel-ratio 0.5
//!
//! # Same workload on the ordered-map backend, paced to the wall clock
//! chronon run --scheduler map --realtime
//!
//! # Show the effective configuration for a project
//! chronon config show --project . --format toml
//! ```

mod commands;
mod style;

use std::path::PathBuf;

use anyhow::Result;
use chronon::SchedulerKind;
use clap::{Parser, Subcommand};

use commands::config::OutputFormat;

/// Chronon - deterministic discrete-event simulation core.
#[derive(Parser)]
#[command(name = "chronon")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Run a synthetic retransmission-timer workload.
    Run {
        /// Project directory to load chronon.toml from.
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Seed for the workload generator.
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Number of timers to arm.
        #[arg(short = 'n', long, default_value = "10000")]
        timers: u64,

        /// Fraction of timers cancelled before they fire (0.0 to 1.0).
        #[arg(long, default_value = "0.5")]
        cancel_ratio: f64,

        /// Longest timer deadline, as a time literal.
        #[arg(long, default_value = "1ms")]
        max_delay: String,

        /// Longest gap between arming two timers, as a time literal.
        #[arg(long, default_value = "10us")]
        max_gap: String,

        /// Event queue backend (overrides simulator.scheduler).
        #[arg(short, long)]
        scheduler: Option<SchedulerKind>,

        /// Pace the run against the wall clock (overrides realtime.enabled).
        #[arg(long)]
        realtime: bool,

        /// Stop the run at this virtual time (overrides simulator.stop_time).
        #[arg(long)]
        stop_time: Option<String>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration.
    Show {
        /// Project directory.
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Validate configuration files.
    Validate {
        /// Project directory.
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    style::set_no_color(cli.no_color);

    match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
        Commands::Run {
            project,
            seed,
            timers,
            cancel_ratio,
            max_delay,
            max_gap,
            scheduler,
            realtime,
            stop_time,
            json,
        } => commands::run::run(&commands::run::RunArgs {
            project,
            seed,
            timers,
            cancel_ratio,
            max_delay,
            max_gap,
            scheduler,
            realtime,
            stop_time,
            json,
        }),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show { project, format } => commands::config::show(&project, format),
            ConfigCommands::Validate { project } => commands::config::validate(&project),
        },
    }
}
