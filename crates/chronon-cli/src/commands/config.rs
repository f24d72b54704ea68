//! Configuration management commands.

use std::path::Path;

use anyhow::{Context, Result};
use chronon::{ChrononConfig, ConfigLoader};
use clap::ValueEnum;

use crate::style::colors::SemanticStyle;
use crate::style::{print_error, print_hint, print_labeled, print_spacer, print_success};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Toml,
}

/// Show the effective configuration.
pub fn show(project: &Path, format: OutputFormat) -> Result<()> {
    let loader = ConfigLoader::new().with_project_dir(project);
    let sources = loader.sources();
    let config = loader.load().context("Failed to load configuration")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        OutputFormat::Toml => {
            print!("{}", config.to_toml()?);
        }
        OutputFormat::Text => print_text(&config, &sources),
    }

    Ok(())
}

fn print_text(config: &ChrononConfig, sources: &[std::path::PathBuf]) {
    println!("{}", "Chronon Configuration".header());
    print_spacer();

    println!("{}", "Sources:".header());
    if sources.is_empty() {
        println!("  {}", "built-in defaults only".muted());
    }
    for source in sources {
        println!("  {}", source.display().code());
    }
    print_spacer();

    println!("{}", "Simulator:".header());
    print_labeled("Scheduler", &config.simulator.scheduler);
    print_labeled("Resolution", &config.simulator.resolution);
    print_labeled(
        "Stop time",
        config.simulator.stop_time.as_deref().unwrap_or("none"),
    );
    print_spacer();

    println!("{}", "Realtime:".header());
    print_labeled("Enabled", &config.realtime.enabled.to_string());
    print_labeled("Mode", &config.realtime.mode);
    print_labeled("Hard limit", &config.realtime.hard_limit);
    print_spacer();

    println!("{}", "Garbage collector:".header());
    print_labeled("Initial chunk", &config.gc.initial_chunk.to_string());
    print_labeled("Max chunk", &config.gc.max_chunk.to_string());
}

/// Validate configuration files.
pub fn validate(project: &Path) -> Result<()> {
    println!("Validating configuration in {}...", project.display().code());

    let loader = ConfigLoader::new().with_project_dir(project);
    if loader.sources().is_empty() {
        print_hint("No configuration files found; checking built-in defaults");
    }

    match loader.load() {
        Ok(_) => {
            print_success("Configuration is valid");
            Ok(())
        }
        Err(e) => {
            print_error("Configuration validation failed:");
            eprintln!("  {e:#}");
            Err(e)
        }
    }
}
