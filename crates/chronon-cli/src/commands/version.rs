//! Version command implementation.

use chronon::{Resolution, SchedulerKind};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() {
    println!("chronon {VERSION}");
    println!();
    println!("Deterministic discrete-event simulation core.");
    println!();
    println!("Build info:");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
    println!(
        "  Schedulers:   {}",
        SchedulerKind::ALL.map(SchedulerKind::name).join(", ")
    );
    println!("  Resolution:   {} (default)", Resolution::get());
}
