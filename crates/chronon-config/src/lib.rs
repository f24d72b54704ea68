//! Configuration management for Chronon
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence, applied by the caller)
//! 2. Environment variables (CHRONON_* prefix, `__` between section and key)
//! 3. chronon.local.toml (gitignored, local overrides)
//! 4. chronon.toml (git-tracked, project config)
//! 5. ~/.config/chronon/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)
//!
//! Values are kept as written (strings such as `"heap"` or `"100ms"`) and
//! checked by the typed accessors, so a bad value is reported with the key
//! it came from.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chronon_sim::{RealtimeConfig, SchedulerKind, SyncMode};
use chronon_time::{TimeUnit, VirtualTime, parse_duration};
use serde::{Deserialize, Serialize};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Chronon configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChrononConfig {
    pub simulator: SimulatorConfig,
    pub realtime: RealtimeSettings,
    pub gc: GcConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Event queue backend: heap, list or map.
    pub scheduler: String,
    /// Time resolution unit: y, d, h, min, s, ms, us, ns, ps or fs.
    pub resolution: String,
    /// Optional virtual time at which runs stop, e.g. "10s".
    pub stop_time: Option<String>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerKind::Heap.name().to_string(),
            resolution: TimeUnit::Ns.suffix().to_string(),
            stop_time: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeSettings {
    pub enabled: bool,
    /// best-effort or hard-limit.
    pub mode: String,
    /// Wall-clock drift tolerated at dispatch, e.g. "100ms".
    pub hard_limit: String,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: SyncMode::BestEffort.name().to_string(),
            hard_limit: "100ms".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcConfig {
    pub initial_chunk: usize,
    pub max_chunk: usize,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            initial_chunk: chronon_sim::CHUNK_INIT_SIZE,
            max_chunk: chronon_sim::CHUNK_MAX_SIZE,
        }
    }
}

impl ChrononConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    pub fn scheduler_kind(&self) -> Result<SchedulerKind, ConfigError> {
        self.simulator
            .scheduler
            .parse()
            .map_err(|e| ConfigError::invalid("simulator.scheduler", e))
    }

    pub fn resolution(&self) -> Result<TimeUnit, ConfigError> {
        self.simulator
            .resolution
            .parse()
            .map_err(|e| ConfigError::invalid("simulator.resolution", e))
    }

    /// Parses `simulator.stop_time` at the active resolution.
    ///
    /// Apply [`resolution`](Self::resolution) first so the value is read in
    /// the configured unit.
    pub fn stop_time(&self) -> Result<Option<VirtualTime>, ConfigError> {
        let Some(literal) = &self.simulator.stop_time else {
            return Ok(None);
        };
        let time: VirtualTime = literal
            .parse()
            .map_err(|e| ConfigError::invalid("simulator.stop_time", e))?;
        if time.is_strictly_negative() {
            return Err(ConfigError::invalid(
                "simulator.stop_time",
                "must not be negative",
            ));
        }
        Ok(Some(time))
    }

    pub fn sync_mode(&self) -> Result<SyncMode, ConfigError> {
        self.realtime
            .mode
            .parse()
            .map_err(|e| ConfigError::invalid("realtime.mode", e))
    }

    pub fn hard_limit(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.realtime.hard_limit)
            .map_err(|e| ConfigError::invalid("realtime.hard_limit", e))
    }

    /// Realtime pacing settings, or `None` when pacing is disabled.
    pub fn realtime_config(&self) -> Result<Option<RealtimeConfig>, ConfigError> {
        let config = RealtimeConfig {
            mode: self.sync_mode()?,
            hard_limit: self.hard_limit()?,
        };
        Ok(self.realtime.enabled.then_some(config))
    }

    pub fn gc_chunks(&self) -> Result<(usize, usize), ConfigError> {
        let GcConfig {
            initial_chunk,
            max_chunk,
        } = self.gc;
        if initial_chunk == 0 {
            return Err(ConfigError::invalid("gc.initial_chunk", "must be at least 1"));
        }
        if max_chunk < initial_chunk {
            return Err(ConfigError::invalid(
                "gc.max_chunk",
                format!("must be at least gc.initial_chunk ({initial_chunk})"),
            ));
        }
        Ok((initial_chunk, max_chunk))
    }

    /// Checks every value that can be checked without touching global state.
    ///
    /// `stop_time` is only checked for syntax here; whether it is a whole
    /// number of ticks depends on the resolution in force when it is applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheduler_kind()?;
        self.resolution()?;
        if let Some(literal) = &self.simulator.stop_time {
            parse_duration(literal).map_err(|e| ConfigError::invalid("simulator.stop_time", e))?;
        }
        self.realtime_config()?;
        self.gc_chunks()?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
