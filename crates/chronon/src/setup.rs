//! Building simulators and collectors from a loaded [`ChrononConfig`].

use chronon_config::ChrononConfig;
use chronon_sim::{EventGarbageCollector, Simulator, SimulatorBuilder};
use chronon_time::Resolution;
use tracing::debug;

use crate::Result;

/// Construction from configuration.
pub trait FromConfig: Sized {
    fn from_config(config: &ChrononConfig) -> Result<Self>;
}

impl FromConfig for SimulatorBuilder {
    /// Applies `simulator.resolution`, `simulator.scheduler` and the
    /// `[realtime]` table.
    ///
    /// Setting the resolution fails with `ResolutionFrozen` once any event
    /// has been scheduled in this process with a different unit.
    fn from_config(config: &ChrononConfig) -> Result<Self> {
        config.validate()?;
        Resolution::set(config.resolution()?)?;

        let kind = config.scheduler_kind()?;
        let mut builder = SimulatorBuilder::new().scheduler(kind);
        if let Some(realtime) = config.realtime_config()? {
            builder = builder.realtime(realtime);
        }
        debug!(
            scheduler = %kind,
            resolution = %Resolution::get(),
            realtime = config.realtime.enabled,
            "simulator configured"
        );
        Ok(builder)
    }
}

impl FromConfig for Simulator {
    /// Builds a simulator and schedules the configured stop time, if any.
    fn from_config(config: &ChrononConfig) -> Result<Self> {
        let mut sim = SimulatorBuilder::from_config(config)?.build();
        if let Some(stop_time) = config.stop_time()? {
            sim.stop_at_time(stop_time);
        }
        Ok(sim)
    }
}

impl FromConfig for EventGarbageCollector {
    fn from_config(config: &ChrononConfig) -> Result<Self> {
        let (initial_chunk, max_chunk) = config.gc_chunks()?;
        Ok(EventGarbageCollector::with_chunks(initial_chunk, max_chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChrononError, SchedulerKind, SimState, VirtualTime};
    use chronon_config::ConfigError;

    #[test]
    fn test_default_config_builds_heap_simulator() {
        let sim = Simulator::from_config(&ChrononConfig::default()).unwrap();
        assert_eq!(sim.scheduler_kind(), SchedulerKind::Heap);
        assert_eq!(sim.pending_count(), 0);
        assert_eq!(sim.pacing_stats(), None);
    }

    #[test]
    fn test_scheduler_and_stop_time_applied() {
        let mut config = ChrononConfig::default();
        config.simulator.scheduler = "list".to_string();
        config.simulator.stop_time = Some("2s".to_string());

        let mut sim = Simulator::from_config(&config).unwrap();
        assert_eq!(sim.scheduler_kind(), SchedulerKind::List);
        assert_eq!(sim.pending_count(), 1);

        let ran = std::rc::Rc::new(std::cell::Cell::new(false));
        let flag = std::rc::Rc::clone(&ran);
        sim.schedule(VirtualTime::from_secs(3).unwrap(), move |_| flag.set(true));
        sim.run();

        assert_eq!(sim.now(), VirtualTime::from_secs(2).unwrap());
        assert_eq!(sim.state(), SimState::Stopped);
        assert!(!ran.get());
    }

    #[test]
    fn test_realtime_enables_pacing() {
        let mut config = ChrononConfig::default();
        config.realtime.enabled = true;
        let sim = SimulatorBuilder::from_config(&config).unwrap().build();
        assert!(sim.pacing_stats().is_some());
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let mut config = ChrononConfig::default();
        config.simulator.scheduler = "calendar".to_string();
        let err = SimulatorBuilder::from_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ChrononError::Config(ConfigError::ValidationError {
                key: "simulator.scheduler",
                ..
            })
        ));
    }

    #[test]
    fn test_gc_chunks_from_config() {
        let mut config = ChrononConfig::default();
        config.gc.initial_chunk = 4;
        config.gc.max_chunk = 16;
        let gc = EventGarbageCollector::from_config(&config).unwrap();
        assert_eq!(gc.threshold(), 4);
        assert!(gc.is_empty());

        config.gc.initial_chunk = 0;
        assert!(EventGarbageCollector::from_config(&config).is_err());
    }
}
