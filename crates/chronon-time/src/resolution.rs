//! Process-wide virtual time resolution.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::{TimeError, TimeUnit};

static UNIT: AtomicU8 = AtomicU8::new(TimeUnit::Ns.index());
static FROZEN: AtomicBool = AtomicBool::new(false);

/// Accessors for the global tick unit shared by every `VirtualTime`.
pub struct Resolution;

impl Resolution {
    /// Returns the active resolution (nanoseconds by default).
    pub fn get() -> TimeUnit {
        TimeUnit::from_index(UNIT.load(Ordering::Acquire))
    }

    /// Changes the resolution.
    ///
    /// Setting the current value is always accepted. Any other value is
    /// rejected once the resolution has been frozen.
    pub fn set(unit: TimeUnit) -> Result<(), TimeError> {
        let current = Self::get();
        if current == unit {
            return Ok(());
        }
        if Self::is_frozen() {
            return Err(TimeError::ResolutionFrozen {
                current,
                requested: unit,
            });
        }
        UNIT.store(unit.index(), Ordering::Release);
        Ok(())
    }

    /// Locks the resolution for the rest of the process.
    ///
    /// Called by the simulator when the first event is scheduled.
    pub fn freeze() {
        if !FROZEN.load(Ordering::Relaxed) {
            FROZEN.store(true, Ordering::Release);
        }
    }

    /// Returns true once `freeze` has been called.
    pub fn is_frozen() -> bool {
        FROZEN.load(Ordering::Acquire)
    }
}
