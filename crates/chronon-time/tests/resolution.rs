//! Resolution changes are process-wide, so they get their own test binary.
//!
//! Everything runs inside one test function to keep the global state
//! transitions in a fixed order.

use chronon_time::{Resolution, TimeError, TimeUnit, VirtualTime};

#[test]
fn resolution_can_change_until_frozen() {
    assert_eq!(Resolution::get(), TimeUnit::Ns);
    assert!(!Resolution::is_frozen());

    // Changing back and forth is allowed before the freeze.
    Resolution::set(TimeUnit::Ps).expect("ps before freeze");
    Resolution::set(TimeUnit::Us).expect("us before freeze");
    assert_eq!(Resolution::get(), TimeUnit::Us);

    // One tick is now a microsecond.
    let t = VirtualTime::from_millis(3).expect("3ms fits");
    assert_eq!(t.ticks(), 3_000);
    assert_eq!(t.to_string(), "+3000us");
    assert_eq!(t.as_unit(TimeUnit::Ns), 3_000_000);

    // Values that are not a whole number of microseconds are reported.
    let err = VirtualTime::from_nanos(1_500).unwrap_err();
    assert!(matches!(err, TimeError::PrecisionLoss { .. }));
    let err = "1500ns".parse::<VirtualTime>().unwrap_err();
    assert!(matches!(err, TimeError::PrecisionLoss { .. }));
    assert_eq!(
        VirtualTime::from_unit_truncating(1_500, TimeUnit::Ns).unwrap(),
        VirtualTime::from_ticks(1)
    );

    Resolution::freeze();
    assert!(Resolution::is_frozen());

    let err = Resolution::set(TimeUnit::Ns).unwrap_err();
    assert_eq!(
        err,
        TimeError::ResolutionFrozen {
            current: TimeUnit::Us,
            requested: TimeUnit::Ns,
        }
    );
    assert_eq!(Resolution::get(), TimeUnit::Us);

    // Re-asserting the frozen value stays a no-op.
    Resolution::set(TimeUnit::Us).expect("same unit after freeze");
}
