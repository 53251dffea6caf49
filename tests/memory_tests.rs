/*!
 * Memory Monitor Tests
 * Budget accounting and pressure classification
 */

use ml_resource_manager::{MemoryMonitor, MemoryPressure};
use proptest::prelude::*;

#[test]
fn test_fresh_monitor_reports_zero_pressure() {
    let monitor = MemoryMonitor::new(1024);
    assert_eq!(monitor.pressure(), 0.0);
    assert_eq!(monitor.pressure_level(), MemoryPressure::Low);
}

#[test]
fn test_full_budget_is_exactly_one() {
    let monitor = MemoryMonitor::new(1024);
    assert!(monitor.try_reserve(1024));
    assert_eq!(monitor.pressure(), 1.0);
    assert_eq!(monitor.pressure_level(), MemoryPressure::Critical);
}

#[test]
fn test_failed_reservation_leaves_usage_unchanged() {
    let monitor = MemoryMonitor::new(100);
    assert!(monitor.try_reserve(90));
    assert!(!monitor.try_reserve(20));
    assert_eq!(monitor.used(), 90);
}

#[test]
fn test_pressure_level_ordering() {
    assert!(MemoryPressure::Low < MemoryPressure::Medium);
    assert!(MemoryPressure::Medium < MemoryPressure::High);
    assert!(MemoryPressure::High < MemoryPressure::Critical);
}

proptest! {
    #[test]
    fn prop_pressure_always_within_unit_interval(
        budget in 1usize..1_000_000_000,
        reservations in proptest::collection::vec(0usize..100_000_000, 0..8),
        frees in proptest::collection::vec(0usize..100_000_000, 0..8),
    ) {
        let monitor = MemoryMonitor::new(budget);
        for bytes in reservations {
            let _ = monitor.try_reserve(bytes);
        }
        for bytes in frees {
            monitor.record_free(bytes);
        }
        let pressure = monitor.pressure();
        prop_assert!((0.0..=1.0).contains(&pressure));
    }

    #[test]
    fn prop_usage_never_exceeds_budget(
        budget in 1usize..1_000_000,
        reservations in proptest::collection::vec(0usize..2_000_000, 0..16),
    ) {
        let monitor = MemoryMonitor::new(budget);
        for bytes in reservations {
            let _ = monitor.try_reserve(bytes);
        }
        prop_assert!(monitor.used() <= budget);
    }
}
