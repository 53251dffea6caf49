/*!
 * Memory Pressure Monitor
 * Tracks buffer bytes in use against a configured budget
 */

use super::types::MemoryPressure;
use crate::core::types::{Size, DEFAULT_MEMORY_BUDGET};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Deterministic memory accounting against a fixed budget.
///
/// Usage is reported explicitly by the owners of allocations (the buffer
/// pool and its buffers), never inferred from allocator or GC state, so the
/// pressure ratio is reproducible in tests and cheap to query per frame.
#[derive(Debug)]
pub struct MemoryMonitor {
    used: AtomicUsize,
    budget: Size,
}

impl MemoryMonitor {
    pub fn new(budget: Size) -> Self {
        Self {
            used: AtomicUsize::new(0),
            budget: budget.max(1),
        }
    }

    /// Configured maximum budget in bytes
    pub fn budget(&self) -> Size {
        self.budget
    }

    /// Bytes currently accounted for
    pub fn used(&self) -> Size {
        self.used.load(Ordering::Acquire)
    }

    /// Reserve `bytes` against the budget. Fails without side effects when
    /// the reservation would exceed it.
    pub fn try_reserve(&self, bytes: Size) -> bool {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(bytes).filter(|&next| next <= self.budget)
            })
            .is_ok()
    }

    /// Release `bytes` previously reserved. Saturates at zero.
    pub fn record_free(&self, bytes: Size) {
        let _ = self
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                Some(used.saturating_sub(bytes))
            });
    }

    /// Current usage ratio, clamped to `[0.0, 1.0]`
    pub fn pressure(&self) -> f64 {
        (self.used() as f64 / self.budget as f64).clamp(0.0, 1.0)
    }

    /// Current usage classified into a pressure level
    pub fn pressure_level(&self) -> MemoryPressure {
        MemoryPressure::from_ratio(self.pressure())
    }
}

impl Default for MemoryMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_BUDGET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_within_budget() {
        let monitor = MemoryMonitor::new(1024);

        assert!(monitor.try_reserve(512));
        assert_eq!(monitor.used(), 512);
        assert!(monitor.try_reserve(512));
        assert_eq!(monitor.used(), 1024);
    }

    #[test]
    fn test_reserve_over_budget_has_no_effect() {
        let monitor = MemoryMonitor::new(1024);

        assert!(monitor.try_reserve(1000));
        assert!(!monitor.try_reserve(100));
        assert_eq!(monitor.used(), 1000);
    }

    #[test]
    fn test_free_saturates_at_zero() {
        let monitor = MemoryMonitor::new(1024);

        monitor.try_reserve(100);
        monitor.record_free(500);
        assert_eq!(monitor.used(), 0);
        assert_eq!(monitor.pressure(), 0.0);
    }

    #[test]
    fn test_pressure_levels() {
        let monitor = MemoryMonitor::new(100);

        assert_eq!(monitor.pressure_level(), MemoryPressure::Low);
        monitor.try_reserve(60);
        assert_eq!(monitor.pressure_level(), MemoryPressure::Medium);
        monitor.try_reserve(20);
        assert_eq!(monitor.pressure_level(), MemoryPressure::High);
        monitor.try_reserve(16);
        assert_eq!(monitor.pressure_level(), MemoryPressure::Critical);
    }
}
