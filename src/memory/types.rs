/*!
 * Memory Types
 * Pressure levels and thresholds
 */

use serde::{Deserialize, Serialize};

/// Ratio above which pressure is classified Medium
pub const PRESSURE_MEDIUM: f64 = 0.50;

/// Ratio above which pressure is classified High; the pool starts shedding here
pub const PRESSURE_HIGH: f64 = 0.75;

/// Ratio above which pressure is classified Critical
pub const PRESSURE_CRITICAL: f64 = 0.95;

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl MemoryPressure {
    /// Classify a clamped usage ratio in `[0.0, 1.0]`
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= PRESSURE_CRITICAL {
            MemoryPressure::Critical
        } else if ratio >= PRESSURE_HIGH {
            MemoryPressure::High
        } else if ratio >= PRESSURE_MEDIUM {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
