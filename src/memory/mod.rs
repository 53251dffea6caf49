/*!
 * Memory Module
 * Memory budget accounting and pressure classification
 */

pub mod monitor;
pub mod types;

// Re-export for convenience
pub use monitor::MemoryMonitor;
pub use types::*;
