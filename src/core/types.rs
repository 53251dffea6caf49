/*!
 * Core Types
 * Common types and limits used across the resource manager
 */

/// Size type for memory accounting
pub type Size = usize;

/// Default memory budget for inference resources (512MB)
pub const DEFAULT_MEMORY_BUDGET: Size = 512 * 1024 * 1024;

/// Default number of pooled pixel buffers
pub const DEFAULT_POOL_CAPACITY: usize = 8;

/// Floor the buffer pool never shrinks below, even under pressure
pub const MIN_POOL_CAPACITY: usize = 2;
