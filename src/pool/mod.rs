/*!
 * Buffer Pool Module
 * Bounded reuse cache for pixel buffers
 */

pub mod manager;
pub mod types;

// Re-export for convenience
pub use manager::BufferPool;
pub use types::{BufferKey, PixelFormat, PoolError, PooledBuffer};
