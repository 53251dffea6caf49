/*!
 * Buffer Pool Types
 * Pixel buffers, size-class keys, and pool errors
 */

use crate::core::types::Size;
use crate::memory::MemoryMonitor;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Monotonic buffer id source; ids are unique per process
static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Buffer pool errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("buffer budget exceeded: requested {requested} bytes ({used} used / {budget} budget)")]
    BudgetExceeded {
        requested: Size,
        used: Size,
        budget: Size,
    },

    #[error("buffer allocation failed: {bytes} bytes")]
    AllocationFailed { bytes: Size },

    #[error("invalid buffer dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Pixel layout of a pooled buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8 bits per channel RGBA, 4 bytes per pixel
    Rgba8888,
    /// Packed 16-bit RGB, 2 bytes per pixel
    Rgb565,
    /// Single-channel luminance, 1 byte per pixel
    Gray8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> Size {
        match self {
            PixelFormat::Rgba8888 => 4,
            PixelFormat::Rgb565 => 2,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// Size-class key a buffer is pooled under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferKey {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl BufferKey {
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
        }
    }
}

/// A reusable pixel buffer.
///
/// Ownership alternates between the pool (idle) and a caller (borrowed);
/// the transfer is by value, so exactly one owner exists at any time. The
/// buffer's bytes are accounted against the memory monitor from allocation
/// until invalidation or drop, whichever comes first.
pub struct PooledBuffer {
    id: u64,
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
    invalidated: bool,
    accounted: Size,
    monitor: Arc<MemoryMonitor>,
}

impl PooledBuffer {
    /// Allocate a zeroed buffer, reserving its bytes against the monitor.
    /// Fails gracefully on budget exhaustion or allocator failure.
    pub(crate) fn allocate(
        width: u32,
        height: u32,
        format: PixelFormat,
        monitor: Arc<MemoryMonitor>,
    ) -> Result<Self, PoolError> {
        let bytes = (width as Size)
            .checked_mul(height as Size)
            .and_then(|pixels| pixels.checked_mul(format.bytes_per_pixel()))
            .filter(|&bytes| bytes > 0)
            .ok_or(PoolError::InvalidDimensions { width, height })?;

        if !monitor.try_reserve(bytes) {
            return Err(PoolError::BudgetExceeded {
                requested: bytes,
                used: monitor.used(),
                budget: monitor.budget(),
            });
        }

        let mut data = Vec::new();
        if data.try_reserve_exact(bytes).is_err() {
            monitor.record_free(bytes);
            return Err(PoolError::AllocationFailed { bytes });
        }
        data.resize(bytes, 0);

        Ok(Self {
            id: NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            format,
            data,
            invalidated: false,
            accounted: bytes,
            monitor,
        })
    }

    /// Process-unique buffer identity
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// The size-class key this buffer pools under
    pub fn key(&self) -> BufferKey {
        BufferKey::new(self.width, self.height, self.format)
    }

    pub fn len_bytes(&self) -> Size {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    /// Release the backing storage and mark the buffer unusable.
    ///
    /// Models the underlying allocation being released out from under the
    /// pool; an invalidated buffer is dropped on return, never recycled.
    pub fn invalidate(&mut self) {
        if self.invalidated {
            return;
        }
        self.invalidated = true;
        self.data = Vec::new();
        self.monitor.record_free(self.accounted);
        self.accounted = 0;
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.monitor.record_free(self.accounted);
        self.accounted = 0;
    }
}

impl std::fmt::Debug for PooledBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("invalidated", &self.invalidated)
            .finish()
    }
}
