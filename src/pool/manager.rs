/*!
 * Buffer Pool
 * Bounded cache of reusable pixel buffers with least-recently-returned
 * eviction
 */

use super::types::{BufferKey, PixelFormat, PoolError, PooledBuffer};
use crate::memory::MemoryMonitor;
use log::debug;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// An idle buffer together with the monotonic sequence of its return
struct PooledEntry {
    buffer: PooledBuffer,
    seq: u64,
}

struct PoolInner {
    /// Idle buffers by size class; queues are never left empty
    idle: HashMap<BufferKey, VecDeque<PooledEntry>>,
    len: usize,
    capacity: usize,
    next_seq: u64,
}

impl PoolInner {
    /// Pop the most-recently-returned reusable buffer for `key`, discarding
    /// anything invalidated while pooled.
    fn take_reusable(&mut self, key: &BufferKey) -> Option<PooledBuffer> {
        loop {
            let (entry, emptied) = {
                let queue = self.idle.get_mut(key)?;
                let entry = queue.pop_back()?;
                (entry, queue.is_empty())
            };
            if emptied {
                self.idle.remove(key);
            }
            self.len -= 1;
            if entry.buffer.is_invalidated() {
                debug!("discarding invalidated pooled buffer {}", entry.buffer.id());
                continue;
            }
            return Some(entry.buffer);
        }
    }

    /// Evict the entry whose return is oldest across all size classes
    fn evict_least_recently_returned(&mut self) -> Option<PooledBuffer> {
        let key = self
            .idle
            .iter()
            .filter_map(|(key, queue)| queue.front().map(|entry| (*key, entry.seq)))
            .min_by_key(|&(_, seq)| seq)
            .map(|(key, _)| key)?;

        let (entry, emptied) = {
            let queue = self.idle.get_mut(&key)?;
            let entry = queue.pop_front()?;
            (entry, queue.is_empty())
        };
        if emptied {
            self.idle.remove(&key);
        }
        self.len -= 1;
        Some(entry.buffer)
    }
}

/// Bounded cache of reusable pixel buffers keyed by (width, height, format).
///
/// Borrow and return are linearizable: one mutex guards the map, held only
/// for map mutation, never across an allocation.
pub struct BufferPool {
    inner: Mutex<PoolInner>,
    monitor: Arc<MemoryMonitor>,
}

impl BufferPool {
    pub fn new(capacity: usize, monitor: Arc<MemoryMonitor>) -> Self {
        Self {
            inner: Mutex::new(PoolInner {
                idle: HashMap::new(),
                len: 0,
                capacity,
                next_seq: 0,
            }),
            monitor,
        }
    }

    /// Hand out an idle buffer matching the requested shape, or allocate a
    /// new one. Never hands out an invalidated buffer.
    pub fn borrow(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<PooledBuffer, PoolError> {
        let key = BufferKey::new(width, height, format);
        if let Some(buffer) = self.inner.lock().take_reusable(&key) {
            debug!("reused pooled buffer {}x{} {:?}", width, height, format);
            return Ok(buffer);
        }

        let buffer = PooledBuffer::allocate(width, height, format, Arc::clone(&self.monitor))?;
        debug!("allocated buffer {}x{} {:?}", width, height, format);
        Ok(buffer)
    }

    /// Accept a buffer back into the pool. Invalidated buffers are dropped,
    /// not recycled; when the bound would be exceeded the least-recently-
    /// returned entries are evicted first.
    pub fn give_back(&self, buffer: PooledBuffer) {
        if buffer.is_invalidated() {
            debug!("rejecting invalidated buffer {}", buffer.id());
            return;
        }

        let key = buffer.key();
        let mut evicted = Vec::new();
        {
            let mut inner = self.inner.lock();
            if inner.capacity == 0 {
                return;
            }
            while inner.len >= inner.capacity {
                match inner.evict_least_recently_returned() {
                    Some(old) => evicted.push(old),
                    None => break,
                }
            }
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner
                .idle
                .entry(key)
                .or_default()
                .push_back(PooledEntry { buffer, seq });
            inner.len += 1;
        }

        for old in &evicted {
            debug!("evicted least-recently-returned buffer {}", old.id());
        }
    }

    /// Evict least-recently-returned entries until at most `target` remain.
    /// Returns the number of buffers evicted.
    pub fn trim(&self, target: usize) -> usize {
        let mut evicted = Vec::new();
        {
            let mut inner = self.inner.lock();
            while inner.len > target {
                match inner.evict_least_recently_returned() {
                    Some(buffer) => evicted.push(buffer),
                    None => break,
                }
            }
        }
        if !evicted.is_empty() {
            debug!("trimmed {} pooled buffers", evicted.len());
        }
        evicted.len()
    }

    /// Drop every pooled buffer
    pub fn clear(&self) {
        self.trim(0);
    }

    /// Number of idle buffers currently pooled
    pub fn len(&self) -> usize {
        self.inner.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of idle buffers retained
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    /// Change the retention bound, evicting down to it if necessary
    pub fn set_capacity(&self, capacity: usize) {
        let mut evicted = Vec::new();
        {
            let mut inner = self.inner.lock();
            inner.capacity = capacity;
            while inner.len > capacity {
                match inner.evict_least_recently_returned() {
                    Some(buffer) => evicted.push(buffer),
                    None => break,
                }
            }
        }
        if !evicted.is_empty() {
            debug!(
                "capacity lowered to {}, evicted {} buffers",
                capacity,
                evicted.len()
            );
        }
    }
}
