/*!
 * Resource Manager
 * Facade composing the engine registry, buffer pool, and memory monitor
 * into a single lifecycle-managed object
 */

use crate::core::errors::ResourceError;
use crate::core::types::{Size, DEFAULT_MEMORY_BUDGET, DEFAULT_POOL_CAPACITY, MIN_POOL_CAPACITY};
use crate::engine::{Engine, EngineRegistry};
use crate::memory::{MemoryMonitor, MemoryPressure};
use crate::outcome::Outcome;
use crate::pool::{BufferPool, PixelFormat, PooledBuffer};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Immutable snapshot of resource usage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceStats {
    pub engine_count: usize,
    pub pool_size: usize,
    pub pool_capacity: usize,
    pub used_bytes: Size,
    pub budget_bytes: Size,
    pub pressure: f64,
}

impl ResourceStats {
    pub fn pressure_level(&self) -> MemoryPressure {
        MemoryPressure::from_ratio(self.pressure)
    }
}

/// Builder for [`ResourceManager`]
pub struct ResourceManagerBuilder {
    memory_budget: Size,
    pool_capacity: usize,
}

impl ResourceManagerBuilder {
    pub fn new() -> Self {
        Self {
            memory_budget: DEFAULT_MEMORY_BUDGET,
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }

    /// Maximum bytes of pixel-buffer memory the manager will account
    pub fn with_memory_budget(mut self, bytes: Size) -> Self {
        self.memory_budget = bytes;
        self
    }

    /// Maximum number of idle buffers retained by the pool
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    pub fn build<E: Engine>(self) -> ResourceManager<E> {
        let monitor = Arc::new(MemoryMonitor::new(self.memory_budget));
        info!(
            "resource manager initialized: budget {} bytes, pool capacity {}",
            self.memory_budget, self.pool_capacity
        );
        ResourceManager {
            registry: EngineRegistry::new(),
            pool: BufferPool::new(self.pool_capacity, Arc::clone(&monitor)),
            monitor,
            pool_capacity_limit: self.pool_capacity,
            healthy: AtomicBool::new(true),
        }
    }
}

impl Default for ResourceManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner of inference-engine handles and reusable pixel buffers.
///
/// Constructed once at the application's composition root and injected into
/// every frame-processing component; `shutdown` (or `Drop`) is the single
/// authorized path that releases everything. Nothing here propagates an
/// unhandled fault: every fallible path terminates in an [`Outcome`] or an
/// `Option`.
pub struct ResourceManager<E: Engine> {
    registry: EngineRegistry<E>,
    pool: BufferPool,
    monitor: Arc<MemoryMonitor>,
    pool_capacity_limit: usize,
    healthy: AtomicBool,
}

impl<E: Engine> ResourceManager<E> {
    pub fn new() -> Self {
        ResourceManagerBuilder::new().build()
    }

    /// Store `engine` under `key` for managed lifecycle. Re-registering a
    /// key closes the previous handle. After shutdown the engine is closed
    /// immediately instead of being stored.
    pub fn register_engine(&self, key: impl Into<String>, engine: E) {
        if !self.is_healthy() {
            let key = key.into();
            warn!("cannot register engine {}: manager is shut down", key);
            let mut engine = engine;
            engine.close();
            return;
        }
        self.registry.register(key, engine);
    }

    /// Execute inference work against the engine under `key`.
    ///
    /// This is the sole path through which caller inference code runs, so
    /// every invocation is captured as an [`Outcome`]. A degraded outcome
    /// sheds pooled buffers before returning.
    pub fn use_engine<R>(
        &self,
        key: &str,
        block: impl FnOnce(&mut E) -> Result<R, ResourceError>,
    ) -> Outcome<R> {
        if !self.is_healthy() {
            return Outcome::error(ResourceError::Shutdown, false);
        }
        let outcome = self.registry.with_engine(key, block);
        if outcome.is_degraded() {
            self.relieve_pressure();
        }
        outcome
    }

    /// Close and remove the engine under `key`
    pub fn unregister_engine(&self, key: &str) -> bool {
        self.registry.unregister(key)
    }

    /// Borrow an RGBA frame buffer from the pool
    pub fn borrow_buffer(&self, width: u32, height: u32) -> Option<PooledBuffer> {
        self.borrow_buffer_in(width, height, PixelFormat::Rgba8888)
    }

    /// Borrow a buffer of an explicit pixel format from the pool.
    /// Returns `None` after shutdown or when memory is exhausted.
    pub fn borrow_buffer_in(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Option<PooledBuffer> {
        if !self.is_healthy() {
            return None;
        }
        match self.pool.borrow(width, height, format) {
            Ok(buffer) => Some(buffer),
            Err(err) => {
                warn!("buffer borrow failed: {}", err);
                self.relieve_pressure();
                None
            }
        }
    }

    /// Return a borrowed buffer to the pool. Invalidated buffers are
    /// dropped rather than pooled.
    pub fn give_back_buffer(&self, buffer: PooledBuffer) {
        if !self.is_healthy() || buffer.is_invalidated() {
            return;
        }
        self.pool.give_back(buffer);
    }

    /// Current memory pressure ratio in `[0.0, 1.0]`. Pure query.
    pub fn memory_pressure(&self) -> f64 {
        self.monitor.pressure()
    }

    /// Adapt the pool to current pressure: shrink it when memory is tight,
    /// grow it back toward the configured capacity when memory is plentiful.
    /// Intended to be called periodically from the frame pipeline.
    pub fn maintain(&self) {
        if !self.is_healthy() {
            return;
        }
        match self.monitor.pressure_level() {
            level @ (MemoryPressure::High | MemoryPressure::Critical) => {
                let capacity = self
                    .pool
                    .capacity()
                    .saturating_sub(1)
                    .max(MIN_POOL_CAPACITY);
                warn!(
                    "memory pressure {}: pool capacity lowered to {} ({} / {} bytes used)",
                    level,
                    capacity,
                    self.monitor.used(),
                    self.monitor.budget()
                );
                self.pool.set_capacity(capacity);
                self.relieve_pressure();
            }
            MemoryPressure::Low => {
                let capacity = (self.pool.capacity() + 1).min(self.pool_capacity_limit);
                self.pool.set_capacity(capacity);
            }
            MemoryPressure::Medium => {}
        }
    }

    /// Snapshot of current resource usage
    pub fn stats(&self) -> ResourceStats {
        ResourceStats {
            engine_count: self.registry.len(),
            pool_size: self.pool.len(),
            pool_capacity: self.pool.capacity(),
            used_bytes: self.monitor.used(),
            budget_bytes: self.monitor.budget(),
            pressure: self.monitor.pressure(),
        }
    }

    /// Close every registered engine, drop every pooled buffer, and mark
    /// the manager unhealthy. Effective exactly once; later calls no-op.
    pub fn shutdown(&self) {
        if self
            .healthy
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        info!("resource manager shutting down");
        self.registry.close_all();
        self.pool.clear();
        info!("resource manager shutdown complete");
    }

    /// True from construction until `shutdown` has run
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Acquire)
    }

    /// Evict pooled buffers down to half capacity to relieve pressure
    fn relieve_pressure(&self) {
        let target = (self.pool.capacity() / 2).max(MIN_POOL_CAPACITY);
        let evicted = self.pool.trim(target);
        if evicted > 0 {
            info!("relieved memory pressure: evicted {} pooled buffers", evicted);
        }
    }
}

impl<E: Engine> Default for ResourceManager<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Engine> Drop for ResourceManager<E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
