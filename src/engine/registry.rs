/*!
 * Engine Registry
 * Keyed store of live engine handles with guarded execution
 */

use super::traits::Engine;
use crate::core::errors::ResourceError;
use crate::outcome::Outcome;
use dashmap::DashMap;
use log::info;
use parking_lot::Mutex;
use std::sync::Arc;

struct EngineEntry<E> {
    engine: E,
    closed: bool,
}

/// Keyed store of live engine handles.
///
/// The map itself is sharded (lookup, insert, and remove never serialize
/// unrelated keys); each entry carries its own mutex, so work against one
/// key is exclusive and non-reentrant while work against distinct keys
/// proceeds concurrently.
pub struct EngineRegistry<E> {
    engines: DashMap<String, Arc<Mutex<EngineEntry<E>>>>,
}

impl<E: Engine> EngineRegistry<E> {
    pub fn new() -> Self {
        Self {
            engines: DashMap::new(),
        }
    }

    /// Store `engine` under `key`, closing any previous handle registered
    /// under the same key.
    pub fn register(&self, key: impl Into<String>, engine: E) {
        let key = key.into();
        let entry = Arc::new(Mutex::new(EngineEntry {
            engine,
            closed: false,
        }));
        if let Some(previous) = self.engines.insert(key.clone(), entry) {
            Self::close_entry(&key, &previous);
        }
        info!("registered engine: {}", key);
    }

    /// Execute `block` with exclusive access to the engine under `key`.
    ///
    /// An absent key yields a non-retryable error and `block` is never
    /// invoked. Otherwise the block's result, error, or panic is classified
    /// into an [`Outcome`].
    pub fn with_engine<R>(
        &self,
        key: &str,
        block: impl FnOnce(&mut E) -> Result<R, ResourceError>,
    ) -> Outcome<R> {
        let entry = match self.engines.get(key) {
            Some(entry) => Arc::clone(entry.value()),
            None => {
                return Outcome::error(ResourceError::EngineNotFound(key.to_string()), false)
            }
        };

        // Map shard released above; only this entry's mutex is held across
        // the caller's work.
        let mut slot = entry.lock();
        if slot.closed {
            return Outcome::error(ResourceError::EngineNotFound(key.to_string()), false);
        }
        Outcome::catching(true, || block(&mut slot.engine))
    }

    /// Close and remove the engine under `key`. Returns whether a live
    /// handle was present.
    pub fn unregister(&self, key: &str) -> bool {
        match self.engines.remove(key) {
            Some((key, entry)) => {
                Self::close_entry(&key, &entry);
                true
            }
            None => false,
        }
    }

    /// Close and remove every registered engine
    pub fn close_all(&self) {
        let keys: Vec<String> = self.engines.iter().map(|entry| entry.key().clone()).collect();
        for key in keys {
            self.unregister(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.engines.contains_key(key)
    }

    /// Closing is idempotent: the underlying handle is closed at most once
    fn close_entry(key: &str, entry: &Arc<Mutex<EngineEntry<E>>>) {
        let mut slot = entry.lock();
        if !slot.closed {
            slot.closed = true;
            slot.engine.close();
            info!("closed engine: {}", key);
        }
    }
}

impl<E: Engine> Default for EngineRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}
