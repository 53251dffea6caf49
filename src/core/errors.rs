/*!
 * Error Types
 * Centralized error handling with thiserror
 */

use thiserror::Error;

// Re-export PoolError from pool module
pub use crate::pool::types::PoolError;

/// Common result type for resource manager operations
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Failures surfaced by the resource manager or by caller-submitted work
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("engine not registered: {0}")]
    EngineNotFound(String),

    #[error("resource manager is shut down")]
    Shutdown,

    #[error("out of memory: {0}")]
    OutOfMemory(String),

    #[error("{0}")]
    Execution(String),

    #[error("submitted work panicked: {0}")]
    Panicked(String),
}

impl ResourceError {
    /// Generic execution failure inside caller-submitted work
    pub fn execution(message: impl Into<String>) -> Self {
        ResourceError::Execution(message.into())
    }

    /// Allocation or low-memory failure inside caller-submitted work
    pub fn out_of_memory(message: impl Into<String>) -> Self {
        ResourceError::OutOfMemory(message.into())
    }

    /// True for allocation/low-memory failures, which degrade rather than fail
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, ResourceError::OutOfMemory(_))
    }
}

// Allow conversion from PoolError to ResourceError
impl From<PoolError> for ResourceError {
    fn from(err: PoolError) -> Self {
        ResourceError::OutOfMemory(err.to_string())
    }
}
