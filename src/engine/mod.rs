/*!
 * Engine Module
 * Inference engine handles and their keyed registry
 */

pub mod registry;
pub mod traits;

// Re-export for convenience
pub use registry::EngineRegistry;
pub use traits::Engine;
