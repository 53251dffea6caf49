/*!
 * Engine Traits
 * Interface an inference engine exposes to the registry
 */

/// An initialized inference engine instance.
///
/// The registry is the sole owner of a registered engine; callers only
/// borrow access transiently during guarded execution.
pub trait Engine: Send + 'static {
    /// Release the native resources backing this engine.
    ///
    /// The registry calls this at most once, on teardown, unregistration,
    /// or replacement.
    fn close(&mut self);
}
