/*!
 * Outcome Type
 * Three-way classification for fallible inference work: success,
 * recoverable error, or degraded completion
 */

use crate::core::errors::ResourceError;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Message attached to outcomes degraded by a low-memory condition
pub const DEGRADED_MODE_MESSAGE: &str = "switched to low-memory / degraded mode";

/// Result of a unit of work executed against a managed resource.
///
/// Unlike `Result`, this distinguishes failures the caller should not retry
/// (`Error` with `fallback_available: false`), failures the caller can paper
/// over with a cheaper computation (`Error` with `fallback_available: true`),
/// and completed-but-reduced-fidelity results (`Degraded`).
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Work completed with a full-fidelity value
    Success(T),

    /// Work failed outright
    Error {
        cause: ResourceError,
        /// Whether the caller may substitute an alternate, lower-cost
        /// computation instead of retrying the same path
        fallback_available: bool,
        message: Option<String>,
    },

    /// Work hit a resource-exhaustion condition but may carry a partial value
    Degraded {
        cause: ResourceError,
        partial: Option<T>,
        message: String,
    },
}

impl<T> Outcome<T> {
    /// Create a success outcome
    pub fn success(value: T) -> Self {
        Outcome::Success(value)
    }

    /// Create an error outcome, deriving the message from the cause
    pub fn error(cause: ResourceError, fallback_available: bool) -> Self {
        let message = Some(cause.to_string());
        Outcome::Error {
            cause,
            fallback_available,
            message,
        }
    }

    /// Create a degraded outcome
    pub fn degraded(cause: ResourceError, partial: Option<T>, message: impl Into<String>) -> Self {
        Outcome::Degraded {
            cause,
            partial,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error { .. })
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    /// The failure cause, if any
    pub fn cause(&self) -> Option<&ResourceError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Error { cause, .. } => Some(cause),
            Outcome::Degraded { cause, .. } => Some(cause),
        }
    }

    /// The payload: the success value, or a degraded partial value
    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Degraded { partial, .. } => partial,
            Outcome::Error { .. } => None,
        }
    }

    /// The payload, or `default` when none is available
    pub fn unwrap_or(self, default: T) -> T {
        self.ok().unwrap_or(default)
    }

    /// Transform the payload, leaving cause and classification unchanged
    pub fn map<R>(self, f: impl FnOnce(T) -> R) -> Outcome<R> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Error {
                cause,
                fallback_available,
                message,
            } => Outcome::Error {
                cause,
                fallback_available,
                message,
            },
            Outcome::Degraded {
                cause,
                partial,
                message,
            } => Outcome::Degraded {
                cause,
                partial: partial.map(f),
                message,
            },
        }
    }

    /// Chain a dependent fallible operation.
    ///
    /// `Error` short-circuits. A `Degraded` outcome carrying a partial value
    /// feeds that value to `f`: a `Success` result stays degraded (original
    /// cause and message, new partial), while an `Error` or `Degraded`
    /// result propagates as produced. A `Degraded` outcome without a partial
    /// value propagates and skips `f` entirely.
    pub fn and_then<R>(self, f: impl FnOnce(T) -> Outcome<R>) -> Outcome<R> {
        match self {
            Outcome::Success(value) => f(value),
            Outcome::Error {
                cause,
                fallback_available,
                message,
            } => Outcome::Error {
                cause,
                fallback_available,
                message,
            },
            Outcome::Degraded {
                cause,
                partial: Some(value),
                message,
            } => match f(value) {
                Outcome::Success(next) => Outcome::Degraded {
                    cause,
                    partial: Some(next),
                    message,
                },
                other => other,
            },
            Outcome::Degraded {
                cause,
                partial: None,
                message,
            } => Outcome::Degraded {
                cause,
                partial: None,
                message,
            },
        }
    }

    /// Total pattern match into a caller-chosen type
    pub fn fold<R>(
        self,
        on_success: impl FnOnce(T) -> R,
        on_error: impl FnOnce(ResourceError, bool) -> R,
        on_degraded: impl FnOnce(ResourceError, Option<T>, String) -> R,
    ) -> R {
        match self {
            Outcome::Success(value) => on_success(value),
            Outcome::Error {
                cause,
                fallback_available,
                ..
            } => on_error(cause, fallback_available),
            Outcome::Degraded {
                cause,
                partial,
                message,
            } => on_degraded(cause, partial, message),
        }
    }

    /// Run `f` on the success value, returning the outcome unchanged
    pub fn on_success(self, f: impl FnOnce(&T)) -> Self {
        if let Outcome::Success(ref value) = self {
            f(value);
        }
        self
    }

    /// Run `f` on the error cause and fallback flag, returning the outcome unchanged
    pub fn on_error(self, f: impl FnOnce(&ResourceError, bool)) -> Self {
        if let Outcome::Error {
            ref cause,
            fallback_available,
            ..
        } = self
        {
            f(cause, fallback_available);
        }
        self
    }

    /// Run `f` on the degraded cause, partial, and message, returning the outcome unchanged
    pub fn on_degraded(self, f: impl FnOnce(&ResourceError, Option<&T>, &str)) -> Self {
        if let Outcome::Degraded {
            ref cause,
            ref partial,
            ref message,
        } = self
        {
            f(cause, partial.as_ref(), message);
        }
        self
    }

    /// Execute `block`, classifying its result.
    ///
    /// A low-memory failure becomes `Degraded`; any other failure becomes
    /// `Error` tagged with `fallback_available`. A panic inside `block` is
    /// caught and classified as an `Error` — nothing unwinds across the
    /// manager boundary.
    pub fn catching<F>(fallback_available: bool, block: F) -> Self
    where
        F: FnOnce() -> Result<T, ResourceError>,
    {
        match catch_unwind(AssertUnwindSafe(block)) {
            Ok(Ok(value)) => Outcome::Success(value),
            Ok(Err(cause)) if cause.is_out_of_memory() => Outcome::Degraded {
                cause,
                partial: None,
                message: DEGRADED_MODE_MESSAGE.to_string(),
            },
            Ok(Err(cause)) => {
                let message = Some(cause.to_string());
                Outcome::Error {
                    cause,
                    fallback_available,
                    message,
                }
            }
            Err(panic) => {
                let message = panic_message(&panic);
                Outcome::Error {
                    cause: ResourceError::Panicked(message.clone()),
                    fallback_available,
                    message: Some(message),
                }
            }
        }
    }

    /// Reduce a sequence of outcomes to a single outcome over the collected
    /// payloads.
    ///
    /// Any `Error` dominates and propagates unchanged. Otherwise any
    /// `Degraded` dominates: the collected payload substitutes degraded
    /// partials where present (order preserved), with the cause of the first
    /// degraded element. Otherwise the collected success values.
    pub fn combine(outcomes: Vec<Outcome<T>>) -> Outcome<Vec<T>> {
        let mut values = Vec::with_capacity(outcomes.len());
        let mut degraded: Option<(ResourceError, Vec<String>)> = None;

        for outcome in outcomes {
            match outcome {
                Outcome::Success(value) => values.push(value),
                Outcome::Error {
                    cause,
                    fallback_available,
                    message,
                } => {
                    return Outcome::Error {
                        cause,
                        fallback_available,
                        message,
                    }
                }
                Outcome::Degraded {
                    cause,
                    partial,
                    message,
                } => {
                    if let Some(value) = partial {
                        values.push(value);
                    }
                    match &mut degraded {
                        Some((_, messages)) => messages.push(message),
                        None => degraded = Some((cause, vec![message])),
                    }
                }
            }
        }

        match degraded {
            Some((cause, messages)) => Outcome::Degraded {
                cause,
                partial: if values.is_empty() {
                    None
                } else {
                    Some(values)
                },
                message: format!("some operations degraded: {}", messages.join("; ")),
            },
            None => Outcome::Success(values),
        }
    }
}

/// Best-effort extraction of a panic payload message
fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catching_classifies_out_of_memory_as_degraded() {
        let outcome: Outcome<u32> =
            Outcome::catching(true, || Err(ResourceError::out_of_memory("arena exhausted")));

        assert!(outcome.is_degraded());
        match outcome {
            Outcome::Degraded { message, .. } => assert_eq!(message, DEGRADED_MODE_MESSAGE),
            _ => panic!("expected degraded outcome"),
        }
    }

    #[test]
    fn test_catching_captures_panics() {
        let outcome: Outcome<u32> = Outcome::catching(true, || panic!("tensor shape mismatch"));

        match outcome {
            Outcome::Error {
                cause: ResourceError::Panicked(message),
                fallback_available: true,
                ..
            } => assert_eq!(message, "tensor shape mismatch"),
            other => panic!("expected panic error, got {other:?}"),
        }
    }

    #[test]
    fn test_and_then_feeds_degraded_partial_to_next_stage() {
        let degraded = Outcome::degraded(
            ResourceError::out_of_memory("oom"),
            Some(3u32),
            "reduced resolution",
        );

        let chained = degraded.and_then(|n| Outcome::success(n * 2));

        match chained {
            Outcome::Degraded {
                partial: Some(6),
                message,
                ..
            } => assert_eq!(message, "reduced resolution"),
            other => panic!("expected degraded with partial, got {other:?}"),
        }
    }

    #[test]
    fn test_and_then_without_partial_short_circuits() {
        let degraded: Outcome<u32> =
            Outcome::degraded(ResourceError::out_of_memory("oom"), None, "no partial");

        let chained = degraded.and_then(|n| Outcome::success(n * 2));

        assert!(chained.is_degraded());
        assert_eq!(chained.ok(), None);
    }
}
