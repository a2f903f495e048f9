//! Filter predicates.
//!
//! A predicate decides whether a single node's data matches the current
//! filter. Predicates must be deterministic and free of side effects for a
//! given (data, filter) pair, and must not block: they run inline with
//! per-row visibility queries. The cache relies on this but cannot check it.

use std::sync::Arc;

/// Error raised by a predicate while evaluating node data.
///
/// The cache never converts these into an accept or reject decision; they
/// propagate to the caller of the visibility query.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct PredicateError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PredicateError {
    /// Create an error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A boolean test over node data representing the current filter.
pub trait Predicate<T: ?Sized>: Send + Sync {
    /// Returns `Ok(true)` if `data` is accepted by the filter.
    fn accepts(&self, data: &T) -> Result<bool, PredicateError>;
}

impl<T: ?Sized, P: Predicate<T> + ?Sized> Predicate<T> for Arc<P> {
    fn accepts(&self, data: &T) -> Result<bool, PredicateError> {
        (**self).accepts(data)
    }
}

impl<T: ?Sized, P: Predicate<T> + ?Sized> Predicate<T> for Box<P> {
    fn accepts(&self, data: &T) -> Result<bool, PredicateError> {
        (**self).accepts(data)
    }
}

/// Accepts everything. In force while no filter is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<T: ?Sized> Predicate<T> for AcceptAll {
    fn accepts(&self, _data: &T) -> Result<bool, PredicateError> {
        Ok(true)
    }
}

/// Adapts an infallible closure into a [`Predicate`].
///
/// ```
/// use arbor_core::{FnPredicate, Predicate};
///
/// let predicate = FnPredicate::new(|name: &str| name.contains("oo"));
/// assert!(predicate.accepts("foo").unwrap());
/// assert!(!predicate.accepts("bar").unwrap());
/// ```
#[derive(Clone)]
pub struct FnPredicate<F>(F);

impl<F> FnPredicate<F> {
    /// Wrap a closure.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<T: ?Sized, F> Predicate<T> for FnPredicate<F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn accepts(&self, data: &T) -> Result<bool, PredicateError> {
        Ok((self.0)(data))
    }
}

/// Adapts a fallible closure into a [`Predicate`].
#[derive(Clone)]
pub struct TryFnPredicate<F>(F);

impl<F> TryFnPredicate<F> {
    /// Wrap a closure.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<T: ?Sized, F> Predicate<T> for TryFnPredicate<F>
where
    F: Fn(&T) -> Result<bool, PredicateError> + Send + Sync,
{
    fn accepts(&self, data: &T) -> Result<bool, PredicateError> {
        (self.0)(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_all() {
        assert!(AcceptAll.accepts("anything").unwrap());
        assert!(Predicate::<i32>::accepts(&AcceptAll, &0).unwrap());
    }

    #[test]
    fn test_try_fn_predicate_propagates_errors() {
        let predicate = TryFnPredicate::new(|value: &i32| {
            if *value < 0 {
                Err(PredicateError::new("negative values are not comparable"))
            } else {
                Ok(*value > 10)
            }
        });

        assert!(predicate.accepts(&11).unwrap());
        assert!(!predicate.accepts(&3).unwrap());

        let err = predicate.accepts(&-1).unwrap_err();
        assert_eq!(err.message(), "negative values are not comparable");
    }

    #[test]
    fn test_shared_predicate() {
        let predicate: Arc<dyn Predicate<str>> =
            Arc::new(FnPredicate::new(|s: &str| s.starts_with('a')));
        assert!(predicate.accepts("apple").unwrap());
        assert!(!predicate.accepts("pear").unwrap());
    }

    #[test]
    fn test_predicate_error_source() {
        let io = std::io::Error::other("disk on fire");
        let err = PredicateError::with_source("lookup failed", io);
        assert_eq!(err.to_string(), "lookup failed");
        assert!(std::error::Error::source(&err).is_some());
    }
}
