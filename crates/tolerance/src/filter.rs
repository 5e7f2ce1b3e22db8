//! Selection of the errors a tolerant call is allowed to suppress.
//!
//! An [`ErrorFilter`] is consulted only after the target has failed. Errors it
//! accepts are suppressed; everything else propagates untouched.

use std::fmt;
use std::io;
use std::sync::Arc;

/// Errors that expose a coarse kind to filter on.
///
/// Implement this for an error enum to suppress by category without writing a
/// predicate by hand:
///
/// ```rust
/// use tolerance::{Classify, ErrorFilter};
///
/// #[derive(Debug)]
/// enum StoreError {
///     Missing(String),
///     Corrupt,
/// }
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum StoreErrorKind {
///     Missing,
///     Corrupt,
/// }
///
/// impl Classify for StoreError {
///     type Kind = StoreErrorKind;
///
///     fn kind(&self) -> StoreErrorKind {
///         match self {
///             Self::Missing(_) => StoreErrorKind::Missing,
///             Self::Corrupt => StoreErrorKind::Corrupt,
///         }
///     }
/// }
///
/// let filter: ErrorFilter<StoreError> = ErrorFilter::kinds([StoreErrorKind::Missing]);
/// assert!(filter.matches(&StoreError::Missing("user:7".into())));
/// assert!(!filter.matches(&StoreError::Corrupt));
/// ```
pub trait Classify {
    /// Kind discriminator compared against a filter's kind list.
    type Kind: PartialEq;

    /// The kind of this error.
    fn kind(&self) -> Self::Kind;
}

impl Classify for io::Error {
    type Kind = io::ErrorKind;

    fn kind(&self) -> io::ErrorKind {
        io::Error::kind(self)
    }
}

type Predicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Decides which errors are suppressed.
pub enum ErrorFilter<E> {
    /// Suppress every error.
    All,
    /// Suppress errors for which the predicate returns `true`.
    Matching(Predicate<E>),
}

impl<E> ErrorFilter<E> {
    /// Suppress every error. This is the default.
    #[must_use]
    pub fn all() -> Self {
        Self::All
    }

    /// Suppress errors accepted by `predicate`.
    pub fn predicate<P>(predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self::Matching(Arc::new(predicate))
    }

    /// Suppress only errors whose [`Classify::kind`] is one of `kinds`.
    pub fn kinds<I>(kinds: I) -> Self
    where
        E: Classify,
        E::Kind: Send + Sync + 'static,
        I: IntoIterator<Item = E::Kind>,
    {
        let kinds: Vec<E::Kind> = kinds.into_iter().collect();
        Self::predicate(move |err: &E| kinds.contains(&err.kind()))
    }

    /// Suppress every error except those whose kind is one of `kinds`.
    pub fn except<I>(kinds: I) -> Self
    where
        E: Classify,
        E::Kind: Send + Sync + 'static,
        I: IntoIterator<Item = E::Kind>,
    {
        let kinds: Vec<E::Kind> = kinds.into_iter().collect();
        Self::predicate(move |err: &E| !kinds.contains(&err.kind()))
    }

    /// Whether `err` should be suppressed.
    pub fn matches(&self, err: &E) -> bool {
        match self {
            Self::All => true,
            Self::Matching(predicate) => predicate(err),
        }
    }
}

impl<E> Default for ErrorFilter<E> {
    fn default() -> Self {
        Self::All
    }
}

impl<E> Clone for ErrorFilter<E> {
    fn clone(&self) -> Self {
        match self {
            Self::All => Self::All,
            Self::Matching(predicate) => Self::Matching(Arc::clone(predicate)),
        }
    }
}

impl<E> fmt::Debug for ErrorFilter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("ErrorFilter::All"),
            Self::Matching(_) => f.write_str("ErrorFilter::Matching(..)"),
        }
    }
}
