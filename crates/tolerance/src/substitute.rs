//! Fallback values returned in place of a suppressed error.

use std::fmt;
use std::sync::Arc;

type Producer<T> = Arc<dyn Fn() -> T + Send + Sync>;
type ArgsProducer<A, T> = Arc<dyn Fn(&A) -> T + Send + Sync>;

/// What a tolerant call returns when it suppresses an error.
///
/// A plain value is fixed when the wrapper is configured and cloned for each
/// suppressed call. Producers run only when an error is actually suppressed,
/// once per suppressed call.
pub struct Substitute<A, T> {
    inner: Inner<A, T>,
}

enum Inner<A, T> {
    Value(Producer<T>),
    Lazy(Producer<T>),
    FromArgs {
        snapshot: fn(&A) -> A,
        produce: ArgsProducer<A, T>,
    },
}

impl<A, T> Substitute<A, T> {
    /// Return `value` (cloned) on every suppressed call.
    pub fn value(value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Self {
            inner: Inner::Value(Arc::new(move || value.clone())),
        }
    }

    /// Return `T::default()`, the "no value" marker: `None` for `Option<_>`
    /// targets and `()` for procedures.
    #[must_use]
    pub fn none() -> Self
    where
        T: Default + 'static,
    {
        Self {
            inner: Inner::Value(Arc::new(T::default)),
        }
    }

    /// Build the fallback with `produce`, invoked only when an error is suppressed.
    pub fn with<P>(produce: P) -> Self
    where
        P: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            inner: Inner::Lazy(Arc::new(produce)),
        }
    }

    /// Build the fallback from the arguments the failed call was made with.
    ///
    /// The arguments are cloned before every call so they are still available
    /// after the target has consumed the originals.
    pub fn from_args<P>(produce: P) -> Self
    where
        A: Clone,
        P: Fn(&A) -> T + Send + Sync + 'static,
    {
        Self {
            inner: Inner::FromArgs {
                snapshot: A::clone,
                produce: Arc::new(produce),
            },
        }
    }

    /// Capture whatever the fallback needs from `args` before the target runs.
    pub(crate) fn prepare(&self, args: &A) -> Pending<'_, A, T> {
        match &self.inner {
            Inner::Value(produce) | Inner::Lazy(produce) => Pending::Ready(produce),
            Inner::FromArgs { snapshot, produce } => Pending::WithArgs(produce, snapshot(args)),
        }
    }
}

impl<A, T: Default + 'static> Default for Substitute<A, T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<A, T> Clone for Substitute<A, T> {
    fn clone(&self) -> Self {
        let inner = match &self.inner {
            Inner::Value(produce) => Inner::Value(Arc::clone(produce)),
            Inner::Lazy(produce) => Inner::Lazy(Arc::clone(produce)),
            Inner::FromArgs { snapshot, produce } => Inner::FromArgs {
                snapshot: *snapshot,
                produce: Arc::clone(produce),
            },
        };
        Self { inner }
    }
}

impl<A, T> fmt::Debug for Substitute<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.inner {
            Inner::Value(_) => "Value",
            Inner::Lazy(_) => "Lazy",
            Inner::FromArgs { .. } => "FromArgs",
        };
        write!(f, "Substitute::{kind}")
    }
}

/// A fallback armed for one call.
pub(crate) enum Pending<'a, A, T> {
    Ready(&'a Producer<T>),
    WithArgs(&'a ArgsProducer<A, T>, A),
}

impl<A, T> Pending<'_, A, T> {
    pub(crate) fn produce(self) -> T {
        match self {
            Self::Ready(produce) => produce(),
            Self::WithArgs(produce, args) => produce(&args),
        }
    }
}
