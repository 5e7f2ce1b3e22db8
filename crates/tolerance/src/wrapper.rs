//! The tolerant wrapper.
//!
//! [`Tolerance`] holds the configuration, [`Tolerant`] is the wrapped callable.
//! A call on a `Tolerant` invokes the target exactly once. Successes pass
//! through verbatim; an error is suppressed only when the call is tolerant
//! (process-wide kill switch off, per-call [`Switch`] on) and the
//! [`ErrorFilter`] accepts it. A suppressed error is handed to the error
//! handler, logged, and replaced by the [`Substitute`].

use crate::config::{self, LogLevel};
use crate::filter::ErrorFilter;
use crate::substitute::Substitute;
use crate::switch::Switch;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

type Handler<E> = Arc<dyn Fn(&E) -> Result<(), E> + Send + Sync>;

/// Configuration for a tolerant wrapper. Fixed once passed to [`Tolerance::wrap`].
pub struct Tolerance<A, T, E> {
    substitute: Substitute<A, T>,
    handler: Option<Handler<E>>,
    filter: ErrorFilter<E>,
    switch: Switch<A>,
}

impl<A, T, E> Tolerance<A, T, E> {
    /// Suppress every error and return the "no value" marker (`T::default()`).
    #[must_use]
    pub fn new() -> Self
    where
        T: Default + 'static,
    {
        Self::with_substitute(Substitute::none())
    }

    /// Start from an explicit fallback, for targets whose `T` has no `Default`.
    #[must_use]
    pub fn with_substitute(substitute: Substitute<A, T>) -> Self {
        Self {
            substitute,
            handler: None,
            filter: ErrorFilter::All,
            switch: Switch::always(),
        }
    }

    /// Return `value` when an error is suppressed.
    #[must_use]
    pub fn substitute(mut self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.substitute = Substitute::value(value);
        self
    }

    /// Build the fallback lazily, only when an error is suppressed.
    #[must_use]
    pub fn substitute_with<P>(mut self, produce: P) -> Self
    where
        P: Fn() -> T + Send + Sync + 'static,
    {
        self.substitute = Substitute::with(produce);
        self
    }

    /// Build the fallback from the failed call's arguments.
    #[must_use]
    pub fn substitute_from_args<P>(mut self, produce: P) -> Self
    where
        A: Clone,
        P: Fn(&A) -> T + Send + Sync + 'static,
    {
        self.substitute = Substitute::from_args(produce);
        self
    }

    /// Report each suppressed error to `handler` before the fallback is returned.
    #[must_use]
    pub fn on_error<H>(mut self, handler: H) -> Self
    where
        H: Fn(&E) + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(move |err: &E| {
            handler(err);
            Ok(())
        }));
        self
    }

    /// Like [`on_error`](Self::on_error), but an `Err` from the handler
    /// propagates out of the call in place of the fallback.
    #[must_use]
    pub fn try_on_error<H>(mut self, handler: H) -> Self
    where
        H: Fn(&E) -> Result<(), E> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Restrict suppression to errors accepted by `filter`.
    #[must_use]
    pub fn errors(mut self, filter: ErrorFilter<E>) -> Self {
        self.filter = filter;
        self
    }

    /// Decide per call, from its arguments, whether errors are suppressed.
    #[must_use]
    pub fn switch(mut self, switch: Switch<A>) -> Self {
        self.switch = switch;
        self
    }

    /// Wrap `target` with this configuration.
    pub fn wrap<F>(self, target: F) -> Tolerant<F, A, T, E>
    where
        F: Fn(A) -> Result<T, E>,
    {
        Tolerant {
            target,
            config: self,
        }
    }
}

impl<A, T: Default + 'static, E> Default for Tolerance<A, T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, T, E> Clone for Tolerance<A, T, E> {
    fn clone(&self) -> Self {
        Self {
            substitute: self.substitute.clone(),
            handler: self.handler.clone(),
            filter: self.filter.clone(),
            switch: self.switch.clone(),
        }
    }
}

impl<A, T, E> fmt::Debug for Tolerance<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tolerance")
            .field("substitute", &self.substitute)
            .field("has_handler", &self.handler.is_some())
            .field("filter", &self.filter)
            .field("switch", &self.switch)
            .finish()
    }
}

/// Wrap `target` with `config`.
pub fn wrap<F, A, T, E>(target: F, config: Tolerance<A, T, E>) -> Tolerant<F, A, T, E>
where
    F: Fn(A) -> Result<T, E>,
{
    config.wrap(target)
}

/// Wrap `target` so every error is suppressed and replaced by `T::default()`.
pub fn tolerate<F, A, T, E>(target: F) -> Tolerant<F, A, T, E>
where
    F: Fn(A) -> Result<T, E>,
    T: Default + 'static,
{
    Tolerance::new().wrap(target)
}

/// A callable whose selected errors are suppressed.
///
/// Any error type can be wrapped; no `Display` or `Debug` is required. The
/// suppression event records the error's type name, so install a handler with
/// [`Tolerance::on_error`] to log the error itself.
pub struct Tolerant<F, A, T, E> {
    target: F,
    config: Tolerance<A, T, E>,
}

impl<F, A, T, E> Tolerant<F, A, T, E>
where
    F: Fn(A) -> Result<T, E>,
{
    /// Invoke the target with `args`.
    ///
    /// # Errors
    /// Returns the target's error when it is not suppressed, or the error
    /// handler's error when the handler fails.
    pub fn call(&self, args: A) -> Result<T, E> {
        let pending = (!config::is_disabled() && self.config.switch.is_on(&args))
            .then(|| self.config.substitute.prepare(&args));

        let err = match (self.target)(args) {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        match pending {
            Some(pending) if self.config.filter.matches(&err) => {
                if let Some(handler) = &self.config.handler {
                    handler(&err)?;
                }
                log_suppressed::<F, E>();
                Ok(pending.produce())
            }
            _ => Err(err),
        }
    }

    /// Turn the wrapper into a plain closure with the target's calling convention.
    pub fn into_fn(self) -> impl Fn(A) -> Result<T, E> {
        move |args| self.call(args)
    }
}

impl<F, A, T, E> Tolerant<F, A, T, E> {
    /// The wrapped target.
    pub fn target(&self) -> &F {
        &self.target
    }

    /// The configuration the target was wrapped with.
    pub fn tolerance(&self) -> &Tolerance<A, T, E> {
        &self.config
    }

    /// Unwrap, returning the original target.
    pub fn into_inner(self) -> F {
        self.target
    }
}

impl<F: Clone, A, T, E> Clone for Tolerant<F, A, T, E> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            config: self.config.clone(),
        }
    }
}

impl<F, A, T, E> fmt::Debug for Tolerant<F, A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tolerant")
            .field("target", &type_name::<F>())
            .field("tolerance", &self.config)
            .finish()
    }
}

fn log_suppressed<F, E>() {
    let Some(level) = config::suppression_log_level() else {
        return;
    };
    let callable = type_name::<F>();
    let error_type = type_name::<E>();

    match level {
        LogLevel::Trace => tracing::trace!(callable, error_type, "suppressed error"),
        LogLevel::Debug => tracing::debug!(callable, error_type, "suppressed error"),
        LogLevel::Info => tracing::info!(callable, error_type, "suppressed error"),
        LogLevel::Warn => tracing::warn!(callable, error_type, "suppressed error"),
        LogLevel::Error => tracing::error!(callable, error_type, "suppressed error"),
    }
}
