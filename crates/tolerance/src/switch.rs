//! Per-call switch deciding whether a call is tolerant at all.
//!
//! Lets a single wrapped function serve both callers that want failures
//! swallowed and callers that want them reported, keyed on the call's own
//! arguments (typically a `fail_silently` flag).

use std::fmt;
use std::sync::Arc;

type Decide<A> = Arc<dyn Fn(&A) -> Option<bool> + Send + Sync>;

/// Decides, from a call's arguments, whether that call suppresses errors.
///
/// A decision is either read from the arguments (a flag the caller passed) or
/// falls back to the switch's default. [`reversed`](Self::reversed) inverts
/// only flags read from the arguments; the default is never inverted.
pub struct Switch<A> {
    decide: Option<Decide<A>>,
    default: bool,
    reversed: bool,
}

impl<A> Switch<A> {
    /// Every call is tolerant. This is the default.
    #[must_use]
    pub fn always() -> Self {
        Self {
            decide: None,
            default: true,
            reversed: false,
        }
    }

    /// Calls are tolerant when `decide` returns `true`.
    pub fn by<P>(decide: P) -> Self
    where
        P: Fn(&A) -> bool + Send + Sync + 'static,
    {
        Self::by_flag(move |args: &A| Some(decide(args)), true)
    }

    /// Calls are tolerant according to an optional flag, using `default` when
    /// the flag is absent.
    pub fn by_flag<P>(flag: P, default: bool) -> Self
    where
        P: Fn(&A) -> Option<bool> + Send + Sync + 'static,
    {
        Self {
            decide: Some(Arc::new(flag)),
            default,
            reversed: false,
        }
    }

    /// Invert flags read from the arguments, e.g. for a `raise_errors` style
    /// flag where `true` means "do not suppress". Absent flags still use the default.
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.reversed = !self.reversed;
        self
    }

    /// Whether a call made with `args` is tolerant.
    pub fn is_on(&self, args: &A) -> bool {
        match self.decide.as_ref().and_then(|decide| decide(args)) {
            Some(flag) => flag != self.reversed,
            None => self.default,
        }
    }
}

impl<A> Default for Switch<A> {
    fn default() -> Self {
        Self::always()
    }
}

impl<A> Clone for Switch<A> {
    fn clone(&self) -> Self {
        Self {
            decide: self.decide.clone(),
            default: self.default,
            reversed: self.reversed,
        }
    }
}

impl<A> fmt::Debug for Switch<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Switch")
            .field("conditional", &self.decide.is_some())
            .field("default", &self.default)
            .field("reversed", &self.reversed)
            .finish()
    }
}
