//! Tolerance - make fallible functions fail silently.
//!
//! Wrapping a function produces a [`Tolerant`] callable with the same calling
//! convention. Calling it runs the target once; if the target fails with an
//! error the wrapper is configured to suppress, the error is reported to an
//! optional handler and a fallback value is returned instead.
//!
//! # Modules
//!
//! - [`wrapper`] - The [`Tolerance`] builder, [`Tolerant`] callable, [`wrap`] and [`tolerate`]
//! - [`filter`] - Which errors are suppressed ([`ErrorFilter`], [`Classify`])
//! - [`substitute`] - Fallback values and lazy producers ([`Substitute`])
//! - [`switch`] - Per-call on/off decision from the call's arguments ([`Switch`])
//! - [`config`] - Process-wide kill switch and suppression logging, TOML/env loading
//! - [`error`] - Error types for settings loading
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use tolerance::{tolerate, Tolerance};
//!
//! fn parse(input: &str) -> Result<i32, std::num::ParseIntError> {
//!     input.trim().parse()
//! }
//!
//! // Default: every error suppressed, "no value" returned.
//! let lenient = tolerate(|input: &str| parse(input).map(Some));
//! assert_eq!(lenient.call("12"), Ok(Some(12)));
//! assert_eq!(lenient.call("twelve"), Ok(None));
//!
//! // Fallback value plus an error handler.
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let with_fallback = Tolerance::new()
//!     .substitute(-1)
//!     .on_error(move |err: &std::num::ParseIntError| sink.lock().unwrap().push(err.to_string()))
//!     .wrap(parse);
//!
//! assert_eq!(with_fallback.call("42"), Ok(42));
//! assert_eq!(with_fallback.call("forty-two"), Ok(-1));
//! assert_eq!(seen.lock().unwrap().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod filter;
pub mod substitute;
pub mod switch;
pub mod wrapper;

// Re-export commonly used types
pub use config::{is_disabled, set_disabled, LogLevel, ToleranceConfig};
pub use error::{ConfigError, ConfigResult};
pub use filter::{Classify, ErrorFilter};
pub use substitute::Substitute;
pub use switch::Switch;
pub use wrapper::{tolerate, wrap, Tolerance, Tolerant};
