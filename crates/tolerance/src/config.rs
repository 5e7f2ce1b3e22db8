//! Process-wide tolerance settings.
//!
//! Every [`Tolerant`](crate::Tolerant) consults these settings on each call:
//! the kill switch that turns all wrappers back into plain pass-throughs, and
//! how suppressed errors are reported through `tracing`.
//!
//! Settings can be changed directly ([`set_disabled`]) or loaded from a TOML
//! file with environment variable overrides and installed with
//! [`ToleranceConfig::apply`].

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Environment variable overriding [`ToleranceConfig::disabled`].
pub const ENV_DISABLED: &str = "TOLERANCE_DISABLED";
/// Environment variable overriding [`ToleranceConfig::log_suppressed`].
pub const ENV_LOG_SUPPRESSED: &str = "TOLERANCE_LOG_SUPPRESSED";
/// Environment variable overriding [`ToleranceConfig::log_level`].
pub const ENV_LOG_LEVEL: &str = "TOLERANCE_LOG_LEVEL";

static DISABLED: AtomicBool = AtomicBool::new(false);
static LOG_SUPPRESSED: AtomicBool = AtomicBool::new(true);
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Debug as u8);

/// Disable or re-enable tolerance for every wrapper in the process.
///
/// While disabled, wrapped callables propagate every error their target
/// returns. Useful in test suites that want failures to surface.
pub fn set_disabled(disabled: bool) {
    DISABLED.store(disabled, Ordering::SeqCst);
    tracing::debug!(disabled, "tolerance kill switch updated");
}

/// Whether tolerance is currently disabled process-wide.
#[must_use]
pub fn is_disabled() -> bool {
    DISABLED.load(Ordering::SeqCst)
}

/// Level suppressed errors are logged at, or `None` when suppression logging is off.
pub(crate) fn suppression_log_level() -> Option<LogLevel> {
    if LOG_SUPPRESSED.load(Ordering::Relaxed) {
        Some(LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed)))
    } else {
        None
    }
}

/// Severity used when reporting suppressed errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    /// `tracing::Level::TRACE`
    Trace = 0,
    /// `tracing::Level::DEBUG`
    #[default]
    Debug = 1,
    /// `tracing::Level::INFO`
    Info = 2,
    /// `tracing::Level::WARN`
    Warn = 3,
    /// `tracing::Level::ERROR`
    Error = 4,
}

impl LogLevel {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Trace,
            2 => Self::Info,
            3 => Self::Warn,
            4 => Self::Error,
            _ => Self::Debug,
        }
    }

    /// Lowercase name, as written in TOML.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(ConfigError::invalid(
                "log_level",
                format!("expected one of trace, debug, info, warn, error, got '{other}'"),
            )),
        }
    }
}

/// Tolerance settings.
///
/// Missing keys take their defaults, so an empty file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    /// Propagate every error instead of suppressing
    pub disabled: bool,
    /// Emit a `tracing` event for each suppressed error
    pub log_suppressed: bool,
    /// Level of the suppression event
    pub log_level: LogLevel,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            log_suppressed: true,
            log_level: LogLevel::Debug,
        }
    }
}

impl ToleranceConfig {
    /// Parse settings from a TOML document.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load settings from `path`, falling back to defaults if the file does not exist.
    ///
    /// # Errors
    /// Returns error if:
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();

        if path.exists() {
            tracing::debug!("Loading tolerance config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            Self::from_toml_str(&contents)
        } else {
            tracing::debug!("Tolerance config not found at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load settings from `path` and apply environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `TOLERANCE_DISABLED`: Override the kill switch (true/false)
    /// - `TOLERANCE_LOG_SUPPRESSED`: Override suppression logging (true/false)
    /// - `TOLERANCE_LOG_LEVEL`: Override the suppression log level
    pub fn load_with_env(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let mut config = Self::load(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup, using the `TOLERANCE_*` variable names.
    ///
    /// Unset keys leave the current value alone; unparsable values are rejected.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_DISABLED) {
            self.disabled = parse_flag(ENV_DISABLED, &val)?;
            tracing::debug!("Override disabled from env: {}", self.disabled);
        }

        if let Some(val) = lookup(ENV_LOG_SUPPRESSED) {
            self.log_suppressed = parse_flag(ENV_LOG_SUPPRESSED, &val)?;
            tracing::debug!("Override log_suppressed from env: {}", self.log_suppressed);
        }

        if let Some(val) = lookup(ENV_LOG_LEVEL) {
            self.log_level = val.parse()?;
            tracing::debug!("Override log_level from env: {}", self.log_level);
        }

        Ok(())
    }

    /// Save settings to `path`, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        tracing::debug!("Saving tolerance config to {}", path.display());
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Install these settings process-wide.
    pub fn apply(&self) {
        LOG_SUPPRESSED.store(self.log_suppressed, Ordering::Relaxed);
        LOG_LEVEL.store(self.log_level as u8, Ordering::Relaxed);
        set_disabled(self.disabled);
    }

    /// Snapshot of the settings currently installed.
    #[must_use]
    pub fn current() -> Self {
        Self {
            disabled: is_disabled(),
            log_suppressed: LOG_SUPPRESSED.load(Ordering::Relaxed),
            log_level: LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed)),
        }
    }
}

fn parse_flag(field: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::invalid(
            field,
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

// Tests here must not call `apply` or `set_disabled`: the unit test binary
// shares the process-wide settings with the wrapper tests.
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ToleranceConfig::default();
        assert!(!config.disabled);
        assert!(config.log_suppressed);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
log_level = "warn"
"#;

        let config = ToleranceConfig::from_toml_str(toml_str).expect("parse partial config");
        assert_eq!(config.log_level, LogLevel::Warn);
        // These should be defaults
        assert!(!config.disabled);
        assert!(config.log_suppressed);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let err = ToleranceConfig::from_toml_str(r#"log_level = "loud""#).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("nested").join("tolerance.toml");

        let config = ToleranceConfig {
            disabled: true,
            log_suppressed: false,
            log_level: LogLevel::Error,
        };
        config.save(&config_path).expect("save config");

        let loaded = ToleranceConfig::load(&config_path).expect("load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = TempDir::new().expect("create temp dir");
        let loaded = ToleranceConfig::load(tmp.path().join("absent.toml")).expect("load config");
        assert_eq!(loaded, ToleranceConfig::default());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_DISABLED, "yes"),
            (ENV_LOG_SUPPRESSED, "0"),
            (ENV_LOG_LEVEL, "INFO"),
        ]
        .into_iter()
        .collect();

        let mut config = ToleranceConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| (*v).to_string()))
            .expect("apply overrides");

        assert!(config.disabled);
        assert!(!config.log_suppressed);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_override_rejects_garbage() {
        let mut config = ToleranceConfig::default();
        let err = config
            .apply_overrides(|key| (key == ENV_DISABLED).then(|| "maybe".to_string()))
            .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == ENV_DISABLED));
        assert!(!config.disabled);
    }

    #[test]
    fn test_unset_overrides_keep_values() {
        let mut config = ToleranceConfig {
            log_level: LogLevel::Trace,
            ..ToleranceConfig::default()
        };
        config.apply_overrides(|_| None).expect("apply overrides");
        assert_eq!(config.log_level, LogLevel::Trace);
    }

    #[test]
    fn test_log_level_round_trip_through_u8() {
        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ] {
            assert_eq!(LogLevel::from_u8(level as u8), level);
            assert_eq!(level.as_str().parse::<LogLevel>().expect("parse level"), level);
        }
    }
}
