//! Integration tests for process-wide tolerance settings
//!
//! Everything touching the global kill switch lives in a single test so
//! parallel test threads never observe each other's settings.

use std::io;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tolerance::{is_disabled, set_disabled, tolerate, LogLevel, Tolerance, ToleranceConfig};
use tracing::Level;

fn missing_file(path: &str) -> Result<String, io::Error> {
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("{path}: no such file"),
    ))
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` under a subscriber capped at `max_level` and return what it printed.
fn capture_logs(max_level: Level, f: impl FnOnce()) -> String {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(max_level)
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, f);
    let bytes = captured.0.lock().unwrap().clone();
    String::from_utf8(bytes).expect("log output is utf-8")
}

fn suppression_lines(output: &str) -> Vec<&str> {
    output
        .lines()
        .filter(|line| line.contains("suppressed error"))
        .collect()
}

#[test]
fn test_global_settings_flow() {
    let wrapped = Tolerance::new().substitute("fallback".to_string()).wrap(missing_file);
    let silent = tolerate(missing_file);

    // Defaults: tolerant
    assert!(!is_disabled());
    assert_eq!(wrapped.call("motd").unwrap(), "fallback");
    assert_eq!(silent.call("motd").unwrap(), "");

    // Kill switch: every error propagates, including from existing wrappers
    set_disabled(true);
    assert!(is_disabled());
    let err = wrapped.call("motd").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
    assert_eq!(err.to_string(), "motd: no such file");
    assert!(silent.call("motd").is_err());

    set_disabled(false);
    assert_eq!(wrapped.call("motd").unwrap(), "fallback");

    // Config file round trip, then install it
    let tmp = TempDir::new().expect("create temp dir");
    let config_path = tmp.path().join("tolerance.toml");
    std::fs::write(
        &config_path,
        "disabled = true\nlog_suppressed = false\nlog_level = \"warn\"\n",
    )
    .expect("write config file");

    let config = ToleranceConfig::load(&config_path).expect("load config");
    assert!(config.disabled);
    assert_eq!(config.log_level, LogLevel::Warn);

    config.apply();
    assert_eq!(ToleranceConfig::current(), config);
    assert!(wrapped.call("motd").is_err());

    // Environment overrides win over the file
    std::env::set_var("TOLERANCE_DISABLED", "false");
    std::env::set_var("TOLERANCE_LOG_LEVEL", "error");

    let config = ToleranceConfig::load_with_env(&config_path).expect("load config with env");
    assert!(!config.disabled);
    assert!(!config.log_suppressed);
    assert_eq!(config.log_level, LogLevel::Error);

    config.apply();
    assert!(!is_disabled());
    assert_eq!(wrapped.call("motd").unwrap(), "fallback");

    std::env::remove_var("TOLERANCE_DISABLED");
    std::env::remove_var("TOLERANCE_LOG_LEVEL");

    // Suppression logging can be switched off
    ToleranceConfig {
        log_suppressed: false,
        ..ToleranceConfig::default()
    }
    .apply();
    let output = capture_logs(Level::TRACE, || {
        assert_eq!(wrapped.call("motd").unwrap(), "fallback");
    });
    assert!(suppression_lines(&output).is_empty(), "unexpected log: {output}");

    // Configured level is honored: debug events fall below an INFO cap ...
    ToleranceConfig::default().apply();
    let output = capture_logs(Level::INFO, || {
        assert_eq!(wrapped.call("motd").unwrap(), "fallback");
    });
    assert!(suppression_lines(&output).is_empty(), "unexpected log: {output}");

    // ... while warn events pass it, tagged WARN
    ToleranceConfig {
        log_level: LogLevel::Warn,
        ..ToleranceConfig::default()
    }
    .apply();
    let output = capture_logs(Level::INFO, || {
        assert_eq!(wrapped.call("motd").unwrap(), "fallback");
    });
    let lines = suppression_lines(&output);
    assert_eq!(lines.len(), 1, "expected one suppression event: {output}");
    assert!(lines[0].contains("WARN"), "not logged at warn: {}", lines[0]);

    ToleranceConfig::default().apply();
    assert_eq!(ToleranceConfig::current(), ToleranceConfig::default());
}
