// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! File logging. The terminal belongs to the UI, so every event goes to a
//! log file through a non-blocking writer.

use anyhow::{Context, Result};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "UMAEKI_LOG";

/// `UMAEKI_LOG` wins over the configured level when it is set and non-blank.
pub fn filter_directive(env_value: Option<String>, configured: &str) -> String {
    env_value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| configured.to_owned())
}

pub fn directive_from_env(configured: &str) -> String {
    filter_directive(env::var(LOG_ENV).ok(), configured)
}

/// Installs the global subscriber. Keep the guard alive until exit or
/// buffered lines are lost.
pub fn init(path: &Path, directive: &str) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_new(directive).with_context(|| {
        format!("invalid log filter {directive:?}; set {LOG_ENV} or [log].level to a level such as info")
    })?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {}; set [log].path to a writable file",
                path.display()
            )
        })?;

    let (writer, guard) = tracing_appender::non_blocking(file);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_line_number(true)
        .with_writer(writer)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .try_init()
        .context("install log subscriber")?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::{filter_directive, init};
    use anyhow::Result;

    #[test]
    fn env_value_overrides_configured_level() {
        assert_eq!(filter_directive(Some("debug".to_owned()), "info"), "debug");
        assert_eq!(filter_directive(Some("  ".to_owned()), "warn"), "warn");
        assert_eq!(filter_directive(None, "info"), "info");
    }

    #[test]
    fn invalid_directive_is_rejected_before_touching_disk() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("umaeki.log");
        let error = init(&path, "umaeki=loud").expect_err("bad directive");
        assert!(format!("{error:#}").contains("invalid log filter"));
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn events_reach_the_log_file() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("logs").join("umaeki.log");
        let guard = init(&path, "info")?;
        tracing::info!(rows = 3, "dataset loaded");
        tracing::debug!("filtered out");
        drop(guard);

        let written = std::fs::read_to_string(&path)?;
        assert!(written.contains("dataset loaded"));
        assert!(written.contains("rows=3"));
        assert!(!written.contains("filtered out"));
        Ok(())
    }
}
