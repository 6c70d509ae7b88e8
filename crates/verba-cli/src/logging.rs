// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Tracing subscriber setup.
//!
//! Filter priority, highest first: `VERBA_LOG`, `RUST_LOG`, the `[log] level`
//! config value, then `warn`. An unparseable directive string falls through to
//! the next source instead of failing startup.

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const FALLBACK_LEVEL: &str = "warn";

/// Where formatted events go. The TUI owns the terminal, so interactive runs
/// log to a file and only one-shot commands write to stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterSource {
    VerbaLog,
    RustLog,
    Config,
    Fallback,
}

pub fn init(configured_level: &str, target: &LogTarget) -> Result<()> {
    let (source, directives) = select_directives(
        std::env::var("VERBA_LOG").ok(),
        std::env::var("RUST_LOG").ok(),
        configured_level,
    );
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL));

    match target {
        LogTarget::Stderr => {
            let stderr_is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_ansi(stderr_is_tty)
                        .with_target(true)
                        .without_time()
                        .compact(),
                )
                .try_init()
                .map_err(|error| anyhow!("install tracing subscriber: {error}"))?;
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(true)
                        .with_thread_names(true),
                )
                .try_init()
                .map_err(|error| anyhow!("install tracing subscriber: {error}"))?;
        }
    }

    tracing::debug!(?source, %directives, "logging initialized");
    Ok(())
}

fn select_directives(
    verba_log: Option<String>,
    rust_log: Option<String>,
    configured: &str,
) -> (FilterSource, String) {
    let candidates = [
        (FilterSource::VerbaLog, verba_log),
        (FilterSource::RustLog, rust_log),
        (FilterSource::Config, Some(configured.to_owned())),
    ];
    candidates
        .into_iter()
        .filter_map(|(source, value)| value.map(|value| (source, value)))
        .find(|(_, value)| !value.trim().is_empty() && EnvFilter::try_new(value).is_ok())
        .unwrap_or((FilterSource::Fallback, FALLBACK_LEVEL.to_owned()))
}
