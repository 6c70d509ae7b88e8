// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use verba_app::{QueryOrdering, ViewKind};

pub const APP_NAME: &str = "verba";

const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_OVERSCAN: usize = 3;
const MAX_OVERSCAN: i64 = 100;
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub query: Query,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: Server::default(),
            ui: Ui::default(),
            query: Query::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub start_view: Option<String>,
    pub overscan: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Query {
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("VERBA_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set VERBA_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put values under [server], [ui], [query] and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.server.base_url {
            let trimmed = base_url.trim();
            if trimmed.is_empty() {
                bail!("server.base_url in {} must not be empty", path.display());
            }
            if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                bail!(
                    "server.base_url in {} must start with http:// or https://, got {:?}",
                    path.display(),
                    base_url
                );
            }
        }

        if let Some(timeout) = &self.server.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed.is_zero() {
                bail!(
                    "server.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(view) = &self.ui.start_view
            && ViewKind::parse(view).is_none()
        {
            bail!(
                "ui.start_view in {} must be \"query\" or \"explorer\", got {:?}",
                path.display(),
                view
            );
        }

        if let Some(overscan) = self.ui.overscan
            && !(0..=MAX_OVERSCAN).contains(&overscan)
        {
            bail!(
                "ui.overscan in {} must be between 0 and {}, got {}",
                path.display(),
                MAX_OVERSCAN,
                overscan
            );
        }

        if let Some(ordering) = &self.query.ordering
            && QueryOrdering::parse(ordering).is_none()
        {
            bail!(
                "query.ordering in {} must be \"arrival\" or \"latest\", got {:?}",
                path.display(),
                ordering
            );
        }

        if let Some(level) = &self.log.level {
            EnvFilter::try_new(level).map_err(|error| {
                anyhow!(
                    "log.level in {} is not a valid filter ({error}); use a level such as \"info\" or directives like \"verba_app=debug,warn\"",
                    path.display()
                )
            })?;
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.server
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim()
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.server.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn start_view(&self) -> ViewKind {
        self.ui
            .start_view
            .as_deref()
            .and_then(ViewKind::parse)
            .unwrap_or(ViewKind::Query)
    }

    pub fn overscan(&self) -> usize {
        self.ui
            .overscan
            .and_then(|value| usize::try_from(value).ok())
            .unwrap_or(DEFAULT_OVERSCAN)
    }

    pub fn ordering(&self) -> QueryOrdering {
        self.query
            .ordering
            .as_deref()
            .and_then(QueryOrdering::parse)
            .unwrap_or_default()
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let cache_root = dirs::cache_dir().ok_or_else(|| {
            anyhow!("cannot resolve cache directory; set [log] file to a writable path")
        })?;
        Ok(cache_root.join(APP_NAME).join("verba.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# verba config\n# Place this file at: {}\n\nversion = 1\n\n[server]\n# Retrieval service that answers /query, /get_document and /get_all_documents\nbase_url = \"{}\"\n# Per-request timeout: <N>ms, <N>s or <N>m\ntimeout = \"{}\"\n\n[ui]\n# \"query\" or \"explorer\"\nstart_view = \"query\"\n# Rows rendered above and below the visible window\noverscan = {}\n\n[query]\n# \"arrival\": the last response to arrive wins\n# \"latest\": responses older than one already shown are dropped\nordering = \"arrival\"\n\n[log]\n# Overridden by VERBA_LOG or RUST_LOG\nlevel = \"{}\"\n# Optional. Default is the platform cache dir (for example ~/.cache/verba/verba.log)\n# file = \"/absolute/path/to/verba.log\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_TIMEOUT,
            DEFAULT_OVERSCAN,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
