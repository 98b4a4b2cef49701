use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Runtime settings.
///
/// Values come from an optional TOML file and are then overridden by
/// environment variables (after `.env` has been loaded by `main`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_url: Option<String>,
    pub database_pool_size: u32,
    /// Base URL of the readsb/ultrafeeder web server
    pub feeder_url: String,
    pub poll_interval_secs: u64,
    pub data_retention_days: i64,
    pub airlines_path: PathBuf,
    pub web_interface: String,
    pub web_port: u16,
    pub cache_ttl_secs: u64,
    pub sentry_dsn: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            database_pool_size: 10,
            feeder_url: "http://localhost:8080".to_string(),
            poll_interval_secs: 30,
            data_retention_days: 30,
            airlines_path: PathBuf::from("data/airlines.json"),
            web_interface: "0.0.0.0".to_string(),
            web_port: 3000,
            cache_ttl_secs: 30,
            sentry_dsn: None,
        }
    }
}

/// Upper bound on `data_retention_days`, ten years
pub const MAX_RETENTION_DAYS: i64 = 3650;

/// Retention must keep at least one day and at most [`MAX_RETENTION_DAYS`]
pub fn validate_retention_days(days: i64) -> Result<()> {
    if !(1..=MAX_RETENTION_DAYS).contains(&days) {
        bail!(
            "Retention must be between 1 and {} days, got {}",
            MAX_RETENTION_DAYS,
            days
        );
    }
    Ok(())
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {}: {:?}", name, value))
}

impl Config {
    /// Load from `path` when given, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that parse but cannot be used
    pub fn validate(&self) -> Result<()> {
        validate_retention_days(self.data_retention_days)
            .context("Invalid DATA_RETENTION_DAYS")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {:?}", path))
    }

    /// Apply overrides from a variable lookup; empty values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("DATABASE_URL") {
            self.database_url = Some(v);
        }
        if let Some(v) = var("DATABASE_POOL_SIZE") {
            self.database_pool_size = parse_var("DATABASE_POOL_SIZE", &v)?;
        }
        if let Some(v) = var("FEEDER_URL").or_else(|| var("ULTRAFEEDER_HOST")) {
            self.feeder_url = v;
        }
        if let Some(v) = var("POLL_INTERVAL_SECS") {
            self.poll_interval_secs = parse_var("POLL_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = var("DATA_RETENTION_DAYS") {
            self.data_retention_days = parse_var("DATA_RETENTION_DAYS", &v)?;
        }
        if let Some(v) = var("AIRLINES_PATH") {
            self.airlines_path = PathBuf::from(v);
        }
        if let Some(v) = var("WEB_INTERFACE") {
            self.web_interface = v;
        }
        if let Some(v) = var("WEB_PORT") {
            self.web_port = parse_var("WEB_PORT", &v)?;
        }
        if let Some(v) = var("CACHE_TTL_SECS") {
            self.cache_ttl_secs = parse_var("CACHE_TTL_SECS", &v)?;
        }
        if let Some(v) = var("SENTRY_DSN") {
            self.sentry_dsn = Some(v);
        }
        Ok(())
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow!("DATABASE_URL must be set"))
    }

    pub fn feeder_url(&self) -> &str {
        self.feeder_url.trim_end_matches('/')
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
