use log::{debug, info};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_API_HOST: &str = "localhost";
const DEFAULT_API_PORT: u16 = 5000;
const DEFAULT_API_PREFIX: &str = "/api";
const DEFAULT_LIST_POLL_INTERVAL_MS: u64 = 10_000;
const DEFAULT_DETAIL_POLL_INTERVAL_MS: u64 = 3_000;
const DEFAULT_HISTORY_LIMIT: usize = 50;
const DEFAULT_CHART_CAPACITY: usize = 40;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api_host: String,
    pub api_port: u16,
    pub api_prefix: String,
    pub list_poll_interval: Duration,
    pub detail_poll_interval: Duration,
    /// Number of historical readings loaded when a detail view opens
    pub history_limit: usize,
    /// Samples kept per metric chart
    pub chart_capacity: usize,
    pub auto_refresh: bool,
    pub company_id: Option<i64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            api_port: DEFAULT_API_PORT,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            list_poll_interval: Duration::from_millis(DEFAULT_LIST_POLL_INTERVAL_MS),
            detail_poll_interval: Duration::from_millis(DEFAULT_DETAIL_POLL_INTERVAL_MS),
            history_limit: DEFAULT_HISTORY_LIMIT,
            chart_capacity: DEFAULT_CHART_CAPACITY,
            auto_refresh: true,
            company_id: None,
        }
    }
}

impl DashboardConfig {
    pub fn new() -> Result<Self, ConfigError> {
        // Load environment variables
        dotenv::dotenv().ok();

        let config = Self::from_lookup(|key| env::var(key).ok())?;
        info!(
            "API at {}:{}{} (list every {:?}, detail every {:?})",
            config.api_host,
            config.api_port,
            config.api_prefix,
            config.list_poll_interval,
            config.detail_poll_interval
        );
        Ok(config)
    }

    /// Build a configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_host = lookup("API_HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or(defaults.api_host);

        let api_prefix = match lookup("API_PREFIX") {
            Some(prefix) => normalize_prefix(&prefix),
            None => defaults.api_prefix,
        };

        let list_ms = parse_var(&lookup, "LIST_POLL_INTERVAL_MS")?
            .unwrap_or(DEFAULT_LIST_POLL_INTERVAL_MS);
        let detail_ms = parse_var(&lookup, "DETAIL_POLL_INTERVAL_MS")?
            .unwrap_or(DEFAULT_DETAIL_POLL_INTERVAL_MS);
        let history_limit = parse_var(&lookup, "HISTORY_LIMIT")?.unwrap_or(DEFAULT_HISTORY_LIMIT);
        let chart_capacity =
            parse_var(&lookup, "CHART_CAPACITY")?.unwrap_or(DEFAULT_CHART_CAPACITY);

        require_positive("LIST_POLL_INTERVAL_MS", list_ms)?;
        require_positive("DETAIL_POLL_INTERVAL_MS", detail_ms)?;
        require_positive("HISTORY_LIMIT", history_limit as u64)?;
        require_positive("CHART_CAPACITY", chart_capacity as u64)?;

        let auto_refresh = match lookup("AUTO_REFRESH") {
            Some(raw) => parse_bool("AUTO_REFRESH", &raw)?,
            None => defaults.auto_refresh,
        };

        let config = DashboardConfig {
            api_host,
            api_port: parse_var(&lookup, "API_PORT")?.unwrap_or(DEFAULT_API_PORT),
            api_prefix,
            list_poll_interval: Duration::from_millis(list_ms),
            detail_poll_interval: Duration::from_millis(detail_ms),
            history_limit,
            chart_capacity,
            auto_refresh,
            company_id: parse_var(&lookup, "COMPANY_ID")?,
        };
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar {
                key: key.to_string(),
                value: raw,
            }),
        None => Ok(None),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidVar {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn require_positive(key: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Zero(key.to_string()));
    }
    Ok(())
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
