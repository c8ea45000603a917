use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::GatewayError;

pub const BIND_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 3030);
pub const GATE_MAX_REQUESTS: u32 = 100; // requests per window
pub const GATE_WINDOW_SECS: u64 = 15 * 60; // 15 minutes
pub const GATE_SWEEP_INTERVAL_SECS: u64 = 1;
pub const COLOR_LOOKUP_TIMEOUT_SECS: u64 = 5;
pub const COLOR_API_BASE: &str = "https://www.thecolorapi.com";
pub const QUOTA_VISUAL_LIMIT: u64 = 250; // AI visual recognition calls per month
pub const QUOTA_SEARCH_LIMIT: u64 = 1000; // product search calls per month
pub const QUOTA_DEFAULT_LIMIT: u64 = 100;
pub const VISUAL_ANALYZER_TIMEOUT_SECS: u64 = 15;

/// Runtime settings, read from the environment with the constants above as defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub gate_max_requests: u32,
    pub gate_window: Duration,
    pub gate_sweep_interval: Duration,
    pub color_lookup_timeout: Duration,
    pub color_api_base: String,
    pub quota_visual_limit: u64,
    pub quota_search_limit: u64,
    pub quota_default_limit: u64,
    /// Visual analysis endpoint. Unset means the AI path is never taken.
    pub visual_analyzer_url: Option<String>,
    pub visual_analyzer_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(BIND_ADDR),
            gate_max_requests: GATE_MAX_REQUESTS,
            gate_window: Duration::from_secs(GATE_WINDOW_SECS),
            gate_sweep_interval: Duration::from_secs(GATE_SWEEP_INTERVAL_SECS),
            color_lookup_timeout: Duration::from_secs(COLOR_LOOKUP_TIMEOUT_SECS),
            color_api_base: COLOR_API_BASE.to_string(),
            quota_visual_limit: QUOTA_VISUAL_LIMIT,
            quota_search_limit: QUOTA_SEARCH_LIMIT,
            quota_default_limit: QUOTA_DEFAULT_LIMIT,
            visual_analyzer_url: None,
            visual_analyzer_timeout: Duration::from_secs(VISUAL_ANALYZER_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source. Unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            bind_addr: parse_or(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            gate_max_requests: positive(
                "GATE_MAX_REQUESTS",
                parse_or(&lookup, "GATE_MAX_REQUESTS", defaults.gate_max_requests)?,
            )?,
            gate_window: secs_or(&lookup, "GATE_WINDOW_SECS", defaults.gate_window)?,
            gate_sweep_interval: secs_or(
                &lookup,
                "GATE_SWEEP_INTERVAL_SECS",
                defaults.gate_sweep_interval,
            )?,
            color_lookup_timeout: secs_or(
                &lookup,
                "COLOR_LOOKUP_TIMEOUT_SECS",
                defaults.color_lookup_timeout,
            )?,
            color_api_base: lookup("COLOR_API_BASE").unwrap_or(defaults.color_api_base),
            quota_visual_limit: positive(
                "QUOTA_VISUAL_LIMIT",
                parse_or(&lookup, "QUOTA_VISUAL_LIMIT", defaults.quota_visual_limit)?,
            )?,
            quota_search_limit: positive(
                "QUOTA_SEARCH_LIMIT",
                parse_or(&lookup, "QUOTA_SEARCH_LIMIT", defaults.quota_search_limit)?,
            )?,
            quota_default_limit: positive(
                "QUOTA_DEFAULT_LIMIT",
                parse_or(&lookup, "QUOTA_DEFAULT_LIMIT", defaults.quota_default_limit)?,
            )?,
            visual_analyzer_url: lookup("VISUAL_ANALYZER_URL")
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            visual_analyzer_timeout: secs_or(
                &lookup,
                "VISUAL_ANALYZER_TIMEOUT_SECS",
                defaults.visual_analyzer_timeout,
            )?,
        };
        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, GatewayError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| GatewayError::InvalidConfig {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn secs_or<F>(lookup: &F, name: &str, default: Duration) -> Result<Duration, GatewayError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = positive(name, parse_or(lookup, name, default.as_secs())?)?;
    Ok(Duration::from_secs(secs))
}

fn positive<T>(name: &str, value: T) -> Result<T, GatewayError>
where
    T: PartialOrd + Default,
{
    if value > T::default() {
        Ok(value)
    } else {
        Err(GatewayError::InvalidConfig {
            name: name.to_string(),
            reason: "must be greater than zero".to_string(),
        })
    }
}
