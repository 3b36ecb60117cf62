// ABOUTME: Client configuration resolved from environment variables and explicit overrides
// ABOUTME: Validates option ranges at construction so invalid settings fail before any request
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::errors::{GuruFocusError, GuruFocusResult};
use std::env;
use std::path::PathBuf;

/// Environment variable prefix for all recognized options.
pub const ENV_PREFIX: &str = "GURUFOCUS_";

/// Default base URL of the GuruFocus public API.
pub const DEFAULT_BASE_URL: &str = "https://api.gurufocus.com/public/user";

/// Default on-disk cache location, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = ".cache/gurufocus";

const MIB: u64 = 1024 * 1024;

/// Log output format for the observability layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output for development.
    #[default]
    Console,
    /// Structured JSON output for production.
    Json,
}

impl LogFormat {
    /// Parse from string with fallback to console output.
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Console,
        }
    }
}

/// Resolved configuration for [`crate::client::GuruFocusClient`].
///
/// Built via [`GuruFocusConfig::builder`], which layers explicit overrides on
/// top of `GURUFOCUS_*` environment variables on top of defaults. Ranges are
/// validated once in [`GuruFocusConfigBuilder::build`].
#[derive(Debug, Clone)]
pub struct GuruFocusConfig {
    /// API token, used as a path segment in every request URL.
    pub api_token: String,
    /// Base URL prefix for endpoint paths.
    pub base_url: String,
    /// Per-request HTTP timeout in seconds (1–300).
    pub timeout_seconds: f64,
    /// Additional attempts after the first (0–10).
    pub max_retries: u32,
    /// Base delay for exponential backoff in seconds (0.1–60).
    pub retry_delay_seconds: f64,
    /// Whether response caching is enabled.
    pub cache_enabled: bool,
    /// Directory for persistent cache storage.
    pub cache_dir: PathBuf,
    /// Resident cache size ceiling in bytes (>= 1 MiB).
    pub cache_size_limit_bytes: u64,
    /// Whether local rate limiting is enabled.
    pub rate_limit_enabled: bool,
    /// Token refill rate in requests per minute (0.1–1000).
    pub rate_limit_rpm: f64,
    /// Daily request ceiling (0 = unlimited).
    pub rate_limit_daily: u64,
    /// Token bucket capacity (1–100).
    pub rate_limit_burst: u32,
    /// Whether local usage tracking is enabled.
    pub usage_tracking_enabled: bool,
    /// Seconds between authoritative quota syncs.
    pub usage_sync_interval_seconds: u64,
    /// Warn when the remaining-quota estimate drops below this percentage.
    pub usage_warn_percent: f64,
    /// Expected daily quota, the base for the warning threshold.
    pub usage_daily_limit: u64,
    /// Log level for the observability layer.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
}

impl GuruFocusConfig {
    /// Start building a configuration from environment defaults.
    #[must_use]
    pub fn builder() -> GuruFocusConfigBuilder {
        GuruFocusConfigBuilder::default()
    }

    /// Resolve entirely from the environment.
    pub fn from_env() -> GuruFocusResult<Self> {
        Self::builder().build()
    }
}

/// Builder layering explicit overrides over `GURUFOCUS_*` environment values.
#[derive(Debug, Clone, Default)]
pub struct GuruFocusConfigBuilder {
    api_token: Option<String>,
    base_url: Option<String>,
    timeout_seconds: Option<f64>,
    max_retries: Option<u32>,
    retry_delay_seconds: Option<f64>,
    cache_enabled: Option<bool>,
    cache_dir: Option<PathBuf>,
    cache_size_limit_bytes: Option<u64>,
    rate_limit_enabled: Option<bool>,
    rate_limit_rpm: Option<f64>,
    rate_limit_daily: Option<u64>,
    rate_limit_burst: Option<u32>,
    usage_tracking_enabled: Option<bool>,
    usage_sync_interval_seconds: Option<u64>,
    usage_warn_percent: Option<f64>,
    usage_daily_limit: Option<u64>,
    log_level: Option<String>,
    log_format: Option<LogFormat>,
}

impl GuruFocusConfigBuilder {
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    #[must_use]
    pub const fn timeout_seconds(mut self, seconds: f64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    #[must_use]
    pub const fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    #[must_use]
    pub const fn retry_delay_seconds(mut self, seconds: f64) -> Self {
        self.retry_delay_seconds = Some(seconds);
        self
    }

    #[must_use]
    pub const fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub const fn cache_size_limit_bytes(mut self, bytes: u64) -> Self {
        self.cache_size_limit_bytes = Some(bytes);
        self
    }

    #[must_use]
    pub const fn rate_limit_enabled(mut self, enabled: bool) -> Self {
        self.rate_limit_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub const fn rate_limit_rpm(mut self, rpm: f64) -> Self {
        self.rate_limit_rpm = Some(rpm);
        self
    }

    #[must_use]
    pub const fn rate_limit_daily(mut self, daily: u64) -> Self {
        self.rate_limit_daily = Some(daily);
        self
    }

    #[must_use]
    pub const fn rate_limit_burst(mut self, burst: u32) -> Self {
        self.rate_limit_burst = Some(burst);
        self
    }

    #[must_use]
    pub const fn usage_tracking_enabled(mut self, enabled: bool) -> Self {
        self.usage_tracking_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub const fn usage_sync_interval_seconds(mut self, seconds: u64) -> Self {
        self.usage_sync_interval_seconds = Some(seconds);
        self
    }

    #[must_use]
    pub const fn usage_warn_percent(mut self, percent: f64) -> Self {
        self.usage_warn_percent = Some(percent);
        self
    }

    #[must_use]
    pub const fn usage_daily_limit(mut self, limit: u64) -> Self {
        self.usage_daily_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    #[must_use]
    pub const fn log_format(mut self, format: LogFormat) -> Self {
        self.log_format = Some(format);
        self
    }

    /// Resolve the final configuration and validate every option range.
    pub fn build(self) -> GuruFocusResult<GuruFocusConfig> {
        let api_token = self
            .api_token
            .or_else(|| env_string("API_TOKEN"))
            .unwrap_or_default();
        if api_token.trim().is_empty() {
            return Err(GuruFocusError::missing_token());
        }

        let config = GuruFocusConfig {
            api_token,
            base_url: self
                .base_url
                .or_else(|| env_string("BASE_URL"))
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            timeout_seconds: resolve(self.timeout_seconds, "TIMEOUT_SECONDS", 30.0)?,
            max_retries: resolve(self.max_retries, "MAX_RETRIES", 3)?,
            retry_delay_seconds: resolve(self.retry_delay_seconds, "RETRY_DELAY_SECONDS", 1.0)?,
            cache_enabled: resolve(self.cache_enabled, "CACHE_ENABLED", true)?,
            cache_dir: expand_home(
                self.cache_dir
                    .or_else(|| env_string("CACHE_DIR").map(PathBuf::from))
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
            ),
            cache_size_limit_bytes: resolve(
                self.cache_size_limit_bytes,
                "CACHE_SIZE_LIMIT_BYTES",
                1024 * MIB,
            )?,
            rate_limit_enabled: resolve(self.rate_limit_enabled, "RATE_LIMIT_ENABLED", true)?,
            rate_limit_rpm: resolve(self.rate_limit_rpm, "RATE_LIMIT_RPM", 10.0)?,
            rate_limit_daily: resolve(self.rate_limit_daily, "RATE_LIMIT_DAILY", 0)?,
            rate_limit_burst: resolve(self.rate_limit_burst, "RATE_LIMIT_BURST", 5)?,
            usage_tracking_enabled: resolve(
                self.usage_tracking_enabled,
                "USAGE_TRACKING_ENABLED",
                true,
            )?,
            usage_sync_interval_seconds: resolve(
                self.usage_sync_interval_seconds,
                "USAGE_SYNC_INTERVAL_SECONDS",
                300,
            )?,
            usage_warn_percent: resolve(self.usage_warn_percent, "USAGE_WARN_PERCENT", 10.0)?,
            usage_daily_limit: resolve(self.usage_daily_limit, "USAGE_DAILY_LIMIT", 10_000)?,
            log_level: self
                .log_level
                .or_else(|| env_string("LOG_LEVEL"))
                .unwrap_or_else(|| "INFO".to_owned()),
            log_format: self.log_format.unwrap_or_else(|| {
                env_string("LOG_FORMAT")
                    .map(|s| LogFormat::from_str_or_default(&s))
                    .unwrap_or_default()
            }),
        };

        if url::Url::parse(&config.base_url).is_err() {
            return Err(GuruFocusError::Validation(format!(
                "base_url is not a valid URL: {}",
                config.base_url
            )));
        }
        validate_range("timeout_seconds", config.timeout_seconds, 1.0, 300.0)?;
        validate_range("max_retries", f64::from(config.max_retries), 0.0, 10.0)?;
        validate_range(
            "retry_delay_seconds",
            config.retry_delay_seconds,
            0.1,
            60.0,
        )?;
        validate_range("rate_limit_rpm", config.rate_limit_rpm, 0.1, 1000.0)?;
        validate_range(
            "rate_limit_burst",
            f64::from(config.rate_limit_burst),
            1.0,
            100.0,
        )?;
        if config.cache_size_limit_bytes < MIB {
            return Err(GuruFocusError::Validation(format!(
                "cache_size_limit_bytes must be at least {MIB} bytes (1 MiB), got {}",
                config.cache_size_limit_bytes
            )));
        }
        validate_range(
            "usage_warn_percent",
            config.usage_warn_percent,
            0.0,
            100.0,
        )?;

        Ok(config)
    }
}

/// Expand a leading `~/` to the user's home directory.
fn expand_home(path: PathBuf) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(stripped) => {
            dirs::home_dir().map_or_else(|| path.clone(), |home| home.join(stripped))
        }
        Err(_) => path,
    }
}

fn validate_range(option: &str, value: f64, min: f64, max: f64) -> GuruFocusResult<()> {
    if value < min || value > max {
        return Err(GuruFocusError::Validation(format!(
            "{option} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

fn env_string(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}{name}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Resolve an option: explicit override, then environment, then default.
fn resolve<T: EnvParse>(explicit: Option<T>, name: &str, default: T) -> GuruFocusResult<T> {
    if let Some(value) = explicit {
        return Ok(value);
    }
    match env_string(name) {
        Some(raw) => T::parse_env(&raw).ok_or_else(|| {
            GuruFocusError::Validation(format!(
                "invalid value for {ENV_PREFIX}{name}: {raw:?}"
            ))
        }),
        None => Ok(default),
    }
}

/// Minimal parsing contract for environment-sourced option values.
trait EnvParse: Sized {
    fn parse_env(raw: &str) -> Option<Self>;
}

impl EnvParse for bool {
    fn parse_env(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }
}

impl EnvParse for f64 {
    fn parse_env(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl EnvParse for u32 {
    fn parse_env(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl EnvParse for u64 {
    fn parse_env(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn base() -> GuruFocusConfigBuilder {
        GuruFocusConfig::builder().api_token("test-token")
    }

    #[test]
    #[serial]
    fn defaults_are_applied() {
        let config = base().build().unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!((config.timeout_seconds - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.max_retries, 3);
        assert!(config.cache_enabled);
        assert_eq!(config.rate_limit_burst, 5);
        assert_eq!(config.usage_daily_limit, 10_000);
        assert_eq!(config.log_format, LogFormat::Console);
    }

    #[test]
    #[serial]
    fn missing_token_is_authentication_error() {
        env::remove_var("GURUFOCUS_API_TOKEN");
        let err = GuruFocusConfig::builder().build().unwrap_err();
        assert!(matches!(err, GuruFocusError::Authentication(_)));
    }

    #[test]
    fn out_of_range_timeout_is_rejected() {
        let err = base().timeout_seconds(500.0).build().unwrap_err();
        assert!(matches!(err, GuruFocusError::Validation(msg) if msg.contains("timeout_seconds")));
    }

    #[test]
    fn out_of_range_burst_is_rejected() {
        let err = base().rate_limit_burst(0).build().unwrap_err();
        assert!(
            matches!(err, GuruFocusError::Validation(msg) if msg.contains("rate_limit_burst"))
        );
    }

    #[test]
    fn tiny_cache_cap_is_rejected() {
        let err = base().cache_size_limit_bytes(1024).build().unwrap_err();
        assert!(matches!(err, GuruFocusError::Validation(_)));
    }

    #[test]
    fn log_format_parses_loosely() {
        assert_eq!(LogFormat::from_str_or_default("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_str_or_default("console"), LogFormat::Console);
        assert_eq!(LogFormat::from_str_or_default("other"), LogFormat::Console);
    }
}
