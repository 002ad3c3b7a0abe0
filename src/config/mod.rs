//! Configuration handling for the application.
//!
//! Two layers: `Config` carries process-level settings (database, bind
//! address) loaded from the environment with development defaults, and
//! `AuditConfig` is the immutable per-run value handed to the orchestrator
//! and the scheduler. Audit settings are owned by the surrounding
//! configuration store; the core only reads them, and any change to a
//! scheduling field means the caller cancels and recreates the scheduled
//! task with a fresh `AuditConfig`.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable names. Public so tests and wiring code can refer
/// to them.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_AUDIT_INTERVAL_VALUE: &str = "AUDIT_INTERVAL_VALUE";
pub const ENV_AUDIT_INTERVAL_UNIT: &str = "AUDIT_INTERVAL_UNIT";
pub const ENV_AUDIT_RUN_HOUR: &str = "AUDIT_RUN_HOUR";
pub const ENV_AUDIT_RUN_MINUTE: &str = "AUDIT_RUN_MINUTE";
pub const ENV_NOTIFICATION_EMAIL: &str = "NOTIFICATION_EMAIL";
pub const ENV_SKIP_URLS: &str = "AUDIT_SKIP_URLS";
pub const ENV_AUDIT_CONCURRENCY: &str = "AUDIT_CONCURRENCY";
pub const ENV_PROBE_TIMEOUT_SECS: &str = "PROBE_TIMEOUT_SECS";

/// Default development values used when environment variables are absent.
const DEFAULT_DATABASE_URL: &str = "sqlite://linkmender.db";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_NOTIFICATION_EMAIL: &str = "admin@localhost";
const DEFAULT_CONCURRENCY: usize = 8;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

/// Cadence unit for the scheduled audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Seconds,
    Minutes,
    Hours,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl IntervalUnit {
    /// Whether the unit honors the configured run hour/minute. Sub-daily
    /// cadences just repeat from "now".
    pub fn uses_run_time(self) -> bool {
        matches!(
            self,
            Self::Daily | Self::Weekly | Self::Monthly | Self::Yearly
        )
    }

    /// Length of one scheduling period. Monthly and yearly are calendar
    /// approximations (30 and 365 days), matching the fixed cron intervals
    /// the audit has always used.
    pub fn period(self, value: u32) -> Duration {
        let base = match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 60 * 60,
            Self::Daily => 24 * 60 * 60,
            Self::Weekly => 7 * 24 * 60 * 60,
            Self::Monthly => 30 * 24 * 60 * 60,
            Self::Yearly => 365 * 24 * 60 * 60,
        };
        Duration::from_secs(base * u64::from(value))
    }
}

impl FromStr for IntervalUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "seconds" => Ok(Self::Seconds),
            "minutes" => Ok(Self::Minutes),
            "hours" => Ok(Self::Hours),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(ConfigError::InvalidValue {
                field: "interval unit",
                reason: format!("unknown unit '{other}'"),
            }),
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        };
        f.write_str(s)
    }
}

/// Immutable audit settings, passed explicitly into `Auditor::run` and the
/// scheduler rather than read ad hoc mid-run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    pub interval_value: u32,
    pub interval_unit: IntervalUnit,
    /// Hour of day (0-23) for the first run; only meaningful for daily and
    /// coarser units.
    pub run_hour: u32,
    /// Minute of hour (0-59); same caveat as `run_hour`.
    pub run_minute: u32,
    pub notification_email: String,
    /// URLs exempted from validation and reporting, matched verbatim.
    pub skip_urls: Vec<String>,
    /// Upper bound on in-flight reachability probes during a sweep.
    pub concurrency: usize,
    pub probe_timeout: Duration,
}

impl AuditConfig {
    /// Validate field ranges. Called by every constructor path so an
    /// `AuditConfig` in circulation is always well-formed.
    fn validate(self) -> Result<Self, ConfigError> {
        if self.interval_value == 0 {
            return Err(ConfigError::InvalidValue {
                field: "interval value",
                reason: "must be a positive integer".to_string(),
            });
        }
        if self.run_hour > 23 {
            return Err(ConfigError::InvalidValue {
                field: "run hour",
                reason: format!("{} is out of range 0-23", self.run_hour),
            });
        }
        if self.run_minute > 59 {
            return Err(ConfigError::InvalidValue {
                field: "run minute",
                reason: format!("{} is out of range 0-59", self.run_minute),
            });
        }
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "concurrency",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(self)
    }

    /// Parse a newline-delimited skip list: entries trimmed, empties
    /// discarded, order preserved.
    pub fn parse_skip_urls(text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            interval_value: 1,
            interval_unit: IntervalUnit::Daily,
            run_hour: 0,
            run_minute: 0,
            notification_email: DEFAULT_NOTIFICATION_EMAIL.to_string(),
            skip_urls: Vec::new(),
            concurrency: DEFAULT_CONCURRENCY,
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    database_url: String,
    bind_addr: String,
    audit: AuditConfig,
}

impl Config {
    /// Create a new config explicitly.
    pub fn new(
        database_url: impl Into<String>,
        bind_addr: impl Into<String>,
        audit: AuditConfig,
    ) -> Self {
        Self {
            database_url: database_url.into(),
            bind_addr: bind_addr.into(),
            audit,
        }
    }

    /// Load from environment variables, falling back to development
    /// defaults. Fails when a present variable does not parse or is out of
    /// range.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var(ENV_DATABASE_URL).unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let bind_addr = env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let defaults = AuditConfig::default();
        let audit = AuditConfig {
            interval_value: parse_env(ENV_AUDIT_INTERVAL_VALUE, "interval value")?
                .unwrap_or(defaults.interval_value),
            interval_unit: match env::var(ENV_AUDIT_INTERVAL_UNIT) {
                Ok(raw) => raw.parse()?,
                Err(_) => defaults.interval_unit,
            },
            run_hour: parse_env(ENV_AUDIT_RUN_HOUR, "run hour")?.unwrap_or(defaults.run_hour),
            run_minute: parse_env(ENV_AUDIT_RUN_MINUTE, "run minute")?
                .unwrap_or(defaults.run_minute),
            notification_email: env::var(ENV_NOTIFICATION_EMAIL)
                .unwrap_or(defaults.notification_email),
            skip_urls: env::var(ENV_SKIP_URLS)
                .map(|text| AuditConfig::parse_skip_urls(&text))
                .unwrap_or_default(),
            concurrency: parse_env(ENV_AUDIT_CONCURRENCY, "concurrency")?
                .unwrap_or(defaults.concurrency),
            probe_timeout: parse_env(ENV_PROBE_TIMEOUT_SECS, "probe timeout")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.probe_timeout),
        }
        .validate()?;

        Ok(Self {
            database_url,
            bind_addr,
            audit,
        })
    }

    /// Database connection string (SQLite URL).
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    /// Audit settings snapshot.
    pub fn audit(&self) -> &AuditConfig {
        &self.audit
    }
}

fn parse_env<T: FromStr>(key: &str, field: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                field,
                reason: format!("could not parse '{raw}'"),
            }),
        Err(_) => Ok(None),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
