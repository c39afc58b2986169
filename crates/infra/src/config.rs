//! Configuration loading and representation.
//!
//! Everything comes from environment variables; unset keys fall back to defaults,
//! malformed values are reported instead of silently ignored.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use stockwise_core::{StoreId, TenantId};

pub const ENV_BIND_ADDR: &str = "STOCKWISE_BIND_ADDR";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_DATA_SOURCE_TIMEOUT_MS: &str = "STOCKWISE_DATA_SOURCE_TIMEOUT_MS";
pub const ENV_SCAN_INTERVAL_SECS: &str = "STOCKWISE_SCAN_INTERVAL_SECS";
pub const ENV_SCAN_TARGETS: &str = "STOCKWISE_SCAN_TARGETS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A store whose anomaly scan runs on a schedule.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub tenant_id: TenantId,
    pub store_id: StoreId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntelConfig {
    pub bind_addr: SocketAddr,
    /// Postgres read model. `None` means the in-memory store (dev/test).
    pub database_url: Option<String>,
    /// Upper bound on each data-source round trip.
    pub data_source_timeout: Duration,
    pub scan_interval: Duration,
    pub scan_targets: Vec<ScanTarget>,
}

impl Default for IntelConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            data_source_timeout: Duration::from_millis(5_000),
            scan_interval: Duration::from_secs(900),
            scan_targets: Vec::new(),
        }
    }
}

impl IntelConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map instead of the process env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Self::default();

        if let Some(v) = get(ENV_BIND_ADDR) {
            cfg.bind_addr = v
                .parse()
                .map_err(|e| ConfigError::invalid(ENV_BIND_ADDR, &v, e))?;
        }

        cfg.database_url = get(ENV_DATABASE_URL);

        if let Some(v) = get(ENV_DATA_SOURCE_TIMEOUT_MS) {
            let ms = parse_positive(ENV_DATA_SOURCE_TIMEOUT_MS, &v)?;
            cfg.data_source_timeout = Duration::from_millis(ms);
        }

        if let Some(v) = get(ENV_SCAN_INTERVAL_SECS) {
            let secs = parse_positive(ENV_SCAN_INTERVAL_SECS, &v)?;
            cfg.scan_interval = Duration::from_secs(secs);
        }

        if let Some(v) = get(ENV_SCAN_TARGETS) {
            cfg.scan_targets = parse_scan_targets(&v)?;
        }

        Ok(cfg)
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError::invalid(key, value, "must be greater than zero")),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::invalid(key, value, e)),
    }
}

/// `tenant:store` pairs separated by commas.
fn parse_scan_targets(value: &str) -> Result<Vec<ScanTarget>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pair| {
            let (tenant, store) = pair
                .split_once(':')
                .ok_or_else(|| ConfigError::invalid(ENV_SCAN_TARGETS, pair, "expected tenant:store"))?;
            let tenant_id = tenant
                .parse::<TenantId>()
                .map_err(|e| ConfigError::invalid(ENV_SCAN_TARGETS, pair, e))?;
            let store_id = store
                .parse::<StoreId>()
                .map_err(|e| ConfigError::invalid(ENV_SCAN_TARGETS, pair, e))?;
            Ok(ScanTarget {
                tenant_id,
                store_id,
            })
        })
        .collect()
}
