//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;
use crate::orchestrator::RetryPolicy;

/// Default base URL of the diet chart backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Where the backend lives and how hard to try when generating.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL, without trailing slash.
    pub base_url: String,
    /// Retry/timeout policy for plan generation.
    pub retry: RetryPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ServiceConfig {
    /// Read configuration from `DIET_CHART_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Missing keys fall back
    /// to defaults; present keys must parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = RetryPolicy::default();

        let base_url = lookup("DIET_CHART_API_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let max_attempts: u32 =
            parse_var(&lookup, "DIET_CHART_MAX_ATTEMPTS")?.unwrap_or(defaults.max_attempts);
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DIET_CHART_MAX_ATTEMPTS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        let attempt_timeout = parse_var::<u64, _>(&lookup, "DIET_CHART_ATTEMPT_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.attempt_timeout);

        let backoff_base = parse_var::<u64, _>(&lookup, "DIET_CHART_BACKOFF_BASE_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.backoff_base);

        Ok(Self {
            base_url,
            retry: RetryPolicy {
                max_attempts,
                attempt_timeout,
                backoff_base,
            },
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{raw:?}: {e}"),
            }),
    }
}
