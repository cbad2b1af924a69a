//! Dispatch configuration.
//!
//! Set once at process start and read by every call. Sources, lowest
//! priority first:
//!
//! 1. built-in defaults
//! 2. TOML config + secrets files (`cli` feature, see [`file`])
//! 3. environment variables
//!
//! | Variable | Default |
//! |---|---|
//! | `ENABLE_CACHING` | `true` |
//! | `CACHE_TTL_SECONDS` | `300` |
//! | `CACHE_MAX_ENTRIES` | `10000` |
//! | `READ_ONLY_MODE` | `false` |
//! | `MAX_RETRIES` | `3` |
//! | `RATE_LIMIT_WAIT_SECONDS` | `1` |
//! | `MERAKI_API_KEY` | unset |
//! | `MERAKI_ORG_ID` | unset |

#[cfg(feature = "cli")]
pub mod file;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::cache::DEFAULT_MAX_ENTRIES;
use crate::retry::{RateLimitPolicy, RetryConfig};
use crate::{DispatchError, Result};

pub const ENV_ENABLE_CACHING: &str = "ENABLE_CACHING";
pub const ENV_CACHE_TTL_SECONDS: &str = "CACHE_TTL_SECONDS";
pub const ENV_CACHE_MAX_ENTRIES: &str = "CACHE_MAX_ENTRIES";
pub const ENV_READ_ONLY_MODE: &str = "READ_ONLY_MODE";
pub const ENV_MAX_RETRIES: &str = "MAX_RETRIES";
pub const ENV_RATE_LIMIT_WAIT_SECONDS: &str = "RATE_LIMIT_WAIT_SECONDS";
pub const ENV_API_KEY: &str = "MERAKI_API_KEY";
pub const ENV_ORG_ID: &str = "MERAKI_ORG_ID";

/// Vendor credentials. Passed through to the client; never printed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: Option<String>,
    /// Default organization, filled into calls that omit `organizationId`.
    pub organization_id: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("organization_id", &self.organization_id)
            .finish()
    }
}

/// Process-wide dispatch settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    pub caching_enabled: bool,
    pub cache_ttl: Duration,
    pub cache_max_entries: u64,
    pub read_only_mode: bool,
    /// Total attempts per call, including the first. 0 means one attempt.
    pub max_retries: u32,
    pub rate_limit_policy: RateLimitPolicy,
    pub credentials: Credentials,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            caching_enabled: true,
            cache_ttl: Duration::from_secs(300),
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            read_only_mode: false,
            max_retries: 3,
            rate_limit_policy: RateLimitPolicy::default(),
            credentials: Credentials::default(),
        }
    }
}

impl DispatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().apply_lookup(lookup)
    }

    /// Override fields with any variables `lookup` provides.
    ///
    /// Blank values count as unset. Malformed values are a
    /// [`DispatchError::Configuration`] naming the variable.
    pub fn apply_lookup<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get(ENV_ENABLE_CACHING) {
            self.caching_enabled = parse_bool(ENV_ENABLE_CACHING, &v)?;
        }
        if let Some(v) = get(ENV_CACHE_TTL_SECONDS) {
            self.cache_ttl = Duration::from_secs(parse_number(ENV_CACHE_TTL_SECONDS, &v)?);
        }
        if let Some(v) = get(ENV_CACHE_MAX_ENTRIES) {
            self.cache_max_entries = parse_number(ENV_CACHE_MAX_ENTRIES, &v)?;
        }
        if let Some(v) = get(ENV_READ_ONLY_MODE) {
            self.read_only_mode = parse_bool(ENV_READ_ONLY_MODE, &v)?;
        }
        if let Some(v) = get(ENV_MAX_RETRIES) {
            self.max_retries = parse_number(ENV_MAX_RETRIES, &v)?;
        }
        if let Some(v) = get(ENV_RATE_LIMIT_WAIT_SECONDS) {
            self.rate_limit_policy = RateLimitPolicy::fixed(Duration::from_secs(parse_number(
                ENV_RATE_LIMIT_WAIT_SECONDS,
                &v,
            )?));
        }
        if let Some(v) = get(ENV_API_KEY) {
            self.credentials.api_key = Some(v);
        }
        if let Some(v) = get(ENV_ORG_ID) {
            self.credentials.organization_id = Some(v);
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject combinations that would silently disable a feature.
    ///
    /// An enabled cache needs room for at least one entry.
    pub fn validate(&self) -> Result<()> {
        if self.caching_enabled && self.cache_max_entries == 0 {
            return Err(DispatchError::Configuration(format!(
                "{ENV_CACHE_MAX_ENTRIES} must be at least 1 while caching is enabled"
            )));
        }
        Ok(())
    }

    pub fn caching(mut self, enabled: bool) -> Self {
        self.caching_enabled = enabled;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn cache_max_entries(mut self, n: u64) -> Self {
        self.cache_max_entries = n;
        self
    }

    pub fn read_only(mut self, enabled: bool) -> Self {
        self.read_only_mode = enabled;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    pub fn rate_limit_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit_policy = policy;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.credentials.api_key = Some(key.into());
        self
    }

    pub fn organization_id(mut self, id: impl Into<String>) -> Self {
        self.credentials.organization_id = Some(id.into());
        self
    }

    /// Retry settings for the executor.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new()
            .max_attempts(self.max_retries)
            .rate_limit(self.rate_limit_policy)
    }

    /// Serializable view with secrets redacted.
    pub fn view(&self) -> ConfigView {
        ConfigView {
            caching_enabled: self.caching_enabled,
            cache_ttl_seconds: self.cache_ttl.as_secs(),
            cache_max_entries: self.cache_max_entries,
            read_only_mode: self.read_only_mode,
            max_retries: self.max_retries,
            rate_limit_policy: self.rate_limit_policy,
            api_key_configured: self.credentials.api_key.is_some(),
            organization_id_configured: self.credentials.organization_id.is_some(),
            version: crate::version_string(),
        }
    }
}

/// Configuration as reported to callers. Holds no secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigView {
    pub caching_enabled: bool,
    pub cache_ttl_seconds: u64,
    pub cache_max_entries: u64,
    pub read_only_mode: bool,
    pub max_retries: u32,
    pub rate_limit_policy: RateLimitPolicy,
    pub api_key_configured: bool,
    pub organization_id_configured: bool,
    pub version: String,
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(DispatchError::Configuration(format!(
            "{name} must be true or false, got '{value}'"
        ))),
    }
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        DispatchError::Configuration(format!(
            "{name} must be a non-negative integer, got '{value}'"
        ))
    })
}
