//! TOML configuration files.
//!
//! Settings are resolved in this order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.meraki-dispatch/config.toml` (user)
//! 3. `/etc/meraki-dispatch/config.toml` (system)
//!
//! A missing file is not an error unless it was named explicitly.
//!
//! The API key lives in a separate secrets file that must not be
//! readable by group or other:
//! 1. `~/.meraki-dispatch/secrets.toml`
//! 2. `/etc/meraki-dispatch/secrets.toml`
//!
//! Environment variables override both files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::DispatchConfig;
use crate::retry::RateLimitPolicy;
use crate::{DispatchError, Result};

const DIR_NAME: &str = ".meraki-dispatch";
const SYSTEM_DIR: &str = "/etc/meraki-dispatch";

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub dispatch: DispatchSection,
    #[serde(default)]
    pub meraki: MerakiSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    pub enabled: Option<bool>,
    pub ttl_seconds: Option<u64>,
    pub max_entries: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchSection {
    pub read_only: Option<bool>,
    pub max_retries: Option<u32>,
    /// Fixed wait after a rate-limit signal.
    pub rate_limit_wait_seconds: Option<u64>,
    /// When set, rate-limit waits double per attempt up to this cap,
    /// starting from `rate_limit_wait_seconds`.
    pub rate_limit_max_wait_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MerakiSection {
    pub organization_id: Option<String>,
}

/// Contents of `secrets.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub meraki: Option<ApiKeySecret>,
}

#[derive(Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

impl std::fmt::Debug for ApiKeySecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKeySecret(<redacted>)")
    }
}

impl FileConfig {
    /// Load from the first location that exists, or defaults if none does.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DispatchError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        Self::parse(&content)
            .map_err(|e| DispatchError::Configuration(format!("In config file {path:?}: {e}")))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| DispatchError::Configuration(format!("Failed to parse config: {e}")))
    }

    fn resolve_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(DispatchError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }
        Ok(candidates("config.toml").into_iter().find(|p| p.exists()))
    }

    /// Apply file settings on top of `base`.
    pub fn apply(&self, mut base: DispatchConfig) -> DispatchConfig {
        if let Some(enabled) = self.cache.enabled {
            base.caching_enabled = enabled;
        }
        if let Some(secs) = self.cache.ttl_seconds {
            base.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(n) = self.cache.max_entries {
            base.cache_max_entries = n;
        }
        if let Some(read_only) = self.dispatch.read_only {
            base.read_only_mode = read_only;
        }
        if let Some(n) = self.dispatch.max_retries {
            base.max_retries = n;
        }
        let wait = self
            .dispatch
            .rate_limit_wait_seconds
            .map(Duration::from_secs);
        match (wait, self.dispatch.rate_limit_max_wait_seconds) {
            (Some(initial), Some(max)) => {
                base.rate_limit_policy =
                    RateLimitPolicy::exponential(initial, Duration::from_secs(max));
            }
            (Some(wait), None) => base.rate_limit_policy = RateLimitPolicy::fixed(wait),
            (None, Some(max)) => {
                base.rate_limit_policy = RateLimitPolicy::exponential(
                    base.rate_limit_policy.delay_for_attempt(0),
                    Duration::from_secs(max),
                );
            }
            (None, None) => {}
        }
        if let Some(org) = &self.meraki.organization_id {
            base.credentials.organization_id = Some(org.clone());
        }
        base
    }
}

impl Secrets {
    /// Load secrets with permission checks. Empty if no file exists.
    pub fn load() -> Result<Self> {
        match candidates("secrets.toml").into_iter().find(|p| p.exists()) {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            DispatchError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            DispatchError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    pub fn apply(&self, mut base: DispatchConfig) -> DispatchConfig {
        if let Some(secret) = &self.meraki {
            base.credentials.api_key = Some(secret.api_key.clone());
        }
        base
    }
}

/// Full resolution: defaults, then files, then the process environment.
pub fn load(explicit_path: Option<&Path>) -> Result<DispatchConfig> {
    let file = FileConfig::load(explicit_path)?;
    let secrets = Secrets::load()?;
    secrets
        .apply(file.apply(DispatchConfig::default()))
        .apply_lookup(|name| std::env::var(name).ok())
}

fn candidates(file_name: &str) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(2);
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(DIR_NAME).join(file_name));
    }
    paths.push(PathBuf::from(SYSTEM_DIR).join(file_name));
    paths
}

/// Reject secrets files with any group or other permission bits.
#[cfg(unix)]
fn check_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|e| {
        DispatchError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(DispatchError::Configuration(format!(
            "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
            mode & 0o777
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
