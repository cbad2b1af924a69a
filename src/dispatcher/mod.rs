//! The dispatcher: single entry point for vendor calls.
//!
//! Every call runs the same pipeline, each step a possible early return:
//!
//! 1. resolve the operation in the [`Registry`]
//! 2. read its classification
//! 3. safety gate (read-only mode blocks WRITE)
//! 4. fill the default organization, check required parameters
//! 5. READ only: cache lookup, returning a hit without calling the vendor
//! 6. invoke the vendor through the retry executor
//! 7. READ only: store the fresh payload
//! 8. annotate with `from_cache`
//!
//! The dispatcher is cheap to clone; clones share the registry, cache and
//! client.

mod builder;

pub use builder::DispatcherBuilder;

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::cache::{CacheKey, CacheStats, CacheStore};
use crate::config::{ConfigView, DispatchConfig};
use crate::error::StructuredError;
use crate::gate;
use crate::registry::Registry;
use crate::retry::{self, RetryConfig};
use crate::telemetry;
use crate::traits::VendorClient;
use crate::types::{AnnotatedResult, CacheCleared, MethodDescriptor, Parameters};
use crate::{DispatchError, Result};

/// Parameter filled from the configured default organization.
pub const ORGANIZATION_ID: &str = "organizationId";

/// Composes registry, gate, cache and retry executor into one call path.
#[derive(Clone)]
pub struct Dispatcher {
    pub(crate) registry: Arc<Registry>,
    pub(crate) cache: Arc<CacheStore>,
    pub(crate) client: Arc<dyn VendorClient>,
    pub(crate) config: Arc<DispatchConfig>,
    pub(crate) retry: RetryConfig,
}

/// Cache counters plus the settings that shape caching behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheReport {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub read_only_mode: bool,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Dispatch one operation.
    ///
    /// Dropping the returned future abandons the call: no further retries
    /// run and nothing is written to the cache.
    #[instrument(skip(self, parameters))]
    pub async fn call(
        &self,
        section: &str,
        name: &str,
        parameters: Parameters,
    ) -> Result<AnnotatedResult> {
        let descriptor = self.registry.resolve(section, name)?;
        let result = self.run(descriptor, parameters).await;

        let status = match &result {
            Ok(r) if r.from_cache => "cached",
            Ok(_) => "ok",
            Err(_) => "error",
        };
        metrics::counter!(telemetry::CALLS_TOTAL,
            "section" => descriptor.section.clone(),
            "classification" => descriptor.classification.as_str(),
            "status" => status,
        )
        .increment(1);
        result
    }

    /// [`call`](Self::call), with failures converted to the caller-facing
    /// [`StructuredError`].
    pub async fn call_structured(
        &self,
        section: &str,
        name: &str,
        parameters: Parameters,
    ) -> std::result::Result<AnnotatedResult, StructuredError> {
        self.call(section, name, parameters)
            .await
            .map_err(|e| e.with_method_hint(section, name))
    }

    async fn run(
        &self,
        descriptor: &MethodDescriptor,
        mut parameters: Parameters,
    ) -> Result<AnnotatedResult> {
        gate::enforce(descriptor, self.config.read_only_mode)?;
        self.fill_organization(descriptor, &mut parameters);
        check_required(descriptor, &parameters)?;

        let key = descriptor
            .classification
            .is_cacheable()
            .then(|| CacheKey::new(&descriptor.section, &descriptor.name, &parameters));
        if let Some(key) = &key {
            if let Some(payload) = self.cache.get(key) {
                debug!(%key, "cache hit");
                return Ok(AnnotatedResult::cached(payload));
            }
            debug!(%key, "cache miss");
        }

        let started = Instant::now();
        let outcome: Result<Value> =
            retry::execute(&self.retry, &descriptor.section, &descriptor.name, || {
                self.client
                    .invoke(&descriptor.section, &descriptor.name, &parameters)
            })
            .await;
        metrics::histogram!(telemetry::CALL_DURATION_SECONDS,
            "section" => descriptor.section.clone(),
        )
        .record(started.elapsed().as_secs_f64());
        let payload = outcome?;

        if let Some(key) = key {
            self.cache.put(key, payload.clone());
        }
        Ok(AnnotatedResult::fresh(payload))
    }

    fn fill_organization(&self, descriptor: &MethodDescriptor, parameters: &mut Parameters) {
        if parameters.contains_key(ORGANIZATION_ID) || !descriptor.declares(ORGANIZATION_ID) {
            return;
        }
        if let Some(org) = &self.config.credentials.organization_id {
            debug!("using configured organization id");
            parameters.insert(ORGANIZATION_ID.to_string(), Value::String(org.clone()));
        }
    }

    /// Operations, optionally restricted to one section, in catalog order.
    pub fn list_methods(&self, section: Option<&str>) -> Vec<MethodDescriptor> {
        self.registry.list(section).into_iter().cloned().collect()
    }

    /// Operations whose name or summary contains `keyword`, case-insensitively.
    pub fn search_methods(&self, keyword: &str) -> Vec<MethodDescriptor> {
        self.registry.search(keyword).into_iter().cloned().collect()
    }

    pub fn get_method_info(&self, section: &str, name: &str) -> Result<MethodDescriptor> {
        self.registry.resolve(section, name).cloned()
    }

    pub fn sections(&self) -> &[String] {
        self.registry.sections()
    }

    pub fn cache_stats(&self) -> CacheReport {
        CacheReport {
            stats: self.cache.stats(),
            read_only_mode: self.config.read_only_mode,
        }
    }

    /// Drop every cached payload. Counters are kept.
    pub fn cache_clear(&self) -> CacheCleared {
        let removed = self.cache.clear();
        info!(removed, "cache cleared");
        CacheCleared { removed }
    }

    /// Zero the hit/miss counters without touching entries.
    pub fn cache_reset_stats(&self) {
        self.cache.reset_stats();
    }

    /// Effective configuration with secrets redacted.
    pub fn get_config(&self) -> ConfigView {
        self.config.view()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("methods", &self.registry.len())
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish()
    }
}

/// Required parameters that are absent or `null`.
fn check_required(descriptor: &MethodDescriptor, parameters: &Parameters) -> Result<()> {
    let missing: Vec<String> = descriptor
        .required_parameters()
        .filter(|name| parameters.get(*name).is_none_or(Value::is_null))
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(DispatchError::InvalidParameters {
        section: descriptor.section.clone(),
        name: descriptor.name.clone(),
        missing,
    })
}
