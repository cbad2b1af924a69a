//! Builder for configuring dispatcher instances

use std::sync::Arc;

use super::Dispatcher;
use crate::cache::CacheStore;
use crate::config::DispatchConfig;
use crate::registry::Registry;
use crate::traits::VendorClient;
use crate::{DispatchError, Result};

/// Builder for [`Dispatcher`].
///
/// ```rust,ignore
/// let dispatcher = Dispatcher::builder()
///     .client(Arc::new(my_client))
///     .config(DispatchConfig::from_env()?)
///     .build()?;
/// ```
#[derive(Default)]
pub struct DispatcherBuilder {
    client: Option<Arc<dyn VendorClient>>,
    config: DispatchConfig,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The vendor client every call is forwarded to. Required.
    pub fn client(mut self, client: Arc<dyn VendorClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Dispatch settings (default: [`DispatchConfig::default()`]).
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the registry from the client's declared surface and wire up
    /// the cache and retry settings.
    ///
    /// Fails with [`DispatchError::Configuration`] if no client was given or
    /// the settings do not [validate](DispatchConfig::validate), and with
    /// [`DispatchError::RegistryBuild`] if the client's declaration is unusable.
    pub fn build(self) -> Result<Dispatcher> {
        let client = self.client.ok_or_else(|| {
            DispatchError::Configuration("a vendor client is required".to_string())
        })?;
        self.config.validate()?;
        let registry = Registry::build(client.as_ref())?;

        let config = self.config;
        let cache = if config.caching_enabled {
            CacheStore::new(config.cache_ttl, config.cache_max_entries)
        } else {
            CacheStore::disabled(config.cache_ttl)
        };
        let retry = config.retry_config();

        Ok(Dispatcher {
            registry: Arc::new(registry),
            cache: Arc::new(cache),
            client,
            config: Arc::new(config),
            retry,
        })
    }
}
