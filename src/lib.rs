//! meraki-dispatch - Dispatch layer for a large vendor API surface
//!
//! This crate sits between a calling agent and a wrapped vendor client. It
//! catalogs every callable operation, classifies each one as READ, WRITE or
//! OTHER, serves repeated READ calls from a TTL cache, blocks WRITE calls in
//! read-only mode, and retries rate-limited or transient failures within a
//! bounded budget.
//!
//! Transport (how calls reach the dispatcher) and network I/O (how the
//! vendor client talks to the vendor) are supplied by the embedding
//! application through the [`VendorClient`] trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use meraki_dispatch::{DispatchConfig, Dispatcher, Parameters};
//!
//! #[tokio::main]
//! async fn main() -> meraki_dispatch::Result<()> {
//!     let dispatcher = Dispatcher::builder()
//!         .client(Arc::new(MyMerakiClient::new()))
//!         .config(DispatchConfig::from_env()?)
//!         .build()?;
//!
//!     let orgs = dispatcher
//!         .call("organizations", "getOrganizations", Parameters::new())
//!         .await?;
//!     println!("{} (cached: {})", orgs.payload, orgs.from_cache);
//!
//!     for m in dispatcher.search_methods("firewall") {
//!         println!("{}.{} [{}]", m.section, m.name, m.classification);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod classify;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gate;
pub mod registry;
pub mod retry;
pub mod telemetry;
pub mod traits;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use cache::{CacheKey, CacheStats, CacheStore};
pub use config::{ConfigView, Credentials, DispatchConfig};
pub use dispatcher::{CacheReport, Dispatcher, DispatcherBuilder};
pub use error::{ClientError, DispatchError, ErrorKind, FailureClass, Result, StructuredError};
pub use registry::{MethodListing, Registry};
pub use retry::{RateLimitPolicy, RetryConfig};
pub use traits::VendorClient;
pub use types::{
    AnnotatedResult, CacheCleared, Classification, MethodDescriptor, ParameterSpec, Parameters,
};
pub use version::{PKG_VERSION, version_string};
