//! Call inputs and outputs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Named call arguments: string keys to scalar or sequence JSON values.
pub type Parameters = serde_json::Map<String, Value>;

/// A successful dispatch: the vendor payload plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedResult {
    pub payload: Value,
    /// `true` when served from the cache without calling the vendor.
    pub from_cache: bool,
}

impl AnnotatedResult {
    pub(crate) fn fresh(payload: Value) -> Self {
        Self {
            payload,
            from_cache: false,
        }
    }

    pub(crate) fn cached(payload: Value) -> Self {
        Self {
            payload,
            from_cache: true,
        }
    }
}

/// Acknowledgement returned by a cache clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheCleared {
    /// Entries present at the time of the clear.
    pub removed: u64,
}
