//! Telemetry metric name constants.
//!
//! Centralised metric names for dispatch operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `meraki_dispatch_`. Counters end in
//! `_total`, histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `section`: catalog section (e.g. "organizations", "wireless")
//! - `classification`: "READ", "WRITE" or "OTHER"
//! - `status`: outcome: "ok", "cached" or "error"
//! - `reason`: retry cause: "rate_limit" or "transient"

/// Total calls through the dispatcher.
///
/// Labels: `section`, `classification`, `status` ("ok" | "cached" | "error").
pub const CALLS_TOTAL: &str = "meraki_dispatch_calls_total";

/// Duration of calls that reached the vendor, including retries and waits.
///
/// Labels: `section`.
pub const CALL_DURATION_SECONDS: &str = "meraki_dispatch_call_duration_seconds";

/// Total retry attempts (not counting the initial attempt).
///
/// Labels: `section`, `reason` ("rate_limit" | "transient").
pub const RETRIES_TOTAL: &str = "meraki_dispatch_retries_total";

/// Total cache hits.
pub const CACHE_HITS_TOTAL: &str = "meraki_dispatch_cache_hits_total";

/// Total cache misses, including misses caused by expiry.
pub const CACHE_MISSES_TOTAL: &str = "meraki_dispatch_cache_misses_total";

/// Total WRITE calls rejected by read-only mode.
///
/// Labels: `section`.
pub const WRITES_BLOCKED_TOTAL: &str = "meraki_dispatch_writes_blocked_total";
