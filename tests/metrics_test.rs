//! Tests for metrics emitted by the dispatcher.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

mod common;

use std::sync::Arc;

use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serde_json::json;

use common::{StubClient, dispatcher, params};
use meraki_dispatch::{ClientError, DispatchConfig, Parameters, telemetry};

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum counter values for `name`, restricted to series carrying every label in `labels`.
fn counter_total(snapshot: &SnapshotVec, name: &str, labels: &[(&str, &str)]) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .filter(|(key, _, _, _)| {
            labels.iter().all(|(k, v)| {
                key.key()
                    .labels()
                    .any(|label| label.key() == *k && label.value() == *v)
            })
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn cached_read_records_hit_and_miss() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let client = Arc::new(StubClient::new());
    let dispatcher = dispatcher(&client, DispatchConfig::default());

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                for _ in 0..2 {
                    dispatcher
                        .call("organizations", "getOrganizations", Parameters::new())
                        .await
                        .unwrap();
                }
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::CALLS_TOTAL, &[]), 2);
    assert_eq!(
        counter_total(
            &snapshot,
            telemetry::CALLS_TOTAL,
            &[("status", "ok"), ("classification", "READ")]
        ),
        1
    );
    assert_eq!(
        counter_total(&snapshot, telemetry::CALLS_TOTAL, &[("status", "cached")]),
        1
    );
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL, &[]), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL, &[]), 1);
    assert!(
        has_histogram(&snapshot, telemetry::CALL_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn blocked_write_records_denial() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let client = Arc::new(StubClient::new());
    let dispatcher = dispatcher(&client, DispatchConfig::default().read_only(true));

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                dispatcher
                    .call("networks", "deleteNetwork", params(json!({"networkId": "N_1"})))
                    .await
            })
        })
    });
    assert!(result.is_err());

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_total(
            &snapshot,
            telemetry::WRITES_BLOCKED_TOTAL,
            &[("section", "networks")]
        ),
        1
    );
    assert_eq!(
        counter_total(
            &snapshot,
            telemetry::CALLS_TOTAL,
            &[("status", "error"), ("classification", "WRITE")]
        ),
        1
    );
    assert!(!has_histogram(&snapshot, telemetry::CALL_DURATION_SECONDS));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn retries_are_counted_by_reason() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let client = Arc::new(StubClient::failing(2, || {
        ClientError::Network("connection reset".into())
    }));
    let dispatcher = dispatcher(&client, DispatchConfig::default().max_retries(3));

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                dispatcher
                    .call("organizations", "getOrganizations", Parameters::new())
                    .await
            })
        })
    });
    assert!(result.is_ok());

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_total(
            &snapshot,
            telemetry::RETRIES_TOTAL,
            &[("reason", "transient"), ("section", "organizations")]
        ),
        2
    );
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let client = Arc::new(StubClient::new());
    let dispatcher = dispatcher(&client, DispatchConfig::default());
    dispatcher
        .call("organizations", "getOrganizations", Parameters::new())
        .await
        .unwrap();
}
