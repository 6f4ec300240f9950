//! Counters forwarded to the `metrics` facade.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture the emitted
//! counters without a real exporter.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use jobscout::providers::AgentCaller;
use jobscout::telemetry;
use jobscout::{AgentError, AgentGateway, AgentResponse, Message, RateLimitConfig, RetryConfig};

// ============================================================================
// Mock agent
// ============================================================================

/// Fails with a quota error on the first call, succeeds afterwards.
struct FlakyAgent {
    calls: AtomicU32,
}

#[async_trait]
impl AgentCaller for FlakyAgent {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn call(&self, _messages: &[Message]) -> Result<AgentResponse, AgentError> {
        if self.calls.fetch_add(1, Ordering::Relaxed) == 0 {
            Err(AgentError::from_upstream("429 RESOURCE_EXHAUSTED"))
        } else {
            Ok(AgentResponse::new("ok"))
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

fn gateway() -> AgentGateway {
    AgentGateway::builder()
        .agent(FlakyAgent {
            calls: AtomicU32::new(0),
        })
        .rate_limit(RateLimitConfig::disabled())
        .retry(RetryConfig::new().initial_delay(Duration::from_millis(5)))
        .build()
        .unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn invocation_counters_reach_the_recorder() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let snapshot_from_gateway = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let gw = gateway();
                gw.invoke("hello").await.unwrap();
                gw.invoke("hello").await.unwrap();
                gw.metrics()
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(counter_total(&snapshot, telemetry::INVOCATIONS_TOTAL), 2);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::MODEL_CALLS_TOTAL), 2);
    assert_eq!(counter_total(&snapshot, telemetry::RETRIES_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::ERRORS_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::RATE_LIMITED_WAITS_TOTAL), 0);

    // the facade and the in-process counters agree
    for counter in jobscout::Counter::ALL {
        assert_eq!(
            counter_total(&snapshot, counter.metric_name()),
            snapshot_from_gateway.get(counter),
            "{}",
            counter.name()
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn invalid_payload_records_an_error() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                gateway().invoke_json(serde_json::json!([1, 2, 3])).await
            })
        })
    });
    assert!(result.is_err());

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::ERRORS_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::INVOCATIONS_TOTAL), 0);
}
