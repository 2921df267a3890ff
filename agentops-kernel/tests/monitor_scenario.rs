use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use agentops_config::MonitorConfig;
use agentops_events::EventRecord;
use agentops_kernel::{MonitorError, MonitorHandle};
use agentops_telemetry::CollectingDriftObserver;

#[derive(Debug, PartialEq)]
struct AgentError(String);

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn temp_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("agentops-{name}-{}.json", uuid::Uuid::new_v4()));
    path
}

fn fixed(action: &str, latency_ms: f64) -> EventRecord {
    EventRecord::builder(action)
        .latency_ms(latency_ms)
        .unwrap()
        .build()
}

#[tokio::test]
async fn demo_session_records_successes_and_failures() {
    let monitor = MonitorHandle::new(MonitorConfig::new("demo").with_api_key("demo_key")).unwrap();

    let process = monitor.action("process_data").wrap(|millis: u64| async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok::<_, AgentError>(format!("processed in {millis}ms"))
    });
    let analyze = monitor.action("analyze_text");

    assert_eq!(
        process.call_async(50).await,
        Ok("processed in 50ms".to_owned())
    );
    assert_eq!(
        process.call_async(70).await,
        Ok("processed in 70ms".to_owned())
    );
    let err = analyze
        .invoke_async("some text", |_| async {
            Err::<(), _>(AgentError("boom".into()))
        })
        .await
        .expect_err("analysis fails");
    assert_eq!(err, AgentError("boom".into()));

    let events = monitor.events();
    assert_eq!(events.len(), 3);
    assert!(events[0].latency_ms() >= 50.0);
    assert!(events[1].latency_ms() >= 70.0);
    assert_eq!(events[2].error_message(), Some("boom"));

    let snapshot = monitor.stats();
    let stats = snapshot.stats().expect("events recorded");
    assert_eq!(stats.total_events, 3);
    assert!((stats.success_rate - 2.0 / 3.0).abs() < 1e-9);
    let expected: f64 = events.iter().map(EventRecord::latency_ms).sum::<f64>() / 3.0;
    assert!((stats.avg_latency_ms - expected).abs() < 1e-9);
    assert_eq!(stats.project_name, "demo");
    assert_eq!(stats.session_id, monitor.session_id());
}

#[test]
fn drift_follows_the_latest_baseline() {
    let monitor = MonitorHandle::new(MonitorConfig::new("drift")).unwrap();
    let observer = CollectingDriftObserver::new();
    monitor.subscribe_drift(observer.clone());

    monitor.record(fixed("call", 100.0));
    let baseline = monitor.establish_baseline().expect("baseline from one event");
    assert!((baseline.avg_latency_ms() - 100.0).abs() < f64::EPSILON);

    monitor.record(fixed("call", 125.0));
    monitor.record(fixed("call", 115.0));
    let signals = observer.drain();
    assert_eq!(signals.len(), 1);
    assert!((signals[0].deviation_fraction - 0.25).abs() < 1e-9);

    // Store now averages (100 + 125 + 115) / 3 = 113.33.
    let replaced = monitor.establish_baseline().unwrap();
    assert_eq!(replaced.event_count(), 3);
    monitor.record(fixed("call", 125.0));
    assert!(observer.drain().is_empty());
    monitor.record(fixed("call", 140.0));
    assert_eq!(observer.drain().len(), 1);
    assert_eq!(monitor.event_count(), 5);
}

#[test]
fn threshold_comes_from_configuration() {
    let monitor = MonitorHandle::new(
        MonitorConfig::new("strict")
            .with_drift_threshold(0.05)
            .unwrap(),
    )
    .unwrap();
    let observer = CollectingDriftObserver::new();
    monitor.subscribe_drift(observer.clone());

    monitor.record(fixed("call", 100.0));
    monitor.establish_baseline();
    monitor.record(fixed("call", 110.0));
    assert_eq!(observer.signals().len(), 1);
}

#[tokio::test]
async fn export_matches_recorded_events() {
    let monitor = MonitorHandle::new(MonitorConfig::new("export")).unwrap();
    monitor
        .action("search")
        .invoke("rust", |query: &str| Ok::<_, AgentError>(query.len()))
        .unwrap();
    let _ = monitor
        .action("search")
        .invoke("", |_| Err::<usize, _>(AgentError("empty query".into())));

    let path = temp_path("export");
    let written = monitor.export_events(&path).await.unwrap();
    assert_eq!(written, 2);

    let parsed: Vec<EventRecord> =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(parsed, monitor.events());

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn failed_export_keeps_events() {
    let monitor = MonitorHandle::new(MonitorConfig::new("export")).unwrap();
    monitor.record(fixed("call", 1.0));

    let path = temp_path("missing-dir").join("events.json");
    let err = monitor
        .export_events(&path)
        .await
        .expect_err("parent directory does not exist");
    assert!(matches!(err, MonitorError::Export(_)));
    assert_eq!(monitor.event_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_ordered_session() {
    let monitor = MonitorHandle::new(MonitorConfig::new("concurrent")).unwrap();
    let wrapped = Arc::new(monitor.action("work").wrap(|n: usize| async move {
        tokio::task::yield_now().await;
        Ok::<_, AgentError>(n)
    }));

    let handles: Vec<_> = (0..100)
        .map(|n| {
            let wrapped = Arc::clone(&wrapped);
            tokio::spawn(async move { wrapped.call_async(n).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let events = monitor.events();
    assert_eq!(events.len(), 100);
    assert_eq!(monitor.event_count(), 100);
    assert!(
        events
            .iter()
            .all(|event| event.session_id() == Some(monitor.session_id()))
    );
}
