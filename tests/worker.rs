use std::collections::{HashMap, VecDeque};
use std::thread;
use std::time::{Duration, Instant};

use latscope::detail::{DetailResolver, OpenOutcome};
use latscope::{
    DetailKey, DetailRecord, FeedError, FeedEvent, FeedFuture, FeedWorker, FetchKind, QueryScope,
    Sample, SampleAttrs, SampleBatch, SampleFeed, SampleQuery,
};

/// Feed whose call latencies are scripted up front, so tests can stage
/// slow-then-fast races deterministically.
struct ScriptedFeed {
    /// Delay per `fetch_samples` call, in order; missing entries answer
    /// immediately.
    sample_delays_ms: VecDeque<u64>,
    sample_calls: usize,
    /// Delay per detail key (by device id).
    detail_delays_ms: HashMap<String, u64>,
}

impl ScriptedFeed {
    fn new(sample_delays_ms: &[u64], detail_delays_ms: &[(&str, u64)]) -> Self {
        Self {
            sample_delays_ms: sample_delays_ms.iter().copied().collect(),
            sample_calls: 0,
            detail_delays_ms: detail_delays_ms
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }
}

impl SampleFeed for ScriptedFeed {
    fn fetch_samples(&mut self, query: SampleQuery) -> FeedFuture<SampleBatch> {
        let delay = self.sample_delays_ms.pop_front().unwrap_or(0);
        let call = self.sample_calls;
        self.sample_calls += 1;
        Box::pin(async move {
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            Ok(SampleBatch {
                samples: vec![Sample {
                    id: format!("call-{call}"),
                    timestamp_ms: query.to_ms.max(1),
                    response_time_ms: 100.0,
                    attrs: SampleAttrs::default(),
                }],
                cursor_ms: Some(query.to_ms),
            })
        })
    }

    fn fetch_detail(&mut self, key: DetailKey) -> FeedFuture<DetailRecord> {
        let delay = self.detail_delays_ms.get(&key.device_id).copied().unwrap_or(0);
        Box::pin(async move {
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            Ok(DetailRecord {
                status_code: if key.device_id == "dev-slow" { 500 } else { 200 },
                bytes_sent: 0,
                bytes_received: 0,
                wait_ms: 0.0,
                download_ms: 0.0,
                telemetry: Default::default(),
            })
        })
    }
}

fn query(from_ms: i64, to_ms: i64, kind: FetchKind) -> SampleQuery {
    SampleQuery {
        scope: QueryScope {
            app_id: "test-app".to_owned(),
            ..Default::default()
        },
        from_ms,
        to_ms,
        kind,
    }
}

fn key(device: &str) -> DetailKey {
    DetailKey {
        device_id: device.to_owned(),
        timestamp_ms: 1_000,
    }
}

fn wait_event(worker: &FeedWorker, timeout: Duration) -> Option<FeedEvent> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(event) = worker.poll_event() {
            return Some(event);
        }
        if Instant::now() >= deadline {
            return None;
        }
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn fetched_batches_come_back_as_events() {
    let feed = ScriptedFeed::new(&[], &[]);
    let worker = FeedWorker::spawn(Box::new(feed), None);

    let q = query(0, 10_000, FetchKind::Initial);
    worker.fetch_samples(q.clone());

    match wait_event(&worker, Duration::from_secs(5)) {
        Some(FeedEvent::Samples { query, result }) => {
            assert_eq!(query, q, "the event carries the query it answers");
            let batch = result.expect("scripted feed never fails");
            assert_eq!(batch.samples.len(), 1);
            assert_eq!(batch.cursor_ms, Some(10_000));
        }
        other => panic!("expected a sample event, got {other:?}"),
    }
}

#[test]
fn a_new_sample_fetch_cancels_the_previous_one() {
    // First call hangs 800ms, second answers immediately.
    let feed = ScriptedFeed::new(&[800, 0], &[]);
    let worker = FeedWorker::spawn(Box::new(feed), None);

    let slow = query(0, 1_000, FetchKind::Initial);
    let fast = query(1_000, 2_000, FetchKind::Incremental);
    worker.fetch_samples(slow);
    thread::sleep(Duration::from_millis(50));
    worker.fetch_samples(fast.clone());

    match wait_event(&worker, Duration::from_secs(5)) {
        Some(FeedEvent::Samples { query, .. }) => {
            assert_eq!(query, fast, "only the superseding fetch may answer");
        }
        other => panic!("expected the fast fetch's event, got {other:?}"),
    }

    // Wait past the slow fetch's horizon: its result must never surface.
    assert!(
        wait_event(&worker, Duration::from_millis(1_200)).is_none(),
        "the cancelled fetch must not deliver a late batch"
    );
}

#[test]
fn superseded_detail_fetch_never_overwrites_the_shown_record() {
    let feed = ScriptedFeed::new(&[], &[("dev-slow", 600), ("dev-fast", 0)]);
    let worker = FeedWorker::spawn(Box::new(feed), None);
    let mut resolver = DetailResolver::default();

    // Open the slow sample, then switch to the fast one before it answers,
    // the way the app does: cancel the superseded fetch, dispatch the new one.
    assert_eq!(resolver.open(key("dev-slow")), OpenOutcome::StartFetch);
    worker.fetch_detail(key("dev-slow"));
    thread::sleep(Duration::from_millis(50));

    assert_eq!(resolver.open(key("dev-fast")), OpenOutcome::StartFetch);
    worker.fetch_detail(key("dev-fast"));

    match wait_event(&worker, Duration::from_secs(5)) {
        Some(FeedEvent::Detail { key: k, result }) => {
            assert_eq!(k.device_id, "dev-fast");
            resolver.resolve(k, result);
        }
        other => panic!("expected the fast detail event, got {other:?}"),
    }

    match resolver.current_entry() {
        Some((k, latscope::DetailEntry::Ready(rec))) => {
            assert_eq!(k.device_id, "dev-fast");
            assert_eq!(rec.status_code, 200);
        }
        other => panic!("expected the fast record to be shown, got {other:?}"),
    }

    // The slow fetch was cancelled; nothing else may arrive, and the shown
    // record must still be the fast one afterwards.
    assert!(wait_event(&worker, Duration::from_millis(1_000)).is_none());
    assert!(matches!(
        resolver.current_entry(),
        Some((k, latscope::DetailEntry::Ready(_))) if k.device_id == "dev-fast"
    ));
    assert_eq!(
        resolver.open(key("dev-slow")),
        OpenOutcome::StartFetch,
        "the superseded key was never filled and fetches fresh"
    );
}

#[test]
fn cancel_detail_discards_the_in_flight_fetch() {
    let feed = ScriptedFeed::new(&[], &[("dev-slow", 400)]);
    let worker = FeedWorker::spawn(Box::new(feed), None);

    worker.fetch_detail(key("dev-slow"));
    thread::sleep(Duration::from_millis(50));
    worker.cancel_detail();

    assert!(
        wait_event(&worker, Duration::from_millis(900)).is_none(),
        "a cancelled detail fetch must not deliver"
    );
}

#[test]
fn dropping_the_worker_aborts_in_flight_work_promptly() {
    let feed = ScriptedFeed::new(&[10_000], &[]);
    let worker = FeedWorker::spawn(Box::new(feed), None);
    worker.fetch_samples(query(0, 1_000, FetchKind::Initial));
    thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    drop(worker);
    assert!(
        started.elapsed() < Duration::from_secs(3),
        "drop must cancel the 10s fetch instead of waiting it out"
    );
}
