use latscope::{FetchKind, QueryScope, Sample, SampleAttrs, SampleBatch, SampleQuery, SampleStore};

const WINDOW_MS: i64 = 5 * 60 * 1000;

fn sample(id: &str, ts_ms: i64, rt_ms: f64) -> Sample {
    Sample {
        id: id.to_owned(),
        timestamp_ms: ts_ms,
        response_time_ms: rt_ms,
        attrs: SampleAttrs::default(),
    }
}

fn query(from_ms: i64, to_ms: i64, kind: FetchKind) -> SampleQuery {
    SampleQuery {
        scope: QueryScope::default(),
        from_ms,
        to_ms,
        kind,
    }
}

fn batch(samples: Vec<Sample>, cursor_ms: Option<i64>) -> SampleBatch {
    SampleBatch { samples, cursor_ms }
}

#[test]
fn initial_batch_replaces_and_sets_span() {
    let mut store = SampleStore::new(WINDOW_MS);
    let q = query(0, 1_000_000, FetchKind::Initial);
    store.apply_batch(&q, batch(vec![sample("a", 900_000, 100.0)], None));

    let q2 = query(0, 2_000_000, FetchKind::Initial);
    store.apply_batch(&q2, batch(vec![sample("b", 1_900_000, 50.0)], None));

    assert_eq!(store.len(), 1, "initial fetch must replace, not merge");
    assert_eq!(store.samples()[0].id, "b");
    assert_eq!(
        store.span(),
        (2_000_000 - WINDOW_MS, 2_000_000),
        "span tracks the fetch boundary, not sample extrema"
    );
}

#[test]
fn merge_is_last_write_wins_and_keeps_slot() {
    let mut store = SampleStore::new(WINDOW_MS);
    let q = query(0, 1_000_000, FetchKind::Initial);
    store.apply_batch(
        &q,
        batch(
            vec![
                sample("a", 900_000, 100.0),
                sample("b", 910_000, 200.0),
                sample("c", 920_000, 300.0),
            ],
            None,
        ),
    );

    let q2 = query(900_000, 1_001_000, FetchKind::Incremental);
    store.apply_batch(&q2, batch(vec![sample("b", 912_000, 250.0)], None));

    assert_eq!(store.len(), 3, "merging an existing id must not grow the store");
    let ids: Vec<&str> = store.samples().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["a", "b", "c"],
        "a replaced sample keeps its insertion slot"
    );
    assert_eq!(store.samples()[1].response_time_ms, 250.0, "last write wins");
    assert_eq!(store.samples()[1].timestamp_ms, 912_000);
}

#[test]
fn no_duplicate_ids_after_any_merge() {
    let mut store = SampleStore::new(WINDOW_MS);
    let q = query(0, 1_000_000, FetchKind::Initial);
    store.apply_batch(
        &q,
        batch(
            vec![
                sample("a", 900_000, 1.0),
                sample("a", 901_000, 2.0),
                sample("a", 902_000, 3.0),
            ],
            None,
        ),
    );
    assert_eq!(store.len(), 1, "duplicate ids inside one batch collapse");
    assert_eq!(
        store.samples()[0].response_time_ms,
        3.0,
        "the last occurrence in the batch wins"
    );
}

#[test]
fn eviction_drops_everything_below_cutoff() {
    let mut store = SampleStore::new(WINDOW_MS);
    let q = query(0, 1_000_000, FetchKind::Initial);
    let stats = store.apply_batch(
        &q,
        batch(
            vec![
                sample("old", 699_999, 10.0),
                sample("edge", 700_000, 20.0),
                sample("new", 999_000, 30.0),
            ],
            None,
        ),
    );
    assert_eq!(stats.evicted, 1);
    let ids: Vec<&str> = store.samples().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["edge", "new"],
        "a sample exactly at to - window stays; below it goes"
    );
    assert!(store
        .samples()
        .iter()
        .all(|s| s.timestamp_ms >= 1_000_000 - WINDOW_MS));
}

#[test]
fn merging_the_same_batch_twice_is_idempotent() {
    let make = || {
        batch(
            vec![sample("a", 900_000, 100.0), sample("b", 950_000, 200.0)],
            Some(955_000),
        )
    };
    let q = query(0, 1_000_000, FetchKind::Initial);
    let q2 = query(955_000, 1_000_000, FetchKind::Incremental);

    let mut once = SampleStore::new(WINDOW_MS);
    once.apply_batch(&q, make());
    once.apply_batch(&q2, make());

    let mut twice = SampleStore::new(WINDOW_MS);
    twice.apply_batch(&q, make());
    twice.apply_batch(&q2, make());
    twice.apply_batch(&q2, make());

    assert_eq!(once.len(), twice.len());
    assert_eq!(once.samples(), twice.samples());
    assert_eq!(once.cursor_ms(), twice.cursor_ms());
}

#[test]
fn cursor_comes_from_batch_or_falls_back_to_request_to() {
    let mut store = SampleStore::new(WINDOW_MS);
    let q = query(0, 1_000_000, FetchKind::Initial);
    store.apply_batch(&q, batch(vec![], Some(980_000)));
    assert_eq!(store.cursor_ms(), Some(980_000));

    let q2 = query(980_000, 1_010_000, FetchKind::Incremental);
    store.apply_batch(&q2, batch(vec![], None));
    assert_eq!(
        store.cursor_ms(),
        Some(1_010_000),
        "an empty response without a cursor must still advance to the request's `to`"
    );
}

#[test]
fn next_query_resumes_from_cursor_or_window_edge() {
    let scope = QueryScope::default();
    let mut store = SampleStore::new(WINDOW_MS);

    let q = store.next_query(&scope, FetchKind::Initial, 1_000_000);
    assert_eq!((q.from_ms, q.to_ms), (0, 1_000_000), "initial covers full history");

    let q = store.next_query(&scope, FetchKind::Incremental, 1_000_000);
    assert_eq!(
        q.from_ms,
        1_000_000 - WINDOW_MS,
        "without a cursor, incremental starts at now - window"
    );

    store.apply_batch(
        &query(0, 1_000_000, FetchKind::Initial),
        batch(vec![], Some(998_000)),
    );
    let q = store.next_query(&scope, FetchKind::Incremental, 1_002_000);
    assert_eq!(q.from_ms, 998_000, "incremental resumes from the cursor");
    assert_eq!(q.to_ms, 1_002_000);
}

#[test]
fn malformed_samples_never_enter_the_store() {
    let mut store = SampleStore::new(WINDOW_MS);
    let q = query(0, 1_000_000, FetchKind::Initial);
    let stats = store.apply_batch(
        &q,
        batch(
            vec![
                sample("nan", 900_000, f64::NAN),
                sample("neg", 900_000, -5.0),
                sample("inf", 900_000, f64::INFINITY),
                sample("zero-ts", 0, 100.0),
                sample("ok", 900_000, 100.0),
            ],
            None,
        ),
    );
    assert_eq!(stats.malformed, 4);
    assert_eq!(store.len(), 1);
    assert_eq!(store.samples()[0].id, "ok");
}

#[test]
fn clear_resets_span_and_cursor() {
    let mut store = SampleStore::new(WINDOW_MS);
    store.apply_batch(
        &query(0, 1_000_000, FetchKind::Initial),
        batch(vec![sample("a", 900_000, 10.0)], Some(990_000)),
    );
    store.clear();
    assert!(store.is_empty());
    assert!(!store.has_span());
    assert_eq!(store.cursor_ms(), None);
    assert_eq!(store.span(), (0, 0));
}
