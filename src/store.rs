//! Sliding-window sample store.
//!
//! Owns the set of in-window samples keyed by id, the tracked `[from, to]`
//! coverage span, and the backend continuation cursor. All mutation goes
//! through [`SampleStore::apply_batch`]; everything downstream (banding,
//! scales, rendering) reads the store as an immutable slice per frame.

use std::collections::HashMap;

use crate::feed::{FetchKind, QueryScope, SampleBatch, SampleQuery};
use crate::sample::Sample;

/// Counters describing what one [`SampleStore::apply_batch`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Samples newly added to the store.
    pub inserted: usize,
    /// Samples that replaced an existing id (last write wins).
    pub replaced: usize,
    /// Samples dropped because they fell below the window cutoff.
    pub evicted: usize,
    /// Samples dropped because a numeric field was unusable.
    pub malformed: usize,
}

/// The sliding window of recent samples.
///
/// Insertion order is preserved across merges: a sample that is replaced by
/// id keeps its original slot, so rank ties in the categorizer stay stable
/// across refetches of unchanged data.
pub struct SampleStore {
    window_ms: i64,
    samples: Vec<Sample>,
    by_id: HashMap<String, usize>,
    /// Tracked coverage span; `to_ms` is the boundary of the latest fetch,
    /// not the max sample timestamp, so a sparse window still spans fully.
    from_ms: i64,
    to_ms: i64,
    cursor_ms: Option<i64>,
}

impl SampleStore {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms,
            samples: Vec::new(),
            by_id: HashMap::new(),
            from_ms: 0,
            to_ms: 0,
            cursor_ms: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All in-window samples, in insertion order.
    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[inline]
    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Tracked coverage span `(from, to)` in epoch ms. `(0, 0)` until the
    /// first batch lands.
    #[inline]
    pub fn span(&self) -> (i64, i64) {
        (self.from_ms, self.to_ms)
    }

    #[inline]
    pub fn cursor_ms(&self) -> Option<i64> {
        self.cursor_ms
    }

    /// Whether at least one fetch boundary has been recorded.
    #[inline]
    pub fn has_span(&self) -> bool {
        self.to_ms > 0
    }

    /// Drop all samples, coverage and cursor state. Used after an initial
    /// fetch failure and when the query scope changes.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.by_id.clear();
        self.from_ms = 0;
        self.to_ms = 0;
        self.cursor_ms = None;
    }

    /// Build the next query for this store.
    ///
    /// Initial fetches cover the full available history `[0, now]`;
    /// incremental fetches resume from the continuation cursor, or from
    /// `now - window` when no cursor is known yet.
    pub fn next_query(&self, scope: &QueryScope, kind: FetchKind, now_ms: i64) -> SampleQuery {
        let from_ms = match kind {
            FetchKind::Initial => 0,
            FetchKind::Incremental => self.cursor_ms.unwrap_or(now_ms - self.window_ms),
        };
        SampleQuery {
            scope: scope.clone(),
            from_ms,
            to_ms: now_ms,
            kind,
        }
    }

    /// Fold a fetched batch into the store.
    ///
    /// Initial batches replace the contents, incremental batches merge by id
    /// with last-write-wins. Afterwards the cursor is taken from the batch
    /// (falling back to the request's `to` bound so an empty range is never
    /// refetched forever), samples below `to - window` are evicted, and the
    /// tracked span becomes `[to - window, to]`.
    pub fn apply_batch(&mut self, query: &SampleQuery, batch: SampleBatch) -> MergeStats {
        let mut stats = MergeStats::default();

        if query.kind == FetchKind::Initial {
            self.samples.clear();
            self.by_id.clear();
        }

        for sample in batch.samples {
            if !sample.is_well_formed() {
                stats.malformed += 1;
                continue;
            }
            match self.by_id.get(&sample.id) {
                Some(&slot) => {
                    self.samples[slot] = sample;
                    stats.replaced += 1;
                }
                None => {
                    self.by_id.insert(sample.id.clone(), self.samples.len());
                    self.samples.push(sample);
                    stats.inserted += 1;
                }
            }
        }

        self.cursor_ms = Some(batch.cursor_ms.unwrap_or(query.to_ms));
        self.to_ms = query.to_ms;
        self.from_ms = query.to_ms - self.window_ms;
        stats.evicted = self.evict_below(self.from_ms);
        stats
    }

    /// Drop every sample with `timestamp_ms < cutoff_ms`, returning how many
    /// were removed. Insertion order of survivors is preserved.
    fn evict_below(&mut self, cutoff_ms: i64) -> usize {
        let before = self.samples.len();
        self.samples.retain(|s| s.timestamp_ms >= cutoff_ms);
        let removed = before - self.samples.len();
        if removed > 0 {
            self.by_id.clear();
            for (slot, sample) in self.samples.iter().enumerate() {
                self.by_id.insert(sample.id.clone(), slot);
            }
        }
        removed
    }
}
