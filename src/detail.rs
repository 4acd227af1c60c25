//! Drill-down analytics and the detail-record cache.
//!
//! Analytics (percentile rank, feeldex) are computed over the *selection*
//! a sample was opened from, independent of the global severity bands.
//! Detail records are fetched lazily and cached per `(device, timestamp)`
//! key for the lifetime of the session; failures are cached too, so a bad
//! key is not retried every time its panel is shown.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::feed::FeedError;
use crate::sample::{DetailKey, DetailRecord, Sample};

// ─────────────────────────────────────────────────────────────────────────────
// Selection-relative analytics
// ─────────────────────────────────────────────────────────────────────────────

/// Percentile rank of sample `id` within `selection`: 0 is the fastest,
/// 100 the slowest, by index in an ascending stable sort. A single-sample
/// selection ranks at 0. `None` when the id is not in the selection.
pub fn percentile_rank(selection: &[Sample], id: &str) -> Option<u8> {
    let n = selection.len();
    if n == 0 {
        return None;
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        selection[a]
            .response_time_ms
            .partial_cmp(&selection[b].response_time_ms)
            .unwrap_or(Ordering::Equal)
    });
    let rank = order.iter().position(|&i| selection[i].id == id)?;
    if n == 1 {
        Some(0)
    } else {
        Some((rank * 100 / (n - 1)) as u8)
    }
}

/// Five-level qualitative classification relative to a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feeldex {
    VeryGood,
    Good,
    Fair,
    Poor,
    VeryBad,
}

impl Feeldex {
    pub fn label(&self) -> &'static str {
        match self {
            Feeldex::VeryGood => "very good",
            Feeldex::Good => "good",
            Feeldex::Fair => "fair",
            Feeldex::Poor => "poor",
            Feeldex::VeryBad => "very bad",
        }
    }
}

/// Classify `response_ms` against the quintile cutoffs (20/40/60/80th
/// percentile, nearest-rank) of the selection's response times.
pub fn feeldex(selection: &[Sample], response_ms: f64) -> Feeldex {
    let mut sorted: Vec<f64> = selection.iter().map(|s| s.response_time_ms).collect();
    if sorted.is_empty() {
        return Feeldex::Fair;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let cutoff = |pct: f64| -> f64 {
        // Nearest-rank: the smallest value with at least pct% at or below it.
        let idx = ((pct / 100.0 * sorted.len() as f64).ceil() as usize).max(1) - 1;
        sorted[idx.min(sorted.len() - 1)]
    };

    if response_ms <= cutoff(20.0) {
        Feeldex::VeryGood
    } else if response_ms <= cutoff(40.0) {
        Feeldex::Good
    } else if response_ms <= cutoff(60.0) {
        Feeldex::Fair
    } else if response_ms <= cutoff(80.0) {
        Feeldex::Poor
    } else {
        Feeldex::VeryBad
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Detail cache
// ─────────────────────────────────────────────────────────────────────────────

/// State of one detail-cache slot.
#[derive(Debug, Clone)]
pub enum DetailEntry {
    /// Fetch dispatched, result not in yet.
    Pending,
    Ready(DetailRecord),
    /// Negative cache: the fetch failed and will not be retried this session.
    Failed(String),
}

/// What [`DetailResolver::open`] decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Cache hit (positive or negative); nothing to fetch.
    Cached,
    /// The same key is already being fetched.
    InFlight,
    /// Caller must dispatch a fetch for this key (cancelling any prior one).
    StartFetch,
}

/// Session-lifetime cache of detail records plus the key currently shown.
///
/// Unbounded on purpose: key cardinality is capped by how many samples a
/// user can open in one session.
#[derive(Debug, Default)]
pub struct DetailResolver {
    cache: HashMap<DetailKey, DetailEntry>,
    current: Option<DetailKey>,
}

impl DetailResolver {
    /// Make `key` the shown record and decide whether a fetch is needed.
    ///
    /// Superseding a key whose fetch was still pending drops that slot: its
    /// fetch is being cancelled by the caller, so a later re-open must be
    /// allowed to fetch again.
    pub fn open(&mut self, key: DetailKey) -> OpenOutcome {
        if let Some(prev) = self.current.take() {
            if prev != key && matches!(self.cache.get(&prev), Some(DetailEntry::Pending)) {
                self.cache.remove(&prev);
            }
        }
        self.current = Some(key.clone());
        match self.cache.get(&key) {
            Some(DetailEntry::Ready(_)) | Some(DetailEntry::Failed(_)) => OpenOutcome::Cached,
            Some(DetailEntry::Pending) => OpenOutcome::InFlight,
            None => {
                self.cache.insert(key, DetailEntry::Pending);
                OpenOutcome::StartFetch
            }
        }
    }

    /// Record a fetch result under its own key.
    ///
    /// Results always land in the slot they were fetched for, so a late
    /// result from a superseded fetch can only ever fill *its* cache entry,
    /// never the one currently shown. A `Ready` slot is never downgraded.
    pub fn resolve(&mut self, key: DetailKey, result: Result<DetailRecord, FeedError>) {
        if matches!(self.cache.get(&key), Some(DetailEntry::Ready(_))) {
            return;
        }
        let entry = match result {
            Ok(record) => DetailEntry::Ready(record),
            Err(err) => DetailEntry::Failed(err.to_string()),
        };
        self.cache.insert(key, entry);
    }

    /// Cache entry for the key the panel is showing.
    pub fn current_entry(&self) -> Option<(&DetailKey, &DetailEntry)> {
        let key = self.current.as_ref()?;
        Some((key, self.cache.get(key)?))
    }

    #[inline]
    pub fn current_key(&self) -> Option<&DetailKey> {
        self.current.as_ref()
    }

    /// The shown key, when its fetch is still pending. Callers use this to
    /// decide whether a superseding open must cancel an in-flight fetch.
    pub fn pending_key(&self) -> Option<&DetailKey> {
        let key = self.current.as_ref()?;
        matches!(self.cache.get(key), Some(DetailEntry::Pending)).then_some(key)
    }

    /// Close the panel without touching the cache.
    pub fn close(&mut self) {
        if let Some(prev) = self.current.take() {
            if matches!(self.cache.get(&prev), Some(DetailEntry::Pending)) {
                self.cache.remove(&prev);
            }
        }
    }

    /// Drop everything (scope change).
    pub fn reset(&mut self) {
        self.cache.clear();
        self.current = None;
    }
}
