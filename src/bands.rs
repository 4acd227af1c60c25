//! Severity banding: warning / high / normal / low.
//!
//! Bands are assigned, never stored. Every window mutation triggers a full
//! recompute, which keeps the classification honest under eviction and
//! last-write-wins merges.

use std::cmp::Ordering;

use crate::sample::Sample;

/// Default absolute warning threshold in milliseconds.
pub const DEFAULT_WARNING_LIMIT_MS: f64 = 1200.0;

/// Severity of one sample relative to the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeverityBand {
    /// Response time at or above the absolute warning limit.
    Warning,
    /// Top 30% of the remaining population by response time.
    High,
    /// Next 40%.
    Normal,
    /// Bottom 30%.
    Low,
}

impl SeverityBand {
    /// All bands in display order (worst first).
    pub const ALL: [SeverityBand; 4] = [
        SeverityBand::Warning,
        SeverityBand::High,
        SeverityBand::Normal,
        SeverityBand::Low,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SeverityBand::Warning => "Warning",
            SeverityBand::High => "High",
            SeverityBand::Normal => "Normal",
            SeverityBand::Low => "Low",
        }
    }
}

/// Result of one categorization pass, parallel to the input slice.
#[derive(Debug, Clone, Default)]
pub struct BandAssignment {
    bands: Vec<SeverityBand>,
    counts: [usize; 4],
}

impl BandAssignment {
    /// Band of the sample at `index` in the categorized slice.
    #[inline]
    pub fn band(&self, index: usize) -> SeverityBand {
        self.bands[index]
    }

    /// Number of samples assigned to `band`.
    #[inline]
    pub fn count(&self, band: SeverityBand) -> usize {
        self.counts[band_slot(band)]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Iterate `(index, band)` pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, SeverityBand)> + '_ {
        self.bands.iter().copied().enumerate()
    }
}

#[inline]
fn band_slot(band: SeverityBand) -> usize {
    match band {
        SeverityBand::Warning => 0,
        SeverityBand::High => 1,
        SeverityBand::Normal => 2,
        SeverityBand::Low => 3,
    }
}

/// Assign a severity band to every sample.
///
/// Samples at or above `warning_limit_ms` are `Warning` regardless of rank
/// and excluded from the relative population. The rest are ranked by
/// response time descending (stable sort, so equal response times keep
/// their input order): the first `ceil(0.3 N)` are `High`, the next
/// `ceil(0.7 N) - ceil(0.3 N)` are `Normal`, the remainder `Low`.
pub fn categorize(samples: &[Sample], warning_limit_ms: f64) -> BandAssignment {
    let mut bands = vec![SeverityBand::Low; samples.len()];
    let mut counts = [0usize; 4];

    let mut safe: Vec<usize> = Vec::with_capacity(samples.len());
    for (i, sample) in samples.iter().enumerate() {
        if sample.response_time_ms >= warning_limit_ms {
            bands[i] = SeverityBand::Warning;
            counts[band_slot(SeverityBand::Warning)] += 1;
        } else {
            safe.push(i);
        }
    }

    // Stable: ties keep insertion order, so assignment is deterministic
    // across re-renders with unchanged input.
    safe.sort_by(|&a, &b| {
        samples[b]
            .response_time_ms
            .partial_cmp(&samples[a].response_time_ms)
            .unwrap_or(Ordering::Equal)
    });

    let n = safe.len();
    let high_end = (0.3 * n as f64).ceil() as usize;
    let normal_end = (0.7 * n as f64).ceil() as usize;
    for (rank, &idx) in safe.iter().enumerate() {
        let band = if rank < high_end {
            SeverityBand::High
        } else if rank < normal_end {
            SeverityBand::Normal
        } else {
            SeverityBand::Low
        };
        bands[idx] = band;
        counts[band_slot(band)] += 1;
    }

    BandAssignment { bands, counts }
}
