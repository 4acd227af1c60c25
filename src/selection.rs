//! Drag selections: data-space bounds plus the samples they captured.
//!
//! A selection is transient. It is created from a completed drag gesture,
//! snapshots the matching samples at creation time (so later merges and
//! evictions cannot mutate an open popup), and dies when the next drag
//! starts or the scope resets.

use chrono::{TimeZone, Utc};

use crate::sample::Sample;

/// Inclusive data-space rectangle produced by a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionBounds {
    pub from_ms: i64,
    pub to_ms: i64,
    pub min_rt_ms: f64,
    pub max_rt_ms: f64,
}

impl SelectionBounds {
    /// Normalize so `from <= to` and `min <= max` regardless of drag direction.
    pub fn normalized(self) -> Self {
        Self {
            from_ms: self.from_ms.min(self.to_ms),
            to_ms: self.from_ms.max(self.to_ms),
            min_rt_ms: self.min_rt_ms.min(self.max_rt_ms),
            max_rt_ms: self.min_rt_ms.max(self.max_rt_ms),
        }
    }

    /// Membership test, inclusive on both axes.
    pub fn contains(&self, sample: &Sample) -> bool {
        sample.timestamp_ms >= self.from_ms
            && sample.timestamp_ms <= self.to_ms
            && sample.response_time_ms >= self.min_rt_ms
            && sample.response_time_ms <= self.max_rt_ms
    }
}

/// A completed selection: its bounds and the captured samples.
#[derive(Debug, Clone)]
pub struct Selection {
    pub bounds: SelectionBounds,
    /// Captured samples, in window insertion order.
    pub samples: Vec<Sample>,
}

impl Selection {
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Build a selection from `bounds`, or `None` when no sample falls inside.
///
/// An empty rectangle never becomes a selection; the gesture that produced
/// it is treated as a click.
pub fn select_within(samples: &[Sample], bounds: SelectionBounds) -> Option<Selection> {
    let bounds = bounds.normalized();
    let hit: Vec<Sample> = samples.iter().filter(|s| bounds.contains(s)).cloned().collect();
    if hit.is_empty() {
        None
    } else {
        Some(Selection { bounds, samples: hit })
    }
}

/// Render a selection as CSV for export.
pub fn selection_csv(selection: &Selection) -> String {
    let mut out = String::new();
    out.push_str("id,timestamp_ms,timestamp_utc,response_time_ms,device_id,device_model,url,network,app_version,os_version\n");
    for s in &selection.samples {
        let iso = Utc
            .timestamp_millis_opt(s.timestamp_ms)
            .single()
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default();
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            csv_field(&s.id),
            s.timestamp_ms,
            iso,
            s.response_time_ms,
            csv_field(&s.attrs.device_id),
            csv_field(s.attrs.device_model.as_deref().unwrap_or("")),
            csv_field(s.attrs.url.as_deref().unwrap_or("")),
            csv_field(s.attrs.network.as_deref().unwrap_or("")),
            csv_field(s.attrs.app_version.as_deref().unwrap_or("")),
            csv_field(s.attrs.os_version.as_deref().unwrap_or("")),
        ));
    }
    out
}

/// Write a selection to `path` as CSV.
pub fn write_csv_path(path: &std::path::Path, selection: &Selection) -> std::io::Result<()> {
    std::fs::write(path, selection_csv(selection))
}

/// Quote a CSV field when it contains a delimiter, quote or newline.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_owned()
    }
}
