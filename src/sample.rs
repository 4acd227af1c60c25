//! Core data model: latency samples and their lazily-fetched detail records.
//!
//! A [`Sample`] is one observation from the backend feed. Samples are
//! immutable once received; the window store only inserts or evicts whole
//! samples. A [`DetailRecord`] is the expanded form of a single sample,
//! fetched on demand and cached by [`DetailKey`].

use serde::{Deserialize, Deserializer, Serialize};

/// One latency observation.
///
/// `timestamp_ms` and `response_time_ms` drive every algorithm in the crate;
/// [`SampleAttrs`] is display-only payload. Feeds that speak JSON can
/// deserialize their payload rows straight into this type: timestamps are
/// accepted as integers or floats, and non-finite values are mapped to
/// sentinels that [`Sample::is_well_formed`] rejects, so one malformed row
/// never poisons a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Unique id assigned by the backend.
    pub id: String,
    /// Capture time, epoch milliseconds.
    #[serde(deserialize_with = "lenient_epoch_ms")]
    pub timestamp_ms: i64,
    /// Measured response time in milliseconds (non-negative).
    #[serde(deserialize_with = "lenient_millis", default = "nan")]
    pub response_time_ms: f64,
    /// Descriptive attributes, shown in tooltips and the drill-down panel.
    #[serde(default)]
    pub attrs: SampleAttrs,
}

impl Sample {
    /// Whether the numeric fields are usable.
    ///
    /// Ill-formed samples are dropped at ingest so NaN can never reach the
    /// scale domain or band ranking.
    pub fn is_well_formed(&self) -> bool {
        self.timestamp_ms > 0 && self.response_time_ms.is_finite() && self.response_time_ms >= 0.0
    }

    /// Cache key of this sample's detail record.
    pub fn detail_key(&self) -> DetailKey {
        DetailKey {
            device_id: self.attrs.device_id.clone(),
            timestamp_ms: self.timestamp_ms,
        }
    }
}

/// Display-only attributes attached to a sample.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleAttrs {
    /// Device identifier; together with the timestamp it keys the detail record.
    #[serde(default)]
    pub device_id: String,
    /// Human-readable device model ("Pixel 9", "iPhone 15", ...).
    #[serde(default)]
    pub device_model: Option<String>,
    /// Request URL (or screen/transaction name).
    #[serde(default)]
    pub url: Option<String>,
    /// Network type ("wifi", "5g", ...).
    #[serde(default)]
    pub network: Option<String>,
    /// Application version string.
    #[serde(default)]
    pub app_version: Option<String>,
    /// OS version string.
    #[serde(default)]
    pub os_version: Option<String>,
}

/// Cache key for a detail record: the backend resolves details by device id
/// plus the exact capture timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DetailKey {
    pub device_id: String,
    pub timestamp_ms: i64,
}

/// Expanded record for one sample, fetched lazily by [`DetailKey`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    /// HTTP status code of the observed request.
    pub status_code: u16,
    /// Request payload size in bytes.
    #[serde(default)]
    pub bytes_sent: u64,
    /// Response payload size in bytes.
    #[serde(default)]
    pub bytes_received: u64,
    /// Time spent waiting for the first byte, milliseconds.
    #[serde(default)]
    pub wait_ms: f64,
    /// Time spent downloading the body, milliseconds.
    #[serde(default)]
    pub download_ms: f64,
    /// Device telemetry captured alongside the request.
    #[serde(default)]
    pub telemetry: DeviceTelemetry,
}

/// Device-side telemetry snapshot inside a [`DetailRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceTelemetry {
    /// Battery level 0..=100 at capture time.
    #[serde(default)]
    pub battery_pct: Option<f64>,
    /// App memory footprint in megabytes.
    #[serde(default)]
    pub memory_mb: Option<f64>,
    /// Cellular/Wi-Fi signal strength in dBm.
    #[serde(default)]
    pub signal_dbm: Option<i32>,
    /// Carrier name, if cellular.
    #[serde(default)]
    pub carrier: Option<String>,
}

fn nan() -> f64 {
    f64::NAN
}

/// Accept epoch timestamps as JSON integers or floats; non-finite floats
/// become `0`, which `is_well_formed` rejects.
fn lenient_epoch_ms<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    let raw = f64::deserialize(de)?;
    if raw.is_finite() {
        Ok(raw as i64)
    } else {
        Ok(0)
    }
}

/// Accept millisecond durations as numbers or `null`; absent/null become NaN,
/// which `is_well_formed` rejects.
fn lenient_millis<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(de)?.unwrap_or(f64::NAN))
}
