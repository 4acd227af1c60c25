//! Example: synthetic APM traffic
//!
//! What it demonstrates
//! - Implementing [`SampleFeed`] for a generated workload: log-normal-ish
//!   response times with occasional slow spikes over the warning limit.
//! - The full pipeline with no backend: initial load, 2 s incremental polls,
//!   eviction, banding, entrance animation, drag-select and drill-down.
//! - Error paths: a few percent of incremental fetches fail on purpose
//!   (watch the log; the window keeps its stale data), and detail fetches
//!   occasionally fail to show the negative cache.
//!
//! How to run
//! ```bash
//! cargo run --example synthetic
//! ```

use std::time::Duration;

use latscope::{
    run_latscope, DetailKey, DetailRecord, DeviceTelemetry, FeedError, FeedFuture, FetchKind,
    LatScopeConfig, QueryScope, Sample, SampleAttrs, SampleBatch, SampleFeed, SampleQuery,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

const DEVICES: &[(&str, &str)] = &[
    ("dev-001", "Pixel 9"),
    ("dev-002", "Galaxy S25"),
    ("dev-003", "iPhone 15"),
    ("dev-004", "iPhone 16 Pro"),
    ("dev-005", "Pixel 8a"),
];

const URLS: &[&str] = &[
    "/api/v2/feed",
    "/api/v2/login",
    "/api/v2/search",
    "/api/v2/cart/checkout",
    "/api/v2/profile",
];

const NETWORKS: &[&str] = &["wifi", "5g", "lte"];

struct SyntheticFeed {
    rng: StdRng,
    seq: u64,
}

impl SyntheticFeed {
    fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seq: 0,
        }
    }

    fn sample_at(&mut self, ts_ms: i64) -> Sample {
        self.seq += 1;
        let (device_id, model) = DEVICES[self.rng.gen_range(0..DEVICES.len())];
        // Mostly fast, a long tail, and ~4% over the warning limit.
        let rt = if self.rng.gen_bool(0.04) {
            self.rng.gen_range(1250.0..2600.0)
        } else {
            let base: f64 = self.rng.gen_range(40.0..220.0);
            base + self.rng.gen_range(0.0f64..1.0).powi(3) * 700.0
        };
        Sample {
            id: format!("s-{}", self.seq),
            timestamp_ms: ts_ms,
            response_time_ms: rt,
            attrs: SampleAttrs {
                device_id: device_id.to_owned(),
                device_model: Some(model.to_owned()),
                url: Some(URLS[self.rng.gen_range(0..URLS.len())].to_owned()),
                network: Some(NETWORKS[self.rng.gen_range(0..NETWORKS.len())].to_owned()),
                app_version: Some("3.14.2".to_owned()),
                os_version: Some("15.1".to_owned()),
            },
        }
    }
}

impl SampleFeed for SyntheticFeed {
    fn fetch_samples(&mut self, query: SampleQuery) -> FeedFuture<SampleBatch> {
        // Simulated outage on a few incremental polls.
        if query.kind == FetchKind::Incremental && self.rng.gen_bool(0.03) {
            return Box::pin(async {
                tokio::time::sleep(Duration::from_millis(150)).await;
                Err(FeedError::transport("synthetic backend outage"))
            });
        }

        let window_ms = 5 * 60 * 1000;
        let mut t = query.from_ms.max(query.to_ms - window_ms);
        let mut samples = Vec::new();
        while t < query.to_ms {
            t += self.rng.gen_range(120..600);
            if t < query.to_ms {
                samples.push(self.sample_at(t));
            }
        }
        let batch = SampleBatch {
            samples,
            cursor_ms: Some(query.to_ms),
        };
        Box::pin(async move {
            // Pretend the backend takes a moment.
            tokio::time::sleep(Duration::from_millis(120)).await;
            Ok(batch)
        })
    }

    fn fetch_detail(&mut self, key: DetailKey) -> FeedFuture<DetailRecord> {
        let fail = self.rng.gen_bool(0.1);
        let record = DetailRecord {
            status_code: if self.rng.gen_bool(0.06) { 500 } else { 200 },
            bytes_sent: self.rng.gen_range(300..4_000),
            bytes_received: self.rng.gen_range(2_000..300_000),
            wait_ms: self.rng.gen_range(20.0..400.0),
            download_ms: self.rng.gen_range(5.0..150.0),
            telemetry: DeviceTelemetry {
                battery_pct: Some(self.rng.gen_range(8.0..100.0)),
                memory_mb: Some(self.rng.gen_range(120.0..900.0)),
                signal_dbm: Some(self.rng.gen_range(-115..-45)),
                carrier: Some("Acme Mobile".to_owned()),
            },
        };
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(350)).await;
            if fail {
                Err(FeedError::NotFound(format!(
                    "no record for {} at {}",
                    key.device_id, key.timestamp_ms
                )))
            } else {
                Ok(record)
            }
        })
    }
}

fn main() -> eframe::Result<()> {
    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .ok();

    let config = LatScopeConfig {
        scope: QueryScope {
            app_id: "demo-app".to_owned(),
            os_filter: None,
            tz_offset_min: 0,
        },
        ..Default::default()
    };
    run_latscope(SyntheticFeed::new(), config)
}
