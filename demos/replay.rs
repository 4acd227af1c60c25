//! Example: replay recorded samples from a JSON file
//!
//! What it demonstrates
//! - Feeding the scope from a recording: a JSON array of samples (the
//!   serialized [`Sample`] shape) is shifted so its oldest sample lands at
//!   "now", then served by capture time as the polls catch up to it. Samples
//!   stream into the window at their original pacing and age out again.
//! - Detail fetches answering `NotFound`, which the drill-down caches as a
//!   negative result.
//!
//! How to run
//! ```bash
//! cargo run --example replay -- recording.json
//! ```
//! where `recording.json` looks like:
//! ```json
//! [{"id":"a","timestamp_ms":1000,"response_time_ms":120.5,
//!   "attrs":{"device_id":"dev-1","device_model":"Pixel 9"}}]
//! ```

use latscope::{
    run_latscope, DetailKey, DetailRecord, FeedError, FeedFuture, LatScopeConfig, QueryScope,
    Sample, SampleBatch, SampleFeed, SampleQuery,
};

struct ReplayFeed {
    samples: Vec<Sample>,
}

impl SampleFeed for ReplayFeed {
    fn fetch_samples(&mut self, query: SampleQuery) -> FeedFuture<SampleBatch> {
        let slice: Vec<Sample> = self
            .samples
            .iter()
            .filter(|s| s.timestamp_ms >= query.from_ms && s.timestamp_ms <= query.to_ms)
            .cloned()
            .collect();
        let batch = SampleBatch {
            samples: slice,
            cursor_ms: Some(query.to_ms),
        };
        Box::pin(async move { Ok(batch) })
    }

    fn fetch_detail(&mut self, key: DetailKey) -> FeedFuture<DetailRecord> {
        Box::pin(async move {
            Err(FeedError::NotFound(format!(
                "recordings carry no detail records ({})",
                key.device_id
            )))
        })
    }
}

fn main() -> eframe::Result<()> {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: replay <recording.json>");
        std::process::exit(2);
    };
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("cannot read {path}: {e}");
            std::process::exit(1);
        }
    };
    let mut samples: Vec<Sample> = match serde_json::from_str(&raw) {
        Ok(samples) => samples,
        Err(e) => {
            eprintln!("cannot parse {path}: {e}");
            std::process::exit(1);
        }
    };

    // Shift the recording so its oldest sample is "now"; the rest arrive
    // live as the polls reach them.
    if let Some(oldest) = samples.iter().map(|s| s.timestamp_ms).min() {
        let delta = chrono::Utc::now().timestamp_millis() - oldest;
        for s in &mut samples {
            s.timestamp_ms += delta;
        }
    }

    let config = LatScopeConfig {
        scope: QueryScope {
            app_id: "replay".to_owned(),
            os_filter: None,
            tz_offset_min: 0,
        },
        ..Default::default()
    };
    run_latscope(ReplayFeed { samples }, config)
}
