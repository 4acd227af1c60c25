//! latscope: a real-time response-time scatter scope built on egui/eframe.
//!
//! The scope polls a [`SampleFeed`] for latency samples, keeps a sliding
//! five-minute window of them, classifies every sample into a severity band
//! (warning / high / normal / low), and renders an animated, interactive
//! scatter plot with drag-to-select analytics and per-sample drill-down.
//!
//! Module map:
//! - `sample`, `feed`: data model and the async feed boundary
//! - `store`: sliding-window merge/evict logic and the continuation cursor
//! - `bands`: severity categorization
//! - `scale`: axis math and pixel mappings
//! - `anim`, `plot`, `interact`: rendering and pointer handling
//! - `detail`, `panels`: drill-down analytics, caching and popups
//! - `worker`, `app`: the background fetch thread and the tying-together app
//!
//! Minimal standalone use:
//!
//! ```no_run
//! use latscope::{
//!     run_latscope, DetailKey, DetailRecord, FeedError, FeedFuture, LatScopeConfig,
//!     SampleBatch, SampleFeed, SampleQuery,
//! };
//!
//! struct EmptyFeed;
//!
//! impl SampleFeed for EmptyFeed {
//!     fn fetch_samples(&mut self, _query: SampleQuery) -> FeedFuture<SampleBatch> {
//!         Box::pin(async { Ok(SampleBatch::default()) })
//!     }
//!     fn fetch_detail(&mut self, _key: DetailKey) -> FeedFuture<DetailRecord> {
//!         Box::pin(async { Err(FeedError::transport("no details here")) })
//!     }
//! }
//!
//! fn main() -> eframe::Result<()> {
//!     run_latscope(EmptyFeed, LatScopeConfig::default())
//! }
//! ```

pub mod anim;
pub mod app;
pub mod bands;
pub mod config;
pub mod detail;
pub mod feed;
pub mod interact;
pub mod panels;
pub mod plot;
pub mod sample;
pub mod scale;
pub mod selection;
pub mod store;
pub mod theme;
pub mod worker;

// Public re-exports for a compact external API
pub use app::{run_latscope, LatScopeApp};
pub use bands::{categorize, BandAssignment, SeverityBand, DEFAULT_WARNING_LIMIT_MS};
pub use config::{
    InteractionConfig, LatScopeConfig, PollConfig, DEFAULT_POLL_INTERVAL, DEFAULT_WINDOW_MS,
};
pub use detail::{feeldex, percentile_rank, DetailEntry, DetailResolver, Feeldex};
pub use feed::{
    FeedError, FeedFuture, FetchKind, QueryScope, SampleBatch, SampleFeed, SampleQuery,
};
pub use sample::{DetailKey, DetailRecord, DeviceTelemetry, Sample, SampleAttrs};
pub use selection::{Selection, SelectionBounds};
pub use store::{MergeStats, SampleStore};
pub use theme::{ScatterTheme, ThemeChoice};
pub use worker::{FeedEvent, FeedWorker};
