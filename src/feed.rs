//! The feed boundary: how sample data enters the scope.
//!
//! Implement [`SampleFeed`] for your transport (HTTP, gRPC, a replay file,
//! a synthetic generator) and hand it to [`run_latscope`](crate::run_latscope)
//! or [`LatScopeApp::new`](crate::LatScopeApp::new). The scope drives all
//! polling, cancellation and retry policy itself; a feed only has to answer
//! two questions: "which samples landed in this time range?" and "what are
//! the details of this one sample?".

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sample::{DetailKey, DetailRecord, Sample};

/// Boxed future returned by feed calls.
///
/// Futures must be `'static`: the scope may outlive the borrow of the feed,
/// and cancellation is handled outside the future (it is simply dropped).
pub type FeedFuture<T> = Pin<Box<dyn Future<Output = Result<T, FeedError>> + Send>>;

/// Why a range of samples is being requested.
///
/// The scope treats the two kinds differently: an initial batch *replaces*
/// the window store, an incremental batch *merges* into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchKind {
    /// First load after start or a manual reload; covers the full history.
    Initial,
    /// Periodic top-up covering only the recent edge of the window.
    Incremental,
}

/// Opaque backend scope: which application, which OS slice, which zone.
///
/// The scope is threaded through every sample query unchanged. Changing any
/// of these fields at runtime resets the window, selection and hover state
/// before polling resumes (see [`LatScopeApp::set_scope`](crate::LatScopeApp::set_scope)).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryScope {
    /// Application identifier as the backend knows it.
    pub app_id: String,
    /// Optional OS-type filter ("android", "ios", ...); `None` means all.
    #[serde(default)]
    pub os_filter: Option<String>,
    /// Viewer's UTC offset in minutes, passed through to the backend.
    #[serde(default)]
    pub tz_offset_min: i32,
}

/// A request for samples captured in `[from_ms, to_ms]` (inclusive on both
/// ends, matching how the store filters on merge).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleQuery {
    pub scope: QueryScope,
    pub from_ms: i64,
    pub to_ms: i64,
    pub kind: FetchKind,
}

/// One batch of samples plus the backend's progress cursor.
///
/// `cursor_ms` is the capture time of the newest sample the backend had
/// *committed* when it answered; the next incremental query resumes from it.
/// Backends that cannot provide one return `None` and the scope falls back
/// to the request's own upper bound.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleBatch {
    #[serde(default)]
    pub samples: Vec<Sample>,
    #[serde(default)]
    pub cursor_ms: Option<i64>,
}

/// Data source for the scope.
///
/// Both methods return boxed futures so implementations are free to use any
/// async client. Errors are classified by [`FeedError`]; the scope decides
/// per call site whether an error clears the view, is logged and skipped, or
/// is cached as a negative result.
pub trait SampleFeed: Send + 'static {
    /// Fetch every sample whose capture time falls inside the query range.
    fn fetch_samples(&mut self, query: SampleQuery) -> FeedFuture<SampleBatch>;

    /// Fetch the detail record of a single sample.
    fn fetch_detail(&mut self, key: DetailKey) -> FeedFuture<DetailRecord>;
}

/// Errors a feed can produce.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The request never produced a usable response (connection refused,
    /// timeout, mid-stream drop).
    #[error("transport failure: {0}")]
    Transport(String),
    /// The backend answered but refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),
    /// The response arrived but could not be decoded.
    #[error("decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// The requested entity does not exist (e.g. detail for an evicted sample).
    #[error("not found: {0}")]
    NotFound(String),
}

impl FeedError {
    /// Convenience constructor for transport-class failures.
    pub fn transport(msg: impl Into<String>) -> Self {
        FeedError::Transport(msg.into())
    }
}
