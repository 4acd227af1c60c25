//! Configuration for the scope.
//!
//! Everything has a sensible default; most embedders only set
//! [`LatScopeConfig::scope`] and leave the rest alone.

use std::time::Duration;

use crate::bands::DEFAULT_WARNING_LIMIT_MS;
use crate::feed::QueryScope;
use crate::theme::ThemeChoice;

/// Default trailing window width: five minutes.
pub const DEFAULT_WINDOW_MS: i64 = 5 * 60 * 1000;
/// Default incremental poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Top-level configuration, passed to
/// [`LatScopeApp::new`](crate::LatScopeApp::new).
#[derive(Debug, Clone, PartialEq)]
pub struct LatScopeConfig {
    /// Backend scope (application, OS filter, time zone). Changing it at
    /// runtime goes through [`LatScopeApp::set_scope`](crate::LatScopeApp::set_scope),
    /// which resets all window state.
    pub scope: QueryScope,
    /// Window width and poll cadence.
    pub poll: PollConfig,
    /// Absolute response-time limit (ms) above which a sample is `Warning`.
    /// May be changed at runtime; bands are recomputed on the next pass.
    pub warning_limit_ms: f64,
    /// Pointer-interaction tuning.
    pub interaction: InteractionConfig,
    /// Built-in color theme.
    pub theme: ThemeChoice,
    /// Show the band legend above the plot.
    pub show_legend: bool,
    /// Window title when running standalone.
    pub title: String,
}

impl Default for LatScopeConfig {
    fn default() -> Self {
        Self {
            scope: QueryScope::default(),
            poll: PollConfig::default(),
            warning_limit_ms: DEFAULT_WARNING_LIMIT_MS,
            interaction: InteractionConfig::default(),
            theme: ThemeChoice::default(),
            show_legend: true,
            title: "Response time scope".to_owned(),
        }
    }
}

/// Window and polling cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Width of the trailing sample window in milliseconds.
    pub window_ms: i64,
    /// Interval between incremental fetches.
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Pointer-interaction tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionConfig {
    /// Marker edge length in pixels.
    pub marker_px: f32,
    /// Hover hit-test radius in pixels.
    pub hover_radius_px: f32,
    /// Minimum drag rectangle edge; anything smaller is treated as a click.
    pub min_drag_px: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            marker_px: 6.0,
            hover_radius_px: 13.0,
            min_drag_px: 2.0,
        }
    }
}
