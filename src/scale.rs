//! Scale and layout: data-space to pixel-space mappings and axis ticks.
//!
//! The time domain comes from the store's tracked fetch span, never from raw
//! sample extrema, so a sparse window still spans its full coverage. The
//! value domain is `[0, upper]` with `upper` rounded up to a "nice" number.
//! All mapping math is done in `f64` and only cast to `f32` at the egui
//! boundary; this keeps pixel/data round trips well inside 1px.

use egui::{pos2, Pos2, Rect};

use crate::sample::Sample;

/// Target number of value-axis tick intervals.
const VALUE_TICK_TARGET: f64 = 5.0;
/// Headroom multiplier above the max response time.
const VALUE_PAD: f64 = 1.05;
/// Approximate horizontal pixels per time-axis segment.
const TIME_TICK_SPACING: f32 = 140.0;

/// Fixed plot margins; the left margin is computed from label width.
pub const MARGIN_TOP: f32 = 12.0;
pub const MARGIN_RIGHT: f32 = 16.0;
pub const MARGIN_BOTTOM: f32 = 28.0;
/// Gap between the value tick labels and the plot edge.
pub const TICK_LABEL_GAP: f32 = 8.0;

// ─────────────────────────────────────────────────────────────────────────────
// Value axis
// ─────────────────────────────────────────────────────────────────────────────

/// The response-time axis: domain `[0, upper]` plus its tick values.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueAxis {
    /// Top of the domain; a nice multiple of `step`.
    pub upper: f64,
    /// Tick spacing, 1/2/5/10 times a power of ten.
    pub step: f64,
    /// Tick values from 0 to `upper` inclusive.
    pub ticks: Vec<f64>,
}

/// Compute the value axis for a window whose largest response time is
/// `max_response_ms`.
///
/// The padded target is `max(1, max * 1.05)`. The step is the nice number
/// (1, 2, 5 or 10 times a power of ten) closest above `padded / 5`, and
/// `upper` is the smallest step multiple at or above the padded target.
pub fn compute_value_axis(max_response_ms: f64) -> ValueAxis {
    let max = if max_response_ms.is_finite() && max_response_ms > 0.0 {
        max_response_ms
    } else {
        0.0
    };
    let padded = (max * VALUE_PAD).max(1.0);
    let step = nice_step(padded / VALUE_TICK_TARGET);
    let upper = step * (padded / step).ceil();

    let count = (upper / step).round() as usize;
    let mut ticks = Vec::with_capacity(count + 1);
    for i in 0..=count {
        ticks.push(step * i as f64);
    }
    ValueAxis { upper, step, ticks }
}

/// Round `raw` up to the nearest 1/2/5/10 multiple of a power of ten.
fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Format a value tick for display. Sub-millisecond steps keep one decimal.
pub fn format_value_tick(value: f64, step: f64) -> String {
    if step >= 1.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Time axis
// ─────────────────────────────────────────────────────────────────────────────

/// Tick timestamps for the time axis.
///
/// The domain endpoints are always included exactly; interior ticks divide
/// the span evenly, with fewer segments on narrow plots.
pub fn time_ticks(from_ms: i64, to_ms: i64, plot_width: f32) -> Vec<i64> {
    if to_ms <= from_ms {
        return vec![from_ms];
    }
    let segments = ((plot_width / TIME_TICK_SPACING) as i64).clamp(1, 6);
    let span = to_ms - from_ms;
    let mut ticks = Vec::with_capacity(segments as usize + 1);
    for i in 0..=segments {
        // Integer math so the last tick is `to_ms` exactly.
        ticks.push(from_ms + span * i / segments);
    }
    ticks
}

/// Format a time tick as a wall-clock label in the viewer's zone.
///
/// ```
/// use latscope::scale::format_time_tick;
/// assert_eq!(format_time_tick(0, 0), "00:00:00");
/// assert_eq!(format_time_tick(90_000_000, 60), "02:00:00");
/// ```
pub fn format_time_tick(ts_ms: i64, tz_offset_min: i32) -> String {
    use chrono::{FixedOffset, TimeZone};
    let secs = tz_offset_min.clamp(-18 * 60, 18 * 60) * 60;
    let offset = FixedOffset::east_opt(secs).expect("offset clamped to ±18h");
    offset
        .timestamp_millis_opt(ts_ms)
        .single()
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_owned())
}

// ─────────────────────────────────────────────────────────────────────────────
// Pixel mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Carve the plot area out of the widget canvas.
///
/// The left margin depends on the widest rendered value label, so callers
/// measure their labels first (see the render code) and pass the width here.
pub fn plot_rect(canvas: Rect, widest_value_label: f32) -> Rect {
    let left = canvas.left() + widest_value_label + TICK_LABEL_GAP * 2.0;
    Rect::from_min_max(
        pos2(left, canvas.top() + MARGIN_TOP),
        pos2(canvas.right() - MARGIN_RIGHT, canvas.bottom() - MARGIN_BOTTOM),
    )
}

/// Bidirectional mapping between data space and pixel space for one frame.
#[derive(Debug, Clone, Copy)]
pub struct PlotTransform {
    rect: Rect,
    from_ms: i64,
    to_ms: i64,
    upper: f64,
}

impl PlotTransform {
    /// Build a transform over `rect` for the given domains. Degenerate
    /// domains are widened minimally so the mapping stays invertible.
    pub fn new(rect: Rect, from_ms: i64, to_ms: i64, upper: f64) -> Self {
        let to_ms = if to_ms > from_ms { to_ms } else { from_ms + 1 };
        let upper = if upper > 0.0 && upper.is_finite() {
            upper
        } else {
            1.0
        };
        Self {
            rect,
            from_ms,
            to_ms,
            upper,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn time_domain(&self) -> (i64, i64) {
        (self.from_ms, self.to_ms)
    }

    #[inline]
    pub fn value_upper(&self) -> f64 {
        self.upper
    }

    /// Pixel x of a timestamp.
    pub fn x_of(&self, ts_ms: i64) -> f32 {
        let f = (ts_ms - self.from_ms) as f64 / (self.to_ms - self.from_ms) as f64;
        (self.rect.left() as f64 + f * self.rect.width() as f64) as f32
    }

    /// Pixel y of a response time; larger values are higher on screen.
    pub fn y_of(&self, value_ms: f64) -> f32 {
        let f = value_ms / self.upper;
        (self.rect.bottom() as f64 - f * self.rect.height() as f64) as f32
    }

    /// Pixel position of a sample.
    #[inline]
    pub fn pos_of(&self, sample: &Sample) -> Pos2 {
        pos2(self.x_of(sample.timestamp_ms), self.y_of(sample.response_time_ms))
    }

    /// Inverse of [`x_of`](Self::x_of), rounded to whole milliseconds.
    pub fn time_at(&self, x: f32) -> i64 {
        let f = (x as f64 - self.rect.left() as f64) / self.rect.width() as f64;
        self.from_ms + (f * (self.to_ms - self.from_ms) as f64).round() as i64
    }

    /// Inverse of [`y_of`](Self::y_of).
    pub fn value_at(&self, y: f32) -> f64 {
        let f = (self.rect.bottom() as f64 - y as f64) / self.rect.height() as f64;
        f * self.upper
    }
}
