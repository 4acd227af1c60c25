//! Pointer interaction: drag rectangles and hover hit-testing.
//!
//! The gesture state machine lives here; the plot widget feeds it pointer
//! events from the egui response and consumes the outcomes (an active drag
//! rectangle to draw, a finished rectangle to convert into a selection, a
//! hovered sample index to ring and tooltip).

use egui::{pos2, Pos2, Rect, Vec2};

use crate::sample::Sample;
use crate::scale::PlotTransform;
use crate::selection::SelectionBounds;

/// An in-progress drag gesture in screen space.
#[derive(Debug, Clone, Copy)]
pub struct DragRect {
    pub origin: Pos2,
    pub current: Pos2,
}

impl DragRect {
    /// The rectangle spanned so far, corners normalized.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_two_pos(self.origin, self.current)
    }
}

/// Exclusive owner of drag state for the duration of a gesture.
///
/// egui gives us pointer capture for free (a started drag keeps reporting
/// to the same widget), so this is a plain state machine: start, move,
/// finish-or-cancel. Finishing returns the rectangle only when it meets the
/// minimum size; anything smaller was a click.
#[derive(Debug, Default)]
pub struct DragController {
    active: Option<DragRect>,
}

impl DragController {
    pub fn start(&mut self, pos: Pos2, plot: Rect) {
        let pos = clamp_to(pos, plot);
        self.active = Some(DragRect {
            origin: pos,
            current: pos,
        });
    }

    /// Extend the gesture; the live corner is clamped to the plot bounds.
    pub fn update(&mut self, pos: Pos2, plot: Rect) {
        if let Some(drag) = self.active.as_mut() {
            drag.current = clamp_to(pos, plot);
        }
    }

    /// Finish the gesture. Returns the spanned rectangle if it is at least
    /// `min_px` on both edges, `None` for click-sized gestures.
    pub fn finish(&mut self, min_px: f32) -> Option<Rect> {
        let rect = self.active.take()?.rect();
        if rect.width() >= min_px && rect.height() >= min_px {
            Some(rect)
        } else {
            None
        }
    }

    /// Abort without producing a rectangle (pointer left the widget, escape,
    /// scope reset).
    pub fn cancel(&mut self) {
        self.active = None;
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// The live rectangle to draw, if a gesture is in progress.
    #[inline]
    pub fn active_rect(&self) -> Option<Rect> {
        self.active.map(|d| d.rect())
    }
}

fn clamp_to(pos: Pos2, rect: Rect) -> Pos2 {
    pos2(
        pos.x.clamp(rect.left(), rect.right()),
        pos.y.clamp(rect.top(), rect.bottom()),
    )
}

/// Nearest sample within `radius_px` of the pointer, by settled position.
///
/// Returns the index into `samples`. Ties go to the earlier sample, which
/// keeps the hover stable while the pointer sits between two points.
pub fn hover_hit(
    samples: &[Sample],
    transform: &PlotTransform,
    pointer: Pos2,
    radius_px: f32,
) -> Option<usize> {
    let max_sq = radius_px * radius_px;
    let mut best: Option<(usize, f32)> = None;
    for (i, sample) in samples.iter().enumerate() {
        let d_sq = transform.pos_of(sample).distance_sq(pointer);
        if d_sq <= max_sq && best.map_or(true, |(_, b)| d_sq < b) {
            best = Some((i, d_sq));
        }
    }
    best.map(|(i, _)| i)
}

/// Convert a finished screen rectangle to inclusive data-space bounds.
pub fn bounds_of_rect(rect: Rect, transform: &PlotTransform) -> SelectionBounds {
    SelectionBounds {
        from_ms: transform.time_at(rect.left()),
        to_ms: transform.time_at(rect.right()),
        min_rt_ms: transform.value_at(rect.bottom()),
        max_rt_ms: transform.value_at(rect.top()),
    }
    .normalized()
}

/// Offset between the pointer and the tooltip's near corner.
const TOOLTIP_GAP: f32 = 14.0;

/// Place a tooltip of `size` near `pointer`, flipping to the other side of
/// the pointer when it would overflow `canvas`.
pub fn tooltip_anchor(pointer: Pos2, size: Vec2, canvas: Rect) -> Pos2 {
    let mut x = pointer.x + TOOLTIP_GAP;
    if x + size.x > canvas.right() {
        x = pointer.x - TOOLTIP_GAP - size.x;
    }
    let mut y = pointer.y + TOOLTIP_GAP;
    if y + size.y > canvas.bottom() {
        y = pointer.y - TOOLTIP_GAP - size.y;
    }
    pos2(x.max(canvas.left()), y.max(canvas.top()))
}
