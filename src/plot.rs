//! The scatter plot widget: axes, markers, selection highlight, hover ring,
//! tooltip, and the pointer wiring that feeds the drag controller.
//!
//! Everything is drawn with the raw egui painter so the crate's own scale
//! and hit-test math stays authoritative; no intermediate plot library sits
//! between the data and the pixels.

use egui::{
    pos2, vec2, Align2, Color32, Pos2, Rect, Sense, Shape, Stroke, StrokeKind, TextStyle, Ui, Vec2,
};

use crate::anim::EntryAnimator;
use crate::bands::{BandAssignment, SeverityBand};
use crate::config::InteractionConfig;
use crate::interact::{self, DragController};
use crate::sample::Sample;
use crate::scale::{
    self, compute_value_axis, format_time_tick, format_value_tick, time_ticks, PlotTransform,
};
use crate::selection::{self, Selection, SelectionBounds};
use crate::theme::ScatterTheme;

/// Fill opacity of the selection highlight region.
const SELECTION_FILL_OPACITY: f32 = 0.35;
/// Opacity of bands other than the hovered legend band.
const DIM_OPACITY: f32 = 0.25;
/// Dash pattern of the selection border.
const DASH_LEN: f32 = 4.0;
const DASH_GAP: f32 = 3.0;

/// What the plot observed this frame.
#[derive(Debug, Default)]
pub struct PlotResponse {
    /// Index of the hovered sample, if any.
    pub hovered: Option<usize>,
    /// True when a pointer-down inside the plot cleared existing selection
    /// and hover state this frame.
    pub pressed: bool,
    /// A drag finished and captured at least one sample.
    pub new_selection: Option<Selection>,
    /// At least one entrance flight is still running; the caller must keep
    /// requesting frames.
    pub animating: bool,
}

/// One frame of the scatter plot.
///
/// Borrow-only view over the app state plus the two pieces of mutable
/// gesture/animation state it advances.
pub struct ScatterPlot<'a> {
    pub samples: &'a [Sample],
    pub bands: &'a BandAssignment,
    /// Tracked coverage span of the store.
    pub span: (i64, i64),
    pub tz_offset_min: i32,
    /// Committed selection bounds to highlight, if any.
    pub selection: Option<&'a SelectionBounds>,
    /// Legend band being hovered; all other bands draw dimmed.
    pub dim_except: Option<SeverityBand>,
    /// Message to show centered in the plot instead of data ("loading",
    /// an error line). The bool marks it as an error.
    pub overlay: Option<(&'a str, bool)>,
    pub theme: &'a ScatterTheme,
    pub interaction: &'a InteractionConfig,
    pub drag: &'a mut DragController,
    pub animator: &'a mut EntryAnimator,
}

impl ScatterPlot<'_> {
    pub fn show(mut self, ui: &mut Ui) -> PlotResponse {
        let mut out = PlotResponse::default();

        let desired = ui.available_size().max(vec2(120.0, 90.0));
        let (canvas, response) = ui.allocate_exact_size(desired, Sense::drag());
        if !ui.is_rect_visible(canvas) {
            return out;
        }

        let painter = ui.painter_at(canvas);
        painter.rect_filled(canvas, 0.0, self.theme.background);

        // Value axis first: the left margin depends on the widest label.
        let axis = compute_value_axis(max_response(self.samples));

        let tick_font = TextStyle::Small.resolve(ui.style());
        let widest_label = ui.fonts(|fonts| {
            axis.ticks
                .iter()
                .map(|&t| {
                    fonts
                        .layout_no_wrap(
                            format_value_tick(t, axis.step),
                            tick_font.clone(),
                            Color32::WHITE,
                        )
                        .rect
                        .width()
                })
                .fold(0.0f32, f32::max)
        });

        let plot = scale::plot_rect(canvas, widest_label);
        if plot.width() < 10.0 || plot.height() < 10.0 {
            return out;
        }
        painter.rect_filled(plot, 0.0, self.theme.plot_background);

        let (from_ms, to_ms) = self.span;
        let transform = PlotTransform::new(plot, from_ms, to_ms, axis.upper);

        self.draw_value_axis(&painter, &axis, &transform, &tick_font);
        if to_ms > from_ms {
            self.draw_time_axis(&painter, &transform, &tick_font);
        }
        painter.rect_stroke(
            plot,
            0.0,
            Stroke::new(1.0, self.theme.grid),
            StrokeKind::Inside,
        );

        // Gestures before drawing, so the highlight reflects this frame's
        // pointer position.
        self.handle_pointer(ui, &response, &transform, &mut out);

        // Highlight region: the live drag rect wins over a committed selection.
        let highlight = self.drag.active_rect().or_else(|| {
            self.selection.map(|b| {
                Rect::from_min_max(
                    pos2(transform.x_of(b.from_ms), transform.y_of(b.max_rt_ms)),
                    pos2(transform.x_of(b.to_ms), transform.y_of(b.min_rt_ms)),
                )
            })
        });
        if let Some(region) = highlight {
            let clipped = painter.with_clip_rect(plot);
            clipped.rect_filled(
                region,
                0.0,
                self.theme.selection_fill.gamma_multiply(SELECTION_FILL_OPACITY),
            );
            let stroke = Stroke::new(1.0, self.theme.selection_border);
            for [a, b] in edge_pairs(region) {
                clipped.extend(Shape::dashed_line(&[a, b], stroke, DASH_LEN, DASH_GAP));
            }
        }

        out.animating = self.draw_markers(ui, &painter, plot, &transform, out.hovered);

        if let Some((text, is_error)) = self.overlay {
            let color = if is_error {
                self.theme.error_text
            } else {
                self.theme.status_text
            };
            painter.text(
                plot.center(),
                Align2::CENTER_CENTER,
                text,
                TextStyle::Body.resolve(ui.style()),
                color,
            );
        }

        if let Some(idx) = out.hovered {
            if let Some(pointer) = response.hover_pos() {
                self.draw_tooltip(ui, &painter, canvas, pointer, idx);
            }
        }

        out
    }

    fn draw_value_axis(
        &self,
        painter: &egui::Painter,
        axis: &scale::ValueAxis,
        transform: &PlotTransform,
        font: &egui::FontId,
    ) {
        let plot = transform.rect();
        for &tick in &axis.ticks {
            let y = transform.y_of(tick);
            if tick > 0.0 {
                painter.line_segment(
                    [pos2(plot.left(), y), pos2(plot.right(), y)],
                    Stroke::new(1.0, self.theme.grid),
                );
            }
            painter.text(
                pos2(plot.left() - scale::TICK_LABEL_GAP, y),
                Align2::RIGHT_CENTER,
                format_value_tick(tick, axis.step),
                font.clone(),
                self.theme.axis_text,
            );
        }
        // Unit marker above the topmost label.
        painter.text(
            pos2(plot.left() - scale::TICK_LABEL_GAP, plot.top() - 2.0),
            Align2::RIGHT_BOTTOM,
            "ms",
            font.clone(),
            self.theme.axis_text,
        );
    }

    fn draw_time_axis(
        &self,
        painter: &egui::Painter,
        transform: &PlotTransform,
        font: &egui::FontId,
    ) {
        let plot = transform.rect();
        let (from_ms, to_ms) = transform.time_domain();
        let ticks = time_ticks(from_ms, to_ms, plot.width());
        let last = ticks.len().saturating_sub(1);
        for (i, &tick) in ticks.iter().enumerate() {
            let x = transform.x_of(tick);
            painter.line_segment(
                [pos2(x, plot.bottom()), pos2(x, plot.bottom() + 4.0)],
                Stroke::new(1.0, self.theme.grid),
            );
            if i > 0 && i < last {
                painter.line_segment(
                    [pos2(x, plot.top()), pos2(x, plot.bottom())],
                    Stroke::new(1.0, self.theme.grid.gamma_multiply(0.5)),
                );
            }
            // Anchor the endpoint labels inward so they stay on the canvas.
            let align = if i == 0 {
                Align2::LEFT_TOP
            } else if i == last {
                Align2::RIGHT_TOP
            } else {
                Align2::CENTER_TOP
            };
            painter.text(
                pos2(x, plot.bottom() + 6.0),
                align,
                format_time_tick(tick, self.tz_offset_min),
                font.clone(),
                self.theme.axis_text,
            );
        }
    }

    fn handle_pointer(
        &mut self,
        ui: &Ui,
        response: &egui::Response,
        transform: &PlotTransform,
        out: &mut PlotResponse,
    ) {
        let plot = transform.rect();

        if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.drag.cancel();
        }

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                if plot.contains(pos) {
                    self.drag.start(pos, plot);
                    out.pressed = true;
                }
            }
        } else if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.drag.update(pos, plot);
            }
        }

        if response.drag_stopped() {
            if let Some(rect) = self.drag.finish(self.interaction.min_drag_px) {
                let bounds = interact::bounds_of_rect(rect, transform);
                out.new_selection = selection::select_within(self.samples, bounds);
            }
        } else if self.drag.is_dragging() && !response.dragged() {
            // Capture was lost (pointer left, gesture interrupted): abort.
            self.drag.cancel();
        }

        if !self.drag.is_dragging() {
            if let Some(pointer) = response.hover_pos() {
                if plot.contains(pointer) {
                    out.hovered = interact::hover_hit(
                        self.samples,
                        transform,
                        pointer,
                        self.interaction.hover_radius_px,
                    );
                }
            }
        }
    }

    /// Draw all markers; returns true while any entrance flight is running.
    fn draw_markers(
        &mut self,
        ui: &Ui,
        painter: &egui::Painter,
        plot: Rect,
        transform: &PlotTransform,
        hovered: Option<usize>,
    ) -> bool {
        let now = ui.input(|i| i.time);
        self.animator.observe(self.samples, now);

        let m = self.interaction.marker_px;
        let half = m / 2.0;

        for (idx, band) in self.bands.iter() {
            let sample = &self.samples[idx];
            let target = transform.pos_of(sample);
            let (pos, _) = self.animator.pos_of(&sample.id, plot, target, now);

            let mut color = self.theme.band_color(band);
            if self.dim_except.is_some_and(|keep| keep != band) {
                color = color.gamma_multiply(DIM_OPACITY);
            }

            match band {
                SeverityBand::Warning => {
                    let stroke = Stroke::new(1.5, color);
                    painter.line_segment(
                        [
                            pos2(pos.x - half, pos.y - half),
                            pos2(pos.x + half, pos.y + half),
                        ],
                        stroke,
                    );
                    painter.line_segment(
                        [
                            pos2(pos.x - half, pos.y + half),
                            pos2(pos.x + half, pos.y - half),
                        ],
                        stroke,
                    );
                }
                _ => {
                    painter.rect_filled(Rect::from_center_size(pos, vec2(m, m)), 0.0, color);
                }
            }

            if hovered == Some(idx) {
                // Ring the glyph where it is drawn, even mid-flight.
                painter.circle_stroke(pos, half + 4.0, Stroke::new(1.5, self.theme.hover_ring));
            }
        }

        self.animator.any_active(now)
    }

    fn draw_tooltip(
        &self,
        ui: &Ui,
        painter: &egui::Painter,
        canvas: Rect,
        pointer: Pos2,
        idx: usize,
    ) {
        let sample = &self.samples[idx];
        let band = self.bands.band(idx);

        let mut text = format!(
            "{:.0} ms · {}\n{}",
            sample.response_time_ms,
            band.label(),
            format_time_tick(sample.timestamp_ms, self.tz_offset_min),
        );
        let device = sample
            .attrs
            .device_model
            .as_deref()
            .unwrap_or(&sample.attrs.device_id);
        if !device.is_empty() {
            text.push('\n');
            text.push_str(device);
        }
        if let Some(url) = sample.attrs.url.as_deref() {
            text.push('\n');
            text.push_str(url);
        }

        let font = TextStyle::Small.resolve(ui.style());
        let galley = ui.fonts(|fonts| fonts.layout(text, font, self.theme.axis_text, 260.0));

        let pad = Vec2::splat(6.0);
        let size = galley.rect.size() + pad * 2.0;
        let anchor = interact::tooltip_anchor(pointer, size, canvas);
        let bg = Rect::from_min_size(anchor, size);
        painter.rect_filled(bg, 3.0, self.theme.plot_background);
        painter.rect_stroke(bg, 3.0, Stroke::new(1.0, self.theme.grid), StrokeKind::Inside);
        painter.galley(anchor + pad, galley, self.theme.axis_text);
    }
}

fn max_response(samples: &[Sample]) -> f64 {
    samples
        .iter()
        .map(|s| s.response_time_ms)
        .fold(0.0f64, f64::max)
}

fn edge_pairs(rect: Rect) -> [[Pos2; 2]; 4] {
    [
        [rect.left_top(), rect.right_top()],
        [rect.right_top(), rect.right_bottom()],
        [rect.right_bottom(), rect.left_bottom()],
        [rect.left_bottom(), rect.left_top()],
    ]
}
