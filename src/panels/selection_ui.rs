//! Selection popup: the samples captured by a drag, with CSV export.

use egui::{Align, Color32, Context, Layout, RichText, ScrollArea};

use crate::bands::SeverityBand;
use crate::scale::format_time_tick;
use crate::selection::{self, Selection};
use crate::theme::ScatterTheme;

/// What the user did in the selection popup this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAction {
    None,
    /// Open the drill-down for `selection.samples[index]`.
    OpenDetail(usize),
    Closed,
}

/// Show the selection popup. Returns the action taken this frame.
pub fn selection_window(
    ctx: &Context,
    selection: &Selection,
    warning_limit_ms: f64,
    tz_offset_min: i32,
    theme: &ScatterTheme,
) -> SelectionAction {
    let mut action = SelectionAction::None;
    let mut open = true;

    egui::Window::new("Selection")
        .open(&mut open)
        .default_width(340.0)
        .resizable(true)
        .show(ctx, |ui| {
            let b = &selection.bounds;
            ui.label(format!(
                "{} – {}   ·   {:.0}–{:.0} ms",
                format_time_tick(b.from_ms, tz_offset_min),
                format_time_tick(b.to_ms, tz_offset_min),
                b.min_rt_ms,
                b.max_rt_ms,
            ));
            ui.horizontal(|ui| {
                ui.label(format!("{} samples", selection.len()));
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("Export CSV").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .set_file_name("selection.csv")
                            .add_filter("CSV", &["csv"])
                            .save_file()
                        {
                            if let Err(e) = selection::write_csv_path(&path, selection) {
                                eprintln!("Failed to export selection CSV: {e}");
                            }
                        }
                    }
                });
            });
            ui.separator();

            ScrollArea::vertical().max_height(260.0).show(ui, |ui| {
                for (i, sample) in selection.samples.iter().enumerate() {
                    let color = if sample.response_time_ms >= warning_limit_ms {
                        theme.band_color(SeverityBand::Warning)
                    } else {
                        Color32::PLACEHOLDER
                    };
                    let device = sample
                        .attrs
                        .device_model
                        .as_deref()
                        .unwrap_or(&sample.attrs.device_id);
                    let row = format!(
                        "{}   {:>6.0} ms   {}",
                        format_time_tick(sample.timestamp_ms, tz_offset_min),
                        sample.response_time_ms,
                        device,
                    );
                    let label = ui.selectable_label(false, RichText::new(row).color(color).monospace());
                    let label = if let Some(url) = sample.attrs.url.as_deref() {
                        label.on_hover_text(url)
                    } else {
                        label
                    };
                    if label.clicked() {
                        action = SelectionAction::OpenDetail(i);
                    }
                }
            });
        });

    if !open {
        SelectionAction::Closed
    } else {
        action
    }
}
