//! Drill-down panel for one opened sample.

use egui::{Color32, Context, Grid, RichText};

use crate::detail::{feeldex, percentile_rank, DetailEntry, Feeldex};
use crate::sample::Sample;
use crate::scale::format_time_tick;
use crate::selection::Selection;
use crate::theme::ScatterTheme;

/// Show the drill-down window. Returns false once the user closed it.
pub fn detail_window(
    ctx: &Context,
    sample: &Sample,
    selection: &Selection,
    entry: Option<&DetailEntry>,
    tz_offset_min: i32,
    theme: &ScatterTheme,
) -> bool {
    let mut open = true;

    egui::Window::new("Sample detail")
        .open(&mut open)
        .default_width(300.0)
        .show(ctx, |ui| {
            ui.heading(format!("{:.0} ms", sample.response_time_ms));
            ui.label(format_time_tick(sample.timestamp_ms, tz_offset_min));
            ui.separator();

            // Analytics are relative to the selection the sample came from.
            if let Some(rank) = percentile_rank(&selection.samples, &sample.id) {
                ui.label(format!("Slower than {rank}% of the selection"));
            }
            let feel = feeldex(&selection.samples, sample.response_time_ms);
            ui.label(
                RichText::new(feel.label())
                    .color(feeldex_color(feel, theme))
                    .strong(),
            );
            ui.separator();

            attrs_grid(ui, sample);

            match entry {
                None | Some(DetailEntry::Pending) => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Fetching record…");
                    });
                }
                Some(DetailEntry::Ready(record)) => {
                    ui.separator();
                    Grid::new("detail_record")
                        .num_columns(2)
                        .striped(true)
                        .show(ui, |ui| {
                            ui.label("Status");
                            ui.label(record.status_code.to_string());
                            ui.end_row();
                            ui.label("Sent");
                            ui.label(format_bytes(record.bytes_sent));
                            ui.end_row();
                            ui.label("Received");
                            ui.label(format_bytes(record.bytes_received));
                            ui.end_row();
                            ui.label("Wait");
                            ui.label(format!("{:.0} ms", record.wait_ms));
                            ui.end_row();
                            ui.label("Download");
                            ui.label(format!("{:.0} ms", record.download_ms));
                            ui.end_row();
                            if let Some(battery) = record.telemetry.battery_pct {
                                ui.label("Battery");
                                ui.label(format!("{battery:.0}%"));
                                ui.end_row();
                            }
                            if let Some(mem) = record.telemetry.memory_mb {
                                ui.label("Memory");
                                ui.label(format!("{mem:.0} MB"));
                                ui.end_row();
                            }
                            if let Some(signal) = record.telemetry.signal_dbm {
                                ui.label("Signal");
                                ui.label(format!("{signal} dBm"));
                                ui.end_row();
                            }
                            if let Some(carrier) = record.telemetry.carrier.as_deref() {
                                ui.label("Carrier");
                                ui.label(carrier);
                                ui.end_row();
                            }
                        });
                }
                Some(DetailEntry::Failed(msg)) => {
                    ui.colored_label(theme.error_text, format!("Record unavailable: {msg}"));
                }
            }
        });

    open
}

fn attrs_grid(ui: &mut egui::Ui, sample: &Sample) {
    Grid::new("detail_attrs").num_columns(2).show(ui, |ui| {
        if !sample.attrs.device_id.is_empty() {
            ui.label("Device");
            ui.label(
                sample
                    .attrs
                    .device_model
                    .as_deref()
                    .unwrap_or(&sample.attrs.device_id),
            );
            ui.end_row();
        }
        if let Some(url) = sample.attrs.url.as_deref() {
            ui.label("URL");
            ui.label(url);
            ui.end_row();
        }
        if let Some(network) = sample.attrs.network.as_deref() {
            ui.label("Network");
            ui.label(network);
            ui.end_row();
        }
        if let Some(app) = sample.attrs.app_version.as_deref() {
            ui.label("App");
            ui.label(app);
            ui.end_row();
        }
        if let Some(os) = sample.attrs.os_version.as_deref() {
            ui.label("OS");
            ui.label(os);
            ui.end_row();
        }
    });
}

fn feeldex_color(feel: Feeldex, theme: &ScatterTheme) -> Color32 {
    match feel {
        Feeldex::VeryGood | Feeldex::Good => theme.low,
        Feeldex::Fair => theme.normal,
        Feeldex::Poor => theme.high,
        Feeldex::VeryBad => theme.warning,
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
