//! The scope application: owns the window store, drives polling, drains
//! worker events, and lays out status row, legend, plot and panels.
//!
//! All state lives on the UI thread. The only other thread is the feed
//! worker; it communicates exclusively through the event channel drained at
//! the top of every frame, so no lock is ever held across a draw.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local, Utc};
use egui::RichText;
use log::{debug, error, warn};

use crate::anim::EntryAnimator;
use crate::bands::{categorize, BandAssignment, SeverityBand};
use crate::config::LatScopeConfig;
use crate::detail::{DetailResolver, OpenOutcome};
use crate::feed::{FetchKind, QueryScope, SampleFeed, SampleQuery};
use crate::interact::DragController;
use crate::panels::{detail_window, selection_window, SelectionAction};
use crate::plot::ScatterPlot;
use crate::sample::Sample;
use crate::selection::Selection;
use crate::store::SampleStore;
use crate::theme::ScatterTheme;
use crate::worker::{FeedEvent, FeedWorker};

/// Idle heartbeat while waiting for the initial batch.
const PENDING_REPAINT: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, PartialEq)]
enum LoadPhase {
    /// Initial fetch dispatched, nothing usable yet.
    Pending,
    /// Initial batch landed; incremental polling is running.
    Live,
    /// Initial fetch failed; polling never started.
    Failed(String),
}

/// The response-time scatter scope.
///
/// Embed it with [`show`](Self::show) inside any egui layout, or hand it to
/// [`run_latscope`](crate::run_latscope) for a standalone window.
pub struct LatScopeApp {
    config: LatScopeConfig,
    store: SampleStore,
    bands: BandAssignment,
    bands_stale: bool,
    worker: FeedWorker,
    resolver: DetailResolver,
    drag: DragController,
    animator: EntryAnimator,
    selection: Option<Selection>,
    /// Sample whose drill-down panel is open; only ever `Some` while
    /// `selection` is `Some`.
    opened: Option<Sample>,
    legend_hover: Option<SeverityBand>,
    phase: LoadPhase,
    /// Latest dispatched sample query; batches for any other query are
    /// stragglers from a cancelled fetch and are dropped.
    inflight: Option<SampleQuery>,
    last_poll: Option<Instant>,
    last_update: Option<DateTime<Local>>,
}

impl LatScopeApp {
    /// Create the scope and dispatch the initial fetch.
    ///
    /// `repaint` is the egui context the worker nudges when results land;
    /// pass it whenever one is available (headless tests pass `None`).
    pub fn new(
        feed: impl SampleFeed,
        config: LatScopeConfig,
        repaint: Option<egui::Context>,
    ) -> Self {
        let worker = FeedWorker::spawn(Box::new(feed), repaint);
        let store = SampleStore::new(config.poll.window_ms);
        let mut app = Self {
            config,
            store,
            bands: BandAssignment::default(),
            bands_stale: false,
            worker,
            resolver: DetailResolver::default(),
            drag: DragController::default(),
            animator: EntryAnimator::new(),
            selection: None,
            opened: None,
            legend_hover: None,
            phase: LoadPhase::Pending,
            inflight: None,
            last_poll: None,
            last_update: None,
        };
        app.start_initial();
        app
    }

    /// Replace the backend scope. Resets window, selection, hover and
    /// drill-down state before polling resumes with a fresh initial fetch.
    pub fn set_scope(&mut self, scope: QueryScope) {
        self.config.scope = scope;
        self.store.clear();
        self.bands = BandAssignment::default();
        self.bands_stale = false;
        self.selection = None;
        self.opened = None;
        self.drag.cancel();
        self.animator.reset();
        if self.resolver.pending_key().is_some() {
            self.worker.cancel_detail();
        }
        self.resolver.reset();
        self.start_initial();
    }

    /// Change the absolute warning limit; bands are recomputed on the next
    /// frame.
    pub fn set_warning_limit(&mut self, limit_ms: f64) {
        self.config.warning_limit_ms = limit_ms;
        self.bands_stale = true;
    }

    pub fn config(&self) -> &LatScopeConfig {
        &self.config
    }

    fn start_initial(&mut self) {
        self.phase = LoadPhase::Pending;
        let query = self
            .store
            .next_query(&self.config.scope, FetchKind::Initial, Utc::now().timestamp_millis());
        self.inflight = Some(query.clone());
        self.worker.fetch_samples(query);
    }

    fn drain_events(&mut self) {
        while let Some(event) = self.worker.poll_event() {
            match event {
                FeedEvent::Samples { query, result } => {
                    if self.inflight.as_ref() != Some(&query) {
                        debug!(
                            "dropping straggler batch for [{}, {}]",
                            query.from_ms, query.to_ms
                        );
                        continue;
                    }
                    self.inflight = None;
                    match result {
                        Ok(batch) => {
                            let stats = self.store.apply_batch(&query, batch);
                            debug!(
                                "merged batch: +{} ~{} -{} ({} malformed), {} in window",
                                stats.inserted,
                                stats.replaced,
                                stats.evicted,
                                stats.malformed,
                                self.store.len()
                            );
                            self.bands_stale = true;
                            self.last_update = Some(Local::now());
                            if self.phase != LoadPhase::Live {
                                self.phase = LoadPhase::Live;
                                self.last_poll = Some(Instant::now());
                            }
                        }
                        Err(err) => match query.kind {
                            FetchKind::Initial => {
                                error!("initial fetch failed: {err}");
                                self.store.clear();
                                self.bands = BandAssignment::default();
                                self.bands_stale = false;
                                self.phase = LoadPhase::Failed(err.to_string());
                            }
                            FetchKind::Incremental => {
                                warn!("incremental fetch failed, keeping stale window: {err}");
                            }
                        },
                    }
                }
                FeedEvent::Detail { key, result } => {
                    self.resolver.resolve(key, result);
                }
            }
        }
    }

    fn maybe_poll(&mut self) {
        if self.phase != LoadPhase::Live {
            return;
        }
        let due = self
            .last_poll
            .is_none_or(|t| t.elapsed() >= self.config.poll.interval);
        if !due {
            return;
        }
        let query = self.store.next_query(
            &self.config.scope,
            FetchKind::Incremental,
            Utc::now().timestamp_millis(),
        );
        // Dispatching while a previous fetch is still in flight cancels it
        // in the worker; its late batch is dropped by the inflight guard.
        self.inflight = Some(query.clone());
        self.worker.fetch_samples(query);
        self.last_poll = Some(Instant::now());
    }

    /// Render one frame of the scope into `ui`.
    pub fn show(&mut self, ui: &mut egui::Ui) {
        self.drain_events();
        if self.bands_stale {
            self.bands = categorize(self.store.samples(), self.config.warning_limit_ms);
            self.bands_stale = false;
        }
        self.maybe_poll();

        let theme = self.config.theme.theme();

        self.status_row(ui, &theme);

        let overlay_text: Option<(String, bool)> = match &self.phase {
            LoadPhase::Pending => Some(("Loading samples…".to_owned(), false)),
            LoadPhase::Failed(msg) => Some((format!("Fetch failed: {msg}"), true)),
            LoadPhase::Live if self.store.is_empty() => {
                Some(("No samples in window".to_owned(), false))
            }
            LoadPhase::Live => None,
        };

        let plot_out = ScatterPlot {
            samples: self.store.samples(),
            bands: &self.bands,
            span: self.store.span(),
            tz_offset_min: self.config.scope.tz_offset_min,
            selection: self.selection.as_ref().map(|s| &s.bounds),
            dim_except: self.legend_hover,
            overlay: overlay_text.as_ref().map(|(s, e)| (s.as_str(), *e)),
            theme: &theme,
            interaction: &self.config.interaction,
            drag: &mut self.drag,
            animator: &mut self.animator,
        }
        .show(ui);

        if plot_out.pressed {
            self.clear_selection();
        }
        if let Some(selection) = plot_out.new_selection {
            self.selection = Some(selection);
            self.opened = None;
        }

        self.selection_panel(ui.ctx(), &theme);
        self.detail_panel(ui.ctx(), &theme);

        if plot_out.animating {
            ui.ctx().request_repaint();
        } else {
            match self.phase {
                LoadPhase::Live => {
                    let until_poll = self
                        .last_poll
                        .map_or(Duration::ZERO, |t| {
                            self.config.poll.interval.saturating_sub(t.elapsed())
                        })
                        .max(Duration::from_millis(50));
                    ui.ctx().request_repaint_after(until_poll);
                }
                LoadPhase::Pending => ui.ctx().request_repaint_after(PENDING_REPAINT),
                LoadPhase::Failed(_) => {}
            }
        }
    }

    fn status_row(&mut self, ui: &mut egui::Ui, theme: &ScatterTheme) {
        let mut retry = false;
        let mut hover = None;
        ui.horizontal(|ui| {
            match &self.phase {
                LoadPhase::Pending => {
                    ui.spinner();
                    ui.colored_label(theme.status_text, "Loading…");
                }
                LoadPhase::Failed(msg) => {
                    ui.colored_label(theme.error_text, format!("Error: {msg}"));
                    retry = ui.button("Retry").clicked();
                }
                LoadPhase::Live => {
                    let updated = self
                        .last_update
                        .map(|t| t.format("%H:%M:%S").to_string())
                        .unwrap_or_default();
                    ui.colored_label(
                        theme.status_text,
                        format!("Updated {updated} · {} samples", self.store.len()),
                    );
                }
            }

            if self.config.show_legend {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    // Right-to-left layout, so iterate worst-last.
                    for band in SeverityBand::ALL.iter().rev() {
                        let glyph = match band {
                            SeverityBand::Warning => "✕",
                            _ => "■",
                        };
                        let text = RichText::new(format!(
                            "{glyph} {} ({})",
                            band.label(),
                            self.bands.count(*band)
                        ))
                        .color(theme.band_color(*band));
                        if ui.label(text).hovered() {
                            hover = Some(*band);
                        }
                    }
                });
            }
        });
        self.legend_hover = hover;
        if retry {
            self.start_initial();
        }
    }

    fn selection_panel(&mut self, ctx: &egui::Context, theme: &ScatterTheme) {
        let action = match &self.selection {
            Some(selection) => selection_window(
                ctx,
                selection,
                self.config.warning_limit_ms,
                self.config.scope.tz_offset_min,
                theme,
            ),
            None => return,
        };
        match action {
            SelectionAction::None => {}
            SelectionAction::Closed => self.clear_selection(),
            SelectionAction::OpenDetail(index) => {
                let sample = self
                    .selection
                    .as_ref()
                    .and_then(|s| s.samples.get(index).cloned());
                if let Some(sample) = sample {
                    self.open_detail(sample);
                }
            }
        }
    }

    fn detail_panel(&mut self, ctx: &egui::Context, theme: &ScatterTheme) {
        let still_open = match (&self.opened, &self.selection) {
            (Some(sample), Some(selection)) => {
                let entry = self.resolver.current_entry().map(|(_, e)| e);
                detail_window(
                    ctx,
                    sample,
                    selection,
                    entry,
                    self.config.scope.tz_offset_min,
                    theme,
                )
            }
            _ => return,
        };
        if !still_open {
            self.close_detail();
        }
    }

    fn open_detail(&mut self, sample: Sample) {
        let key = sample.detail_key();
        let superseded = self
            .resolver
            .pending_key()
            .is_some_and(|pending| *pending != key);
        match self.resolver.open(key.clone()) {
            OpenOutcome::StartFetch => self.worker.fetch_detail(key),
            OpenOutcome::Cached | OpenOutcome::InFlight => {
                if superseded {
                    self.worker.cancel_detail();
                }
            }
        }
        self.opened = Some(sample);
    }

    fn close_detail(&mut self) {
        if self.resolver.pending_key().is_some() {
            self.worker.cancel_detail();
        }
        self.resolver.close();
        self.opened = None;
    }

    fn clear_selection(&mut self) {
        self.close_detail();
        self.selection = None;
    }
}

impl eframe::App for LatScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show(ui);
        });
    }
}

/// Launch the scope in its own native window. Blocks until the window
/// closes.
pub fn run_latscope(feed: impl SampleFeed, config: LatScopeConfig) -> eframe::Result<()> {
    let title = config.title.clone();
    let theme = config.theme;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title.clone())
            .with_inner_size(egui::vec2(1080.0, 680.0)),
        ..Default::default()
    };
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(match theme {
                crate::theme::ThemeChoice::Dark => egui::Visuals::dark(),
                crate::theme::ThemeChoice::Light => egui::Visuals::light(),
            });
            Ok(Box::new(LatScopeApp::new(
                feed,
                config,
                Some(cc.egui_ctx.clone()),
            )))
        }),
    )
}
