//! Background fetch worker.
//!
//! All feed I/O happens on one dedicated thread hosting a Tokio runtime,
//! keeping the UI thread free of blocking work. The UI sends commands over
//! an unbounded channel and drains results back out of a std mpsc channel
//! once per frame, nudging the egui context so a sleeping UI wakes up when
//! data lands.
//!
//! Cancellation uses two independent token lanes: dispatching a new sample
//! fetch cancels the previous sample fetch, dispatching (or cancelling) a
//! detail fetch cancels the previous detail fetch, and dropping the worker
//! cancels everything before joining the thread.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use log::debug;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::feed::{FeedError, SampleBatch, SampleFeed, SampleQuery};
use crate::sample::{DetailKey, DetailRecord};

/// Commands the UI sends to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    /// Start a sample fetch, cancelling any sample fetch still in flight.
    FetchSamples(SampleQuery),
    /// Start a detail fetch, cancelling any detail fetch still in flight.
    FetchDetail(DetailKey),
    /// Cancel the in-flight detail fetch without starting a new one.
    CancelDetail,
    Shutdown,
}

/// Results the worker sends back to the UI.
#[derive(Debug)]
pub enum FeedEvent {
    Samples {
        query: SampleQuery,
        result: Result<SampleBatch, FeedError>,
    },
    Detail {
        key: DetailKey,
        result: Result<DetailRecord, FeedError>,
    },
}

/// Handle to the worker thread. Dropping it cancels all in-flight fetches
/// and joins the thread.
pub struct FeedWorker {
    commands: UnboundedSender<WorkerCommand>,
    events: mpsc::Receiver<FeedEvent>,
    root: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl FeedWorker {
    /// Spawn the worker around a feed. `repaint` is the egui context to
    /// nudge when an event lands; tests pass `None`.
    pub fn spawn(feed: Box<dyn SampleFeed>, repaint: Option<egui::Context>) -> Self {
        let (cmd_tx, cmd_rx) = unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let root = CancellationToken::new();
        let loop_root = root.clone();

        let handle = thread::Builder::new()
            .name("latscope-feed".into())
            .spawn(move || {
                let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");
                rt.block_on(run_loop(feed, cmd_rx, event_tx, repaint, loop_root));
            })
            .expect("Failed to spawn feed worker thread");

        Self {
            commands: cmd_tx,
            events: event_rx,
            root,
            handle: Some(handle),
        }
    }

    pub fn fetch_samples(&self, query: SampleQuery) {
        let _ = self.commands.send(WorkerCommand::FetchSamples(query));
    }

    pub fn fetch_detail(&self, key: DetailKey) {
        let _ = self.commands.send(WorkerCommand::FetchDetail(key));
    }

    pub fn cancel_detail(&self) {
        let _ = self.commands.send(WorkerCommand::CancelDetail);
    }

    /// Non-blocking event drain; call in a loop once per frame.
    pub fn poll_event(&self) -> Option<FeedEvent> {
        self.events.try_recv().ok()
    }
}

impl Drop for FeedWorker {
    fn drop(&mut self) {
        self.root.cancel();
        let _ = self.commands.send(WorkerCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

async fn run_loop(
    mut feed: Box<dyn SampleFeed>,
    mut commands: UnboundedReceiver<WorkerCommand>,
    events: mpsc::Sender<FeedEvent>,
    repaint: Option<egui::Context>,
    root: CancellationToken,
) {
    let mut sample_lane = root.child_token();
    let mut detail_lane = root.child_token();

    loop {
        let cmd = tokio::select! {
            _ = root.cancelled() => break,
            cmd = commands.recv() => match cmd {
                None | Some(WorkerCommand::Shutdown) => break,
                Some(cmd) => cmd,
            },
        };

        match cmd {
            WorkerCommand::FetchSamples(query) => {
                sample_lane.cancel();
                sample_lane = root.child_token();
                let token = sample_lane.clone();
                let fut = feed.fetch_samples(query.clone());
                let tx = events.clone();
                let ctx = repaint.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {
                            debug!("sample fetch [{}, {}] cancelled", query.from_ms, query.to_ms);
                        }
                        result = fut => {
                            let _ = tx.send(FeedEvent::Samples { query, result });
                            if let Some(ctx) = ctx {
                                ctx.request_repaint();
                            }
                        }
                    }
                });
            }
            WorkerCommand::FetchDetail(key) => {
                detail_lane.cancel();
                detail_lane = root.child_token();
                let token = detail_lane.clone();
                let fut = feed.fetch_detail(key.clone());
                let tx = events.clone();
                let ctx = repaint.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {
                            debug!("detail fetch for {} cancelled", key.device_id);
                        }
                        result = fut => {
                            let _ = tx.send(FeedEvent::Detail { key, result });
                            if let Some(ctx) = ctx {
                                ctx.request_repaint();
                            }
                        }
                    }
                });
            }
            WorkerCommand::CancelDetail => {
                detail_lane.cancel();
                detail_lane = root.child_token();
            }
            WorkerCommand::Shutdown => break,
        }
    }
}
