//! Entrance animation for newly-appeared samples.
//!
//! Every redraw diffs the current sample ids against the previous pass; ids
//! seen for the first time fly in from a random plot edge with a little
//! lateral jitter, easing out over 600-850 ms. The animator only stores
//! per-id timing and a start-edge choice; positions are derived from the
//! *current* transform each frame, so a rescale mid-flight re-targets the
//! animation instead of freezing it.

use std::collections::{HashMap, HashSet};

use egui::emath::easing;
use egui::{pos2, Pos2, Rect};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::sample::Sample;

/// Shortest entrance flight, seconds.
const DURATION_MIN_S: f64 = 0.600;
/// Longest entrance flight, seconds.
const DURATION_MAX_S: f64 = 0.850;
/// How far outside the plot edge a flight starts, pixels.
const EDGE_OVERSHOOT: f32 = 18.0;
/// Max lateral offset along the start edge, pixels.
const JITTER: f32 = 32.0;

#[derive(Debug, Clone, Copy)]
enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
struct Flight {
    started_at: f64,
    duration_s: f64,
    edge: Edge,
    jitter: f32,
}

impl Flight {
    fn progress(&self, now: f64) -> f32 {
        (((now - self.started_at) / self.duration_s).clamp(0.0, 1.0)) as f32
    }

    fn done(&self, now: f64) -> bool {
        now >= self.started_at + self.duration_s
    }

    fn start_pos(&self, plot: Rect, target: Pos2) -> Pos2 {
        match self.edge {
            Edge::Top => pos2(target.x + self.jitter, plot.top() - EDGE_OVERSHOOT),
            Edge::Bottom => pos2(target.x + self.jitter, plot.bottom() + EDGE_OVERSHOOT),
            Edge::Left => pos2(plot.left() - EDGE_OVERSHOOT, target.y + self.jitter),
            Edge::Right => pos2(plot.right() + EDGE_OVERSHOOT, target.y + self.jitter),
        }
    }
}

/// Tracks which sample ids have been drawn before and animates the rest in.
pub struct EntryAnimator {
    rng: StdRng,
    seen: HashSet<String>,
    flights: HashMap<String, Flight>,
}

impl Default for EntryAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryAnimator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seen: HashSet::new(),
            flights: HashMap::new(),
        }
    }

    /// Deterministic animator for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seen: HashSet::new(),
            flights: HashMap::new(),
        }
    }

    /// Diff `samples` against the previously-seen id set, starting a flight
    /// for every new id. Ids that left the window are forgotten, so a sample
    /// that is evicted and later refetched flies in again. `now` is the
    /// frame clock in seconds.
    pub fn observe(&mut self, samples: &[Sample], now: f64) {
        let current: HashSet<&str> = samples.iter().map(|s| s.id.as_str()).collect();

        for sample in samples {
            if self.seen.insert(sample.id.clone()) {
                let flight = Flight {
                    started_at: now,
                    duration_s: self.rng.gen_range(DURATION_MIN_S..=DURATION_MAX_S),
                    edge: match self.rng.gen_range(0..4u8) {
                        0 => Edge::Top,
                        1 => Edge::Bottom,
                        2 => Edge::Left,
                        _ => Edge::Right,
                    },
                    jitter: self.rng.gen_range(-JITTER..=JITTER),
                };
                self.flights.insert(sample.id.clone(), flight);
            }
        }

        self.seen.retain(|id| current.contains(id.as_str()));
        self.flights
            .retain(|id, f| current.contains(id.as_str()) && !f.done(now));
    }

    /// Screen position of a sample right now: its target if settled, an
    /// eased in-flight position otherwise. The bool is true while in flight.
    pub fn pos_of(&self, id: &str, plot: Rect, target: Pos2, now: f64) -> (Pos2, bool) {
        match self.flights.get(id) {
            Some(flight) if !flight.done(now) => {
                let eased = easing::cubic_out(flight.progress(now));
                let start = flight.start_pos(plot, target);
                (start.lerp(target, eased), true)
            }
            _ => (target, false),
        }
    }

    /// Whether any flight is still running; drives frame scheduling.
    pub fn any_active(&self, now: f64) -> bool {
        self.flights.values().any(|f| !f.done(now))
    }

    /// Forget everything (scope change / reload).
    pub fn reset(&mut self) {
        self.seen.clear();
        self.flights.clear();
    }
}
