//! Cooperative cancellation and advisory progress.
//!
//! The search is single-threaded; this handle is the one piece of state
//! another thread may touch while a query runs. The search polls
//! `is_cancelled` at every loop checkpoint and pushes advisory queue
//! statistics that a UI can display. None of the advisory values are
//! load-bearing for correctness.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Shared cancellation flag plus advisory search statistics.
///
/// Wrap in an `Arc`, hand one clone to the search via
/// [`super::RoutingContext::with_progress`] and keep the other to call
/// [`cancel`](Self::cancel) from elsewhere.
#[derive(Debug, Default)]
pub struct RouteCalculationProgress {
    cancelled: AtomicBool,
    queue_size: AtomicUsize,
    // f64 bits; only ever read back through f64::from_bits.
    distance_from_begin: AtomicU64,
}

impl RouteCalculationProgress {
    /// Fresh, uncancelled handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running search to abort. The search returns an empty
    /// result from its next checkpoint.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// True once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Record the frontier size and the best cost seen so far. Called by
    /// the search after each expansion; advisory only.
    pub fn update(&self, queue_size: usize, dist_from_begin: f64) {
        self.queue_size.store(queue_size, Ordering::Relaxed);
        let prev = f64::from_bits(self.distance_from_begin.load(Ordering::Relaxed));
        if dist_from_begin > prev {
            self.distance_from_begin
                .store(dist_from_begin.to_bits(), Ordering::Relaxed);
        }
    }

    /// Last reported frontier size.
    pub fn queue_size(&self) -> usize {
        self.queue_size.load(Ordering::Relaxed)
    }

    /// Largest cost-from-start reported so far, seconds.
    pub fn distance_from_begin(&self) -> f64 {
        f64::from_bits(self.distance_from_begin.load(Ordering::Relaxed))
    }
}
