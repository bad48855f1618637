//! Per-query routing context.
//!
//! Bundles everything one search invocation mutates: the visited-segment
//! table, counters and the cancellation handle, plus read-only handles to
//! the configuration and the spatial index. Nothing here is shared
//! between queries.

use std::collections::HashMap;
use std::sync::Arc;

use crate::geo::LatLon;

use super::config::RoutingConfig;
use super::progress::RouteCalculationProgress;
use super::segment::{RouteSegment, SegmentCandidate};

/// Failure from the spatial index.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to resolve transport stops near ({lat:.5}, {lon:.5}): {message}")]
pub struct ResolveError {
    pub lat: f64,
    pub lon: f64,
    pub message: String,
}

impl ResolveError {
    /// Create an error for a failed lookup at `point`.
    pub fn new(point: LatLon, message: impl Into<String>) -> Self {
        Self {
            lat: point.lat,
            lon: point.lon,
            message: message.into(),
        }
    }
}

/// The spatial index: resolves a coordinate into nearby boarding
/// opportunities.
///
/// With `boarding_only` set the index restricts itself to the change
/// radius around the point (candidates worth transferring to); otherwise
/// it returns everything reachable on foot. Implementations may cache
/// tiles however they like; the search never observes it.
pub trait StopResolver {
    /// Boarding candidates near `point`.
    fn stops_near(
        &self,
        point: LatLon,
        boarding_only: bool,
    ) -> Result<Vec<SegmentCandidate>, ResolveError>;
}

/// Diagnostic counters for one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryCounters {
    /// Segments expanded from the frontier.
    pub visited_routes: usize,

    /// Stops walked along rides during expansion.
    pub visited_stops: usize,

    /// Calls made to the spatial index.
    pub resolver_calls: usize,
}

/// Mutable state of one routing query.
///
/// Exclusively owned by the search invocation; the only cross-thread
/// interaction is the optional progress handle.
pub struct RoutingContext<'a, R: StopResolver> {
    /// Query origin.
    pub start: LatLon,

    /// Query destination.
    pub end: LatLon,

    /// Configuration, read-only for the duration of the query.
    pub config: &'a RoutingConfig,

    resolver: &'a R,

    /// Visited table: search identity to the best segment expanded under
    /// it. An identity in here is never re-expanded, even if a cheaper
    /// arrival shows up later.
    pub(crate) visited: HashMap<u64, Arc<RouteSegment>>,

    /// Diagnostic counters.
    pub counters: QueryCounters,

    progress: Option<Arc<RouteCalculationProgress>>,
}

impl<'a, R: StopResolver> RoutingContext<'a, R> {
    /// Context for a query from `start` to `end`.
    pub fn new(resolver: &'a R, config: &'a RoutingConfig, start: LatLon, end: LatLon) -> Self {
        Self {
            start,
            end,
            config,
            resolver,
            visited: HashMap::new(),
            counters: QueryCounters::default(),
            progress: None,
        }
    }

    /// Attach a cancellation/progress handle.
    pub fn with_progress(mut self, progress: Arc<RouteCalculationProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Resolve boarding candidates near `point`, counting the call.
    pub fn stops_near(
        &mut self,
        point: LatLon,
        boarding_only: bool,
    ) -> Result<Vec<SegmentCandidate>, ResolveError> {
        self.counters.resolver_calls += 1;
        self.resolver.stops_near(point, boarding_only)
    }

    /// Poll the cancellation flag.
    pub fn is_cancelled(&self) -> bool {
        self.progress.as_ref().is_some_and(|p| p.is_cancelled())
    }

    /// Push advisory progress, if a handle is attached.
    pub(crate) fn report_progress(&self, queue_size: usize, dist_from_begin: f64) {
        if let Some(progress) = &self.progress {
            progress.update(queue_size, dist_from_begin);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingResolver {
        calls: Cell<usize>,
    }

    impl StopResolver for CountingResolver {
        fn stops_near(
            &self,
            _point: LatLon,
            _boarding_only: bool,
        ) -> Result<Vec<SegmentCandidate>, ResolveError> {
            self.calls.set(self.calls.get() + 1);
            Ok(Vec::new())
        }
    }

    struct FailingResolver;

    impl StopResolver for FailingResolver {
        fn stops_near(
            &self,
            point: LatLon,
            _boarding_only: bool,
        ) -> Result<Vec<SegmentCandidate>, ResolveError> {
            Err(ResolveError::new(point, "tile read failed"))
        }
    }

    fn point() -> LatLon {
        LatLon::new(52.5, 13.4)
    }

    #[test]
    fn stops_near_counts_resolver_calls() {
        let resolver = CountingResolver {
            calls: Cell::new(0),
        };
        let cfg = RoutingConfig::default();
        let mut ctx = RoutingContext::new(&resolver, &cfg, point(), point());

        ctx.stops_near(point(), false).unwrap();
        ctx.stops_near(point(), true).unwrap();

        assert_eq!(ctx.counters.resolver_calls, 2);
        assert_eq!(resolver.calls.get(), 2);
    }

    #[test]
    fn resolve_error_carries_the_point() {
        let cfg = RoutingConfig::default();
        let mut ctx = RoutingContext::new(&FailingResolver, &cfg, point(), point());

        let err = ctx.stops_near(point(), false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to resolve transport stops near (52.50000, 13.40000): tile read failed"
        );
    }

    #[test]
    fn cancellation_defaults_to_false_without_handle() {
        let resolver = CountingResolver {
            calls: Cell::new(0),
        };
        let cfg = RoutingConfig::default();
        let ctx = RoutingContext::new(&resolver, &cfg, point(), point());
        assert!(!ctx.is_cancelled());
    }

    #[test]
    fn cancellation_via_attached_handle() {
        let resolver = CountingResolver {
            calls: Cell::new(0),
        };
        let cfg = RoutingConfig::default();
        let progress = Arc::new(RouteCalculationProgress::new());
        let ctx = RoutingContext::new(&resolver, &cfg, point(), point())
            .with_progress(progress.clone());

        assert!(!ctx.is_cancelled());
        progress.cancel();
        assert!(ctx.is_cancelled());
    }
}
