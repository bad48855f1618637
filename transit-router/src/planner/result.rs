//! Itinerary reconstruction and dominance pruning.
//!
//! The search finishes with a pile of terminal ride segments; this module
//! rebuilds each one's parent chain into an ordered door-to-door
//! itinerary and drops itineraries that merely wrap a faster, already
//! accepted one in extra legs.

use std::sync::Arc;

use tracing::info;

use crate::domain::{TransportRoute, TransportStop};

use super::context::{RoutingContext, StopResolver};
use super::segment::RouteSegment;

/// One ride on an itinerary: a line boarded at `start` and left at `end`,
/// reached on foot from the previous alighting point.
#[derive(Debug, Clone)]
pub struct ItineraryLeg {
    pub(crate) route: Arc<TransportRoute>,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) walk_dist: f64,
    pub(crate) walk_time: f64,
    pub(crate) dep_time: Option<u32>,
    pub(crate) travel_dist_approximate: f64,
    pub(crate) travel_time: f64,
}

impl ItineraryLeg {
    /// The line ridden.
    pub fn route(&self) -> &Arc<TransportRoute> {
        &self.route
    }

    /// Boarding stop index on the line.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Alighting stop index on the line.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The boarding stop.
    pub fn board_stop(&self) -> Option<&TransportStop> {
        self.route.stop(self.start)
    }

    /// The alighting stop.
    pub fn alight_stop(&self) -> Option<&TransportStop> {
        self.route.stop(self.end)
    }

    /// Walking distance to reach the boarding stop, metres.
    pub fn walk_dist(&self) -> f64 {
        self.walk_dist
    }

    /// Walking time to reach the boarding stop, seconds.
    pub fn walk_time(&self) -> f64 {
        self.walk_time
    }

    /// Scheduled departure in timetable units, when known.
    pub fn dep_time(&self) -> Option<u32> {
        self.dep_time
    }

    /// Approximate in-vehicle distance, metres.
    pub fn travel_dist_approximate(&self) -> f64 {
        self.travel_dist_approximate
    }

    /// In-vehicle time, seconds.
    pub fn travel_time(&self) -> f64 {
        self.travel_time
    }
}

/// A door-to-door itinerary: ordered ride legs plus the final walk to the
/// destination. Built once from a completed segment chain; immutable.
#[derive(Debug, Clone)]
pub struct Itinerary {
    pub(crate) route_time: f64,
    pub(crate) finish_walk_dist: f64,
    pub(crate) legs: Vec<ItineraryLeg>,
}

impl Itinerary {
    /// An itinerary that walks the whole way: no rides, just the direct
    /// walk from origin to destination.
    pub fn walking_only(walk_dist: f64, walk_time: f64) -> Self {
        Self {
            route_time: walk_time,
            finish_walk_dist: walk_dist,
            legs: Vec::new(),
        }
    }

    /// Total door-to-door time, seconds.
    pub fn route_time(&self) -> f64 {
        self.route_time
    }

    /// Final walking distance from the last stop to the destination.
    pub fn finish_walk_dist(&self) -> f64 {
        self.finish_walk_dist
    }

    /// Ride legs, origin to destination.
    pub fn legs(&self) -> &[ItineraryLeg] {
        &self.legs
    }

    /// Number of line changes (rides minus one; zero for walking-only).
    pub fn change_count(&self) -> usize {
        self.legs.len().saturating_sub(1)
    }

    /// True when the itinerary has no ride legs at all.
    pub fn is_walking_only(&self) -> bool {
        self.legs.is_empty()
    }
}

/// True when the cheaper `fast` itinerary is fully contained in `test`:
/// `test` has at least as many legs and rides `fast`'s lines in the same
/// order (possibly with extra legs in between). Such a `test` adds
/// nothing over `fast` and is dropped.
fn includes_route(fast: &Itinerary, test: &Itinerary) -> bool {
    if test.legs.len() < fast.legs.len() {
        return false;
    }
    let mut j = 0;
    for fs in &fast.legs {
        while j < test.legs.len() && test.legs[j].route.id() != fs.route.id() {
            j += 1;
        }
        if j >= test.legs.len() {
            return false;
        }
        j += 1;
    }
    true
}

/// Turn the raw finish segments into the public itinerary list.
///
/// Candidates are ordered by ascending cost (ties may permute), each
/// parent chain is unwound into legs, and candidates dominated by an
/// already accepted itinerary are dropped. Cancellation at any point
/// clears everything and returns an empty list.
pub(crate) fn prepare_results<R: StopResolver>(
    ctx: &RoutingContext<'_, R>,
    mut results: Vec<Arc<RouteSegment>>,
) -> Vec<Itinerary> {
    results.sort_by(|a, b| a.dist_from_start().total_cmp(&b.dist_from_start()));

    info!(
        results = results.len(),
        visited_routes = ctx.counters.visited_routes,
        visited_stops = ctx.counters.visited_stops,
        resolver_calls = ctx.counters.resolver_calls,
        "transport route search finished"
    );

    let mut list: Vec<Itinerary> = Vec::new();
    for res in results {
        if ctx.is_cancelled() {
            return Vec::new();
        }

        let mut legs = Vec::new();
        let mut cursor = Some(res.clone());
        while let Some(seg) = cursor {
            if ctx.is_cancelled() {
                return Vec::new();
            }
            if let Some(parent) = seg.parent() {
                let walk_dist = parent.walk_dist();
                legs.insert(
                    0,
                    ItineraryLeg {
                        route: parent.route().clone(),
                        start: parent.seg_start(),
                        end: seg.parent_stop(),
                        walk_dist,
                        walk_time: ctx.config.walk_time(walk_dist),
                        dep_time: seg.departure_time(),
                        travel_dist_approximate: seg.parent_travel_dist(),
                        travel_time: seg.parent_travel_time(),
                    },
                );
            }
            cursor = seg.parent().cloned();
        }

        let itinerary = Itinerary {
            route_time: res.dist_from_start(),
            finish_walk_dist: res.walk_dist(),
            legs,
        };

        let mut dominated = false;
        for accepted in &list {
            if ctx.is_cancelled() {
                return Vec::new();
            }
            if includes_route(accepted, &itinerary) {
                dominated = true;
                break;
            }
        }
        if !dominated {
            list.push(itinerary);
        }
    }
    list
}
