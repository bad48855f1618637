//! Ride segment: the node type of the search graph.
//!
//! A `RouteSegment` is a ride on one line continuing from a boarding stop
//! index, linked to the segment it transferred off. Parents are shared via
//! `Arc`: many frontier nodes hang off a common ancestor, so the chains
//! form a tree, and `Arc` links keep the acyclic invariant mechanical.

use std::sync::Arc;

use crate::domain::{TransportRoute, TransportStop};
use crate::geo::LatLon;

/// Bits of the search identity reserved for the stop offset.
///
/// Matches [`crate::domain::MAX_ROUTE_STOPS`]: identities are
/// `route id << 10 | stop index`.
pub(crate) const SEGMENT_ID_SHIFT: u32 = 10;

/// Errors from candidate construction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SegmentError {
    /// Boarding index is out of bounds for the route's stop sequence
    #[error("boarding index {index} out of bounds for route {route} with {stops} stops")]
    StartOutOfBounds {
        route: u64,
        index: usize,
        stops: usize,
    },
}

/// A boarding opportunity produced by the spatial index: a line and the
/// stop index at which it can be boarded, plus the scheduled departure
/// time at that stop (timetable units) when the line runs to a timetable.
///
/// The search turns candidates into [`RouteSegment`] nodes; candidates
/// themselves carry no search state.
#[derive(Debug, Clone)]
pub struct SegmentCandidate {
    route: Arc<TransportRoute>,
    seg_start: usize,
    departure_time: Option<u32>,
}

impl SegmentCandidate {
    /// Construct a candidate, validating the boarding index.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `seg_start` is not a valid index into the route's
    /// stop sequence.
    pub fn new(
        route: Arc<TransportRoute>,
        seg_start: usize,
        departure_time: Option<u32>,
    ) -> Result<Self, SegmentError> {
        if seg_start >= route.len() {
            return Err(SegmentError::StartOutOfBounds {
                route: route.id(),
                index: seg_start,
                stops: route.len(),
            });
        }
        Ok(Self {
            route,
            seg_start,
            departure_time,
        })
    }

    /// The line this candidate boards.
    pub fn route(&self) -> &Arc<TransportRoute> {
        &self.route
    }

    /// Boarding stop index.
    pub fn seg_start(&self) -> usize {
        self.seg_start
    }

    /// Scheduled departure at the boarding stop, in timetable units.
    pub fn departure_time(&self) -> Option<u32> {
        self.departure_time
    }

    /// Search identity of this candidate (ignores cost on purpose).
    pub fn id(&self) -> u64 {
        (self.route.id() << SEGMENT_ID_SHIFT) | self.seg_start as u64
    }

    /// The boarding stop itself.
    pub fn stop(&self) -> Option<&TransportStop> {
        self.route.stop(self.seg_start)
    }
}

/// A search node: riding a specific line starting at `seg_start`, with a
/// back-link to the segment that produced it.
///
/// Segments are read-only once created; the search compares and discards
/// them but never mutates one. Costs are in seconds from the query start.
///
/// # Invariants
///
/// - The parent chain is acyclic and finite (bounded by transfer depth)
/// - `dist_from_start` never decreases from an ancestor to a descendant
#[derive(Debug)]
pub struct RouteSegment {
    route: Arc<TransportRoute>,
    seg_start: usize,
    departure_time: Option<u32>,
    parent: Option<Arc<RouteSegment>>,
    parent_stop: usize,
    parent_travel_time: f64,
    parent_travel_dist: f64,
    walk_dist: f64,
    dist_from_start: f64,
}

impl RouteSegment {
    /// A query-start node: no parent, cost is the walk from the origin.
    pub fn start(candidate: SegmentCandidate, walk_dist: f64, dist_from_start: f64) -> Self {
        Self {
            route: candidate.route,
            seg_start: candidate.seg_start,
            departure_time: candidate.departure_time,
            parent: None,
            parent_stop: 0,
            parent_travel_time: 0.0,
            parent_travel_dist: 0.0,
            walk_dist,
            dist_from_start,
        }
    }

    /// A successor node boarding `candidate` after alighting the parent's
    /// ride at `parent_stop`.
    pub fn child(
        candidate: SegmentCandidate,
        parent: Arc<RouteSegment>,
        parent_stop: usize,
        parent_travel_time: f64,
        parent_travel_dist: f64,
        walk_dist: f64,
        dist_from_start: f64,
    ) -> Self {
        Self {
            route: candidate.route,
            seg_start: candidate.seg_start,
            departure_time: candidate.departure_time,
            parent: Some(parent),
            parent_stop,
            parent_travel_time,
            parent_travel_dist,
            walk_dist,
            dist_from_start,
        }
    }

    /// Search identity: `route id << 10 | seg_start`. Two segments with
    /// the same identity are the same search state regardless of cost.
    pub fn id(&self) -> u64 {
        (self.route.id() << SEGMENT_ID_SHIFT) | self.seg_start as u64
    }

    /// The line being ridden.
    pub fn route(&self) -> &Arc<TransportRoute> {
        &self.route
    }

    /// Boarding stop index on the line.
    pub fn seg_start(&self) -> usize {
        self.seg_start
    }

    /// Scheduled departure at the boarding stop, in timetable units.
    pub fn departure_time(&self) -> Option<u32> {
        self.departure_time
    }

    /// The segment this one transferred off, if any.
    pub fn parent(&self) -> Option<&Arc<RouteSegment>> {
        self.parent.as_ref()
    }

    /// Stop index on the parent's ride where the transfer happened.
    pub fn parent_stop(&self) -> usize {
        self.parent_stop
    }

    /// In-vehicle time on the parent's ride up to the transfer, seconds.
    pub fn parent_travel_time(&self) -> f64 {
        self.parent_travel_time
    }

    /// In-vehicle distance on the parent's ride up to the transfer, metres.
    pub fn parent_travel_dist(&self) -> f64 {
        self.parent_travel_dist
    }

    /// Walking distance used to reach this boarding, metres.
    pub fn walk_dist(&self) -> f64 {
        self.walk_dist
    }

    /// Accumulated cost from the query start, seconds.
    pub fn dist_from_start(&self) -> f64 {
        self.dist_from_start
    }

    /// Number of stops on the line.
    pub fn len(&self) -> usize {
        self.route.len()
    }

    /// True when the line has no stops (never, post-construction).
    pub fn is_empty(&self) -> bool {
        self.route.is_empty()
    }

    /// Stop at `index` on the line.
    pub fn stop(&self, index: usize) -> Option<&TransportStop> {
        self.route.stop(index)
    }

    /// Location of the boarding stop.
    pub fn location(&self) -> Option<LatLon> {
        self.stop(self.seg_start).map(|s| s.location)
    }

    /// Transfer depth: 1 for a query-start node, +1 per parent link.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut cur = self.parent.as_deref();
        while let Some(seg) = cur {
            depth += 1;
            cur = seg.parent.as_deref();
        }
        depth
    }

    /// True when `candidate` boards a line this chain already rides at or
    /// after its boarding point, i.e. taking it would re-enter the same
    /// ride in place.
    pub fn was_visited(&self, candidate: &SegmentCandidate) -> bool {
        let mut cur = Some(self);
        while let Some(seg) = cur {
            if candidate.route.id() == seg.route.id() && candidate.seg_start >= seg.seg_start {
                return true;
            }
            cur = seg.parent.as_deref();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RouteType, TransportStop};
    use crate::geo::LatLon;

    fn make_route(id: u64, stops: usize) -> Arc<TransportRoute> {
        let stops: Vec<_> = (0..stops as u64)
            .map(|i| {
                TransportStop::new(
                    id * 100 + i,
                    LatLon::new(52.5, 13.4 + i as f64 * 0.001),
                    format!("stop {i}"),
                )
            })
            .collect();
        Arc::new(TransportRoute::new(id, RouteType::Bus, format!("line {id}"), stops, None).unwrap())
    }

    fn candidate(route: &Arc<TransportRoute>, seg_start: usize) -> SegmentCandidate {
        SegmentCandidate::new(route.clone(), seg_start, None).unwrap()
    }

    #[test]
    fn candidate_rejects_bad_index() {
        let route = make_route(1, 3);
        let err = SegmentCandidate::new(route, 3, None).unwrap_err();
        assert!(matches!(err, SegmentError::StartOutOfBounds { index: 3, .. }));
    }

    #[test]
    fn identity_packs_route_and_offset() {
        let route = make_route(5, 4);
        let seg = RouteSegment::start(candidate(&route, 2), 0.0, 0.0);
        assert_eq!(seg.id(), (5 << 10) | 2);

        // Same boarding point, same identity regardless of cost.
        let other = RouteSegment::start(candidate(&route, 2), 50.0, 42.0);
        assert_eq!(seg.id(), other.id());

        // Different offset, different identity.
        let shifted = RouteSegment::start(candidate(&route, 3), 0.0, 0.0);
        assert_ne!(seg.id(), shifted.id());
    }

    #[test]
    fn depth_counts_parent_links() {
        let a = make_route(1, 5);
        let b = make_route(2, 5);
        let root = Arc::new(RouteSegment::start(candidate(&a, 0), 0.0, 0.0));
        assert_eq!(root.depth(), 1);

        let mid = Arc::new(RouteSegment::child(
            candidate(&b, 1),
            root.clone(),
            3,
            120.0,
            800.0,
            40.0,
            520.0,
        ));
        assert_eq!(mid.depth(), 2);

        let leaf = RouteSegment::child(candidate(&a, 4), mid, 4, 60.0, 400.0, 0.0, 900.0);
        assert_eq!(leaf.depth(), 3);
    }

    #[test]
    fn cost_never_decreases_along_chain() {
        let a = make_route(1, 5);
        let b = make_route(2, 5);
        let root = Arc::new(RouteSegment::start(candidate(&a, 0), 0.0, 30.0));
        let mid = Arc::new(RouteSegment::child(
            candidate(&b, 1),
            root,
            3,
            120.0,
            800.0,
            40.0,
            520.0,
        ));
        let leaf = RouteSegment::child(candidate(&a, 4), mid, 4, 60.0, 400.0, 0.0, 900.0);

        let mut cur = Some(&leaf);
        let mut last = f64::INFINITY;
        while let Some(seg) = cur {
            assert!(seg.dist_from_start() <= last);
            last = seg.dist_from_start();
            cur = seg.parent().map(Arc::as_ref);
        }
    }

    #[test]
    fn was_visited_same_ride_at_or_after_boarding() {
        let route = make_route(1, 6);
        let seg = RouteSegment::start(candidate(&route, 2), 0.0, 0.0);

        // Boarding the same line later along the ride is a self-loop.
        assert!(seg.was_visited(&candidate(&route, 2)));
        assert!(seg.was_visited(&candidate(&route, 5)));

        // Boarding the same line before our boarding point is not.
        assert!(!seg.was_visited(&candidate(&route, 1)));
    }

    #[test]
    fn was_visited_walks_the_parent_chain() {
        let a = make_route(1, 6);
        let b = make_route(2, 6);
        let root = Arc::new(RouteSegment::start(candidate(&a, 2), 0.0, 0.0));
        let leaf = RouteSegment::child(candidate(&b, 0), root, 4, 100.0, 600.0, 20.0, 400.0);

        // The ancestor's ride still counts as visited from the leaf.
        assert!(leaf.was_visited(&candidate(&a, 3)));
        assert!(!leaf.was_visited(&candidate(&a, 0)));

        // A third line is fresh.
        let c = make_route(3, 6);
        assert!(!leaf.was_visited(&candidate(&c, 0)));
    }
}
