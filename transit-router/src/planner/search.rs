//! Core route search: cheapest-first frontier expansion.
//!
//! A label-setting shortest-path search over an implicit graph whose
//! nodes are ride segments. The frontier is a min-priority queue on cost
//! from start; each popped segment is walked forward along its ride,
//! spawning transfer candidates from the spatial index and checking the
//! pre-indexed destination stops. Each search identity is expanded at
//! most once, even if a cheaper arrival to it is discovered later — a
//! deliberate trade-off the downstream pruning and finish-time bounds
//! are tuned against.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::domain::SCHEDULE_UNIT_SECONDS;
use crate::geo::distance;

use super::context::{ResolveError, RoutingContext, StopResolver};
use super::result::{Itinerary, prepare_results};
use super::segment::{RouteSegment, SegmentCandidate};

/// Error from the route search.
///
/// Cancellation and "no path found" are not errors; both yield an empty
/// itinerary list.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// The spatial index failed to resolve stops
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Frontier entry: min-heap ordering on cost from start. The comparator
/// is a strict greater-than, so equal-cost entries pop in arbitrary
/// order.
struct FrontierEntry(Arc<RouteSegment>);

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, the search wants cheapest
        // first.
        other
            .0
            .dist_from_start()
            .total_cmp(&self.0.dist_from_start())
    }
}

/// Compute itineraries from `ctx.start` to `ctx.end`.
///
/// Returns the surviving itineraries cheapest-first, or an empty list
/// when the query is cancelled or no path exists. When no transit
/// itinerary is found and walking the whole way fits inside
/// `max_route_time`, the direct walk is returned as a leg-less
/// itinerary.
///
/// # Errors
///
/// Returns `Err` only when the spatial index fails.
pub fn build_route<R: StopResolver>(
    ctx: &mut RoutingContext<'_, R>,
) -> Result<Vec<Itinerary>, SearchError> {
    let start_candidates = ctx.stops_near(ctx.start, false)?;
    let end_candidates = ctx.stops_near(ctx.end, false)?;

    // Index destination stops by search identity for O(1) checks while
    // walking rides.
    let mut end_segments: HashMap<u64, SegmentCandidate> = HashMap::new();
    for candidate in end_candidates {
        end_segments.insert(candidate.id(), candidate);
    }

    let mut queue: BinaryHeap<FrontierEntry> = BinaryHeap::new();
    for candidate in start_candidates {
        let Some(location) = candidate.stop().map(|s| s.location) else {
            continue;
        };
        let walk_dist = distance(location, ctx.start);
        let cost = ctx.config.walk_time(walk_dist);
        queue.push(FrontierEntry(Arc::new(RouteSegment::start(
            candidate, walk_dist, cost,
        ))));
    }

    // Best known total cost of reaching the destination, and the bound
    // past which riding cannot beat simply walking the whole trip.
    let mut finish_time = ctx.config.max_route_time;
    let max_travel_time_cmp_to_walk =
        ctx.config.walk_time(distance(ctx.start, ctx.end)) - ctx.config.change_time / 2.0;

    let mut results: Vec<Arc<RouteSegment>> = Vec::new();

    while !queue.is_empty() {
        if ctx.is_cancelled() {
            error!("route calculation interrupted");
            return Ok(Vec::new());
        }
        let Some(FrontierEntry(segment)) = queue.pop() else {
            break;
        };

        if let Some(existing) = ctx.visited.get(&segment.id()) {
            if existing.dist_from_start() > segment.dist_from_start() {
                // The identity was fixed with a worse cost than this
                // later arrival. Tolerated: log and keep going.
                warn!(
                    id = segment.id(),
                    fixed = existing.dist_from_start(),
                    arrived = segment.dist_from_start(),
                    "visited segment beaten by a later cheaper arrival"
                );
            }
            continue;
        }
        ctx.counters.visited_routes += 1;
        ctx.visited.insert(segment.id(), segment.clone());

        if segment.depth() > ctx.config.max_number_of_changes + 1 {
            continue;
        }

        // The queue is cost-ordered, so crossing either bound ends the
        // whole search, not just this segment.
        if segment.dist_from_start() > finish_time + ctx.config.finish_time_seconds
            || segment.dist_from_start() > max_travel_time_cmp_to_walk
        {
            break;
        }

        let route_travel_speed = ctx.config.speed_by_route_type(segment.route().route_type());
        debug!(
            route = segment.route().name(),
            route_type = ?segment.route().route_type(),
            speed = route_travel_speed,
            "expanding ride"
        );
        if route_travel_speed <= 0.0 {
            continue;
        }

        let Some(mut prev_stop) = segment.stop(segment.seg_start()) else {
            continue;
        };

        let mut segment_id = segment.id();
        let mut finish: Option<Arc<RouteSegment>> = None;
        let mut min_dist = 0.0;
        let mut travel_dist = 0.0;
        let mut travel_time = 0.0;

        for ind in (segment.seg_start() + 1)..segment.len() {
            if ctx.is_cancelled() {
                return Ok(Vec::new());
            }
            segment_id += 1;
            // Mark the partial ride so it is never re-derived from a
            // different entry point.
            ctx.visited.insert(segment_id, segment.clone());

            let Some(stop) = segment.stop(ind) else {
                break;
            };
            let segment_dist = distance(prev_stop.location, stop.location);
            travel_dist += segment_dist;

            if ctx.config.use_schedule {
                match segment.route().schedule().and_then(|sc| sc.interval(ind - 1)) {
                    Some(interval) => travel_time += f64::from(interval) * SCHEDULE_UNIT_SECONDS,
                    None => break,
                }
            } else {
                travel_time += ctx.config.stop_time + segment_dist / route_travel_speed;
            }
            // Stops beyond the finish bound are not worth walking.
            if segment.dist_from_start() + travel_time > finish_time + ctx.config.finish_time_seconds {
                break;
            }

            let boarding = ctx.stops_near(stop.location, true)?;
            ctx.counters.visited_stops += 1;
            for candidate in boarding {
                if ctx.is_cancelled() {
                    return Ok(Vec::new());
                }
                if segment.was_visited(&candidate) {
                    continue;
                }
                let Some(candidate_location) = candidate.stop().map(|s| s.location) else {
                    continue;
                };
                let walk_dist = distance(candidate_location, stop.location);
                let walk_time = ctx.config.walk_time(walk_dist)
                    + ctx.config.change_time
                    + ctx.config.boarding_time;
                let cost = segment.dist_from_start() + travel_time + walk_time;

                if ctx.config.use_schedule {
                    // A fixed departure restates the cost in absolute
                    // terms. Enqueue only if that cost is not causally
                    // smaller than the distance-based estimate.
                    let Some(dep) = candidate.departure_time() else {
                        continue;
                    };
                    let scheduled_cost = (f64::from(dep)
                        - f64::from(ctx.config.schedule_time_of_day))
                        * SCHEDULE_UNIT_SECONDS;
                    let admit = if ctx.config.schedule_bound_inclusive {
                        scheduled_cost >= cost
                    } else {
                        scheduled_cost > cost
                    };
                    if admit {
                        queue.push(FrontierEntry(Arc::new(RouteSegment::child(
                            candidate,
                            segment.clone(),
                            ind,
                            travel_time,
                            travel_dist,
                            walk_dist,
                            scheduled_cost,
                        ))));
                    }
                } else {
                    queue.push(FrontierEntry(Arc::new(RouteSegment::child(
                        candidate,
                        segment.clone(),
                        ind,
                        travel_time,
                        travel_dist,
                        walk_dist,
                        cost,
                    ))));
                }
            }

            let dist_to_end = distance(stop.location, ctx.end);
            if let Some(final_candidate) = end_segments.get(&segment_id) {
                if dist_to_end < ctx.config.walk_radius
                    && (finish.is_none() || min_dist > dist_to_end)
                {
                    // Closest reachable destination stop on this ride
                    // wins.
                    min_dist = dist_to_end;
                    let walk_time = ctx.config.walk_time(dist_to_end);
                    finish = Some(Arc::new(RouteSegment::child(
                        final_candidate.clone(),
                        segment.clone(),
                        ind,
                        travel_time,
                        travel_dist,
                        dist_to_end,
                        segment.dist_from_start() + travel_time + walk_time,
                    )));
                }
            }
            prev_stop = stop;
        }

        if let Some(finish) = finish {
            if finish_time > finish.dist_from_start() {
                finish_time = finish.dist_from_start();
            }
            // The very first finish is kept unconditionally so that a
            // reachable destination always yields at least one result.
            if finish.dist_from_start() < finish_time + ctx.config.finish_time_seconds
                && (finish.dist_from_start() < max_travel_time_cmp_to_walk || results.is_empty())
            {
                results.push(finish);
            }
        }

        if ctx.is_cancelled() {
            error!("route calculation interrupted");
            return Ok(Vec::new());
        }
        ctx.report_progress(queue.len(), segment.dist_from_start());
    }

    let mut itineraries = prepare_results(ctx, results);

    // No transit option: fall back to walking the whole way when that
    // fits the time ceiling.
    if itineraries.is_empty() && !ctx.is_cancelled() {
        let walk_dist = distance(ctx.start, ctx.end);
        let walk_time = ctx.config.walk_time(walk_dist);
        if walk_time <= ctx.config.max_route_time {
            itineraries.push(Itinerary::walking_only(walk_dist, walk_time));
        }
    }

    Ok(itineraries)
}
