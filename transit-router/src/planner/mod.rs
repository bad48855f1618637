//! Transport route planner core.
//!
//! This module implements the time-expanded graph search that answers:
//! "starting at this coordinate, which sequences of walks and rides reach
//! that coordinate?" Search nodes are ride segments (a ride on a specific
//! line continuing from a stop index), expanded cheapest-first from a
//! priority queue, with candidates discovered lazily through the
//! [`StopResolver`] spatial index.

mod config;
mod context;
mod progress;
mod result;
mod search;
mod segment;

pub use config::RoutingConfig;
pub use context::{QueryCounters, ResolveError, RoutingContext, StopResolver};
pub use progress::RouteCalculationProgress;
pub use result::{Itinerary, ItineraryLeg};
pub use search::{SearchError, build_route};
pub use segment::{RouteSegment, SegmentCandidate, SegmentError};
