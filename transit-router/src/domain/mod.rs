//! Domain types for the transport route planner.
//!
//! These model the transit network as the search consumes it: lines with
//! ordered stop sequences and optional timetables. Invariants are enforced
//! at construction time, so code receiving these types can trust them.

mod route;
mod stop;

pub use route::{
    MAX_ROUTE_STOPS, RouteError, RouteType, SCHEDULE_UNIT_SECONDS, TransportRoute,
    TransportSchedule,
};
pub use stop::TransportStop;
