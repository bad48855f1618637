//! Transit line (route) type and its timetable.

use serde::{Deserialize, Serialize};

use super::TransportStop;

/// Maximum number of stops on one route.
///
/// Segment search identities pack the stop offset into the low 10 bits
/// next to the route id, so a route may carry at most 1024 stops.
pub const MAX_ROUTE_STOPS: usize = 1 << 10;

/// Seconds per timetable unit.
///
/// Timetables store intervals and departure times in units of ten
/// seconds; multiplying by this converts them to elapsed seconds.
pub const SCHEDULE_UNIT_SECONDS: f64 = 10.0;

/// Vehicle class of a transit line, used for travel-speed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    Bus,
    Trolleybus,
    Tram,
    Subway,
    Rail,
    Ferry,
    CableCar,
    Funicular,
}

/// Fixed timetable for a line.
///
/// `avg_stop_intervals[i]` is the scheduled interval between stop `i` and
/// stop `i + 1`, in timetable units of ten seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportSchedule {
    pub avg_stop_intervals: Vec<u32>,
}

impl TransportSchedule {
    /// Create a schedule from inter-stop intervals (ten-second units).
    pub fn new(avg_stop_intervals: Vec<u32>) -> Self {
        Self { avg_stop_intervals }
    }

    /// Scheduled interval between stop `index` and stop `index + 1`.
    pub fn interval(&self, index: usize) -> Option<u32> {
        self.avg_stop_intervals.get(index).copied()
    }
}

/// Errors from route construction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RouteError {
    /// Route has no stops
    #[error("route {0} has no stops")]
    NoStops(u64),

    /// Route exceeds the stop-count bound of the segment identity packing
    #[error("route {id} has {stops} stops, more than the maximum {MAX_ROUTE_STOPS}")]
    TooManyStops { id: u64, stops: usize },

    /// Schedule intervals do not cover the stop sequence
    #[error("route {id} schedule has {intervals} intervals for {stops} stops")]
    ScheduleMismatch {
        id: u64,
        intervals: usize,
        stops: usize,
    },
}

/// A transit line: an ordered forward stop sequence with a vehicle class
/// and an optional fixed timetable.
///
/// # Invariants
///
/// - At least one stop, fewer than [`MAX_ROUTE_STOPS`]
/// - If a schedule is present, it has an interval for every stop pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportRoute {
    id: u64,
    route_type: RouteType,
    name: String,
    stops: Vec<TransportStop>,
    schedule: Option<TransportSchedule>,
}

impl TransportRoute {
    /// Construct a route, validating the stop-count and schedule bounds.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the stop sequence is empty or longer than
    /// [`MAX_ROUTE_STOPS`], or if a schedule is present but does not carry
    /// exactly one interval per consecutive stop pair.
    pub fn new(
        id: u64,
        route_type: RouteType,
        name: impl Into<String>,
        stops: Vec<TransportStop>,
        schedule: Option<TransportSchedule>,
    ) -> Result<Self, RouteError> {
        if stops.is_empty() {
            return Err(RouteError::NoStops(id));
        }
        if stops.len() > MAX_ROUTE_STOPS {
            return Err(RouteError::TooManyStops {
                id,
                stops: stops.len(),
            });
        }
        if let Some(sc) = &schedule {
            if sc.avg_stop_intervals.len() != stops.len() - 1 {
                return Err(RouteError::ScheduleMismatch {
                    id,
                    intervals: sc.avg_stop_intervals.len(),
                    stops: stops.len(),
                });
            }
        }

        Ok(Self {
            id,
            route_type,
            name: name.into(),
            stops,
            schedule,
        })
    }

    /// Stable line identifier from the map data.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Vehicle class of this line.
    pub fn route_type(&self) -> RouteType {
        self.route_type
    }

    /// Human-readable line name or ref.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Forward stop sequence.
    pub fn stops(&self) -> &[TransportStop] {
        &self.stops
    }

    /// Number of stops on the line.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// True when the line has no stops (never, post-construction).
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Stop at `index`, if in bounds.
    pub fn stop(&self, index: usize) -> Option<&TransportStop> {
        self.stops.get(index)
    }

    /// Fixed timetable, if the line has one.
    pub fn schedule(&self) -> Option<&TransportSchedule> {
        self.schedule.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLon;

    fn stop(id: u64) -> TransportStop {
        TransportStop::new(id, LatLon::new(52.5, 13.4), format!("stop {id}"))
    }

    #[test]
    fn valid_route() {
        let route = TransportRoute::new(
            7,
            RouteType::Bus,
            "M29",
            vec![stop(1), stop(2), stop(3)],
            None,
        )
        .unwrap();

        assert_eq!(route.id(), 7);
        assert_eq!(route.len(), 3);
        assert_eq!(route.stop(1).unwrap().id, 2);
        assert!(route.stop(3).is_none());
    }

    #[test]
    fn empty_route_rejected() {
        let err = TransportRoute::new(7, RouteType::Bus, "M29", vec![], None).unwrap_err();
        assert!(matches!(err, RouteError::NoStops(7)));
    }

    #[test]
    fn too_many_stops_rejected() {
        let stops: Vec<_> = (0..=MAX_ROUTE_STOPS as u64).map(stop).collect();
        let err = TransportRoute::new(7, RouteType::Bus, "M29", stops, None).unwrap_err();
        assert!(matches!(err, RouteError::TooManyStops { .. }));
    }

    #[test]
    fn schedule_must_cover_stop_pairs() {
        let err = TransportRoute::new(
            7,
            RouteType::Tram,
            "61",
            vec![stop(1), stop(2), stop(3)],
            Some(TransportSchedule::new(vec![12])),
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::ScheduleMismatch { .. }));

        let route = TransportRoute::new(
            7,
            RouteType::Tram,
            "61",
            vec![stop(1), stop(2), stop(3)],
            Some(TransportSchedule::new(vec![12, 18])),
        )
        .unwrap();
        assert_eq!(route.schedule().unwrap().interval(1), Some(18));
        assert_eq!(route.schedule().unwrap().interval(2), None);
    }

    #[test]
    fn route_type_serde_names() {
        let json = serde_json::to_string(&RouteType::CableCar).unwrap();
        assert_eq!(json, "\"cable_car\"");
        let back: RouteType = serde_json::from_str("\"subway\"").unwrap();
        assert_eq!(back, RouteType::Subway);
    }
}
