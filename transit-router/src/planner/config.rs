//! Routing configuration.
//!
//! Read-only for the duration of a query. Defaults mirror the production
//! map data profile: walking at 3.6 km/h, vehicles at 60 km/h unless a
//! route type has its own speed, three minutes each for changing and
//! boarding.

use std::collections::HashMap;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::domain::RouteType;

/// Parameters of one routing query.
///
/// Speeds are metres per second, times are seconds, distances are metres.
/// Timetable fields use ten-second timetable units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Walking speed.
    pub walk_speed: f64,

    /// In-vehicle speed for route types without an entry in `speeds`.
    pub default_travel_speed: f64,

    /// Per-route-type in-vehicle speed. A zero entry excludes that route
    /// type from the search entirely.
    pub speeds: HashMap<RouteType, f64>,

    /// Fixed dwell time added per intermediate stop (speed-estimate mode).
    pub stop_time: f64,

    /// Penalty for changing lines.
    pub change_time: f64,

    /// Penalty for boarding a vehicle.
    pub boarding_time: f64,

    /// Maximum number of line changes on one itinerary.
    pub max_number_of_changes: usize,

    /// How far from the destination a stop may be to finish on foot.
    pub walk_radius: f64,

    /// Radius the spatial index searches for boarding candidates at a
    /// stop (`boarding_only` queries).
    pub walk_change_radius: f64,

    /// Slack past the best known finish time before the search gives up
    /// on a branch.
    pub finish_time_seconds: f64,

    /// Hard ceiling on total itinerary time.
    pub max_route_time: f64,

    /// Cost edges from fixed timetables instead of the speed estimate.
    pub use_schedule: bool,

    /// Query time of day, in timetable units from midnight. Absolute
    /// timetable departures are converted to elapsed seconds against this.
    pub schedule_time_of_day: u32,

    /// Boundary of the schedule enqueue guard: with `true` a candidate
    /// whose timetable-derived cost exactly equals the distance-based
    /// estimate is still enqueued (`>=`), with `false` it is not (`>`).
    pub schedule_bound_inclusive: bool,
}

impl RoutingConfig {
    /// In-vehicle speed for `route_type`, falling back to the default.
    ///
    /// Returns zero when the type is configured with a zero speed, which
    /// excludes it from the search.
    pub fn speed_by_route_type(&self, route_type: RouteType) -> f64 {
        self.speeds
            .get(&route_type)
            .copied()
            .unwrap_or(self.default_travel_speed)
    }

    /// Convert a clock time to timetable units for `schedule_time_of_day`.
    pub fn schedule_day_start(time: NaiveTime) -> u32 {
        time.num_seconds_from_midnight() / 10
    }

    /// Time to walk `dist` metres.
    pub fn walk_time(&self, dist: f64) -> f64 {
        dist / self.walk_speed
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            walk_speed: 3.6 / 3.6,
            default_travel_speed: 60.0 / 3.6,
            speeds: HashMap::new(),
            stop_time: 30.0,
            change_time: 180.0,
            boarding_time: 180.0,
            max_number_of_changes: 3,
            walk_radius: 1500.0,
            walk_change_radius: 300.0,
            finish_time_seconds: 1200.0,
            max_route_time: 60.0 * 60.0 * 10.0,
            use_schedule: false,
            schedule_time_of_day: 8 * 60 * 6,
            schedule_bound_inclusive: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = RoutingConfig::default();

        assert_eq!(cfg.walk_speed, 1.0);
        assert!((cfg.default_travel_speed - 16.666_666_666_666_668).abs() < 1e-9);
        assert_eq!(cfg.stop_time, 30.0);
        assert_eq!(cfg.change_time, 180.0);
        assert_eq!(cfg.boarding_time, 180.0);
        assert_eq!(cfg.max_number_of_changes, 3);
        assert_eq!(cfg.walk_radius, 1500.0);
        assert_eq!(cfg.finish_time_seconds, 1200.0);
        assert_eq!(cfg.max_route_time, 36_000.0);
        assert!(!cfg.use_schedule);
        // 08:00 in ten-second units.
        assert_eq!(cfg.schedule_time_of_day, 2880);
        assert!(cfg.schedule_bound_inclusive);
    }

    #[test]
    fn speed_lookup_falls_back_to_default() {
        let mut cfg = RoutingConfig::default();
        cfg.speeds.insert(RouteType::Tram, 8.0);
        cfg.speeds.insert(RouteType::Ferry, 0.0);

        assert_eq!(cfg.speed_by_route_type(RouteType::Tram), 8.0);
        assert_eq!(cfg.speed_by_route_type(RouteType::Ferry), 0.0);
        assert_eq!(
            cfg.speed_by_route_type(RouteType::Bus),
            cfg.default_travel_speed
        );
    }

    #[test]
    fn schedule_day_start_converts_clock_time() {
        let t = NaiveTime::from_hms_opt(8, 30, 0).unwrap();
        assert_eq!(RoutingConfig::schedule_day_start(t), 3060);

        let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        assert_eq!(RoutingConfig::schedule_day_start(midnight), 0);
    }

    #[test]
    fn walk_time() {
        let mut cfg = RoutingConfig::default();
        cfg.walk_speed = 1.2;
        assert!((cfg.walk_time(2000.0) - 1666.666_666_666_666_7).abs() < 1e-6);
    }

    #[test]
    fn deserializes_with_partial_fields() {
        let cfg: RoutingConfig =
            serde_json::from_str(r#"{"walk_speed": 1.2, "speeds": {"bus": 11.0}}"#).unwrap();

        assert_eq!(cfg.walk_speed, 1.2);
        assert_eq!(cfg.speed_by_route_type(RouteType::Bus), 11.0);
        // Everything else keeps its default.
        assert_eq!(cfg.max_number_of_changes, 3);
        assert!(cfg.schedule_bound_inclusive);
    }
}
