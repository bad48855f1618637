//! Multi-modal public-transport route planner.
//!
//! Answers: "how do I get from here to there by walking and riding
//! bus/tram/rail lines?" The core is a time-expanded graph search whose
//! nodes are *ride segments* (a ride on a specific line from one stop
//! onward) rather than stops, expanded lazily from a spatial index.
//!
//! Map tile storage, UI and the network layer live outside this crate;
//! they plug in through the [`planner::StopResolver`] trait and the
//! [`planner::RouteCalculationProgress`] cancellation handle.

pub mod domain;
pub mod geo;
pub mod planner;
