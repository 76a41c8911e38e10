//! Route representation for the orienteering problem.
//!
//! A route is a closed itinerary: it leaves the depot, visits each chosen stop
//! once and comes back to the depot.

use crate::instance::{OrienteeringInstance, DEPOT};
use serde::{Deserialize, Serialize};

/// Tolerance used when checking a route against the time budget
pub const FEASIBILITY_TOLERANCE: f64 = 1e-9;

/// A complete depot-to-depot itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Stop indices, starting and ending at the depot
    pub stops: Vec<usize>,
    /// Total value collected
    pub total_value: f64,
    /// Total elapsed time (travel + visits + return leg), in minutes
    pub total_time: f64,
    /// Algorithm that generated this route
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
}

impl Route {
    /// The route that never leaves the depot. Always feasible.
    pub fn depot_only() -> Self {
        Route {
            stops: vec![DEPOT, DEPOT],
            total_value: 0.0,
            total_time: 0.0,
            algorithm: String::new(),
            computation_time: 0.0,
        }
    }

    /// Evaluate a stop sequence against an instance
    pub fn from_stops(instance: &OrienteeringInstance, stops: Vec<usize>, algorithm: &str) -> Self {
        let total_value = instance.route_value(&stops);
        let total_time = instance.route_time(&stops);
        Route {
            stops,
            total_value,
            total_time,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
        }
    }

    pub fn is_feasible(&self, instance: &OrienteeringInstance) -> bool {
        instance.is_feasible_route(&self.stops, FEASIBILITY_TOLERANCE)
    }

    /// Number of real stops visited (depot excluded)
    pub fn num_visits(&self) -> usize {
        self.stops.len().saturating_sub(2)
    }

    /// Stops visited, in order, without the depot at either end
    pub fn visits(&self) -> &[usize] {
        if self.stops.len() < 2 {
            return &[];
        }
        &self.stops[1..self.stops.len() - 1]
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::depot_only()
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Route ({})", self.algorithm)?;
        writeln!(f, "  Value: {:.2}", self.total_value)?;
        writeln!(f, "  Time: {:.1} min", self.total_time)?;
        writeln!(f, "  Stops visited: {}", self.num_visits())?;
        writeln!(f, "  Computation: {:.4}s", self.computation_time)?;
        writeln!(f, "  Route: {:?}", self.stops)
    }
}
