//! Problem data for the time-constrained orienteering problem.
//!
//! An instance is a depot (index 0) plus candidate stops, each with a value and a
//! visit duration, a travel-time matrix in minutes and a total time budget.
//! Construction validates everything once; afterwards the instance is immutable and
//! can be shared read-only between any number of concurrent solves.

use crate::error::SolverError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Index of the depot in every vector and in the travel-time matrix
pub const DEPOT: usize = 0;

/// A validated orienteering instance
#[derive(Debug, Clone, Serialize)]
pub struct OrienteeringInstance {
    /// Name of the instance
    pub name: String,
    /// Value collected when visiting each stop (`values[0] == 0`)
    values: Vec<f64>,
    /// Time spent at each stop, in minutes (`visit_durations[0] == 0`)
    visit_durations: Vec<f64>,
    /// `travel_times[i][j]`: minutes to go from stop i to stop j
    travel_times: Vec<Vec<f64>>,
    /// Maximum elapsed time of a route, return to depot included
    time_budget: f64,
    /// Optional human-readable stop names, used for display only
    labels: Vec<String>,
}

impl OrienteeringInstance {
    /// Build an instance, failing fast on malformed input.
    ///
    /// Checks that both vectors and every matrix row have one entry per stop, that
    /// all numbers are finite, durations and travel times are non-negative, the
    /// depot is neutral and the budget is a finite non-negative number.
    pub fn new(
        values: Vec<f64>,
        visit_durations: Vec<f64>,
        travel_times: Vec<Vec<f64>>,
        time_budget: f64,
    ) -> Result<Self, SolverError> {
        let n = travel_times.len();
        if n == 0 {
            return Err(SolverError::EmptyInstance);
        }
        if values.len() != n {
            return Err(SolverError::LengthMismatch { what: "values", expected: n, found: values.len() });
        }
        if visit_durations.len() != n {
            return Err(SolverError::LengthMismatch {
                what: "visit durations",
                expected: n,
                found: visit_durations.len(),
            });
        }

        for (row, entries) in travel_times.iter().enumerate() {
            if entries.len() != n {
                return Err(SolverError::NonSquareMatrix { row, expected: n, found: entries.len() });
            }
            for (col, &t) in entries.iter().enumerate() {
                if !t.is_finite() {
                    return Err(SolverError::NonFinite { what: "travel time", index: row * n + col });
                }
                if t < 0.0 {
                    return Err(SolverError::NegativeTravelTime { from: row, to: col, value: t });
                }
            }
        }

        for (index, (&v, &d)) in values.iter().zip(visit_durations.iter()).enumerate() {
            if !v.is_finite() {
                return Err(SolverError::NonFinite { what: "value", index });
            }
            if !d.is_finite() {
                return Err(SolverError::NonFinite { what: "visit duration", index });
            }
            if d < 0.0 {
                return Err(SolverError::NegativeDuration { index, value: d });
            }
        }

        if values[DEPOT] != 0.0 || visit_durations[DEPOT] != 0.0 {
            return Err(SolverError::DepotNotNeutral {
                value: values[DEPOT],
                duration: visit_durations[DEPOT],
            });
        }

        Self::check_budget(time_budget)?;

        Ok(OrienteeringInstance {
            name: String::from("unnamed"),
            values,
            visit_durations,
            travel_times,
            time_budget,
            labels: Vec::new(),
        })
    }

    fn check_budget(time_budget: f64) -> Result<(), SolverError> {
        if !time_budget.is_finite() || time_budget < 0.0 {
            return Err(SolverError::InvalidTimeBudget(time_budget));
        }
        Ok(())
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Attach stop names. Ignored unless there is exactly one label per stop.
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        if labels.len() == self.dimension() {
            self.labels = labels;
        } else {
            log::warn!(
                "ignoring {} labels for an instance with {} stops",
                labels.len(),
                self.dimension()
            );
        }
        self
    }

    /// Same data, different budget. Used to solve several scenarios on one matrix.
    pub fn with_time_budget(&self, time_budget: f64) -> Result<Self, SolverError> {
        Self::check_budget(time_budget)?;
        let mut instance = self.clone();
        instance.time_budget = time_budget;
        Ok(instance)
    }

    /// Number of stops including the depot
    #[inline]
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Number of candidate stops (depot excluded)
    pub fn num_stops(&self) -> usize {
        self.dimension() - 1
    }

    #[inline]
    pub fn time_budget(&self) -> f64 {
        self.time_budget
    }

    #[inline]
    pub fn value(&self, i: usize) -> f64 {
        self.values[i]
    }

    #[inline]
    pub fn visit_duration(&self, i: usize) -> f64 {
        self.visit_durations[i]
    }

    /// Minutes from `i` to `j`. Staying put costs nothing, whatever the matrix diagonal says.
    #[inline]
    pub fn travel_time(&self, i: usize, j: usize) -> f64 {
        if i == j {
            0.0
        } else {
            self.travel_times[i][j]
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn visit_durations(&self) -> &[f64] {
        &self.visit_durations
    }

    pub fn label(&self, i: usize) -> Option<&str> {
        self.labels.get(i).map(|s| s.as_str())
    }

    /// Elapsed time of a route: every travel leg plus every visit.
    pub fn route_time(&self, route: &[usize]) -> f64 {
        let travel: f64 = route.windows(2).map(|w| self.travel_time(w[0], w[1])).sum();
        let visits: f64 = route.iter().map(|&s| self.visit_durations[s]).sum();
        travel + visits
    }

    /// Value collected along a route, each stop counted once
    pub fn route_value(&self, route: &[usize]) -> f64 {
        let mut seen = HashSet::new();
        route
            .iter()
            .filter(|&&s| seen.insert(s))
            .map(|&s| self.values[s])
            .sum()
    }

    /// A route is feasible when it starts and ends at the depot, only uses known
    /// stops, visits no stop twice and fits in the time budget (up to `tolerance`).
    pub fn is_feasible_route(&self, route: &[usize], tolerance: f64) -> bool {
        if route.len() < 2 || route[0] != DEPOT || route[route.len() - 1] != DEPOT {
            return false;
        }
        let inner = &route[1..route.len() - 1];
        let mut seen = HashSet::new();
        for &s in inner {
            if s == DEPOT || s >= self.dimension() || !seen.insert(s) {
                return false;
            }
        }
        self.route_time(route) <= self.time_budget + tolerance
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let stops = 1..self.dimension();
        let n = self.num_stops();

        let total_value: f64 = stops.clone().map(|i| self.values[i]).sum();
        let positive_stops = stops.clone().filter(|&i| self.values[i] > 0.0).count();
        let total_visit: f64 = stops.clone().map(|i| self.visit_durations[i]).sum();
        let max_visit_time = stops.clone().map(|i| self.visit_durations[i]).fold(0.0, f64::max);

        let mut travel = Vec::new();
        for i in 0..self.dimension() {
            for j in 0..self.dimension() {
                if i != j {
                    travel.push(self.travel_times[i][j]);
                }
            }
        }
        let avg_travel_time = if travel.is_empty() {
            0.0
        } else {
            travel.iter().sum::<f64>() / travel.len() as f64
        };
        let max_travel_time = travel.iter().cloned().fold(0.0, f64::max);

        // stops that fit on their own: depot -> i -> depot within budget
        let reachable_stops = stops
            .filter(|&i| {
                self.travel_time(DEPOT, i) + self.visit_durations[i] + self.travel_time(i, DEPOT)
                    <= self.time_budget
            })
            .count();

        InstanceStatistics {
            name: self.name.clone(),
            num_stops: n,
            positive_stops,
            reachable_stops,
            total_value,
            avg_visit_time: if n > 0 { total_visit / n as f64 } else { 0.0 },
            max_visit_time,
            avg_travel_time,
            max_travel_time,
            time_budget: self.time_budget,
        }
    }
}

/// Summary statistics of an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub num_stops: usize,
    pub positive_stops: usize,
    pub reachable_stops: usize,
    pub total_value: f64,
    pub avg_visit_time: f64,
    pub max_visit_time: f64,
    pub avg_travel_time: f64,
    pub max_travel_time: f64,
    pub time_budget: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Stops: {} (+ depot)", self.num_stops)?;
        writeln!(f, "  Stops with positive value: {}", self.positive_stops)?;
        writeln!(f, "  Stops reachable alone: {}", self.reachable_stops)?;
        writeln!(f, "  Total value: {:.2}", self.total_value)?;
        writeln!(f, "  Avg visit time: {:.1} min", self.avg_visit_time)?;
        writeln!(f, "  Max visit time: {:.1} min", self.max_visit_time)?;
        writeln!(f, "  Avg travel time: {:.1} min", self.avg_travel_time)?;
        writeln!(f, "  Max travel time: {:.1} min", self.max_travel_time)?;
        writeln!(f, "  Time budget: {:.1} min", self.time_budget)
    }
}
