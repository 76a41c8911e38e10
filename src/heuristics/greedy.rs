//! Greedy value-per-minute construction

use crate::heuristics::ConstructionHeuristic;
use crate::instance::{OrienteeringInstance, DEPOT};
use crate::solution::Route;

/// Greedy ratio heuristic
///
/// From the current position, picks the unvisited stop with the best value per minute,
/// where the minutes count the trip there, the visit and a direct return to the depot.
/// The stop is taken only if the route can still be closed within the budget; otherwise
/// construction ends there. Stops whose ratio does not exceed `-1` are never picked.
/// Deterministic: ties go to the lowest stop index.
pub struct GreedyRatioHeuristic {
    /// small epsilon to avoid division by zero
    pub eps: f64,
}

/// Ratios at or below this never win a step
const RATIO_FLOOR: f64 = -1.0;

impl GreedyRatioHeuristic {
    pub fn new() -> Self {
        GreedyRatioHeuristic { eps: 1e-9 }
    }

    /// Minutes added by going from `current` to `candidate`, visiting it and
    /// returning straight to the depot
    fn round_trip(&self, instance: &OrienteeringInstance, current: usize, candidate: usize) -> f64 {
        instance.travel_time(current, candidate)
            + instance.visit_duration(candidate)
            + instance.travel_time(candidate, DEPOT)
    }

    /// Best-ratio unvisited stop, whether or not it still fits
    fn best_candidate(&self, instance: &OrienteeringInstance, current: usize, visited: &[bool]) -> Option<usize> {
        let mut best = None;
        let mut best_ratio = RATIO_FLOOR;

        for candidate in 1..instance.dimension() {
            if visited[candidate] {
                continue;
            }
            let ratio = instance.value(candidate) / (self.round_trip(instance, current, candidate) + self.eps);
            if ratio > best_ratio {
                best_ratio = ratio;
                best = Some(candidate);
            }
        }

        best
    }
}

impl Default for GreedyRatioHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for GreedyRatioHeuristic {
    fn construct(&self, instance: &OrienteeringInstance) -> Route {
        let start = std::time::Instant::now();

        let mut stops = vec![DEPOT];
        let mut visited = vec![false; instance.dimension()];
        visited[DEPOT] = true;

        let mut current = DEPOT;
        let mut elapsed = 0.0;
        let mut total_value = 0.0;

        while let Some(next) = self.best_candidate(instance, current, &visited) {
            let closed_time = elapsed
                + instance.travel_time(current, next)
                + instance.visit_duration(next)
                + instance.travel_time(next, DEPOT);
            if closed_time > instance.time_budget() {
                log::debug!("greedy: best stop {} does not fit, closing the route", next);
                break;
            }

            elapsed = elapsed + instance.travel_time(current, next) + instance.visit_duration(next);
            total_value += instance.value(next);
            visited[next] = true;
            stops.push(next);
            log::debug!("greedy: visit {} (elapsed {:.1}, value {:.2})", next, elapsed, total_value);
            current = next;
        }

        elapsed += instance.travel_time(current, DEPOT);
        stops.push(DEPOT);

        Route {
            stops,
            total_value,
            total_time: elapsed,
            algorithm: self.name().to_string(),
            computation_time: start.elapsed().as_secs_f64(),
        }
    }

    fn name(&self) -> &str {
        "GreedyRatio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(n: usize, t: f64) -> Vec<Vec<f64>> {
        (0..n)
            .map(|i| (0..n).map(|j| if i == j { 0.0 } else { t }).collect())
            .collect()
    }

    #[test]
    fn test_small_instance() {
        let instance = OrienteeringInstance::new(
            vec![0.0, 10.0, 8.0, 7.0],
            vec![0.0, 20.0, 20.0, 20.0],
            uniform(4, 10.0),
            70.0,
        )
        .unwrap();

        let route = GreedyRatioHeuristic::new().construct(&instance);
        assert_eq!(route.stops, vec![0, 1, 2, 0]);
        assert_eq!(route.total_value, 18.0);
        assert_eq!(route.total_time, 70.0);
        assert!(route.is_feasible(&instance));
        assert_eq!(route.algorithm, "GreedyRatio");
    }

    #[test]
    fn test_nothing_fits() {
        let instance = OrienteeringInstance::new(
            vec![0.0, 10.0, 8.0],
            vec![0.0, 20.0, 20.0],
            uniform(3, 10.0),
            0.0,
        )
        .unwrap();

        let route = GreedyRatioHeuristic::new().construct(&instance);
        assert_eq!(route.stops, vec![0, 0]);
        assert_eq!(route.total_value, 0.0);
        assert_eq!(route.total_time, 0.0);
    }

    #[test]
    fn test_stops_when_best_ratio_does_not_fit() {
        // stop 1 has the best ratio but cannot be closed within 30 minutes; stop 2 would fit
        let matrix = vec![
            vec![0.0, 20.0, 5.0],
            vec![20.0, 0.0, 20.0],
            vec![5.0, 20.0, 0.0],
        ];
        let instance =
            OrienteeringInstance::new(vec![0.0, 100.0, 1.0], vec![0.0, 1.0, 1.0], matrix, 30.0).unwrap();

        let route = GreedyRatioHeuristic::new().construct(&instance);
        assert_eq!(route.stops, vec![0, 0]);
        assert_eq!(route.total_value, 0.0);
        assert_eq!(route.total_time, 0.0);
    }

    #[test]
    fn test_ratio_floor() {
        let instance = OrienteeringInstance::new(
            vec![0.0, -5.0, 0.0, 2.0],
            vec![0.0, 1.0, 1.0, 1.0],
            uniform(4, 1.0),
            100.0,
        )
        .unwrap();

        // -5 / 3 is below the floor, a zero-value stop is still taken
        let route = GreedyRatioHeuristic::new().construct(&instance);
        assert_eq!(route.stops, vec![0, 3, 2, 0]);
        assert_eq!(route.total_value, 2.0);
        assert_eq!(route.total_time, 5.0);
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let instance = OrienteeringInstance::new(
            vec![0.0, 5.0, 5.0],
            vec![0.0, 10.0, 10.0],
            uniform(3, 10.0),
            30.0,
        )
        .unwrap();

        let route = GreedyRatioHeuristic::new().construct(&instance);
        assert_eq!(route.stops, vec![0, 1, 0]);
    }
}
