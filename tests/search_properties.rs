//! Randomised checks of the search against exhaustive enumeration on small instances.

use itinerary_solver::exact::node::SearchNode;
use itinerary_solver::exact::{BranchAndBound, BranchAndBoundConfig, FractionalBound, SearchStatus};
use itinerary_solver::heuristics::{ConstructionHeuristic, GreedyRatioHeuristic};
use itinerary_solver::instance::{OrienteeringInstance, DEPOT};
use itinerary_solver::poi::{InstanceConfig, PoiDataset};
use proptest::prelude::*;

const TOLERANCE: f64 = 1e-6;

prop_compose! {
    /// Up to six stops on a plane, Euclidean travel times
    fn arb_instance()(n in 1usize..=6)(
        points in prop::collection::vec((0.0f64..50.0, 0.0f64..50.0), n + 1),
        values in prop::collection::vec(-3i32..10, n),
        durations in prop::collection::vec(0u32..20, n),
        budget in 0.0f64..150.0,
    ) -> OrienteeringInstance {
        let travel_times = points
            .iter()
            .map(|&(ax, ay)| {
                points
                    .iter()
                    .map(|&(bx, by)| ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt())
                    .collect()
            })
            .collect();
        let values = std::iter::once(0.0).chain(values.into_iter().map(f64::from)).collect();
        let durations = std::iter::once(0.0).chain(durations.into_iter().map(f64::from)).collect();
        OrienteeringInstance::new(values, durations, travel_times, budget).unwrap()
    }
}

/// Best value over every completion in which each prefix can still return in time
fn best_completion(instance: &OrienteeringInstance, node: &SearchNode) -> Option<f64> {
    let budget = instance.time_budget();
    if node.elapsed + instance.travel_time(node.position, DEPOT) > budget {
        return None;
    }

    let mut best = node.value;
    for stop in 1..instance.dimension() {
        if node.visited.contains(stop) {
            continue;
        }
        let elapsed = node.elapsed
            + instance.travel_time(node.position, stop)
            + instance.visit_duration(stop);
        if elapsed + instance.travel_time(stop, DEPOT) > budget {
            continue;
        }
        let child = node.branch(0, stop, node.value + instance.value(stop), elapsed);
        if let Some(value) = best_completion(instance, &child) {
            best = best.max(value);
        }
    }
    Some(best)
}

fn exhaustive(max_nodes: usize) -> BranchAndBound {
    BranchAndBound::new(BranchAndBoundConfig { max_nodes, ..Default::default() })
}

proptest! {
    #[test]
    fn bound_never_underestimates(instance in arb_instance()) {
        let bound = FractionalBound::new(&instance);
        let budget = instance.time_budget();
        let root = SearchNode::root(instance.dimension());

        let mut nodes = vec![root.clone()];
        for stop in 1..instance.dimension() {
            let elapsed = instance.travel_time(DEPOT, stop) + instance.visit_duration(stop);
            nodes.push(root.branch(0, stop, instance.value(stop), elapsed));
        }

        for node in &nodes {
            if let Some(best) = best_completion(&instance, node) {
                prop_assert!(bound.estimate(node, budget) >= best - TOLERANCE);
            }
        }
    }

    #[test]
    fn exhausted_search_is_optimal(instance in arb_instance()) {
        let result = exhaustive(100_000).solve(&instance).unwrap();
        let root = SearchNode::root(instance.dimension());
        let optimum = best_completion(&instance, &root).unwrap();

        prop_assert_eq!(result.status, SearchStatus::Exhausted);
        prop_assert!((result.best_value - optimum).abs() < TOLERANCE);
        prop_assert!((result.upper_bound - result.best_value).abs() < TOLERANCE);
    }

    #[test]
    fn routes_are_feasible(instance in arb_instance(), max_nodes in 1usize..20) {
        let result = exhaustive(max_nodes).solve(&instance).unwrap();
        let route = &result.best_route;

        prop_assert_eq!(route.first(), Some(&DEPOT));
        prop_assert_eq!(route.last(), Some(&DEPOT));
        prop_assert!(instance.is_feasible_route(route, 1e-9));
        let mut inner = route[1..route.len() - 1].to_vec();
        inner.sort_unstable();
        inner.dedup();
        prop_assert_eq!(inner.len(), route.len() - 2);
        prop_assert!((instance.route_time(route) - result.best_time).abs() < TOLERANCE);
        prop_assert!((instance.route_value(route) - result.best_value).abs() < TOLERANCE);
    }

    #[test]
    fn limited_search_reports_a_valid_upper_bound(instance in arb_instance(), max_nodes in 1usize..5) {
        let result = exhaustive(max_nodes).solve(&instance).unwrap();
        let root = SearchNode::root(instance.dimension());
        let optimum = best_completion(&instance, &root).unwrap();

        prop_assert!(result.best_value <= optimum + TOLERANCE);
        prop_assert!(result.upper_bound >= optimum - TOLERANCE);
        prop_assert!(result.gap() >= 0.0);
        if !result.budget_exhausted() {
            prop_assert!((result.best_value - optimum).abs() < TOLERANCE);
        }
    }

    #[test]
    fn search_matches_or_beats_greedy(instance in arb_instance()) {
        let greedy = GreedyRatioHeuristic::new().construct(&instance);
        let result = exhaustive(100_000).solve(&instance).unwrap();

        prop_assert!(greedy.is_feasible(&instance));
        prop_assert!(result.best_value >= greedy.total_value - TOLERANCE);
    }

    #[test]
    fn warm_start_keeps_the_optimum(instance in arb_instance()) {
        let greedy = GreedyRatioHeuristic::new().construct(&instance);
        let greedy_value = greedy.total_value;
        let cold = exhaustive(100_000).solve(&instance).unwrap();
        let warm = BranchAndBound::new(BranchAndBoundConfig {
            warm_start: Some(greedy.stops),
            ..Default::default()
        })
        .solve(&instance)
        .unwrap();

        prop_assert!((cold.best_value - warm.best_value).abs() < TOLERANCE);
        prop_assert_eq!(warm.status, SearchStatus::Exhausted);
        prop_assert!(warm.best_value >= greedy_value - TOLERANCE);
    }

    #[test]
    fn solving_twice_gives_the_same_answer(instance in arb_instance()) {
        let solver = exhaustive(100_000);
        let first = solver.solve(&instance).unwrap();
        let second = solver.solve(&instance).unwrap();

        prop_assert_eq!(first.best_route, second.best_route);
        prop_assert_eq!(first.nodes_expanded, second.nodes_expanded);
        prop_assert_eq!(first.status, second.status);
    }
}

#[test]
fn csv_to_itinerary() {
    let csv = "\
name,latitude,longitude,rating,price_level,est_time_min
Tanah Lot,-8.6212,115.0868,4.7,2,90
Ubud Monkey Forest,-8.5188,115.2585,4.5,2,60
Tegallalang,-8.4312,115.2793,4.4,1,45
Sanur Beach,-8.6783,115.2631,4.3,0,60
";
    let dataset = PoiDataset::from_reader(csv.as_bytes()).unwrap();
    let instance = dataset.to_instance(&InstanceConfig::default()).unwrap();
    assert_eq!(instance.num_stops(), 4);

    let greedy = GreedyRatioHeuristic::new().construct(&instance);
    let result = exhaustive(100_000).solve(&instance).unwrap();

    assert_eq!(result.status, SearchStatus::Exhausted);
    assert!(result.best_value >= greedy.total_value - TOLERANCE);
    assert!(result.best_time <= 480.0 + 1e-9);
    assert!(result.best_route.len() > 2);
    for &stop in &result.best_route[1..result.best_route.len() - 1] {
        assert!(instance.label(stop).is_some());
    }
}
