//! Itinerary Solver Library
//!
//! Plans a single day of visits: starting and ending at a hotel (the depot), choose
//! which points of interest to visit, and in which order, to collect the most value
//! without exceeding a total time budget. This is the orienteering problem.
//!
//! # Features
//!
//! - Greedy value-per-minute construction heuristic
//! - Exact best-first branch-and-bound with an admissible fractional bound
//! - Anytime search: node and wall-clock limits, with explicit reporting of whether
//!   optimality was proven
//! - POI CSV ingestion with haversine travel times
//! - Parallel scenario sweeps over several time budgets
//!
//! # Example
//!
//! ```no_run
//! use itinerary_solver::poi::{InstanceConfig, PoiDataset};
//! use itinerary_solver::heuristics::{ConstructionHeuristic, GreedyRatioHeuristic};
//! use itinerary_solver::exact::{BranchAndBound, BranchAndBoundConfig};
//!
//! let dataset = PoiDataset::from_csv_path("pois.csv").unwrap();
//! let instance = dataset.to_instance(&InstanceConfig::default()).unwrap();
//!
//! let greedy = GreedyRatioHeuristic::new().construct(&instance);
//! let config = BranchAndBoundConfig {
//!     warm_start: Some(greedy.stops.clone()),
//!     ..Default::default()
//! };
//! let result = BranchAndBound::new(config).solve(&instance).unwrap();
//!
//! println!("Greedy value: {:.2}, B&B value: {:.2}", greedy.total_value, result.best_value);
//! ```

pub mod error;
pub mod instance;
pub mod solution;
pub mod heuristics;
pub mod exact;
pub mod poi;
pub mod benchmark;

pub use error::SolverError;
pub use exact::{BranchAndBound, BranchAndBoundConfig, SearchStatus, SolveResult};
pub use heuristics::{ConstructionHeuristic, GreedyRatioHeuristic};
pub use instance::OrienteeringInstance;
pub use solution::Route;

/// Greedy route for raw inputs.
///
/// `values` and `visit_durations` have one entry per stop with the depot at index 0,
/// `travel_times` is the square matrix of travel minutes. Fails only on malformed input.
pub fn greedy_route(
    values: &[f64],
    visit_durations: &[f64],
    travel_times: &[Vec<f64>],
    time_budget: f64,
) -> Result<Route, SolverError> {
    let instance = OrienteeringInstance::new(
        values.to_vec(),
        visit_durations.to_vec(),
        travel_times.to_vec(),
        time_budget,
    )?;
    Ok(GreedyRatioHeuristic::new().construct(&instance))
}

/// Branch-and-bound for raw inputs, limited to `max_nodes` expansions and, when given,
/// `time_cap_seconds` of wall-clock time.
pub fn solve(
    values: &[f64],
    visit_durations: &[f64],
    travel_times: &[Vec<f64>],
    time_budget: f64,
    max_nodes: usize,
    time_cap_seconds: Option<f64>,
) -> Result<SolveResult, SolverError> {
    let instance = OrienteeringInstance::new(
        values.to_vec(),
        visit_durations.to_vec(),
        travel_times.to_vec(),
        time_budget,
    )?;
    let config = BranchAndBoundConfig {
        max_nodes,
        time_limit: time_cap_seconds,
        ..Default::default()
    };
    BranchAndBound::new(config).solve(&instance)
}
