//! Best-first branch-and-bound for the orienteering problem.
//!
//! The search starts from the empty route at the depot and branches by appending
//! one stop that still allows returning to the depot within the budget. Every
//! child is immediately closed and compared with the incumbent, so good routes
//! are found early and pruning kicks in quickly. Nodes whose fractional bound
//! cannot beat the incumbent are discarded.
//!
//! The search is anytime: node and wall-clock limits stop it early, and the best
//! route found so far is returned together with a [`SearchStatus`] telling
//! whether optimality was proven.

use crate::error::SolverError;
use crate::exact::bound::FractionalBound;
use crate::exact::node::{Frontier, NodeArena, SearchNode};
use crate::instance::{OrienteeringInstance, DEPOT};
use crate::solution::{Route, FEASIBILITY_TOLERANCE};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Nodes whose bound does not exceed the incumbent by more than this are pruned
pub const PRUNE_TOLERANCE: f64 = 1e-9;

/// Branch-and-bound configuration
#[derive(Debug, Clone)]
pub struct BranchAndBoundConfig {
    /// Maximum number of node expansions
    pub max_nodes: usize,
    /// Wall-clock limit in seconds, `None` for no limit
    pub time_limit: Option<f64>,
    /// Route used as the initial incumbent when it is feasible
    pub warm_start: Option<Vec<usize>>,
    /// Expansions between two progress log lines
    pub log_interval: usize,
}

impl Default for BranchAndBoundConfig {
    fn default() -> Self {
        BranchAndBoundConfig {
            max_nodes: 100_000,
            time_limit: None,
            warm_start: None,
            log_interval: 10_000,
        }
    }
}

impl BranchAndBoundConfig {
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.max_nodes == 0 {
            return Err(SolverError::InvalidNodeLimit);
        }
        if let Some(limit) = self.time_limit {
            if !limit.is_finite() || limit < 0.0 {
                return Err(SolverError::InvalidTimeLimit(limit));
            }
        }
        Ok(())
    }
}

/// Why the search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStatus {
    /// No open node could beat the incumbent: the route is optimal
    Exhausted,
    /// The expansion limit was reached with promising nodes left
    NodeLimit,
    /// The wall-clock limit was reached with promising nodes left
    TimeLimit,
}

/// Outcome of one branch-and-bound run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResult {
    /// Best route found, starting and ending at the depot
    pub best_route: Vec<usize>,
    pub best_value: f64,
    /// Elapsed time of the best route, return leg included
    pub best_time: f64,
    pub nodes_expanded: usize,
    /// Children created (feasible moves)
    pub nodes_generated: usize,
    /// Nodes discarded by the bound, at creation or when popped
    pub nodes_pruned: usize,
    /// Deepest expanded node, in stops
    pub max_depth: usize,
    pub runtime_seconds: f64,
    pub status: SearchStatus,
    /// Proven upper bound on the optimal value
    pub upper_bound: f64,
}

impl SolveResult {
    /// True when a limit cut the search short; the route is feasible but may not be optimal
    pub fn budget_exhausted(&self) -> bool {
        self.status != SearchStatus::Exhausted
    }

    /// Relative gap between the best route and the proven upper bound
    pub fn gap(&self) -> f64 {
        if self.upper_bound.abs() < PRUNE_TOLERANCE {
            0.0
        } else {
            ((self.upper_bound - self.best_value) / self.upper_bound.abs()).max(0.0)
        }
    }

    pub fn to_route(&self) -> Route {
        Route {
            stops: self.best_route.clone(),
            total_value: self.best_value,
            total_time: self.best_time,
            algorithm: "BranchAndBound".to_string(),
            computation_time: self.runtime_seconds,
        }
    }
}

impl std::fmt::Display for SolveResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Branch and Bound ({:?})", self.status)?;
        writeln!(f, "  Value: {:.2}", self.best_value)?;
        writeln!(f, "  Time: {:.1} min", self.best_time)?;
        writeln!(f, "  Upper bound: {:.2} (gap {:.2}%)", self.upper_bound, self.gap() * 100.0)?;
        writeln!(
            f,
            "  Nodes: {} expanded, {} generated, {} pruned",
            self.nodes_expanded, self.nodes_generated, self.nodes_pruned
        )?;
        writeln!(f, "  Max depth: {}", self.max_depth)?;
        writeln!(f, "  Runtime: {:.4}s", self.runtime_seconds)?;
        writeln!(f, "  Route: {:?}", self.best_route)
    }
}

/// Best complete route known during one solve
#[derive(Debug, Clone)]
struct Incumbent {
    stops: Vec<usize>,
    value: f64,
    time: f64,
}

impl Incumbent {
    fn depot_only() -> Self {
        Incumbent { stops: vec![DEPOT, DEPOT], value: 0.0, time: 0.0 }
    }
}

/// Exact best-first search engine
pub struct BranchAndBound {
    pub config: BranchAndBoundConfig,
}

impl BranchAndBound {
    pub fn new(config: BranchAndBoundConfig) -> Self {
        BranchAndBound { config }
    }

    fn initial_incumbent(&self, instance: &OrienteeringInstance) -> Incumbent {
        let mut incumbent = Incumbent::depot_only();
        if let Some(stops) = &self.config.warm_start {
            if instance.is_feasible_route(stops, 0.0) {
                let value = instance.route_value(stops);
                if value > incumbent.value {
                    log::info!("warm start accepted with value {:.2}", value);
                    incumbent = Incumbent {
                        stops: stops.clone(),
                        value,
                        time: instance.route_time(stops),
                    };
                }
            } else {
                log::warn!("ignoring infeasible warm start {:?}", stops);
            }
        }
        incumbent
    }

    /// Run the search on `instance` with its own time budget
    pub fn solve(&self, instance: &OrienteeringInstance) -> Result<SolveResult, SolverError> {
        self.config.validate()?;

        let start = Instant::now();
        // validated caps only fail to convert on overflow, which is no limit in practice
        let time_limit = self
            .config
            .time_limit
            .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok());
        let budget = instance.time_budget();
        let estimator = FractionalBound::new(instance);

        log::info!(
            "branch and bound on '{}': {} stops, budget {:.1} min, max {} nodes",
            instance.name,
            instance.num_stops(),
            budget,
            self.config.max_nodes
        );

        let mut incumbent = self.initial_incumbent(instance);
        let mut arena = NodeArena::new();
        let mut frontier = Frontier::new();

        let mut root = SearchNode::root(instance.dimension());
        root.bound = estimator.estimate(&root, budget);
        let root_bound = root.bound;
        let root_id = arena.push(root);
        frontier.push(root_id, root_bound);

        let mut nodes_expanded = 0usize;
        let mut nodes_generated = 0usize;
        let mut nodes_pruned = 0usize;
        let mut max_depth = 0usize;

        let status = loop {
            if frontier.is_empty() {
                break SearchStatus::Exhausted;
            }
            if nodes_expanded >= self.config.max_nodes {
                break SearchStatus::NodeLimit;
            }
            if let Some(limit) = time_limit {
                if start.elapsed() >= limit {
                    break SearchStatus::TimeLimit;
                }
            }

            let (id, bound) = match frontier.pop() {
                Some(entry) => entry,
                None => break SearchStatus::Exhausted,
            };
            if bound <= incumbent.value + PRUNE_TOLERANCE {
                nodes_pruned += 1;
                continue;
            }

            let node = arena.get(id).clone();
            for stop in 1..instance.dimension() {
                if node.visited.contains(stop) {
                    continue;
                }
                let elapsed = node.elapsed
                    + instance.travel_time(node.position, stop)
                    + instance.visit_duration(stop);
                let closed_time = elapsed + instance.travel_time(stop, DEPOT);
                if closed_time > budget {
                    continue;
                }

                let mut child = node.branch(id, stop, node.value + instance.value(stop), elapsed);
                child.bound = estimator.estimate(&child, budget);
                nodes_generated += 1;

                if child.value > incumbent.value {
                    let mut stops = arena.path(id);
                    stops.push(stop);
                    stops.push(DEPOT);
                    log::info!(
                        "new incumbent {:.2} ({} stops, {:.1} min) after {} expansions",
                        child.value,
                        child.depth,
                        closed_time,
                        nodes_expanded
                    );
                    incumbent = Incumbent { stops, value: child.value, time: closed_time };
                }

                if child.bound > incumbent.value + PRUNE_TOLERANCE {
                    let child_bound = child.bound;
                    let child_id = arena.push(child);
                    frontier.push(child_id, child_bound);
                } else {
                    nodes_pruned += 1;
                }
            }

            nodes_expanded += 1;
            max_depth = max_depth.max(node.depth);

            if self.config.log_interval > 0 && nodes_expanded % self.config.log_interval == 0 {
                log::debug!(
                    "expanded {} nodes, frontier {}, incumbent {:.2}, top bound {:.2}",
                    nodes_expanded,
                    frontier.len(),
                    incumbent.value,
                    frontier.peek_bound().unwrap_or(incumbent.value)
                );
            }
        };

        // a limit hit with only dominated nodes left still proves optimality
        let open_bound = frontier
            .peek_bound()
            .filter(|&b| b > incumbent.value + PRUNE_TOLERANCE);
        let (status, upper_bound) = match open_bound {
            Some(b) => (status, b.max(incumbent.value)),
            None => (SearchStatus::Exhausted, incumbent.value),
        };

        let runtime_seconds = start.elapsed().as_secs_f64();
        log::info!(
            "branch and bound finished ({:?}): value {:.2}, {} expansions, {:.3}s",
            status,
            incumbent.value,
            nodes_expanded,
            runtime_seconds
        );
        debug_assert!(instance.is_feasible_route(&incumbent.stops, FEASIBILITY_TOLERANCE));

        Ok(SolveResult {
            best_route: incumbent.stops,
            best_value: incumbent.value,
            best_time: incumbent.time,
            nodes_expanded,
            nodes_generated,
            nodes_pruned,
            max_depth,
            runtime_seconds,
            status,
            upper_bound,
        })
    }
}
