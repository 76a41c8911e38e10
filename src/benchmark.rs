//! Scenario sweeps: greedy vs. branch-and-bound over several time budgets.
//!
//! Every scenario shares the same read-only travel data and owns its own search
//! state, so scenarios are solved in parallel.

use crate::error::SolverError;
use crate::exact::{BranchAndBound, BranchAndBoundConfig, SearchStatus};
use crate::heuristics::{ConstructionHeuristic, GreedyRatioHeuristic};
use crate::instance::OrienteeringInstance;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Result of one budget scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Time budget in minutes
    pub time_budget: f64,
    pub greedy_value: f64,
    pub greedy_time: f64,
    pub bnb_value: f64,
    pub bnb_time: f64,
    pub bnb_route: Vec<usize>,
    pub nodes_expanded: usize,
    /// Branch-and-bound wall time in seconds
    pub runtime_seconds: f64,
    pub status: SearchStatus,
    pub upper_bound: f64,
}

impl ScenarioResult {
    /// Value gained by the exact search over the greedy route
    pub fn improvement(&self) -> f64 {
        self.bnb_value - self.greedy_value
    }
}

/// Sweep configuration
#[derive(Debug, Clone)]
pub struct ScenarioSweep {
    /// Time budgets to solve, in minutes
    pub budgets: Vec<f64>,
    /// Search settings shared by every scenario
    pub config: BranchAndBoundConfig,
    /// Seed each search with its greedy route
    pub warm_start: bool,
    /// Solve scenarios in parallel
    pub parallel: bool,
}

impl Default for ScenarioSweep {
    fn default() -> Self {
        ScenarioSweep {
            budgets: vec![120.0, 240.0, 480.0],
            config: BranchAndBoundConfig::default(),
            warm_start: false,
            parallel: true,
        }
    }
}

impl ScenarioSweep {
    fn run_scenario(
        &self,
        instance: &OrienteeringInstance,
        time_budget: f64,
    ) -> Result<ScenarioResult, SolverError> {
        let scenario = instance.with_time_budget(time_budget)?;
        let greedy = GreedyRatioHeuristic::new().construct(&scenario);

        let mut config = self.config.clone();
        if self.warm_start {
            config.warm_start = Some(greedy.stops.clone());
        }
        let result = BranchAndBound::new(config).solve(&scenario)?;

        log::info!(
            "scenario {:.0} min: greedy {:.2}, branch and bound {:.2} ({:?})",
            time_budget,
            greedy.total_value,
            result.best_value,
            result.status
        );

        Ok(ScenarioResult {
            time_budget,
            greedy_value: greedy.total_value,
            greedy_time: greedy.total_time,
            bnb_value: result.best_value,
            bnb_time: result.best_time,
            bnb_route: result.best_route,
            nodes_expanded: result.nodes_expanded,
            runtime_seconds: result.runtime_seconds,
            status: result.status,
            upper_bound: result.upper_bound,
        })
    }

    /// Solve every budget; results come back in budget order
    pub fn run(&self, instance: &OrienteeringInstance) -> Result<Vec<ScenarioResult>, SolverError> {
        self.config.validate()?;

        if self.parallel {
            self.budgets
                .par_iter()
                .map(|&budget| self.run_scenario(instance, budget))
                .collect()
        } else {
            self.budgets
                .iter()
                .map(|&budget| self.run_scenario(instance, budget))
                .collect()
        }
    }
}

/// Generate summary report
pub fn generate_report(results: &[ScenarioResult]) -> String {
    let mut report = String::new();

    report.push_str("========================================\n");
    report.push_str("       Itinerary Scenario Report\n");
    report.push_str("========================================\n\n");

    report.push_str("-".repeat(92).as_str());
    report.push('\n');
    report.push_str(&format!(
        "{:>10} {:>12} {:>12} {:>12} {:>10} {:>10} {:>10} {:>10}\n",
        "Budget", "Greedy", "B&B", "Bound", "Gain", "Nodes", "Time(s)", "Status"
    ));
    report.push_str("-".repeat(92).as_str());
    report.push('\n');

    for r in results {
        report.push_str(&format!(
            "{:>10.1} {:>12.2} {:>12.2} {:>12.2} {:>10.2} {:>10} {:>10.4} {:>10}\n",
            r.time_budget,
            r.greedy_value,
            r.bnb_value,
            r.upper_bound,
            r.improvement(),
            r.nodes_expanded,
            r.runtime_seconds,
            format!("{:?}", r.status)
        ));
    }

    report.push_str("-".repeat(92).as_str());
    report.push('\n');

    let proven = results.iter().filter(|r| r.status == SearchStatus::Exhausted).count();
    report.push_str(&format!("\nProven optimal: {}/{}\n", proven, results.len()));

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_instance() -> OrienteeringInstance {
        let positions = [0.0, 5.0, 10.0, 15.0, 20.0, 25.0];
        let matrix = positions
            .iter()
            .map(|a: &f64| positions.iter().map(|b| (a - b).abs()).collect())
            .collect();
        OrienteeringInstance::new(
            vec![0.0, 3.0, 4.0, 5.0, 6.0, 9.0],
            vec![0.0, 5.0, 5.0, 5.0, 5.0, 5.0],
            matrix,
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn test_sweep_order_and_monotonicity() {
        let sweep = ScenarioSweep {
            budgets: vec![60.0, 10.0, 30.0, 90.0],
            ..Default::default()
        };
        let results = sweep.run(&line_instance()).unwrap();

        let budgets: Vec<f64> = results.iter().map(|r| r.time_budget).collect();
        assert_eq!(budgets, vec![60.0, 10.0, 30.0, 90.0]);

        for r in &results {
            assert_eq!(r.status, SearchStatus::Exhausted);
            assert!(r.bnb_time <= r.time_budget + 1e-9);
            assert!(r.improvement() >= -1e-9);
        }
        // more time never hurts an exact search
        assert!(results[3].bnb_value >= results[0].bnb_value);
        assert!(results[0].bnb_value >= results[2].bnb_value);
        assert!(results[2].bnb_value >= results[1].bnb_value);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let parallel = ScenarioSweep { budgets: vec![30.0, 60.0], ..Default::default() };
        let sequential = ScenarioSweep { parallel: false, ..parallel.clone() };
        let instance = line_instance();

        let a = parallel.run(&instance).unwrap();
        let b = sequential.run(&instance).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.bnb_route, y.bnb_route);
            assert_eq!(x.bnb_value, y.bnb_value);
        }
    }

    #[test]
    fn test_invalid_budget() {
        let sweep = ScenarioSweep { budgets: vec![-1.0], ..Default::default() };
        assert_eq!(
            sweep.run(&line_instance()).unwrap_err(),
            SolverError::InvalidTimeBudget(-1.0)
        );
    }

    #[test]
    fn test_report() {
        let sweep = ScenarioSweep { budgets: vec![30.0], warm_start: true, ..Default::default() };
        let results = sweep.run(&line_instance()).unwrap();
        let report = generate_report(&results);
        assert!(report.contains("Itinerary Scenario Report"));
        assert!(report.contains("Proven optimal: 1/1"));
    }
}
