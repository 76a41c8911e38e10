//! Construction heuristics for the orienteering problem.
//!
//! A construction heuristic builds one complete, feasible route in a single pass.
//! Its result serves as a quick baseline and as a warm start for the exact search.

use crate::instance::OrienteeringInstance;
use crate::solution::Route;

pub mod greedy;

pub use greedy::*;

pub trait ConstructionHeuristic {
    fn construct(&self, instance: &OrienteeringInstance) -> Route;
    fn name(&self) -> &str;
}
