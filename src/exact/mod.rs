//! Exact search: best-first branch-and-bound with a fractional knapsack bound.

pub mod bound;
pub mod node;
pub mod branch_and_bound;

pub use bound::FractionalBound;
pub use branch_and_bound::*;
