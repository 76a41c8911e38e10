//! Fractional knapsack upper bound for partial routes.
//!
//! Every unvisited stop with a positive value is an item. Its weight is a lower
//! bound on the minutes it adds to any completion: its visit duration plus the
//! cheapest way to enter it, either from the current position or from another
//! stop still open. One return leg is always needed, so the capacity is the
//! remaining budget minus the cheapest return to the depot from an open stop.
//! Filling that capacity by decreasing value per minute, and cutting the last
//! item, never underestimates the best integral completion.

use crate::exact::node::SearchNode;
use crate::instance::{OrienteeringInstance, DEPOT};
use ordered_float::OrderedFloat;

/// Weights at or below this are treated as free
pub const BOUND_EPSILON: f64 = 1e-9;

/// Upper bound estimator tied to one instance
pub struct FractionalBound<'a> {
    instance: &'a OrienteeringInstance,
    /// For each stop, every other stop ordered by travel time into it
    entry_order: Vec<Vec<usize>>,
    /// Candidate stops ordered by travel time back to the depot
    return_order: Vec<usize>,
}

struct Item {
    ratio: f64,
    value: f64,
    cost: f64,
}

impl<'a> FractionalBound<'a> {
    pub fn new(instance: &'a OrienteeringInstance) -> Self {
        let n = instance.dimension();

        let entry_order = (0..n)
            .map(|j| {
                let mut preds: Vec<usize> = (0..n).filter(|&p| p != j).collect();
                preds.sort_by_key(|&p| OrderedFloat(instance.travel_time(p, j)));
                preds
            })
            .collect();

        let mut return_order: Vec<usize> = (1..n).collect();
        return_order.sort_by_key(|&j| OrderedFloat(instance.travel_time(j, DEPOT)));

        FractionalBound { instance, entry_order, return_order }
    }

    /// Cheapest arrival into `stop` from the current position or an open stop
    fn entry_time(&self, node: &SearchNode, stop: usize) -> f64 {
        self.entry_order[stop]
            .iter()
            .find(|&&p| p == node.position || !node.visited.contains(p))
            .map_or(0.0, |&p| self.instance.travel_time(p, stop))
    }

    /// Cheapest return leg from any open stop, `None` when every stop is visited
    fn closing_time(&self, node: &SearchNode) -> Option<f64> {
        self.return_order
            .iter()
            .find(|&&j| !node.visited.contains(j))
            .map(|&j| self.instance.travel_time(j, DEPOT))
    }

    /// Upper bound on the total value reachable by completing `node` within `time_budget`
    pub fn estimate(&self, node: &SearchNode, time_budget: f64) -> f64 {
        let remaining = time_budget - node.elapsed;
        // remaining == 0 falls through: zero-cost stops still count in full below
        if remaining < 0.0 {
            return node.value;
        }
        let capacity = match self.closing_time(node) {
            Some(closing) => remaining - closing,
            None => return node.value,
        };
        if capacity < 0.0 {
            return node.value;
        }

        let mut bound = node.value;
        let mut items = Vec::new();
        for j in 1..self.instance.dimension() {
            let value = self.instance.value(j);
            if node.visited.contains(j) || value <= 0.0 {
                continue;
            }
            let cost = self.instance.visit_duration(j) + self.entry_time(node, j);
            if cost <= BOUND_EPSILON {
                bound += value;
            } else {
                items.push(Item { ratio: value / cost.max(BOUND_EPSILON), value, cost });
            }
        }

        // stable: equal ratios keep ascending stop order
        items.sort_by(|a, b| OrderedFloat(b.ratio).cmp(&OrderedFloat(a.ratio)));

        let mut capacity = capacity;
        for item in &items {
            if capacity <= 0.0 {
                break;
            }
            let take = (capacity / item.cost).min(1.0);
            bound += item.value * take;
            capacity -= item.cost * take;
        }

        bound
    }
}
