use crate::planner::Planner;
use haul_structs::core::Task;

/// Marginal cost of a task without committing anything, so a losing bid
/// leaves the planner untouched. `None` means no feasible insertion exists
/// and the cost is unbounded for bidding purposes.
pub trait CostEstimator {
    fn marginal_cost(&self, planner: &dyn Planner, task: &Task) -> Option<f64>;
}

/// Stateless adapter over `Planner::evaluate_insertion`.
pub struct MarginalCostEstimator;

impl CostEstimator for MarginalCostEstimator {
    fn marginal_cost(&self, planner: &dyn Planner, task: &Task) -> Option<f64> {
        planner
            .evaluate_insertion(task)
            .ok()
            .map(|candidate| candidate.marginal_cost)
    }
}
