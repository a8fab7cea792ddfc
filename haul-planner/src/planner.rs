use crate::error::{PlanError, PlanResult};
use crate::plan::{route_cost, RoutePlan};
use crate::topology::Topology;
use haul_structs::core::{Action, ActionKind, Task, Vehicle, VehicleRoute};
use std::sync::Arc;

/// A feasible insertion of one task into the current plan, ready to commit.
/// `revision` ties the candidate to the plan it was evaluated against.
#[derive(Debug, Clone)]
pub struct InsertionCandidate {
    pub task: Task,
    pub vehicle: usize,
    pub pickup_index: usize,
    pub delivery_index: usize,
    pub marginal_cost: f64,
    pub plan: RoutePlan,
    pub(crate) revision: u64,
}

impl InsertionCandidate {
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Owns the agent's committed route plan. `evaluate_insertion` is read-only;
/// only `commit` replaces the plan, and only with a candidate evaluated
/// against the live plan.
pub trait Planner {
    fn evaluate_insertion(&self, task: &Task) -> PlanResult<InsertionCandidate>;
    fn commit(&mut self, candidate: InsertionCandidate) -> PlanResult<()>;
    fn current_plan(&self) -> &RoutePlan;
}

/// Best-insertion planner: enumerates every vehicle and every
/// pickup/delivery index pair, keeps capacity-feasible candidates, and
/// returns the cheapest. Ties break by lowest vehicle index, then pickup
/// index, then delivery index, so repeated evaluation against the same plan
/// returns the identical candidate.
pub struct GreedyInsertionPlanner {
    topology: Arc<dyn Topology>,
    plan: RoutePlan,
    revision: u64,
}

impl GreedyInsertionPlanner {
    pub fn new(vehicles: Vec<Vehicle>, topology: Arc<dyn Topology>) -> Self {
        let plan = RoutePlan::empty(Arc::new(vehicles));
        Self {
            topology,
            plan,
            revision: 0,
        }
    }

    pub fn topology(&self) -> Arc<dyn Topology> {
        self.topology.clone()
    }
}

impl Planner for GreedyInsertionPlanner {
    fn evaluate_insertion(&self, task: &Task) -> PlanResult<InsertionCandidate> {
        let mut best: Option<(usize, usize, usize, f64)> = None;

        for (v, route) in self.plan.routes().iter().enumerate() {
            let vehicle = &self.plan.vehicles()[v];
            if task.weight > vehicle.capacity {
                continue;
            }
            let base_cost = route_cost(vehicle, route, &*self.topology);

            for pickup_index in 0..=route.len() {
                for delivery_index in pickup_index..=route.len() {
                    let candidate = insert_task(route, task, pickup_index, delivery_index);
                    if !within_capacity(vehicle, &candidate) {
                        continue;
                    }
                    let marginal = route_cost(vehicle, &candidate, &*self.topology) - base_cost;
                    // strict < keeps the first minimum in iteration order
                    if best.is_none_or(|(_, _, _, m)| marginal < m) {
                        best = Some((v, pickup_index, delivery_index, marginal));
                    }
                }
            }
        }

        let (vehicle, pickup_index, delivery_index, marginal_cost) =
            best.ok_or(PlanError::Infeasible { task_id: task.id })?;

        let mut routes = self.plan.routes().to_vec();
        routes[vehicle] = insert_task(&routes[vehicle], task, pickup_index, delivery_index);
        let plan = self.plan.derive(routes, &*self.topology);

        Ok(InsertionCandidate {
            task: *task,
            vehicle,
            pickup_index,
            delivery_index,
            marginal_cost,
            plan,
            revision: self.revision,
        })
    }

    fn commit(&mut self, candidate: InsertionCandidate) -> PlanResult<()> {
        if candidate.revision != self.revision {
            return Err(PlanError::InvalidCommit {
                expected_revision: self.revision,
                actual_revision: candidate.revision,
            });
        }
        self.plan = candidate.plan;
        self.revision += 1;
        Ok(())
    }

    fn current_plan(&self) -> &RoutePlan {
        &self.plan
    }
}

/// Route with `Pickup(task)` at `pickup_index` and `Delivery(task)` at
/// `delivery_index`, both indices counted over the original route. When the
/// indices are equal the delivery immediately follows the pickup.
fn insert_task(
    route: &[Action],
    task: &Task,
    pickup_index: usize,
    delivery_index: usize,
) -> VehicleRoute {
    let mut result = Vec::with_capacity(route.len() + 2);
    for i in 0..=route.len() {
        if i == pickup_index {
            result.push(Action::pickup(*task));
        }
        if i == delivery_index {
            result.push(Action::delivery(*task));
        }
        if i < route.len() {
            result.push(route[i]);
        }
    }
    result
}

fn within_capacity(vehicle: &Vehicle, route: &[Action]) -> bool {
    let mut load = 0u32;
    for action in route {
        match action.kind {
            ActionKind::Pickup => {
                load += action.task.weight;
                if load > vehicle.capacity {
                    return false;
                }
            }
            ActionKind::Delivery => load -= action.task.weight,
        }
    }
    true
}
