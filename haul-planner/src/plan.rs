use crate::topology::Topology;
use anyhow::{anyhow, Result};
use haul_structs::core::{
    Action, ActionKind, Movement, Vehicle, VehicleMovements, VehicleRoute,
};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// The full assignment of routes across all vehicles of one agent. Plans are
/// immutable; a commit replaces the whole plan rather than mutating it, so
/// both the cost and the movement sequence are computed once per instance
/// and never invalidated.
#[derive(Debug)]
pub struct RoutePlan {
    vehicles: Arc<Vec<Vehicle>>,
    routes: Vec<VehicleRoute>,
    cost: f64,
    movements: OnceLock<Vec<VehicleMovements>>,
}

impl Clone for RoutePlan {
    fn clone(&self) -> Self {
        // the movement cache is rebuilt on demand by the clone
        Self {
            vehicles: self.vehicles.clone(),
            routes: self.routes.clone(),
            cost: self.cost,
            movements: OnceLock::new(),
        }
    }
}

impl RoutePlan {
    /// Plan with every vehicle idle at its start location.
    pub fn empty(vehicles: Arc<Vec<Vehicle>>) -> Self {
        let routes = vec![Vec::new(); vehicles.len()];
        Self {
            vehicles,
            routes,
            cost: 0.0,
            movements: OnceLock::new(),
        }
    }

    pub fn new(
        vehicles: Arc<Vec<Vehicle>>,
        routes: Vec<VehicleRoute>,
        topology: &dyn Topology,
    ) -> Self {
        assert_eq!(
            vehicles.len(),
            routes.len(),
            "one route per vehicle, in vehicle order"
        );
        let cost = vehicles
            .iter()
            .zip(&routes)
            .map(|(vehicle, route)| route_cost(vehicle, route, topology))
            .sum();
        Self {
            vehicles,
            routes,
            cost,
            movements: OnceLock::new(),
        }
    }

    /// New plan over the same fleet with different routes.
    pub fn derive(&self, routes: Vec<VehicleRoute>, topology: &dyn Topology) -> Self {
        Self::new(self.vehicles.clone(), routes, topology)
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn routes(&self) -> &[VehicleRoute] {
        &self.routes
    }

    /// Total cost: per vehicle, distance along consecutive action locations
    /// starting from the vehicle's start, times its cost per km. Computed at
    /// construction; deterministic and non-negative.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Executable per-vehicle movement sequences, in vehicle order. Each
    /// drive step is one hop of the oracle path, so the total driven
    /// distance agrees exactly with `cost()`. Cached on first call.
    pub fn movements(&self, topology: &dyn Topology) -> &[VehicleMovements] {
        self.movements.get_or_init(|| {
            self.vehicles
                .iter()
                .zip(&self.routes)
                .map(|(vehicle, route)| route_movements(vehicle, route, topology))
                .collect()
        })
    }

    /// Checks the structural invariants: pickup before delivery, each task
    /// on exactly one vehicle, and the running load within capacity at every
    /// prefix.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<u32, usize> = HashMap::new();
        for (v, (vehicle, route)) in self.vehicles.iter().zip(&self.routes).enumerate() {
            let mut load = 0u32;
            let mut picked_up: Vec<u32> = Vec::new();
            for action in route {
                let task = &action.task;
                match action.kind {
                    ActionKind::Pickup => {
                        if let Some(&other) = seen.get(&task.id) {
                            return Err(anyhow!(
                                "Task {} is assigned to both vehicle {} and vehicle {}",
                                task.id,
                                other,
                                v
                            ));
                        }
                        seen.insert(task.id, v);
                        picked_up.push(task.id);
                        load += task.weight;
                        if load > vehicle.capacity {
                            return Err(anyhow!(
                                "Vehicle {} exceeds capacity {} with load {}",
                                v,
                                vehicle.capacity,
                                load
                            ));
                        }
                    }
                    ActionKind::Delivery => {
                        let Some(pos) = picked_up.iter().position(|&id| id == task.id) else {
                            return Err(anyhow!(
                                "Task {} is delivered by vehicle {} before being picked up",
                                task.id,
                                v
                            ));
                        };
                        picked_up.remove(pos);
                        load -= task.weight;
                    }
                }
            }
            if let Some(&id) = picked_up.first() {
                return Err(anyhow!(
                    "Task {} is picked up by vehicle {} but never delivered",
                    id,
                    v
                ));
            }
        }
        Ok(())
    }
}

pub fn route_cost(vehicle: &Vehicle, route: &[Action], topology: &dyn Topology) -> f64 {
    let mut current = vehicle.start;
    let mut distance = 0.0;
    for action in route {
        let target = action.target();
        distance += topology.distance(current, target);
        current = target;
    }
    distance * vehicle.cost_per_km as f64
}

fn route_movements(
    vehicle: &Vehicle,
    route: &[Action],
    topology: &dyn Topology,
) -> VehicleMovements {
    let mut movements = Vec::new();
    let mut current = vehicle.start;
    for action in route {
        let target = action.target();
        for hop in topology.path(current, target) {
            movements.push(Movement::Drive(hop));
        }
        movements.push(match action.kind {
            ActionKind::Pickup => Movement::Pickup(action.task.id),
            ActionKind::Delivery => Movement::Delivery(action.task.id),
        });
        current = target;
    }
    VehicleMovements {
        vehicle: vehicle.id,
        start: vehicle.start,
        movements,
    }
}
