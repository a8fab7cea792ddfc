use haul_planner::plan::RoutePlan;
use haul_planner::topology::{Edge, RoadNetwork, Topology};
use haul_structs::core::{Action, LocationId, Movement, Task, Vehicle};
use std::sync::Arc;

fn task(id: u32, pickup: usize, delivery: usize, weight: u32) -> Task {
    Task {
        id,
        pickup: LocationId(pickup),
        delivery: LocationId(delivery),
        weight,
        reward: 100,
    }
}

fn vehicle(id: usize, start: usize, capacity: u32, cost_per_km: u32) -> Vehicle {
    Vehicle {
        id,
        start: LocationId(start),
        capacity,
        cost_per_km,
    }
}

fn two_city_network() -> RoadNetwork {
    RoadNetwork::new(
        2,
        &[Edge {
            from: 0,
            to: 1,
            length: 10.0,
        }],
    )
    .unwrap()
}

#[test]
fn test_cost_single_task_route() {
    let network = two_city_network();
    let t = task(1, 0, 1, 3);
    let plan = RoutePlan::new(
        Arc::new(vec![vehicle(0, 0, 30, 5)]),
        vec![vec![Action::pickup(t), Action::delivery(t)]],
        &network,
    );

    // vehicle already at the pickup city, so only the delivery leg costs
    assert_eq!(plan.cost(), 50.0);
    assert_eq!(plan.cost(), plan.cost());
    plan.validate().unwrap();
}

#[test]
fn test_empty_plan_costs_nothing() {
    let plan = RoutePlan::empty(Arc::new(vec![vehicle(0, 0, 30, 5)]));
    assert_eq!(plan.cost(), 0.0);
    plan.validate().unwrap();
}

#[test]
fn test_movements_interleave_hops_and_events() {
    let network = two_city_network();
    let t = task(1, 0, 1, 3);
    let plan = RoutePlan::new(
        Arc::new(vec![vehicle(0, 0, 30, 5)]),
        vec![vec![Action::pickup(t), Action::delivery(t)]],
        &network,
    );

    let movements = plan.movements(&network);
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].start, LocationId(0));
    assert_eq!(
        movements[0].movements,
        vec![
            Movement::Pickup(1),
            Movement::Drive(LocationId(1)),
            Movement::Delivery(1),
        ]
    );
}

#[test]
fn test_movements_agree_with_cost_over_multi_hop_paths() {
    // chain 0 - 1 - 2 plus an expensive shortcut that must not be driven
    let network = RoadNetwork::new(
        3,
        &[
            Edge {
                from: 0,
                to: 1,
                length: 4.0,
            },
            Edge {
                from: 1,
                to: 2,
                length: 3.0,
            },
            Edge {
                from: 0,
                to: 2,
                length: 50.0,
            },
        ],
    )
    .unwrap();
    let t = task(1, 0, 2, 1);
    let v = vehicle(0, 1, 10, 2);
    let plan = RoutePlan::new(
        Arc::new(vec![v]),
        vec![vec![Action::pickup(t), Action::delivery(t)]],
        &network,
    );

    // 1 -> 0 (4) then 0 -> 1 -> 2 (7), times cost 2
    assert_eq!(plan.cost(), 22.0);

    let movements = &plan.movements(&network)[0];
    let mut current = movements.start;
    let mut driven = 0.0;
    for movement in &movements.movements {
        if let Movement::Drive(hop) = movement {
            driven += network.distance(current, *hop);
            current = *hop;
        }
    }
    assert_eq!(driven * v.cost_per_km as f64, plan.cost());
}

#[test]
fn test_clone_recomputes_identical_movements() {
    let network = two_city_network();
    let t = task(1, 0, 1, 3);
    let plan = RoutePlan::new(
        Arc::new(vec![vehicle(0, 0, 30, 5)]),
        vec![vec![Action::pickup(t), Action::delivery(t)]],
        &network,
    );
    let original = plan.movements(&network).to_vec();

    let cloned = plan.clone();
    assert_eq!(cloned.cost(), plan.cost());
    assert_eq!(cloned.movements(&network), &original[..]);
}

#[test]
fn test_validate_rejects_delivery_before_pickup() {
    let network = two_city_network();
    let t = task(1, 0, 1, 3);
    let plan = RoutePlan::new(
        Arc::new(vec![vehicle(0, 0, 30, 5)]),
        vec![vec![Action::delivery(t), Action::pickup(t)]],
        &network,
    );
    assert!(plan.validate().is_err());
}

#[test]
fn test_validate_rejects_capacity_overflow() {
    let network = two_city_network();
    let t1 = task(1, 0, 1, 8);
    let t2 = task(2, 0, 1, 5);
    let plan = RoutePlan::new(
        Arc::new(vec![vehicle(0, 0, 10, 5)]),
        vec![vec![
            Action::pickup(t1),
            Action::pickup(t2),
            Action::delivery(t1),
            Action::delivery(t2),
        ]],
        &network,
    );
    assert!(plan.validate().is_err());
}

#[test]
fn test_validate_rejects_task_on_two_vehicles() {
    let network = two_city_network();
    let t = task(1, 0, 1, 3);
    let route = vec![Action::pickup(t), Action::delivery(t)];
    let plan = RoutePlan::new(
        Arc::new(vec![vehicle(0, 0, 30, 5), vehicle(1, 1, 30, 5)]),
        vec![route.clone(), route],
        &network,
    );
    assert!(plan.validate().is_err());
}
