use haul_planner::topology::{Edge, RoadNetwork, Topology};
use haul_structs::core::LocationId;

fn edge(from: usize, to: usize, length: f64) -> Edge {
    Edge { from, to, length }
}

#[test]
fn test_shortest_path_prefers_indirect_route() {
    let network = RoadNetwork::new(
        3,
        &[edge(0, 1, 10.0), edge(1, 2, 10.0), edge(0, 2, 50.0)],
    )
    .unwrap();

    assert_eq!(network.distance(LocationId(0), LocationId(2)), 20.0);
    assert_eq!(
        network.path(LocationId(0), LocationId(2)),
        vec![LocationId(1), LocationId(2)]
    );
    assert_eq!(network.path(LocationId(0), LocationId(0)), vec![]);
}

#[test]
fn test_path_hops_sum_to_distance() {
    let network = RoadNetwork::new(
        5,
        &[
            edge(0, 1, 4.0),
            edge(1, 2, 3.0),
            edge(2, 3, 2.0),
            edge(3, 4, 6.0),
            edge(0, 4, 20.0),
            edge(1, 3, 7.0),
        ],
    )
    .unwrap();

    for from in 0..5 {
        for to in 0..5 {
            let from = LocationId(from);
            let to = LocationId(to);
            let mut current = from;
            let mut total = 0.0;
            for hop in network.path(from, to) {
                total += network.distance(current, hop);
                current = hop;
            }
            assert_eq!(current, to);
            assert_eq!(total, network.distance(from, to));
        }
    }
}

#[test]
fn test_fully_connected_is_euclidean() {
    let network = RoadNetwork::fully_connected(&[(0.0, 0.0), (3.0, 4.0)]).unwrap();

    assert_eq!(network.distance(LocationId(0), LocationId(1)), 5.0);
    assert_eq!(
        network.path(LocationId(0), LocationId(1)),
        vec![LocationId(1)]
    );
}

#[test]
fn test_parallel_edges_keep_shortest() {
    let network = RoadNetwork::new(2, &[edge(0, 1, 9.0), edge(0, 1, 4.0)]).unwrap();
    assert_eq!(network.distance(LocationId(0), LocationId(1)), 4.0);
}

#[test]
fn test_invalid_networks_are_rejected() {
    assert!(RoadNetwork::new(2, &[edge(0, 5, 1.0)]).is_err());
    assert!(RoadNetwork::new(2, &[edge(0, 1, -1.0)]).is_err());
    // 2 is unreachable
    assert!(RoadNetwork::new(3, &[edge(0, 1, 1.0)]).is_err());
    assert!(RoadNetwork::new(0, &[]).is_err());
}
