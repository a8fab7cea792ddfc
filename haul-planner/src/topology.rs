use anyhow::{anyhow, Result};
use haul_structs::core::LocationId;
use serde::{Deserialize, Serialize};

/// Distance and path oracle between locations. Both views must agree: the
/// hops returned by `path` must sum to exactly the value `distance` reports
/// for the same pair of endpoints.
pub trait Topology: Send + Sync {
    fn num_locations(&self) -> usize;

    /// Shortest travel distance. Non-negative and deterministic for a fixed
    /// pair of endpoints.
    fn distance(&self, from: LocationId, to: LocationId) -> f64;

    /// Locations visited travelling from `from` to `to`, excluding `from`
    /// and including `to`. Empty when `from == to`.
    fn path(&self, from: LocationId, to: LocationId) -> Vec<LocationId>;
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub length: f64,
}

/// Concrete topology over a weighted undirected road graph. All-pairs
/// shortest paths are precomputed with a successor matrix, so `path`
/// reconstructs hop for hop the route whose length `distance` reports.
#[derive(Debug, Clone)]
pub struct RoadNetwork {
    num_locations: usize,
    dist: Vec<Vec<f64>>,
    next: Vec<Vec<usize>>,
}

impl RoadNetwork {
    pub fn new(num_locations: usize, edges: &[Edge]) -> Result<Self> {
        if num_locations == 0 {
            return Err(anyhow!("Topology must have at least one location"));
        }

        let mut dist = vec![vec![f64::INFINITY; num_locations]; num_locations];
        let mut next = vec![vec![usize::MAX; num_locations]; num_locations];
        for i in 0..num_locations {
            dist[i][i] = 0.0;
            next[i][i] = i;
        }

        for edge in edges {
            if edge.from >= num_locations || edge.to >= num_locations {
                return Err(anyhow!(
                    "Edge ({}, {}) references a location outside 0..{}",
                    edge.from,
                    edge.to,
                    num_locations
                ));
            }
            if edge.length < 0.0 {
                return Err(anyhow!(
                    "Edge ({}, {}) has negative length {}",
                    edge.from,
                    edge.to,
                    edge.length
                ));
            }
            // keep the shortest of parallel edges
            if edge.length < dist[edge.from][edge.to] {
                dist[edge.from][edge.to] = edge.length;
                dist[edge.to][edge.from] = edge.length;
                next[edge.from][edge.to] = edge.to;
                next[edge.to][edge.from] = edge.from;
            }
        }

        // Floyd-Warshall; strict improvement keeps the successor choice
        // deterministic for a fixed edge order
        for k in 0..num_locations {
            for i in 0..num_locations {
                for j in 0..num_locations {
                    let through = dist[i][k] + dist[k][j];
                    if through < dist[i][j] {
                        dist[i][j] = through;
                        next[i][j] = next[i][k];
                    }
                }
            }
        }

        for i in 0..num_locations {
            for j in 0..num_locations {
                if dist[i][j].is_infinite() {
                    return Err(anyhow!(
                        "Locations {} and {} are not connected",
                        i,
                        j
                    ));
                }
            }
        }

        Ok(Self {
            num_locations,
            dist,
            next,
        })
    }

    /// Complete Euclidean graph over coordinate positions; every pair is a
    /// single hop.
    pub fn fully_connected(positions: &[(f64, f64)]) -> Result<Self> {
        let edges: Vec<Edge> = (0..positions.len())
            .flat_map(|i| {
                (i + 1..positions.len()).map(move |j| {
                    let dx = positions[i].0 - positions[j].0;
                    let dy = positions[i].1 - positions[j].1;
                    Edge {
                        from: i,
                        to: j,
                        length: dx.hypot(dy),
                    }
                })
            })
            .collect();
        Self::new(positions.len(), &edges)
    }
}

impl Topology for RoadNetwork {
    fn num_locations(&self) -> usize {
        self.num_locations
    }

    fn distance(&self, from: LocationId, to: LocationId) -> f64 {
        self.dist[from.0][to.0]
    }

    fn path(&self, from: LocationId, to: LocationId) -> Vec<LocationId> {
        let mut path = Vec::new();
        let mut current = from.0;
        while current != to.0 {
            current = self.next[current][to.0];
            path.push(LocationId(current));
        }
        path
    }
}
