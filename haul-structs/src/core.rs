use serde::{Deserialize, Serialize};

pub type AgentId = usize;
pub type TaskId = u32;

/// Opaque index into a topology. Distances and paths between locations come
/// from the topology oracle, never from the id itself.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocationId(pub usize);

/// A pickup-to-delivery request. Immutable; identity is `id` for the task's
/// lifetime.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub pickup: LocationId,
    pub delivery: LocationId,
    pub weight: u32,
    pub reward: u64,
}

/// One vehicle of an agent's fleet. Vehicles are fixed in number and only
/// move by executing a committed plan.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Vehicle {
    pub id: usize,
    pub start: LocationId,
    pub capacity: u32,
    pub cost_per_km: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Pickup,
    Delivery,
}

/// A typed route event bound to exactly one task.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Action {
    pub kind: ActionKind,
    pub task: Task,
}

impl Action {
    pub fn pickup(task: Task) -> Self {
        Self {
            kind: ActionKind::Pickup,
            task,
        }
    }

    pub fn delivery(task: Task) -> Self {
        Self {
            kind: ActionKind::Delivery,
            task,
        }
    }

    /// The location this action takes place at.
    pub fn target(&self) -> LocationId {
        match self.kind {
            ActionKind::Pickup => self.task.pickup,
            ActionKind::Delivery => self.task.delivery,
        }
    }
}

/// Ordered action sequence for one vehicle.
pub type VehicleRoute = Vec<Action>;

/// One step of an executable movement sequence.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Movement {
    Drive(LocationId),
    Pickup(TaskId),
    Delivery(TaskId),
}

/// Executable sequence for one vehicle: every drive step is a single hop on
/// the topology, interleaved with pickup/delivery events.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VehicleMovements {
    pub vehicle: usize,
    pub start: LocationId,
    pub movements: Vec<Movement>,
}

/// The result of one auction round as reported by the host: every agent's
/// bid, indexed by agent id, and the winning agent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub bids: Vec<u64>,
    pub winner: AgentId,
}

/// Per-agent auction bookkeeping, owned by the orchestrator and updated
/// exactly once per concluded round.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AuctionRecord {
    pub rounds_bid: usize,
    pub rounds_won: usize,
    pub total_reward: u64,
    pub history: Vec<RoundOutcome>,
}

impl AuctionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_round(&mut self, outcome: RoundOutcome, won: bool, accepted_bid: u64) {
        self.rounds_bid += 1;
        if won {
            self.rounds_won += 1;
            self.total_reward += accepted_bid;
        }
        self.history.push(outcome);
    }
}

/// End-of-sequence report. `profit` may be negative; it is reported as a
/// fact, nothing in the core reacts to it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlanReport {
    pub total_cost: f64,
    pub total_reward: u64,
    pub profit: f64,
}
