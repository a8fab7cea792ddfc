use haul_planner::error::PlanError;
use haul_structs::core::{AgentId, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuctionError {
    /// No committed-plan insertion satisfies capacity for the task. Surfaced
    /// to the bidding layer as the sentinel bid, never as a crash.
    Infeasible {
        task_id: TaskId,
    },
    /// A commit was attempted with a candidate not evaluated against the
    /// live plan. Programming-contract violation, fatal to the caller.
    InvalidCommit {
        expected_revision: u64,
        actual_revision: u64,
    },
    /// The host reported a winner or bid array inconsistent with the number
    /// of participating agents. No counters are updated from such a round.
    InconsistentOutcome {
        winner: AgentId,
        num_bids: usize,
        num_agents: usize,
    },
    /// `bid` was called while a round is still awaiting its outcome.
    RoundAlreadyOpen {
        task_id: TaskId,
    },
    /// `conclude_round` was called with no round open.
    NoOpenRound,
}

impl std::fmt::Display for AuctionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuctionError::Infeasible { task_id } => write!(
                f,
                "No feasible insertion for task '{}' in the current plan",
                task_id
            ),
            AuctionError::InvalidCommit {
                expected_revision,
                actual_revision,
            } => write!(
                f,
                "Candidate was built against plan revision '{}' but the current revision is '{}'",
                actual_revision, expected_revision
            ),
            AuctionError::InconsistentOutcome {
                winner,
                num_bids,
                num_agents,
            } => write!(
                f,
                "Host reported winner '{}' with '{}' bids for '{}' agents",
                winner, num_bids, num_agents
            ),
            AuctionError::RoundAlreadyOpen { task_id } => write!(
                f,
                "Round for task '{}' is still awaiting its outcome",
                task_id
            ),
            AuctionError::NoOpenRound => write!(f, "No round is awaiting an outcome"),
        }
    }
}

impl std::error::Error for AuctionError {}

impl From<PlanError> for AuctionError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::Infeasible { task_id } => AuctionError::Infeasible { task_id },
            PlanError::InvalidCommit {
                expected_revision,
                actual_revision,
            } => AuctionError::InvalidCommit {
                expected_revision,
                actual_revision,
            },
        }
    }
}

pub type AuctionResult<T> = std::result::Result<T, AuctionError>;
