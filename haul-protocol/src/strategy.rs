use crate::bidder::BidStrategy;
use crate::error::{AuctionError, AuctionResult};
use haul_planner::estimator::CostEstimator;
use haul_planner::plan::RoutePlan;
use haul_planner::planner::Planner;
use haul_structs::core::{AgentId, AuctionRecord, PlanReport, RoundOutcome, Task};

enum Phase {
    Idle,
    AwaitingOutcome { task: Task },
}

/// Drives one agent through the round protocol: bid on the offered task,
/// observe the outcome, commit the task into the plan on a win, and finally
/// materialize the executable plan. One round is open at a time; the
/// external host orders the rounds.
pub struct AuctionStrategy {
    name: String,
    num_agents: usize,
    planner: Box<dyn Planner>,
    estimator: Box<dyn CostEstimator>,
    bidder: Box<dyn BidStrategy>,
    record: AuctionRecord,
    phase: Phase,
}

impl AuctionStrategy {
    pub fn new(
        name: impl Into<String>,
        num_agents: usize,
        planner: Box<dyn Planner>,
        estimator: Box<dyn CostEstimator>,
        bidder: Box<dyn BidStrategy>,
    ) -> Self {
        Self {
            name: name.into(),
            num_agents,
            planner,
            estimator,
            bidder,
            record: AuctionRecord::new(),
            phase: Phase::Idle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn agent_id(&self) -> AgentId {
        self.bidder.agent_id()
    }

    pub fn record(&self) -> &AuctionRecord {
        &self.record
    }

    /// Opens a round: estimates the marginal cost of `task` against the
    /// committed plan (no mutation) and returns the bid to submit. An
    /// infeasible task yields the sentinel bid.
    pub fn bid(&mut self, task: Task) -> AuctionResult<u64> {
        if let Phase::AwaitingOutcome { task: open } = &self.phase {
            return Err(AuctionError::RoundAlreadyOpen { task_id: open.id });
        }
        let marginal_cost = self.estimator.marginal_cost(self.planner.as_ref(), &task);
        let bid = self.bidder.compute_bid(marginal_cost);
        self.phase = Phase::AwaitingOutcome { task };
        Ok(bid)
    }

    /// Closes the open round with the host-reported outcome. On a win the
    /// task is committed into the plan and the accepted bid added to the
    /// reward; the round count increments either way. An outcome
    /// inconsistent with the participant count updates nothing and leaves
    /// the round open.
    pub fn conclude_round(&mut self, bids: &[u64], winner: AgentId) -> AuctionResult<()> {
        let task = match &self.phase {
            Phase::AwaitingOutcome { task } => *task,
            Phase::Idle => return Err(AuctionError::NoOpenRound),
        };
        let own_id = self.bidder.agent_id();
        if bids.len() != self.num_agents || winner >= bids.len() || own_id >= bids.len() {
            return Err(AuctionError::InconsistentOutcome {
                winner,
                num_bids: bids.len(),
                num_agents: self.num_agents,
            });
        }

        let won = winner == own_id;
        if won {
            // the plan is unchanged since the bid, so this re-evaluation
            // returns the same candidate the bid was priced on
            let candidate = self.planner.evaluate_insertion(&task)?;
            self.planner.commit(candidate)?;
        }

        let outcome = RoundOutcome {
            bids: bids.to_vec(),
            winner,
        };
        let accepted_bid = if won { bids[winner] } else { 0 };
        self.bidder.record_outcome(&outcome);
        self.record.record_round(outcome, won, accepted_bid);
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Host withdrew the open round (e.g. no agent could serve the task).
    /// Nothing is recorded; the strategy returns to idle.
    pub fn abandon_round(&mut self) {
        self.phase = Phase::Idle;
    }

    /// The live committed plan. Provisional until all rounds have concluded.
    pub fn current_plan(&self) -> &RoutePlan {
        self.planner.current_plan()
    }

    /// Terminal read-only report: final plan cost, cumulative reward, and
    /// profit = reward - cost. Valid mid-sequence but provisional until all
    /// rounds have concluded. A negative profit is reported, not corrected.
    pub fn generate_plans(&self) -> PlanReport {
        let total_cost = self.planner.current_plan().cost();
        let total_reward = self.record.total_reward;
        PlanReport {
            total_cost,
            total_reward,
            profit: total_reward as f64 - total_cost,
        }
    }
}
