use haul_structs::core::{AgentId, RoundOutcome};

/// Sentinel bid for tasks the agent cannot serve. Guaranteed to exceed any
/// rational competitor bid, so the agent never wins such a round.
pub const NO_BID: u64 = u64::MAX;

/// Turns a marginal cost plus the accumulated auction history into a bid.
/// `compute_bid` must be a deterministic function of the marginal cost and
/// the history only; an infeasible cost (`None`) maps to [`NO_BID`].
pub trait BidStrategy {
    fn agent_id(&self) -> AgentId;
    fn compute_bid(&self, marginal_cost: Option<f64>) -> u64;

    /// Called after every round, win or lose, so both inform future bids.
    fn record_outcome(&mut self, outcome: &RoundOutcome);
}

fn bid_with_margin(marginal_cost: Option<f64>, margin_percent: u32) -> u64 {
    match marginal_cost {
        Some(cost) => {
            let bid = cost.max(0.0) * (100 + margin_percent) as f64 / 100.0;
            bid.ceil() as u64
        }
        None => NO_BID,
    }
}

/// Bids exactly the marginal cost, rounded up. Never loses money on a won
/// round, never shades.
pub struct BreakEvenBidder {
    agent_id: AgentId,
}

impl BreakEvenBidder {
    pub fn new(agent_id: AgentId) -> Self {
        Self { agent_id }
    }
}

impl BidStrategy for BreakEvenBidder {
    fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    fn compute_bid(&self, marginal_cost: Option<f64>) -> u64 {
        bid_with_margin(marginal_cost, 0)
    }

    fn record_outcome(&mut self, _outcome: &RoundOutcome) {}
}

/// Fixed percentage markup over the marginal cost.
pub struct MarginBidder {
    agent_id: AgentId,
    margin_percent: u32,
}

impl MarginBidder {
    pub fn new(agent_id: AgentId, margin_percent: u32) -> Self {
        Self {
            agent_id,
            margin_percent,
        }
    }
}

impl BidStrategy for MarginBidder {
    fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    fn compute_bid(&self, marginal_cost: Option<f64>) -> u64 {
        bid_with_margin(marginal_cost, self.margin_percent)
    }

    fn record_outcome(&mut self, _outcome: &RoundOutcome) {}
}

/// History-aware markup: every lost round shades the margin down by one
/// step (never below the floor, so the bid stays at or above the configured
/// floor over cost), every won round raises it back. The margin is a pure
/// function of the outcomes seen so far.
pub struct AdaptiveBidder {
    agent_id: AgentId,
    margin_percent: u32,
    floor_percent: u32,
    step_percent: u32,
    history: Vec<RoundOutcome>,
}

impl AdaptiveBidder {
    pub fn new(
        agent_id: AgentId,
        start_margin_percent: u32,
        floor_percent: u32,
        step_percent: u32,
    ) -> Self {
        Self {
            agent_id,
            margin_percent: start_margin_percent.max(floor_percent),
            floor_percent,
            step_percent,
            history: Vec::new(),
        }
    }

    pub fn margin_percent(&self) -> u32 {
        self.margin_percent
    }

    pub fn history(&self) -> &[RoundOutcome] {
        &self.history
    }
}

impl BidStrategy for AdaptiveBidder {
    fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    fn compute_bid(&self, marginal_cost: Option<f64>) -> u64 {
        bid_with_margin(marginal_cost, self.margin_percent)
    }

    fn record_outcome(&mut self, outcome: &RoundOutcome) {
        if outcome.winner == self.agent_id {
            self.margin_percent += self.step_percent;
        } else {
            self.margin_percent = self
                .margin_percent
                .saturating_sub(self.step_percent)
                .max(self.floor_percent);
        }
        self.history.push(outcome.clone());
    }
}
