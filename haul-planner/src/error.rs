use haul_structs::core::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    Infeasible {
        task_id: TaskId,
    },
    InvalidCommit {
        expected_revision: u64,
        actual_revision: u64,
    },
}

impl std::fmt::Display for PlanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanError::Infeasible { task_id } => write!(
                f,
                "No feasible insertion for task '{}' in the current plan",
                task_id
            ),
            PlanError::InvalidCommit {
                expected_revision,
                actual_revision,
            } => write!(
                f,
                "Candidate was built against plan revision '{}' but the current revision is '{}'",
                actual_revision, expected_revision
            ),
        }
    }
}

impl std::error::Error for PlanError {}

pub type PlanResult<T> = std::result::Result<T, PlanError>;
