pub mod error;
pub mod estimator;
pub mod plan;
pub mod planner;
pub mod topology;
