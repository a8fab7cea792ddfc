pub mod bidder;
pub mod error;
pub mod strategy;
