//! Per-branch deletion planning.

mod planner;

pub use planner::{split_batches, DeletionPlan, DeletionPlanner};
