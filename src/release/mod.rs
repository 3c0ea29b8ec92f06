//! Branch lifecycle orchestration.

mod orchestrator;

pub use orchestrator::{
    BranchOutcome, OrchestratorConfig, ReleaseOrchestrator, DEFAULT_BATCH_CAP, MAIN_BRANCH,
};
