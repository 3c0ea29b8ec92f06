//! The linear branch-lifecycle state machine.

use crate::error::Result;
use crate::plan::{split_batches, DeletionPlan};
use crate::types::{BranchState, DeletionTarget, ReleaseBranch};
use crate::vcs::VersionControlClient;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Name of the branch every release branch is cut from.
pub const MAIN_BRANCH: &str = "main";

/// Default removal batch cap. Large enough to keep batch counts low, small
/// enough to stay under command-line length limits.
pub const DEFAULT_BATCH_CAP: usize = 5000;

/// Orchestrator configuration.
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// User-supplied release tag; branch and tag names derive from it.
    pub tag: String,

    /// Remote that branches and tags are pushed to.
    pub remote: String,

    /// Maximum paths per removal call.
    pub batch_cap: usize,
}

impl OrchestratorConfig {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            remote: "origin".to_string(),
            batch_cap: DEFAULT_BATCH_CAP,
        }
    }
}

/// What happened to one branch during a run.
#[derive(Clone, Debug, Serialize)]
pub struct BranchOutcome {
    pub branch: ReleaseBranch,
    pub name: String,
    pub state: BranchState,
    pub removed: usize,
    pub batches: usize,
}

/// Applies a deletion plan as a strict Warning → Artifact → Pass sequence.
///
/// Each branch is cut fresh from `main`, populated in batches, committed
/// only when something was actually removed, then tagged and pushed. All
/// collaborator calls share one working tree, so the sequence is strictly
/// serial; any failure aborts the whole run, leaving the tree on whatever
/// branch was active.
pub struct ReleaseOrchestrator<'a> {
    vcs: &'a dyn VersionControlClient,
    config: OrchestratorConfig,
}

impl<'a> ReleaseOrchestrator<'a> {
    pub fn new(vcs: &'a dyn VersionControlClient, config: OrchestratorConfig) -> Self {
        Self { vcs, config }
    }

    /// Run the full branch sequence for one derivative tree.
    pub fn run(&self, plan: &DeletionPlan) -> Result<Vec<BranchOutcome>> {
        let mut outcomes = Vec::with_capacity(ReleaseBranch::ALL.len());
        for branch in ReleaseBranch::ALL {
            outcomes.push(self.finalize_branch(branch, plan.for_branch(branch))?);
        }
        Ok(outcomes)
    }

    fn finalize_branch(
        &self,
        branch: ReleaseBranch,
        targets: &[DeletionTarget],
    ) -> Result<BranchOutcome> {
        let name = branch.branch_name(&self.config.tag);

        self.vcs.checkout(MAIN_BRANCH)?;
        self.vcs.checkout_new_branch(&name)?;
        let mut state = BranchState::Created;

        let batches = split_batches(targets, self.config.batch_cap);
        let mut removed = 0;
        if !targets.is_empty() {
            info!(
                branch = %name,
                targets = targets.len(),
                batches = batches.len(),
                "removing planned paths"
            );
            for batch in &batches {
                let paths: Vec<PathBuf> = batch.iter().map(|t| t.path.clone()).collect();
                self.vcs.remove(&paths, true)?;
                removed += paths.len();
            }
            advance(&mut state, BranchState::Populated, &name);
        }

        if removed > 0 {
            self.vcs.commit(branch.commit_message())?;
            advance(&mut state, BranchState::Committed, &name);
        } else {
            info!(branch = %name, "nothing removed, skipping commit");
        }

        // A release always gets its named point, commit or not.
        let release_tag = branch.release_tag(&self.config.tag);
        self.vcs.tag(&release_tag)?;
        advance(&mut state, BranchState::Tagged, &name);

        self.vcs.push(&self.config.remote, &name)?;
        self.vcs.push(&self.config.remote, &release_tag)?;
        advance(&mut state, BranchState::Pushed, &name);

        info!(branch = %name, removed, "branch finalized");
        Ok(BranchOutcome {
            branch,
            name,
            state,
            removed,
            batches: batches.len(),
        })
    }
}

/// Branch state only ever moves forward within a run.
fn advance(state: &mut BranchState, to: BranchState, name: &str) {
    debug_assert!(to > *state);
    debug!(branch = %name, from = ?state, to = ?to, "branch state");
    *state = to;
}
