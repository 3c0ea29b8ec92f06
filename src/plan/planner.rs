//! Builds the deduplicated per-branch removal lists.

use crate::error::Result;
use crate::resolve::PathResolver;
use crate::types::{
    DeletionTarget, Determination, DerivativeTree, QcRecord, ReleaseBranch, RemovalKind, Verdict,
};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::info;

/// Ordered, deduplicated removal lists for one derivative tree.
///
/// Identical inputs always produce an identical plan: targets appear in
/// first-seen record order, each path at most once per branch.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DeletionPlan {
    /// Never populated; the warning branch is finalized with nothing
    /// removed.
    pub warning: Vec<DeletionTarget>,

    /// QC-Fail structural directories plus, in the functional tree, every
    /// file matched by an excluded functional record.
    pub artifact: Vec<DeletionTarget>,

    /// QC-Artifact structural directories only.
    pub pass: Vec<DeletionTarget>,
}

impl DeletionPlan {
    pub fn for_branch(&self, branch: ReleaseBranch) -> &[DeletionTarget] {
        match branch {
            ReleaseBranch::Warning => &self.warning,
            ReleaseBranch::Artifact => &self.artifact,
            ReleaseBranch::Pass => &self.pass,
        }
    }

    pub fn total_targets(&self) -> usize {
        self.warning.len() + self.artifact.len() + self.pass.len()
    }
}

/// Accumulates targets for one branch with set semantics on the path.
struct BranchTargets {
    branch: ReleaseBranch,
    seen: HashSet<PathBuf>,
    targets: Vec<DeletionTarget>,
}

impl BranchTargets {
    fn new(branch: ReleaseBranch) -> Self {
        Self {
            branch,
            seen: HashSet::new(),
            targets: Vec::new(),
        }
    }

    fn push(&mut self, path: PathBuf, kind: RemovalKind) {
        if self.seen.insert(path.clone()) {
            self.targets.push(DeletionTarget {
                path,
                branch: self.branch,
                kind,
            });
        }
    }
}

/// Consumes resolved records and produces the per-branch plan.
pub struct DeletionPlanner;

impl DeletionPlanner {
    /// Plan the removals for one derivative tree.
    ///
    /// Structural verdicts are planned first, then functional exclusions,
    /// so a bold glob never schedules files inside a session directory the
    /// artifact branch is already removing whole.
    ///
    /// The pass branch removes only Artifact-flagged structural
    /// directories, never Fail directories or functional exclusions. That
    /// asymmetry deliberately replicates the established release layout:
    /// the pass branch is "artifact branch minus artifacts", with Fail
    /// sessions treated as already handled by the artifact release, so
    /// widening it here would change what published releases contain.
    pub fn plan(
        records: &[QcRecord],
        resolver: &PathResolver<'_>,
        tree: DerivativeTree,
    ) -> Result<DeletionPlan> {
        let mut artifact = BranchTargets::new(ReleaseBranch::Artifact);
        let mut pass = BranchTargets::new(ReleaseBranch::Pass);

        for record in records {
            if let Verdict::Structural(determination) = record.verdict {
                let branch_targets = match determination {
                    Determination::Fail => &mut artifact,
                    Determination::Artifact => &mut pass,
                    Determination::Pass => continue,
                };
                // In the functional tree a structural verdict removes the
                // CPAC session directory instead.
                let path = match tree {
                    DerivativeTree::Anatomical => resolver.structural_path(record),
                    DerivativeTree::Functional => resolver.functional_path(record),
                };
                if let Some(path) = resolver.existing_dir(path) {
                    branch_targets.push(path, RemovalKind::Directory);
                }
            }
        }

        if tree == DerivativeTree::Functional {
            for record in records {
                if !record.is_excluded_functional() {
                    continue;
                }
                // The whole session directory may already be scheduled via
                // a structural Fail; its files must not be removed twice.
                if artifact.seen.contains(&resolver.functional_path(record)) {
                    continue;
                }
                for path in resolver.bold_matches(record)? {
                    artifact.push(path, RemovalKind::GlobMatch);
                }
            }
        }

        let plan = DeletionPlan {
            warning: Vec::new(),
            artifact: artifact.targets,
            pass: pass.targets,
        };
        info!(
            ?tree,
            artifact = plan.artifact.len(),
            pass = plan.pass.len(),
            "deletion plan ready"
        );
        Ok(plan)
    }
}

/// Split a branch's targets into removal batches of at most `cap` paths.
///
/// The concatenation of the batches, in order, is exactly the input; the
/// number of batches is minimal for the cap. An over-long argument list is
/// the only reason batches exist at all.
pub fn split_batches(targets: &[DeletionTarget], cap: usize) -> Vec<&[DeletionTarget]> {
    let cap = cap.max(1);
    targets.chunks(cap).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReleaseBranch;
    use proptest::prelude::*;

    fn target(n: usize) -> DeletionTarget {
        DeletionTarget {
            path: PathBuf::from(format!("/data/sub-{n:04}")),
            branch: ReleaseBranch::Artifact,
            kind: RemovalKind::Directory,
        }
    }

    #[test]
    fn test_split_batches_exact_and_ragged() {
        let targets: Vec<_> = (0..10).map(target).collect();

        let batches = split_batches(&targets, 5);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 5));

        let batches = split_batches(&targets, 4);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2].len(), 2);
    }

    #[test]
    fn test_split_batches_empty() {
        assert!(split_batches(&[], 100).is_empty());
    }

    proptest! {
        #[test]
        fn prop_batch_splitting_law(n in 0usize..200, cap in 1usize..50) {
            let targets: Vec<_> = (0..n).map(target).collect();
            let batches = split_batches(&targets, cap);

            // concatenation reproduces the plan exactly
            let rejoined: Vec<_> = batches.iter().flat_map(|b| b.iter().cloned()).collect();
            prop_assert_eq!(&rejoined, &targets);

            // no batch exceeds the cap, and the count is minimal
            prop_assert!(batches.iter().all(|b| b.len() <= cap));
            prop_assert_eq!(batches.len(), n.div_ceil(cap));
        }
    }
}
