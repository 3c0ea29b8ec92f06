//! Core types for release curation.

use crate::error::{ReleaseError, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// The closed set of supported studies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, ValueEnum)]
pub enum Study {
    Ccnp,
    Bhrc,
    Nki,
    Hbn,
    Pnc,
}

impl Study {
    /// Study name as it appears in QC table filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            Study::Ccnp => "CCNP",
            Study::Bhrc => "BHRC",
            Study::Nki => "NKI",
            Study::Hbn => "HBN",
            Study::Pnc => "PNC",
        }
    }
}

impl fmt::Display for Study {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structural QC verdict for an anatomical scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Determination {
    Pass,
    Artifact,
    Fail,
}

impl Determination {
    /// Strict parse of a `qc_determination` cell.
    ///
    /// The verdict vocabulary is closed: anything else fails validation
    /// rather than silently shrinking a deletion set.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "Pass" => Ok(Determination::Pass),
            "Artifact" => Ok(Determination::Artifact),
            "Fail" => Ok(Determination::Fail),
            other => Err(ReleaseError::UnknownDetermination {
                value: other.to_string(),
            }),
        }
    }
}

/// QC outcome carried by a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// Anatomical scan verdict.
    Structural(Determination),

    /// Functional scan exclusion flag (`fmriExclude > 0`).
    Functional { excluded: bool },
}

/// One row of a loaded QC table, normalized and validated.
///
/// Identifier fields are opaque strings with their BIDS prefixes already
/// rejected at load time; `run` is kept exactly as read (never re-padded).
/// Records are created once per run and immutable thereafter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QcRecord {
    pub participant_id: String,
    pub session_id: String,
    pub verdict: Verdict,

    /// Functional entity labels; always `None` for structural records.
    pub task: Option<String>,
    pub acq: Option<String>,
    pub run: Option<String>,
}

impl QcRecord {
    /// Create a structural record.
    pub fn structural(
        participant_id: impl Into<String>,
        session_id: impl Into<String>,
        determination: Determination,
    ) -> Self {
        Self {
            participant_id: participant_id.into(),
            session_id: session_id.into(),
            verdict: Verdict::Structural(determination),
            task: None,
            acq: None,
            run: None,
        }
    }

    /// True when this is a functional record flagged for exclusion.
    pub fn is_excluded_functional(&self) -> bool {
        matches!(self.verdict, Verdict::Functional { excluded: true })
    }
}

/// Which derivative repository a plan is built for.
///
/// A structural verdict removes a FreeSurfer directory in the anatomical
/// tree but a CPAC session directory in the functional tree; bold glob
/// targets only exist in the functional tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DerivativeTree {
    Anatomical,
    Functional,
}

/// The release branches, in the order they are created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ReleaseBranch {
    /// No deletions; exists so every release has a named full-data point.
    Warning,

    /// Everything except QC failures.
    Artifact,

    /// QC passes only.
    Pass,
}

impl ReleaseBranch {
    /// Creation order: Warning, then Artifact, then Pass.
    pub const ALL: [ReleaseBranch; 3] = [
        ReleaseBranch::Warning,
        ReleaseBranch::Artifact,
        ReleaseBranch::Pass,
    ];

    /// Branch name for a given release tag.
    pub fn branch_name(&self, tag: &str) -> String {
        match self {
            ReleaseBranch::Warning => format!("warning-fail-{tag}"),
            ReleaseBranch::Artifact => format!("complete-artifact-{tag}"),
            ReleaseBranch::Pass => format!("complete-pass-{tag}"),
        }
    }

    /// Tag applied when the branch is finalized.
    pub fn release_tag(&self, tag: &str) -> String {
        format!("release-{}", self.branch_name(tag))
    }

    /// Commit message used when the branch's plan removed anything.
    pub fn commit_message(&self) -> &'static str {
        match self {
            ReleaseBranch::Warning => "update warning branch",
            ReleaseBranch::Artifact => "remove qc-fail sessions",
            ReleaseBranch::Pass => "remove qc-artifact sessions",
        }
    }
}

impl fmt::Display for ReleaseBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseBranch::Warning => "warning",
            ReleaseBranch::Artifact => "artifact",
            ReleaseBranch::Pass => "pass",
        };
        write!(f, "{name}")
    }
}

/// How a planned path was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RemovalKind {
    /// A whole subject/session directory.
    Directory,

    /// A file matched by a bold exclusion glob.
    GlobMatch,
}

/// One path scheduled for removal on one branch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeletionTarget {
    pub path: PathBuf,
    pub branch: ReleaseBranch,
    pub kind: RemovalKind,
}

/// Lifecycle of a release branch within a run.
///
/// Advances monotonically; a fatal command error freezes the branch at
/// whatever state it had reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum BranchState {
    Created,
    Populated,
    Committed,
    Tagged,
    Pushed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determination_parse() {
        assert_eq!(Determination::parse("Pass").unwrap(), Determination::Pass);
        assert_eq!(Determination::parse("Fail").unwrap(), Determination::Fail);
        assert!(matches!(
            Determination::parse("Borderline"),
            Err(ReleaseError::UnknownDetermination { .. })
        ));
    }

    #[test]
    fn test_branch_names() {
        let tag = "2024-05";
        assert_eq!(
            ReleaseBranch::Warning.branch_name(tag),
            "warning-fail-2024-05"
        );
        assert_eq!(
            ReleaseBranch::Artifact.branch_name(tag),
            "complete-artifact-2024-05"
        );
        assert_eq!(
            ReleaseBranch::Pass.release_tag(tag),
            "release-complete-pass-2024-05"
        );
    }

    #[test]
    fn test_branch_order() {
        assert!(ReleaseBranch::Warning < ReleaseBranch::Artifact);
        assert!(ReleaseBranch::Artifact < ReleaseBranch::Pass);
    }

    #[test]
    fn test_branch_state_monotonic() {
        assert!(BranchState::Created < BranchState::Populated);
        assert!(BranchState::Populated < BranchState::Committed);
        assert!(BranchState::Committed < BranchState::Tagged);
        assert!(BranchState::Tagged < BranchState::Pushed);
    }
}
