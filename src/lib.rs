//! # QC Release
//!
//! Curates versioned releases of a neuroimaging derivatives dataset. QC
//! tables mark each subject/session (and each functional task/run/acq) as
//! Pass, Artifact, or Fail; this crate plans which directories and files
//! must be removed to produce two curated branches — one excluding QC
//! failures, one containing only QC passes — and applies the removals
//! through batched version-control operations.
//!
//! ## Core Concepts
//!
//! - **QC records**: normalized, validated rows from the structural and
//!   functional QC tables
//! - **Naming policy**: per-study rules for how sessions appear in
//!   directory names
//! - **Deletion plan**: deduplicated, order-stable per-branch removal lists
//! - **Release branches**: `warning-fail`, `complete-artifact`,
//!   `complete-pass`, each cut fresh from `main`, then committed, tagged,
//!   and pushed
//!
//! ## Example
//!
//! ```ignore
//! use qc_release::{
//!     DeletionPlanner, DerivativeTree, GitClient, OrchestratorConfig,
//!     PathResolver, QcTableLoader, RealFilesystem, ReleaseOrchestrator,
//!     Study, StudyNamingPolicy,
//! };
//!
//! let policy = StudyNamingPolicy::for_study(Study::Hbn);
//! let loader = QcTableLoader::new(policy);
//! let records = loader.load_structural(&table_path)?;
//!
//! let fs = RealFilesystem;
//! let resolver = PathResolver::new(policy, &anat_root, &bold_root, &fs);
//! let plan = DeletionPlanner::plan(&records, &resolver, DerivativeTree::Anatomical)?;
//!
//! let git = GitClient::new(&anat_root);
//! let orchestrator = ReleaseOrchestrator::new(&git, OrchestratorConfig::new("2024-05"));
//! orchestrator.run(&plan)?;
//! ```

pub mod error;
pub mod fsio;
pub mod plan;
pub mod policy;
pub mod qc;
pub mod release;
pub mod resolve;
pub mod types;
pub mod vcs;

// Re-exports
pub use error::{ReleaseError, Result};
pub use fsio::{Filesystem, RealFilesystem};
pub use plan::{split_batches, DeletionPlan, DeletionPlanner};
pub use policy::StudyNamingPolicy;
pub use qc::QcTableLoader;
pub use release::{
    BranchOutcome, OrchestratorConfig, ReleaseOrchestrator, DEFAULT_BATCH_CAP, MAIN_BRANCH,
};
pub use resolve::PathResolver;
pub use types::*;
pub use vcs::{CommandOutput, GitClient, VersionControlClient};
