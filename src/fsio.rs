//! Filesystem collaborator seam.
//!
//! The resolver and planner only need existence checks and recursive glob
//! matching; putting those behind a trait lets tests run against an
//! in-memory tree.

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Read-only filesystem queries used during planning.
pub trait Filesystem {
    fn exists(&self, path: &Path) -> bool;

    /// All paths under `root` (recursively) whose file names match the
    /// shell-style `pattern`, in sorted order.
    fn glob_under(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>>;
}

/// The real filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct RealFilesystem;

impl Filesystem for RealFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn glob_under(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        // the root is a literal path, not pattern syntax; escape it so
        // bracketed or starred directory names still match
        let root = glob::Pattern::escape(&root.to_string_lossy());
        let full = format!("{root}/**/{pattern}");
        let mut matches: Vec<PathBuf> = glob::glob(&full)?.filter_map(|m| m.ok()).collect();
        // glob yields per-directory order; sort for stable plans.
        matches.sort();
        Ok(matches)
    }
}
