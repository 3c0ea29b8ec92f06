//! Version-control collaborator.
//!
//! The orchestrator only speaks this narrow interface; the real
//! implementation shells out to `git` against an explicit working
//! directory (the process never changes its own cwd).

use crate::error::{ReleaseError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Captured output of a successful external call.
#[derive(Clone, Debug, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Blocking version-control operations consumed by the orchestrator.
///
/// Every call either succeeds with captured output or fails fatally with
/// [`ReleaseError::CommandFailed`] carrying the output verbatim.
pub trait VersionControlClient {
    fn checkout(&self, reference: &str) -> Result<CommandOutput>;
    fn checkout_new_branch(&self, name: &str) -> Result<CommandOutput>;
    fn remove(&self, paths: &[PathBuf], recursive: bool) -> Result<CommandOutput>;
    fn commit(&self, message: &str) -> Result<CommandOutput>;
    fn tag(&self, name: &str) -> Result<CommandOutput>;
    fn push(&self, remote: &str, reference: &str) -> Result<CommandOutput>;
}

/// `git` client bound to one working tree.
#[derive(Clone, Debug)]
pub struct GitClient {
    work_dir: PathBuf,
}

impl GitClient {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        debug!(?args, work_dir = %self.work_dir.display(), "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .output()?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(ReleaseError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                stdout,
                stderr,
            });
        }
        Ok(CommandOutput { stdout, stderr })
    }
}

impl VersionControlClient for GitClient {
    fn checkout(&self, reference: &str) -> Result<CommandOutput> {
        self.run(&["checkout", reference])
    }

    fn checkout_new_branch(&self, name: &str) -> Result<CommandOutput> {
        self.run(&["checkout", "-b", name])
    }

    fn remove(&self, paths: &[PathBuf], recursive: bool) -> Result<CommandOutput> {
        let mut args: Vec<&str> = vec!["rm"];
        if recursive {
            args.push("-rf");
        } else {
            args.push("-f");
        }
        let rendered: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        args.extend(rendered.iter().map(String::as_str));
        self.run(&args)
    }

    fn commit(&self, message: &str) -> Result<CommandOutput> {
        self.run(&["commit", "-m", message])
    }

    fn tag(&self, name: &str) -> Result<CommandOutput> {
        self.run(&["tag", name])
    }

    fn push(&self, remote: &str, reference: &str) -> Result<CommandOutput> {
        self.run(&["push", remote, reference])
    }
}
