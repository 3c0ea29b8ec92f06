//! Path resolution under study naming conventions.

use crate::error::Result;
use crate::fsio::Filesystem;
use crate::policy::StudyNamingPolicy;
use crate::types::QcRecord;
use std::path::PathBuf;
use tracing::{debug, warn};

/// FreeSurfer derivatives live under this directory in the anatomical tree.
const STRUCTURAL_SUBDIR: &str = "freesurfer";

/// CPAC derivatives live under this directory in the functional tree.
const FUNCTIONAL_SUBDIR: &str = "cpac_RBCv0";

/// Maps QC records to concrete directories and glob patterns.
///
/// Path construction is pure: the same record always resolves to the same
/// path or pattern string. Existence checks are separate so planning can
/// drop already-absent directories with a warning instead of an error.
pub struct PathResolver<'a> {
    policy: StudyNamingPolicy,
    anat_root: PathBuf,
    bold_root: PathBuf,
    fs: &'a dyn Filesystem,
}

impl<'a> PathResolver<'a> {
    pub fn new(
        policy: StudyNamingPolicy,
        anat_root: impl Into<PathBuf>,
        bold_root: impl Into<PathBuf>,
        fs: &'a dyn Filesystem,
    ) -> Self {
        Self {
            policy,
            anat_root: anat_root.into(),
            bold_root: bold_root.into(),
            fs,
        }
    }

    /// Structural directory for a record:
    /// `«anat_root»/freesurfer/sub-«p»[_ses-«s»]`.
    ///
    /// The session suffix is omitted for session-less studies and for the
    /// flat-layout exception.
    pub fn structural_path(&self, record: &QcRecord) -> PathBuf {
        let dir = if self.policy.flat_structural_layout() {
            format!("sub-{}", record.participant_id)
        } else {
            format!("sub-{}_ses-{}", record.participant_id, record.session_id)
        };
        self.anat_root.join(STRUCTURAL_SUBDIR).join(dir)
    }

    /// Functional session directory for a record:
    /// `«bold_root»/cpac_RBCv0/sub-«p»/ses-«s»`.
    ///
    /// Always session-nested, independent of the structural layout
    /// exception; no-session studies contribute their sentinel label.
    pub fn functional_path(&self, record: &QcRecord) -> PathBuf {
        self.bold_root
            .join(FUNCTIONAL_SUBDIR)
            .join(format!("sub-{}", record.participant_id))
            .join(format!("ses-{}", record.session_id))
    }

    /// Keep a directory only if it exists on disk.
    ///
    /// A session may legitimately already be absent in one derivative tree
    /// while still present in the QC table, so absence is a warning, never
    /// an error.
    pub fn existing_dir(&self, path: PathBuf) -> Option<PathBuf> {
        if self.fs.exists(&path) {
            Some(path)
        } else {
            warn!(path = %path.display(), "missing directory, dropping from plan");
            None
        }
    }

    /// Glob pattern selecting a functional record's files.
    ///
    /// `*` progressively extended with `task-«t»*`, `acq-«a»*`, `run-«r»*`;
    /// absent or empty fields contribute nothing. The run number is used
    /// exactly as stored — never zero-padded. Padded filenames on disk show
    /// up as unmatched-glob warnings, which is the right signal for a
    /// data-format problem.
    pub fn bold_glob(record: &QcRecord) -> String {
        let mut pattern = String::from("*");
        for (entity, value) in [
            ("task", record.task.as_deref()),
            ("acq", record.acq.as_deref()),
            ("run", record.run.as_deref()),
        ] {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                pattern.push_str(&format!("{entity}-{value}*"));
            }
        }
        pattern
    }

    /// Files matched by a functional record's glob under its session
    /// directory, sorted.
    ///
    /// An absent session directory yields nothing quietly: the subject may
    /// already have been removed via structural QC. A present directory
    /// with zero matches is logged as a warning.
    pub fn bold_matches(&self, record: &QcRecord) -> Result<Vec<PathBuf>> {
        let base = self.functional_path(record);
        if !self.fs.exists(&base) {
            debug!(path = %base.display(), "functional dir absent, skipping glob");
            return Ok(Vec::new());
        }

        let pattern = Self::bold_glob(record);
        let matches = self.fs.glob_under(&base, &pattern)?;
        if matches.is_empty() {
            warn!(
                participant = %record.participant_id,
                session = %record.session_id,
                pattern = %pattern,
                "no files matched functional exclusion"
            );
        }
        Ok(matches)
    }
}
