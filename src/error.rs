//! Error types for release curation.

use thiserror::Error;

/// Main error type for release operations.
///
/// Validation problems and external command failures are both fatal: a
/// malformed QC table must stop the run before any branch is touched, and a
/// failed version-control call must stop it mid-flight. Missing paths and
/// unmatched globs are deliberately *not* errors; they are logged as
/// warnings (see `resolve`).
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("QC table error: {0}")]
    Table(#[from] csv::Error),

    #[error("{table} QC table is missing required column '{column}'")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("column '{column}' carries a BIDS prefix: {value:?}")]
    PrefixedIdentifier {
        column: &'static str,
        value: String,
    },

    #[error("unknown qc_determination value: {value:?}")]
    UnknownDetermination { value: String },

    #[error("non-numeric fmriExclude value: {value:?}")]
    InvalidExclusionFlag { value: String },

    #[error("invalid glob pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("command failed: {command}\nstdout: {stdout}\nstderr: {stderr}")]
    CommandFailed {
        command: String,
        stdout: String,
        stderr: String,
    },
}

/// Result type for release operations.
pub type Result<T> = std::result::Result<T, ReleaseError>;
