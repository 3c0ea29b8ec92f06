//! QC record to filesystem path resolution.

mod paths;

pub use paths::PathResolver;
