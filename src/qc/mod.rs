//! QC table loading and validation.

mod loader;

pub use loader::QcTableLoader;
