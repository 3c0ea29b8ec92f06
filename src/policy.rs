//! Per-study naming policy.
//!
//! Each supported study encodes its sessions differently on disk. Instead of
//! repeating `if study == ...` at every resolution site, the differences
//! live in one declarative table consulted by the loader and the resolver.

use crate::types::Study;

/// How a study's subject/session identifiers map onto directory names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StudyNamingPolicy {
    pub study: Study,

    /// Whether structural directory names embed the session
    /// (`sub-X_ses-Y` vs a flat `sub-X`).
    pub session_stratified: bool,

    /// Sentinel session label for studies whose QC tables carry no usable
    /// session; applied uniformly to every record after load.
    pub fixed_session_label: Option<&'static str>,

    /// PNC collected multiple nominal sessions but stored derivatives in a
    /// flat per-subject layout anyway. A known data-collection artifact,
    /// not a general rule.
    pub flat_layout_exception: bool,
}

impl StudyNamingPolicy {
    /// Look up the policy for a study.
    pub fn for_study(study: Study) -> Self {
        match study {
            Study::Ccnp => Self {
                study,
                session_stratified: false,
                fixed_session_label: Some("1"),
                flat_layout_exception: false,
            },
            Study::Pnc => Self {
                study,
                session_stratified: false,
                fixed_session_label: Some("PNC1"),
                flat_layout_exception: true,
            },
            Study::Bhrc | Study::Nki | Study::Hbn => Self {
                study,
                session_stratified: true,
                fixed_session_label: None,
                flat_layout_exception: false,
            },
        }
    }

    /// True when structural directories omit the `_ses-` suffix.
    pub fn flat_structural_layout(&self) -> bool {
        !self.session_stratified || self.flat_layout_exception
    }
}
