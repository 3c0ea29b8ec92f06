//! Loader for the tab-separated structural and functional QC tables.

use crate::error::{ReleaseError, Result};
use crate::policy::StudyNamingPolicy;
use crate::types::{Determination, QcRecord, Study, Verdict};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Raw structural row as written by the QC pipeline.
///
/// Identifier columns deserialize as strings so formatting such as leading
/// zeros survives. Extra columns in the table are ignored.
#[derive(Debug, Deserialize)]
struct StructuralRow {
    participant_id: String,
    #[serde(default)]
    session_id: Option<String>,
    qc_determination: String,
}

/// Raw functional row. `fmriExclude` is read as text and parsed leniently
/// because pandas-written tables encode missing values as empty cells or
/// `NaN`, which count as "not excluded".
#[derive(Debug, Deserialize)]
struct FunctionalRow {
    participant_id: String,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(rename = "fmriExclude", default)]
    fmri_exclude: Option<String>,
    #[serde(default)]
    task: Option<String>,
    #[serde(default)]
    acq: Option<String>,
    #[serde(default)]
    run: Option<String>,
}

/// Parses and validates QC tables into normalized [`QcRecord`] sequences.
pub struct QcTableLoader {
    policy: StudyNamingPolicy,
}

impl QcTableLoader {
    pub fn new(policy: StudyNamingPolicy) -> Self {
        Self { policy }
    }

    /// Conventional location of a study's structural QC table.
    pub fn structural_table_path(anat_root: &Path, study: Study) -> PathBuf {
        anat_root.join(format!("study-{study}_desc-T1_qc.tsv"))
    }

    /// Conventional location of a study's functional QC table.
    pub fn functional_table_path(bold_root: &Path, study: Study) -> PathBuf {
        bold_root
            .join("cpac_RBCv0")
            .join(format!("study-{study}_desc-functional_qc.tsv"))
    }

    /// Load the structural QC table.
    ///
    /// Every row becomes a record, Pass rows included; filtering by verdict
    /// is the planner's job.
    pub fn load_structural(&self, path: &Path) -> Result<Vec<QcRecord>> {
        let mut reader = tsv_reader(path)?;
        require_columns(
            &mut reader,
            "structural",
            &["participant_id", "qc_determination"],
        )?;
        if self.policy.fixed_session_label.is_none() {
            require_columns(&mut reader, "structural", &["session_id"])?;
        }

        let mut records = Vec::new();
        for row in reader.deserialize() {
            let row: StructuralRow = row?;
            reject_prefix("participant_id", &row.participant_id, "sub-")?;
            let session_id = self.resolve_session(row.session_id)?;
            let determination = Determination::parse(&row.qc_determination)?;
            records.push(QcRecord::structural(
                row.participant_id,
                session_id,
                determination,
            ));
        }

        info!(
            table = %path.display(),
            rows = records.len(),
            "loaded structural QC table"
        );
        Ok(records)
    }

    /// Load the functional QC table.
    ///
    /// `fmriExclude > 0` marks a scan as excluded; all rows are returned so
    /// the exclusion flag stays inspectable downstream.
    pub fn load_functional(&self, path: &Path) -> Result<Vec<QcRecord>> {
        let mut reader = tsv_reader(path)?;
        require_columns(
            &mut reader,
            "functional",
            &["participant_id", "fmriExclude"],
        )?;
        if self.policy.fixed_session_label.is_none() {
            require_columns(&mut reader, "functional", &["session_id"])?;
        }

        let mut records = Vec::new();
        for row in reader.deserialize() {
            let row: FunctionalRow = row?;
            reject_prefix("participant_id", &row.participant_id, "sub-")?;
            let session_id = self.resolve_session(row.session_id)?;

            let task = normalize_entity("task", row.task, "task-")?;
            let acq = normalize_entity("acq", row.acq, "acq-")?;
            let run = normalize_entity("run", row.run, "run-")?;

            let excluded = parse_exclusion(row.fmri_exclude.as_deref())?;

            records.push(QcRecord {
                participant_id: row.participant_id,
                session_id,
                verdict: Verdict::Functional { excluded },
                task,
                acq,
                run,
            });
        }

        info!(
            table = %path.display(),
            rows = records.len(),
            excluded = records.iter().filter(|r| r.is_excluded_functional()).count(),
            "loaded functional QC table"
        );
        Ok(records)
    }

    /// Validate the session read from the table, then apply the no-session
    /// override. A prefixed `session_id` is fatal even when the value is
    /// about to be replaced by the sentinel label; the sentinel itself is
    /// never read from the table.
    fn resolve_session(&self, from_table: Option<String>) -> Result<String> {
        if let Some(session) = from_table.as_deref() {
            reject_prefix("session_id", session, "ses-")?;
        }
        if let Some(label) = self.policy.fixed_session_label {
            return Ok(label.to_string());
        }
        Ok(from_table.unwrap_or_default())
    }
}

fn tsv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)?)
}

fn require_columns(
    reader: &mut csv::Reader<std::fs::File>,
    table: &'static str,
    columns: &[&'static str],
) -> Result<()> {
    let headers = reader.headers()?.clone();
    for column in columns {
        if !headers.iter().any(|h| h == *column) {
            return Err(ReleaseError::MissingColumn { table, column });
        }
    }
    Ok(())
}

fn reject_prefix(column: &'static str, value: &str, prefix: &str) -> Result<()> {
    if value.starts_with(prefix) {
        return Err(ReleaseError::PrefixedIdentifier {
            column,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Parse an `fmriExclude` cell. Missing values (empty cells or pandas NaN
/// spellings) count as "not excluded"; anything else must be numeric, with
/// scores over zero marking exclusion. A non-numeric value fails validation
/// rather than silently counting as "keep".
fn parse_exclusion(value: Option<&str>) -> Result<bool> {
    let trimmed = match value.map(str::trim) {
        None | Some("") => return Ok(false),
        Some(v) => v,
    };
    if trimmed.eq_ignore_ascii_case("nan") || trimmed.eq_ignore_ascii_case("na") {
        return Ok(false);
    }
    let score: f64 = trimmed
        .parse()
        .map_err(|_| ReleaseError::InvalidExclusionFlag {
            value: trimmed.to_string(),
        })?;
    Ok(score > 0.0)
}

/// Normalize an optional entity cell: trim, treat empty and pandas NaN
/// spellings as absent, reject BIDS-prefixed values.
fn normalize_entity(
    column: &'static str,
    value: Option<String>,
    prefix: &str,
) -> Result<Option<String>> {
    let value = match value {
        Some(v) => v,
        None => return Ok(None),
    };
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") || trimmed.eq_ignore_ascii_case("na")
    {
        return Ok(None);
    }
    reject_prefix(column, trimmed, prefix)?;
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_entity_absent_spellings() {
        for cell in ["", "  ", "NaN", "nan", "NA"] {
            assert_eq!(
                normalize_entity("run", Some(cell.to_string()), "run-").unwrap(),
                None
            );
        }
    }

    #[test]
    fn test_normalize_entity_keeps_leading_zeros() {
        let value = normalize_entity("run", Some("01".to_string()), "run-").unwrap();
        assert_eq!(value.as_deref(), Some("01"));
    }

    #[test]
    fn test_parse_exclusion_scores() {
        assert!(!parse_exclusion(None).unwrap());
        assert!(!parse_exclusion(Some("")).unwrap());
        assert!(!parse_exclusion(Some("NaN")).unwrap());
        assert!(!parse_exclusion(Some("0")).unwrap());
        assert!(parse_exclusion(Some("1")).unwrap());
        assert!(parse_exclusion(Some("2.5")).unwrap());
    }

    #[test]
    fn test_parse_exclusion_rejects_non_numeric() {
        assert!(matches!(
            parse_exclusion(Some("yes")),
            Err(ReleaseError::InvalidExclusionFlag { .. })
        ));
    }

    #[test]
    fn test_normalize_entity_rejects_prefix() {
        let result = normalize_entity("run", Some("run-1".to_string()), "run-");
        assert!(matches!(
            result,
            Err(ReleaseError::PrefixedIdentifier { column: "run", .. })
        ));
    }
}
