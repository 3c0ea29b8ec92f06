//! Deletion planning tests against a real on-disk tree.

use qc_release::{
    DeletionPlanner, Determination, DerivativeTree, PathResolver, QcRecord, RealFilesystem,
    ReleaseBranch, RemovalKind, Study, StudyNamingPolicy, Verdict,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn make_structural_dir(anat: &Path, name: &str) {
    std::fs::create_dir_all(anat.join("freesurfer").join(name)).unwrap();
}

fn make_functional_session(bold: &Path, participant: &str, session: &str, files: &[&str]) {
    let session_dir = bold
        .join("cpac_RBCv0")
        .join(format!("sub-{participant}"))
        .join(format!("ses-{session}"))
        .join("func");
    std::fs::create_dir_all(&session_dir).unwrap();
    for file in files {
        std::fs::write(session_dir.join(file), b"").unwrap();
    }
}

fn functional_excluded(participant: &str, session: &str, task: &str, run: &str) -> QcRecord {
    QcRecord {
        participant_id: participant.to_string(),
        session_id: session.to_string(),
        verdict: Verdict::Functional { excluded: true },
        task: Some(task.to_string()),
        acq: None,
        run: Some(run.to_string()),
    }
}

struct Fixture {
    _dir: TempDir,
    anat: PathBuf,
    bold: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let anat = dir.path().join("anat");
        let bold = dir.path().join("bold");
        std::fs::create_dir_all(&anat).unwrap();
        std::fs::create_dir_all(&bold).unwrap();
        Self {
            _dir: dir,
            anat,
            bold,
        }
    }

    fn resolver<'a>(&self, study: Study, fs: &'a RealFilesystem) -> PathResolver<'a> {
        PathResolver::new(StudyNamingPolicy::for_study(study), &self.anat, &self.bold, fs)
    }
}

#[test]
fn test_fail_in_artifact_plan_artifact_in_pass_plan() {
    let fx = Fixture::new();
    make_structural_dir(&fx.anat, "sub-0001_ses-1");
    make_structural_dir(&fx.anat, "sub-0002_ses-1");
    make_structural_dir(&fx.anat, "sub-0003_ses-1");

    let records = vec![
        QcRecord::structural("0001", "1", Determination::Fail),
        QcRecord::structural("0002", "1", Determination::Artifact),
        QcRecord::structural("0003", "1", Determination::Pass),
    ];

    let fs = RealFilesystem;
    let resolver = fx.resolver(Study::Hbn, &fs);
    let plan = DeletionPlanner::plan(&records, &resolver, DerivativeTree::Anatomical).unwrap();

    assert_eq!(plan.artifact.len(), 1);
    assert!(plan.artifact[0].path.ends_with("freesurfer/sub-0001_ses-1"));
    assert_eq!(plan.artifact[0].branch, ReleaseBranch::Artifact);
    assert_eq!(plan.artifact[0].kind, RemovalKind::Directory);

    assert_eq!(plan.pass.len(), 1);
    assert!(plan.pass[0].path.ends_with("freesurfer/sub-0002_ses-1"));

    // never in both, Pass rows in neither
    assert_ne!(plan.artifact[0].path, plan.pass[0].path);
    assert!(plan.warning.is_empty());
}

#[test]
fn test_missing_directory_dropped_not_fatal() {
    let fx = Fixture::new();
    // no directories created at all

    let records = vec![QcRecord::structural("0001", "1", Determination::Fail)];
    let fs = RealFilesystem;
    let resolver = fx.resolver(Study::Hbn, &fs);
    let plan = DeletionPlanner::plan(&records, &resolver, DerivativeTree::Anatomical).unwrap();

    assert!(plan.artifact.is_empty());
}

#[test]
fn test_duplicate_records_deduplicated() {
    let fx = Fixture::new();
    make_structural_dir(&fx.anat, "sub-0001_ses-1");

    let records = vec![
        QcRecord::structural("0001", "1", Determination::Fail),
        QcRecord::structural("0001", "1", Determination::Fail),
    ];
    let fs = RealFilesystem;
    let resolver = fx.resolver(Study::Hbn, &fs);
    let plan = DeletionPlanner::plan(&records, &resolver, DerivativeTree::Anatomical).unwrap();

    assert_eq!(plan.artifact.len(), 1);
}

#[test]
fn test_no_session_study_flat_structural_dir() {
    let fx = Fixture::new();
    make_structural_dir(&fx.anat, "sub-0001");

    let records = vec![QcRecord::structural("0001", "1", Determination::Fail)];
    let fs = RealFilesystem;
    let resolver = fx.resolver(Study::Ccnp, &fs);
    let plan = DeletionPlanner::plan(&records, &resolver, DerivativeTree::Anatomical).unwrap();

    assert_eq!(plan.artifact.len(), 1);
    assert!(plan.artifact[0].path.ends_with("freesurfer/sub-0001"));
}

#[test]
fn test_functional_exclusion_globs_matching_files() {
    let fx = Fixture::new();
    make_functional_session(
        &fx.bold,
        "0002",
        "1",
        &[
            "sub-0002_ses-1_task-rest_run-1_bold.nii.gz",
            "sub-0002_ses-1_task-rest_run-1_desc-confounds_timeseries.tsv",
            "sub-0002_ses-1_task-rest_run-2_bold.nii.gz",
            "sub-0002_ses-1_task-nback_run-1_bold.nii.gz",
        ],
    );

    let records = vec![functional_excluded("0002", "1", "rest", "1")];
    let fs = RealFilesystem;
    let resolver = fx.resolver(Study::Hbn, &fs);
    let plan = DeletionPlanner::plan(&records, &resolver, DerivativeTree::Functional).unwrap();

    let names: Vec<String> = plan
        .artifact
        .iter()
        .map(|t| t.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "sub-0002_ses-1_task-rest_run-1_bold.nii.gz",
            "sub-0002_ses-1_task-rest_run-1_desc-confounds_timeseries.tsv",
        ]
    );
    assert!(plan
        .artifact
        .iter()
        .all(|t| t.kind == RemovalKind::GlobMatch));
}

#[test]
fn test_functional_glob_scoped_to_session() {
    let fx = Fixture::new();
    make_functional_session(&fx.bold, "0002", "1", &["sub-0002_ses-1_task-rest_bold.nii.gz"]);
    make_functional_session(&fx.bold, "0002", "2", &["sub-0002_ses-2_task-rest_bold.nii.gz"]);

    let records = vec![functional_excluded("0002", "1", "rest", "")];
    let fs = RealFilesystem;
    let resolver = fx.resolver(Study::Hbn, &fs);
    let plan = DeletionPlanner::plan(&records, &resolver, DerivativeTree::Functional).unwrap();

    assert_eq!(plan.artifact.len(), 1);
    assert!(plan.artifact[0]
        .path
        .to_string_lossy()
        .contains("ses-1"));
}

#[test]
fn test_unmatched_glob_not_fatal() {
    let fx = Fixture::new();
    make_functional_session(&fx.bold, "0002", "1", &["sub-0002_ses-1_task-nback_bold.nii.gz"]);

    let records = vec![functional_excluded("0002", "1", "rest", "1")];
    let fs = RealFilesystem;
    let resolver = fx.resolver(Study::Hbn, &fs);
    let plan = DeletionPlanner::plan(&records, &resolver, DerivativeTree::Functional).unwrap();

    assert!(plan.artifact.is_empty());
}

#[test]
fn test_structural_fail_in_functional_tree_removes_session_dir() {
    let fx = Fixture::new();
    make_functional_session(&fx.bold, "0001", "1", &["sub-0001_ses-1_task-rest_bold.nii.gz"]);

    let records = vec![
        QcRecord::structural("0001", "1", Determination::Fail),
        // same session also has a bold exclusion; its files are already
        // covered by the directory removal
        functional_excluded("0001", "1", "rest", ""),
    ];
    let fs = RealFilesystem;
    let resolver = fx.resolver(Study::Hbn, &fs);
    let plan = DeletionPlanner::plan(&records, &resolver, DerivativeTree::Functional).unwrap();

    assert_eq!(plan.artifact.len(), 1);
    assert!(plan.artifact[0].path.ends_with("cpac_RBCv0/sub-0001/ses-1"));
    assert_eq!(plan.artifact[0].kind, RemovalKind::Directory);
}

#[test]
fn test_functional_records_ignored_in_anatomical_tree() {
    let fx = Fixture::new();
    make_functional_session(&fx.bold, "0002", "1", &["sub-0002_ses-1_task-rest_bold.nii.gz"]);

    let records = vec![functional_excluded("0002", "1", "rest", "")];
    let fs = RealFilesystem;
    let resolver = fx.resolver(Study::Hbn, &fs);
    let plan = DeletionPlanner::plan(&records, &resolver, DerivativeTree::Anatomical).unwrap();

    assert!(plan.artifact.is_empty());
    assert!(plan.pass.is_empty());
}

#[test]
fn test_plan_is_deterministic() {
    let fx = Fixture::new();
    make_structural_dir(&fx.anat, "sub-0001_ses-1");
    make_structural_dir(&fx.anat, "sub-0002_ses-1");
    make_functional_session(&fx.bold, "0003", "1", &["sub-0003_ses-1_task-rest_bold.nii.gz"]);

    let records = vec![
        QcRecord::structural("0001", "1", Determination::Fail),
        QcRecord::structural("0002", "1", Determination::Artifact),
        functional_excluded("0003", "1", "rest", ""),
    ];
    let fs = RealFilesystem;
    let resolver = fx.resolver(Study::Hbn, &fs);

    for tree in [DerivativeTree::Anatomical, DerivativeTree::Functional] {
        let first = DeletionPlanner::plan(&records, &resolver, tree).unwrap();
        let second = DeletionPlanner::plan(&records, &resolver, tree).unwrap();
        assert_eq!(first.artifact, second.artifact);
        assert_eq!(first.pass, second.pass);
    }
}
