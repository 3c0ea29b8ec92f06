//! CLI entry point: cut curated release branches for one study.

use anyhow::{Context, Result};
use clap::Parser;
use qc_release::{
    DeletionPlan, DeletionPlanner, DerivativeTree, GitClient, OrchestratorConfig, PathResolver,
    QcTableLoader, RealFilesystem, ReleaseOrchestrator, Study, StudyNamingPolicy,
    DEFAULT_BATCH_CAP,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "qc-release",
    about = "Cut curated release branches of a derivatives dataset from QC tables"
)]
struct Cli {
    /// Which study to cut a release for
    #[arg(value_enum)]
    study: Study,

    /// Path to the study's FreeSurfer derivative dataset
    freesurfer_dir: PathBuf,

    /// Path to the study's CPAC derivative dataset
    bold_dir: PathBuf,

    /// Tag for the versioned branches
    tag: String,

    /// Remote to push branches and tags to
    #[arg(long, default_value = "origin")]
    remote: String,

    /// Maximum paths per removal call
    #[arg(long, default_value_t = DEFAULT_BATCH_CAP)]
    batch_size: usize,

    /// Print the per-tree deletion plans as JSON and exit without touching
    /// the repositories
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct PlanSummary<'a> {
    study: Study,
    tag: &'a str,
    anatomical: &'a DeletionPlan,
    functional: &'a DeletionPlan,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let policy = StudyNamingPolicy::for_study(cli.study);
    let loader = QcTableLoader::new(policy);

    let structural_table = QcTableLoader::structural_table_path(&cli.freesurfer_dir, cli.study);
    let functional_table = QcTableLoader::functional_table_path(&cli.bold_dir, cli.study);

    let mut records = loader
        .load_structural(&structural_table)
        .with_context(|| format!("loading {}", structural_table.display()))?;
    records.extend(
        loader
            .load_functional(&functional_table)
            .with_context(|| format!("loading {}", functional_table.display()))?,
    );

    let fs = RealFilesystem;
    let resolver = PathResolver::new(policy, &cli.freesurfer_dir, &cli.bold_dir, &fs);

    let anat_plan = DeletionPlanner::plan(&records, &resolver, DerivativeTree::Anatomical)?;
    let bold_plan = DeletionPlanner::plan(&records, &resolver, DerivativeTree::Functional)?;

    if cli.dry_run {
        let summary = PlanSummary {
            study: cli.study,
            tag: &cli.tag,
            anatomical: &anat_plan,
            functional: &bold_plan,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    // Anatomical tree first, then functional, each with its own checkout.
    release_tree(&cli, "anatomical", &cli.freesurfer_dir, &anat_plan)?;
    release_tree(&cli, "functional", &cli.bold_dir, &bold_plan)?;

    Ok(())
}

fn release_tree(cli: &Cli, label: &str, work_dir: &Path, plan: &DeletionPlan) -> Result<()> {
    info!(tree = label, work_dir = %work_dir.display(), "starting release");
    let git = GitClient::new(work_dir);
    let config = OrchestratorConfig {
        tag: cli.tag.clone(),
        remote: cli.remote.clone(),
        batch_cap: cli.batch_size,
    };
    let outcomes = ReleaseOrchestrator::new(&git, config)
        .run(plan)
        .with_context(|| format!("releasing {label} tree at {}", work_dir.display()))?;
    for outcome in &outcomes {
        info!(
            tree = label,
            branch = %outcome.name,
            state = ?outcome.state,
            removed = outcome.removed,
            "branch complete"
        );
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
