use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use artifex_core::domain::{ExecutionId, extension};
use artifex_core::impls::{FsExecutionStore, TracingEventSink};
use artifex_core::ports::ExecutionStore;
use artifex_core::{BindingPolicy, PipelineManifest, RegistryBuilder, RegistryConfig};

/// artifex - artifact identity for workflow outputs
#[derive(Parser)]
#[command(name = "artifex")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Define every group and artifact of a manifest without emitting outputs
    Check {
        manifest: PathBuf,

        #[command(flatten)]
        overrides: ConfigOverrides,
    },

    /// Emit every declared output node by node and print the execution record
    Run {
        manifest: PathBuf,

        #[command(flatten)]
        overrides: ConfigOverrides,

        /// Persist the record as <dir>/<execution-id>.json
        #[arg(long)]
        store_dir: Option<PathBuf>,
    },

    /// Print a stored execution record
    Show {
        store_dir: PathBuf,
        execution_id: String,
    },

    /// Resolve the file extension for an artifact name
    Extension {
        name: String,

        #[arg(long)]
        file_type: Option<String>,
    },
}

#[derive(clap::Args)]
struct ConfigOverrides {
    /// Allow distinct named outputs of one node to share (filename, artifact)
    #[arg(long)]
    lenient: bool,

    /// Reject artifacts whose extension cannot be resolved
    #[arg(long)]
    require_extension: bool,
}

impl ConfigOverrides {
    fn apply(&self, mut config: RegistryConfig) -> RegistryConfig {
        if self.lenient {
            config.binding_policy = BindingPolicy::Lenient;
        }
        if self.require_extension {
            config.require_extension = true;
        }
        config
    }
}

#[derive(Serialize)]
struct CheckReport<'a> {
    pipeline: Option<&'a str>,
    groups: usize,
    artifacts: usize,
    emissions: usize,
    untracked: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { manifest, overrides } => check(&manifest, &overrides),
        Commands::Run {
            manifest,
            overrides,
            store_dir,
        } => run(&manifest, &overrides, store_dir).await,
        Commands::Show {
            store_dir,
            execution_id,
        } => show(store_dir, &execution_id).await,
        Commands::Extension { name, file_type } => resolve_extension(&name, file_type.as_deref()),
    }
}

fn load_manifest(path: &Path) -> Result<PipelineManifest> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest: {}", path.display()))?;
    PipelineManifest::from_json(&json)
        .with_context(|| format!("failed to load manifest: {}", path.display()))
}

fn check(path: &Path, overrides: &ConfigOverrides) -> Result<()> {
    let manifest = load_manifest(path)?;
    let config = overrides.apply(manifest.config.clone());

    let (registry, plan) = RegistryBuilder::new()
        .config(config)
        .apply_manifest(&manifest)
        .context("manifest rejected")?;

    let report = CheckReport {
        pipeline: manifest.name.as_deref(),
        groups: registry.groups().len(),
        artifacts: registry.artifacts().len(),
        emissions: plan.emissions.len(),
        untracked: plan.untracked.len(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run(path: &Path, overrides: &ConfigOverrides, store_dir: Option<PathBuf>) -> Result<()> {
    let manifest = load_manifest(path)?;
    let config = overrides.apply(manifest.config.clone());

    let (mut registry, plan) = RegistryBuilder::new()
        .config(config)
        .event_sink(TracingEventSink)
        .apply_manifest(&manifest)
        .context("manifest rejected")?;

    registry.begin_execution();
    // emissions are in node order
    for batch in plan.emissions.chunk_by(|a, b| a.node == b.node) {
        for emission in batch {
            registry
                .emit(emission.clone())
                .with_context(|| format!("node '{}' emitted an invalid output", emission.node))?;
        }
        info!(node_id = %batch[0].node, outputs = batch.len(), "node completed");
    }
    let record = registry.finish();

    if let Some(dir) = store_dir {
        let store = FsExecutionStore::new(dir);
        store
            .save(&record)
            .await
            .context("failed to store execution record")?;
        info!(execution_id = %record.execution_id, dir = %store.root().display(), "execution record stored");
    }

    println!("{}", serde_json::to_string_pretty(&record.listing())?);
    Ok(())
}

async fn show(store_dir: PathBuf, execution_id: &str) -> Result<()> {
    let id: ExecutionId = execution_id
        .parse()
        .with_context(|| format!("invalid execution id: {execution_id}"))?;
    let store = FsExecutionStore::new(store_dir);

    let Some(record) = store.get(id).await? else {
        bail!("execution {id} not found in {}", store.root().display());
    };
    println!("{}", serde_json::to_string_pretty(&record.listing())?);
    Ok(())
}

fn resolve_extension(name: &str, file_type: Option<&str>) -> Result<()> {
    let file_type = match file_type {
        Some(raw) => match extension::normalize_file_type(raw) {
            Some(ft) => Some(ft),
            None => bail!("file type '{raw}' is empty"),
        },
        None => None,
    };
    match extension::resolve(name, file_type.as_deref()) {
        Some(ext) => {
            println!("{ext}");
            Ok(())
        }
        None => bail!("cannot resolve an extension for '{name}'; pass --file-type"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO_MANIFEST: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/manifests/artifact_meta.json");

    fn overrides(lenient: bool, require_extension: bool) -> ConfigOverrides {
        ConfigOverrides {
            lenient,
            require_extension,
        }
    }

    #[test]
    fn flags_override_manifest_config() {
        let config = overrides(true, true).apply(RegistryConfig::strict());
        assert_eq!(config.binding_policy, BindingPolicy::Lenient);
        assert!(config.require_extension);
    }

    #[test]
    fn absent_flags_keep_manifest_config() {
        let manifest = RegistryConfig::lenient().with_require_extension(true);
        assert_eq!(overrides(false, false).apply(manifest.clone()), manifest);
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "artifex",
            "run",
            "pipeline.json",
            "--lenient",
            "--store-dir",
            "out",
        ])
        .unwrap();
        let Commands::Run {
            overrides,
            store_dir,
            ..
        } = cli.command
        else {
            panic!("expected run");
        };
        assert!(overrides.lenient);
        assert!(!overrides.require_extension);
        assert_eq!(store_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn extension_resolves_from_name_or_file_type() {
        assert!(resolve_extension("report1.csv", None).is_ok());
        assert!(resolve_extension("report3", Some(".csv")).is_ok());
    }

    #[test]
    fn extension_rejects_empty_file_type_and_bare_name() {
        assert!(resolve_extension("report1.csv", Some("  ")).is_err());
        assert!(resolve_extension("report3", None).is_err());
    }

    #[test]
    fn check_accepts_demo_manifest() {
        check(Path::new(DEMO_MANIFEST), &overrides(false, false)).unwrap();
    }

    #[test]
    fn missing_manifest_is_an_error() {
        assert!(check(Path::new("does/not/exist.json"), &overrides(false, false)).is_err());
    }

    #[tokio::test]
    async fn run_stores_record_that_show_can_load() {
        let dir = tempfile::tempdir().unwrap();

        run(
            Path::new(DEMO_MANIFEST),
            &overrides(false, false),
            Some(dir.path().to_path_buf()),
        )
        .await
        .unwrap();

        let stored = FsExecutionStore::new(dir.path()).list().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].files, 5);

        let id = stored[0].execution_id.to_string();
        show(dir.path().to_path_buf(), &id).await.unwrap();
    }

    #[tokio::test]
    async fn show_fails_for_unknown_or_malformed_id() {
        let dir = tempfile::tempdir().unwrap();
        let unknown = "exec-01ARZ3NDEKTSV4RRFFQ69G5FAV";

        assert!(show(dir.path().to_path_buf(), unknown).await.is_err());
        assert!(show(dir.path().to_path_buf(), "not-an-id").await.is_err());
    }
}
