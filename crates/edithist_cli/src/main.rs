//! Command-line tool for inspecting and querying editor change logs.

use anyhow::Context;
use clap::{Parser, Subcommand};
use edithist_core::synthetic::linear_workspace_history;
use edithist_core::writer::{write_dir, write_zip};
use edithist_core::{
    open_workspace_history, Config, PatchPolicy, Resolver, Timestamp, WorkspaceChangeHistory,
};
use serde_json::{json, Value};
use similar::TextDiff;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "edithist", about = "Reconstruct files from an editor change log", version)]
struct Cli {
    /// Out-of-range patch handling: strict or clamp
    #[arg(long, global = true)]
    patch_policy: Option<PatchPolicy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize files and edit counts of a change log
    Summary {
        /// Change-log zip file or directory
        source: PathBuf,
        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
    /// Print one file as of a point in time
    Show {
        source: PathBuf,
        file: PathBuf,
        /// Epoch milliseconds or RFC 3339 datetime (default: end of history)
        #[arg(long)]
        at: Option<Timestamp>,
    },
    /// Print every file as of one file's N-th edit
    AtEdit {
        source: PathBuf,
        file: PathBuf,
        index: usize,
        /// Print only this file
        #[arg(long)]
        only: Option<PathBuf>,
    },
    /// Unified diff of one file between two points in time
    Diff {
        source: PathBuf,
        file: PathBuf,
        #[arg(long)]
        from: Timestamp,
        #[arg(long)]
        to: Timestamp,
    },
    /// Write a synthetic linear history of a directory
    Generate {
        /// Directory whose files are typed out
        root: PathBuf,
        /// Output path; `.zip` writes an archive, anything else a directory
        output: PathBuf,
    },
}

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "edithist_core=info,edithist_cli=info";

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn effective_config(patch_policy: Option<PatchPolicy>) -> Config {
    let mut config = Config::from_env();
    if let Some(policy) = patch_policy {
        config.patch_policy = policy;
    }
    config
}

fn load(source: &Path, config: &Config) -> anyhow::Result<WorkspaceChangeHistory> {
    open_workspace_history(source, &config.layout)
        .with_context(|| format!("Failed to load change log {}", source.display()))
}

fn summary_value(workspace: &WorkspaceChangeHistory) -> anyhow::Result<Value> {
    let metadata = match workspace.metadata() {
        Some(metadata) => serde_json::to_value(metadata)?,
        None => Value::Null,
    };
    let files: Vec<Value> = workspace
        .files()
        .map(|file| {
            json!({
                "path": file.path().display().to_string(),
                "checkpoints": file.checkpoints().len(),
                "edits": file.num_edits(),
            })
        })
        .collect();
    Ok(json!({
        "metadata": metadata,
        "files": files,
        "totalEdits": workspace.total_num_edits(),
    }))
}

fn format_summary_output(workspace: &WorkspaceChangeHistory, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(&summary_value(workspace)?)?);
    }

    let mut rows = Vec::with_capacity(workspace.len() + 2);
    if let Some(metadata) = workspace.metadata() {
        rows.push(format!(
            "Workspace: {} on {}",
            metadata.workspace_name(),
            metadata.hostname()
        ));
    }
    for file in workspace.files() {
        rows.push(format!(
            "{:<48} {:>6} edits {:>4} checkpoints",
            file.path().display(),
            file.num_edits(),
            file.checkpoints().len()
        ));
    }
    rows.push(format!(
        "{} file(s), {} edit(s)",
        workspace.len(),
        workspace.total_num_edits()
    ));
    Ok(rows.join("\n"))
}

fn format_snapshot_output(
    versions: &BTreeMap<PathBuf, String>,
    only: Option<&Path>,
) -> anyhow::Result<String> {
    if let Some(path) = only {
        return versions
            .get(path)
            .cloned()
            .with_context(|| format!("No history for {}", path.display()));
    }

    let sections: Vec<String> = versions
        .iter()
        .map(|(path, text)| format!("==> {} <==\n{}", path.display(), text))
        .collect();
    Ok(sections.join("\n"))
}

fn format_diff_output(file: &Path, from: Timestamp, to: Timestamp, old: &str, new: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .header(
            &format!("{}@{}", file.display(), from.as_millis()),
            &format!("{}@{}", file.display(), to.as_millis()),
        )
        .to_string()
}

fn is_zip_output(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let Cli {
        patch_policy,
        command,
    } = Cli::parse();
    let config = effective_config(patch_policy);
    let resolver = Resolver::new(config.patch_policy);

    match command {
        Commands::Summary { source, json } => {
            let workspace = load(&source, &config)?;
            println!("{}", format_summary_output(&workspace, json)?);
        }
        Commands::Show { source, file, at } => {
            let workspace = load(&source, &config)?;
            let history = workspace.file(&file)?;
            let text = match at {
                Some(time) => resolver.version_at_time(history, time)?,
                None => resolver.latest_version(history)?,
            };
            print!("{}", text);
        }
        Commands::AtEdit {
            source,
            file,
            index,
            only,
        } => {
            let workspace = load(&source, &config)?;
            let versions = resolver.version_at_edit_index(&workspace, &file, index)?;
            println!("{}", format_snapshot_output(&versions, only.as_deref())?);
        }
        Commands::Diff {
            source,
            file,
            from,
            to,
        } => {
            let workspace = load(&source, &config)?;
            let history = workspace.file(&file)?;
            let old = resolver.version_at_time(history, from)?;
            let new = resolver.version_at_time(history, to)?;
            print!("{}", format_diff_output(&file, from, to, &old, &new));
        }
        Commands::Generate { root, output } => {
            let workspace = linear_workspace_history(&root)
                .with_context(|| format!("Failed to read {}", root.display()))?;
            if is_zip_output(&output) {
                write_zip(&workspace, &config.layout, &output)?;
            } else {
                write_dir(&workspace, &config.layout, &output)?;
            }
            tracing::info!(
                "Generated {} edit(s) across {} file(s)",
                workspace.total_num_edits(),
                workspace.len()
            );
        }
    }

    Ok(())
}
