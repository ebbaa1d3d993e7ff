//! pls - Release automation from conventional commits
//!
//! CLI binary wiring the release workflows to a local git repository and a
//! GitHub-hosted remote.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser)]
#[command(name = "pls")]
#[command(about = "Release automation: version proposals, tags, and releases")]
#[command(version)]
struct Cli {
    /// Path to the git repository (defaults to current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open or refresh the release proposal PR for the integration branch
    Propose,

    /// Reconcile the proposal with the version selected in its description
    Sync,

    /// Create the tag and release for a merged proposal (safe to re-run)
    Finalize,

    /// Rebase the integration branch onto the release branch (two-branch
    /// strategy only)
    BranchSync,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let path = cli.path.unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Commands::Propose => cli::run_propose(&path).await?,
        Commands::Sync => cli::run_sync(&path).await?,
        Commands::Finalize => cli::run_finalize(&path).await?,
        Commands::BranchSync => return Ok(cli::run_branch_sync(&path).await?),
    }

    Ok(ExitCode::SUCCESS)
}
