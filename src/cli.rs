//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for `prdiff`.
#[derive(Debug, Parser)]
#[command(name = "prdiff", version, about = "Build a Markdown review context for a pull request")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare two local directory trees.
    Diff(DiffArgs),
    /// Fetch and compare a GitHub pull request.
    Github {
        /// Repository as `OWNER/REPO`.
        repo: String,
        /// Pull request number.
        number: u64,
        /// Checkout options.
        #[command(flatten)]
        remote: RemoteArgs,
        /// Report options.
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Fetch and compare an Azure DevOps pull request.
    Azure {
        /// Organization name.
        organization: String,
        /// Project name.
        project: String,
        /// Repository name.
        repository: String,
        /// Pull request ID.
        id: u64,
        /// Checkout options.
        #[command(flatten)]
        remote: RemoteArgs,
        /// Report options.
        #[command(flatten)]
        report: ReportArgs,
    },
}

/// Arguments of `prdiff diff`.
#[derive(Debug, Clone, Args)]
pub struct DiffArgs {
    /// Target branch snapshot.
    #[arg(long)]
    pub base: PathBuf,
    /// Source branch snapshot.
    #[arg(long)]
    pub head: PathBuf,
    /// Pull request number or ID for the header.
    #[arg(long, default_value = "")]
    pub pr_id: String,
    /// Repository identifier for the header.
    #[arg(long, default_value = "")]
    pub repository: String,
    /// Target branch name for the header.
    #[arg(long, default_value = "")]
    pub base_ref: String,
    /// Source branch name for the header.
    #[arg(long, default_value = "")]
    pub head_ref: String,
    /// Pull request URL for the header.
    #[arg(long, default_value = "")]
    pub source_url: String,
    /// Pull request title for the header.
    #[arg(long)]
    pub title: Option<String>,
    /// JSON array of review comments to include.
    #[arg(long, value_name = "FILE.json")]
    pub comments: Option<PathBuf>,
    /// Report options.
    #[command(flatten)]
    pub report: ReportArgs,
}

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct ReportArgs {
    /// Config file (default: `.prdiff.yaml` when present).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Lines of context around each diff hunk.
    #[arg(long)]
    pub context_lines: Option<usize>,
    /// List new files without embedding their content.
    #[arg(long)]
    pub no_new_content: bool,
    /// Write the report here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Options for subcommands that clone from a hosting service.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct RemoteArgs {
    /// Skip fetching review comments.
    #[arg(long)]
    pub no_comments: bool,
    /// Leave the cloned branches on disk after the run.
    #[arg(long)]
    pub keep_checkouts: bool,
}
