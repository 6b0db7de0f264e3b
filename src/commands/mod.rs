//! Command dispatch and handlers.

pub mod diff;
pub mod pull;

use std::env;
use std::path::Path;

use crate::cli::{Command, ReportArgs};
use crate::config::{Config, Environment};
use crate::context::ServiceContext;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let ctx = ServiceContext::live();
    let environment = Environment::from_env();
    let cwd = env::current_dir().map_err(|e| format!("cannot determine working directory: {e}"))?;
    dispatch_with_context(command, &ctx, &environment, &cwd)
}

/// Dispatch a command with the given service context.
fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    environment: &Environment,
    cwd: &Path,
) -> Result<(), String> {
    match command {
        Command::Diff(args) => diff::run(ctx, cwd, args),
        Command::Github { repo, number, remote, report } => {
            pull::github(ctx, environment, cwd, repo, *number, *remote, report)
        }
        Command::Azure { organization, project, repository, id, remote, report } => {
            let target = crate::pr::azure::AzureTarget {
                organization: organization.clone(),
                project: project.clone(),
                repository: repository.clone(),
                id: *id,
            };
            pull::azure(ctx, environment, cwd, target, *remote, report)
        }
    }
}

/// Loads the config file named by `--config` (or the default) and applies
/// command-line overrides.
pub(crate) fn load_config(
    ctx: &ServiceContext,
    cwd: &Path,
    report: &ReportArgs,
) -> Result<Config, String> {
    let config = Config::load(ctx.fs.as_ref(), cwd, report.config.as_deref())
        .map_err(|e| e.to_string())?;
    Ok(config.with_overrides(report.context_lines, report.no_new_content))
}

/// Writes the report to `output`, or to stdout when absent.
pub(crate) fn emit(ctx: &ServiceContext, output: Option<&Path>, text: &str) -> Result<(), String> {
    match output {
        Some(path) => {
            ctx.fs
                .write(path, text)
                .map_err(|e| format!("failed to write report to {}: {e}", path.display()))?;
            log::info!("report written to {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}
