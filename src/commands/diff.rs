//! `prdiff diff` command.

use std::path::Path;

use crate::cli::DiffArgs;
use crate::commands::{emit, load_config};
use crate::context::ServiceContext;
use crate::pipeline::generate_report;
use crate::pr::parse_comments;
use crate::report::{serialize, Commentary, ReportHeader};

/// Execute the `diff` command.
///
/// Compares two local trees and writes the report to `--output` or stdout.
///
/// # Errors
///
/// Returns an error string if the config cannot be loaded, either root
/// cannot be compared, or the report cannot be written.
pub fn run(ctx: &ServiceContext, cwd: &Path, args: &DiffArgs) -> Result<(), String> {
    let text = build(ctx, cwd, args)?;
    emit(ctx, args.report.output.as_deref(), &text)
}

/// Generates the serialized report without writing it.
///
/// # Errors
///
/// Returns an error string if the config cannot be loaded or either root
/// cannot be compared. A bad `--comments` file only degrades the
/// Commentary section, which is left out entirely without `--comments`.
pub fn build(ctx: &ServiceContext, cwd: &Path, args: &DiffArgs) -> Result<String, String> {
    let config = load_config(ctx, cwd, &args.report)?;
    let commentary = args.comments.as_deref().map(|path| load_comments(ctx, path));
    let header = ReportHeader {
        pr_id: args.pr_id.clone(),
        repository: args.repository.clone(),
        base_ref: args.base_ref.clone(),
        head_ref: args.head_ref.clone(),
        source_url: args.source_url.clone(),
        title: args.title.clone(),
        ..ReportHeader::default()
    };

    let report = generate_report(ctx, &config, header, &args.base, &args.head, commentary)
        .map_err(|e| e.to_string())?;
    Ok(serialize(&report))
}

fn load_comments(ctx: &ServiceContext, path: &Path) -> Commentary {
    let loaded = ctx
        .fs
        .read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))
        .and_then(|text| {
            parse_comments(&text)
                .map_err(|e| format!("invalid comments in {}: {e}", path.display()))
        });
    if let Err(reason) = &loaded {
        log::warn!("{reason}");
    }
    loaded
}
