//! Core library entry for the `prdiff` CLI.
//!
//! `prdiff` compares two snapshots of a repository (the target and source
//! branches of a pull request) and renders a Markdown report meant to be
//! fed to a reviewer or a language model as review context.

pub mod adapters;
pub mod changes;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod pipeline;
pub mod ports;
pub mod pr;
pub mod report;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}

#[cfg(test)]
mod tests {
    use super::run;
    use std::ffi::OsString;

    #[test]
    fn run_compares_two_directories() {
        let base = tempfile::tempdir().unwrap();
        let head = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(head.path().join("a.txt"), "a").unwrap();
        let report = out.path().join("report.md");
        let args: Vec<OsString> = vec![
            "prdiff".into(),
            "diff".into(),
            "--base".into(),
            base.path().as_os_str().to_owned(),
            "--head".into(),
            head.path().as_os_str().to_owned(),
            "--output".into(),
            report.as_os_str().to_owned(),
        ];
        let result = run(args);
        assert!(result.is_ok(), "{result:?}");
        assert!(std::fs::read_to_string(report).unwrap().contains("`a.txt`"));
    }

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["prdiff", "unknown"]);
        assert!(result.is_err());
    }
}
