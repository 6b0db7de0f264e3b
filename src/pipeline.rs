//! One report run: compare, render, assemble.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::changes::compare::{compare, CompareError};
use crate::changes::render::{decode_text, render, DiffBlock};
use crate::changes::size::estimate;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::pr::PullRequest;
use crate::report::{Commentary, NewContent, Report, ReportHeader};

/// Compares `base_root` with `head_root` and assembles the report.
///
/// `header.generated_at` is stamped from the context clock. `commentary` is
/// `None` when comments were never requested, which drops the section.
///
/// # Errors
///
/// Returns [`CompareError`] when either root cannot be compared. Per-file
/// problems never fail the run; they show up as placeholders.
pub fn generate_report(
    ctx: &ServiceContext,
    config: &Config,
    mut header: ReportHeader,
    base_root: &Path,
    head_root: &Path,
    commentary: Option<Commentary>,
) -> Result<Report, CompareError> {
    let changes = compare(ctx.fs.as_ref(), base_root, head_root, &config.compare_options())?;

    let diffs: Vec<DiffBlock> = changes
        .modified
        .iter()
        .map(|entry| {
            let path = &entry.relative_path;
            render(
                ctx.fs.as_ref(),
                path,
                &base_root.join(path),
                &head_root.join(path),
                config.context_lines,
            )
        })
        .collect();

    header.generated_at = timestamp(ctx.clock.now());
    let added = changes.added.clone();
    let mut report = Report::build(header, changes, diffs, commentary);

    if config.include_new_content {
        for entry in &added {
            let content = new_content(ctx, config, &head_root.join(&entry.relative_path));
            report.attach_new_content(&entry.relative_path, content);
        }
    }

    Ok(report)
}

/// Header fields taken from pull request metadata.
#[must_use]
pub fn header_for(pr: &PullRequest) -> ReportHeader {
    ReportHeader {
        pr_id: pr.id.clone(),
        repository: pr.repository.clone(),
        base_ref: pr.base_ref.clone(),
        head_ref: pr.head_ref.clone(),
        source_url: pr.source_url.clone(),
        title: Some(pr.title.clone()),
        author: Some(pr.author.clone()),
        description: pr.description.clone(),
        generated_at: String::new(),
    }
}

/// Oversized files are rejected from their length before the content is loaded.
fn new_content(ctx: &ServiceContext, config: &Config, path: &Path) -> NewContent {
    let limit = config.max_new_content_bytes;
    let size = estimate(ctx.fs.as_ref(), path);
    if size.size_bytes > limit {
        return NewContent::TooLarge { size_bytes: size.size_bytes, limit };
    }
    let bytes = match ctx.fs.read(path) {
        Ok(bytes) => bytes,
        Err(e) => return NewContent::Unreadable(e.to_string()),
    };
    if bytes.len() as u64 > limit {
        return NewContent::TooLarge { size_bytes: bytes.len() as u64, limit };
    }
    match decode_text(&bytes) {
        Some(text) => NewContent::Text(text.to_string()),
        None => NewContent::Binary,
    }
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixed::StagedGitRepo;
    use crate::changes::render::DiffContent;
    use crate::report::{parse, serialize};

    fn write_tree(root: &Path, files: &[(&str, &[u8])]) {
        for (path, content) in files {
            let full = root.join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }
    }

    fn ctx() -> ServiceContext {
        let instant =
            DateTime::parse_from_rfc3339("2024-06-15T10:30:00Z").unwrap().with_timezone(&Utc);
        ServiceContext::deterministic(instant, Box::new(StagedGitRepo::new()))
    }

    #[test]
    fn scenario_added_and_modified() {
        let base = tempfile::tempdir().unwrap();
        let head = tempfile::tempdir().unwrap();
        write_tree(base.path(), &[("a.js", b"x"), ("b.js", b"y")]);
        write_tree(head.path(), &[("a.js", b"x"), ("b.js", b"z"), ("c.js", b"new")]);

        let report = generate_report(
            &ctx(),
            &Config::default(),
            ReportHeader::default(),
            base.path(),
            head.path(),
            None,
        )
        .unwrap();

        assert_eq!(report.header.generated_at, "2024-06-15T10:30:00Z");
        assert_eq!(report.new_files[0].content, Some(NewContent::Text("new".to_string())));
        assert_eq!(report.diffs.len(), 1);
        assert_eq!((report.diffs[0].added_lines, report.diffs[0].removed_lines), (1, 1));

        let parsed = parse(&serialize(&report));
        assert_eq!(parsed.added, vec!["c.js"]);
        assert!(parsed.removed.is_empty());
        assert_eq!(parsed.modified, vec!["b.js"]);
    }

    #[test]
    fn identical_trees_report_no_changes() {
        let base = tempfile::tempdir().unwrap();
        let head = tempfile::tempdir().unwrap();
        let files: [(&str, &[u8]); 2] = [("a.rs", b"fn a() {}"), ("docs/x.md", b"# x")];
        write_tree(base.path(), &files);
        write_tree(head.path(), &files);

        let report = generate_report(
            &ctx(),
            &Config::default(),
            ReportHeader::default(),
            base.path(),
            head.path(),
            None,
        )
        .unwrap();
        let text = serialize(&report);
        assert!(text.contains("New: 0 | Modified: 0 | Deleted: 0"));
        assert!(text.contains("## Diffs:\n\n_No changes._"));
    }

    #[test]
    fn new_content_respects_limits_and_binary() {
        let base = tempfile::tempdir().unwrap();
        let head = tempfile::tempdir().unwrap();
        write_tree(
            head.path(),
            &[("big.txt", &[b'a'; 64]), ("img.png", &[0x89, 0, 1]), ("ok.txt", b"hi")],
        );
        let config = Config { max_new_content_bytes: 16, ..Config::default() };

        let report = generate_report(
            &ctx(),
            &config,
            ReportHeader::default(),
            base.path(),
            head.path(),
            None,
        )
        .unwrap();
        let contents: Vec<_> = report.new_files.iter().map(|f| f.content.clone()).collect();
        assert_eq!(
            contents,
            vec![
                Some(NewContent::TooLarge { size_bytes: 64, limit: 16 }),
                Some(NewContent::Binary),
                Some(NewContent::Text("hi".to_string())),
            ]
        );
    }

    #[test]
    fn new_content_can_be_disabled() {
        let base = tempfile::tempdir().unwrap();
        let head = tempfile::tempdir().unwrap();
        write_tree(head.path(), &[("ok.txt", b"hi")]);
        let config = Config { include_new_content: false, ..Config::default() };

        let report = generate_report(
            &ctx(),
            &config,
            ReportHeader::default(),
            base.path(),
            head.path(),
            None,
        )
        .unwrap();
        assert_eq!(report.new_files[0].content, None);
        assert!(!serialize(&report).contains("<NEW_CONTENT"));
    }

    #[test]
    fn binary_modification_renders_placeholder() {
        let base = tempfile::tempdir().unwrap();
        let head = tempfile::tempdir().unwrap();
        write_tree(base.path(), &[("logo.png", &[0x89, 0, 1])]);
        write_tree(head.path(), &[("logo.png", &[0x89, 0, 2])]);

        let report = generate_report(
            &ctx(),
            &Config::default(),
            ReportHeader::default(),
            base.path(),
            head.path(),
            None,
        )
        .unwrap();
        assert_eq!(report.diffs[0].content, DiffContent::Binary);
    }

    #[test]
    fn missing_head_root_is_fatal() {
        let base = tempfile::tempdir().unwrap();
        let result = generate_report(
            &ctx(),
            &Config::default(),
            ReportHeader::default(),
            base.path(),
            &base.path().join("missing"),
            None,
        );
        assert!(matches!(result, Err(CompareError::MissingRoot { .. })));
    }

    #[test]
    fn header_for_copies_metadata() {
        let pr = PullRequest {
            id: "9".to_string(),
            repository: "o/r".to_string(),
            title: "T".to_string(),
            author: "me".to_string(),
            description: None,
            base_ref: "main".to_string(),
            head_ref: "dev".to_string(),
            source_url: "https://x/9".to_string(),
            base_clone_url: "https://x/r.git".to_string(),
            head_clone_url: "https://x/r.git".to_string(),
        };
        let header = header_for(&pr);
        assert_eq!(header.pr_id, "9");
        assert_eq!(header.title.as_deref(), Some("T"));
        assert_eq!(header.head_ref, "dev");
    }
}
