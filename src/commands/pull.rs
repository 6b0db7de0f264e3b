//! `prdiff github` and `prdiff azure` commands.
//!
//! Both follow the same flow: fetch metadata (fatal on failure), fetch
//! comments (optional), shallow-clone base and head into a per-run
//! workspace, generate the report, then remove the workspace.

use std::path::{Path, PathBuf};

use crate::adapters::live::azure::LiveAzureDevOps;
use crate::adapters::live::github::LiveGitHub;
use crate::cli::{RemoteArgs, ReportArgs};
use crate::commands::{emit, load_config};
use crate::config::{Config, Environment};
use crate::context::ServiceContext;
use crate::pipeline::{generate_report, header_for};
use crate::ports::git::HttpCredentials;
use crate::ports::pull_requests::PullRequestSource;
use crate::pr::azure::AzureTarget;
use crate::pr::{redact_url, PullRequest};
use crate::report::{serialize, Commentary};

/// Everything [`fetch_and_report`] needs besides the context and source.
#[derive(Clone)]
pub struct PullRun<'a> {
    /// Resolved configuration.
    pub config: &'a Config,
    /// Comment and checkout switches.
    pub remote: RemoteArgs,
    /// Directory the per-run workspace is created in.
    pub checkout_parent: PathBuf,
    /// Credentials for private repositories.
    pub credentials: Option<HttpCredentials>,
}

/// Execute the `github` command.
///
/// # Errors
///
/// Returns an error string if `repo` is not `OWNER/REPO`, the config
/// cannot be loaded, or the run fails.
pub fn github(
    ctx: &ServiceContext,
    environment: &Environment,
    cwd: &Path,
    repo: &str,
    number: u64,
    remote: RemoteArgs,
    report: &ReportArgs,
) -> Result<(), String> {
    let (owner, name) = split_repo(repo)?;
    let config = load_config(ctx, cwd, report)?;
    let mut source = LiveGitHub::new(owner, name, number, environment.github_token.clone())?;
    if let Some(api_url) = &environment.github_api_url {
        source = source.with_api_url(api_url);
    }
    let run = PullRun {
        config: &config,
        remote,
        checkout_parent: environment.checkout_parent(),
        credentials: environment
            .github_token
            .as_deref()
            .map(|token| HttpCredentials::new("x-access-token", token)),
    };
    let text = fetch_and_report(ctx, &source, &run)?;
    emit(ctx, report.output.as_deref(), &text)
}

/// Execute the `azure` command.
///
/// # Errors
///
/// Returns an error string if the config cannot be loaded or the run fails.
pub fn azure(
    ctx: &ServiceContext,
    environment: &Environment,
    cwd: &Path,
    target: AzureTarget,
    remote: RemoteArgs,
    report: &ReportArgs,
) -> Result<(), String> {
    let config = load_config(ctx, cwd, report)?;
    let source = LiveAzureDevOps::new(target, environment.azure_pat.clone())?;
    let run = PullRun {
        config: &config,
        remote,
        checkout_parent: environment.checkout_parent(),
        credentials: environment.azure_pat.as_deref().map(|pat| HttpCredentials::new("pat", pat)),
    };
    let text = fetch_and_report(ctx, &source, &run)?;
    emit(ctx, report.output.as_deref(), &text)
}

/// Fetches a pull request from `source`, checks out both branches and
/// returns the serialized report.
///
/// # Errors
///
/// Returns an error string if metadata cannot be fetched, git is missing,
/// a clone fails, or the checkouts cannot be compared. Comment failures
/// only degrade the Commentary section.
pub fn fetch_and_report(
    ctx: &ServiceContext,
    source: &dyn PullRequestSource,
    run: &PullRun<'_>,
) -> Result<String, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start async runtime: {e}"))?;

    let pr = runtime
        .block_on(source.fetch_metadata())
        .map_err(|e| format!("failed to fetch pull request: {e}"))?;
    log::info!("pull request {} in {}: {} -> {}", pr.id, pr.repository, pr.head_ref, pr.base_ref);

    let commentary: Option<Commentary> = if run.remote.no_comments {
        None
    } else {
        Some(runtime.block_on(source.fetch_comments()).map_err(|e| {
            log::warn!("failed to fetch comments: {e}");
            e.to_string()
        }))
    };

    if !ctx.git.available() {
        return Err("git executable not found on PATH".to_string());
    }

    let workspace = run.checkout_parent.join(format!("prdiff-{}", ctx.id_gen.generate_id()));
    let result = checkout_and_generate(ctx, run, &pr, commentary, &workspace);

    if run.remote.keep_checkouts {
        eprintln!("Checkouts kept at: {}", workspace.display());
    } else if ctx.fs.exists(&workspace) {
        if let Err(e) = ctx.fs.remove_dir_all(&workspace) {
            log::warn!("failed to remove {}: {e}", workspace.display());
        }
    }
    result
}

fn checkout_and_generate(
    ctx: &ServiceContext,
    run: &PullRun<'_>,
    pr: &PullRequest,
    commentary: Option<Commentary>,
    workspace: &Path,
) -> Result<String, String> {
    let base = workspace.join("base");
    let head = workspace.join("head");
    clone(ctx, run, &pr.base_clone_url, &pr.base_ref, &base)?;
    clone(ctx, run, &pr.head_clone_url, &pr.head_ref, &head)?;

    let report = generate_report(ctx, run.config, header_for(pr), &base, &head, commentary)
        .map_err(|e| e.to_string())?;
    Ok(serialize(&report))
}

fn clone(
    ctx: &ServiceContext,
    run: &PullRun<'_>,
    url: &str,
    reference: &str,
    dest: &Path,
) -> Result<(), String> {
    log::info!("cloning {reference} from {}", redact_url(url));
    ctx.git
        .shallow_clone(url, reference, dest, run.credentials.as_ref())
        .map_err(|e| redact_secret(&e.to_string(), run.credentials.as_ref()))
}

/// Masks the token should a remote echo it back in an error.
fn redact_secret(message: &str, credentials: Option<&HttpCredentials>) -> String {
    match credentials {
        Some(c) if !c.secret().is_empty() => message.replace(c.secret(), "***"),
        _ => message.to_string(),
    }
}

fn split_repo(repo: &str) -> Result<(&str, &str), String> {
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(format!("expected OWNER/REPO, got '{repo}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixed::{StagedClone, StagedGitRepo, StaticPullRequestSource};
    use crate::pr::ReviewComment;
    use crate::report::parse;
    use chrono::{DateTime, Utc};
    use std::error::Error;
    use std::sync::Arc;

    fn instant() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-15T10:30:00Z").unwrap().with_timezone(&Utc)
    }

    fn pull_request() -> PullRequest {
        PullRequest {
            id: "42".to_string(),
            repository: "octo/hello".to_string(),
            title: "Add greeting".to_string(),
            author: "octocat".to_string(),
            description: Some("Says hello.".to_string()),
            base_ref: "main".to_string(),
            head_ref: "feature/greet".to_string(),
            source_url: "https://github.com/octo/hello/pull/42".to_string(),
            base_clone_url: "https://github.com/octo/hello.git".to_string(),
            head_clone_url: "https://github.com/fork/hello.git".to_string(),
        }
    }

    struct Fixture {
        _staged: tempfile::TempDir,
        parent: tempfile::TempDir,
        git: Arc<StagedGitRepo>,
    }

    fn fixture() -> Fixture {
        let staged = tempfile::tempdir().unwrap();
        let base = staged.path().join("main");
        let head = staged.path().join("greet");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::create_dir_all(&head).unwrap();
        std::fs::write(base.join("hello.rs"), "fn main() {}\n").unwrap();
        std::fs::write(head.join("hello.rs"), "fn main() { println!(\"hi\"); }\n").unwrap();
        std::fs::write(head.join("README.md"), "# hello\n").unwrap();
        let git = StagedGitRepo::new().with_ref("main", &base).with_ref("feature/greet", &head);
        Fixture { _staged: staged, parent: tempfile::tempdir().unwrap(), git: Arc::new(git) }
    }

    /// Lets a test keep a handle on the staged repo after boxing it into the context.
    struct SharedGit(Arc<StagedGitRepo>);

    impl crate::ports::git::GitRepo for SharedGit {
        fn available(&self) -> bool {
            self.0.available()
        }

        fn shallow_clone(
            &self,
            url: &str,
            reference: &str,
            dest: &Path,
            credentials: Option<&HttpCredentials>,
        ) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.0.shallow_clone(url, reference, dest, credentials)
        }
    }

    fn ctx(fixture: &Fixture) -> ServiceContext {
        ServiceContext::deterministic(instant(), Box::new(SharedGit(Arc::clone(&fixture.git))))
    }

    fn run<'a>(config: &'a Config, fixture: &Fixture, remote: RemoteArgs) -> PullRun<'a> {
        PullRun {
            config,
            remote,
            checkout_parent: fixture.parent.path().to_path_buf(),
            credentials: None,
        }
    }

    fn report(fixture: &Fixture, source: &StaticPullRequestSource, run: &PullRun<'_>) -> String {
        fetch_and_report(&ctx(fixture), source, run).unwrap()
    }

    #[test]
    fn generates_report_from_checkouts() {
        let fixture = fixture();
        let config = Config::default();
        let comments = vec![ReviewComment {
            author: "rev".to_string(),
            timestamp: "2024-06-14T09:00:00Z".to_string(),
            body: "Nice".to_string(),
            path: None,
            line: None,
        }];
        let source = StaticPullRequestSource::new(pull_request()).with_comments(comments);

        let text = report(&fixture, &source, &run(&config, &fixture, RemoteArgs::default()));

        let parsed = parse(&text);
        assert_eq!(parsed.added, vec!["README.md"]);
        assert_eq!(parsed.modified, vec!["hello.rs"]);
        assert!(text.contains("Add greeting"));
        assert!(text.contains("### Comment 1 by rev"));
        let cloned: Vec<(String, String)> =
            fixture.git.clones().into_iter().map(|c| (c.url, c.reference)).collect();
        assert_eq!(
            cloned,
            vec![
                ("https://github.com/octo/hello.git".to_string(), "main".to_string()),
                ("https://github.com/fork/hello.git".to_string(), "feature/greet".to_string()),
            ]
        );
    }

    #[test]
    fn workspace_is_removed_unless_kept() {
        let fixture = fixture();
        let config = Config::default();
        let source = StaticPullRequestSource::new(pull_request());

        report(&fixture, &source, &run(&config, &fixture, RemoteArgs::default()));
        assert!(!fixture.parent.path().join("prdiff-run-1").exists());

        let keep = RemoteArgs { keep_checkouts: true, ..RemoteArgs::default() };
        report(&fixture, &source, &run(&config, &fixture, keep));
        assert!(fixture.parent.path().join("prdiff-run-1/head/README.md").exists());
    }

    #[test]
    fn comment_failure_degrades() {
        let fixture = fixture();
        let config = Config::default();
        let source = StaticPullRequestSource::new(pull_request()).with_comment_failure("HTTP 403");

        let text = report(&fixture, &source, &run(&config, &fixture, RemoteArgs::default()));
        assert!(text.contains("_Comments unavailable: HTTP 403_"));
    }

    #[test]
    fn no_comments_skips_fetch_and_section() {
        let fixture = fixture();
        let config = Config::default();
        let source =
            StaticPullRequestSource::new(pull_request()).with_comment_failure("unreachable");
        let remote = RemoteArgs { no_comments: true, ..RemoteArgs::default() };

        let text = report(&fixture, &source, &run(&config, &fixture, remote));
        assert!(!text.contains("unreachable"));
        assert!(!text.contains("## Commentary:"));
    }

    #[test]
    fn clone_failure_is_fatal_and_cleans_up() {
        let fixture = fixture();
        let config = Config::default();
        let mut pr = pull_request();
        pr.head_ref = "deleted-branch".to_string();
        let source = StaticPullRequestSource::new(pr);

        let request = run(&config, &fixture, RemoteArgs::default());
        let err = fetch_and_report(&ctx(&fixture), &source, &request).unwrap_err();
        assert!(err.contains("deleted-branch"));
        assert!(!fixture.parent.path().join("prdiff-run-1").exists());
    }

    #[test]
    fn credentials_travel_beside_the_url() {
        let fixture = fixture();
        let config = Config::default();
        let source = StaticPullRequestSource::new(pull_request());
        let credentials = HttpCredentials::new("x-access-token", "s3cret");
        let mut request = run(&config, &fixture, RemoteArgs::default());
        request.credentials = Some(credentials.clone());

        report(&fixture, &source, &request);
        let clones = fixture.git.clones();
        assert_eq!(clones.len(), 2);
        for StagedClone { url, credentials: passed, .. } in clones {
            assert!(!url.contains("s3cret"), "{url}");
            assert!(!url.contains('@'), "{url}");
            assert_eq!(passed.as_ref(), Some(&credentials));
        }
    }

    #[test]
    fn clone_errors_do_not_echo_the_token() {
        let fixture = fixture();
        let config = Config::default();
        let mut pr = pull_request();
        pr.head_ref = "missing".to_string();
        let source = StaticPullRequestSource::new(pr);
        let mut request = run(&config, &fixture, RemoteArgs::default());
        request.credentials = Some(HttpCredentials::new("x-access-token", "s3cret"));

        let err = fetch_and_report(&ctx(&fixture), &source, &request).unwrap_err();
        assert!(!err.contains("s3cret"));
    }

    #[test]
    fn split_repo_validates_shape() {
        assert_eq!(split_repo("octo/hello").unwrap(), ("octo", "hello"));
        assert!(split_repo("octo").is_err());
        assert!(split_repo("/hello").is_err());
        assert!(split_repo("a/b/c").is_err());
    }

    #[test]
    fn redact_secret_masks_token() {
        let credentials = HttpCredentials::new("u", "tok");
        assert_eq!(
            redact_secret("clone https://u:tok@h failed", Some(&credentials)),
            "clone https://u:***@h failed"
        );
        assert_eq!(redact_secret("plain", None), "plain");
    }
}
