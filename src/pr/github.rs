//! GitHub REST payloads for pull requests and their comments.

use serde::Deserialize;

use crate::pr::{PullRequest, ReviewComment};

/// Author shown for comments whose account was deleted.
const GHOST_LOGIN: &str = "ghost";

/// `GET /repos/{owner}/{repo}/pulls/{number}` response (fields we use).
#[derive(Debug, Deserialize)]
pub struct GhPullRequest {
    number: u64,
    title: String,
    html_url: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    user: Option<GhUser>,
    base: GhBranch,
    head: GhBranch,
}

#[derive(Debug, Deserialize)]
struct GhUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhBranch {
    #[serde(rename = "ref")]
    name: String,
    /// `null` when the head fork was deleted.
    #[serde(default)]
    repo: Option<GhRepo>,
}

#[derive(Debug, Deserialize)]
struct GhRepo {
    clone_url: String,
}

/// Element of `GET /repos/{owner}/{repo}/issues/{number}/comments`.
#[derive(Debug, Deserialize)]
pub struct GhIssueComment {
    #[serde(default)]
    user: Option<GhUser>,
    created_at: String,
    #[serde(default)]
    body: Option<String>,
}

/// Element of `GET /repos/{owner}/{repo}/pulls/{number}/comments`.
#[derive(Debug, Deserialize)]
pub struct GhReviewComment {
    #[serde(default)]
    user: Option<GhUser>,
    created_at: String,
    #[serde(default)]
    body: Option<String>,
    path: String,
    #[serde(default)]
    line: Option<u64>,
    #[serde(default)]
    original_line: Option<u64>,
}

impl GhPullRequest {
    /// Converts the payload, labelling it with `repository` (`owner/repo`).
    ///
    /// # Errors
    ///
    /// Returns an error if the base repository is missing from the payload.
    pub fn into_pull_request(self, repository: &str) -> Result<PullRequest, String> {
        let base_clone_url = self
            .base
            .repo
            .map(|r| r.clone_url)
            .ok_or_else(|| format!("pull request #{} has no base repository", self.number))?;
        let head_clone_url =
            self.head.repo.map_or_else(|| base_clone_url.clone(), |r| r.clone_url);
        Ok(PullRequest {
            id: self.number.to_string(),
            repository: repository.to_string(),
            title: self.title,
            author: login(self.user),
            description: self.body.filter(|b| !b.trim().is_empty()),
            base_ref: self.base.name,
            head_ref: self.head.name,
            source_url: self.html_url,
            base_clone_url,
            head_clone_url,
        })
    }
}

fn login(user: Option<GhUser>) -> String {
    user.map_or_else(|| GHOST_LOGIN.to_string(), |u| u.login)
}

/// Merges conversation and review comments into one list ordered by time.
///
/// The sort is stable, so comments with equal timestamps keep conversation
/// comments ahead of review comments.
#[must_use]
pub fn merge_comments(
    issue_comments: Vec<GhIssueComment>,
    review_comments: Vec<GhReviewComment>,
) -> Vec<ReviewComment> {
    let mut comments: Vec<ReviewComment> = issue_comments
        .into_iter()
        .map(|c| ReviewComment {
            author: login(c.user),
            timestamp: c.created_at,
            body: c.body.unwrap_or_default(),
            path: None,
            line: None,
        })
        .chain(review_comments.into_iter().map(|c| ReviewComment {
            author: login(c.user),
            timestamp: c.created_at,
            body: c.body.unwrap_or_default(),
            path: Some(c.path),
            line: c.line.or(c.original_line),
        }))
        .collect();
    comments.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    comments
}
