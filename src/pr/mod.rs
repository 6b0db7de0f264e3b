//! Pull request metadata and review comments, independent of the host.
//!
//! Host payloads are deserialized into typed structs in [`github`] and
//! [`azure`] and converted into the types below.

pub mod azure;
pub mod github;

use serde::{Deserialize, Serialize};

/// Host-independent pull request metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Pull request number or ID as shown by the host.
    pub id: String,
    /// Repository identifier (`owner/repo` or `org/project/repo`).
    pub repository: String,
    /// Pull request title.
    pub title: String,
    /// Display name or login of the author.
    pub author: String,
    /// Description body, if any.
    #[serde(default)]
    pub description: Option<String>,
    /// Target branch name, without `refs/heads/`.
    pub base_ref: String,
    /// Source branch name, without `refs/heads/`.
    pub head_ref: String,
    /// Web URL of the pull request.
    pub source_url: String,
    /// Clone URL of the repository holding the base branch.
    pub base_clone_url: String,
    /// Clone URL of the repository holding the head branch (differs for forks).
    pub head_clone_url: String,
}

/// A conversation or inline review comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewComment {
    /// Display name or login.
    pub author: String,
    /// Creation time as reported by the host, passed through verbatim.
    pub timestamp: String,
    /// Comment text.
    pub body: String,
    /// File the comment is anchored to, for inline comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Line the comment is anchored to, for inline comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
}

/// Strips a leading `refs/heads/` from a branch reference.
#[must_use]
pub fn short_ref(reference: &str) -> &str {
    reference.strip_prefix("refs/heads/").unwrap_or(reference)
}

/// Removes any userinfo from a URL so it can be logged.
#[must_use]
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let (authority, path) = rest.split_once('/').map_or((rest, ""), |(a, p)| (a, p));
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    if path.is_empty() && !rest.contains('/') {
        format!("{scheme}://{host}")
    } else {
        format!("{scheme}://{host}/{path}")
    }
}

/// Parses a JSON array of [`ReviewComment`] records.
///
/// # Errors
///
/// Returns an error if the text is not a JSON array of comments.
pub fn parse_comments(json: &str) -> Result<Vec<ReviewComment>, serde_json::Error> {
    serde_json::from_str(json)
}
