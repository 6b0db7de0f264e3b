//! Azure DevOps REST payloads for pull requests and comment threads.

use serde::Deserialize;

use crate::pr::{short_ref, PullRequest, ReviewComment};

/// Identifies one pull request on Azure DevOps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureTarget {
    /// Organization name.
    pub organization: String,
    /// Project name.
    pub project: String,
    /// Repository name.
    pub repository: String,
    /// Pull request ID.
    pub id: u64,
}

impl AzureTarget {
    /// Web URL of the pull request.
    #[must_use]
    pub fn web_url(&self) -> String {
        format!(
            "https://dev.azure.com/{}/{}/_git/{}/pullrequest/{}",
            self.organization, self.project, self.repository, self.id
        )
    }

    /// `org/project/repo` label used in reports.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/{}/{}", self.organization, self.project, self.repository)
    }
}

/// `GET .../pullrequests/{id}` response (fields we use).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzPullRequest {
    pull_request_id: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    created_by: AzIdentity,
    source_ref_name: String,
    target_ref_name: String,
    repository: AzRepository,
    #[serde(default)]
    fork_source: Option<AzForkSource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzIdentity {
    display_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzRepository {
    remote_url: String,
}

#[derive(Debug, Deserialize)]
struct AzForkSource {
    repository: AzRepository,
}

/// `GET .../pullRequests/{id}/threads` response.
#[derive(Debug, Deserialize)]
pub struct AzThreadList {
    value: Vec<AzThread>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzThread {
    #[serde(default)]
    is_deleted: bool,
    #[serde(default)]
    thread_context: Option<AzThreadContext>,
    #[serde(default)]
    comments: Vec<AzComment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzThreadContext {
    #[serde(default)]
    file_path: Option<String>,
    #[serde(default)]
    right_file_start: Option<AzPosition>,
    #[serde(default)]
    left_file_start: Option<AzPosition>,
}

#[derive(Debug, Deserialize)]
struct AzPosition {
    line: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzComment {
    author: AzIdentity,
    published_date: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    comment_type: Option<String>,
    #[serde(default)]
    is_deleted: bool,
}

impl AzPullRequest {
    /// Converts the payload into host-independent metadata.
    #[must_use]
    pub fn into_pull_request(self, target: &AzureTarget) -> PullRequest {
        let base_clone_url = self.repository.remote_url;
        let head_clone_url =
            self.fork_source.map_or_else(|| base_clone_url.clone(), |f| f.repository.remote_url);
        PullRequest {
            id: self.pull_request_id.to_string(),
            repository: target.label(),
            title: self.title,
            author: self.created_by.display_name,
            description: self.description.filter(|d| !d.trim().is_empty()),
            base_ref: short_ref(&self.target_ref_name).to_string(),
            head_ref: short_ref(&self.source_ref_name).to_string(),
            source_url: target.web_url(),
            base_clone_url,
            head_clone_url,
        }
    }
}

impl AzThreadList {
    /// Flattens threads into comments ordered by publish time.
    ///
    /// System-generated and deleted comments are dropped.
    #[must_use]
    pub fn into_comments(self) -> Vec<ReviewComment> {
        let mut comments = Vec::new();
        for thread in self.value.into_iter().filter(|t| !t.is_deleted) {
            let (path, line) = thread.thread_context.map_or((None, None), |ctx| {
                let line = ctx.right_file_start.or(ctx.left_file_start).map(|p| p.line);
                (ctx.file_path.map(|p| p.trim_start_matches('/').to_string()), line)
            });
            for comment in thread.comments {
                if comment.is_deleted || comment.comment_type.as_deref() == Some("system") {
                    continue;
                }
                comments.push(ReviewComment {
                    author: comment.author.display_name,
                    timestamp: comment.published_date,
                    body: comment.content.unwrap_or_default(),
                    path: path.clone(),
                    line,
                });
            }
        }
        comments.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        comments
    }
}
