//! Fixed adapter for the `PullRequestSource` port.

use crate::ports::pull_requests::{PrFuture, PullRequestSource};
use crate::pr::{PullRequest, ReviewComment};

/// Returns a fixed pull request and a fixed comment result.
pub struct StaticPullRequestSource {
    pull_request: PullRequest,
    comments: Result<Vec<ReviewComment>, String>,
}

impl StaticPullRequestSource {
    /// Serves `pull_request` with no comments.
    #[must_use]
    pub fn new(pull_request: PullRequest) -> Self {
        Self { pull_request, comments: Ok(Vec::new()) }
    }

    /// Serves `comments` from `fetch_comments`.
    #[must_use]
    pub fn with_comments(mut self, comments: Vec<ReviewComment>) -> Self {
        self.comments = Ok(comments);
        self
    }

    /// Makes `fetch_comments` fail with `reason`.
    #[must_use]
    pub fn with_comment_failure(mut self, reason: &str) -> Self {
        self.comments = Err(reason.to_string());
        self
    }
}

impl PullRequestSource for StaticPullRequestSource {
    fn fetch_metadata(&self) -> PrFuture<'_, PullRequest> {
        let pull_request = self.pull_request.clone();
        Box::pin(async move { Ok::<_, Box<dyn std::error::Error + Send + Sync>>(pull_request) })
    }

    fn fetch_comments(&self) -> PrFuture<'_, Vec<ReviewComment>> {
        let comments = self.comments.clone();
        Box::pin(async move {
            comments.map_err(|reason| -> Box<dyn std::error::Error + Send + Sync> { reason.into() })
        })
    }
}
