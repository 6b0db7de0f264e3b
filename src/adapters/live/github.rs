//! Live adapter for the `PullRequestSource` port using the GitHub REST API.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::ports::pull_requests::{PrFuture, PullRequestSource};
use crate::pr::github::{merge_comments, GhIssueComment, GhPullRequest, GhReviewComment};

const GITHUB_API_URL: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("prdiff/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// GitHub caps `per_page` at 100.
const PAGE_SIZE: u32 = 100;

/// Live GitHub client for a single pull request.
pub struct LiveGitHub {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
    number: u64,
    token: Option<String>,
}

impl LiveGitHub {
    /// Creates a client for `owner/repo#number`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        owner: &str,
        repo: &str,
        number: u64,
        token: Option<String>,
    ) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            api_url: GITHUB_API_URL.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            token,
        })
    }

    /// Points the client at a different API root (GitHub Enterprise).
    #[must_use]
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    /// Issues a GET against `path` and decodes the JSON body.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, Box<dyn std::error::Error + Send + Sync>> {
        let url = format!("{}{path}", self.api_url);
        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        log::debug!("GET {url}");

        let response =
            request.send().await.map_err(|e| format!("GitHub request to {url} failed: {e}"))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("failed to read GitHub response from {url}: {e}"))?;
        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or(text);
            return Err(format!("GitHub API error ({}): {message}", status.as_u16()).into());
        }
        Ok(serde_json::from_str(&text)
            .map_err(|e| format!("failed to parse GitHub response from {url}: {e}"))?)
    }

    /// Collects every page of a list endpoint.
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, Box<dyn std::error::Error + Send + Sync>> {
        let mut items = Vec::new();
        for page in 1.. {
            let url = format!("{path}?per_page={PAGE_SIZE}&page={page}");
            let batch: Vec<T> = self.get(&url).await?;
            let done = batch.len() < PAGE_SIZE as usize;
            items.extend(batch);
            if done {
                break;
            }
        }
        Ok(items)
    }

    fn repo_path(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.repo)
    }
}

impl PullRequestSource for LiveGitHub {
    fn fetch_metadata(&self) -> PrFuture<'_, crate::pr::PullRequest> {
        Box::pin(async move {
            let payload: GhPullRequest =
                self.get(&format!("{}/pulls/{}", self.repo_path(), self.number)).await?;
            let label = format!("{}/{}", self.owner, self.repo);
            Ok(payload.into_pull_request(&label)?)
        })
    }

    fn fetch_comments(&self) -> PrFuture<'_, Vec<crate::pr::ReviewComment>> {
        Box::pin(async move {
            let repo = self.repo_path();
            let issue: Vec<GhIssueComment> =
                self.get_all(&format!("{repo}/issues/{}/comments", self.number)).await?;
            let review: Vec<GhReviewComment> =
                self.get_all(&format!("{repo}/pulls/{}/comments", self.number)).await?;
            Ok(merge_comments(issue, review))
        })
    }
}
