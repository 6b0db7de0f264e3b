//! Live adapter for the `PullRequestSource` port using the Azure DevOps REST API.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::ports::pull_requests::{PrFuture, PullRequestSource};
use crate::pr::azure::{AzPullRequest, AzThreadList, AzureTarget};

const AZURE_DEVOPS_URL: &str = "https://dev.azure.com";
const API_VERSION: &str = "7.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Live Azure DevOps client for a single pull request.
pub struct LiveAzureDevOps {
    client: Client,
    base_url: String,
    target: AzureTarget,
    pat: Option<String>,
}

impl LiveAzureDevOps {
    /// Creates a client for `target`, authenticating with a personal access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(target: AzureTarget, pat: Option<String>) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self { client, base_url: AZURE_DEVOPS_URL.to_string(), target, pat })
    }

    fn repo_api(&self) -> String {
        format!(
            "{}/{}/{}/_apis/git/repositories/{}",
            self.base_url, self.target.organization, self.target.project, self.target.repository
        )
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, Box<dyn std::error::Error + Send + Sync>> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(pat) = &self.pat {
            request = request.basic_auth("", Some(pat));
        }
        log::debug!("GET {url}");

        let response =
            request.send().await.map_err(|e| format!("Azure DevOps request to {url} failed: {e}"))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("failed to read Azure DevOps response from {url}: {e}"))?;
        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or(text);
            return Err(format!("Azure DevOps API error ({}): {message}", status.as_u16()).into());
        }
        // Unauthenticated requests are redirected to an HTML sign-in page with 200.
        Ok(serde_json::from_str(&text).map_err(|e| {
            format!(
                "failed to parse Azure DevOps response from {url} (check AZURE_DEVOPS_PAT): {e}"
            )
        })?)
    }
}

impl PullRequestSource for LiveAzureDevOps {
    fn fetch_metadata(&self) -> PrFuture<'_, crate::pr::PullRequest> {
        Box::pin(async move {
            let url = format!(
                "{}/pullrequests/{}?api-version={API_VERSION}",
                self.repo_api(),
                self.target.id
            );
            let payload: AzPullRequest = self.get(&url).await?;
            Ok(payload.into_pull_request(&self.target))
        })
    }

    fn fetch_comments(&self) -> PrFuture<'_, Vec<crate::pr::ReviewComment>> {
        Box::pin(async move {
            let url = format!(
                "{}/pullRequests/{}/threads?api-version={API_VERSION}",
                self.repo_api(),
                self.target.id
            );
            let threads: AzThreadList = self.get(&url).await?;
            Ok(threads.into_comments())
        })
    }
}
