//! Pull request source port: metadata and review comments.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

use crate::pr::{PullRequest, ReviewComment};

/// Boxed future type alias used by [`PullRequestSource`] to keep the trait dyn-compatible.
pub type PrFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, Box<dyn Error + Send + Sync>>> + Send + 'a>>;

/// Fetches one pull request from a hosting service.
pub trait PullRequestSource: Send + Sync {
    /// Fetches title, refs and clone URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails (network, auth, not found).
    fn fetch_metadata(&self) -> PrFuture<'_, PullRequest>;

    /// Fetches conversation and inline review comments, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn fetch_comments(&self) -> PrFuture<'_, Vec<ReviewComment>>;
}
