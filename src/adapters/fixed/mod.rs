//! Deterministic adapters that serve predetermined values.

pub mod clock;
pub mod git;
pub mod id_gen;
pub mod pull_requests;

pub use clock::FixedClock;
pub use git::{StagedClone, StagedGitRepo};
pub use id_gen::SequentialIdGenerator;
pub use pull_requests::StaticPullRequestSource;
