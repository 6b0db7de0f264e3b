//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the report pipeline and an
//! external system (time, filesystem, git, IDs, pull request hosts).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod git;
pub mod id_gen;
pub mod pull_requests;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use git::GitRepo;
pub use id_gen::IdGenerator;
pub use pull_requests::{PrFuture, PullRequestSource};
