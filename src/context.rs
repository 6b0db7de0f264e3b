//! Service context bundling all port trait objects.

use chrono::{DateTime, Utc};

use crate::adapters::fixed::{FixedClock, SequentialIdGenerator};
use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::git::LiveGitRepo;
use crate::adapters::live::id_gen::LiveIdGenerator;
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::git::GitRepo;
use crate::ports::id_gen::IdGenerator;

/// Bundles the port trait objects a report run needs.
///
/// Pull request sources are not part of the context: they are built per
/// invocation from the command-line target.
pub struct ServiceContext {
    /// Clock for the report timestamp.
    pub clock: Box<dyn Clock>,
    /// Filesystem for tree walks and file reads.
    pub fs: Box<dyn FileSystem>,
    /// Git for branch checkouts.
    pub git: Box<dyn GitRepo>,
    /// ID generator for checkout workspace names.
    pub id_gen: Box<dyn IdGenerator>,
}

impl ServiceContext {
    /// Creates a live context with real adapters for every port.
    #[must_use]
    pub fn live() -> Self {
        Self {
            clock: Box::new(LiveClock),
            fs: Box::new(LiveFileSystem),
            git: Box::new(LiveGitRepo),
            id_gen: Box::new(LiveIdGenerator),
        }
    }

    /// Creates a context with a frozen clock and sequential IDs.
    ///
    /// The filesystem is real; `git` is supplied by the caller so tests can
    /// stage branch contents.
    #[must_use]
    pub fn deterministic(instant: DateTime<Utc>, git: Box<dyn GitRepo>) -> Self {
        Self {
            clock: Box::new(FixedClock::new(instant)),
            fs: Box::new(LiveFileSystem),
            git,
            id_gen: Box::new(SequentialIdGenerator::new("run")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixed::StagedGitRepo;

    #[test]
    fn deterministic_context_is_repeatable() {
        let instant =
            DateTime::parse_from_rfc3339("2024-06-15T10:30:00Z").unwrap().with_timezone(&Utc);
        let ctx = ServiceContext::deterministic(instant, Box::new(StagedGitRepo::new()));
        assert_eq!(ctx.clock.now().to_rfc3339(), "2024-06-15T10:30:00+00:00");
        assert_eq!(ctx.id_gen.generate_id(), "run-1");
        assert_eq!(ctx.id_gen.generate_id(), "run-2");
        assert!(ctx.git.available());
    }

    #[test]
    fn live_context_generates_distinct_ids() {
        let ctx = ServiceContext::live();
        assert_ne!(ctx.id_gen.generate_id(), ctx.id_gen.generate_id());
    }
}
