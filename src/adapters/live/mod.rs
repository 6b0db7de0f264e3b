//! Live adapters for real external interactions.

pub mod azure;
pub mod clock;
pub mod filesystem;
pub mod git;
pub mod github;
pub mod id_gen;
