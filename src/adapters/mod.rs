//! Adapter implementations for the port traits.
//!
//! `live` talks to the real world; `fixed` returns predetermined values so
//! runs are reproducible in tests.

pub mod fixed;
pub mod live;
