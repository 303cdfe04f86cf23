//! Output for a gate run.
//!
//! - [`terminal`] — colored diagnostic lines and an optional restricted-dependency table.
//! - [`json`] — a single machine-readable document for CI tooling.

pub mod json;
pub mod terminal;
