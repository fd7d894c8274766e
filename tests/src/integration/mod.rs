//! Cross-crate integration tests for the uniqueness checker.

pub mod fixtures;

mod ipc;
mod properties;
mod scenarios;
