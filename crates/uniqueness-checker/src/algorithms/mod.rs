//! Algorithms module for the Uniqueness Checker
//!
//! Contains:
//! - Conflict detector (unknown/consumed classification with batch overlay)

pub mod conflict_detector;

pub use conflict_detector::{check_states, StateCheckOutcome};
