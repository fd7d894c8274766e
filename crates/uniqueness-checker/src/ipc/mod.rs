//! IPC Module for the Uniqueness Checker
//!
//! ## Boundaries
//!
//! - Accept: batches of `UniquenessCheckRequestPayload`
//! - Send: one `UniquenessCheckResponsePayload` per item, in item order

pub mod handler;
pub mod payloads;

pub use handler::UniquenessCheckHandler;
pub use payloads::*;
