//! # Shared Types Crate
//!
//! Identifiers shared by the uniqueness checker, its IPC surface and the
//! test suite.
//!
//! ## Design Principles
//!
//! - **Opaque identifiers**: the checker reasons only about transaction ids
//!   and state references, never about ledger state content.
//! - **One textual form**: `StateRef` renders as `"<txId>:<index>"` and parses
//!   back from exactly that form; every crate uses these impls.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
