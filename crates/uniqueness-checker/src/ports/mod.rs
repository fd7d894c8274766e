//! Ports module for the Uniqueness Checker
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::UniquenessCheckerApi;
pub use outbound::{BackingStore, BackingStoreSession, Clock};
