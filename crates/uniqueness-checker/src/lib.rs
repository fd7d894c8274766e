//! # Uniqueness Checker
//!
//! Double-spend prevention for a permissioned ledger. Certifies, per
//! transaction, that its input states are unconsumed, its reference states
//! valid, and its time window open, against a shared, locked backing store.
//!
//! ## Architecture
//!
//! - **Domain**: Requests, verdicts, validation, time window
//! - **Algorithms**: Conflict detection with intra-batch reservations
//! - **Ports**: Inbound (UniquenessCheckerApi) and Outbound (BackingStore, BackingStoreSession, Clock)
//! - **Adapters**: In-memory row-locking store, clocks, fault injection
//! - **Application**: Batch orchestration, one atomic session per holding identity
//! - **IPC**: Wire payloads and the batch handler
//!
//! ## Guarantees
//!
//! - No two accepted transactions consume the same state.
//! - Resubmitting a transaction id replays the stored verdict.
//! - Within a batch, arrival order decides which of two spends wins.
//! - A store fault fails the affected group and persists nothing of it.

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ipc;
pub mod metrics;
pub mod ports;

pub use adapters::{InMemoryBackingStore, ManualClock, MonotonicClock, SystemClock};
#[cfg(any(test, feature = "test-utils"))]
pub use adapters::{FaultInjectingStore, FaultPlan};
pub use application::service::UniquenessCheckService;
pub use config::UniquenessConfig;
pub use domain::entities::*;
pub use domain::errors::{BackingStoreError, UniquenessCheckError, UniquenessError};
pub use domain::value_objects::*;
pub use ipc::{
    ResultPayload, UniquenessCheckHandler, UniquenessCheckRequestPayload,
    UniquenessCheckResponsePayload,
};
pub use ports::inbound::UniquenessCheckerApi;
pub use ports::outbound::{BackingStore, BackingStoreSession, Clock};
