//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits: clocks and the in-memory backing store
//! with pessimistic row locking.

mod clock;
#[cfg(any(test, feature = "test-utils"))]
mod fault_injection;
mod lock_table;
mod memory_store;

pub use clock::{ManualClock, MonotonicClock, SystemClock};
#[cfg(any(test, feature = "test-utils"))]
pub use fault_injection::{FaultInjectingStore, FaultPlan};
pub use lock_table::{RowKey, RowLockTable, SessionId};
pub use memory_store::{InMemoryBackingStore, InMemorySession};
