//! Outbound Ports (Driven Ports / SPI)
//!
//! The checker never touches storage directly; everything goes through a
//! `BackingStoreSession`, one per holding identity per batch.

use crate::domain::entities::{StateStatus, TransactionDetails};
use crate::domain::errors::BackingStoreError;
use shared_types::{HoldingIdentity, StateRef, Timestamp, TransactionId};

/// Time source for result timestamps.
///
/// Abstracted to allow testing with deterministic time.
pub trait Clock: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Durable, lockable store of transaction and state-consumption records.
pub trait BackingStore: Send + Sync {
    /// Open a unit of work against the partition of `holding_identity`.
    fn open_session(
        &self,
        holding_identity: &HoldingIdentity,
    ) -> Result<Box<dyn BackingStoreSession>, BackingStoreError>;
}

/// A unit of work holding exclusive locks on every row it touches.
///
/// Locks are held until `commit` or `rollback`. Dropping an unfinished session
/// rolls it back.
pub trait BackingStoreSession: Send {
    /// Look up the stored verdict for a transaction id.
    fn find_transaction(
        &mut self,
        tx_id: &TransactionId,
    ) -> Result<Option<TransactionDetails>, BackingStoreError>;

    /// Status of a state, including this session's uncommitted reservations.
    fn state_status(&mut self, state_ref: &StateRef) -> Result<StateStatus, BackingStoreError>;

    /// Record, in the session overlay, that `tx_id` consumes `inputs` and
    /// creates `num_outputs` new states.
    fn reserve(&mut self, tx_id: &TransactionId, inputs: &[StateRef], num_outputs: u32);

    /// Durably apply the overlay and the given details rows, all or nothing.
    ///
    /// The commit instant is read from `clock` while the store's commit lock
    /// is held, never below any instant the store already committed, and is
    /// written into every details row. Returns that instant.
    fn commit(
        self: Box<Self>,
        details: Vec<TransactionDetails>,
        clock: &dyn Clock,
    ) -> Result<Timestamp, BackingStoreError>;

    /// Discard everything written in this session.
    fn rollback(self: Box<Self>);
}
