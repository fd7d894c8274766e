//! In-memory backing store
//!
//! One partition per holding identity. Each partition holds two tables:
//!
//! ```text
//! transactions: TransactionId -> TransactionDetails
//! states:       StateRef      -> Option<TransactionId>   (None = free)
//! ```
//!
//! Sessions lock every row they read and keep their writes in a private
//! overlay until commit. Commit re-verifies the consumed-state invariant
//! against the committed tables before applying anything, and stamps every
//! row with one commit instant that never decreases within the partition.

use super::lock_table::{RowKey, RowLockTable, SessionId};
use crate::config::UniquenessConfig;
use crate::domain::entities::{StateStatus, TransactionDetails};
use crate::domain::errors::BackingStoreError;
use crate::ports::outbound::{BackingStore, BackingStoreSession, Clock};
use parking_lot::RwLock;
use shared_types::{HoldingIdentity, StateRef, Timestamp, TransactionId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct Tables {
    transactions: HashMap<TransactionId, TransactionDetails>,
    states: HashMap<StateRef, Option<TransactionId>>,
    /// Highest commit instant handed out by this partition.
    last_commit: Timestamp,
}

impl Tables {
    fn status(&self, state: &StateRef) -> StateStatus {
        match self.states.get(state) {
            None => StateStatus::Unknown,
            Some(None) => StateStatus::Free,
            Some(Some(consumer)) => StateStatus::ConsumedBy(*consumer),
        }
    }
}

#[derive(Debug, Default)]
struct Partition {
    tables: RwLock<Tables>,
    locks: RowLockTable,
}

/// Backing store kept entirely in process memory.
#[derive(Debug)]
pub struct InMemoryBackingStore {
    partitions: RwLock<HashMap<HoldingIdentity, Arc<Partition>>>,
    lock_timeout: Duration,
    next_session: AtomicU64,
}

impl InMemoryBackingStore {
    /// Store with the default lock timeout.
    pub fn new() -> Self {
        Self::from_config(&UniquenessConfig::default())
    }

    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            partitions: RwLock::new(HashMap::new()),
            lock_timeout,
            next_session: AtomicU64::new(1),
        }
    }

    pub fn from_config(config: &UniquenessConfig) -> Self {
        Self::with_lock_timeout(config.lock_timeout())
    }

    fn partition(&self, holding_identity: &HoldingIdentity) -> Arc<Partition> {
        if let Some(partition) = self.partitions.read().get(holding_identity) {
            return partition.clone();
        }
        self.partitions
            .write()
            .entry(holding_identity.clone())
            .or_default()
            .clone()
    }

    /// Committed details row for a transaction, bypassing row locks.
    pub fn committed_transaction(
        &self,
        holding_identity: &HoldingIdentity,
        tx_id: &TransactionId,
    ) -> Option<TransactionDetails> {
        self.partition(holding_identity)
            .tables
            .read()
            .transactions
            .get(tx_id)
            .cloned()
    }

    /// Committed status of a state, bypassing row locks.
    pub fn committed_state_status(
        &self,
        holding_identity: &HoldingIdentity,
        state: &StateRef,
    ) -> StateStatus {
        self.partition(holding_identity).tables.read().status(state)
    }

    /// Number of rows currently locked in a partition.
    pub fn locked_rows(&self, holding_identity: &HoldingIdentity) -> usize {
        self.partition(holding_identity).locks.locked_count()
    }
}

impl Default for InMemoryBackingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BackingStore for InMemoryBackingStore {
    fn open_session(
        &self,
        holding_identity: &HoldingIdentity,
    ) -> Result<Box<dyn BackingStoreSession>, BackingStoreError> {
        let session_id = self.next_session.fetch_add(1, Ordering::Relaxed);
        debug!(session_id, holding_identity = %holding_identity, "Opening session");

        Ok(Box::new(InMemorySession {
            partition: self.partition(holding_identity),
            session_id,
            lock_timeout: self.lock_timeout,
            held: Vec::new(),
            overlay: HashMap::new(),
        }))
    }
}

/// Unit of work against one partition of an [`InMemoryBackingStore`].
///
/// Dropping the session releases its locks; uncommitted overlay writes are
/// discarded with it.
#[derive(Debug)]
pub struct InMemorySession {
    partition: Arc<Partition>,
    session_id: SessionId,
    lock_timeout: Duration,
    held: Vec<RowKey>,
    overlay: HashMap<StateRef, StateStatus>,
}

impl InMemorySession {
    fn lock(&mut self, key: RowKey) -> Result<(), BackingStoreError> {
        if self
            .partition
            .locks
            .acquire(&key, self.session_id, self.lock_timeout)?
        {
            self.held.push(key);
        }
        Ok(())
    }

    fn verify(&self, tables: &Tables, details: &[TransactionDetails]) -> Result<(), BackingStoreError> {
        for (state, status) in &self.overlay {
            if let StateStatus::ConsumedBy(consumer) = status {
                if let Some(Some(existing)) = tables.states.get(state) {
                    if existing != consumer {
                        return Err(BackingStoreError::IntegrityViolation(format!(
                            "state {state} already consumed by {existing}, cannot be consumed by {consumer}"
                        )));
                    }
                }
            }
        }

        for row in details {
            if tables.transactions.contains_key(&row.tx_id) {
                return Err(BackingStoreError::IntegrityViolation(format!(
                    "transaction {} already has a stored verdict",
                    row.tx_id
                )));
            }
        }

        Ok(())
    }
}

impl BackingStoreSession for InMemorySession {
    fn find_transaction(
        &mut self,
        tx_id: &TransactionId,
    ) -> Result<Option<TransactionDetails>, BackingStoreError> {
        self.lock(RowKey::Transaction(*tx_id))?;
        Ok(self.partition.tables.read().transactions.get(tx_id).cloned())
    }

    fn state_status(&mut self, state_ref: &StateRef) -> Result<StateStatus, BackingStoreError> {
        if let Some(status) = self.overlay.get(state_ref) {
            return Ok(*status);
        }
        self.lock(RowKey::State(*state_ref))?;
        Ok(self.partition.tables.read().status(state_ref))
    }

    fn reserve(&mut self, tx_id: &TransactionId, inputs: &[StateRef], num_outputs: u32) {
        for input in inputs {
            self.overlay.insert(*input, StateStatus::ConsumedBy(*tx_id));
        }
        for index in 0..num_outputs {
            self.overlay
                .entry(tx_id.output(index))
                .or_insert(StateStatus::Free);
        }
    }

    fn commit(
        self: Box<Self>,
        mut details: Vec<TransactionDetails>,
        clock: &dyn Clock,
    ) -> Result<Timestamp, BackingStoreError> {
        let mut tables = self.partition.tables.write();

        if let Err(err) = self.verify(&tables, &details) {
            warn!(session_id = self.session_id, error = %err, "Commit refused");
            return Err(err);
        }

        for (state, status) in &self.overlay {
            match status {
                StateStatus::ConsumedBy(consumer) => {
                    tables.states.insert(*state, Some(*consumer));
                }
                StateStatus::Free => {
                    tables.states.entry(*state).or_insert(None);
                }
                StateStatus::Unknown => {}
            }
        }

        let commit_timestamp = clock.now().max(tables.last_commit);
        tables.last_commit = commit_timestamp;

        let rows = details.len();
        for row in details.iter_mut() {
            row.commit_timestamp = commit_timestamp;
        }
        for row in details {
            tables.transactions.insert(row.tx_id, row);
        }

        debug!(
            session_id = self.session_id,
            rows,
            states = self.overlay.len(),
            commit_timestamp,
            "Session committed"
        );
        Ok(commit_timestamp)
    }

    fn rollback(self: Box<Self>) {
        debug!(session_id = self.session_id, "Session rolled back");
    }
}

impl Drop for InMemorySession {
    fn drop(&mut self) {
        self.partition.locks.release_all(self.session_id, &self.held);
    }
}
