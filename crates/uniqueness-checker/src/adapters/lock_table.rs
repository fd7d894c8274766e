//! Row lock table
//!
//! Pessimistic, exclusive, per-row locks owned by sessions. A session that
//! touches a row owns it until it releases all of its rows at commit or
//! rollback; competitors block until then, or until their timeout expires.

use crate::domain::errors::BackingStoreError;
use parking_lot::{Condvar, Mutex};
use shared_types::{StateRef, TransactionId};
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Identifier of a session within one store.
pub type SessionId = u64;

/// A lockable row.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RowKey {
    /// The transaction-details row of a transaction id.
    Transaction(TransactionId),
    /// The state-status row of a state reference.
    State(StateRef),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transaction(tx_id) => write!(f, "transaction {tx_id}"),
            Self::State(state) => write!(f, "state {state}"),
        }
    }
}

/// Exclusive row locks for one store partition.
#[derive(Debug, Default)]
pub struct RowLockTable {
    owners: Mutex<HashMap<RowKey, SessionId>>,
    released: Condvar,
}

impl RowLockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire `key` for `session`, waiting up to `timeout`.
    ///
    /// Returns `Ok(true)` if newly acquired, `Ok(false)` if the session already
    /// held it.
    pub fn acquire(
        &self,
        key: &RowKey,
        session: SessionId,
        timeout: Duration,
    ) -> Result<bool, BackingStoreError> {
        let started = Instant::now();
        let deadline = started + timeout;
        let mut owners = self.owners.lock();

        loop {
            match owners.get(key) {
                None => {
                    owners.insert(key.clone(), session);
                    return Ok(true);
                }
                Some(owner) if *owner == session => return Ok(false),
                Some(_) => {
                    let timed_out = self.released.wait_until(&mut owners, deadline).timed_out();
                    let still_held = owners.get(key).is_some_and(|owner| *owner != session);
                    if timed_out && still_held {
                        return Err(BackingStoreError::LockTimeout {
                            row: key.to_string(),
                            waited_ms: started.elapsed().as_millis() as u64,
                        });
                    }
                }
            }
        }
    }

    /// Release every listed row held by `session` and wake waiters.
    pub fn release_all<'a>(&self, session: SessionId, keys: impl IntoIterator<Item = &'a RowKey>) {
        let mut owners = self.owners.lock();
        for key in keys {
            if owners.get(key) == Some(&session) {
                owners.remove(key);
            }
        }
        drop(owners);
        self.released.notify_all();
    }

    /// Current owner of a row, if any.
    pub fn holder(&self, key: &RowKey) -> Option<SessionId> {
        self.owners.lock().get(key).copied()
    }

    /// Number of rows currently locked.
    pub fn locked_count(&self) -> usize {
        self.owners.lock().len()
    }
}
