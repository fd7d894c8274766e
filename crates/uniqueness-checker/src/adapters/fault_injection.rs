//! Fault-injecting backing store for tests.
//!
//! Wraps another store and fails selected operations on demand.

use crate::domain::entities::{StateStatus, TransactionDetails};
use crate::domain::errors::BackingStoreError;
use crate::ports::outbound::{BackingStore, BackingStoreSession, Clock};
use shared_types::{HoldingIdentity, StateRef, Timestamp, TransactionId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Which operations should fail. Shared between the store and the test.
#[derive(Debug, Default)]
pub struct FaultPlan {
    fail_open: AtomicBool,
    fail_find: AtomicBool,
    fail_state_status: AtomicBool,
    fail_commit: AtomicBool,
}

impl FaultPlan {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_open(&self, enabled: bool) {
        self.fail_open.store(enabled, Ordering::SeqCst);
    }

    pub fn fail_find(&self, enabled: bool) {
        self.fail_find.store(enabled, Ordering::SeqCst);
    }

    pub fn fail_state_status(&self, enabled: bool) {
        self.fail_state_status.store(enabled, Ordering::SeqCst);
    }

    pub fn fail_commit(&self, enabled: bool) {
        self.fail_commit.store(enabled, Ordering::SeqCst);
    }

    /// Clear every injected fault.
    pub fn heal(&self) {
        self.fail_open(false);
        self.fail_find(false);
        self.fail_state_status(false);
        self.fail_commit(false);
    }

    fn check(flag: &AtomicBool, operation: &str) -> Result<(), BackingStoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(BackingStoreError::InjectedFault(format!("{operation} failed")));
        }
        Ok(())
    }
}

/// A [`BackingStore`] that fails according to a [`FaultPlan`].
pub struct FaultInjectingStore {
    inner: Arc<dyn BackingStore>,
    plan: Arc<FaultPlan>,
}

impl FaultInjectingStore {
    pub fn new(inner: Arc<dyn BackingStore>, plan: Arc<FaultPlan>) -> Self {
        Self { inner, plan }
    }
}

impl BackingStore for FaultInjectingStore {
    fn open_session(
        &self,
        holding_identity: &HoldingIdentity,
    ) -> Result<Box<dyn BackingStoreSession>, BackingStoreError> {
        FaultPlan::check(&self.plan.fail_open, "open_session")?;
        Ok(Box::new(FaultInjectingSession {
            inner: self.inner.open_session(holding_identity)?,
            plan: self.plan.clone(),
        }))
    }
}

struct FaultInjectingSession {
    inner: Box<dyn BackingStoreSession>,
    plan: Arc<FaultPlan>,
}

impl BackingStoreSession for FaultInjectingSession {
    fn find_transaction(
        &mut self,
        tx_id: &TransactionId,
    ) -> Result<Option<TransactionDetails>, BackingStoreError> {
        FaultPlan::check(&self.plan.fail_find, "find_transaction")?;
        self.inner.find_transaction(tx_id)
    }

    fn state_status(&mut self, state_ref: &StateRef) -> Result<StateStatus, BackingStoreError> {
        FaultPlan::check(&self.plan.fail_state_status, "state_status")?;
        self.inner.state_status(state_ref)
    }

    fn reserve(&mut self, tx_id: &TransactionId, inputs: &[StateRef], num_outputs: u32) {
        self.inner.reserve(tx_id, inputs, num_outputs);
    }

    fn commit(
        self: Box<Self>,
        details: Vec<TransactionDetails>,
        clock: &dyn Clock,
    ) -> Result<Timestamp, BackingStoreError> {
        if let Err(err) = FaultPlan::check(&self.plan.fail_commit, "commit") {
            self.inner.rollback();
            return Err(err);
        }
        self.inner.commit(details, clock)
    }

    fn rollback(self: Box<Self>) {
        self.inner.rollback();
    }
}
