//! Error types for the Uniqueness Checker
//!
//! Two families, kept apart on purpose:
//!
//! - `UniquenessCheckError`: per-request verdicts returned to callers.
//!   Client errors are deterministic; `UnhandledException` wraps a platform fault.
//! - `BackingStoreError`: platform faults raised by the backing store. They never
//!   reach callers directly; the orchestrator collapses them into
//!   `UniquenessCheckError::UnhandledException`.

use super::value_objects::{ConflictingState, ErrorKind};
use serde::{Deserialize, Serialize};
use shared_types::{StateRef, Timestamp};
use thiserror::Error;

/// Why a single request was not certified.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum UniquenessCheckError {
    /// Request failed structural validation.
    #[error("Malformed request: {error_text}")]
    MalformedRequest { error_text: String },

    /// Input states never created by any known transaction.
    #[error("{} input state(s) unknown", unknown_states.len())]
    InputStateUnknown { unknown_states: Vec<StateRef> },

    /// Input states already consumed by other transactions.
    #[error("{} input state(s) already consumed", conflicting_states.len())]
    InputStateConflict {
        conflicting_states: Vec<ConflictingState>,
    },

    /// Reference states never created by any known transaction.
    #[error("{} reference state(s) unknown", unknown_states.len())]
    ReferenceStateUnknown { unknown_states: Vec<StateRef> },

    /// Reference states already consumed by other transactions.
    #[error("{} reference state(s) already consumed", conflicting_states.len())]
    ReferenceStateConflict {
        conflicting_states: Vec<ConflictingState>,
    },

    /// The evaluation instant is at or past the upper bound.
    #[error(
        "Time window out of bounds: evaluated at {evaluation_timestamp}, window [{lower_bound:?}, {upper_bound})"
    )]
    TimeWindowOutOfBounds {
        evaluation_timestamp: Timestamp,
        lower_bound: Option<Timestamp>,
        upper_bound: Timestamp,
    },

    /// The evaluation instant is before the lower bound.
    #[error("Time window not yet open: evaluated at {evaluation_timestamp}, opens at {lower_bound}")]
    TimeWindowBeforeLowerBound {
        evaluation_timestamp: Timestamp,
        lower_bound: Timestamp,
    },

    /// Read-only check for a transaction the checker has never certified.
    #[error("Transaction not previously seen")]
    NotPreviouslySeenTransaction,

    /// Platform fault while processing the request.
    #[error("Unhandled exception ({exception_type}): {message}")]
    UnhandledException {
        exception_type: String,
        message: String,
    },
}

impl UniquenessCheckError {
    /// The wire-level category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedRequest { .. } => ErrorKind::MalformedRequest,
            Self::InputStateUnknown { .. } => ErrorKind::InputStateUnknown,
            Self::InputStateConflict { .. } => ErrorKind::InputStateConflict,
            Self::ReferenceStateUnknown { .. } => ErrorKind::ReferenceStateUnknown,
            Self::ReferenceStateConflict { .. } => ErrorKind::ReferenceStateConflict,
            Self::TimeWindowOutOfBounds { .. } => ErrorKind::TimeWindowOutOfBounds,
            Self::TimeWindowBeforeLowerBound { .. } => ErrorKind::TimeWindowBeforeLowerBound,
            Self::NotPreviouslySeenTransaction => ErrorKind::NotPreviouslySeenTransaction,
            Self::UnhandledException { .. } => ErrorKind::UnhandledException,
        }
    }

    /// Whether this verdict is final for the transaction id and may be stored.
    ///
    /// Malformed and too-early requests can succeed when resubmitted, and
    /// platform faults say nothing about the transaction itself.
    pub fn is_persistent(&self) -> bool {
        matches!(
            self,
            Self::InputStateUnknown { .. }
                | Self::InputStateConflict { .. }
                | Self::ReferenceStateUnknown { .. }
                | Self::ReferenceStateConflict { .. }
                | Self::TimeWindowOutOfBounds { .. }
        )
    }

    /// Build an `UnhandledException` verdict from a backing store fault.
    pub fn unhandled(err: &BackingStoreError) -> Self {
        Self::UnhandledException {
            exception_type: err.exception_type().to_string(),
            message: err.to_string(),
        }
    }
}

/// Faults raised by a backing store implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackingStoreError {
    /// A row lock could not be acquired in time.
    #[error("Timed out after {waited_ms}ms waiting for lock on {row}")]
    LockTimeout { row: String, waited_ms: u64 },

    /// Committing would break the consumed-state invariant.
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    /// The store cannot serve requests.
    #[error("Backing store unavailable: {0}")]
    Unavailable(String),

    /// Fault injected by a test harness.
    #[error("Injected fault: {0}")]
    InjectedFault(String),
}

impl BackingStoreError {
    /// Stable name reported as `exceptionType` to callers.
    pub fn exception_type(&self) -> &'static str {
        match self {
            Self::LockTimeout { .. } => "LockTimeout",
            Self::IntegrityViolation(_) => "IntegrityViolation",
            Self::Unavailable(_) => "Unavailable",
            Self::InjectedFault(_) => "InjectedFault",
        }
    }
}

/// Errors that reject a whole batch at the IPC boundary.
#[derive(Debug, Error)]
pub enum UniquenessError {
    /// Empty batch
    #[error("Empty request batch")]
    EmptyBatch,

    /// Batch size exceeded limits
    #[error("Batch size exceeded: {size} > {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
