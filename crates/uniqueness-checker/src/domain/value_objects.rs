//! Value objects for the Uniqueness Checker
//!
//! Immutable verdict types returned to callers.

use super::errors::UniquenessCheckError;
use serde::{Deserialize, Serialize};
use shared_types::{StateRef, Timestamp, TransactionId};
use std::fmt;

/// A state together with the transaction that already consumed it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictingState {
    pub state_ref: StateRef,
    pub consuming_tx_id: TransactionId,
}

impl ConflictingState {
    pub fn new(state_ref: StateRef, consuming_tx_id: TransactionId) -> Self {
        Self {
            state_ref,
            consuming_tx_id,
        }
    }
}

/// Category of a failed check, as exposed on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    MalformedRequest,
    InputStateUnknown,
    InputStateConflict,
    ReferenceStateUnknown,
    ReferenceStateConflict,
    TimeWindowOutOfBounds,
    TimeWindowBeforeLowerBound,
    NotPreviouslySeenTransaction,
    UnhandledException,
}

impl ErrorKind {
    /// Label used for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedRequest => "malformed_request",
            Self::InputStateUnknown => "input_state_unknown",
            Self::InputStateConflict => "input_state_conflict",
            Self::ReferenceStateUnknown => "reference_state_unknown",
            Self::ReferenceStateConflict => "reference_state_conflict",
            Self::TimeWindowOutOfBounds => "time_window_out_of_bounds",
            Self::TimeWindowBeforeLowerBound => "time_window_before_lower_bound",
            Self::NotPreviouslySeenTransaction => "not_previously_seen_transaction",
            Self::UnhandledException => "unhandled_exception",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UniquenessCheckResult {
    /// The transaction is certified unique.
    Success { result_timestamp: Timestamp },
    /// The transaction was rejected, or could not be processed.
    Failure {
        error: UniquenessCheckError,
        result_timestamp: Timestamp,
    },
}

impl UniquenessCheckResult {
    pub fn success(result_timestamp: Timestamp) -> Self {
        Self::Success { result_timestamp }
    }

    pub fn failure(error: UniquenessCheckError, result_timestamp: Timestamp) -> Self {
        Self::Failure {
            error,
            result_timestamp,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn result_timestamp(&self) -> Timestamp {
        match self {
            Self::Success { result_timestamp } | Self::Failure { result_timestamp, .. } => {
                *result_timestamp
            }
        }
    }

    /// Same verdict, stamped with a different instant.
    pub fn stamped(self, timestamp: Timestamp) -> Self {
        match self {
            Self::Success { .. } => Self::success(timestamp),
            Self::Failure { error, .. } => Self::failure(error, timestamp),
        }
    }

    pub fn error(&self) -> Option<&UniquenessCheckError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }

    /// Label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Failure { error, .. } => error.kind().as_str(),
        }
    }
}
