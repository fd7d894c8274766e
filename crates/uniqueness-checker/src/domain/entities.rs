//! Core entities for the Uniqueness Checker
//!
//! Request, response, and the two persisted record types:
//!
//! ```text
//! TransactionDetails  one row per transaction id (verdict locked in on first write)
//! StateStatus         one row per known state ref (free, or consumed by a tx id)
//! ```

use super::errors::UniquenessCheckError;
use super::value_objects::UniquenessCheckResult;
use serde::{Deserialize, Serialize};
use shared_types::{HoldingIdentity, StateRef, Timestamp, TransactionId};

/// Whether a check may consume states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    /// Certify and consume the input states.
    #[default]
    Write,
    /// Report the stored verdict without writing anything.
    ReadOnly,
}

/// One certification request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniquenessCheckRequest {
    /// Unique key for idempotence.
    pub tx_id: TransactionId,
    pub request_type: RequestType,
    /// Audit only.
    pub initiator: String,
    pub input_states: Vec<StateRef>,
    pub reference_states: Vec<StateRef>,
    pub num_output_states: u32,
    pub time_window_lower_bound: Option<Timestamp>,
    pub time_window_upper_bound: Timestamp,
    pub holding_identity: HoldingIdentity,
}

impl UniquenessCheckRequest {
    /// A write request with no states and the given window upper bound.
    pub fn new(
        tx_id: TransactionId,
        holding_identity: HoldingIdentity,
        time_window_upper_bound: Timestamp,
    ) -> Self {
        Self {
            tx_id,
            request_type: RequestType::Write,
            initiator: String::new(),
            input_states: Vec::new(),
            reference_states: Vec::new(),
            num_output_states: 0,
            time_window_lower_bound: None,
            time_window_upper_bound,
            holding_identity,
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<StateRef>) -> Self {
        self.input_states = inputs;
        self
    }

    pub fn with_references(mut self, references: Vec<StateRef>) -> Self {
        self.reference_states = references;
        self
    }

    pub fn with_outputs(mut self, count: u32) -> Self {
        self.num_output_states = count;
        self
    }

    pub fn with_lower_bound(mut self, lower_bound: Timestamp) -> Self {
        self.time_window_lower_bound = Some(lower_bound);
        self
    }

    pub fn with_initiator(mut self, initiator: impl Into<String>) -> Self {
        self.initiator = initiator.into();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.request_type = RequestType::ReadOnly;
        self
    }
}

/// Verdict for one request, tagged with the transaction it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniquenessCheckResponse {
    pub tx_id: TransactionId,
    pub result: UniquenessCheckResult,
}

/// Persisted record of a processed transaction.
///
/// Written once; serves every later duplicate of the same transaction id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub tx_id: TransactionId,
    /// Inputs consumed (empty effect when rejected).
    pub input_states: Vec<StateRef>,
    pub reference_states: Vec<StateRef>,
    pub num_output_states: u32,
    pub commit_timestamp: Timestamp,
    /// Set when the transaction was rejected.
    pub rejection: Option<UniquenessCheckError>,
}

impl TransactionDetails {
    /// Record for an accepted transaction.
    pub fn accepted(request: &UniquenessCheckRequest, commit_timestamp: Timestamp) -> Self {
        Self {
            tx_id: request.tx_id,
            input_states: request.input_states.clone(),
            reference_states: request.reference_states.clone(),
            num_output_states: request.num_output_states,
            commit_timestamp,
            rejection: None,
        }
    }

    /// Record for a rejected transaction.
    pub fn rejected(
        request: &UniquenessCheckRequest,
        rejection: UniquenessCheckError,
        commit_timestamp: Timestamp,
    ) -> Self {
        Self {
            rejection: Some(rejection),
            ..Self::accepted(request, commit_timestamp)
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.rejection.is_none()
    }

    /// The verdict to hand back to a duplicate request.
    pub fn to_result(&self) -> UniquenessCheckResult {
        match &self.rejection {
            None => UniquenessCheckResult::success(self.commit_timestamp),
            Some(error) => UniquenessCheckResult::failure(error.clone(), self.commit_timestamp),
        }
    }
}

/// What the backing store knows about a state reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateStatus {
    /// Never created by any transaction the store has recorded.
    Unknown,
    /// Created and not yet consumed.
    Free,
    /// Consumed by the given transaction.
    ConsumedBy(TransactionId),
}

/// Processing stages of one request.
///
/// `Received -> Validated -> TimeWindowChecked -> ConflictChecked`, terminal
/// once a verdict exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckStage {
    Received,
    Validated,
    TimeWindowChecked,
    ConflictChecked,
}
