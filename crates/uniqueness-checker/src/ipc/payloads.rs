//! IPC Payloads for the Uniqueness Checker
//!
//! camelCase JSON. Identifiers travel as strings (`"<txId>"`,
//! `"<txId>:<index>"`) and are parsed at the boundary.

use crate::domain::entities::{RequestType, UniquenessCheckRequest, UniquenessCheckResponse};
use crate::domain::errors::UniquenessCheckError;
use crate::domain::value_objects::{ErrorKind, UniquenessCheckResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use shared_types::{HoldingIdentity, ParseError, StateRef, Timestamp, TransactionId};

// ============================================================
// INCOMING REQUESTS
// ============================================================

/// One request item of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniquenessCheckRequestPayload {
    /// `WRITE` or `READ_ONLY`
    #[serde(rename = "type", default)]
    pub request_type: RequestType,
    pub transaction_id: String,
    #[serde(default)]
    pub initiator: String,
    #[serde(default)]
    pub input_states: Vec<String>,
    #[serde(default)]
    pub reference_states: Vec<String>,
    #[serde(default)]
    pub num_output_states: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window_lower_bound: Option<Timestamp>,
    pub time_window_upper_bound: Timestamp,
    pub holding_identity: HoldingIdentity,
}

impl UniquenessCheckRequestPayload {
    /// Parse into a domain request.
    pub fn parse(&self) -> Result<UniquenessCheckRequest, ParseError> {
        Ok(UniquenessCheckRequest {
            tx_id: self.transaction_id.parse()?,
            request_type: self.request_type,
            initiator: self.initiator.clone(),
            input_states: parse_states(&self.input_states)?,
            reference_states: parse_states(&self.reference_states)?,
            num_output_states: self.num_output_states,
            time_window_lower_bound: self.time_window_lower_bound,
            time_window_upper_bound: self.time_window_upper_bound,
            holding_identity: self.holding_identity.clone(),
        })
    }
}

impl From<&UniquenessCheckRequest> for UniquenessCheckRequestPayload {
    fn from(request: &UniquenessCheckRequest) -> Self {
        Self {
            request_type: request.request_type,
            transaction_id: request.tx_id.to_string(),
            initiator: request.initiator.clone(),
            input_states: request.input_states.iter().map(ToString::to_string).collect(),
            reference_states: request
                .reference_states
                .iter()
                .map(ToString::to_string)
                .collect(),
            num_output_states: request.num_output_states,
            time_window_lower_bound: request.time_window_lower_bound,
            time_window_upper_bound: request.time_window_upper_bound,
            holding_identity: request.holding_identity.clone(),
        }
    }
}

fn parse_states(states: &[String]) -> Result<Vec<StateRef>, ParseError> {
    states.iter().map(|s| s.parse()).collect()
}

// ============================================================
// OUTGOING RESPONSES
// ============================================================

/// Verdict for one request item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniquenessCheckResponsePayload {
    /// Echoes the request's `transactionId` text.
    pub transaction_id: String,
    pub result: ResultPayload,
}

/// `Success` or `Failure`, tagged by `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ResultPayload {
    Success {
        #[serde(rename = "resultTimestamp")]
        result_timestamp: Timestamp,
    },
    Failure {
        #[serde(rename = "errorKind")]
        error_kind: ErrorKind,
        #[serde(rename = "resultTimestamp")]
        result_timestamp: Timestamp,
        details: Map<String, Value>,
    },
}

impl ResultPayload {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error_kind, .. } => Some(*error_kind),
        }
    }

    pub fn details(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { details, .. } => Some(details),
        }
    }
}

impl From<&UniquenessCheckResult> for ResultPayload {
    fn from(result: &UniquenessCheckResult) -> Self {
        match result {
            UniquenessCheckResult::Success { result_timestamp } => Self::Success {
                result_timestamp: *result_timestamp,
            },
            UniquenessCheckResult::Failure {
                error,
                result_timestamp,
            } => Self::Failure {
                error_kind: error.kind(),
                result_timestamp: *result_timestamp,
                details: error_details(error),
            },
        }
    }
}

impl From<&UniquenessCheckResponse> for UniquenessCheckResponsePayload {
    fn from(response: &UniquenessCheckResponse) -> Self {
        Self {
            transaction_id: response.tx_id.to_string(),
            result: ResultPayload::from(&response.result),
        }
    }
}

/// Evidence carried by each error kind.
fn error_details(error: &UniquenessCheckError) -> Map<String, Value> {
    let details = match error {
        UniquenessCheckError::MalformedRequest { error_text } => json!({ "errorText": error_text }),
        UniquenessCheckError::InputStateUnknown { unknown_states }
        | UniquenessCheckError::ReferenceStateUnknown { unknown_states } => {
            json!({ "unknownStates": unknown_states })
        }
        UniquenessCheckError::InputStateConflict { conflicting_states }
        | UniquenessCheckError::ReferenceStateConflict { conflicting_states } => {
            json!({ "conflictingStates": conflicting_states })
        }
        UniquenessCheckError::TimeWindowOutOfBounds {
            evaluation_timestamp,
            lower_bound,
            upper_bound,
        } => json!({
            "evaluationTimestamp": evaluation_timestamp,
            "lowerBound": lower_bound,
            "upperBound": upper_bound,
        }),
        UniquenessCheckError::TimeWindowBeforeLowerBound {
            evaluation_timestamp,
            lower_bound,
        } => json!({
            "evaluationTimestamp": evaluation_timestamp,
            "lowerBound": lower_bound,
        }),
        UniquenessCheckError::NotPreviouslySeenTransaction => json!({}),
        UniquenessCheckError::UnhandledException {
            exception_type,
            message,
        } => json!({ "exceptionType": exception_type, "message": message }),
    };

    match details {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Failure payload for an item that could not be parsed.
pub fn malformed_response(
    transaction_id: &str,
    error: &ParseError,
    result_timestamp: Timestamp,
) -> UniquenessCheckResponsePayload {
    let error = UniquenessCheckError::MalformedRequest {
        error_text: error.to_string(),
    };
    UniquenessCheckResponsePayload {
        transaction_id: transaction_id.to_string(),
        result: ResultPayload::from(&UniquenessCheckResult::failure(error, result_timestamp)),
    }
}

/// Parse a response's transaction id back, for callers correlating verdicts.
pub fn response_tx_id(payload: &UniquenessCheckResponsePayload) -> Result<TransactionId, ParseError> {
    payload.transaction_id.parse()
}
