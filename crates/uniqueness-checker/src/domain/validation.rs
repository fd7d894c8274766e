//! Request validation
//!
//! Structural checks run before any store access. Pure; checks run in a fixed
//! order and the first violation is reported, so error texts are deterministic.

use super::entities::UniquenessCheckRequest;
use super::errors::UniquenessCheckError;
use shared_types::StateRef;
use std::collections::HashSet;

/// Validate the structure of a request.
pub fn validate_request(request: &UniquenessCheckRequest) -> Result<(), UniquenessCheckError> {
    if request.tx_id.is_zero() {
        return Err(malformed("Transaction id must not be the zero hash"));
    }

    if let Some(state) = first_with_zero_tx_id(&request.input_states) {
        return Err(malformed(format!(
            "Input state {state} has a zero transaction id"
        )));
    }

    if let Some(state) = first_with_zero_tx_id(&request.reference_states) {
        return Err(malformed(format!(
            "Reference state {state} has a zero transaction id"
        )));
    }

    if let Some(state) = first_duplicate(&request.input_states) {
        return Err(malformed(format!("Duplicate input state {state}")));
    }

    if let Some(state) = first_duplicate(&request.reference_states) {
        return Err(malformed(format!("Duplicate reference state {state}")));
    }

    let inputs: HashSet<&StateRef> = request.input_states.iter().collect();
    if let Some(state) = request
        .reference_states
        .iter()
        .find(|state| inputs.contains(state))
    {
        return Err(malformed(format!(
            "State {state} is both an input and a reference state"
        )));
    }

    if let Some(lower) = request.time_window_lower_bound {
        if lower >= request.time_window_upper_bound {
            return Err(malformed(format!(
                "Time window lower bound {lower} must be before upper bound {}",
                request.time_window_upper_bound
            )));
        }
    }

    Ok(())
}

fn malformed(error_text: impl Into<String>) -> UniquenessCheckError {
    UniquenessCheckError::MalformedRequest {
        error_text: error_text.into(),
    }
}

fn first_with_zero_tx_id(states: &[StateRef]) -> Option<&StateRef> {
    states.iter().find(|state| state.tx_id.is_zero())
}

fn first_duplicate(states: &[StateRef]) -> Option<&StateRef> {
    let mut seen = HashSet::with_capacity(states.len());
    states.iter().find(|state| !seen.insert(*state))
}
