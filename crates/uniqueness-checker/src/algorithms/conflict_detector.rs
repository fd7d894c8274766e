//! Conflict Detector
//!
//! Classifies every reference and input state of a request against the
//! backing store session, which sees both committed history and the
//! reservations made earlier in the same batch.
//!
//! ## Precedence
//!
//! When several categories apply, the first in this order is reported, with
//! every offending state of that category:
//!
//! ```text
//! InputStateUnknown > InputStateConflict > ReferenceStateUnknown > ReferenceStateConflict
//! ```
//!
//! ## Intra-batch ordering
//!
//! An accepted request's inputs are reserved in the session overlay before the
//! next request is evaluated, so a later request in the same batch spending the
//! same state sees a conflict naming the earlier transaction.

use crate::domain::entities::{StateStatus, UniquenessCheckRequest};
use crate::domain::errors::{BackingStoreError, UniquenessCheckError};
use crate::domain::value_objects::ConflictingState;
use crate::ports::outbound::BackingStoreSession;
use shared_types::StateRef;
use tracing::debug;

/// Outcome of the state checks for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateCheckOutcome {
    /// No unknown or consumed states; inputs are now reserved in the session.
    Accepted,
    /// The request cannot proceed.
    Rejected(UniquenessCheckError),
}

/// Unknown and consumed states found in one list of states.
#[derive(Default)]
struct Classification {
    unknown: Vec<StateRef>,
    conflicts: Vec<ConflictingState>,
}

impl Classification {
    fn is_clear(&self) -> bool {
        self.unknown.is_empty() && self.conflicts.is_empty()
    }
}

fn classify(
    session: &mut dyn BackingStoreSession,
    states: &[StateRef],
) -> Result<Classification, BackingStoreError> {
    let mut classification = Classification::default();

    for state in states {
        match session.state_status(state)? {
            StateStatus::Unknown => classification.unknown.push(*state),
            StateStatus::Free => {}
            StateStatus::ConsumedBy(consumer) => classification
                .conflicts
                .push(ConflictingState::new(*state, consumer)),
        }
    }

    Ok(classification)
}

/// Check a validated, in-window request and reserve its inputs if it is clear.
///
/// Store faults are returned as `Err` and must abort the whole session.
pub fn check_states(
    session: &mut dyn BackingStoreSession,
    request: &UniquenessCheckRequest,
) -> Result<StateCheckOutcome, BackingStoreError> {
    let references = classify(session, &request.reference_states)?;
    let inputs = classify(session, &request.input_states)?;

    if !inputs.unknown.is_empty() {
        return Ok(StateCheckOutcome::Rejected(
            UniquenessCheckError::InputStateUnknown {
                unknown_states: inputs.unknown,
            },
        ));
    }

    if !inputs.conflicts.is_empty() {
        return Ok(StateCheckOutcome::Rejected(
            UniquenessCheckError::InputStateConflict {
                conflicting_states: inputs.conflicts,
            },
        ));
    }

    if !references.unknown.is_empty() {
        return Ok(StateCheckOutcome::Rejected(
            UniquenessCheckError::ReferenceStateUnknown {
                unknown_states: references.unknown,
            },
        ));
    }

    if !references.conflicts.is_empty() {
        return Ok(StateCheckOutcome::Rejected(
            UniquenessCheckError::ReferenceStateConflict {
                conflicting_states: references.conflicts,
            },
        ));
    }

    debug_assert!(inputs.is_clear() && references.is_clear());

    session.reserve(
        &request.tx_id,
        &request.input_states,
        request.num_output_states,
    );

    debug!(
        tx_id = %request.tx_id,
        inputs = request.input_states.len(),
        outputs = request.num_output_states,
        "Reserved inputs in session overlay"
    );

    Ok(StateCheckOutcome::Accepted)
}
