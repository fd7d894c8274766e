//! # End-to-end verdict scenarios
//!
//! Issue, spend, conflict, reference, time window and store-fault flows
//! through the full service and in-memory store.

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use shared_types::StateRef;
    use uniqueness_checker::{
        Clock, ConflictingState, ErrorKind, StateStatus, UniquenessCheckError,
        UniquenessCheckResult, UniquenessCheckerApi, UniquenessConfig,
    };

    fn error_of(result: &UniquenessCheckResult) -> &UniquenessCheckError {
        result.error().expect("expected a failure")
    }

    // =========================================================================
    // ISSUE AND SPEND
    // =========================================================================

    #[test]
    fn test_issue_then_spend_succeeds() {
        let checker = Checker::new();
        let issued = checker.issue(1);

        let spender = next_tx_id();
        let responses = checker
            .service
            .process_batch(vec![write(spender).with_inputs(vec![issued.output(0)])]);

        assert_eq!(responses[0].tx_id, spender);
        assert_eq!(responses[0].result, UniquenessCheckResult::success(START));
        assert_eq!(
            checker
                .store
                .committed_state_status(&holding(), &issued.output(0)),
            StateStatus::ConsumedBy(spender)
        );
    }

    #[test]
    fn test_never_issued_state_is_unknown() {
        let checker = Checker::new();
        let never_issued = fresh_state();

        let responses = checker
            .service
            .process_batch(vec![write(next_tx_id()).with_inputs(vec![never_issued])]);

        assert_eq!(
            error_of(&responses[0].result),
            &UniquenessCheckError::InputStateUnknown {
                unknown_states: vec![never_issued],
            }
        );
    }

    #[test]
    fn test_index_beyond_issued_outputs_is_unknown() {
        let checker = Checker::new();
        let issued = checker.issue(2);

        let responses = checker
            .service
            .process_batch(vec![write(next_tx_id()).with_inputs(vec![issued.output(2)])]);

        assert_eq!(
            error_of(&responses[0].result).kind(),
            ErrorKind::InputStateUnknown
        );
    }

    // =========================================================================
    // DOUBLE SPEND
    // =========================================================================

    #[test]
    fn test_double_spend_across_batches() {
        let checker = Checker::new();
        let state = checker.issue(1).output(0);
        let first = next_tx_id();

        let first_responses = checker
            .service
            .process_batch(vec![write(first).with_inputs(vec![state])]);
        let second_responses = checker
            .service
            .process_batch(vec![write(next_tx_id()).with_inputs(vec![state])]);

        assert!(first_responses[0].result.is_success());
        assert_eq!(
            error_of(&second_responses[0].result),
            &UniquenessCheckError::InputStateConflict {
                conflicting_states: vec![ConflictingState::new(state, first)],
            }
        );
    }

    #[test]
    fn test_double_spend_within_batch_first_wins() {
        let checker = Checker::new();
        let state = checker.issue(1).output(0);
        let first = next_tx_id();
        let second = next_tx_id();

        let responses = checker.service.process_batch(vec![
            write(first).with_inputs(vec![state]),
            write(second).with_inputs(vec![state]),
        ]);

        assert_eq!(responses[0].tx_id, first);
        assert!(responses[0].result.is_success());
        assert_eq!(responses[1].tx_id, second);
        assert_eq!(
            error_of(&responses[1].result),
            &UniquenessCheckError::InputStateConflict {
                conflicting_states: vec![ConflictingState::new(state, first)],
            }
        );
    }

    #[test]
    fn test_conflict_reports_every_consumed_input() {
        let checker = Checker::new();
        let issued = checker.issue(3);
        let consumer = next_tx_id();
        checker.service.process_batch(vec![write(consumer)
            .with_inputs(vec![issued.output(0), issued.output(2)])]);

        let responses = checker.service.process_batch(vec![write(next_tx_id())
            .with_inputs(vec![issued.output(0), issued.output(1), issued.output(2)])]);

        assert_eq!(
            error_of(&responses[0].result),
            &UniquenessCheckError::InputStateConflict {
                conflicting_states: vec![
                    ConflictingState::new(issued.output(0), consumer),
                    ConflictingState::new(issued.output(2), consumer),
                ],
            }
        );
        // Rejected spend consumed nothing.
        assert_eq!(
            checker
                .store
                .committed_state_status(&holding(), &issued.output(1)),
            StateStatus::Free
        );
    }

    // =========================================================================
    // REFERENCE STATES
    // =========================================================================

    #[test]
    fn test_spent_reference_is_conflict() {
        let checker = Checker::new();
        let referenced = checker.issue(1).output(0);
        let consumer = next_tx_id();
        checker
            .service
            .process_batch(vec![write(consumer).with_inputs(vec![referenced])]);
        let fresh_input = checker.issue(1).output(0);

        let responses = checker.service.process_batch(vec![write(next_tx_id())
            .with_inputs(vec![fresh_input])
            .with_references(vec![referenced])]);

        assert_eq!(
            error_of(&responses[0].result),
            &UniquenessCheckError::ReferenceStateConflict {
                conflicting_states: vec![ConflictingState::new(referenced, consumer)],
            }
        );
        assert_eq!(
            checker.store.committed_state_status(&holding(), &fresh_input),
            StateStatus::Free
        );
    }

    #[test]
    fn test_reference_is_not_consumed() {
        let checker = Checker::new();
        let referenced = checker.issue(1).output(0);

        for _ in 0..3 {
            let responses = checker
                .service
                .process_batch(vec![write(next_tx_id()).with_references(vec![referenced])]);
            assert!(responses[0].result.is_success());
        }
    }

    // =========================================================================
    // TIME WINDOW
    // =========================================================================

    #[test]
    fn test_lower_bound_in_future() {
        let checker = Checker::new();

        let responses = checker
            .service
            .process_batch(vec![write(next_tx_id()).with_lower_bound(START + 10_000)]);

        assert_eq!(
            error_of(&responses[0].result),
            &UniquenessCheckError::TimeWindowBeforeLowerBound {
                evaluation_timestamp: START,
                lower_bound: START + 10_000,
            }
        );
    }

    #[test]
    fn test_expired_window_is_final() {
        let checker = Checker::new();
        let tx_id = next_tx_id();
        checker.clock.set(UPPER);

        let first = checker.service.process_batch(vec![write(tx_id)]);
        checker.clock.set(START);
        let replay = checker.service.process_batch(vec![write(tx_id)]);

        assert_eq!(
            error_of(&first[0].result).kind(),
            ErrorKind::TimeWindowOutOfBounds
        );
        assert_eq!(first, replay);
    }

    // =========================================================================
    // IDEMPOTENCE
    // =========================================================================

    #[test]
    fn test_resubmission_is_identical_and_writes_nothing() {
        let checker = Checker::new();
        let state = checker.issue(1).output(0);
        let tx_id = next_tx_id();
        let request = write(tx_id).with_inputs(vec![state]).with_outputs(1);

        let first = checker.service.process_batch(vec![request.clone()]);
        checker.clock.advance(60_000);
        let second = checker.service.process_batch(vec![request]);

        assert_eq!(first, second);
        assert_eq!(
            checker
                .store
                .committed_transaction(&holding(), &tx_id)
                .map(|d| d.commit_timestamp),
            Some(START)
        );
    }

    #[test]
    fn test_malformed_resubmission_is_reevaluated() {
        let checker = Checker::new();
        let state = checker.issue(1).output(0);
        let tx_id = next_tx_id();

        let malformed = checker
            .service
            .process_batch(vec![write(tx_id).with_inputs(vec![state, state])]);
        let corrected = checker
            .service
            .process_batch(vec![write(tx_id).with_inputs(vec![state])]);

        assert_eq!(
            error_of(&malformed[0].result).kind(),
            ErrorKind::MalformedRequest
        );
        assert!(corrected[0].result.is_success());
    }

    #[test]
    fn test_read_only_reports_stored_verdict() {
        let checker = Checker::new();
        let tx_id = next_tx_id();

        let before = checker.service.process_batch(vec![write(tx_id).read_only()]);
        checker.service.process_batch(vec![write(tx_id)]);
        let after = checker.service.process_batch(vec![write(tx_id).read_only()]);

        assert_eq!(
            error_of(&before[0].result),
            &UniquenessCheckError::NotPreviouslySeenTransaction
        );
        assert_eq!(after[0].result, UniquenessCheckResult::success(START));
    }

    // =========================================================================
    // TIMESTAMPS
    // =========================================================================

    #[test]
    fn test_commit_timestamps_are_monotonic() {
        let checker = Checker::new();
        let mut timestamps = Vec::new();

        for step in [5_000i64, -3_000, 0, 10_000, -20_000] {
            let now = (checker.clock.now() as i64 + step) as u64;
            checker.clock.set(now);
            let responses = checker.service.process_batch(vec![write(next_tx_id())]);
            timestamps.push(responses[0].result.result_timestamp());
        }

        assert!(timestamps.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    // =========================================================================
    // STORE FAULTS
    // =========================================================================

    #[test]
    fn test_commit_fault_persists_nothing() {
        let checker = Checker::new();
        let state = checker.issue(1).output(0);
        let tx_id = next_tx_id();
        checker.faults.fail_commit(true);

        let responses = checker
            .service
            .process_batch(vec![write(tx_id).with_inputs(vec![state])]);

        match error_of(&responses[0].result) {
            UniquenessCheckError::UnhandledException { exception_type, .. } => {
                assert_eq!(exception_type, "InjectedFault")
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            checker.store.committed_state_status(&holding(), &state),
            StateStatus::Free
        );
        assert!(checker
            .store
            .committed_transaction(&holding(), &tx_id)
            .is_none());

        // Retry after recovery succeeds.
        checker.faults.heal();
        let retry = checker
            .service
            .process_batch(vec![write(tx_id).with_inputs(vec![state])]);
        assert!(retry[0].result.is_success());
    }

    #[test]
    fn test_lookup_fault_is_unhandled() {
        let checker = Checker::new();
        checker.faults.fail_find(true);

        let responses = checker.service.process_batch(vec![write(next_tx_id())]);

        assert_eq!(
            error_of(&responses[0].result).kind(),
            ErrorKind::UnhandledException
        );
    }

    #[test]
    fn test_fault_confined_to_its_holding_identity() {
        let checker = Checker::new();
        let other = shared_types::HoldingIdentity::new("O=Other, L=Paris, C=FR", "group-1");
        checker.faults.fail_state_status(true);

        let state: StateRef = fresh_state();
        let responses = checker.service.process_batch(vec![
            write(next_tx_id()).with_inputs(vec![state]),
            uniqueness_checker::UniquenessCheckRequest::new(next_tx_id(), other, UPPER),
        ]);

        assert_eq!(
            error_of(&responses[0].result).kind(),
            ErrorKind::UnhandledException
        );
        assert!(responses[1].result.is_success());
    }

    #[test]
    fn test_unstored_rejections_when_disabled() {
        let checker = Checker::with_config(UniquenessConfig {
            persist_rejections: false,
            ..Default::default()
        });
        let tx_id = next_tx_id();

        checker
            .service
            .process_batch(vec![write(tx_id).with_inputs(vec![fresh_state()])]);

        assert!(checker
            .store
            .committed_transaction(&holding(), &tx_id)
            .is_none());
    }
}
