//! # Randomised properties
//!
//! Random batches of random spends over a small pool of issued states.

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use proptest::prelude::*;
    use shared_types::StateRef;
    use std::collections::{BTreeSet, HashMap};
    use uniqueness_checker::{StateStatus, UniquenessCheckerApi};

    const POOL: u32 = 8;

    /// Batches of requests; each request is a set of pool indices to spend.
    fn batches() -> impl Strategy<Value = Vec<Vec<BTreeSet<u32>>>> {
        let request = prop::collection::btree_set(0..POOL, 1..4);
        let batch = prop::collection::vec(request, 1..6);
        prop::collection::vec(batch, 1..5)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_accepted_transactions_never_share_inputs(batches in batches()) {
            let checker = Checker::new();
            let issued = checker.issue(POOL);
            let mut consumer_of: HashMap<StateRef, _> = HashMap::new();

            for batch in batches {
                let requests: Vec<_> = batch
                    .iter()
                    .map(|indices| {
                        let inputs = indices.iter().map(|&i| issued.output(i)).collect();
                        write(next_tx_id()).with_inputs(inputs)
                    })
                    .collect();

                let responses = checker.service.process_batch(requests.clone());
                prop_assert_eq!(responses.len(), requests.len());

                for (request, response) in requests.iter().zip(&responses) {
                    prop_assert_eq!(request.tx_id, response.tx_id);
                    if response.result.is_success() {
                        for state in &request.input_states {
                            prop_assert!(
                                consumer_of.insert(*state, request.tx_id).is_none(),
                                "state {} accepted twice", state
                            );
                        }
                    }
                }
            }

            for (state, consumer) in &consumer_of {
                prop_assert_eq!(
                    checker.store.committed_state_status(&holding(), state),
                    StateStatus::ConsumedBy(*consumer)
                );
            }
        }

        #[test]
        fn prop_spend_succeeds_iff_all_inputs_free(batch in prop::collection::vec(
            prop::collection::btree_set(0..POOL, 1..4), 1..10)
        ) {
            let checker = Checker::new();
            let issued = checker.issue(POOL);
            let mut spent: BTreeSet<u32> = BTreeSet::new();

            let requests: Vec<_> = batch
                .iter()
                .map(|indices| {
                    let inputs = indices.iter().map(|&i| issued.output(i)).collect();
                    write(next_tx_id()).with_inputs(inputs)
                })
                .collect();
            let responses = checker.service.process_batch(requests);

            for (indices, response) in batch.iter().zip(&responses) {
                let expect_success = indices.is_disjoint(&spent);
                prop_assert_eq!(response.result.is_success(), expect_success);
                if expect_success {
                    spent.extend(indices.iter().copied());
                }
            }
        }
    }
}
