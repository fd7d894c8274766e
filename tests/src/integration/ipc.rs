//! # JSON wire round trips
//!
//! Batches submitted as camelCase JSON through the async handler.

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use uniqueness_checker::{
        ErrorKind, InMemoryBackingStore, ManualClock, UniquenessCheckHandler,
        UniquenessCheckRequestPayload, UniquenessCheckService, UniquenessError,
    };

    fn handler() -> UniquenessCheckHandler {
        let service = UniquenessCheckService::new(
            Arc::new(InMemoryBackingStore::new()),
            Arc::new(ManualClock::new(START)),
        );
        UniquenessCheckHandler::new(Arc::new(service))
    }

    fn item(tx: &str, inputs: &[String], outputs: u32) -> Value {
        json!({
            "type": "WRITE",
            "transactionId": tx,
            "initiator": "O=Alice, L=London, C=GB",
            "inputStates": inputs,
            "referenceStates": [],
            "numOutputStates": outputs,
            "timeWindowUpperBound": UPPER,
            "holdingIdentity": { "x500Name": "O=Notary, L=London, C=GB", "groupId": "group-1" }
        })
    }

    fn parse(items: Vec<Value>) -> Vec<UniquenessCheckRequestPayload> {
        serde_json::from_value(Value::Array(items)).unwrap()
    }

    #[tokio::test]
    async fn test_double_spend_over_json() {
        let handler = handler();
        let issuer = "aa".repeat(32);
        let state = format!("{issuer}:0");

        let responses = handler
            .handle_batch(parse(vec![
                item(&issuer, &[], 1),
                item(&"bb".repeat(32), &[state.clone()], 0),
                item(&"cc".repeat(32), &[state.clone()], 0),
            ]))
            .await
            .unwrap();

        let wire = serde_json::to_value(&responses).unwrap();
        assert_eq!(wire[0]["result"]["status"], "Success");
        assert_eq!(wire[1]["result"]["status"], "Success");
        assert_eq!(wire[2]["result"]["status"], "Failure");
        assert_eq!(wire[2]["result"]["errorKind"], "InputStateConflict");
        assert_eq!(
            wire[2]["result"]["details"]["conflictingStates"][0],
            json!({ "stateRef": state, "consumingTxId": "bb".repeat(32) })
        );
    }

    #[tokio::test]
    async fn test_unknown_state_details_over_json() {
        let handler = handler();
        let unknown = format!("{}:7", "dd".repeat(32));

        let responses = handler
            .handle_batch(parse(vec![item(&"ee".repeat(32), &[unknown.clone()], 0)]))
            .await
            .unwrap();

        assert_eq!(
            responses[0].result.error_kind(),
            Some(ErrorKind::InputStateUnknown)
        );
        assert_eq!(
            responses[0].result.details().unwrap()["unknownStates"],
            json!([unknown])
        );
    }

    #[tokio::test]
    async fn test_negative_index_is_malformed_item() {
        let handler = handler();
        let bad = format!("{}:-1", "aa".repeat(32));

        let responses = handler
            .handle_batch(parse(vec![
                item(&"ab".repeat(32), &[bad], 0),
                item(&"ac".repeat(32), &[], 0),
            ]))
            .await
            .unwrap();

        assert_eq!(
            responses[0].result.error_kind(),
            Some(ErrorKind::MalformedRequest)
        );
        assert!(responses[1].result.is_success());
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let result = handler().handle_batch(Vec::new()).await;
        assert!(matches!(result, Err(UniquenessError::EmptyBatch)));
    }
}
