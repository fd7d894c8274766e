//! IPC Handler for the Uniqueness Checker
//!
//! ## Boundaries
//!
//! - MUST reject empty and oversized batches as a whole
//! - MUST answer unparseable items individually with `MalformedRequest`
//! - MUST run the service off the async executor (row locks block)

use crate::adapters::{InMemoryBackingStore, SystemClock};
use crate::application::service::UniquenessCheckService;
use crate::config::UniquenessConfig;
use crate::domain::errors::UniquenessError;
use crate::ipc::payloads::{
    malformed_response, UniquenessCheckRequestPayload, UniquenessCheckResponsePayload,
};
use crate::ports::inbound::UniquenessCheckerApi;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Where each batch item's answer comes from.
enum Slot {
    /// Index into the parsed requests handed to the service.
    Checked(usize),
    /// Answered at the boundary.
    Rejected(UniquenessCheckResponsePayload),
}

/// IPC Handler for uniqueness check batches.
///
/// Validates batch limits and delegates to the domain service.
pub struct UniquenessCheckHandler {
    service: Arc<UniquenessCheckService>,
}

impl UniquenessCheckHandler {
    pub fn new(service: Arc<UniquenessCheckService>) -> Self {
        Self { service }
    }

    /// Handler over a fresh in-memory store and the system clock.
    pub fn in_memory(config: UniquenessConfig) -> Self {
        let store = Arc::new(InMemoryBackingStore::from_config(&config));
        let service = UniquenessCheckService::with_config(store, Arc::new(SystemClock), config);
        Self::new(Arc::new(service))
    }

    /// Handle one batch.
    ///
    /// Returns one response per payload, in payload order.
    pub async fn handle_batch(
        &self,
        payloads: Vec<UniquenessCheckRequestPayload>,
    ) -> Result<Vec<UniquenessCheckResponsePayload>, UniquenessError> {
        let start_time = Instant::now();
        let max = self.service.config().max_batch_size;

        if payloads.is_empty() {
            warn!("[uniqueness] Rejecting empty batch");
            return Err(UniquenessError::EmptyBatch);
        }

        if payloads.len() > max {
            warn!(
                "[uniqueness] Batch size {} exceeds max {}",
                payloads.len(),
                max
            );
            return Err(UniquenessError::BatchTooLarge {
                size: payloads.len(),
                max,
            });
        }

        let mut requests = Vec::with_capacity(payloads.len());
        let mut slots = Vec::with_capacity(payloads.len());
        for payload in &payloads {
            match payload.parse() {
                Ok(request) => {
                    slots.push(Slot::Checked(requests.len()));
                    requests.push(request);
                }
                Err(err) => {
                    warn!(
                        transaction_id = %payload.transaction_id,
                        error = %err,
                        "[uniqueness] Unparseable request item"
                    );
                    slots.push(Slot::Rejected(malformed_response(
                        &payload.transaction_id,
                        &err,
                        self.service.now(),
                    )));
                }
            }
        }

        let responses = if requests.is_empty() {
            Vec::new()
        } else {
            let service = self.service.clone();
            tokio::task::spawn_blocking(move || service.process_batch(requests))
                .await
                .map_err(|e| {
                    error!("[uniqueness] Batch worker failed: {}", e);
                    UniquenessError::Internal(e.to_string())
                })?
        };

        let mut checked: Vec<Option<UniquenessCheckResponsePayload>> = responses
            .iter()
            .map(|response| Some(UniquenessCheckResponsePayload::from(response)))
            .collect();

        let mut out = Vec::with_capacity(slots.len());
        for slot in slots {
            let payload = match slot {
                Slot::Checked(index) => checked
                    .get_mut(index)
                    .and_then(Option::take)
                    .ok_or_else(|| {
                        UniquenessError::Internal(format!("missing response for item {index}"))
                    })?,
                Slot::Rejected(payload) => payload,
            };
            out.push(payload);
        }

        info!(
            "[uniqueness] Answered {} items ({} accepted) in {}ms",
            out.len(),
            out.iter().filter(|p| p.result.is_success()).count(),
            start_time.elapsed().as_millis()
        );

        Ok(out)
    }
}
