//! Inbound Ports (Driving Ports / API)

use crate::domain::entities::{UniquenessCheckRequest, UniquenessCheckResponse};

/// Primary Uniqueness Checker API
pub trait UniquenessCheckerApi: Send + Sync {
    /// Check a batch of requests.
    ///
    /// Returns exactly one response per request, tagged with its transaction id.
    /// Requests are evaluated in arrival order; that order decides which of two
    /// requests spending the same state wins. Each holding identity's share of
    /// the batch commits atomically.
    ///
    /// Blocks while row locks held by concurrent batches are released.
    fn process_batch(&self, requests: Vec<UniquenessCheckRequest>) -> Vec<UniquenessCheckResponse>;
}
