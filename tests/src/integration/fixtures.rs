//! Shared wiring for the integration suite.

use shared_types::{HoldingIdentity, StateRef, TransactionId};
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Once};
use uniqueness_checker::{
    FaultInjectingStore, FaultPlan, InMemoryBackingStore, ManualClock, UniquenessCheckRequest,
    UniquenessCheckService, UniquenessCheckerApi, UniquenessConfig,
};
use uniqueness_telemetry::{init_logging, TelemetryConfig};

/// Start of the manual clock, in ms.
pub const START: u64 = 1_700_000_000_000;

/// Upper bound comfortably past anything the suite advances to.
pub const UPPER: u64 = START + 3_600_000;

static LOGGING: Once = Once::new();

/// Install the subscriber once per test binary. Silent unless
/// `UC_LOG_LEVEL` or `RUST_LOG` is set.
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let explicit = env::var("UC_LOG_LEVEL").or_else(|_| env::var("RUST_LOG"));
        let config = TelemetryConfig {
            log_level: explicit.unwrap_or_else(|_| "off".to_string()),
            ..TelemetryConfig::for_service("uc-tests")
        };
        // Another harness may have installed one already.
        let _ = init_logging(&config);
    });
}

/// A service over an in-memory store behind a fault injector.
pub struct Checker {
    pub store: Arc<InMemoryBackingStore>,
    pub faults: Arc<FaultPlan>,
    pub clock: Arc<ManualClock>,
    pub service: Arc<UniquenessCheckService>,
}

impl Checker {
    pub fn new() -> Self {
        Self::with_config(UniquenessConfig::default())
    }

    pub fn with_config(config: UniquenessConfig) -> Self {
        init_test_logging();
        let store = Arc::new(InMemoryBackingStore::from_config(&config));
        let faults = FaultPlan::new();
        let clock = Arc::new(ManualClock::new(START));
        let service = Arc::new(UniquenessCheckService::with_config(
            Arc::new(FaultInjectingStore::new(store.clone(), faults.clone())),
            clock.clone(),
            config,
        ));
        Self {
            store,
            faults,
            clock,
            service,
        }
    }

    /// Commit an issuance of `outputs` states and return the transaction id.
    pub fn issue(&self, outputs: u32) -> TransactionId {
        let tx_id = next_tx_id();
        let responses = self
            .service
            .process_batch(vec![write(tx_id).with_outputs(outputs)]);
        assert!(
            responses[0].result.is_success(),
            "issuance failed: {:?}",
            responses[0].result
        );
        tx_id
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

pub fn holding() -> HoldingIdentity {
    HoldingIdentity::new("O=Notary, L=London, C=GB", "group-1")
}

static NEXT_TX: AtomicU64 = AtomicU64::new(1);

/// Fresh, reproducible transaction id: the digest of a process-wide counter.
pub fn next_tx_id() -> TransactionId {
    let n = NEXT_TX.fetch_add(1, Ordering::Relaxed);
    TransactionId::digest(format!("uc-tests/tx/{n}").as_bytes())
}

/// A state of a transaction nobody issued.
pub fn fresh_state() -> StateRef {
    next_tx_id().output(0)
}

/// Write request against the default holding identity.
pub fn write(tx_id: TransactionId) -> UniquenessCheckRequest {
    UniquenessCheckRequest::new(tx_id, holding(), UPPER).with_initiator("O=Alice, L=London, C=GB")
}
