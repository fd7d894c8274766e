//! Uniqueness Check Service
//!
//! Main service implementing `UniquenessCheckerApi`.

use crate::adapters::MonotonicClock;
use crate::algorithms::{check_states, StateCheckOutcome};
use crate::config::UniquenessConfig;
use crate::domain::entities::{
    CheckStage, RequestType, TransactionDetails, UniquenessCheckRequest, UniquenessCheckResponse,
};
use crate::domain::errors::{BackingStoreError, UniquenessCheckError};
use crate::domain::value_objects::UniquenessCheckResult;
use crate::domain::{check_time_window, validate_request};
use crate::metrics;
use crate::ports::inbound::UniquenessCheckerApi;
use crate::ports::outbound::{BackingStore, BackingStoreSession, Clock};
use shared_types::{HoldingIdentity, Timestamp, TransactionId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Where a verdict came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Origin {
    /// Replayed from a stored `TransactionDetails` row; survives rollback.
    Stored,
    /// Computed in this session and not written; lost if the session does not commit.
    Evaluated,
    /// Computed with a details row staged; stamped with the commit instant.
    Staged,
}

#[derive(Clone, Debug)]
struct Answer {
    result: UniquenessCheckResult,
    origin: Origin,
}

/// Uniqueness Check Service
///
/// Orchestrates the checking pipeline for each holding identity in a batch:
/// 1. Open one backing store session
/// 2. Per request, in arrival order: stored verdict, validation, time window,
///    state checks
/// 3. Commit staged details rows once for the whole group
/// 4. On any store fault, roll back and answer `UnhandledException`
pub struct UniquenessCheckService {
    store: Arc<dyn BackingStore>,
    clock: MonotonicClock,
    config: UniquenessConfig,
}

impl UniquenessCheckService {
    /// Create a new service with default config
    pub fn new(store: Arc<dyn BackingStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(store, clock, UniquenessConfig::default())
    }

    /// Create a new service with custom config
    pub fn with_config(
        store: Arc<dyn BackingStore>,
        clock: Arc<dyn Clock>,
        config: UniquenessConfig,
    ) -> Self {
        Self {
            store,
            clock: MonotonicClock::new(clock),
            config,
        }
    }

    pub fn config(&self) -> &UniquenessConfig {
        &self.config
    }

    /// Current instant on the service's monotonic clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Process the requests of one holding identity in one session.
    fn process_group(
        &self,
        holding_identity: &HoldingIdentity,
        requests: &[&UniquenessCheckRequest],
    ) -> Vec<UniquenessCheckResult> {
        let mut session = match self.store.open_session(holding_identity) {
            Ok(session) => session,
            Err(err) => {
                error!(
                    holding_identity = %holding_identity,
                    error = %err,
                    "Failed to open backing store session"
                );
                let failed = self.unhandled(&err);
                return vec![failed; requests.len()];
            }
        };

        let mut answers = Vec::with_capacity(requests.len());
        let mut staged = Vec::new();

        if let Err(err) = self.evaluate_group(session.as_mut(), requests, &mut answers, &mut staged)
        {
            error!(
                holding_identity = %holding_identity,
                error = %err,
                processed = answers.len(),
                "Backing store fault, rolling back session"
            );
            session.rollback();
            return self.fail_evaluated(answers, requests.len(), &err);
        }

        let rows = staged.len();
        let commit_timestamp = match session.commit(staged, &self.clock) {
            Ok(timestamp) => timestamp,
            Err(err) => {
                error!(
                    holding_identity = %holding_identity,
                    error = %err,
                    rows,
                    "Commit failed, session rolled back"
                );
                metrics::record_commit_failure(err.exception_type());
                return self.fail_evaluated(answers, requests.len(), &err);
            }
        };

        answers
            .into_iter()
            .map(|answer| match answer.origin {
                Origin::Staged => answer.result.stamped(commit_timestamp),
                Origin::Stored | Origin::Evaluated => answer.result,
            })
            .collect()
    }

    /// Evaluate every request, pushing one answer per request in order.
    ///
    /// Stops at the first store fault; `answers` then holds the answers
    /// produced before it.
    fn evaluate_group(
        &self,
        session: &mut dyn BackingStoreSession,
        requests: &[&UniquenessCheckRequest],
        answers: &mut Vec<Answer>,
        staged: &mut Vec<TransactionDetails>,
    ) -> Result<(), BackingStoreError> {
        // First write occurrence of each transaction id in this group.
        let mut first_seen: HashMap<TransactionId, usize> = HashMap::new();

        for request in requests {
            if let Some(&position) = first_seen.get(&request.tx_id) {
                debug!(tx_id = %request.tx_id, "Repeated transaction id in batch");
                let repeated = answers[position].clone();
                answers.push(repeated);
                continue;
            }

            let (answer, details) = self.evaluate_request(session, request)?;

            if request.request_type == RequestType::Write {
                first_seen.insert(request.tx_id, answers.len());
            }
            staged.extend(details);
            answers.push(answer);
        }

        Ok(())
    }

    /// Run one request through the pipeline.
    ///
    /// Returns the answer and the details row to persist, if any.
    fn evaluate_request(
        &self,
        session: &mut dyn BackingStoreSession,
        request: &UniquenessCheckRequest,
    ) -> Result<(Answer, Option<TransactionDetails>), BackingStoreError> {
        if let Some(stored) = session.find_transaction(&request.tx_id)? {
            debug!(
                tx_id = %request.tx_id,
                accepted = stored.is_accepted(),
                "Answering from stored verdict"
            );
            let answer = Answer {
                result: stored.to_result(),
                origin: Origin::Stored,
            };
            return Ok((answer, None));
        }

        let now = self.clock.now();

        if request.request_type == RequestType::ReadOnly {
            let answer = Answer {
                result: UniquenessCheckResult::failure(
                    UniquenessCheckError::NotPreviouslySeenTransaction,
                    now,
                ),
                origin: Origin::Evaluated,
            };
            return Ok((answer, None));
        }

        let (stage, verdict) = self.run_checks(session, request, now)?;

        debug!(
            tx_id = %request.tx_id,
            stage = ?stage,
            verdict = verdict.as_ref().err().map(|e| e.kind().as_str()).unwrap_or("success"),
            "Request evaluated"
        );

        let (result, details) = match verdict {
            Ok(()) => (
                UniquenessCheckResult::success(now),
                Some(TransactionDetails::accepted(request, now)),
            ),
            Err(rejection) => {
                if matches!(rejection, UniquenessCheckError::InputStateConflict { .. }) {
                    warn!(
                        tx_id = %request.tx_id,
                        initiator = %request.initiator,
                        "Rejected double-spend attempt"
                    );
                }
                let details = (rejection.is_persistent() && self.config.persist_rejections)
                    .then(|| TransactionDetails::rejected(request, rejection.clone(), now));
                (UniquenessCheckResult::failure(rejection, now), details)
            }
        };

        let origin = if details.is_some() {
            Origin::Staged
        } else {
            Origin::Evaluated
        };
        let answer = Answer { result, origin };
        Ok((answer, details))
    }

    /// Validation, time window and state checks, short-circuiting on the
    /// first failing stage. Returns the last stage passed.
    fn run_checks(
        &self,
        session: &mut dyn BackingStoreSession,
        request: &UniquenessCheckRequest,
        now: Timestamp,
    ) -> Result<(CheckStage, Result<(), UniquenessCheckError>), BackingStoreError> {
        if let Err(rejection) = validate_request(request) {
            return Ok((CheckStage::Received, Err(rejection)));
        }

        if let Err(rejection) = check_time_window(request, now) {
            return Ok((CheckStage::Validated, Err(rejection)));
        }

        match check_states(session, request)? {
            StateCheckOutcome::Accepted => Ok((CheckStage::ConflictChecked, Ok(()))),
            StateCheckOutcome::Rejected(rejection) => {
                Ok((CheckStage::TimeWindowChecked, Err(rejection)))
            }
        }
    }

    fn unhandled(&self, err: &BackingStoreError) -> UniquenessCheckResult {
        UniquenessCheckResult::failure(UniquenessCheckError::unhandled(err), self.clock.now())
    }

    /// Replace every non-stored answer, and every request not yet answered,
    /// with `UnhandledException`.
    fn fail_evaluated(
        &self,
        answers: Vec<Answer>,
        total: usize,
        err: &BackingStoreError,
    ) -> Vec<UniquenessCheckResult> {
        let failed = self.unhandled(err);
        let remaining = total - answers.len();

        answers
            .into_iter()
            .map(|answer| match answer.origin {
                Origin::Stored => answer.result,
                Origin::Evaluated | Origin::Staged => failed.clone(),
            })
            .chain(std::iter::repeat(failed.clone()).take(remaining))
            .collect()
    }
}

impl UniquenessCheckerApi for UniquenessCheckService {
    fn process_batch(&self, requests: Vec<UniquenessCheckRequest>) -> Vec<UniquenessCheckResponse> {
        let start_time = Instant::now();

        // Group by holding identity, keeping first-appearance order of groups
        // and arrival order within each group.
        let mut groups: Vec<(&HoldingIdentity, Vec<usize>)> = Vec::new();
        let mut group_of: HashMap<&HoldingIdentity, usize> = HashMap::new();
        for (index, request) in requests.iter().enumerate() {
            let group = *group_of.entry(&request.holding_identity).or_insert_with(|| {
                groups.push((&request.holding_identity, Vec::new()));
                groups.len() - 1
            });
            groups[group].1.push(index);
        }

        info!(
            batch_size = requests.len(),
            groups = groups.len(),
            "Processing uniqueness check batch"
        );

        let mut results: Vec<Option<UniquenessCheckResult>> = vec![None; requests.len()];
        for (holding_identity, indices) in &groups {
            let group_requests: Vec<&UniquenessCheckRequest> =
                indices.iter().map(|&i| &requests[i]).collect();
            let group_results = self.process_group(holding_identity, &group_requests);
            for (&index, result) in indices.iter().zip(group_results) {
                results[index] = Some(result);
            }
        }

        let responses: Vec<UniquenessCheckResponse> = requests
            .iter()
            .zip(results)
            .filter_map(|(request, result)| {
                result.map(|result| UniquenessCheckResponse {
                    tx_id: request.tx_id,
                    result,
                })
            })
            .collect();

        let accepted = responses.iter().filter(|r| r.result.is_success()).count();
        for response in &responses {
            metrics::record_result(response.result.label());
        }
        metrics::record_batch(requests.len(), start_time.elapsed().as_secs_f64());

        info!(
            batch_size = requests.len(),
            accepted,
            rejected = responses.len() - accepted,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Uniqueness check batch complete"
        );

        responses
    }
}
