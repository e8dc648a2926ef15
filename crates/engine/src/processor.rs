// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch processing of campaign subjects

use crate::step::{advance_cursor, dispatch_step};
use crate::BatchError;
use drip_adapters::{AdvanceOutcome, DispatchQueue, Dispatcher, ProgressionStore, SubjectSource};
use drip_core::{
    evaluate, CampaignDefinition, Clock, ConfigurationError, DeliveryConfig, DeliveryJob,
    DispatchFailure, DispatchOutcome, Resolution, StepDefinition, SubjectProgression,
};
use tracing::Instrument;

/// How due steps leave the batch
pub enum Delivery<D, Q> {
    /// Dispatch inline and advance the cursor before the next subject
    Inline(D),
    /// Enqueue a job for a worker
    Queued(Q),
}

impl<D, Q> Delivery<D, Q>
where
    D: Dispatcher,
    Q: DispatchQueue,
{
    /// Pick the delivery mode `config` asks for
    ///
    /// Async delivery needs `queue`, and its name must match the configured
    /// `dispatch_queue`.
    pub fn from_config(
        config: &DeliveryConfig,
        dispatcher: D,
        queue: Option<Q>,
    ) -> Result<Self, ConfigurationError> {
        if !config.async_delivery {
            return Ok(Delivery::Inline(dispatcher));
        }
        let queue = queue.ok_or(ConfigurationError::MissingDispatchQueue)?;
        config.expect_queue(queue.name())?;
        Ok(Delivery::Queued(queue))
    }

    fn mode(&self) -> &'static str {
        match self {
            Delivery::Inline(_) => "inline",
            Delivery::Queued(_) => "queued",
        }
    }
}

/// Adapter dependencies for a batch processor
pub struct BatchDeps<S, P, D, Q> {
    pub source: S,
    pub store: P,
    pub delivery: Delivery<D, Q>,
}

/// Summary of one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Steps dispatched inline
    pub dispatched: usize,
    /// Steps handed to the dispatch queue
    pub enqueued: usize,
    /// Subjects whose next step is not yet due
    pub skipped_not_due: usize,
    /// Subjects held back by the due step's guard
    pub skipped_by_guard: usize,
    /// Subjects with no steps left
    pub complete: usize,
    /// Subjects whose delivery failed this run
    pub failed: Vec<DispatchFailure>,
    /// Dispatched steps whose cursor had already moved
    pub conflicts: usize,
    /// Records belonging to another campaign
    pub ignored: usize,
}

impl BatchResult {
    /// Number of subjects the run looked at
    pub fn processed(&self) -> usize {
        self.dispatched
            + self.enqueued
            + self.skipped_not_due
            + self.skipped_by_guard
            + self.complete
            + self.failed.len()
            + self.ignored
    }
}

/// Processes pages of subjects for a campaign
pub struct BatchProcessor<C, S, P, D, Q> {
    config: DeliveryConfig,
    clock: C,
    source: S,
    store: P,
    delivery: Delivery<D, Q>,
}

impl<C, S, P, D, Q> BatchProcessor<C, S, P, D, Q>
where
    C: Clock,
    S: SubjectSource,
    P: ProgressionStore,
    D: Dispatcher,
    Q: DispatchQueue,
{
    /// Create a processor; `config` should already be validated
    pub fn new(config: DeliveryConfig, clock: C, deps: BatchDeps<S, P, D, Q>) -> Self {
        Self {
            config,
            clock,
            source: deps.source,
            store: deps.store,
            delivery: deps.delivery,
        }
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Process up to `batch_size` subjects of `campaign`
    ///
    /// Only a subject source failure aborts the run.
    pub async fn run_batch(&self, campaign: &CampaignDefinition) -> Result<BatchResult, BatchError> {
        let span = tracing::info_span!(
            "batch",
            campaign = %campaign.id(),
            mode = self.delivery.mode(),
            batch_size = self.config.batch_size,
        );

        async {
            let start = std::time::Instant::now();
            let page = self
                .source
                .fetch(campaign.id(), self.config.batch_size)
                .await
                .map_err(|source| {
                    tracing::error!(error = %source, "subject fetch failed");
                    BatchError::Source {
                        campaign: campaign.id().clone(),
                        source,
                    }
                })?;

            let mut result = BatchResult::default();
            for subject in &page {
                self.process(campaign, subject, &mut result).await;
            }

            tracing::info!(
                subjects = page.len(),
                dispatched = result.dispatched,
                enqueued = result.enqueued,
                skipped_not_due = result.skipped_not_due,
                skipped_by_guard = result.skipped_by_guard,
                complete = result.complete,
                failed = result.failed.len(),
                conflicts = result.conflicts,
                ignored = result.ignored,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "batch complete"
            );
            Ok::<_, BatchError>(result)
        }
        .instrument(span)
        .await
    }

    async fn process(
        &self,
        campaign: &CampaignDefinition,
        subject: &SubjectProgression,
        result: &mut BatchResult,
    ) {
        if &subject.campaign_id != campaign.id() {
            tracing::warn!(
                subject = %subject.subject_id,
                found = %subject.campaign_id,
                "subject belongs to another campaign"
            );
            result.ignored += 1;
            return;
        }

        match evaluate(campaign, subject, self.clock.now()) {
            Resolution::Complete => result.complete += 1,
            Resolution::Pending { step, due_at } => {
                tracing::trace!(
                    subject = %subject.subject_id,
                    action = %step.action_id(),
                    %due_at,
                    "not due"
                );
                result.skipped_not_due += 1;
            }
            Resolution::Due(step) if !step.allows(subject) => {
                tracing::debug!(
                    subject = %subject.subject_id,
                    action = %step.action_id(),
                    "held by step guard"
                );
                result.skipped_by_guard += 1;
            }
            Resolution::Due(step) => match &self.delivery {
                Delivery::Inline(dispatcher) => {
                    self.deliver_inline(dispatcher, step, subject, result).await
                }
                Delivery::Queued(queue) => {
                    match queue.enqueue(DeliveryJob::new(step, subject)).await {
                        Ok(()) => result.enqueued += 1,
                        Err(e) => record_failure(result, step, subject, e.to_string()),
                    }
                }
            },
        }
    }

    async fn deliver_inline(
        &self,
        dispatcher: &D,
        step: &StepDefinition,
        subject: &SubjectProgression,
        result: &mut BatchResult,
    ) {
        let outcome = dispatch_step(dispatcher, step, subject, self.config.dispatch_timeout).await;
        if let DispatchOutcome::Failure(reason) = outcome {
            record_failure(result, step, subject, reason);
            return;
        }

        match advance_cursor(&self.store, step, subject, self.clock.now()).await {
            Ok(AdvanceOutcome::Advanced) => result.dispatched += 1,
            Ok(AdvanceOutcome::Conflict) => {
                tracing::warn!(
                    subject = %subject.subject_id,
                    action = %step.action_id(),
                    "cursor moved during dispatch"
                );
                result.dispatched += 1;
                result.conflicts += 1;
            }
            // Dispatched but not recorded; the next run offers the step again
            Err(e) => record_failure(result, step, subject, format!("cursor advance failed: {e}")),
        }
    }
}

fn record_failure(
    result: &mut BatchResult,
    step: &StepDefinition,
    subject: &SubjectProgression,
    reason: String,
) {
    tracing::warn!(
        subject = %subject.subject_id,
        action = %step.action_id(),
        ordinal = step.ordinal(),
        reason = %reason,
        "delivery failed"
    );
    result.failed.push(DispatchFailure {
        subject_id: subject.subject_id.clone(),
        action_id: step.action_id().clone(),
        ordinal: step.ordinal(),
        reason,
    });
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
