// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::dispatch::Dispatcher;
use crate::progress::{AdvanceOutcome, ProgressionStore, SourceError, StoreError, SubjectSource};
use crate::queue::{DispatchQueue, QueueError};
use async_trait::async_trait;
use drip_core::{
    CampaignId, CursorAdvance, DeliveryJob, DispatchOutcome, StepDefinition, SubjectId,
    SubjectProgression,
};
use tracing::Instrument;

/// Wrapper that adds tracing to any Dispatcher
#[derive(Clone)]
pub struct TracedDispatcher<D> {
    inner: D,
}

impl<D> TracedDispatcher<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<D: Dispatcher> Dispatcher for TracedDispatcher<D> {
    async fn dispatch(&self, step: &StepDefinition, subject: &SubjectProgression) -> DispatchOutcome {
        let span = tracing::info_span!(
            "dispatch",
            campaign = %step.campaign_id(),
            action = %step.action_id(),
            ordinal = step.ordinal(),
            subject = %subject.subject_id,
        );

        async {
            tracing::info!(handler = %step.handler(), "starting");

            let start = std::time::Instant::now();
            let outcome = self.inner.dispatch(step, subject).await;
            let elapsed = start.elapsed();

            match &outcome {
                DispatchOutcome::Success => tracing::info!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "dispatched"
                ),
                DispatchOutcome::Failure(reason) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    reason = %reason,
                    "dispatch failed"
                ),
            }

            outcome
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to a subject source and progression store
#[derive(Clone)]
pub struct TracedProgressionStore<P> {
    inner: P,
}

impl<P> TracedProgressionStore<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: SubjectSource> SubjectSource for TracedProgressionStore<P> {
    async fn fetch(
        &self,
        campaign: &CampaignId,
        limit: usize,
    ) -> Result<Vec<SubjectProgression>, SourceError> {
        let result = self.inner.fetch(campaign, limit).await;
        match &result {
            Ok(page) => tracing::debug!(%campaign, limit, count = page.len(), "fetched subjects"),
            Err(e) => tracing::error!(%campaign, limit, error = %e, "fetch failed"),
        }
        result
    }
}

#[async_trait]
impl<P: ProgressionStore> ProgressionStore for TracedProgressionStore<P> {
    async fn load(
        &self,
        campaign: &CampaignId,
        subject: &SubjectId,
    ) -> Result<Option<SubjectProgression>, StoreError> {
        let result = self.inner.load(campaign, subject).await;
        tracing::trace!(
            %campaign,
            %subject,
            found = ?result.as_ref().map(|r| r.is_some()).ok(),
            "loaded"
        );
        result
    }

    async fn advance(&self, advance: &CursorAdvance) -> Result<AdvanceOutcome, StoreError> {
        let span = tracing::info_span!(
            "progression.advance",
            campaign = %advance.campaign_id,
            subject = %advance.subject_id,
            ordinal = ?advance.next.ordinal,
        );

        async {
            let result = self.inner.advance(advance).await;
            match &result {
                Ok(AdvanceOutcome::Advanced) => tracing::debug!("cursor advanced"),
                // Another worker moved the cursor first
                Ok(AdvanceOutcome::Conflict) => {
                    tracing::warn!(expected = ?advance.expected.ordinal, "cursor conflict")
                }
                Err(e) => tracing::error!(error = %e, "advance failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any DispatchQueue
#[derive(Clone)]
pub struct TracedDispatchQueue<Q> {
    inner: Q,
}

impl<Q> TracedDispatchQueue<Q> {
    pub fn new(inner: Q) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<Q: DispatchQueue> DispatchQueue for TracedDispatchQueue<Q> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn enqueue(&self, job: DeliveryJob) -> Result<(), QueueError> {
        let queue = self.inner.name().to_string();
        let campaign = job.campaign_id.clone();
        let action = job.action_id.clone();
        let subject = job.subject.subject_id.clone();

        let result = self.inner.enqueue(job).await;
        match &result {
            Ok(()) => tracing::debug!(queue = %queue, %campaign, %action, %subject, "enqueued"),
            Err(e) => tracing::error!(queue = %queue, %campaign, %action, %subject, error = %e, "enqueue failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
