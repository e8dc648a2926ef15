// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Asynchronous delivery of queued jobs

use crate::step::{advance_cursor, dispatch_step};
use crate::DeliveryError;
use drip_adapters::{AdvanceOutcome, Dispatcher, ProgressionStore};
use drip_core::{Campaigns, Clock, DeliveryConfig, DeliveryJob, DispatchFailure, DispatchOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Instrument;

/// What happened to one delivery job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Dispatched and recorded on the cursor
    Delivered,
    /// Dispatch failed; the cursor is untouched
    Failed(DispatchFailure),
    /// The subject moved on (or left) since the job was enqueued
    Stale,
    /// Dispatched, but another worker advanced the cursor first
    Conflict,
    /// The step's guard rejected the subject; a later batch re-enqueues it
    Guarded,
}

/// Counts from a worker run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub delivered: usize,
    pub failed: usize,
    pub stale: usize,
    pub conflicts: usize,
    pub guarded: usize,
    pub errors: usize,
}

/// Dispatches jobs enqueued by a batch run
pub struct DeliveryWorker<C, P, D> {
    campaigns: Arc<Campaigns>,
    store: P,
    dispatcher: D,
    clock: C,
    dispatch_timeout: Option<Duration>,
}

impl<C, P, D> DeliveryWorker<C, P, D>
where
    C: Clock,
    P: ProgressionStore,
    D: Dispatcher,
{
    pub fn new(campaigns: Arc<Campaigns>, store: P, dispatcher: D, clock: C) -> Self {
        Self {
            campaigns,
            store,
            dispatcher,
            clock,
            dispatch_timeout: None,
        }
    }

    /// Apply the dispatch timeout from `config`
    pub fn with_config(mut self, config: &DeliveryConfig) -> Self {
        self.dispatch_timeout = config.dispatch_timeout;
        self
    }

    /// Deliver one job
    ///
    /// The stored progression is re-read first; a job whose cursor no longer
    /// matches is dropped as stale without dispatching. The step guard is
    /// checked against the stored progression.
    pub async fn deliver(&self, job: DeliveryJob) -> Result<JobOutcome, DeliveryError> {
        let span = tracing::info_span!(
            "deliver",
            campaign = %job.campaign_id,
            action = %job.action_id,
            subject = %job.subject.subject_id,
        );
        self.deliver_inner(job).instrument(span).await
    }

    async fn deliver_inner(&self, job: DeliveryJob) -> Result<JobOutcome, DeliveryError> {
        let step = self.campaigns.step_for(&job.campaign_id, &job.action_id)?;
        if step.ordinal() != job.ordinal {
            tracing::warn!(
                queued = job.ordinal,
                registered = step.ordinal(),
                "step ordinal changed since enqueue"
            );
            return Ok(JobOutcome::Stale);
        }

        let current = self
            .store
            .load(&job.campaign_id, &job.subject.subject_id)
            .await?;
        let Some(current) = current else {
            tracing::info!("subject no longer enrolled");
            return Ok(JobOutcome::Stale);
        };
        if current.cursor() != job.subject.cursor() {
            tracing::info!(
                queued = ?job.subject.last_completed_ordinal,
                stored = ?current.last_completed_ordinal,
                "cursor moved since enqueue"
            );
            return Ok(JobOutcome::Stale);
        }
        if !step.allows(&current) {
            tracing::info!("held by step guard");
            return Ok(JobOutcome::Guarded);
        }

        match dispatch_step(&self.dispatcher, step, &current, self.dispatch_timeout).await {
            DispatchOutcome::Success => {}
            DispatchOutcome::Failure(reason) => {
                tracing::warn!(reason = %reason, "delivery failed");
                return Ok(JobOutcome::Failed(DispatchFailure {
                    subject_id: current.subject_id.clone(),
                    action_id: step.action_id().clone(),
                    ordinal: step.ordinal(),
                    reason,
                }));
            }
        }

        match advance_cursor(&self.store, step, &current, self.clock.now()).await? {
            AdvanceOutcome::Advanced => Ok(JobOutcome::Delivered),
            AdvanceOutcome::Conflict => {
                tracing::warn!("cursor moved during dispatch");
                Ok(JobOutcome::Conflict)
            }
        }
    }

    /// Drain `rx` until every sender is dropped
    pub async fn run(&self, mut rx: mpsc::Receiver<DeliveryJob>) -> WorkerReport {
        let mut report = WorkerReport::default();
        while let Some(job) = rx.recv().await {
            match self.deliver(job).await {
                Ok(JobOutcome::Delivered) => report.delivered += 1,
                Ok(JobOutcome::Failed(_)) => report.failed += 1,
                Ok(JobOutcome::Stale) => report.stale += 1,
                Ok(JobOutcome::Conflict) => report.conflicts += 1,
                Ok(JobOutcome::Guarded) => report.guarded += 1,
                Err(e) => {
                    tracing::error!(error = %e, "delivery error");
                    report.errors += 1;
                }
            }
        }
        tracing::info!(
            delivered = report.delivered,
            failed = report.failed,
            stale = report.stale,
            conflicts = report.conflicts,
            guarded = report.guarded,
            errors = report.errors,
            "worker stopped"
        );
        report
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
