// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatching a single step and recording it on the subject's cursor

use crate::DeliveryError;
use chrono::{DateTime, Utc};
use drip_adapters::{AdvanceOutcome, Dispatcher, ProgressionStore};
use drip_core::{DispatchOutcome, StepDefinition, SubjectProgression};
use std::time::Duration;

/// Dispatch `step` for `subject`, converting an overrun into a failure
pub async fn dispatch_step<D: Dispatcher + ?Sized>(
    dispatcher: &D,
    step: &StepDefinition,
    subject: &SubjectProgression,
    timeout: Option<Duration>,
) -> DispatchOutcome {
    let Some(limit) = timeout else {
        return dispatcher.dispatch(step, subject).await;
    };

    match tokio::time::timeout(limit, dispatcher.dispatch(step, subject)).await {
        Ok(outcome) => outcome,
        Err(_) => DispatchOutcome::failure(format!("dispatch timed out after {limit:?}")),
    }
}

/// Record `step` as dispatched at `at` for the subject snapshot `subject`
///
/// The store applies the move only if its cursor still equals the
/// snapshot's; otherwise the outcome is [`AdvanceOutcome::Conflict`].
pub async fn advance_cursor<P: ProgressionStore>(
    store: &P,
    step: &StepDefinition,
    subject: &SubjectProgression,
    at: DateTime<Utc>,
) -> Result<AdvanceOutcome, DeliveryError> {
    let advance = subject.advance_to(step, at)?;
    Ok(store.advance(&advance).await?)
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
