// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake dispatcher for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::Dispatcher;
use async_trait::async_trait;
use drip_core::{
    ActionId, CampaignId, DispatchOutcome, HandlerRef, ParameterMode, StepDefinition, SubjectId,
    SubjectProgression,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchCall {
    pub campaign: CampaignId,
    pub action: ActionId,
    pub ordinal: u32,
    pub handler: HandlerRef,
    pub parameter_mode: ParameterMode,
    pub subject: SubjectId,
}

#[derive(Default)]
struct FakeDispatcherState {
    calls: Vec<DispatchCall>,
    failures: HashMap<SubjectId, String>,
    fail_all: Option<String>,
    delay: Option<Duration>,
}

/// Fake dispatcher for testing
///
/// Records every call. Succeeds unless told to fail for a subject or for
/// everyone.
#[derive(Clone, Default)]
pub struct FakeDispatcher {
    inner: Arc<Mutex<FakeDispatcherState>>,
}

impl FakeDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every dispatch for `subject` until cleared
    pub fn fail_for(&self, subject: impl Into<SubjectId>, reason: impl Into<String>) {
        self.lock().failures.insert(subject.into(), reason.into());
    }

    /// Fail every dispatch until cleared
    pub fn fail_all(&self, reason: impl Into<String>) {
        self.lock().fail_all = Some(reason.into());
    }

    /// Stop injecting failures
    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.failures.clear();
        state.fail_all = None;
    }

    /// Sleep this long before answering
    pub fn set_delay(&self, delay: Duration) {
        self.lock().delay = Some(delay);
    }

    /// Get all recorded dispatches
    pub fn calls(&self) -> Vec<DispatchCall> {
        self.lock().calls.clone()
    }

    /// Recorded dispatches for one subject
    pub fn calls_for(&self, subject: &str) -> Vec<DispatchCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.subject.as_str() == subject)
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeDispatcherState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Dispatcher for FakeDispatcher {
    async fn dispatch(
        &self,
        step: &StepDefinition,
        subject: &SubjectProgression,
    ) -> DispatchOutcome {
        let delay = {
            let mut state = self.lock();
            state.calls.push(DispatchCall {
                campaign: step.campaign_id().clone(),
                action: step.action_id().clone(),
                ordinal: step.ordinal(),
                handler: step.handler().clone(),
                parameter_mode: step.parameter_mode(),
                subject: subject.subject_id.clone(),
            });
            state.delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.lock();
        if let Some(reason) = &state.fail_all {
            return DispatchOutcome::failure(reason.clone());
        }
        match state.failures.get(&subject.subject_id) {
            Some(reason) => DispatchOutcome::failure(reason.clone()),
            None => DispatchOutcome::Success,
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
