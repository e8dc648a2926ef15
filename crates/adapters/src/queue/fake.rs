// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake dispatch queue for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DispatchQueue, QueueError};
use async_trait::async_trait;
use drip_core::DeliveryJob;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct FakeQueueState {
    jobs: Vec<DeliveryJob>,
    reject: HashSet<String>,
    closed: bool,
}

/// Queue that records jobs instead of delivering them
#[derive(Clone, Debug)]
pub struct FakeDispatchQueue {
    name: String,
    state: Arc<Mutex<FakeQueueState>>,
}

impl FakeDispatchQueue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(FakeQueueState::default())),
        }
    }

    /// Reject jobs for this subject
    pub fn reject_for(&self, subject: impl Into<String>) {
        self.lock().reject.insert(subject.into());
    }

    /// Reject every further job as closed
    pub fn close(&self) {
        self.lock().closed = true;
    }

    /// Recorded jobs, in enqueue order
    pub fn jobs(&self) -> Vec<DeliveryJob> {
        self.lock().jobs.clone()
    }

    /// Remove and return recorded jobs
    pub fn drain(&self) -> Vec<DeliveryJob> {
        std::mem::take(&mut self.lock().jobs)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeQueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for FakeDispatchQueue {
    fn default() -> Self {
        Self::new("fake")
    }
}

#[async_trait]
impl DispatchQueue for FakeDispatchQueue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn enqueue(&self, job: DeliveryJob) -> Result<(), QueueError> {
        let mut state = self.lock();
        if state.closed {
            return Err(QueueError::Closed(self.name.clone()));
        }
        if state.reject.contains(job.subject.subject_id.as_str()) {
            return Err(QueueError::Rejected {
                queue: self.name.clone(),
                reason: format!("rejected subject {}", job.subject.subject_id),
            });
        }
        state.jobs.push(job);
        Ok(())
    }
}
