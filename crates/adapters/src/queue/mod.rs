// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch queue adapters

mod channel;
#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use channel::ChannelDispatchQueue;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeDispatchQueue;

use async_trait::async_trait;
use drip_core::DeliveryJob;
use thiserror::Error;

/// Errors from enqueueing a delivery job
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("dispatch queue {0} is full")]
    Full(String),
    #[error("dispatch queue {0} is closed")]
    Closed(String),
    #[error("dispatch queue {queue} rejected job: {reason}")]
    Rejected { queue: String, reason: String },
}

/// Adapter handing delivery jobs to an asynchronous worker
#[async_trait]
pub trait DispatchQueue: Clone + Send + Sync + 'static {
    /// Name the queue was configured under
    fn name(&self) -> &str;

    /// Hand off a job; a returned error means the job was not accepted
    async fn enqueue(&self, job: DeliveryJob) -> Result<(), QueueError>;
}
