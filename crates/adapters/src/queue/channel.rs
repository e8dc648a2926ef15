// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded in-process dispatch queue

use super::{DispatchQueue, QueueError};
use async_trait::async_trait;
use drip_core::DeliveryJob;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Dispatch queue backed by a bounded tokio channel
///
/// Enqueue never waits: a full channel is reported as [`QueueError::Full`]
/// so a batch run cannot stall behind a slow worker.
#[derive(Clone, Debug)]
pub struct ChannelDispatchQueue {
    name: Arc<str>,
    tx: mpsc::Sender<DeliveryJob>,
}

impl ChannelDispatchQueue {
    /// Create a queue and the receiver its worker drains
    pub fn new(name: impl Into<String>, capacity: usize) -> (Self, mpsc::Receiver<DeliveryJob>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let name: String = name.into();
        (
            Self {
                name: Arc::from(name),
                tx,
            },
            rx,
        )
    }
}

#[async_trait]
impl DispatchQueue for ChannelDispatchQueue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn enqueue(&self, job: DeliveryJob) -> Result<(), QueueError> {
        self.tx.try_send(job).map_err(|e| match e {
            TrySendError::Full(_) => QueueError::Full(self.name.to_string()),
            TrySendError::Closed(_) => QueueError::Closed(self.name.to_string()),
        })
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
