// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subject progression adapters
//!
//! Progression records live in the host's persistence layer. The core reads
//! pages of them through [`SubjectSource`] and moves cursors through
//! [`ProgressionStore`], whose `advance` must be an atomic compare-and-set.

mod memory;

pub use memory::InMemoryProgressionStore;

use async_trait::async_trait;
use drip_core::{CampaignId, CursorAdvance, SubjectId, SubjectProgression};
use thiserror::Error;

/// Errors from reading subject pages
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("subject source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed subject record: {0}")]
    Malformed(String),
}

/// Errors from the progression store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("progression store unavailable: {0}")]
    Unavailable(String),
    #[error("subject {subject} is not enrolled in {campaign}")]
    NotEnrolled {
        subject: SubjectId,
        campaign: CampaignId,
    },
}

/// Result of a compare-and-set cursor advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The stored cursor matched and was moved
    Advanced,
    /// The stored cursor had changed; nothing was written
    Conflict,
}

/// Adapter yielding pages of subjects enrolled in a campaign
#[async_trait]
pub trait SubjectSource: Clone + Send + Sync + 'static {
    /// Up to `limit` subjects of `campaign`, in processing order
    ///
    /// Paging state belongs to the source.
    async fn fetch(
        &self,
        campaign: &CampaignId,
        limit: usize,
    ) -> Result<Vec<SubjectProgression>, SourceError>;
}

/// Adapter owning subject cursors
#[async_trait]
pub trait ProgressionStore: Clone + Send + Sync + 'static {
    /// Current record for a subject, if enrolled
    async fn load(
        &self,
        campaign: &CampaignId,
        subject: &SubjectId,
    ) -> Result<Option<SubjectProgression>, StoreError>;

    /// Atomically apply `advance` if the stored cursor equals `advance.expected`
    async fn advance(&self, advance: &CursorAdvance) -> Result<AdvanceOutcome, StoreError>;
}
