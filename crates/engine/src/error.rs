// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the delivery engine

use drip_adapters::{SourceError, StoreError};
use drip_core::{CampaignId, NotFoundError, ProgressionError};
use thiserror::Error;

/// Errors that abort a batch run
///
/// Per-subject failures never abort a run; they are reported in the
/// [`BatchResult`](crate::BatchResult).
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("subject source failed for {campaign}: {source}")]
    Source {
        campaign: CampaignId,
        #[source]
        source: SourceError,
    },
}

/// Errors from delivering a single step
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("not found: {0}")]
    NotFound(#[from] NotFoundError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("progression error: {0}")]
    Progression(#[from] ProgressionError),
}
