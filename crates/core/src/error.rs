// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types shared across the drip core

use crate::id::{ActionId, CampaignId, HandlerRef, SubjectId};
use thiserror::Error;

/// A campaign definition or delivery configuration is malformed
///
/// Raised during the registration phase. These are fatal to startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("campaign {campaign} is already declared")]
    DuplicateCampaign { campaign: CampaignId },
    #[error("{action} is already registered on campaign {campaign}")]
    DuplicateAction {
        campaign: CampaignId,
        action: ActionId,
    },
    #[error("{action} on campaign {campaign} has no handler and the campaign has no default")]
    MissingHandler {
        campaign: CampaignId,
        action: ActionId,
    },
    #[error("{action} on campaign {campaign} references unknown handler {handler}")]
    UnknownHandler {
        campaign: CampaignId,
        action: ActionId,
        handler: HandlerRef,
    },
    #[error("{action} on campaign {campaign} must define delay or every")]
    MissingTiming {
        campaign: CampaignId,
        action: ActionId,
    },
    #[error("{action} on campaign {campaign} has a negative {option}")]
    NegativeDuration {
        campaign: CampaignId,
        action: ActionId,
        option: &'static str,
    },
    #[error("{action} on campaign {campaign} recurs every zero seconds")]
    ZeroInterval {
        campaign: CampaignId,
        action: ActionId,
    },
    #[error("{action} on campaign {campaign} has ordinal 0, ordinals start at 1")]
    InvalidOrdinal {
        campaign: CampaignId,
        action: ActionId,
    },
    #[error("{action} on campaign {campaign} reuses ordinal {ordinal} of {existing}")]
    DuplicateOrdinal {
        campaign: CampaignId,
        action: ActionId,
        ordinal: u32,
        existing: ActionId,
    },
    #[error("campaign {campaign} has no steps")]
    EmptyCampaign { campaign: CampaignId },
    #[error("batch_size must be a positive integer")]
    InvalidBatchSize,
    #[error("async delivery requires a dispatch_queue")]
    MissingDispatchQueue,
    #[error("dispatch_queue {expected} does not match the configured queue {found}")]
    UnknownDispatchQueue { expected: String, found: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A lookup named a campaign or step that was never registered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    #[error("campaign not found: {0}")]
    Campaign(CampaignId),
    #[error("step {action} not found on campaign {campaign}")]
    Action {
        campaign: CampaignId,
        action: ActionId,
    },
}

/// An attempted cursor move that would break monotonic progression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressionError {
    #[error("subject {subject} already completed ordinal {completed}, cannot move to {ordinal}")]
    Regression {
        subject: SubjectId,
        completed: u32,
        ordinal: u32,
    },
    #[error("subject {subject} already completed step {ordinal}")]
    Repeated { subject: SubjectId, ordinal: u32 },
    #[error("subject {subject} belongs to campaign {found}, not {expected}")]
    CampaignMismatch {
        subject: SubjectId,
        expected: CampaignId,
        found: CampaignId,
    },
}
