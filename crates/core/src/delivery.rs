// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch outcomes and queued delivery work

use crate::id::{ActionId, CampaignId, SubjectId};
use crate::progression::SubjectProgression;
use crate::step::StepDefinition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of handing one step to an external handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Success,
    Failure(String),
}

impl DispatchOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        DispatchOutcome::Failure(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Success)
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Success => write!(f, "success"),
            DispatchOutcome::Failure(reason) => write!(f, "failure: {reason}"),
        }
    }
}

/// A failed dispatch, reported back to the batch caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchFailure {
    pub subject_id: SubjectId,
    pub action_id: ActionId,
    pub ordinal: u32,
    pub reason: String,
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} for {} (#{}): {}",
            self.action_id, self.subject_id, self.ordinal, self.reason
        )
    }
}

/// Work handed to the async execution facility
///
/// Carries the subject snapshot the step was resolved against; its cursor is
/// the compare-and-set key when the job completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryJob {
    pub campaign_id: CampaignId,
    pub action_id: ActionId,
    pub ordinal: u32,
    pub subject: SubjectProgression,
}

impl DeliveryJob {
    pub fn new(step: &StepDefinition, subject: &SubjectProgression) -> Self {
        Self {
            campaign_id: step.campaign_id().clone(),
            action_id: step.action_id().clone(),
            ordinal: step.ordinal(),
            subject: subject.clone(),
        }
    }
}

#[cfg(test)]
#[path = "delivery_tests.rs"]
mod tests;
