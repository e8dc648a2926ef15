// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subject progression through a campaign
//!
//! Progression records are owned by the persistence layer. The core reads
//! them and produces [`CursorAdvance`] requests, which the store applies as
//! an atomic compare-and-set against the cursor it was built from.

use crate::error::ProgressionError;
use crate::id::{CampaignId, SubjectId};
use crate::step::StepDefinition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a subject stands in its campaign
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Highest ordinal successfully dispatched
    pub ordinal: Option<u32>,
    /// When that dispatch succeeded
    pub dispatched_at: Option<DateTime<Utc>>,
}

/// A subject enrolled in a campaign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectProgression {
    pub subject_id: SubjectId,
    pub campaign_id: CampaignId,
    pub enrolled_at: DateTime<Utc>,
    #[serde(default)]
    pub last_completed_ordinal: Option<u32>,
    #[serde(default)]
    pub last_dispatched_at: Option<DateTime<Utc>>,
}

impl SubjectProgression {
    /// A freshly enrolled subject with nothing completed
    pub fn enroll(
        subject: impl Into<SubjectId>,
        campaign: impl Into<CampaignId>,
        enrolled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject_id: subject.into(),
            campaign_id: campaign.into(),
            enrolled_at,
            last_completed_ordinal: None,
            last_dispatched_at: None,
        }
    }

    pub fn cursor(&self) -> Cursor {
        Cursor {
            ordinal: self.last_completed_ordinal,
            dispatched_at: self.last_dispatched_at,
        }
    }

    /// Copy of this record with its cursor replaced
    pub fn with_cursor(&self, cursor: Cursor) -> Self {
        Self {
            last_completed_ordinal: cursor.ordinal,
            last_dispatched_at: cursor.dispatched_at,
            ..self.clone()
        }
    }

    /// Build the advance that records `step` as dispatched at `at`
    ///
    /// Refuses to move the cursor backwards. A completed step may only be
    /// completed again when it recurs.
    pub fn advance_to(
        &self,
        step: &StepDefinition,
        at: DateTime<Utc>,
    ) -> Result<CursorAdvance, ProgressionError> {
        if step.campaign_id() != &self.campaign_id {
            return Err(ProgressionError::CampaignMismatch {
                subject: self.subject_id.clone(),
                expected: step.campaign_id().clone(),
                found: self.campaign_id.clone(),
            });
        }

        let ordinal = step.ordinal();
        match self.last_completed_ordinal {
            Some(completed) if ordinal < completed => {
                return Err(ProgressionError::Regression {
                    subject: self.subject_id.clone(),
                    completed,
                    ordinal,
                })
            }
            Some(completed) if ordinal == completed && !step.is_recurring() => {
                return Err(ProgressionError::Repeated {
                    subject: self.subject_id.clone(),
                    ordinal,
                })
            }
            _ => {}
        }

        Ok(CursorAdvance {
            subject_id: self.subject_id.clone(),
            campaign_id: self.campaign_id.clone(),
            expected: self.cursor(),
            next: Cursor {
                ordinal: Some(ordinal),
                dispatched_at: Some(at),
            },
        })
    }
}

/// A compare-and-set request against a subject's cursor
///
/// Stores must apply `next` only if the stored cursor still equals
/// `expected`, and report a conflict otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorAdvance {
    pub subject_id: SubjectId,
    pub campaign_id: CampaignId,
    pub expected: Cursor,
    pub next: Cursor,
}

impl CursorAdvance {
    /// Apply to `current`, or `None` when `current` has moved on
    pub fn apply(&self, current: &SubjectProgression) -> Option<SubjectProgression> {
        if current.subject_id != self.subject_id
            || current.campaign_id != self.campaign_id
            || current.cursor() != self.expected
        {
            return None;
        }
        Some(current.with_cursor(self.next))
    }
}

#[cfg(test)]
#[path = "progression_tests.rs"]
mod tests;
