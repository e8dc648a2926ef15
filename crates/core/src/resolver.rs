// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Due-step resolution
//!
//! Resolution is a pure function of a campaign definition, one subject's
//! progression and the evaluation time. Only the step immediately after the
//! cursor is ever considered, so a subject cannot skip ahead even when
//! several steps are overdue. A missing successor ordinal completes the
//! subject. A completed recurring step is re-offered one interval after its
//! last successful dispatch, until the step after it falls due.

use crate::campaign::CampaignDefinition;
use crate::clock::Clock;
use crate::progression::SubjectProgression;
use crate::step::{StepDefinition, TimingRule};
use chrono::{DateTime, Utc};

/// Outcome of evaluating one subject against its campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The next step is due now
    Due(&'a StepDefinition),
    /// The next step exists but is not due until `due_at`
    Pending {
        step: &'a StepDefinition,
        due_at: DateTime<Utc>,
    },
    /// No steps remain for this subject
    Complete,
}

impl<'a> Resolution<'a> {
    pub fn due_step(self) -> Option<&'a StepDefinition> {
        match self {
            Resolution::Due(step) => Some(step),
            Resolution::Pending { .. } | Resolution::Complete => None,
        }
    }
}

/// The step a subject would receive next, regardless of timing
///
/// The successor of the cursor wins over re-offering a completed recurring
/// step.
pub fn next_step<'a>(
    campaign: &'a CampaignDefinition,
    progression: &SubjectProgression,
) -> Option<&'a StepDefinition> {
    let (successor, repeating) = candidates(campaign, progression);
    successor.or(repeating)
}

fn candidates<'a>(
    campaign: &'a CampaignDefinition,
    progression: &SubjectProgression,
) -> (Option<&'a StepDefinition>, Option<&'a StepDefinition>) {
    match progression.last_completed_ordinal {
        None => (campaign.first(), None),
        Some(completed) => (
            completed.checked_add(1).and_then(|n| campaign.step_at(n)),
            campaign.step_at(completed).filter(|s| s.is_recurring()),
        ),
    }
}

/// When `step` falls due for this subject
pub fn due_at(step: &StepDefinition, progression: &SubjectProgression) -> DateTime<Utc> {
    match step.timing_rule() {
        TimingRule::FixedDelay(_) => step.first_due_at(progression.enrolled_at),
        TimingRule::RecurringInterval { every, .. } => {
            if progression.last_completed_ordinal == Some(step.ordinal()) {
                let anchor = progression
                    .last_dispatched_at
                    .unwrap_or(progression.enrolled_at);
                anchor
                    .checked_add_signed(*every)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC)
            } else {
                step.first_due_at(progression.enrolled_at)
            }
        }
    }
}

/// Evaluate which step, if any, is due for `progression` at `now`
pub fn evaluate<'a>(
    campaign: &'a CampaignDefinition,
    progression: &SubjectProgression,
    now: DateTime<Utc>,
) -> Resolution<'a> {
    let (successor, repeating) = candidates(campaign, progression);

    let mut pending: Option<(&'a StepDefinition, DateTime<Utc>)> = None;
    for step in successor.into_iter().chain(repeating) {
        let due_at = due_at(step, progression);
        if now >= progression.enrolled_at && now >= due_at {
            return Resolution::Due(step);
        }
        if pending.map_or(true, |(_, earliest)| due_at < earliest) {
            pending = Some((step, due_at));
        }
    }

    match pending {
        Some((step, due_at)) => Resolution::Pending { step, due_at },
        None => Resolution::Complete,
    }
}

/// The step due for `progression` at `now`, if any
pub fn resolve_due_step<'a>(
    campaign: &'a CampaignDefinition,
    progression: &SubjectProgression,
    now: DateTime<Utc>,
) -> Option<&'a StepDefinition> {
    evaluate(campaign, progression, now).due_step()
}

/// Resolves due steps against an injected clock
#[derive(Debug, Clone)]
pub struct EligibilityResolver<C: Clock> {
    clock: C,
}

impl<C: Clock> EligibilityResolver<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn evaluate<'a>(
        &self,
        campaign: &'a CampaignDefinition,
        progression: &SubjectProgression,
    ) -> Resolution<'a> {
        evaluate(campaign, progression, self.clock.now())
    }

    pub fn resolve<'a>(
        &self,
        campaign: &'a CampaignDefinition,
        progression: &SubjectProgression,
    ) -> Option<&'a StepDefinition> {
        resolve_due_step(campaign, progression, self.clock.now())
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
