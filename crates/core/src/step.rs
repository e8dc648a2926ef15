// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step definitions: one timed action within a campaign
//!
//! A step is immutable once registered. The registry validates the
//! [`StepOptions`] and assigns ordinals; nothing else constructs steps.

use crate::id::{ActionId, CampaignId, HandlerRef};
use crate::progression::SubjectProgression;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// When a step becomes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingRule {
    /// Due once, a fixed delay after enrollment
    FixedDelay(TimeDelta),
    /// Due repeatedly, `every` after the previous successful dispatch
    ///
    /// The first occurrence is `start` after enrollment.
    RecurringInterval { every: TimeDelta, start: TimeDelta },
}

impl TimingRule {
    pub fn is_recurring(&self) -> bool {
        matches!(self, TimingRule::RecurringInterval { .. })
    }

    /// Offset from enrollment of the first occurrence
    pub fn first_offset(&self) -> TimeDelta {
        match self {
            TimingRule::FixedDelay(delay) => *delay,
            TimingRule::RecurringInterval { start, .. } => *start,
        }
    }
}

impl fmt::Display for TimingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingRule::FixedDelay(delay) => write!(f, "delay {}s", delay.num_seconds()),
            TimingRule::RecurringInterval { every, start } => write!(
                f,
                "every {}s starting {}s after enrollment",
                every.num_seconds(),
                start.num_seconds()
            ),
        }
    }
}

/// How the external handler expects to receive its arguments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterMode {
    /// Positional arguments
    #[default]
    Positional,
    /// A single structured parameter object
    Parameters,
}

type GuardFn = dyn Fn(&StepDefinition, &SubjectProgression) -> bool + Send + Sync;

/// Per-step predicate checked just before dispatch
///
/// A subject the guard rejects is held on its current cursor and the step is
/// checked again on the next batch. Guards compare equal only to clones of
/// themselves.
#[derive(Clone)]
pub struct StepGuard(Arc<GuardFn>);

impl StepGuard {
    pub fn new<F>(guard: F) -> Self
    where
        F: Fn(&StepDefinition, &SubjectProgression) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(guard))
    }

    pub fn allows(&self, step: &StepDefinition, subject: &SubjectProgression) -> bool {
        (self.0)(step, subject)
    }
}

impl fmt::Debug for StepGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StepGuard(..)")
    }
}

impl PartialEq for StepGuard {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for StepGuard {}

/// A registered, validated campaign step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    pub(crate) campaign_id: CampaignId,
    pub(crate) action_id: ActionId,
    pub(crate) ordinal: u32,
    pub(crate) timing_rule: TimingRule,
    pub(crate) handler: HandlerRef,
    pub(crate) parameter_mode: ParameterMode,
    pub(crate) guard: Option<StepGuard>,
}

impl StepDefinition {
    pub fn campaign_id(&self) -> &CampaignId {
        &self.campaign_id
    }

    pub fn action_id(&self) -> &ActionId {
        &self.action_id
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    pub fn timing_rule(&self) -> &TimingRule {
        &self.timing_rule
    }

    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    pub fn parameter_mode(&self) -> ParameterMode {
        self.parameter_mode
    }

    pub fn is_recurring(&self) -> bool {
        self.timing_rule.is_recurring()
    }

    pub fn guard(&self) -> Option<&StepGuard> {
        self.guard.as_ref()
    }

    /// Whether `subject` may receive this step now; unguarded steps always may
    pub fn allows(&self, subject: &SubjectProgression) -> bool {
        self.guard.as_ref().map_or(true, |g| g.allows(self, subject))
    }

    /// When this step first falls due for a subject enrolled at `enrolled_at`
    ///
    /// Saturates to the end of representable time instead of overflowing.
    pub fn first_due_at(&self, enrolled_at: DateTime<Utc>) -> DateTime<Utc> {
        enrolled_at
            .checked_add_signed(self.timing_rule.first_offset())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl fmt::Display for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} ({})", self.campaign_id, self.ordinal, self.action_id)
    }
}

/// Options for registering a step
///
/// Either `delay` or `every` is required. When both are given, `delay` is the
/// offset of the first occurrence of the recurring step, unless `start` is
/// also given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOptions {
    pub ordinal: Option<u32>,
    pub delay: Option<TimeDelta>,
    pub every: Option<TimeDelta>,
    pub start: Option<TimeDelta>,
    pub handler: Option<HandlerRef>,
    pub parameter_mode: Option<ParameterMode>,
    pub guard: Option<StepGuard>,
}

impl StepOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step due `delay` after enrollment
    pub fn delayed(delay: TimeDelta) -> Self {
        Self::new().with_delay(delay)
    }

    /// Step recurring `every` interval
    pub fn recurring(every: TimeDelta) -> Self {
        Self::new().with_every(every)
    }

    pub fn with_delay(mut self, delay: TimeDelta) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_every(mut self, every: TimeDelta) -> Self {
        self.every = Some(every);
        self
    }

    pub fn with_start(mut self, start: TimeDelta) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = Some(ordinal);
        self
    }

    pub fn with_handler(mut self, handler: impl Into<HandlerRef>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    pub fn using(mut self, mode: ParameterMode) -> Self {
        self.parameter_mode = Some(mode);
        self
    }

    pub fn with_guard<F>(mut self, guard: F) -> Self
    where
        F: Fn(&StepDefinition, &SubjectProgression) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(StepGuard::new(guard));
        self
    }

    /// Resolve the timing rule, rejecting missing or negative durations
    pub(crate) fn timing_rule(
        &self,
        campaign: &CampaignId,
        action: &ActionId,
    ) -> Result<TimingRule, crate::ConfigurationError> {
        use crate::ConfigurationError;

        let non_negative = |value: Option<TimeDelta>, option: &'static str| match value {
            Some(d) if d < TimeDelta::zero() => Err(ConfigurationError::NegativeDuration {
                campaign: campaign.clone(),
                action: action.clone(),
                option,
            }),
            other => Ok(other),
        };

        let delay = non_negative(self.delay, "delay")?;
        let every = non_negative(self.every, "every")?;
        let start = non_negative(self.start, "start")?;

        match (every, delay) {
            (Some(every), first) => {
                if every.is_zero() {
                    return Err(ConfigurationError::ZeroInterval {
                        campaign: campaign.clone(),
                        action: action.clone(),
                    });
                }
                let start = start.or(first).unwrap_or(every);
                Ok(TimingRule::RecurringInterval { every, start })
            }
            (None, Some(delay)) => Ok(TimingRule::FixedDelay(delay)),
            (None, None) => Err(ConfigurationError::MissingTiming {
                campaign: campaign.clone(),
                action: action.clone(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
