// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Campaign registration and the frozen campaign set
//!
//! Registration happens once at startup through a [`CampaignRegistry`].
//! [`CampaignRegistry::finish`] validates every campaign and freezes it into
//! [`Campaigns`], which is read-only and shared between batch workers.

use crate::error::{ConfigurationError, NotFoundError};
use crate::id::{ActionId, CampaignId, HandlerRef};
use crate::step::{ParameterMode, StepDefinition, StepOptions};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// The set of handler references known to the host
///
/// When a registry has a catalog, every step's handler must resolve against
/// it at registration time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerCatalog {
    handlers: BTreeSet<HandlerRef>,
}

impl HandlerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, handler: impl Into<HandlerRef>) -> Self {
        self.insert(handler);
        self
    }

    pub fn insert(&mut self, handler: impl Into<HandlerRef>) {
        self.handlers.insert(handler.into());
    }

    pub fn contains(&self, handler: &HandlerRef) -> bool {
        self.handlers.contains(handler)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<H: Into<HandlerRef>> FromIterator<H> for HandlerCatalog {
    fn from_iter<I: IntoIterator<Item = H>>(iter: I) -> Self {
        Self {
            handlers: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Campaign-wide fallbacks applied to steps that omit them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignDefaults {
    pub handler: Option<HandlerRef>,
    pub parameter_mode: ParameterMode,
}

impl CampaignDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler(mut self, handler: impl Into<HandlerRef>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    pub fn using(mut self, mode: ParameterMode) -> Self {
        self.parameter_mode = mode;
        self
    }
}

/// A campaign still accepting steps
#[derive(Debug, Clone)]
struct PendingCampaign {
    id: CampaignId,
    defaults: CampaignDefaults,
    /// Registration order
    steps: Vec<StepDefinition>,
    by_action: HashMap<ActionId, usize>,
    max_ordinal: u32,
}

impl PendingCampaign {
    fn new(id: CampaignId, defaults: CampaignDefaults) -> Self {
        Self {
            id,
            defaults,
            steps: Vec::new(),
            by_action: HashMap::new(),
            max_ordinal: 0,
        }
    }

    fn register(
        &mut self,
        action: ActionId,
        options: StepOptions,
        catalog: Option<&HandlerCatalog>,
    ) -> Result<StepDefinition, ConfigurationError> {
        if self.by_action.contains_key(&action) {
            return Err(ConfigurationError::DuplicateAction {
                campaign: self.id.clone(),
                action,
            });
        }

        let handler = options
            .handler
            .clone()
            .or_else(|| self.defaults.handler.clone())
            .ok_or_else(|| ConfigurationError::MissingHandler {
                campaign: self.id.clone(),
                action: action.clone(),
            })?;

        if let Some(catalog) = catalog {
            if !catalog.contains(&handler) {
                return Err(ConfigurationError::UnknownHandler {
                    campaign: self.id.clone(),
                    action,
                    handler,
                });
            }
        }

        let timing_rule = options.timing_rule(&self.id, &action)?;
        let ordinal = self.assign_ordinal(&action, options.ordinal)?;

        let step = StepDefinition {
            campaign_id: self.id.clone(),
            action_id: action.clone(),
            ordinal,
            timing_rule,
            handler,
            parameter_mode: options
                .parameter_mode
                .unwrap_or(self.defaults.parameter_mode),
            guard: options.guard,
        };

        self.max_ordinal = self.max_ordinal.max(ordinal);
        self.by_action.insert(action, self.steps.len());
        self.steps.push(step.clone());

        tracing::debug!(
            campaign = %self.id,
            action = %step.action_id,
            ordinal,
            timing = %step.timing_rule,
            "step registered"
        );
        Ok(step)
    }

    fn assign_ordinal(
        &self,
        action: &ActionId,
        explicit: Option<u32>,
    ) -> Result<u32, ConfigurationError> {
        let ordinal = match explicit {
            Some(0) => {
                return Err(ConfigurationError::InvalidOrdinal {
                    campaign: self.id.clone(),
                    action: action.clone(),
                })
            }
            Some(ordinal) => ordinal,
            None => self.max_ordinal.saturating_add(1),
        };

        if let Some(existing) = self.steps.iter().find(|s| s.ordinal == ordinal) {
            return Err(ConfigurationError::DuplicateOrdinal {
                campaign: self.id.clone(),
                action: action.clone(),
                ordinal,
                existing: existing.action_id.clone(),
            });
        }
        Ok(ordinal)
    }

    fn freeze(self) -> Result<CampaignDefinition, ConfigurationError> {
        let mut steps = self.steps;
        if steps.is_empty() {
            return Err(ConfigurationError::EmptyCampaign { campaign: self.id });
        }
        steps.sort_by_key(|s| s.ordinal);

        for pair in steps.windows(2) {
            if let [prev, next] = pair {
                if prev.ordinal.checked_add(1) != Some(next.ordinal) {
                    tracing::warn!(
                        campaign = %self.id,
                        after = prev.ordinal,
                        next = next.ordinal,
                        unreachable = %next.action_id,
                        "ordinal gap: subjects complete before reaching later steps"
                    );
                }
            }
        }

        let by_action = steps
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.action_id.clone(), idx))
            .collect();

        Ok(CampaignDefinition {
            id: self.id,
            defaults: self.defaults,
            steps,
            by_action,
        })
    }
}

/// A frozen campaign: its steps in ordinal order
///
/// Ordinals may have gaps; a subject whose successor ordinal is missing has
/// completed the campaign.
#[derive(Debug, Clone)]
pub struct CampaignDefinition {
    id: CampaignId,
    defaults: CampaignDefaults,
    steps: Vec<StepDefinition>,
    by_action: HashMap<ActionId, usize>,
}

impl CampaignDefinition {
    pub fn id(&self) -> &CampaignId {
        &self.id
    }

    pub fn defaults(&self) -> &CampaignDefaults {
        &self.defaults
    }

    /// Look up a step by action identifier
    pub fn step_for(&self, action: &ActionId) -> Result<&StepDefinition, NotFoundError> {
        self.by_action
            .get(action)
            .and_then(|&idx| self.steps.get(idx))
            .ok_or_else(|| NotFoundError::Action {
                campaign: self.id.clone(),
                action: action.clone(),
            })
    }

    /// The step at `ordinal`, if any
    pub fn step_at(&self, ordinal: u32) -> Option<&StepDefinition> {
        let idx = self
            .steps
            .binary_search_by_key(&ordinal, |s| s.ordinal)
            .ok()?;
        self.steps.get(idx)
    }

    /// Steps in ordinal order
    pub fn values(&self) -> std::slice::Iter<'_, StepDefinition> {
        self.steps.iter()
    }

    pub fn first(&self) -> Option<&StepDefinition> {
        self.steps.first()
    }

    pub fn last(&self) -> Option<&StepDefinition> {
        self.steps.last()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<'a> IntoIterator for &'a CampaignDefinition {
    type Item = &'a StepDefinition;
    type IntoIter = std::slice::Iter<'a, StepDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.values()
    }
}

/// Collects campaign declarations and step registrations at startup
#[derive(Debug, Clone, Default)]
pub struct CampaignRegistry {
    campaigns: Vec<PendingCampaign>,
    by_id: HashMap<CampaignId, usize>,
    catalog: Option<HandlerCatalog>,
}

impl CampaignRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require every step handler to resolve against `catalog`
    pub fn with_handlers(mut self, catalog: HandlerCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Declare a campaign with its defaults
    ///
    /// Declaring is optional; registering a step on an undeclared campaign
    /// declares it with empty defaults.
    pub fn declare(
        &mut self,
        campaign: impl Into<CampaignId>,
        defaults: CampaignDefaults,
    ) -> Result<(), ConfigurationError> {
        let campaign = campaign.into();
        if self.by_id.contains_key(&campaign) {
            return Err(ConfigurationError::DuplicateCampaign { campaign });
        }
        self.by_id.insert(campaign.clone(), self.campaigns.len());
        self.campaigns
            .push(PendingCampaign::new(campaign, defaults));
        Ok(())
    }

    /// Validate and append a step to `campaign`
    pub fn register(
        &mut self,
        campaign: impl Into<CampaignId>,
        action: impl Into<ActionId>,
        options: StepOptions,
    ) -> Result<StepDefinition, ConfigurationError> {
        let campaign = campaign.into();
        let idx = match self.by_id.get(&campaign) {
            Some(&idx) => idx,
            None => {
                self.declare(campaign.clone(), CampaignDefaults::default())?;
                self.campaigns.len().saturating_sub(1)
            }
        };

        let catalog = self.catalog.as_ref();
        match self.campaigns.get_mut(idx) {
            Some(pending) => pending.register(action.into(), options, catalog),
            None => Err(ConfigurationError::Invalid(format!(
                "campaign index out of sync for {campaign}"
            ))),
        }
    }

    /// Number of steps registered so far on `campaign`
    pub fn step_count(&self, campaign: &CampaignId) -> usize {
        self.by_id
            .get(campaign)
            .and_then(|&idx| self.campaigns.get(idx))
            .map_or(0, |c| c.steps.len())
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }

    /// End the registration phase
    pub fn finish(self) -> Result<Campaigns, ConfigurationError> {
        let mut by_id = HashMap::with_capacity(self.campaigns.len());
        let mut order = Vec::with_capacity(self.campaigns.len());

        for pending in self.campaigns {
            let definition = pending.freeze()?;
            tracing::info!(
                campaign = %definition.id,
                steps = definition.len(),
                "campaign registered"
            );
            order.push(definition.id.clone());
            by_id.insert(definition.id.clone(), Arc::new(definition));
        }

        Ok(Campaigns { by_id, order })
    }
}

/// Every registered campaign, frozen
#[derive(Debug, Clone, Default)]
pub struct Campaigns {
    by_id: HashMap<CampaignId, Arc<CampaignDefinition>>,
    /// Declaration order
    order: Vec<CampaignId>,
}

impl Campaigns {
    pub fn get(&self, campaign: &CampaignId) -> Result<&Arc<CampaignDefinition>, NotFoundError> {
        self.by_id
            .get(campaign)
            .ok_or_else(|| NotFoundError::Campaign(campaign.clone()))
    }

    /// Look up a step by campaign and action
    pub fn step_for(
        &self,
        campaign: &CampaignId,
        action: &ActionId,
    ) -> Result<&StepDefinition, NotFoundError> {
        self.get(campaign)?.step_for(action)
    }

    /// Campaigns in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CampaignDefinition>> + '_ {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
#[path = "campaign_tests.rs"]
mod tests;
