// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drip file TOML parsing

use chrono::TimeDelta;
use drip_core::{
    ActionId, CampaignDefaults, CampaignId, CampaignRegistry, ConfigurationError, DeliveryConfig,
    HandlerRef, ParameterMode, StepOptions,
};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during drip file parsing
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid duration in {field}: {reason}")]
    InvalidDuration { field: String, reason: String },
    #[error("invalid delivery settings: {0}")]
    Delivery(#[source] ConfigurationError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDripFile {
    #[serde(default)]
    delivery: DeliveryConfig,
    /// Kept as a raw table so campaigns come out in file order
    #[serde(default)]
    campaign: toml::Table,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCampaign {
    #[serde(default, alias = "mailer")]
    handler: Option<String>,
    #[serde(default)]
    using: Option<ParameterMode>,
    #[serde(default)]
    step: Vec<RawStep>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStep {
    action: String,
    #[serde(default)]
    ordinal: Option<u32>,
    #[serde(default, with = "humantime_serde::option")]
    delay: Option<Duration>,
    #[serde(default, with = "humantime_serde::option")]
    every: Option<Duration>,
    #[serde(default, with = "humantime_serde::option")]
    start: Option<Duration>,
    #[serde(default, alias = "mailer")]
    handler: Option<String>,
    #[serde(default)]
    using: Option<ParameterMode>,
}

/// One step as declared in a drip file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDecl {
    pub action: ActionId,
    pub options: StepOptions,
}

/// One campaign as declared in a drip file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignDecl {
    pub id: CampaignId,
    pub defaults: CampaignDefaults,
    /// Declaration order
    pub steps: Vec<StepDecl>,
}

/// A parsed drip file, not yet registered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DripFile {
    pub delivery: DeliveryConfig,
    pub campaigns: Vec<CampaignDecl>,
}

impl DripFile {
    /// Declare every campaign and register its steps in file order
    pub fn register(&self, registry: &mut CampaignRegistry) -> Result<(), ConfigurationError> {
        for campaign in &self.campaigns {
            registry.declare(campaign.id.clone(), campaign.defaults.clone())?;
            for step in &campaign.steps {
                registry.register(campaign.id.clone(), step.action.clone(), step.options.clone())?;
            }
        }
        Ok(())
    }

    /// Total number of declared steps
    pub fn step_count(&self) -> usize {
        self.campaigns.iter().map(|c| c.steps.len()).sum()
    }
}

/// Parse a drip file from TOML content
pub fn parse_drip_file(content: &str) -> Result<DripFile, ParseError> {
    let raw: RawDripFile = toml::from_str(content)?;
    raw.delivery.validate().map_err(ParseError::Delivery)?;

    let campaigns = raw
        .campaign
        .into_iter()
        .map(|(id, campaign)| parse_campaign(id, campaign.try_into()?))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DripFile {
        delivery: raw.delivery,
        campaigns,
    })
}

fn parse_campaign(id: String, raw: RawCampaign) -> Result<CampaignDecl, ParseError> {
    let mut defaults = CampaignDefaults::new().using(raw.using.unwrap_or_default());
    defaults.handler = raw.handler.map(HandlerRef::new);

    let steps = raw
        .step
        .into_iter()
        .map(|step| parse_step(&id, step))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CampaignDecl {
        id: CampaignId::new(id),
        defaults,
        steps,
    })
}

fn parse_step(campaign: &str, raw: RawStep) -> Result<StepDecl, ParseError> {
    let field = |name: &str| format!("campaign.{}.{}.{}", campaign, raw.action, name);

    let options = StepOptions {
        ordinal: raw.ordinal,
        delay: to_delta(raw.delay, || field("delay"))?,
        every: to_delta(raw.every, || field("every"))?,
        start: to_delta(raw.start, || field("start"))?,
        handler: raw.handler.clone().map(HandlerRef::new),
        parameter_mode: raw.using,
        guard: None,
    };

    Ok(StepDecl {
        action: ActionId::new(raw.action),
        options,
    })
}

fn to_delta(
    value: Option<Duration>,
    field: impl FnOnce() -> String,
) -> Result<Option<TimeDelta>, ParseError> {
    value
        .map(|d| {
            TimeDelta::from_std(d).map_err(|e| ParseError::InvalidDuration {
                field: field(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
