// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery configuration
//!
//! Built once at process start and passed to the batch processor.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of subjects pulled per batch run
pub const DEFAULT_BATCH_SIZE: usize = 1_000;

/// How due steps are delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Hand due steps to an execution queue instead of dispatching inline
    pub async_delivery: bool,
    /// Name of the execution queue used for async delivery
    pub dispatch_queue: Option<String>,
    /// Upper bound on subjects processed per batch run
    pub batch_size: usize,
    /// Dispatches taking longer than this count as failures
    #[serde(
        with = "humantime_serde::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub dispatch_timeout: Option<Duration>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            async_delivery: false,
            dispatch_queue: None,
            batch_size: DEFAULT_BATCH_SIZE,
            dispatch_timeout: None,
        }
    }
}

impl DeliveryConfig {
    /// Synchronous delivery with default batch size
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a `[delivery]`-shaped TOML table
    pub fn from_toml(content: &str) -> Result<Self, ConfigurationError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigurationError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Deliver asynchronously through the queue named `queue`
    pub fn asynchronous(mut self, queue: impl Into<String>) -> Self {
        self.async_delivery = true;
        self.dispatch_queue = Some(queue.into());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.batch_size == 0 {
            return Err(ConfigurationError::InvalidBatchSize);
        }
        if self.async_delivery && self.dispatch_queue.is_none() {
            return Err(ConfigurationError::MissingDispatchQueue);
        }
        Ok(())
    }

    /// Check that the configured queue name matches the queue provided
    pub fn expect_queue(&self, name: &str) -> Result<(), ConfigurationError> {
        match self.dispatch_queue.as_deref() {
            Some(expected) if expected == name => Ok(()),
            Some(expected) => Err(ConfigurationError::UnknownDispatchQueue {
                expected: expected.to_string(),
                found: name.to_string(),
            }),
            None => Err(ConfigurationError::MissingDispatchQueue),
        }
    }
}

#[cfg(test)]
#[path = "delivery_tests.rs"]
mod tests;
