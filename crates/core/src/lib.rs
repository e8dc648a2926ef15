// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! drip-core: campaign definitions and due-step resolution
//!
//! This crate provides:
//! - A clock abstraction with a controllable fake for tests
//! - Step definitions and the campaign registry that validates them
//! - Subject progression and compare-and-set cursor advances
//! - The pure resolver deciding which step is due for a subject
//! - Delivery configuration
//!
//! Nothing here performs I/O.

pub mod campaign;
pub mod clock;
pub mod config;
pub mod delivery;
pub mod error;
pub mod id;
pub mod progression;
pub mod resolver;
pub mod step;

pub use campaign::{
    CampaignDefaults, CampaignDefinition, CampaignRegistry, Campaigns, HandlerCatalog,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{DeliveryConfig, DEFAULT_BATCH_SIZE};
pub use delivery::{DeliveryJob, DispatchFailure, DispatchOutcome};
pub use error::{ConfigurationError, NotFoundError, ProgressionError};
pub use id::{ActionId, CampaignId, HandlerRef, SubjectId};
pub use progression::{Cursor, CursorAdvance, SubjectProgression};
pub use resolver::{evaluate, resolve_due_step, EligibilityResolver, Resolution};
pub use step::{ParameterMode, StepDefinition, StepGuard, StepOptions, TimingRule};
