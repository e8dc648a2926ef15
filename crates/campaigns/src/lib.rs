// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Declarative campaign files
//!
//! A drip file is TOML with an optional `[delivery]` table and one
//! `[campaign.<id>]` table per campaign, whose steps are listed in
//! `[[campaign.<id>.step]]` arrays in registration order:
//!
//! ```toml
//! [delivery]
//! batch_size = 500
//!
//! [campaign.onboarding]
//! handler = "OnboardingMailer"
//!
//! [[campaign.onboarding.step]]
//! action = "welcome"
//! delay = "0s"
//!
//! [[campaign.onboarding.step]]
//! action = "tips"
//! delay = "2days"
//! ```

mod loader;
mod parser;

pub use loader::{load_campaigns, load_drip_file, LoadError};
pub use parser::{parse_drip_file, CampaignDecl, DripFile, ParseError, StepDecl};
