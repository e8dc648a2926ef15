// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration modules

mod delivery;

pub use delivery::{DeliveryConfig, DEFAULT_BATCH_SIZE};
