// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Drip campaign delivery engine
//!
//! [`BatchProcessor`] walks a page of subjects, resolves the step each one is
//! due for, and either dispatches it inline or enqueues it for a
//! [`DeliveryWorker`]. Both paths move cursors through [`advance_cursor`].

mod error;
mod processor;
mod step;
mod worker;

pub use error::{BatchError, DeliveryError};
pub use processor::{BatchDeps, BatchProcessor, BatchResult, Delivery};
pub use step::{advance_cursor, dispatch_step};
pub use worker::{DeliveryWorker, JobOutcome, WorkerReport};
