// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step dispatch adapters
//!
//! A dispatcher performs the external action a step refers to (send a mail,
//! post a message, call a webhook). The core only sees the outcome.

mod noop;
mod routing;

pub use noop::NoOpDispatcher;
pub use routing::HandlerTable;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{DispatchCall, FakeDispatcher};

use async_trait::async_trait;
use drip_core::{DispatchOutcome, StepDefinition, SubjectProgression};
use std::sync::Arc;

/// Adapter that performs a step's action for one subject
#[async_trait]
pub trait Dispatcher: Send + Sync + 'static {
    /// Perform `step` for `subject`
    ///
    /// Failures are reported in the outcome, never by panicking.
    async fn dispatch(&self, step: &StepDefinition, subject: &SubjectProgression)
        -> DispatchOutcome;
}

#[async_trait]
impl<D: Dispatcher + ?Sized> Dispatcher for Arc<D> {
    async fn dispatch(
        &self,
        step: &StepDefinition,
        subject: &SubjectProgression,
    ) -> DispatchOutcome {
        (**self).dispatch(step, subject).await
    }
}
