// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op dispatcher

use super::Dispatcher;
use async_trait::async_trait;
use drip_core::{DispatchOutcome, StepDefinition, SubjectProgression};

/// Dispatcher that succeeds without doing anything
#[derive(Clone, Debug, Default)]
pub struct NoOpDispatcher;

impl NoOpDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Dispatcher for NoOpDispatcher {
    async fn dispatch(
        &self,
        _step: &StepDefinition,
        _subject: &SubjectProgression,
    ) -> DispatchOutcome {
        DispatchOutcome::Success
    }
}
