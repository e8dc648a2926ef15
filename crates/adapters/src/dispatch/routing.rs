// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routes steps to dispatchers by handler reference

use super::Dispatcher;
use async_trait::async_trait;
use drip_core::{DispatchOutcome, HandlerCatalog, HandlerRef, StepDefinition, SubjectProgression};
use std::collections::HashMap;
use std::sync::Arc;

/// Explicit mapping from handler references to dispatchers
///
/// Built at startup. Its [`catalog`](HandlerTable::catalog) is handed to the
/// campaign registry so unknown handlers fail registration instead of
/// failing at dispatch time.
#[derive(Clone, Default)]
pub struct HandlerTable {
    handlers: HashMap<HandlerRef, Arc<dyn Dispatcher>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, handler: impl Into<HandlerRef>, dispatcher: impl Dispatcher) -> Self {
        self.insert(handler, dispatcher);
        self
    }

    pub fn insert(&mut self, handler: impl Into<HandlerRef>, dispatcher: impl Dispatcher) {
        self.handlers.insert(handler.into(), Arc::new(dispatcher));
    }

    pub fn get(&self, handler: &HandlerRef) -> Option<&Arc<dyn Dispatcher>> {
        self.handlers.get(handler)
    }

    /// Handler references this table can route
    pub fn catalog(&self) -> HandlerCatalog {
        self.handlers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut handlers: Vec<_> = self.handlers.keys().map(HandlerRef::as_str).collect();
        handlers.sort_unstable();
        f.debug_struct("HandlerTable")
            .field("handlers", &handlers)
            .finish()
    }
}

#[async_trait]
impl Dispatcher for HandlerTable {
    async fn dispatch(
        &self,
        step: &StepDefinition,
        subject: &SubjectProgression,
    ) -> DispatchOutcome {
        match self.handlers.get(step.handler()) {
            Some(dispatcher) => dispatcher.dispatch(step, subject).await,
            None => DispatchOutcome::failure(format!(
                "no dispatcher registered for handler {}",
                step.handler()
            )),
        }
    }
}
