// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters between the drip core and the host's I/O

pub mod dispatch;
pub mod progress;
pub mod queue;
pub mod traced;

pub use dispatch::{Dispatcher, HandlerTable, NoOpDispatcher};
pub use progress::{
    AdvanceOutcome, InMemoryProgressionStore, ProgressionStore, SourceError, StoreError,
    SubjectSource,
};
pub use queue::{ChannelDispatchQueue, DispatchQueue, QueueError};
pub use traced::{TracedDispatchQueue, TracedDispatcher, TracedProgressionStore};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use dispatch::{DispatchCall, FakeDispatcher};
#[cfg(any(test, feature = "test-support"))]
pub use queue::FakeDispatchQueue;
