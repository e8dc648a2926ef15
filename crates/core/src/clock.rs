// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling
//!
//! Drip schedules are anchored to wall-clock enrollment timestamps, so the
//! clock hands out `DateTime<Utc>` rather than a monotonic instant.

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::{Arc, Mutex};

/// A clock that provides the current evaluation time
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Real system clock
#[derive(Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone, Debug)]
pub struct FakeClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl FakeClock {
    /// Create a fake clock reading the current wall time
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Create a fake clock frozen at `at`
    pub fn at(at: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(at)),
        }
    }

    /// Advance the clock by the given amount
    pub fn advance(&self, delta: TimeDelta) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = current.checked_add_signed(delta).unwrap_or(*current);
    }

    /// Set the clock to a specific time
    pub fn set(&self, at: DateTime<Utc>) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = at;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
