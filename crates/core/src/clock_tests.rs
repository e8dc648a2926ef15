// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap()
}

#[test]
fn system_clock_tracks_wall_time() {
    let before = Utc::now();
    let now = SystemClock.now();
    assert!(now >= before);
}

#[test]
fn fake_clock_is_frozen_until_moved() {
    let clock = FakeClock::at(t0());
    assert_eq!(clock.now(), t0());
    assert_eq!(clock.now(), t0());
}

#[test]
fn fake_clock_can_be_advanced() {
    let clock = FakeClock::at(t0());
    clock.advance(TimeDelta::hours(25));
    assert_eq!(clock.now(), t0() + TimeDelta::hours(25));
}

#[test]
fn fake_clock_can_be_set() {
    let clock = FakeClock::at(t0());
    let later = t0() + TimeDelta::days(3);
    clock.set(later);
    assert_eq!(clock.now(), later);
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let clock1 = FakeClock::at(t0());
    let clock2 = clock1.clone();
    clock2.advance(TimeDelta::seconds(30));
    assert_eq!(clock1.now(), t0() + TimeDelta::seconds(30));
}
