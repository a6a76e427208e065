// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_is_nonzero_and_monotonic_enough() {
    let clock = SystemClock;
    let a = clock.epoch_ms();
    let b = clock.epoch_ms();
    assert!(a > 0);
    assert!(b >= a);
}

#[test]
fn fake_clock_only_moves_when_told() {
    let clock = FakeClock::new();
    let start = clock.epoch_ms();
    assert_eq!(clock.epoch_ms(), start);

    clock.advance(Duration::from_millis(250));
    assert_eq!(clock.epoch_ms(), start + 250);

    clock.set_epoch_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
}

#[test]
fn fake_clock_clones_share_time() {
    let clock = FakeClock::new();
    let other = clock.clone();
    clock.set_epoch_ms(7_000);
    assert_eq!(other.epoch_ms(), 7_000);
}
