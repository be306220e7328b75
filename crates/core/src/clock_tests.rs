// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

use super::*;

#[test]
fn fake_clock_starts_at_fixed_epoch() {
    let clock = FakeClock::new();
    assert_eq!(clock.epoch_ms(), 1_000_000);
}

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::new();
    clock.advance_ms(2_500);
    assert_eq!(clock.epoch_ms(), 1_002_500);
}

#[test]
fn fake_clock_clones_share_time() {
    let clock = FakeClock::new();
    let other = clock.clone();
    clock.set_epoch_ms(42);
    assert_eq!(other.epoch_ms(), 42);
}

#[test]
fn system_clock_is_nonzero() {
    assert!(SystemClock.epoch_ms() > 0);
}
