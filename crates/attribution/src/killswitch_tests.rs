// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn healthy() -> RollingHealth {
    RollingHealth {
        attribution_precision_score: 0.9,
        inferred_ratio: 0.1,
        observed_improvement_rate: 0.5,
        counts_by_kind: Default::default(),
        window_total: 20,
        injected_total: 10,
    }
}

fn sick() -> RollingHealth {
    RollingHealth {
        attribution_precision_score: 0.2,
        inferred_ratio: 0.8,
        observed_improvement_rate: 0.05,
        counts_by_kind: Default::default(),
        window_total: 20,
        injected_total: 10,
    }
}

fn switch() -> KillSwitch {
    KillSwitch::new(HealthThresholds::default(), 0)
}

#[test]
fn starts_active_and_allows_everything() {
    let ks = switch();
    assert_eq!(ks.status().state, KillSwitchState::Active);
    for quote in
        [CarrierQuoteType::Verbatim, CarrierQuoteType::Paraphrase, CarrierQuoteType::Inferred]
    {
        assert!(ks.allows_pattern_creation(quote).is_ok());
    }
}

#[test]
fn pause_requires_reason() {
    let ks = switch();
    assert!(ks.pause(KillSwitchState::FullyPaused, "  ", 1).is_err());
    assert!(ks.pause(KillSwitchState::FullyPaused, "maintenance", 1).is_ok());
}

#[test]
fn pause_cannot_target_active() {
    let ks = switch();
    assert!(ks.pause(KillSwitchState::Active, "why not", 1).is_err());
}

#[test]
fn inferred_paused_gates_only_inferred() {
    let ks = switch();
    ks.pause(KillSwitchState::InferredPaused, "drift season", 1).unwrap();

    assert!(ks.allows_pattern_creation(CarrierQuoteType::Verbatim).is_ok());
    assert!(ks.allows_pattern_creation(CarrierQuoteType::Paraphrase).is_ok());
    assert!(ks.allows_pattern_creation(CarrierQuoteType::Inferred).is_err());
}

#[test]
fn fully_paused_gates_everything() {
    let ks = switch();
    ks.pause(KillSwitchState::FullyPaused, "incident", 1).unwrap();
    for quote in
        [CarrierQuoteType::Verbatim, CarrierQuoteType::Paraphrase, CarrierQuoteType::Inferred]
    {
        assert!(ks.allows_pattern_creation(quote).is_err());
    }
}

// Idempotent pause: re-pausing keeps the original state, reason, and
// auto-resume timer.
#[test]
fn repeated_pause_is_noop() {
    let ks = switch();
    ks.evaluate_health(&sick(), 100);
    let before = ks.status();
    assert!(before.auto_resume_at_ms.is_some());

    ks.pause(KillSwitchState::FullyPaused, "again", 200).unwrap();
    let after = ks.status();
    assert_eq!(after.changed_at_ms, before.changed_at_ms);
    assert_eq!(after.auto_resume_at_ms, before.auto_resume_at_ms);
    assert_eq!(after.reason, before.reason);
}

#[test]
fn manual_resume_after_manual_pause() {
    let ks = switch();
    ks.pause(KillSwitchState::FullyPaused, "incident", 1).unwrap();
    ks.resume(false, 2).unwrap();
    assert_eq!(ks.status().state, KillSwitchState::Active);
}

#[test]
fn resume_after_auto_pause_requires_force() {
    let ks = switch();
    ks.evaluate_health(&sick(), 1);
    assert_eq!(ks.status().state, KillSwitchState::FullyPaused);

    let err = ks.resume(false, 2).unwrap_err();
    assert!(matches!(err, AttributionError::Conflict(_)));

    ks.resume(true, 3).unwrap();
    assert_eq!(ks.status().state, KillSwitchState::Active);
}

#[test]
fn healthy_metrics_do_not_pause() {
    let ks = switch();
    let breaches = ks.evaluate_health(&healthy(), 1);
    assert!(breaches.is_empty());
    assert_eq!(ks.status().state, KillSwitchState::Active);
}

#[test]
fn breach_beyond_margin_pauses_with_reason() {
    let ks = switch();
    let breaches = ks.evaluate_health(&sick(), 50);
    assert!(!breaches.is_empty());

    let status = ks.status();
    assert_eq!(status.state, KillSwitchState::FullyPaused);
    assert!(status.auto_triggered);
    assert!(status.reason.as_deref().unwrap_or("").contains("health breach"));
    assert!(status.auto_resume_at_ms.is_some());
}

// Breach within the 10% margin does not fire.
#[test]
fn breach_within_margin_tolerated() {
    let ks = switch();
    let mut marginal = healthy();
    // Threshold 0.6, margin 10%: anything at or above 0.54 is tolerated.
    marginal.attribution_precision_score = 0.55;
    let breaches = ks.evaluate_health(&marginal, 1);
    assert!(breaches.is_empty());
    assert_eq!(ks.status().state, KillSwitchState::Active);
}

#[test]
fn auto_resume_waits_for_timer_and_health() {
    let ks = switch();
    ks.evaluate_health(&sick(), 0);
    let due = ks.status().auto_resume_at_ms.unwrap();

    // Timer not due yet.
    assert!(!ks.try_auto_resume(&healthy(), due - 1));
    // Due but still sick.
    assert!(!ks.try_auto_resume(&sick(), due));
    // Due and healthy.
    assert!(ks.try_auto_resume(&healthy(), due));
    assert_eq!(ks.status().state, KillSwitchState::Active);
}

#[test]
fn manual_pause_never_auto_resumes() {
    let ks = switch();
    ks.pause(KillSwitchState::FullyPaused, "operator hold", 1).unwrap();
    assert!(!ks.try_auto_resume(&healthy(), u64::MAX));
    assert_eq!(ks.status().state, KillSwitchState::FullyPaused);
}
