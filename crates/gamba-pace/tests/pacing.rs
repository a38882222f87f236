//! Integration tests for the pacer.
//!
//! Uses `start_paused` so sleeps resolve as soon as the runtime is idle and
//! the clock jumps forward by exactly the slept amount.

use std::time::Duration;

use gamba_pace::{Pacer, PacingConfig};
use tokio::time::Instant;

// =========================================================================
// PacingConfig
// =========================================================================

#[test]
fn test_default_config_matches_house_timings() {
    let cfg = PacingConfig::default();
    assert_eq!(cfg.roll_gap, Duration::from_millis(550));
    assert_eq!(cfg.roll_jitter, Duration::from_millis(100));
    assert_eq!(cfg.close_jitter, Duration::from_millis(50));
    assert_eq!(cfg.settle_delay, Duration::from_millis(1000));
    assert_eq!(cfg.join_timeout, Duration::from_secs(10));
}

#[test]
fn test_validated_fixes_inverted_ranges() {
    let cfg = PacingConfig {
        chat_delay_min: Duration::from_millis(400),
        chat_delay_max: Duration::from_millis(100),
        hit_pause_min: Duration::from_millis(900),
        hit_pause_max: Duration::ZERO,
        join_timeout: Duration::ZERO,
        ..PacingConfig::default()
    }
    .validated();

    assert_eq!(cfg.chat_delay_max, Duration::from_millis(400));
    assert_eq!(cfg.hit_pause_max, Duration::from_millis(900));
    assert_eq!(cfg.join_timeout, PacingConfig::MIN_JOIN_TIMEOUT);
}

#[test]
fn test_validated_leaves_good_config_alone() {
    let cfg = PacingConfig::default();
    assert_eq!(cfg.clone().validated(), cfg);
}

// =========================================================================
// Delay ranges
// =========================================================================

#[test]
fn test_roll_gap_within_jitter() {
    let pacer = Pacer::default();
    for _ in 0..100 {
        let gap = pacer.roll_gap_duration();
        assert!(gap >= Duration::from_millis(550) && gap < Duration::from_millis(650));
    }
}

#[test]
fn test_close_gap_within_jitter() {
    let pacer = Pacer::default();
    for _ in 0..100 {
        let gap = pacer.close_gap_duration();
        assert!(gap >= Duration::from_millis(550) && gap < Duration::from_millis(600));
    }
}

#[test]
fn test_hit_pause_within_range() {
    let pacer = Pacer::default();
    for _ in 0..100 {
        let pause = pacer.hit_pause_duration();
        assert!(pause >= Duration::from_millis(500) && pause < Duration::from_millis(1500));
    }
}

// =========================================================================
// Sleeping
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_settle_sleeps_configured_delay() {
    let pacer = Pacer::default();
    let start = Instant::now();
    pacer.settle().await;
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(1000) && elapsed < Duration::from_millis(1002));
}

#[tokio::test(start_paused = true)]
async fn test_roll_gap_sleeps_at_least_base() {
    let pacer = Pacer::default();
    let start = Instant::now();
    pacer.roll_gap().await;
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(550) && elapsed < Duration::from_millis(652));
}

#[tokio::test(start_paused = true)]
async fn test_dealer_pause_is_three_seconds() {
    let pacer = Pacer::default();
    let start = Instant::now();
    pacer.dealer_pause().await;
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_millis(3002));
}

#[tokio::test(start_paused = true)]
async fn test_immediate_config_barely_advances_clock() {
    let pacer = Pacer::new(PacingConfig::immediate());
    let start = Instant::now();
    pacer.roll_gap().await;
    pacer.chat_delay().await;
    pacer.hit_pause().await;
    assert!(start.elapsed() < Duration::from_millis(5));
}
