//! Behavioural properties of the PID controller, driven by a manual clock.

use proptest::prelude::*;
use sampled_pid::{Clock, IntervalPolicy, ManualClock, Pid};

fn manual_pid(kp: f64, ki: f64, kd: f64) -> (Pid<ManualClock>, ManualClock) {
    let clock = ManualClock::new(0.0);
    (Pid::with_clock(kp, ki, kd, clock.clone()), clock)
}

// ============================================================================
// GATING
// ============================================================================

#[test]
fn test_calls_inside_sample_time_are_no_ops() {
    let (mut pid, clock) = manual_pid(1.0, 0.5, 0.1);
    pid.set_setpoint(3.0);
    clock.set(0.05);
    assert!(pid.update(1.0));

    let before = (pid.output(), pid.last_error(), pid.last_time(), pid.integral());
    for _ in 0..5 {
        clock.advance(0.001);
        assert!(!pid.update(-7.0), "Gate should stay closed before sample_time elapses");
    }
    let after = (pid.output(), pid.last_error(), pid.last_time(), pid.integral());
    assert_eq!(before, after);
}

#[test]
fn test_effective_rate_bounded_by_sample_time() {
    let (mut pid, clock) = manual_pid(1.0, 0.0, 0.0);
    pid.set_sample_time(0.125);
    let mut effective = 0;
    for _ in 0..1000 {
        clock.advance(0.001953125); // 1/512 s
        if pid.update(0.0) {
            effective += 1;
        }
    }
    // 1000/512 s elapsed at most 8 updates per second
    assert!(effective <= 16, "got {effective} effective updates");
    assert!(effective >= 15, "got {effective} effective updates");
}

#[test]
fn test_sample_time_change_only_affects_future_gating() {
    let (mut pid, clock) = manual_pid(1.0, 0.0, 0.0);
    clock.set(1.0);
    assert!(pid.update(0.0));
    pid.set_sample_time(10.0);
    assert_eq!(pid.last_time(), 1.0);
    clock.set(2.0);
    assert!(!pid.update(0.0));
}

// ============================================================================
// CONTROL LAW
// ============================================================================

#[test]
fn test_proportional_only_mode() {
    let (mut pid, clock) = manual_pid(2.5, 0.0, 0.0);
    pid.set_setpoint(4.0);
    clock.set(1.0);
    pid.update(1.5);
    assert!((pid.output() - 2.5 * (4.0 - 1.5)).abs() < 1e-12);
}

#[test]
fn test_zero_error_keeps_output_at_zero() {
    let (mut pid, clock) = manual_pid(2.0, 1.0, 1.0);
    pid.set_setpoint(5.0);
    for _ in 0..100 {
        clock.advance(0.02);
        pid.update(5.0);
        assert_eq!(pid.output(), 0.0);
        assert_eq!(pid.integral(), 0.0);
    }
}

#[test]
fn test_scenario_pi_with_zero_sample_time() {
    let (mut pid, clock) = manual_pid(1.0, 1.0, 0.0);
    pid.set_sample_time(0.0);
    pid.set_setpoint(10.0);

    assert!(pid.update(0.0)); // t = 0, dt = 0
    assert_eq!(pid.integral(), 0.0);
    assert_eq!(pid.output(), 10.0);

    clock.set(1.0);
    assert!(pid.update(5.0));
    assert_eq!(pid.p_term(), 5.0);
    assert_eq!(pid.integral(), 5.0);
    assert_eq!(pid.output(), 10.0);
}

#[test]
fn test_output_matches_component_sum() {
    let (mut pid, clock) = manual_pid(0.7, 0.3, 0.2);
    pid.set_setpoint(1.0);
    for (t, y) in [(0.1, 0.0), (0.2, 0.3), (0.35, 0.6), (0.5, 0.9)] {
        clock.set(t);
        pid.update(y);
        let expected = pid.p_term() + pid.ki() * pid.integral() + pid.kd() * pid.d_term();
        assert!((pid.output() - expected).abs() < 1e-12);
        assert!((pid.p_term() - pid.kp() * pid.last_error()).abs() < 1e-12);
    }
}

// ============================================================================
// RESET
// ============================================================================

#[test]
fn test_reset_restores_defaults() {
    let (mut pid, clock) = manual_pid(3.0, 2.0, 1.0);
    pid.set_sample_time(0.2);
    pid.set_windup_guard(5.0);
    pid.set_setpoint(2.0);
    clock.set(1.0);
    pid.update(0.0);
    assert!(pid.output() != 0.0);

    pid.reset();
    assert_eq!(pid.setpoint(), 0.0);
    assert_eq!(pid.output(), 0.0);
    assert_eq!(pid.integral(), 0.0);
    assert_eq!(pid.last_error(), 0.0);
    assert_eq!(pid.windup_guard(), 20.0);
    assert_eq!((pid.kp(), pid.ki(), pid.kd()), (3.0, 2.0, 1.0));
    assert_eq!(pid.sample_time(), 0.2);
}

#[test]
fn test_reset_keeps_clock_anchor_until_rearmed() {
    let (mut pid, clock) = manual_pid(0.0, 1.0, 0.0);
    clock.set(100.0);
    pid.reset();
    pid.set_setpoint(0.01);
    pid.update(0.0);
    // Whole 100 s since construction counted toward the integral.
    assert!((pid.integral() - 1.0).abs() < 1e-9);

    pid.reset();
    clock.set(200.0);
    pid.rearm();
    pid.set_setpoint(0.01);
    clock.set(201.0);
    pid.update(0.0);
    assert!((pid.integral() - 0.01).abs() < 1e-12);
}

// ============================================================================
// CLOCK SOURCES
// ============================================================================

#[test]
fn test_closure_clock_drives_update() {
    use std::cell::Cell;
    let time = Cell::new(0.0);
    let mut pid = Pid::with_clock(1.0, 0.0, 0.0, || time.get());
    pid.set_setpoint(1.0);
    time.set(0.5);
    assert!(pid.update(0.0));
    assert_eq!(pid.last_time(), 0.5);
    assert_eq!(pid.clock().now(), 0.5);
}

#[test]
fn test_rearm_policy_survives_clock_step_back() {
    let (mut pid, clock) = manual_pid(1.0, 1.0, 0.0);
    pid.set_interval_policy(IntervalPolicy::Rearm);
    pid.set_setpoint(1.0);
    clock.set(10.0);
    pid.update(0.0);
    clock.set(4.0);
    assert!(!pid.update(0.0));
    clock.set(4.5);
    assert!(pid.update(0.0));
    assert!((pid.integral() - 10.5).abs() < 1e-12);
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn integral_stays_within_windup_guard(
        guard in 0.0f64..50.0,
        ki in -10.0f64..10.0,
        setpoint in -100.0f64..100.0,
        steps in prop::collection::vec((-100.0f64..100.0, 0.0f64..2.0), 1..50),
    ) {
        let (mut pid, clock) = manual_pid(1.0, ki, 0.5);
        pid.set_windup_guard(guard);
        pid.set_setpoint(setpoint);
        for (feedback, dt) in steps {
            clock.advance(dt);
            if pid.update(feedback) {
                prop_assert!(
                    pid.integral().abs() <= guard,
                    "integral {} outside +/-{}", pid.integral(), guard
                );
            }
        }
    }

    #[test]
    fn gate_closed_never_changes_state(
        feedback in -1000.0f64..1000.0,
        early in 0.0f64..0.0099,
    ) {
        let (mut pid, clock) = manual_pid(2.0, 1.0, 1.0);
        pid.set_setpoint(1.0);
        clock.set(1.0);
        pid.update(0.0);
        let before = (pid.output(), pid.last_error(), pid.last_time(), pid.integral());
        clock.set(1.0 + early);
        prop_assert!(!pid.update(feedback));
        prop_assert_eq!(before, (pid.output(), pid.last_error(), pid.last_time(), pid.integral()));
    }

    #[test]
    fn proportional_only_output_is_exact(
        kp in -50.0f64..50.0,
        setpoint in -100.0f64..100.0,
        feedback in -100.0f64..100.0,
    ) {
        let (mut pid, clock) = manual_pid(kp, 0.0, 0.0);
        pid.set_setpoint(setpoint);
        clock.set(0.5);
        pid.update(feedback);
        prop_assert_eq!(pid.output(), kp * (setpoint - feedback));
    }
}
