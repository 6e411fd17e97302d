use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};

pub const DEFAULT_KP: f64 = 2.0;
pub const DEFAULT_KI: f64 = 0.0;
pub const DEFAULT_KD: f64 = 1.0;
pub const DEFAULT_SAMPLE_TIME: f64 = 0.01;
pub const DEFAULT_WINDUP_GUARD: f64 = 20.0;

// ---------------------------------------------------------------------------
// Interval handling
// ---------------------------------------------------------------------------

/// What an update does when the clock reads earlier than the last
/// effective update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalPolicy {
    /// Use the negative interval as-is. The gate stays closed unless
    /// `sample_time` is itself negative, in which case the integral is
    /// driven backwards and the derivative term is zero.
    #[default]
    PassThrough,
    /// Re-anchor `last_time` to the new reading and skip the update.
    Rearm,
}

// ---------------------------------------------------------------------------
// PID controller (single loop, sample-time gated)
// ---------------------------------------------------------------------------

/// Discrete PID controller.
///
/// Each call to [`Pid::update`] computes a new output only when at least
/// `sample_time` seconds have elapsed since the last effective update;
/// otherwise the call changes nothing and the previous output is held.
#[derive(Debug, Clone)]
pub struct Pid<C: Clock = SystemClock> {
    kp: f64,
    ki: f64,
    kd: f64,
    setpoint: f64,
    sample_time: f64,
    windup_guard: f64,
    interval_policy: IntervalPolicy,

    last_time: f64,
    last_error: f64,
    p_term: f64,
    integral: f64,
    d_term: f64,
    output: f64,

    clock: C,
}

impl Pid<SystemClock> {
    /// Controller timed by the host wall clock.
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self::with_clock(kp, ki, kd, SystemClock)
    }
}

impl Default for Pid<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_KP, DEFAULT_KI, DEFAULT_KD)
    }
}

impl<C: Clock> Pid<C> {
    /// Controller timed by `clock`. `last_time` is anchored to the clock's
    /// current reading.
    pub fn with_clock(kp: f64, ki: f64, kd: f64, clock: C) -> Self {
        let last_time = clock.now();
        let mut pid = Self {
            kp,
            ki,
            kd,
            setpoint: 0.0,
            sample_time: DEFAULT_SAMPLE_TIME,
            windup_guard: DEFAULT_WINDUP_GUARD,
            interval_policy: IntervalPolicy::default(),
            last_time,
            last_error: 0.0,
            p_term: 0.0,
            integral: 0.0,
            d_term: 0.0,
            output: 0.0,
            clock,
        };
        pid.reset();
        pid
    }

    /// Clear setpoint, computed terms and output, and restore the default
    /// windup guard. Gains, sample time and `last_time` are kept.
    pub fn reset(&mut self) {
        self.setpoint = 0.0;
        self.p_term = 0.0;
        self.integral = 0.0;
        self.d_term = 0.0;
        self.last_error = 0.0;
        self.windup_guard = DEFAULT_WINDUP_GUARD;
        self.output = 0.0;
        debug!("pid reset (last_time kept at {:.6})", self.last_time);
    }

    /// Re-anchor `last_time` to the clock's current reading, so the next
    /// interval is measured from now instead of from the last update.
    pub fn rearm(&mut self) {
        self.last_time = self.clock.now();
        debug!("pid rearmed at {:.6}", self.last_time);
    }

    /// Update with the clock's current reading. Returns `true` if the
    /// sample-time gate was open and a new output was computed.
    pub fn update(&mut self, feedback: f64) -> bool {
        let now = self.clock.now();
        self.update_at(feedback, now)
    }

    /// Update with an explicit timestamp (seconds, same time base as the
    /// controller's clock).
    pub fn update_at(&mut self, feedback: f64, now: f64) -> bool {
        let error = self.setpoint - feedback;
        let delta_time = now - self.last_time;
        let delta_error = error - self.last_error;

        if delta_time < 0.0 && self.interval_policy == IntervalPolicy::Rearm {
            warn!(
                "clock went backwards by {:.6}s, re-anchoring without update",
                -delta_time
            );
            self.last_time = now;
            return false;
        }

        // NaN intervals keep the gate closed.
        let gate_open = delta_time >= self.sample_time;
        if !gate_open {
            return false;
        }

        self.p_term = self.kp * error;
        self.integral += error * delta_time;

        // Not `f64::clamp`: a negative guard is accepted and must not panic.
        if self.integral < -self.windup_guard {
            self.integral = -self.windup_guard;
        } else if self.integral > self.windup_guard {
            self.integral = self.windup_guard;
        }

        self.d_term = if delta_time > 0.0 { delta_error / delta_time } else { 0.0 };

        self.last_time = now;
        self.last_error = error;

        self.output = self.p_term + self.ki * self.integral + self.kd * self.d_term;

        trace!(
            "pid t={:.6} dt={:.6} e={:.6} p={:.6} i={:.6} d={:.6} out={:.6}",
            now, delta_time, error, self.p_term, self.integral, self.d_term, self.output
        );
        true
    }

    // -----------------------------------------------------------------------
    // Tuning
    // -----------------------------------------------------------------------

    pub fn set_kp(&mut self, kp: f64) {
        debug!("kp {} -> {}", self.kp, kp);
        self.kp = kp;
    }

    pub fn set_ki(&mut self, ki: f64) {
        debug!("ki {} -> {}", self.ki, ki);
        self.ki = ki;
    }

    pub fn set_kd(&mut self, kd: f64) {
        debug!("kd {} -> {}", self.kd, kd);
        self.kd = kd;
    }

    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// New integral bound. The current accumulator is not re-clamped until
    /// the next effective update.
    pub fn set_windup_guard(&mut self, windup_guard: f64) {
        debug!("windup guard {} -> {}", self.windup_guard, windup_guard);
        self.windup_guard = windup_guard;
    }

    /// Minimum interval in seconds between effective updates.
    pub fn set_sample_time(&mut self, sample_time: f64) {
        debug!("sample time {} -> {}", self.sample_time, sample_time);
        self.sample_time = sample_time;
    }

    pub fn set_interval_policy(&mut self, policy: IntervalPolicy) {
        self.interval_policy = policy;
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn kp(&self) -> f64 {
        self.kp
    }

    pub fn ki(&self) -> f64 {
        self.ki
    }

    pub fn kd(&self) -> f64 {
        self.kd
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    pub fn sample_time(&self) -> f64 {
        self.sample_time
    }

    pub fn windup_guard(&self) -> f64 {
        self.windup_guard
    }

    pub fn interval_policy(&self) -> IntervalPolicy {
        self.interval_policy
    }

    /// Timestamp of the last effective update.
    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    /// Error seen at the last effective update.
    pub fn last_error(&self) -> f64 {
        self.last_error
    }

    /// `kp * error` from the last effective update.
    pub fn p_term(&self) -> f64 {
        self.p_term
    }

    /// Accumulated (clamped) integral of error over time, before `ki`.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Error rate from the last effective update, before `kd`.
    pub fn d_term(&self) -> f64 {
        self.d_term
    }

    /// Output of the last effective update, held between updates.
    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: Clock> super::Controller for Pid<C> {
    fn control(&mut self, setpoint: f64, feedback: f64, time: f64) -> f64 {
        self.setpoint = setpoint;
        self.update_at(feedback, time);
        self.output
    }

    fn reset(&mut self) {
        Pid::reset(self);
    }

    fn name(&self) -> &str {
        "Pid"
    }
}
