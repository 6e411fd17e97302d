use serde::Serialize;

use crate::sim::Sample;

/// Fraction of the step magnitude that counts as "settled".
pub const SETTLING_BAND: f64 = 0.02;

/// Step-response figures computed from a closed-loop run.
///
/// Times are measured from the first sample at which the setpoint reaches
/// its final value. Figures that cannot be determined (no step, never
/// reached, never settled) are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResponse {
    pub final_setpoint: f64,
    pub final_value: f64,
    pub steady_state_error: f64,
    pub overshoot_pct: f64,
    pub rise_time: Option<f64>,
    pub settling_time: Option<f64>,
    /// Integral of |setpoint - feedback| over the run.
    pub iae: f64,
    pub peak_output: f64,
}

impl StepResponse {
    /// Compute the response figures, or `None` for an empty run.
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        let first = samples.first()?;
        let last = samples.last()?;

        let target = last.setpoint;
        let start = first.feedback;
        let magnitude = target - start;

        let step_index = samples
            .iter()
            .position(|s| s.setpoint == target)
            .unwrap_or(0);
        let step_time = samples[step_index].time;
        let after_step = &samples[step_index..];

        let iae = samples
            .windows(2)
            .map(|w| (w[0].setpoint - w[0].feedback).abs() * (w[1].time - w[0].time))
            .sum::<f64>();

        let peak_output = samples
            .iter()
            .map(|s| s.output.abs())
            .fold(0.0_f64, f64::max);

        let (overshoot_pct, rise_time, settling_time) = if magnitude == 0.0 {
            (0.0, None, None)
        } else {
            // Progress toward the target, 0 at start and 1 on target.
            let progress = |s: &Sample| (s.feedback - start) / magnitude;

            let peak = after_step.iter().map(progress).fold(f64::NEG_INFINITY, f64::max);
            let overshoot = ((peak - 1.0) * 100.0).max(0.0);

            let t10 = after_step.iter().find(|&&s| progress(&s) >= 0.1).map(|s| s.time);
            let t90 = after_step.iter().find(|&&s| progress(&s) >= 0.9).map(|s| s.time);
            let rise = match (t10, t90) {
                (Some(a), Some(b)) => Some(b - a),
                _ => None,
            };

            let band = SETTLING_BAND * magnitude.abs();
            let outside = |s: &Sample| (s.feedback - target).abs() > band;
            let settle = match after_step.iter().rposition(outside) {
                None => Some(0.0),
                Some(i) if i + 1 < after_step.len() => Some(after_step[i + 1].time - step_time),
                Some(_) => None,
            };

            (overshoot, rise, settle)
        };

        Some(StepResponse {
            final_setpoint: target,
            final_value: last.feedback,
            steady_state_error: target - last.feedback,
            overshoot_pct,
            rise_time,
            settling_time,
            iae,
            peak_output,
        })
    }
}
