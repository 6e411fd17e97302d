/// Trait for feedback controllers.
///
/// Implement this to plug a custom control law into the closed-loop
/// simulation in place of [`Pid`](super::Pid).
pub trait Controller {
    /// Compute the actuator command for the current setpoint and
    /// measurement. `time` is in seconds on the simulation time base.
    fn control(&mut self, setpoint: f64, feedback: f64, time: f64) -> f64;

    /// Reset controller internal state (e.g., integrators).
    fn reset(&mut self) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}
