use log::info;
use serde::{Deserialize, Serialize};

use super::plant::Plant;
use super::setpoint::SetpointProfile;
use crate::config::LoopConfig;
use crate::control::{Controller, Pid};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Simulation config and samples
// ---------------------------------------------------------------------------

/// Largest number of control cycles a loop config may ask for.
pub const MAX_STEPS: usize = 10_000_000;

/// Cap on the samples buffer allocated up front.
const PREALLOC_CAP: usize = 200_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub dt: f64,
    pub duration: f64,
}

impl SimConfig {
    /// Number of steps after `t = 0`, as the runner counts them.
    pub fn steps(&self) -> f64 {
        (self.duration / self.dt).round()
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.02,       // 50 Hz loop, twice the default controller sample time
            duration: 10.0,
        }
    }
}

/// One control cycle of a closed-loop run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub time: f64,
    pub setpoint: f64,
    pub feedback: f64,
    pub output: f64,
}

// ---------------------------------------------------------------------------
// Closed-loop simulation
// ---------------------------------------------------------------------------

/// Run `controller` against `plant` for `config.duration` seconds.
///
/// Every `dt` the controller sees the plant output and the profile's
/// setpoint; its command is then held on the plant input for the next
/// step. Returns one sample per cycle, starting at `t = 0`.
pub fn simulate_with(
    plant: &mut dyn Plant,
    controller: &mut dyn Controller,
    profile: &SetpointProfile,
    config: &SimConfig,
) -> Vec<Sample> {
    let steps = config.steps() as usize;
    let mut samples = Vec::with_capacity(steps.saturating_add(1).min(PREALLOC_CAP));

    for i in 0..=steps {
        // Multiply rather than accumulate so times stay exact multiples of dt.
        let time = i as f64 * config.dt;
        let setpoint = profile.value_at(time);
        let feedback = plant.output();
        let output = controller.control(setpoint, feedback, time);

        samples.push(Sample { time, setpoint, feedback, output });

        if i < steps {
            plant.step(output, config.dt);
        }
    }

    samples
}

/// Build the controller and plant described by `config` and run the loop.
///
/// The controller is timed by the simulation clock, anchored at `t = 0`.
pub fn simulate(config: &LoopConfig) -> Result<Vec<Sample>> {
    config.validate()?;
    let mut plant = config.plant.build()?;
    let mut pid = Pid::from_config(&config.pid, || 0.0);

    info!(
        "simulating '{}': {} with {} for {:.2}s at dt={}",
        config.name,
        Controller::name(&pid),
        plant.name(),
        config.sim.duration,
        config.sim.dt
    );

    Ok(simulate_with(plant.as_mut(), &mut pid, &config.setpoint, &config.sim))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
