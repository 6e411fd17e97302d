use std::path::Path;

use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::control::pid::{
    DEFAULT_KD, DEFAULT_KI, DEFAULT_KP, DEFAULT_SAMPLE_TIME, DEFAULT_WINDUP_GUARD,
};
use crate::control::{IntervalPolicy, Pid};
use crate::error::{Error, Result};
use crate::sim::plant::{Accumulator, FirstOrderLag, Plant, StateSpace};
use crate::sim::runner::MAX_STEPS;
use crate::sim::{SetpointProfile, SimConfig};

// ---------------------------------------------------------------------------
// Controller configuration
// ---------------------------------------------------------------------------

/// Serializable controller tuning. Missing fields take the controller
/// defaults.
///
/// Inside a [`LoopConfig`] the setpoint profile drives the controller every
/// cycle, so `setpoint` only matters when the config builds a standalone
/// controller through [`Pid::from_config`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidConfig {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub setpoint: f64,
    pub sample_time: f64,
    pub windup_guard: f64,
    pub interval_policy: IntervalPolicy,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: DEFAULT_KP,
            ki: DEFAULT_KI,
            kd: DEFAULT_KD,
            setpoint: 0.0,
            sample_time: DEFAULT_SAMPLE_TIME,
            windup_guard: DEFAULT_WINDUP_GUARD,
            interval_policy: IntervalPolicy::PassThrough,
        }
    }
}

impl<C: Clock> Pid<C> {
    /// Build a controller from `config`, anchored to `clock`'s current
    /// reading. Values are applied as given, without validation.
    pub fn from_config(config: &PidConfig, clock: C) -> Self {
        let mut pid = Pid::with_clock(config.kp, config.ki, config.kd, clock);
        pid.set_setpoint(config.setpoint);
        pid.set_sample_time(config.sample_time);
        pid.set_windup_guard(config.windup_guard);
        pid.set_interval_policy(config.interval_policy);
        pid
    }
}

// ---------------------------------------------------------------------------
// Plant configuration
// ---------------------------------------------------------------------------

fn unit_gain() -> f64 {
    1.0
}

/// Serializable description of a simulated process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlantConfig {
    /// `y' = gain * u + disturbance`
    Accumulator {
        #[serde(default = "unit_gain")]
        gain: f64,
        #[serde(default)]
        disturbance: f64,
        #[serde(default)]
        initial: f64,
    },
    /// `tau * y' = gain * u - y`
    FirstOrderLag {
        #[serde(default = "unit_gain")]
        gain: f64,
        tau: f64,
        #[serde(default)]
        initial: f64,
    },
    /// `m * x'' + c * x' + k * x = u`, output `x`
    MassSpringDamper { mass: f64, damping: f64, stiffness: f64 },
    /// Linear SISO system. `a` is given row by row.
    StateSpace {
        a: Vec<Vec<f64>>,
        b: Vec<f64>,
        c: Vec<f64>,
        #[serde(default)]
        d: f64,
        #[serde(default)]
        x0: Option<Vec<f64>>,
    },
}

impl Default for PlantConfig {
    fn default() -> Self {
        PlantConfig::FirstOrderLag { gain: 1.0, tau: 0.5, initial: 0.0 }
    }
}

impl PlantConfig {
    /// Construct the plant, rejecting parameters it cannot simulate.
    pub fn build(&self) -> Result<Box<dyn Plant>> {
        let plant: Box<dyn Plant> = match self {
            PlantConfig::Accumulator { gain, disturbance, initial } => {
                Box::new(Accumulator::new(*gain, *disturbance, *initial))
            }
            PlantConfig::FirstOrderLag { gain, tau, initial } => {
                Box::new(FirstOrderLag::new(*gain, *tau, *initial)?)
            }
            PlantConfig::MassSpringDamper { mass, damping, stiffness } => {
                Box::new(StateSpace::mass_spring_damper(*mass, *damping, *stiffness)?)
            }
            PlantConfig::StateSpace { a, b, c, d, x0 } => {
                let n = a.len();
                if a.iter().any(|row| row.len() != n) {
                    return Err(Error::InvalidConfig(format!(
                        "state matrix must be square ({n} rows)"
                    )));
                }
                let plant = StateSpace::new(
                    DMatrix::from_fn(n, n, |i, j| a[i][j]),
                    DVector::from_column_slice(b),
                    DVector::from_column_slice(c),
                    *d,
                )?;
                match x0 {
                    Some(x0) => Box::new(
                        plant.with_initial_state(DVector::from_column_slice(x0))?,
                    ),
                    None => Box::new(plant),
                }
            }
        };
        Ok(plant)
    }
}

// ---------------------------------------------------------------------------
// Closed-loop configuration
// ---------------------------------------------------------------------------

/// Everything needed to run one closed-loop simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub name: String,
    pub pid: PidConfig,
    pub plant: PlantConfig,
    pub setpoint: SetpointProfile,
    pub sim: SimConfig,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            name: "step-response".into(),
            pid: PidConfig { kp: 1.2, ki: 1.0, kd: 0.001, ..PidConfig::default() },
            plant: PlantConfig::default(),
            setpoint: SetpointProfile::Step { at: 0.2, before: 0.0, after: 1.0 },
            sim: SimConfig::default(),
        }
    }
}

impl LoopConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LoopConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("loading loop config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check the simulation settings and plant parameters. The run may not
    /// exceed [`MAX_STEPS`] cycles. Controller tuning is not range-checked.
    pub fn validate(&self) -> Result<()> {
        if !(self.sim.dt > 0.0 && self.sim.dt.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "sim.dt must be positive and finite, got {}",
                self.sim.dt
            )));
        }
        if !(self.sim.duration > 0.0 && self.sim.duration.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "sim.duration must be positive and finite, got {}",
                self.sim.duration
            )));
        }
        let steps = self.sim.steps();
        if steps > MAX_STEPS as f64 {
            return Err(Error::InvalidConfig(format!(
                "sim.duration / sim.dt asks for {steps:e} steps, limit is {MAX_STEPS}"
            )));
        }
        self.plant.build().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn pid_config_defaults_match_controller() {
        let config: PidConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PidConfig::default());
        let pid = Pid::from_config(&config, ManualClock::new(0.0));
        assert_eq!((pid.kp(), pid.ki(), pid.kd()), (2.0, 0.0, 1.0));
        assert_eq!(pid.windup_guard(), 20.0);
    }

    #[test]
    fn from_config_applies_every_field() {
        let config = PidConfig {
            kp: 0.5,
            ki: 0.25,
            kd: 0.125,
            setpoint: 3.0,
            sample_time: 0.1,
            windup_guard: 4.0,
            interval_policy: IntervalPolicy::Rearm,
        };
        let pid = Pid::from_config(&config, ManualClock::new(2.0));
        assert_eq!((pid.kp(), pid.ki(), pid.kd()), (0.5, 0.25, 0.125));
        assert_eq!(pid.setpoint(), 3.0);
        assert_eq!(pid.sample_time(), 0.1);
        assert_eq!(pid.windup_guard(), 4.0);
        assert_eq!(pid.interval_policy(), IntervalPolicy::Rearm);
        assert_eq!(pid.last_time(), 2.0);
    }

    #[test]
    fn parses_tagged_plants() {
        let json = r#"{
            "name": "msd",
            "pid": { "kp": 10.0, "interval_policy": "rearm" },
            "plant": { "kind": "mass_spring_damper", "mass": 1.0, "damping": 0.5, "stiffness": 2.0 },
            "setpoint": { "kind": "constant", "value": 1.0 },
            "sim": { "dt": 0.01, "duration": 2.0 }
        }"#;
        let config = LoopConfig::from_json_str(json).unwrap();
        assert_eq!(config.name, "msd");
        assert_eq!(config.pid.kp, 10.0);
        assert_eq!(config.pid.ki, 0.0);
        assert_eq!(config.pid.interval_policy, IntervalPolicy::Rearm);
        assert!(matches!(config.plant, PlantConfig::MassSpringDamper { .. }));
    }

    #[test]
    fn rejects_non_positive_dt() {
        let json = r#"{ "sim": { "dt": 0.0, "duration": 1.0 } }"#;
        let err = LoopConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)), "got {err}");
    }

    #[test]
    fn rejects_step_counts_above_limit() {
        for json in [
            r#"{ "sim": { "dt": 1e-300, "duration": 1.0 } }"#,
            r#"{ "sim": { "dt": 1e-9, "duration": 1e3 } }"#,
        ] {
            let err = LoopConfig::from_json_str(json).unwrap_err();
            assert!(matches!(err, Error::InvalidConfig(_)), "got {err}");
        }
        let at_limit = format!(r#"{{ "sim": {{ "dt": 1.0, "duration": {MAX_STEPS}.0 }} }}"#);
        assert!(LoopConfig::from_json_str(&at_limit).is_ok());
    }

    #[test]
    fn rejects_ragged_state_matrix() {
        let json = r#"{
            "plant": { "kind": "state_space", "a": [[0.0, 1.0], [0.0]], "b": [0.0, 1.0], "c": [1.0, 0.0] }
        }"#;
        assert!(matches!(
            LoopConfig::from_json_str(json),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(LoopConfig::from_json_str("{ nope"), Err(Error::Json(_))));
    }
}
