use serde::{Deserialize, Serialize};

/// Setpoint as a function of simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SetpointProfile {
    Constant { value: f64 },
    /// `before` until `at` seconds, `after` from then on.
    Step { at: f64, before: f64, after: f64 },
}

impl SetpointProfile {
    pub fn value_at(&self, time: f64) -> f64 {
        match *self {
            SetpointProfile::Constant { value } => value,
            SetpointProfile::Step { at, before, after } => {
                if time >= at { after } else { before }
            }
        }
    }
}

impl Default for SetpointProfile {
    fn default() -> Self {
        SetpointProfile::Constant { value: 0.0 }
    }
}
