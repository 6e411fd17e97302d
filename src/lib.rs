//! Sample-time gated PID controller.
//!
//! [`Pid`] computes a new output only when at least `sample_time` seconds
//! have passed since its last effective update, clamps its integral with a
//! symmetric windup guard, and reads time from an injected [`Clock`].
//! The [`sim`] module closes the loop around simulated plants.

pub mod analysis;
pub mod clock;
pub mod config;
pub mod control;
pub mod error;
pub mod io;
pub mod sim;

pub use clock::{Clock, ManualClock, MonotonicClock, SystemClock};
pub use config::{LoopConfig, PidConfig, PlantConfig};
pub use control::{Controller, IntervalPolicy, Pid};
pub use error::{Error, Result};
