pub mod integrator;
pub mod plant;
pub mod runner;
pub mod setpoint;

pub use integrator::rk4_step;
pub use plant::{Accumulator, FirstOrderLag, Plant, StateSpace};
pub use runner::{simulate, simulate_with, Sample, SimConfig};
pub use setpoint::SetpointProfile;
