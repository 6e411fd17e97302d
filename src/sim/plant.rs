use nalgebra::{DMatrix, DVector};

use super::integrator::rk4_step;
use crate::error::{Error, Result};

/// Trait for simulated processes driven by a controller.
pub trait Plant {
    /// Current measured output (the controller's feedback).
    fn output(&self) -> f64;

    /// Advance the process by `dt` seconds with `input` held constant.
    fn step(&mut self, input: f64, dt: f64);

    /// Return to the initial condition.
    fn reset(&mut self);

    fn name(&self) -> &str {
        "plant"
    }
}

// ---------------------------------------------------------------------------
// Accumulator: y' = gain * u + disturbance
// ---------------------------------------------------------------------------

/// Pure integrator with a constant disturbance rate, the process in which
/// feedback simply accumulates the controller output.
#[derive(Debug, Clone)]
pub struct Accumulator {
    pub gain: f64,
    pub disturbance: f64,
    initial: f64,
    value: f64,
}

impl Accumulator {
    pub fn new(gain: f64, disturbance: f64, initial: f64) -> Self {
        Self { gain, disturbance, initial, value: initial }
    }
}

impl Plant for Accumulator {
    fn output(&self) -> f64 {
        self.value
    }

    fn step(&mut self, input: f64, dt: f64) {
        self.value += (self.gain * input + self.disturbance) * dt;
    }

    fn reset(&mut self) {
        self.value = self.initial;
    }

    fn name(&self) -> &str {
        "Accumulator"
    }
}

// ---------------------------------------------------------------------------
// First-order lag: tau * y' = gain * u - y
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FirstOrderLag {
    pub gain: f64,
    tau: f64,
    initial: f64,
    value: f64,
}

impl FirstOrderLag {
    pub fn new(gain: f64, tau: f64, initial: f64) -> Result<Self> {
        if !(tau > 0.0 && tau.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "time constant must be positive and finite, got {tau}"
            )));
        }
        Ok(Self { gain, tau, initial, value: initial })
    }
}

impl Plant for FirstOrderLag {
    fn output(&self) -> f64 {
        self.value
    }

    // Exact discretization for a held input.
    fn step(&mut self, input: f64, dt: f64) {
        let target = self.gain * input;
        let alpha = 1.0 - (-dt / self.tau).exp();
        self.value += (target - self.value) * alpha;
    }

    fn reset(&mut self) {
        self.value = self.initial;
    }

    fn name(&self) -> &str {
        "FirstOrderLag"
    }
}

// ---------------------------------------------------------------------------
// Linear state-space SISO system
// ---------------------------------------------------------------------------

/// `x' = A x + B u`, `y = C x + D u`.
#[derive(Debug, Clone)]
pub struct StateSpace {
    a: DMatrix<f64>,
    b: DVector<f64>,
    c: DVector<f64>,
    d: f64,
    x0: DVector<f64>,
    x: DVector<f64>,
    last_input: f64,
}

impl StateSpace {
    pub fn new(a: DMatrix<f64>, b: DVector<f64>, c: DVector<f64>, d: f64) -> Result<Self> {
        let n = a.nrows();
        if n == 0 || !a.is_square() {
            return Err(Error::InvalidConfig(format!(
                "state matrix must be square and non-empty, got {}x{}",
                a.nrows(),
                a.ncols()
            )));
        }
        if b.len() != n || c.len() != n {
            return Err(Error::InvalidConfig(format!(
                "input/output vectors must have {n} entries, got b={} c={}",
                b.len(),
                c.len()
            )));
        }
        let x0 = DVector::zeros(n);
        Ok(Self { a, b, c, d, x: x0.clone(), x0, last_input: 0.0 })
    }

    /// Mass-spring-damper with force input and position output.
    pub fn mass_spring_damper(mass: f64, damping: f64, stiffness: f64) -> Result<Self> {
        if !(mass > 0.0 && mass.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "mass must be positive and finite, got {mass}"
            )));
        }
        #[rustfmt::skip]
        let a = DMatrix::from_row_slice(2, 2, &[
            0.0,               1.0,
            -stiffness / mass, -damping / mass,
        ]);
        Self::new(
            a,
            DVector::from_vec(vec![0.0, 1.0 / mass]),
            DVector::from_vec(vec![1.0, 0.0]),
            0.0,
        )
    }

    pub fn with_initial_state(mut self, x0: DVector<f64>) -> Result<Self> {
        if x0.len() != self.order() {
            return Err(Error::InvalidConfig(format!(
                "initial state must have {} entries, got {}",
                self.order(),
                x0.len()
            )));
        }
        self.x = x0.clone();
        self.x0 = x0;
        Ok(self)
    }

    pub fn order(&self) -> usize {
        self.a.nrows()
    }
}

impl Plant for StateSpace {
    fn output(&self) -> f64 {
        self.c.dot(&self.x) + self.d * self.last_input
    }

    fn step(&mut self, input: f64, dt: f64) {
        let (a, b) = (&self.a, &self.b);
        self.x = rk4_step(&self.x, dt, |x| a * x + b * input);
        self.last_input = input;
    }

    fn reset(&mut self) {
        self.x = self.x0.clone();
        self.last_input = 0.0;
    }

    fn name(&self) -> &str {
        "StateSpace"
    }
}
