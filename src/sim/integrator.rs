use nalgebra::DVector;

// ---------------------------------------------------------------------------
// RK4 integrator with the plant input held constant over the step
// ---------------------------------------------------------------------------

/// Single classic Runge-Kutta step of `x' = f(x)`.
pub fn rk4_step<F>(x: &DVector<f64>, dt: f64, f: F) -> DVector<f64>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let k1 = f(x);
    let k2 = f(&(x + &k1 * (dt * 0.5)));
    let k3 = f(&(x + &k2 * (dt * 0.5)));
    let k4 = f(&(x + &k3 * dt));

    x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}
