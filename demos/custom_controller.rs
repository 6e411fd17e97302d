use sampled_pid::analysis::StepResponse;
use sampled_pid::sim::{self, FirstOrderLag, SetpointProfile, SimConfig};
use sampled_pid::{Controller, Pid};

/// A bang-bang controller with hysteresis: full command below the band,
/// zero above it, hold inside.
struct BangBangController {
    command: f64,
    hysteresis: f64,
    on: bool,
}

impl Controller for BangBangController {
    fn control(&mut self, setpoint: f64, feedback: f64, _time: f64) -> f64 {
        if feedback < setpoint - self.hysteresis {
            self.on = true;
        } else if feedback > setpoint + self.hysteresis {
            self.on = false;
        }
        if self.on { self.command } else { 0.0 }
    }

    fn reset(&mut self) {
        self.on = false;
    }

    fn name(&self) -> &str {
        "BangBang"
    }
}

fn main() -> sampled_pid::Result<()> {
    let profile = SetpointProfile::Step { at: 0.5, before: 0.0, after: 1.0 };
    let config = SimConfig { dt: 0.01, duration: 8.0 };

    let mut bang_bang = BangBangController { command: 2.0, hysteresis: 0.05, on: false };
    let mut pid = Pid::with_clock(1.2, 1.0, 0.001, || 0.0);

    let controllers: [&mut dyn Controller; 2] = [&mut bang_bang, &mut pid];
    for controller in controllers {
        let mut plant = FirstOrderLag::new(1.0, 0.5, 0.0)?;
        println!("Simulating with {} controller...", controller.name());
        let samples = sim::simulate_with(&mut plant, controller, &profile, &config);

        if let Some(r) = StepResponse::from_samples(&samples) {
            println!("  Final value:   {:.4}", r.final_value);
            println!("  Overshoot:     {:.2} %", r.overshoot_pct);
            println!("  IAE:           {:.4}", r.iae);
            println!("  Peak command:  {:.3}", r.peak_output);
        }
    }
    Ok(())
}
