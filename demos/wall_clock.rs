use std::thread;
use std::time::Duration;

use sampled_pid::sim::{Accumulator, Plant};
use sampled_pid::{MonotonicClock, Pid};

/// Runs a controller against the real clock, polling faster than its
/// sample time. Only about half of the polls produce a new output.
fn main() {
    env_logger::init();

    let mut pid = Pid::with_clock(1.2, 1.0, 0.001, MonotonicClock::new());
    pid.set_sample_time(0.01);
    pid.set_setpoint(1.0);

    let mut plant = Accumulator::new(1.0, -0.2, 0.0);
    let poll = Duration::from_millis(5);
    let mut effective = 0;

    for i in 0..400 {
        if pid.update(plant.output()) {
            effective += 1;
        }
        plant.step(pid.output(), poll.as_secs_f64());
        if i % 40 == 0 {
            println!(
                "t={:>6.3}s  feedback={:>8.4}  output={:>8.4}",
                pid.last_time(),
                plant.output(),
                pid.output()
            );
        }
        thread::sleep(poll);
    }

    println!("{effective} of 400 polls passed the sample-time gate");
}
