use std::path::PathBuf;

use log::info;

use sampled_pid::analysis::StepResponse;
use sampled_pid::io::{csv, json};
use sampled_pid::sim::{self, Sample};
use sampled_pid::{Error, LoopConfig, Result};

const USAGE: &str = "usage: sampled-pid [CONFIG.json] [--csv PATH] [--json PATH]";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
    help: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--csv" | "--json" => {
                let path = args
                    .next()
                    .map(PathBuf::from)
                    .ok_or_else(|| Error::InvalidArgument(format!("{arg} needs a path")))?;
                if arg == "--csv" {
                    parsed.csv = Some(path);
                } else {
                    parsed.json = Some(path);
                }
            }
            "-h" | "--help" => parsed.help = true,
            flag if flag.starts_with('-') => {
                return Err(Error::InvalidArgument(format!("unknown flag {flag}\n{USAGE}")))
            }
            _ if parsed.config.is_none() => parsed.config = Some(PathBuf::from(&arg)),
            _ => return Err(Error::InvalidArgument(format!("unexpected argument {arg}\n{USAGE}"))),
        }
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }
    let config = match &args.config {
        Some(path) => LoopConfig::load(path)?,
        None => {
            info!("no config given, running the built-in step response");
            LoopConfig::default()
        }
    };

    let samples = sim::simulate(&config)?;
    let response = StepResponse::from_samples(&samples)
        .ok_or_else(|| Error::InvalidConfig("simulation produced no samples".into()))?;

    print_report(&config, &samples, &response);

    if let Some(path) = &args.csv {
        csv::write_samples_file(path, &samples)?;
        info!("wrote {} samples to {}", samples.len(), path.display());
    }
    if let Some(path) = &args.json {
        json::write_summary_file(path, &config, samples.len(), &response)?;
        info!("wrote summary to {}", path.display());
    }

    Ok(())
}

fn print_report(config: &LoopConfig, samples: &[Sample], response: &StepResponse) {
    let pid = &config.pid;

    println!();
    println!("====================================================================");
    println!("  PID CLOSED-LOOP SIMULATION: {}", config.name);
    println!("====================================================================");
    println!();
    println!("  Controller");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Kp:            {:>8.4}       Ki:           {:>8.4}",
        pid.kp, pid.ki
    );
    println!(
        "  Kd:            {:>8.4}       Windup guard: {:>8.3}",
        pid.kd, pid.windup_guard
    );
    println!(
        "  Sample time:   {:>8.4} s     Loop dt:      {:>8.4} s",
        pid.sample_time, config.sim.dt
    );
    println!();

    println!("  Response");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Setpoint:      {:>8.4}       Final value:  {:>8.4}",
        response.final_setpoint, response.final_value
    );
    println!(
        "  Overshoot:     {:>8.2} %     SS error:     {:>8.4}",
        response.overshoot_pct, response.steady_state_error
    );
    println!(
        "  Rise time:     {:>10}     Settling:     {:>10}",
        fmt_time(response.rise_time),
        fmt_time(response.settling_time)
    );
    println!(
        "  IAE:           {:>8.4}       Peak output:  {:>8.4}",
        response.iae, response.peak_output
    );
    println!();

    // -----------------------------------------------------------------------
    // Sampled table
    // -----------------------------------------------------------------------
    println!("  Trace");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>8}  {:>10}  {:>10}  {:>10}",
        "t (s)", "setpoint", "feedback", "output"
    );
    println!("  {}", "─".repeat(46));

    let interval = (samples.len() / 25).max(1);
    for (i, s) in samples.iter().enumerate() {
        if i % interval != 0 && i != samples.len() - 1 {
            continue;
        }
        println!(
            "  {:>8.3}  {:>10.4}  {:>10.4}  {:>10.4}",
            s.time, s.setpoint, s.feedback, s.output
        );
    }

    println!();
    println!("  Simulation: {} steps, dt={} s", samples.len(), config.sim.dt);
    println!("====================================================================");
    println!();
}

fn fmt_time(t: Option<f64>) -> String {
    t.map_or_else(|| "n/a".to_string(), |t| format!("{t:.3} s"))
}
