use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use sampled_pid::analysis::StepResponse;
use sampled_pid::sim::{self, Sample};
use sampled_pid::LoopConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => LoopConfig::load(&path).unwrap_or_else(|e| {
            log::error!("{path}: {e}, falling back to the default loop");
            LoopConfig::default()
        }),
        None => LoopConfig::default(),
    };
    let samples = sim::simulate(&config).unwrap_or_else(|e| {
        log::error!("simulation failed: {e}");
        Vec::new()
    });
    let response = StepResponse::from_samples(&samples);

    let app = PidViz { config, samples, response };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("PID Step Response", options, Box::new(|_| Ok(Box::new(app))))
}

struct PidViz {
    config: LoopConfig,
    samples: Vec<Sample>,
    response: Option<StepResponse>,
}

impl eframe::App for PidViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            let pid = &self.config.pid;
            ui.heading(format!("Loop: {}", self.config.name));
            ui.label(format!(
                "Kp {:.3}  |  Ki {:.3}  |  Kd {:.3}  |  sample time {:.3} s  |  windup guard {:.2}",
                pid.kp, pid.ki, pid.kd, pid.sample_time, pid.windup_guard,
            ));
            if let Some(r) = &self.response {
                ui.label(format!(
                    "Overshoot {:.1} %  |  Settling {}  |  SS error {:.4}  |  IAE {:.4}",
                    r.overshoot_pct,
                    r.settling_time.map_or("n/a".to_string(), |t| format!("{t:.2} s")),
                    r.steady_state_error,
                    r.iae,
                ));
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let half_h = ui.available_size().y / 2.0 - 8.0;

            ui.label("Setpoint / Feedback");
            let setpoint: PlotPoints = self.samples.iter().map(|s| [s.time, s.setpoint]).collect();
            let feedback: PlotPoints = self.samples.iter().map(|s| [s.time, s.feedback]).collect();
            Plot::new("response")
                .height(half_h)
                .legend(Legend::default())
                .x_axis_label("Time (s)")
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new("Setpoint", setpoint));
                    plot_ui.line(Line::new("Feedback", feedback));
                });

            ui.label("Controller output");
            let output: PlotPoints = self.samples.iter().map(|s| [s.time, s.output]).collect();
            Plot::new("output")
                .height(half_h)
                .x_axis_label("Time (s)")
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new("Output", output));
                });
        });
    }
}
