//! # Horizon Headless
//!
//! Drives a [`SimulationContext`] with a synthetic renderer whose frame
//! cost follows the active quality settings. Useful for exercising the
//! stepper, the adaptive controller and the preset benchmark without a GPU.
//!
//! ## Usage
//!
//! ```bash
//! horizon_headless --duration 30 --frame-cost 24 --benchmark
//! RUST_LOG=horizon=debug horizon_headless --config horizon.toml
//! ```

use std::process::ExitCode;
use std::time::{Duration, Instant};

use horizon::{HorizonConfig, HorizonResult, Preferences, SimulationContext, UiCommand};
use horizon_engine::Capabilities;
use horizon_perf::{BenchmarkReport, BenchmarkStep, QualitySettings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

struct Options {
    config: Option<String>,
    preferences: Option<String>,
    save_preferences: Option<String>,
    duration_secs: f64,
    frame_cost_ms: f64,
    benchmark: bool,
    realtime: bool,
    single_threaded: bool,
    mass: Option<f64>,
    spin: Option<f64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: None,
            preferences: None,
            save_preferences: None,
            duration_secs: 5.0,
            frame_cost_ms: 12.0,
            benchmark: false,
            realtime: false,
            single_threaded: false,
            mass: None,
            spin: None,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Some(options) = parse_args() else {
        return ExitCode::SUCCESS;
    };

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         HORIZON HEADLESS                                         ║");
    println!("║         BLACK HOLE PHYSICS / PERFORMANCE DRIVER                  ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("horizon_headless: {e}");
            ExitCode::FAILURE
        }
    }
}

fn parse_args() -> Option<Options> {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--config" | "-c" => {
                options.config = value.cloned();
                i += 1;
            }
            "--preferences" | "-p" => {
                options.preferences = value.cloned();
                i += 1;
            }
            "--save-preferences" => {
                options.save_preferences = value.cloned();
                i += 1;
            }
            "--duration" | "-d" => {
                options.duration_secs = value.and_then(|v| v.parse().ok()).unwrap_or(5.0);
                i += 1;
            }
            "--frame-cost" | "-f" => {
                options.frame_cost_ms = value.and_then(|v| v.parse().ok()).unwrap_or(12.0);
                i += 1;
            }
            "--mass" | "-m" => {
                options.mass = value.and_then(|v| v.parse().ok());
                i += 1;
            }
            "--spin" | "-s" => {
                options.spin = value.and_then(|v| v.parse().ok());
                i += 1;
            }
            "--benchmark" | "-b" => options.benchmark = true,
            "--realtime" | "-r" => options.realtime = true,
            "--single-threaded" => options.single_threaded = true,
            "--help" | "-h" => {
                println!("Usage: horizon_headless [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>           TOML configuration file");
                println!("  -p, --preferences <PATH>      Stored preferences to restore");
                println!("      --save-preferences <PATH> Write preferences on exit");
                println!("  -d, --duration <SECS>         Simulated seconds to run (default: 5)");
                println!("  -f, --frame-cost <MS>         Ultra frame cost at full scale (default: 12)");
                println!("  -m, --mass <M>                Black hole mass in solar masses");
                println!("  -s, --spin <A>                Dimensionless spin in [-1, 1]");
                println!("  -b, --benchmark               Run the preset benchmark");
                println!("  -r, --realtime                Sleep for each synthetic frame");
                println!("      --single-threaded         Step physics on the render thread");
                println!("  -h, --help                    Show this help");
                return None;
            }
            other => eprintln!("ignoring unknown argument `{other}`"),
        }
        i += 1;
    }
    Some(options)
}

/// Synthetic frame cost: ray-march work scales with steps and pixel count.
fn frame_cost_ms(base_ms: f64, settings: &QualitySettings) -> f64 {
    let steps = f64::from(settings.ray_march_steps) / 512.0;
    let pixels = f64::from(settings.resolution_scale).powi(2);
    let mut cost = base_ms * (0.25 + 0.75 * steps) * pixels;
    if settings.bloom {
        cost *= 1.05;
    }
    cost.max(0.5)
}

fn run(options: &Options) -> HorizonResult<()> {
    let mut config = match &options.config {
        Some(path) => HorizonConfig::from_file(path)?,
        None => HorizonConfig::default(),
    };
    if options.single_threaded {
        config.stepper.threaded = false;
    }

    let preferences = match &options.preferences {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let (prefs, rejected) = Preferences::load_lenient(&text);
            if !rejected.is_empty() {
                println!("Ignored preferences: {}", rejected.join(", "));
            }
            Some(prefs)
        }
        None => None,
    };

    let mut ctx = SimulationContext::new(&config, preferences.as_ref(), Capabilities::detect())?;

    if options.mass.is_some() || options.spin.is_some() {
        let current = ctx.black_hole();
        ctx.handle(UiCommand::Configure {
            mass: options.mass.unwrap_or(current.mass()),
            spin: options.spin.unwrap_or(current.spin()),
        })?;
    }

    let black_hole = ctx.black_hole();
    println!("┌─ CONFIGURATION ─────────────────────────────────────────────────┐");
    println!("│ Mass:               {} M☉", black_hole.mass());
    println!("│ Spin:               {}", black_hole.spin());
    println!("│ Preset:             {}", ctx.settings().preset);
    println!("│ Bridge:             {}", ctx.bridge_state());
    println!("│ Frame cost:         {} ms (ultra, full scale)", options.frame_cost_ms);
    println!("└─────────────────────────────────────────────────────────────────┘");
    println!();

    if options.benchmark {
        ctx.handle(UiCommand::StartBenchmark)?;
    }

    let started = Instant::now();
    let mut simulated = 0.0_f64;
    let mut next_report = 1.0_f64;
    let mut frames = 0_u64;
    let mut report: Option<BenchmarkReport> = None;

    loop {
        let cost = frame_cost_ms(options.frame_cost_ms, ctx.settings());
        if options.realtime {
            std::thread::sleep(Duration::from_secs_f64(cost / 1_000.0));
        }
        // Slow drift so the camera keeps publishing.
        ctx.handle(UiCommand::Orbit {
            dtheta: 0.002,
            dphi: 0.0,
            dzoom: 0.0,
        })?;
        let output = ctx.frame(cost);
        frames += 1;
        simulated += cost / 1_000.0;

        if let Some(BenchmarkStep::Finished(done)) = &output.benchmark {
            report = Some(done.clone());
        }

        if simulated >= next_report {
            next_report += 1.0;
            let physics = &output.snapshot.physics;
            match output.benchmark {
                Some(BenchmarkStep::Running { preset, progress }) => println!(
                    "[{:>6.1}s] benchmark {:<16} {:>5.1}%",
                    simulated,
                    preset.name(),
                    progress * 100.0
                ),
                _ => println!(
                    "[{:>6.1}s] {:>3} fps (avg {:>3}) scale {:.2} {:<16} t_coord {:>8.2} dilation {:.4}",
                    simulated,
                    output.metrics.current_fps,
                    output.metrics.rolling_average_fps,
                    output.resolution_scale,
                    output.settings.preset.name(),
                    physics.coordinate_time,
                    physics.camera_time_dilation
                ),
            }
        }

        let benchmark_done = !options.benchmark || report.is_some();
        if simulated >= options.duration_secs && benchmark_done {
            break;
        }
    }

    let stats = ctx.bridge_stats();
    println!();
    println!("┌─ SUMMARY ───────────────────────────────────────────────────────┐");
    println!("│ Frames:             {frames}");
    println!("│ Simulated:          {simulated:.1} s (wall {:.1} s)", started.elapsed().as_secs_f64());
    println!("│ Shared stepper:     {}", ctx.is_shared());
    println!(
        "│ Reads:              {} fresh / {} unchanged / {} torn / {} rejected",
        stats.fresh_reads, stats.unchanged_skips, stats.torn_reads, stats.non_finite_rejected
    );
    println!("│ Final preset:       {}", ctx.settings().preset);
    println!("│ Final scale:        {:.2}", ctx.settings().resolution_scale);
    println!("└─────────────────────────────────────────────────────────────────┘");

    if let Some(report) = report {
        println!();
        println!("┌─ BENCHMARK ─────────────────────────────────────────────────────┐");
        for result in &report.results {
            println!(
                "│ {:<16} avg {:>6.1} fps  min {:>6.1}  max {:>6.1}  ({} frames)",
                result.preset.name(),
                result.average_fps,
                result.min_fps,
                result.max_fps,
                result.samples
            );
        }
        println!("│ Recommended:        {}", report.recommended_preset);
        println!("└─────────────────────────────────────────────────────────────────┘");
    }

    if let Some(path) = &options.save_preferences {
        std::fs::write(path, ctx.preferences().to_toml_string()?)?;
        println!("Preferences saved to {path}");
    }

    ctx.shutdown();
    Ok(())
}
