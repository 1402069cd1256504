//! `rover` – runs the perception-to-decision loop against the simulated HAL.
//!
//! Each control cycle:
//!
//! 1. copies the simulated drive's telemetry into the rover record,
//! 2. captures a frame and runs one perception pass (observations + map),
//! 3. runs one decision pass (state transition + motion intent),
//! 4. hands the intent to the drive.
//!
//! Configuration comes from `--config PATH`, else `~/.rover/config.toml`,
//! else built-in defaults; `ROVER_*` environment variables override
//! selected fields.

mod scene;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::{debug, error, info};

use rover_decision::{Controller, StepKind};
use rover_hal::{Camera, DriveActuator, SimCamera, SimDrive};
use rover_perception::{MapChannel, Perception, WorldMap};
use rover_types::config::{self, RoverConfig};
use rover_types::RoverState;

/// Run the rover control loop in simulation.
#[derive(Parser, Debug)]
#[command(name = "rover", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file (defaults to ~/.rover/config.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of control cycles to run.
    #[arg(short = 'n', long, default_value_t = 200)]
    cycles: u32,
}

/// Where the simulated rover starts, in world units.
const START_POS: (f64, f64) = (99.7, 85.6);
const START_YAW: f64 = 10.0;

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let cfg = load_config(cli.config.as_deref());
    print_banner(&cfg, cli.cycles);

    let perception = match Perception::new(cfg.perception.clone()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}: {e}", "Calibration failed".red().bold());
            return ExitCode::FAILURE;
        }
    };

    let p = &cfg.perception;
    let mut map = WorldMap::with_increment(p.world_dimension, p.evidence_increment);
    let mut camera = SimCamera::new("front_rgb", scene::frames(p.frame_width, p.frame_height));
    let mut drive = SimDrive::new("drive_base", START_POS, START_YAW)
        .with_samples(vec![(START_POS.0 + 4.0, START_POS.1 + 6.0)]);
    let mut controller = Controller::new();

    let mut rover = RoverState::at(START_POS, START_YAW);
    rover.max_vel = cfg.drive.max_vel;

    let mut transitions = 0u32;
    let mut ran = 0u32;
    for cycle in 0..cli.cycles {
        drive.telemetry().write_to(&mut rover);

        let frame = match camera.capture() {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, cycle, "camera capture failed; stopping");
                break;
            }
        };
        let report = perception.step(&frame, &mut rover, &mut map);
        let decision = controller.run(&mut rover, &cfg);
        if decision.kind == StepKind::Entered {
            transitions += 1;
        }

        if let Err(e) = drive.apply(&rover.intent) {
            error!(error = %e, cycle, "drive rejected intent; stopping");
            break;
        }
        ran += 1;

        debug!(
            cycle,
            state = %controller.state(),
            nav = report.nav_pixels,
            rock = report.rock_pixels,
            throttle = rover.intent.throttle,
            steer = rover.intent.steer,
            "cycle complete"
        );
    }

    info!(
        cycles = ran,
        state = %controller.state(),
        navigable = map.channel_total(MapChannel::Navigable),
        obstacle = map.channel_total(MapChannel::Obstacle),
        rock = map.channel_total(MapChannel::Rock),
        throttle = rover.intent.throttle,
        brake = rover.intent.brake,
        steer = rover.intent.steer,
        "run finished"
    );
    print_summary(&rover, &map, &controller, ran, transitions);
    ExitCode::SUCCESS
}

// ─────────────────────────────────────────────────────────────────────────────
// Setup
// ─────────────────────────────────────────────────────────────────────────────

/// Initialise tracing-subscriber from `RUST_LOG` (default `info`).
/// `ROVER_LOG_FORMAT=json` switches to newline-delimited JSON.
fn init_logging() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("ROVER_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }
}

fn load_config(path: Option<&std::path::Path>) -> RoverConfig {
    let loaded = match path {
        Some(p) => config::load_from(p),
        None => config::load(),
    };
    match loaded {
        Ok(Some(cfg)) => {
            let shown = path.map(PathBuf::from).unwrap_or_else(config::config_path);
            println!("  Config loaded from {}", shown.display().to_string().bold());
            cfg
        }
        Ok(None) => {
            if let Some(p) = path {
                println!("  {} {}", "No config at".yellow(), p.display());
            }
            println!("  Using default configuration.");
            let mut cfg = RoverConfig::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = RoverConfig::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner(cfg: &RoverConfig, cycles: u32) {
    println!();
    println!("{}", "  ROVER · perception → decision loop (simulated)".bold().cyan());
    println!(
        "  frame {}x{} · map {}x{} · {} cycles · collect {} samples",
        cfg.perception.frame_width,
        cfg.perception.frame_height,
        cfg.perception.world_dimension,
        cfg.perception.world_dimension,
        cycles,
        cfg.events.samples_to_collect
    );
    println!();
}

fn print_summary(
    rover: &RoverState,
    map: &WorldMap,
    controller: &Controller,
    cycles: u32,
    transitions: u32,
) {
    println!();
    println!("{}", "  Run summary".bold());
    println!("  cycles run        {cycles}");
    println!("  state changes     {transitions}");
    println!("  final state       {}", controller.state().to_string().green());
    println!(
        "  pose              ({:.1}, {:.1}) yaw {:.1}° vel {:.2}",
        rover.pos.0, rover.pos.1, rover.yaw, rover.vel
    );
    println!("  samples collected {}", rover.samples_collected);
    println!(
        "  last intent       throttle {:.2} brake {:.1} steer {:.1}°",
        rover.intent.throttle, rover.intent.brake, rover.intent.steer
    );
    println!(
        "  map cells seen    navigable {} · obstacle {} · rock {}",
        map.cells_seen(MapChannel::Navigable),
        map.cells_seen(MapChannel::Obstacle),
        map.cells_seen(MapChannel::Rock)
    );
    println!();
}
