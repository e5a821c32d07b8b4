//! Kinebox - headless scenario runner
//!
//! Drives a single character body through one of the built-in scenes with a
//! scripted input timeline and logs what the motor reports each tick.
//!
//! ```text
//! RUST_LOG=debug kinebox --scenario stairs --ticks 120
//! ```

mod scene;

use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use kinebox_physics::{Body, BoxShape, CharacterMotor, MotionState, SolverConfig};

use scene::{ScenarioKind, Scene};

#[derive(Parser, Debug)]
#[command(name = "kinebox", version, about = "Run a scripted character motor scenario")]
struct Args {
    /// Solver configuration file (TOML). Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scene and input timeline to run
    #[arg(long, value_enum, default_value_t = ScenarioKind::Arena)]
    scenario: ScenarioKind,

    /// Number of fixed ticks to simulate
    #[arg(long, default_value_t = 300)]
    ticks: u32,

    /// Simulation rate in ticks per second
    #[arg(long, default_value_t = 60.0)]
    tick_rate: f32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    ensure!(
        args.tick_rate.is_finite() && args.tick_rate > 0.0,
        "--tick-rate must be positive, got {}",
        args.tick_rate
    );
    let dt = 1.0 / args.tick_rate;

    let config = match &args.config {
        Some(path) => SolverConfig::load(path)
            .with_context(|| format!("loading solver config {}", path.display()))?,
        None => SolverConfig::default(),
    };
    let motor = CharacterMotor::new(config).context("invalid solver config")?;

    let scene = Scene::build(args.scenario);
    let mut body = Body::new(BoxShape::CHARACTER, scene.spawn)?;
    let mut state = MotionState::new();
    motor.spawn_at(&mut body, &mut state, scene.spawn, &scene.world);

    log::info!(
        "scene '{}': {} shapes, spawned at {:?} (grounded: {})",
        scene.name,
        scene.world.brush_count(),
        body.position,
        state.is_grounded()
    );

    let mut steps = 0;
    let mut unconverged = 0;

    for tick in 0..args.ticks {
        for cue in scene.cues_at(tick) {
            if let Some(wish) = cue.wish {
                state.set_move_wish(wish);
            }
            if cue.jump {
                state.request_jump();
            }
        }

        let report = motor.update(&mut body, &mut state, &scene.world, dt);

        if let Some(event) = report.event {
            log::info!("tick {tick}: {event:?} at {:.3?}", body.position);
        }
        if report.stepped {
            steps += 1;
        }
        if !report.converged {
            unconverged += 1;
            log::warn!("tick {tick}: contacts unresolved after {} passes", report.iterations);
        }
        log::trace!(
            "tick {tick}: pos={:.3?} vel={:.3?} iterations={}",
            body.position,
            state.velocity,
            report.iterations
        );
    }

    println!("scenario:   {}", scene.name);
    println!("ticks:      {} at {} Hz", args.ticks, args.tick_rate);
    println!("position:   {:.3?}", body.position);
    println!("velocity:   {:.3?}", state.velocity);
    println!("grounded:   {}", state.is_grounded());
    println!("steps:      {steps}");
    println!("unresolved: {unconverged}");

    Ok(())
}
