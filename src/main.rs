use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use carlot_sim::config::{CarVariant, VehicleConfig};
use carlot_sim::error::SimError;
use carlot_sim::feed::{spawn_stdin_feed, InputMessage};
use carlot_sim::physics::PhysicsWorld;
use carlot_sim::scene::SceneKind;
use carlot_sim::state::Snapshot;

/// Headless car sandbox: JSON input events on stdin, JSON snapshots on stdout.
#[derive(Debug, Parser)]
#[command(name = "carlot-sim", version)]
struct Args {
    /// Scene to load
    #[arg(long, value_enum, default_value = "parking-lot")]
    scene: SceneKind,

    /// Car build for the parking lot (ignored with --config)
    #[arg(long, value_enum, default_value = "raycast")]
    car: CarVariant,

    /// Vehicle config JSON, overrides --car
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed tick rate
    #[arg(long, default_value_t = 50)]
    hz: u32,

    /// Stop after this many ticks (0 = run forever)
    #[arg(long, default_value_t = 0)]
    ticks: u64,

    /// Ticks between snapshots (0 = never)
    #[arg(long, default_value_t = 10)]
    report_every: u64,
}

fn apply_input(world: &mut PhysicsWorld, msg: InputMessage) {
    match msg.vehicle {
        Some(id) => {
            if let Err(err) = world.handle_event(&id, msg.event) {
                warn!(%err, "dropping input");
            }
        }
        None => world.broadcast_event(msg.event),
    }
}

fn report(world: &PhysicsWorld) -> Result<(), SimError> {
    let snapshot = Snapshot {
        tick: world.tick,
        vehicles: world.snapshot(),
    };
    println!("{}", serde_json::to_string(&snapshot).map_err(SimError::Snapshot)?);
    Ok(())
}

async fn run(args: Args) -> Result<(), SimError> {
    let player = match &args.config {
        Some(path) => VehicleConfig::from_json_file(path)?,
        None => VehicleConfig::preset(args.car),
    };

    let mut world = PhysicsWorld::new();
    args.scene.spawn(&mut world, &player)?;

    let mut inputs: mpsc::UnboundedReceiver<InputMessage> = spawn_stdin_feed();

    let hz = args.hz.max(1);
    let dt = 1.0 / hz as f32;
    let mut ticker = interval(Duration::from_secs_f64(1.0 / f64::from(hz)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(scene = args.scene.as_str(), hz, ticks = args.ticks, "sim running");

    loop {
        ticker.tick().await;

        // latest sample wins, read once at tick start
        while let Ok(msg) = inputs.try_recv() {
            apply_input(&mut world, msg);
        }

        world.step(dt);

        if args.report_every > 0 && world.tick % args.report_every == 0 {
            report(&world)?;
        }

        if args.ticks > 0 && world.tick >= args.ticks {
            break;
        }
    }

    info!(ticks = world.tick, "sim stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "sim failed");
            ExitCode::FAILURE
        }
    }
}
