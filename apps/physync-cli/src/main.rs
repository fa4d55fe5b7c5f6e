mod run;
mod scenario;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec2;
use physync_input::{Action, DragSession, Ray};
use physync_physics::{PhysicsBridge, PhysicsConfig};
use physync_render::{DebugTextRenderer, RenderView, Renderer};
use physync_scene::{Scene, SceneDesc};
use physync_tools::{BodyInfo, PhysicsInspector, PhysicsSummary};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use run::{LoopOutcome, Pace};

#[derive(Parser)]
#[command(name = "physync-cli", about = "Headless driver for the physync physics bridge")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML physics config; unset fields keep their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Pace the loop with the wall clock instead of running as fast as possible
    #[arg(long, global = true)]
    realtime: bool,

    /// Print the run summary as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info and the active physics config
    Info,
    /// Drop a box onto flat ground
    Drop {
        /// Start height of the box
        #[arg(long, default_value = "5")]
        height: f32,
        /// Seconds of simulated time
        #[arg(short, long, default_value = "5")]
        seconds: f32,
    },
    /// Drop a column of instanced crates
    Stack {
        /// Number of crates
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,
        #[arg(short, long, default_value = "8")]
        seconds: f32,
    },
    /// Roll balls over generated terrain
    Terrain {
        /// Height samples per side
        #[arg(long, default_value = "128")]
        samples: usize,
        #[arg(long, default_value = "0")]
        min_height: f32,
        #[arg(long, default_value = "4")]
        max_height: f32,
        #[arg(long, default_value = "6")]
        balls: usize,
        #[arg(short, long, default_value = "10")]
        seconds: f32,
    },
    /// Drop a box, then drag it across the ground with the pointer
    Drag {
        #[arg(short, long, default_value = "4")]
        seconds: f32,
    },
}

#[derive(Serialize)]
struct RunSummary {
    scenario: &'static str,
    #[serde(rename = "loop")]
    outcome: LoopOutcome,
    physics: PhysicsSummary,
    bodies: Vec<BodyInfo>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => PhysicsConfig::load(path)
            .with_context(|| format!("loading physics config {}", path.display()))?,
        None => PhysicsConfig::default(),
    };

    let pace = Pace::new(cli.realtime);
    let mut bridge = PhysicsBridge::with_clock(config, pace.bridge_clock())?;
    let mut scene = Scene::new();

    let (scenario, outcome) = match cli.command {
        Commands::Info => {
            println!("physync-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("scene: {}", physync_scene::crate_info());
            println!("physics: {}", physync_physics::crate_info());
            println!("render: {}", physync_render::crate_info());
            println!("tools: {}", physync_tools::crate_info());
            let c = bridge.config();
            println!(
                "config: gravity={} frame_rate={} friction={} damping=({}, {}) margin={} band=[{}, {}] max_substeps={}",
                c.gravity,
                c.frame_rate,
                c.friction,
                c.linear_damping,
                c.angular_damping,
                c.collision_margin,
                c.heightfield_min,
                c.heightfield_max,
                c.max_substeps
            );
            return Ok(());
        }
        Commands::Drop { height, seconds } => {
            scenario::ground(&mut bridge, &mut scene)?;
            scenario::drop_box(&mut bridge, &mut scene, height)?;
            let outcome = run::run(&pace, &mut bridge, &mut scene, secs(seconds)?, |_, _, _| {});
            ("drop", outcome)
        }
        Commands::Stack { count, seconds } => {
            scenario::ground(&mut bridge, &mut scene)?;
            scenario::stack(&mut bridge, &mut scene, count)?;
            let outcome = run::run(&pace, &mut bridge, &mut scene, secs(seconds)?, |_, _, _| {});
            ("stack", outcome)
        }
        Commands::Terrain {
            samples,
            min_height,
            max_height,
            balls,
            seconds,
        } => {
            let mut desc = SceneDesc::new();
            scenario::terrain(
                &mut bridge,
                &mut scene,
                &mut desc,
                samples,
                min_height,
                max_height,
                balls,
            )?;
            let outcome = run::run(&pace, &mut bridge, &mut scene, secs(seconds)?, |_, _, _| {});
            ("terrain", outcome)
        }
        Commands::Drag { seconds } => {
            scenario::ground(&mut bridge, &mut scene)?;
            let mesh = scenario::drop_box(&mut bridge, &mut scene, 2.0)?;
            let view = RenderView::default();
            let inverse = view.inverse_view_projection(16.0 / 9.0);
            let pointer = |x: f32| Ray::from_ndc(Vec2::new(x, 0.0), inverse);
            let mut session = DragSession::new();
            let (grab, release) = (60, 150);

            let outcome = run::run(&pace, &mut bridge, &mut scene, secs(seconds)?, |bridge, scene, step| {
                let action = if step == grab {
                    let position = scene.mesh(mesh).map(|m| m.position).unwrap_or_default();
                    session.begin(mesh, 0, position, pointer(0.0))
                } else if step > grab && step < release {
                    let t = (step - grab) as f32 / (release - grab) as f32;
                    session.drag(pointer(0.4 * t))
                } else if step == release {
                    session.end()
                } else {
                    Action::Noop
                };
                apply(bridge, action);
            });
            ("drag", outcome)
        }
    };

    if cli.json {
        let summary = RunSummary {
            scenario,
            outcome,
            physics: PhysicsInspector::summary(&bridge),
            bodies: PhysicsInspector::list_bodies(&bridge),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", DebugTextRenderer::new().render(&scene, &RenderView::default()));
        println!("{}", PhysicsInspector::summary(&bridge));
        println!("{}", outcome.timing);
        println!(
            "Loop: steps={} frames={} uploaded={}B",
            outcome.steps, outcome.frames, outcome.uploaded_bytes
        );
        for body in PhysicsInspector::list_bodies(&bridge) {
            println!("{body}");
        }
    }

    Ok(())
}

fn apply(bridge: &mut PhysicsBridge, action: Action) {
    match action {
        Action::MoveObject {
            mesh,
            instance,
            position,
        } => bridge.set_mesh_position(mesh, position, instance),
        Action::DragStarted { mesh, .. } => tracing::info!(%mesh, "camera controls paused"),
        Action::DragEnded => tracing::info!("camera controls resumed"),
        Action::Noop => {}
    }
}

fn secs(seconds: f32) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f32(seconds).with_context(|| format!("invalid duration {seconds}"))
}
