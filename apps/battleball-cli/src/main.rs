mod headless;

use std::time::Duration;

use anyhow::Context;
use battleball_geometry::generate_sphere;
use battleball_render::{
    BoundedTicker, FrameScheduler, IntervalTicker, RenderConfig, SchedulerState,
};
use battleball_transform::{Mat4, transformation_matrix};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::headless::HeadlessScene;

#[derive(Parser)]
#[command(name = "battleball-cli", about = "Headless battleball render tools")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and render defaults
    Info,
    /// Generate a sphere mesh and print its layout
    Mesh {
        #[arg(short, long, default_value = "0.5")]
        radius: f32,
        #[arg(short, long, default_value = "20")]
        segments: u32,
        /// Number of vertices to print
        #[arg(long, default_value = "4")]
        show: usize,
    },
    /// Print the combined transform for an aspect ratio and rotation
    Matrix {
        #[arg(short, long, default_value = "0.5625")]
        aspect: f32,
        #[arg(short, long, default_value = "0.0")]
        rotation: f32,
    },
    /// Drive the frame scheduler against a headless scene
    Simulate {
        /// Frames to run
        #[arg(short, long, default_value = "120")]
        frames: u64,
        /// Tick rate; 0 runs frames back to back
        #[arg(long, default_value = "0")]
        fps: u32,
        /// Fail every Nth frame
        #[arg(long)]
        fail_every: Option<u64>,
        /// Consecutive failures before halting (0 = never)
        #[arg(long, default_value = "120")]
        max_failures: u32,
        /// Surface aspect ratio (width / height)
        #[arg(short, long, default_value = "0.5625")]
        aspect: f32,
    },
}

fn print_matrix(m: &Mat4) {
    for row in m.chunks(4) {
        println!("  [{:>9.4} {:>9.4} {:>9.4} {:>9.4}]", row[0], row[1], row[2], row[3]);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let config = RenderConfig::default();
            println!("battleball-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "sphere: radius={} segments={} vertices={} indices={}",
                config.sphere.radius,
                config.sphere.segments,
                config.sphere.vertex_count(),
                config.sphere.index_count()
            );
            println!("clear color: {:?}", config.clear_color);
            println!("max consecutive failures: {}", config.max_consecutive_failures);
        }
        Commands::Mesh {
            radius,
            segments,
            show,
        } => {
            let mesh = generate_sphere(radius, segments)
                .with_context(|| format!("radius={radius} segments={segments}"))?;
            tracing::debug!(radius, segments, "sphere generated");
            println!(
                "vertices={} indices={} triangles={}",
                mesh.vertex_count(),
                mesh.index_count(),
                mesh.triangle_count()
            );
            println!(
                "vertex bytes={} index bytes={}",
                mesh.vertex_bytes().len(),
                mesh.index_bytes().len()
            );
            for i in 0..show {
                let (Some(pos), Some(color)) = (mesh.position(i), mesh.color(i)) else {
                    break;
                };
                println!("  v{i}: pos={pos:?} color={color:?}");
            }
        }
        Commands::Matrix { aspect, rotation } => {
            let m = transformation_matrix(aspect, rotation)?;
            println!("transform (row-major), aspect={aspect} rotation={rotation}:");
            print_matrix(&m);
        }
        Commands::Simulate {
            frames,
            fps,
            fail_every,
            max_failures,
            aspect,
        } => {
            let frame_time = if fps > 0 {
                Duration::from_secs_f64(1.0 / f64::from(fps))
            } else {
                Duration::from_millis(16)
            };
            tracing::info!(frames, fps, ?fail_every, max_failures, "starting headless simulation");
            let scene = HeadlessScene::new(aspect, frame_time, fail_every);
            let mut scheduler = FrameScheduler::new(scene, max_failures);
            scheduler.start();

            let ticks = if fps > 0 {
                scheduler.run(&mut IntervalTicker::new(frame_time, Some(frames)))
            } else {
                scheduler.run(&mut BoundedTicker::new(frames))
            };

            let stats = scheduler.stats();
            if scheduler.state() == SchedulerState::Failed {
                tracing::warn!(
                    failures = stats.failures,
                    consecutive = stats.consecutive_failures,
                    "simulation halted by the failure limit"
                );
            } else {
                tracing::info!(frames = stats.frames, failures = stats.failures, "simulation finished");
            }
            println!("ticks={ticks} state={:?}", scheduler.state());
            println!(
                "frames={} failures={} consecutive={}",
                stats.frames, stats.failures, stats.consecutive_failures
            );
            println!(
                "frame time avg={:?} max={:?}",
                stats.average_frame_time, stats.max_frame_time
            );
            if let Some(err) = scheduler.last_error() {
                println!("last error: {err}");
            }
            if let Some(scene) = scheduler.renderer() {
                println!("final rotation={:.4}", scene.rotation());
                print_matrix(scene.last_transform());
            }
        }
    }

    Ok(())
}
