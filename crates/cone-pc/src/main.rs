//! Desktop host for the cone renderer.
//!
//! Drives the renderer on the software device for a fixed number of frames,
//! replays scripted orientation changes and optionally writes the last
//! frame as a PNG.

mod script;

use clap::{Parser, ValueEnum};
use cone_core::config::RendererConfig;
use cone_core::error::{ConfigError, RenderError};
use cone_core::{Backend, FixedFunctionBackend, Renderer, ShaderBackend};
use cone_hal::OrientationSource;
use cone_soft::{DeviceError, SoftwareDevice};
use script::{RotateEvent, ScriptedOrientation};
use std::path::PathBuf;
use std::process;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendKind {
    /// Matrix stack and client arrays
    Fixed,
    /// Linked program with Projection/Modelview uniforms
    Shader,
}

#[derive(Parser)]
#[command(name = "cone-pc")]
#[command(about = "Render the orientation-animated cone on the software device", long_about = None)]
#[command(version)]
struct Cli {
    /// Pipeline generation to render with
    #[arg(short, long, value_enum, default_value_t = BackendKind::Shader)]
    backend: BackendKind,

    /// Surface width in pixels
    #[arg(long, default_value = "320")]
    width: u32,

    /// Surface height in pixels
    #[arg(long, default_value = "480")]
    height: u32,

    /// Number of frames to render
    #[arg(short, long, default_value = "60")]
    frames: u32,

    /// Simulated frame rate; each frame advances the animation by 1/fps
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Orientation change as FRAME:ORIENTATION (repeatable)
    #[arg(short, long = "rotate", value_parser = script::parse_rotate)]
    rotate: Vec<RotateEvent>,

    /// Cone slices
    #[arg(long, default_value = "40")]
    slices: u32,

    /// Rotation animation length in seconds
    #[arg(long, default_value = "0.25")]
    duration: f32,

    /// Write the last frame to this PNG file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Suppress progress output (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, thiserror::Error)]
enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError<DeviceError>),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("--fps must be positive")]
    ZeroFps,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging (suppressed if --quiet)
    if !cli.quiet {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let result = match cli.backend {
        BackendKind::Fixed => run(FixedFunctionBackend::new(SoftwareDevice::new()), &cli),
        BackendKind::Shader => run(ShaderBackend::new(SoftwareDevice::new()), &cli),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run<B: Backend<Device = SoftwareDevice>>(backend: B, cli: &Cli) -> Result<(), HostError> {
    if cli.fps == 0 {
        return Err(HostError::ZeroFps);
    }

    let mut config = RendererConfig::default();
    config.cone.slices = cli.slices;
    config.animation.duration = cli.duration;

    let mut renderer = Renderer::new(backend, config)?;
    renderer.initialize(cli.width, cli.height)?;
    log::info!(
        "{} backend, {}x{}, {} frames at {} fps",
        renderer.backend().name(),
        cli.width,
        cli.height,
        cli.frames,
        cli.fps
    );

    let mut orientation = ScriptedOrientation::new(cli.rotate.clone());
    orientation.init();

    let dt = 1.0 / cli.fps as f32;
    for frame in 0..cli.frames {
        orientation.set_frame(frame);
        while let Some(o) = orientation.poll() {
            log::info!("frame {}: rotate to {}", frame, o.name());
            renderer.on_rotate(o);
        }

        renderer.update_animation(dt);
        renderer.render()?;

        let stats = renderer.backend().device().frame_stats();
        log::debug!(
            "frame {}: {} draws, {} triangles ({} culled), {} fragments, progress {:.2}",
            frame,
            stats.draw_calls,
            stats.triangles,
            stats.triangles_culled,
            stats.fragments,
            renderer.animation().progress()
        );
    }

    if orientation.remaining() > 0 {
        log::warn!(
            "{} rotate events scheduled after the last frame were ignored",
            orientation.remaining()
        );
    }

    if let Some(path) = &cli.output {
        renderer.backend().device().save_png(path)?;
        if !cli.quiet {
            eprintln!("Success: wrote {} ({}x{})", path.display(), cli.width, cli.height);
        }
    }
    Ok(())
}
