use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use particle_globe::headless::HeadlessRunner;
use particle_globe::mask::CosmicRasterizer;
use particle_globe::projection::Viewport;
use particle_globe::raster::PixelCanvas;
use particle_globe::session::{
    Completion, HandoffNavigator, LogNavigator, Navigator, StoreLocation,
};
use particle_globe::time::{ManualClock, SystemClock};
use particle_globe::window::IntroApp;
use particle_globe::{IntroConfig, IntroError, Scheduler, Simulation};

#[derive(Parser)]
#[command(name = "particle-globe", about = "Spinning particle globe intro")]
struct Args {
    /// TOML config file. Missing fields take defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Session file holding the ready flag. Defaults to the runtime dir for
    /// windowed runs and to memory for headless ones.
    #[arg(long)]
    session: Option<PathBuf>,

    /// Keep the ready flag in memory only.
    #[arg(long, conflicts_with = "session")]
    ephemeral: bool,

    /// Play the intro even if the ready flag is already set.
    #[arg(long)]
    replay: bool,

    /// Run without a window and write the last drawn frame to this PNG.
    #[arg(long, value_name = "PNG")]
    headless: Option<PathBuf>,

    /// Logical viewport width.
    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    /// Logical viewport height.
    #[arg(long, default_value_t = 720.0)]
    height: f32,

    /// Device pixel ratio for headless output.
    #[arg(long, default_value_t = 1.0)]
    dpr: f32,

    /// Frame rate for headless runs.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Log filter, e.g. `debug` or `particle_globe=trace`. Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = match &args.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| "particle_globe=info".into()),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), IntroError> {
    let config = match &args.config {
        Some(path) => IntroConfig::load(path)?,
        None => IntroConfig::default(),
    };

    let store =
        StoreLocation::resolve(args.session.clone(), args.ephemeral, args.headless.is_some())
            .open();
    let handoff = HandoffNavigator::new();
    let navigator: Box<dyn Navigator> = if args.headless.is_some() {
        Box::new(LogNavigator)
    } else {
        Box::new(handoff.clone())
    };
    let mut completion = Completion::new(&config.session, store, navigator);

    if completion.already_loaded() && !args.replay {
        info!("intro already played this session, skipping");
        completion.skip();
        report_handoff(&handoff);
        return Ok(());
    }

    let viewport = Viewport::new(args.width, args.height);
    let limit = Duration::try_from_secs_f64(
        (config.timeline.spin_duration + config.timeline.explosion_duration) * 2.0 + 5.0,
    )
    .unwrap_or(Duration::MAX);
    let simulation = Simulation::new(config, viewport, Box::new(CosmicRasterizer::new()));

    match args.headless {
        Some(png) => {
            let clock = ManualClock::new();
            let scheduler = Scheduler::new(simulation, clock.clone(), completion);
            let canvas = PixelCanvas::new(viewport, args.dpr);
            let mut runner = HeadlessRunner::new(scheduler, clock, canvas, args.fps);
            runner.run(limit);
            runner.canvas().save_png(&png)?;
            info!("wrote {}", png.display());
        }
        None => {
            let scheduler = Scheduler::new(simulation, SystemClock, completion);
            IntroApp::new(scheduler, "Loading").run()?;
            report_handoff(&handoff);
        }
    }
    Ok(())
}

fn report_handoff(handoff: &HandoffNavigator) {
    if let Some(target) = handoff.target() {
        println!("{target}");
    }
}
