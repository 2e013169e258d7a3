mod console;
mod settings;

use std::io;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use playdeck_core::display::domain::frame_sink::{FrameSink, NullFrameSink};
use playdeck_core::display::infrastructure::snapshot_frame_sink::SnapshotFrameSink;
use playdeck_core::playback::playback_controller::PlaybackController;
use playdeck_core::service::player_service::PlayerService;

use settings::Settings;

/// Plays a local video under remote control, one command per line on stdin.
#[derive(Parser)]
#[command(name = "playdeck")]
struct Cli {
    /// Video file to load at startup.
    video: Option<PathBuf>,

    /// Config file (default: <config dir>/playdeck/config.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial playback speed: 0.5, 1, 2 or 4.
    #[arg(long)]
    speed: Option<f64>,

    /// Image file the display keeps the current frame in.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Discard frames instead of displaying them.
    #[arg(long)]
    no_display: bool,

    /// Start playing the startup video right away.
    #[arg(long, requires = "video")]
    autoplay: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    let sink = build_sink(&cli, &settings);
    let service = PlayerService::new(PlaybackController::with_ffmpeg(sink));
    service.set_speed(cli.speed.unwrap_or(settings.default_speed))?;

    if let Some(video) = &cli.video {
        let loaded = service.load(video)?;
        log::info!("{}", loaded.message);
        if cli.autoplay {
            service.play(None)?;
        }
    }

    console::run_console(&service, io::stdin().lock(), io::stdout().lock())?;
    service.shutdown();
    Ok(())
}

fn build_sink(cli: &Cli, settings: &Settings) -> Arc<dyn FrameSink> {
    if cli.no_display || !settings.display.enabled {
        log::info!("Display disabled");
        return Arc::new(NullFrameSink);
    }
    let path = cli
        .snapshot
        .clone()
        .unwrap_or_else(|| settings.display.resolved_snapshot_path());
    log::info!("Displaying frames to {}", path.display());
    Arc::new(SnapshotFrameSink::spawn(path))
}
