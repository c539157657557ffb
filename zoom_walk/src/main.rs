//! zoom_walk — interactive entry point.

use clap::Parser;
use tracing::{error, info};

use zoom_walk::app::{run, AppConfig};
use zoom_walk::cues::CueSettings;
use zoom_walk::simulator::SimMode;

#[derive(Parser, Debug)]
#[command(name = "zoom_walk", about = "Body-tracked photo gallery simulator")]
struct Cli {
    /// Position-only simulator: no skeleton, no gestures, no blur
    #[arg(long)]
    direct: bool,

    /// Do not play light-switch cues over MIDI
    #[arg(long)]
    mute: bool,

    /// Frame rate cap
    #[arg(long, default_value_t = 60)]
    fps: u32,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zoom_walk=info,gallery_core=info".into()),
        )
        .init();

    let mode = if cli.direct { SimMode::Direct } else { SimMode::Skeleton };
    info!(mode = mode.as_str(), fps = cli.fps, muted = cli.mute, "zoom_walk v{} starting", env!("CARGO_PKG_VERSION"));

    let cfg = AppConfig {
        mode,
        cues: CueSettings { muted: cli.mute, ..CueSettings::default() },
        fps: cli.fps.clamp(10, 240),
        ..AppConfig::default()
    };

    if let Err(e) = run(cfg) {
        error!("{e}");
        std::process::exit(1);
    }
}
