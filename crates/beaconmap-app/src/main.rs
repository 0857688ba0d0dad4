//! beaconmap command line host
//!
//! Loads one session through the core pipeline and writes the drawn map as a
//! GeoJSON feature collection.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use beaconmap_core::demo::DemoSession;
use beaconmap_core::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "beaconmap", version, about = "Beacon GPS telemetry map renderer")]
struct Cli {
    /// Config file (JSON); defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a session and write the map as GeoJSON
    Render(RenderArgs),
    /// Write a synthetic session file
    Demo(DemoArgs),
    /// List session files in the sessions directory
    List {
        /// Sessions directory (overrides the config)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Write the default config to a file
    InitConfig {
        /// Destination file
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Session file name
    name: String,

    /// Read sessions from this directory
    #[arg(long, conflicts_with = "url")]
    dir: Option<PathBuf>,

    /// Fetch sessions from this endpoint (`?filename=<NAME>` is appended)
    #[arg(long)]
    url: Option<String>,

    /// Lower intensity threshold
    #[arg(long)]
    low: Option<f64>,

    /// Upper intensity threshold
    #[arg(long)]
    high: Option<f64>,

    /// Hide a beacon (repeatable)
    #[arg(long = "hide", value_name = "ID")]
    hidden: Vec<String>,

    /// Invert the beacon selection after applying --hide
    #[arg(long)]
    invert: bool,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// Destination file
    path: PathBuf,

    /// Number of beacons
    #[arg(long, default_value_t = 3)]
    beacons: usize,

    /// Samples per beacon
    #[arg(long, default_value_t = 500)]
    samples: usize,

    /// Random seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => MapConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MapConfig::default(),
    };

    match cli.command {
        Command::Render(args) => render(config, args).await,
        Command::Demo(args) => demo(args),
        Command::List { dir } => list(&config, dir),
        Command::InitConfig { path } => {
            config
                .save(&path)
                .with_context(|| format!("writing config {}", path.display()))?;
            info!(path = %path.display(), "config written");
            Ok(())
        }
    }
}

async fn render(config: MapConfig, args: RenderArgs) -> Result<()> {
    if let Some(url) = args.url.clone() {
        return render_from(config, HttpSource::new(url), args).await;
    }
    let dir = args.dir.clone().unwrap_or_else(|| config.sessions_dir());
    render_from(config, DirectorySource::new(dir), args).await
}

async fn render_from<S: SessionSource>(
    config: MapConfig,
    source: S,
    args: RenderArgs,
) -> Result<()> {
    let mut controller = MapController::new(config, source, GeoJsonSurface::new());

    // Thresholds are applied before loading so the first draw uses them
    let current = controller.thresholds();
    let thresholds = Thresholds::new(
        args.low.unwrap_or(current.low()),
        args.high.unwrap_or(current.high()),
    )?;
    controller.set_thresholds(thresholds);

    let state = controller
        .load(&args.name)
        .await
        .with_context(|| format!("loading session {}", args.name))?;
    if !matches!(state, LoadState::Finalized { .. }) {
        bail!("session {} was not loaded", args.name);
    }

    for id in &args.hidden {
        if let Err(e) = controller.set_visible(id, false) {
            warn!("{e}");
        }
    }
    if args.invert {
        controller.invert_selection();
    }

    if let Some(status) = controller.surface().status() {
        info!("{status}");
    }

    let document = serde_json::to_string_pretty(&controller.surface().to_feature_collection())?;
    match &args.output {
        Some(path) => fs::write(path, document)
            .with_context(|| format!("writing {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn demo(args: DemoArgs) -> Result<()> {
    let text = DemoSession::new(args.seed)
        .beacons(args.beacons)
        .samples_per_beacon(args.samples)
        .generate();
    fs::write(&args.path, text).with_context(|| format!("writing {}", args.path.display()))?;
    info!(
        path = %args.path.display(),
        beacons = args.beacons,
        samples = args.samples,
        "demo session written"
    );
    Ok(())
}

fn list(config: &MapConfig, dir: Option<PathBuf>) -> Result<()> {
    let source = DirectorySource::new(dir.unwrap_or_else(|| config.sessions_dir()));
    let names = source
        .list()
        .with_context(|| format!("listing {}", source.root().display()))?;
    let mut stdout = io::stdout().lock();
    for name in names {
        writeln!(stdout, "{name}")?;
    }
    Ok(())
}
