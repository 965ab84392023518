use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use photo_wall::config::{Configuration, SquaresPolicy};
use photo_wall::display::RaylibDisplay;
use photo_wall::engine::CycleEngine;
use photo_wall::layout::{self, CATALOG};
use photo_wall::library::ImageLibrary;
use photo_wall::slideshow;
use photo_wall::subject_detection::focus_provider;
use photo_wall::texture_loader::{CodecChain, load_sorted_image_paths};

#[derive(Debug, Parser)]
#[command(name = "photo-wall", about = "Animated photo mosaic slideshow")]
struct Cli {
    /// Directory containing the images to show
    image_directory: Option<PathBuf>,

    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// How long each layout is held, e.g. "3s" or "1m"
    #[arg(long, value_parser = humantime::parse_duration)]
    hold: Option<Duration>,

    /// Replace photos with color tiles: none, some or all
    #[arg(long, value_enum)]
    squares: Option<SquaresPolicy>,

    /// Palette for color tiles
    #[arg(long)]
    palette: Option<String>,

    /// Tile border width in pixels
    #[arg(long, value_name = "PIXELS")]
    border_width: Option<i32>,

    /// Animation speed for both entry and exit (higher is slower)
    #[arg(long)]
    speed: Option<f32>,

    /// Frames per second
    #[arg(long)]
    tick_rate: Option<u32>,

    /// Run in a window instead of fullscreen
    #[arg(long)]
    windowed: bool,

    /// Detect faces at startup and crop around them
    #[arg(long)]
    focus_detect: bool,

    /// Include images in sub-directories
    #[arg(short, long)]
    recursive: bool,

    /// Seed for reproducible layouts and colors
    #[arg(long)]
    seed: Option<u64>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn apply(self, cfg: &mut Configuration) {
        if let Some(dir) = self.image_directory {
            cfg.photo_library_path = dir;
        }
        if let Some(hold) = self.hold {
            cfg.hold = hold;
        }
        if let Some(squares) = self.squares {
            cfg.squares = squares;
        }
        if let Some(palette) = self.palette {
            cfg.palette = palette;
        }
        if let Some(border) = self.border_width {
            cfg.border_width = border;
        }
        if let Some(speed) = self.speed {
            cfg.entry_speed = speed;
            cfg.exit_speed = speed;
        }
        if let Some(tick_rate) = self.tick_rate {
            cfg.tick_rate = tick_rate;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        cfg.fullscreen &= !self.windowed;
        cfg.focus_detection |= self.focus_detect;
        cfg.recursive |= self.recursive;
    }
}

/// `RUST_LOG` when set, `warn,photo_wall=info` otherwise; `-v`/`-vv` then raise
/// this crate to DEBUG/TRACE on top of either.
fn log_filter(verbosity: u8, rust_log: Option<&str>) -> Result<EnvFilter> {
    let filter = match rust_log {
        Some(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives)?,
        _ => EnvFilter::new("warn,photo_wall=info"),
    };
    let level = match verbosity {
        0 => return Ok(filter),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    Ok(filter.add_directive(format!("photo_wall={level}").parse()?))
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(verbosity, rust_log.as_deref()).context("invalid RUST_LOG directives")?;
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = match &cli.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Configuration::default(),
    };
    cli.apply(&mut cfg);
    let cfg = cfg.validated().context("validating configuration")?;
    layout::validate_catalog(CATALOG).context("checking layout catalog")?;

    info!(path = %cfg.photo_library_path.display(), "loading images");
    let paths = load_sorted_image_paths(&cfg.photo_library_path, cfg.recursive)?;
    let mut focus = focus_provider(cfg.focus_detection, &cfg.focus_model);
    let library = ImageLibrary::scan(paths, focus.as_mut())?;
    drop(focus);

    let rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut engine = CycleEngine::new(
        CATALOG,
        cfg.palette_colors()?,
        library,
        CodecChain::default(),
        cfg.cycle_settings(),
        rng,
    )?;

    let mut display = RaylibDisplay::open(&cfg.display_options())?;
    let cycles = slideshow::run(&mut engine, &mut display)?;
    info!(cycles, "slideshow finished");
    Ok(())
}
