use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use clap::ValueEnum;
use serde::Deserialize;

use crate::constants::*;
use crate::display::DisplayOptions;
use crate::engine::CycleSettings;
use crate::palette::{self, Rgb};
use crate::tile::Motion;

/// How many slots of a cycle become solid color tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SquaresPolicy {
    /// Photos only.
    None,
    /// A random number of slots, always leaving at least one photo.
    #[default]
    Some,
    /// Color tiles only.
    All,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Directory scanned for images.
    pub photo_library_path: PathBuf,
    /// Also scan sub-directories.
    pub recursive: bool,
    /// Time a composed layout stays still before leaving.
    #[serde(with = "humantime_serde")]
    pub hold: Duration,
    pub squares: SquaresPolicy,
    /// Name of the palette color tiles draw from.
    pub palette: String,
    /// Additional named palettes; a name shared with a built-in one replaces it.
    pub palettes: BTreeMap<String, Vec<Rgb>>,
    pub border_width: i32,
    pub entry_speed: f32,
    pub exit_speed: f32,
    pub tick_rate: u32,
    pub fullscreen: bool,
    /// Window size in pixels; the monitor resolution when unset.
    pub window_size: Option<[i32; 2]>,
    /// Detect faces at startup and crop around them.
    pub focus_detection: bool,
    pub focus_model: PathBuf,
    /// Seed for layout, image and color choices. Random when unset.
    pub seed: Option<u64>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            photo_library_path: PathBuf::from("Images"),
            recursive: false,
            hold: HOLD_DURATION,
            squares: SquaresPolicy::default(),
            palette: DEFAULT_PALETTE.to_string(),
            palettes: BTreeMap::new(),
            border_width: BORDER_WIDTH,
            entry_speed: ANIMATION_SPEED,
            exit_speed: ANIMATION_SPEED,
            tick_rate: TICK_RATE,
            fullscreen: true,
            window_size: None,
            focus_detection: false,
            focus_model: PathBuf::from(DEFAULT_FOCUS_MODEL),
            seed: None,
        }
    }
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Ok(serde_yaml::from_str(&s)?)
    }

    pub fn validated(self) -> Result<Self> {
        ensure!(
            !self.photo_library_path.as_os_str().is_empty(),
            "photo-library-path must not be empty"
        );
        ensure!(self.tick_rate > 0, "tick-rate must be greater than zero");
        for (name, speed) in [("entry-speed", self.entry_speed), ("exit-speed", self.exit_speed)] {
            ensure!(speed.is_finite() && speed >= 1.0, "{name} must be a finite number >= 1, got {speed}");
        }
        ensure!(self.border_width >= 0, "border-width must not be negative");
        if let Some([w, h]) = self.window_size {
            ensure!(w > 0 && h > 0, "window-size must be positive, got {w}x{h}");
        }
        self.palette_colors().context("invalid palette selection")?;
        Ok(self)
    }

    pub fn palette_colors(&self) -> Result<Vec<Rgb>> {
        palette::lookup(&self.palette, &self.palettes)
    }

    pub fn frame_time(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    pub fn motion(&self) -> Motion {
        Motion {
            entry_speed: self.entry_speed,
            exit_speed: self.exit_speed,
            frame_time: self.frame_time(),
            max_frames: MAX_ANIMATION_FRAMES,
        }
    }

    pub fn cycle_settings(&self) -> CycleSettings {
        CycleSettings {
            policy: self.squares,
            hold: self.hold,
            border_width: self.border_width,
            motion: self.motion(),
        }
    }

    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            fullscreen: self.fullscreen,
            window_size: self.window_size.map(|[w, h]| (w, h)),
            tick_rate: self.tick_rate,
        }
    }
}
