use std::time::{Duration, Instant};

use anyhow::{Result, ensure};
use image::RgbaImage;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::index;
use tracing::{debug, trace, warn};

use crate::config::SquaresPolicy;
use crate::display::{Display, Surface};
use crate::fit::fit;
use crate::layout::{self, Layout};
use crate::library::{ImageLibrary, LibraryEntry};
use crate::palette::Rgb;
use crate::state::{CycleOutcome, CyclePhase};
use crate::texture_loader::ImageDecoder;
use crate::tile::{Motion, Tile, TileContent};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSettings {
    pub policy: SquaresPolicy,
    pub hold: Duration,
    pub border_width: i32,
    pub motion: Motion,
}

/// Number of slots in a `slots`-slot layout that become color tiles.
pub fn replacement_count<R: Rng + ?Sized>(policy: SquaresPolicy, slots: usize, rng: &mut R) -> usize {
    match policy {
        SquaresPolicy::None => 0,
        SquaresPolicy::Some if slots == 0 => 0,
        SquaresPolicy::Some => rng.random_range(0..slots),
        SquaresPolicy::All => slots,
    }
}

/// Runs one layout at a time: build, slide in, hold, slide out.
pub struct CycleEngine<D: ImageDecoder> {
    catalog: &'static [Layout],
    palette: Vec<Rgb>,
    library: ImageLibrary,
    decoder: D,
    settings: CycleSettings,
    rng: StdRng,
    phase: CyclePhase,
}

impl<D: ImageDecoder> CycleEngine<D> {
    pub fn new(
        catalog: &'static [Layout],
        palette: Vec<Rgb>,
        library: ImageLibrary,
        decoder: D,
        settings: CycleSettings,
        rng: StdRng,
    ) -> Result<Self> {
        ensure!(!catalog.is_empty(), "layout catalog is empty");
        ensure!(!palette.is_empty(), "color palette is empty");
        ensure!(!library.is_empty(), "image library is empty");
        Ok(Self {
            catalog,
            palette,
            library,
            decoder,
            settings,
            rng,
            phase: CyclePhase::Complete,
        })
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn library(&self) -> &ImageLibrary {
        &self.library
    }

    fn random_color(&mut self) -> Rgb {
        self.palette[self.rng.random_range(0..self.palette.len())]
    }

    /// Picks a layout and fills its slots with fitted images or color tiles,
    /// every tile positioned off-screen and ready to enter.
    pub fn build_tiles(&mut self, screen: (i32, i32)) -> Vec<Tile<RgbaImage>> {
        let layout_index = self.rng.random_range(0..self.catalog.len());
        let rects: Vec<_> = layout::resolve(&self.catalog[layout_index], screen.0, screen.1)
            .into_iter()
            .filter(|r| r.w > 0 && r.h > 0)
            .collect();
        let slots = rects.len();

        // Slots the library cannot cover with distinct images become color tiles too.
        let shortfall = slots.saturating_sub(self.library.len());
        let fills = replacement_count(self.settings.policy, slots, &mut self.rng).max(shortfall);
        let fill_slots = index::sample(&mut self.rng, slots, fills).into_vec();
        let mut images = self.library.draw(slots - fills, &mut self.rng);

        let mut tiles = Vec::with_capacity(slots);
        for (slot, rect) in rects.into_iter().enumerate() {
            let content = if fill_slots.contains(&slot) {
                TileContent::Fill(self.random_color())
            } else {
                match images.pop().map(|entry| self.load(&entry, rect.w as u32, rect.h as u32)) {
                    Some(Some(fitted)) => TileContent::Image(fitted),
                    _ => TileContent::Fill(self.random_color()),
                }
            };
            tiles.push(Tile::new(content, rect, screen, self.settings.motion, &mut self.rng));
        }

        debug!(
            layout = layout_index,
            slots,
            fills = tiles.iter().filter(|t| t.is_fill()).count(),
            "cycle built"
        );
        tiles
    }

    fn load(&mut self, entry: &LibraryEntry, width: u32, height: u32) -> Option<RgbaImage> {
        match self.decoder.decode(&entry.path) {
            Ok(decoded) => Some(fit(&decoded, width, height, entry.focus)),
            Err(e) => {
                warn!(path = %entry.path.display(), "decode failed: {e:#}");
                self.library.exclude(&entry.path);
                None
            }
        }
    }

    fn enter(&mut self, phase: CyclePhase) {
        trace!(from = ?self.phase, to = ?phase, "cycle phase");
        self.phase = phase;
    }

    /// Runs one full cycle on `display`.
    pub fn run_cycle<S: Display>(&mut self, display: &mut S) -> Result<CycleOutcome> {
        self.enter(CyclePhase::BuildTiles);
        let screen = display.screen_size();
        let mut tiles = self
            .build_tiles(screen)
            .into_iter()
            .map(|tile| tile.map_content(|image| display.upload(&image)))
            .collect::<Result<Vec<_>>>()?;

        self.enter(CyclePhase::AnimateEnter);
        if self.animate(display, &mut tiles) == CycleOutcome::QuitRequested {
            return Ok(CycleOutcome::QuitRequested);
        }

        self.enter(CyclePhase::Hold);
        let border = self.settings.border_width;
        let started = Instant::now();
        while started.elapsed() < self.settings.hold {
            display.present(|surface| draw_all(&tiles, surface, border));
            if display.quit_requested() {
                return Ok(CycleOutcome::QuitRequested);
            }
        }

        for tile in tiles.iter_mut() {
            tile.begin_exit(&mut self.rng);
        }
        self.enter(CyclePhase::AnimateExit);
        if self.animate(display, &mut tiles) == CycleOutcome::QuitRequested {
            return Ok(CycleOutcome::QuitRequested);
        }

        self.enter(CyclePhase::Complete);
        Ok(CycleOutcome::Completed)
    }

    /// Steps every tile one tick per frame until all of them are done.
    fn animate<S: Display>(&self, display: &mut S, tiles: &mut [Tile<S::Texture>]) -> CycleOutcome {
        let dt = self.settings.motion.frame_time;
        let border = self.settings.border_width;

        while !tiles.iter().all(|tile| tile.done) {
            display.present(|surface| {
                for tile in tiles.iter_mut() {
                    tile.update(dt);
                    tile.render(surface, border);
                }
            });
            if display.quit_requested() {
                return CycleOutcome::QuitRequested;
            }
        }
        CycleOutcome::Completed
    }
}

fn draw_all<T>(tiles: &[Tile<T>], surface: &mut dyn Surface<Texture = T>, border: i32) {
    for tile in tiles {
        tile.render(surface, border);
    }
}
