#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, anyhow};
use image::{Rgba, RgbaImage};
use rand::SeedableRng;
use rand::rngs::StdRng;

use photo_wall::config::SquaresPolicy;
use photo_wall::display::{Display, Surface};
use photo_wall::engine::{CycleEngine, CycleSettings};
use photo_wall::fit::FocusPoint;
use photo_wall::layout::{Layout, PixelRect};
use photo_wall::library::{ImageLibrary, LibraryEntry};
use photo_wall::palette::Rgb;
use photo_wall::tile::Motion;

/// Decodes from a fixed in-memory table; anything else fails.
#[derive(Default)]
pub struct MemoryDecoder {
    pub images: HashMap<PathBuf, RgbaImage>,
}

impl MemoryDecoder {
    pub fn with(mut self, path: &str, image: RgbaImage) -> Self {
        self.images.insert(PathBuf::from(path), image);
        self
    }
}

impl photo_wall::texture_loader::ImageDecoder for MemoryDecoder {
    fn decode(&self, path: &Path) -> Result<RgbaImage> {
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("cannot decode {}", path.display()))
    }
}

pub fn solid(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([120, 130, 140, 255]))
}

pub fn entry(path: &str, focus: Option<FocusPoint>) -> LibraryEntry {
    LibraryEntry { path: PathBuf::from(path), width: 0, height: 0, focus }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Texture { x: i32, y: i32, size: (u32, u32) },
    Fill { rect: PixelRect, color: Rgb },
    Stroke { rect: PixelRect, width: i32 },
}

#[derive(Default)]
pub struct RecordingSurface {
    pub ops: Vec<Op>,
}

impl Surface for RecordingSurface {
    type Texture = RgbaImage;

    fn draw_texture(&mut self, texture: &RgbaImage, x: i32, y: i32) {
        self.ops.push(Op::Texture { x, y, size: texture.dimensions() });
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb) {
        self.ops.push(Op::Fill { rect, color });
    }

    fn stroke_rect(&mut self, rect: PixelRect, width: i32, _color: Rgb) {
        self.ops.push(Op::Stroke { rect, width });
    }
}

type QuitCheck = Box<dyn FnMut(&[Op]) -> bool>;

/// Headless display: textures stay CPU images, frames are recorded.
pub struct FakeDisplay {
    pub size: (i32, i32),
    pub frames: usize,
    pub quit_after: Option<usize>,
    pub quit_when: Option<QuitCheck>,
    pub uploads: Vec<(u32, u32)>,
    pub last_frame: Vec<Op>,
}

impl FakeDisplay {
    pub fn new(size: (i32, i32)) -> Self {
        Self { size, frames: 0, quit_after: None, quit_when: None, uploads: Vec::new(), last_frame: Vec::new() }
    }

    pub fn quitting_after(mut self, frames: usize) -> Self {
        self.quit_after = Some(frames);
        self
    }

    /// Quits as soon as `check` accepts the frame just presented.
    pub fn quitting_when(mut self, check: impl FnMut(&[Op]) -> bool + 'static) -> Self {
        self.quit_when = Some(Box::new(check));
        self
    }
}

impl Display for FakeDisplay {
    type Texture = RgbaImage;

    fn screen_size(&self) -> (i32, i32) {
        self.size
    }

    fn upload(&mut self, image: &RgbaImage) -> Result<RgbaImage> {
        self.uploads.push(image.dimensions());
        Ok(image.clone())
    }

    fn present(&mut self, draw: impl FnOnce(&mut dyn Surface<Texture = RgbaImage>)) {
        let mut surface = RecordingSurface::default();
        draw(&mut surface);
        self.frames += 1;
        self.last_frame = surface.ops;
    }

    fn quit_requested(&mut self) -> bool {
        if let Some(check) = self.quit_when.as_mut() {
            if check(&self.last_frame) {
                return true;
            }
        }
        self.quit_after.is_some_and(|limit| self.frames >= limit)
    }
}

pub fn settings(policy: SquaresPolicy) -> CycleSettings {
    CycleSettings { policy, hold: Duration::ZERO, border_width: 10, motion: Motion::default() }
}

pub const PALETTE: &[Rgb] = &[[1, 1, 1], [2, 2, 2], [3, 3, 3]];

pub fn engine(
    catalog: &'static [Layout],
    entries: Vec<LibraryEntry>,
    decoder: MemoryDecoder,
    policy: SquaresPolicy,
    seed: u64,
) -> CycleEngine<MemoryDecoder> {
    engine_with(catalog, entries, decoder, settings(policy), seed)
}

pub fn engine_with(
    catalog: &'static [Layout],
    entries: Vec<LibraryEntry>,
    decoder: MemoryDecoder,
    settings: CycleSettings,
    seed: u64,
) -> CycleEngine<MemoryDecoder> {
    CycleEngine::new(
        catalog,
        PALETTE.to_vec(),
        ImageLibrary::new(entries),
        decoder,
        settings,
        StdRng::seed_from_u64(seed),
    )
    .unwrap()
}
