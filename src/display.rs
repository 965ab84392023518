use anyhow::{Result, anyhow, ensure};
use image::RgbaImage;
use raylib::prelude::*;
use tracing::{debug, info};

use crate::constants::*;
use crate::layout::PixelRect;
use crate::palette::Rgb;

/// Drawing operations available while composing one frame.
pub trait Surface {
    type Texture;

    fn draw_texture(&mut self, texture: &Self::Texture, x: i32, y: i32);
    fn fill_rect(&mut self, rect: PixelRect, color: Rgb);
    /// Unfilled rectangle whose `width`-pixel outline lies inside `rect`.
    fn stroke_rect(&mut self, rect: PixelRect, width: i32, color: Rgb);
}

/// The window the slideshow is presented in.
pub trait Display {
    type Texture;

    fn screen_size(&self) -> (i32, i32);

    /// Moves a fitted image to wherever the display draws from.
    fn upload(&mut self, image: &RgbaImage) -> Result<Self::Texture>;

    /// Clears to black, lets `draw` compose the frame, presents it and waits
    /// out the rest of the tick.
    fn present(&mut self, draw: impl FnOnce(&mut dyn Surface<Texture = Self::Texture>));

    /// Non-blocking check for a quit or escape request since the last frame.
    fn quit_requested(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub fullscreen: bool,
    /// `None` uses the monitor resolution.
    pub window_size: Option<(i32, i32)>,
    pub tick_rate: u32,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self { fullscreen: true, window_size: None, tick_rate: TICK_RATE }
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::new(rgb[0], rgb[1], rgb[2], 255)
}

impl Surface for RaylibDrawHandle<'_> {
    type Texture = Texture2D;

    fn draw_texture(&mut self, texture: &Texture2D, x: i32, y: i32) {
        RaylibDraw::draw_texture(self, texture, x, y, Color::WHITE);
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb) {
        RaylibDraw::draw_rectangle(self, rect.x, rect.y, rect.w, rect.h, to_color(color));
    }

    fn stroke_rect(&mut self, rect: PixelRect, width: i32, color: Rgb) {
        let bounds = Rectangle::new(rect.x as f32, rect.y as f32, rect.w as f32, rect.h as f32);
        RaylibDraw::draw_rectangle_lines_ex(self, bounds, width as f32, to_color(color));
    }
}

pub struct RaylibDisplay {
    rl: RaylibHandle,
    thread: RaylibThread,
    size: (i32, i32),
}

impl RaylibDisplay {
    pub fn open(options: &DisplayOptions) -> Result<Self> {
        // 0x0 asks raylib for the current monitor's resolution
        let (width, height) = options.window_size.unwrap_or((0, 0));

        let mut builder = raylib::init();
        builder.size(width, height).title(WINDOW_TITLE).vsync();
        if options.fullscreen {
            builder.fullscreen();
        }
        let (mut rl, thread) = builder.build();
        rl.set_trace_log(TraceLogLevel::LOG_ERROR);
        rl.set_target_fps(options.tick_rate);
        rl.hide_cursor();

        let size = (rl.get_screen_width(), rl.get_screen_height());
        ensure!(
            rl.is_window_ready() && size.0 > 0 && size.1 > 0,
            "display unavailable (reported {}x{})",
            size.0,
            size.1
        );
        info!(width = size.0, height = size.1, fullscreen = options.fullscreen, "display opened");

        Ok(Self { rl, thread, size })
    }
}

impl Display for RaylibDisplay {
    type Texture = Texture2D;

    fn screen_size(&self) -> (i32, i32) {
        self.size
    }

    fn upload(&mut self, image: &RgbaImage) -> Result<Texture2D> {
        let (width, height) = image.dimensions();
        // gen_image_color allocates R8G8B8A8, the same layout as RgbaImage
        let staging = Image::gen_image_color(width as i32, height as i32, Color::BLANK);
        let mut texture = self
            .rl
            .load_texture_from_image(&self.thread, &staging)
            .map_err(|e| anyhow!("failed to create {width}x{height} texture: {e}"))?;
        texture
            .update_texture(image.as_raw())
            .map_err(|e| anyhow!("failed to fill {width}x{height} texture: {e}"))?;
        debug!(width, height, "uploaded tile texture");
        Ok(texture)
    }

    fn present(&mut self, draw: impl FnOnce(&mut dyn Surface<Texture = Texture2D>)) {
        let mut d = self.rl.begin_drawing(&self.thread);
        d.clear_background(Color::BLACK);
        draw(&mut d);
    }

    fn quit_requested(&mut self) -> bool {
        self.rl.window_should_close() || self.rl.is_key_pressed(KeyboardKey::KEY_Q)
    }
}
