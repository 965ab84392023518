use std::time::Duration;

pub const TICK_RATE: u32 = 30;                            // Simulation ticks (and presented frames) per second
pub const FRAME_TIME: f32 = 1.0 / TICK_RATE as f32;       // Reference tick length (seconds)

pub const HOLD_DURATION: Duration = Duration::from_secs(3); // Time a composed layout stays on screen
pub const ANIMATION_SPEED: f32 = 15.0;                    // Easing divisor: ticks to close 1/e of the remaining distance (roughly)
pub const BORDER_WIDTH: i32 = 10;                         // Black frame drawn around every tile (pixels)
pub const DEFAULT_PALETTE: &str = "Mondrian";

pub const ENTRY_SPEED_VARIANCE: (f32, f32) = (0.8, 1.2);  // Per-tile speed factor range while entering
pub const EXIT_SPEED_VARIANCE: (f32, f32) = (0.8, 1.1);   // Per-tile speed factor range while exiting
pub const SETTLE_THRESHOLD: f32 = 1.0;                    // Snap to target once closer than this on both axes (pixels)
pub const MAX_ANIMATION_FRAMES: u32 = 600;                // Floor of the per-phase tick cap before a tile is forced onto its target

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];
pub const DEFAULT_FOCUS_MODEL: &str = "yolo/v8-head-fp16.onnx";
pub const WINDOW_TITLE: &str = "Photo Wall Slideshow";
