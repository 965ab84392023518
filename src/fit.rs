//! Cover-fit scaling with focus-aware cropping.
//!
//! The source is scaled so it covers the target on both axes, then a
//! target-sized window is cut out of it. Without a focus point the window is
//! centered; with one, the window is centered on the focus point and clamped so
//! it never leaves the scaled image.

use image::RgbaImage;
use image::imageops::{self, FilterType};

/// A point of interest in source-image pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusPoint {
    pub x: f32,
    pub y: f32,
}

impl FocusPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Where and how large the intermediate scaled image is, and which window of it
/// becomes the tile content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropPlan {
    pub scaled_w: u32,
    pub scaled_h: u32,
    pub crop_x: u32,
    pub crop_y: u32,
}

/// Computes the scaled size and crop origin for fitting `src_w` x `src_h` into
/// `target_w` x `target_h`.
///
/// Panics if any dimension is zero.
pub fn plan_crop(
    src_w: u32,
    src_h: u32,
    target_w: u32,
    target_h: u32,
    focus: Option<FocusPoint>,
) -> CropPlan {
    assert!(target_w > 0 && target_h > 0, "fit target must be non-empty, got {target_w}x{target_h}");
    assert!(src_w > 0 && src_h > 0, "fit source must be non-empty, got {src_w}x{src_h}");

    let (sw, sh) = (f64::from(src_w), f64::from(src_h));
    let (tw, th) = (f64::from(target_w), f64::from(target_h));
    let scale = (tw / sw).max(th / sh);

    // ceil() can land one short when the product rounds just below an integer.
    let scaled_w = ((sw * scale).ceil() as u32).max(target_w);
    let scaled_h = ((sh * scale).ceil() as u32).max(target_h);
    let max_x = scaled_w - target_w;
    let max_y = scaled_h - target_h;

    let (crop_x, crop_y) = match focus {
        None => (max_x / 2, max_y / 2),
        Some(point) => {
            let fx = f64::from(point.x) * scale - tw / 2.0;
            let fy = f64::from(point.y) * scale - th / 2.0;
            (clamp_origin(fx, max_x), clamp_origin(fy, max_y))
        }
    };

    CropPlan { scaled_w, scaled_h, crop_x, crop_y }
}

fn clamp_origin(value: f64, max: u32) -> u32 {
    if !value.is_finite() {
        return max / 2;
    }
    value.clamp(0.0, f64::from(max)).floor() as u32
}

/// Produces a buffer of exactly `target_w` x `target_h` from `source`.
pub fn fit(source: &RgbaImage, target_w: u32, target_h: u32, focus: Option<FocusPoint>) -> RgbaImage {
    let plan = plan_crop(source.width(), source.height(), target_w, target_h, focus);

    let scaled;
    let scaled_ref = if plan.scaled_w == source.width() && plan.scaled_h == source.height() {
        source
    } else {
        scaled = imageops::resize(source, plan.scaled_w, plan.scaled_h, FilterType::Triangle);
        &scaled
    };

    imageops::crop_imm(scaled_ref, plan.crop_x, plan.crop_y, target_w, target_h).to_image()
}
