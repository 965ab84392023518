use anyhow::{Result, ensure};

/// Absorbs binary representation error in fractions such as 1/3 before flooring,
/// so `1/3 * 1920` resolves to 640 rather than 639.
const FLOOR_NUDGE: f64 = 1e-4;

/// One tile of a layout, as fractions of the screen width and height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSlot {
    pub position: (f32, f32),
    pub size: (f32, f32),
}

impl LayoutSlot {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { position: (x, y), size: (w, h) }
    }
}

/// An ordered set of slots shown together in one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub slots: &'static [LayoutSlot],
}

impl Layout {
    pub const fn new(slots: &'static [LayoutSlot]) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// A slot resolved against a concrete screen size, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }
}

const fn s(x: f32, y: f32, w: f32, h: f32) -> LayoutSlot {
    LayoutSlot::new(x, y, w, h)
}

/// Every arrangement the slideshow chooses from. The full-screen layout is listed
/// three times so single images come up more often than any one mosaic.
pub static CATALOG: &[Layout] = &[
    Layout { slots: &[s(0.0, 0.0, 1.0, 1.0)] },
    Layout { slots: &[s(0.0, 0.0, 1.0, 1.0)] },
    Layout { slots: &[s(0.0, 0.0, 1.0, 1.0)] },
    Layout { slots: &[s(0.0, 0.0, 0.4, 1.0), s(0.4, 0.0, 0.6, 0.5), s(0.4, 0.5, 0.6, 0.5)] },
    Layout { slots: &[s(0.0, 0.0, 0.6, 0.5), s(0.0, 0.5, 0.6, 0.5), s(0.6, 0.0, 0.4, 1.0)] },
    Layout { slots: &[
        s(0.0, 0.0, 0.5, 0.5),
        s(0.5, 0.0, 0.5, 0.5),
        s(0.0, 0.5, 0.5, 0.5),
        s(0.5, 0.5, 0.5, 0.5),
    ] },
    Layout { slots: &[
        s(0.0, 0.0, 0.4, 0.5),
        s(0.0, 0.5, 0.4, 0.5),
        s(0.4, 0.0, 0.3, 1.0),
        s(0.7, 0.0, 0.3, 1.0),
    ] },
    Layout { slots: &[
        s(0.0, 0.0, 0.3, 1.0),
        s(0.3, 0.0, 0.3, 1.0),
        s(0.6, 0.0, 0.4, 0.5),
        s(0.6, 0.5, 0.4, 0.5),
    ] },
    Layout { slots: &[s(0.0, 0.0, 0.333, 1.0), s(0.333, 0.0, 0.333, 1.0), s(0.666, 0.0, 0.333, 1.0)] },
    Layout { slots: &[
        s(0.0, 0.0, 0.3, 1.0),
        s(0.3, 0.0, 0.4, 0.5),
        s(0.3, 0.5, 0.4, 0.5),
        s(0.7, 0.0, 0.3, 1.0),
    ] },
    Layout { slots: &[
        s(0.0, 0.0, 0.3, 0.5),
        s(0.0, 0.5, 0.3, 0.5),
        s(0.3, 0.0, 0.4, 1.0),
        s(0.7, 0.0, 0.3, 0.5),
        s(0.7, 0.5, 0.3, 0.5),
    ] },
    Layout { slots: &[s(0.0, 0.0, 0.7, 1.0), s(0.7, 0.0, 0.3, 0.4), s(0.7, 0.4, 0.3, 0.6)] },
    Layout { slots: &[s(0.0, 0.0, 0.3, 0.6), s(0.0, 0.6, 0.3, 0.4), s(0.3, 0.0, 0.7, 1.0)] },
    Layout { slots: &[s(0.0, 0.0, 0.25, 1.0), s(0.25, 0.0, 0.5, 1.0), s(0.75, 0.0, 0.25, 1.0)] },
    Layout { slots: &[s(0.0, 0.0, 0.5, 0.5), s(0.0, 0.5, 0.5, 0.5), s(0.5, 0.0, 0.5, 1.0)] },
    Layout { slots: &[s(0.0, 0.0, 0.5, 1.0), s(0.5, 0.0, 0.5, 0.5), s(0.5, 0.5, 0.5, 0.5)] },
    Layout { slots: &[
        s(0.0, 0.0, 0.4, 0.333),
        s(0.0, 0.333, 0.4, 0.333),
        s(0.0, 0.666, 0.4, 0.333),
        s(0.4, 0.0, 0.6, 1.0),
    ] },
    Layout { slots: &[
        s(0.0, 0.0, 0.6, 1.0),
        s(0.6, 0.0, 0.4, 0.333),
        s(0.6, 0.333, 0.4, 0.333),
        s(0.6, 0.666, 0.4, 0.333),
    ] },
    Layout { slots: &[
        s(0.0, 0.0, 0.6, 0.6),
        s(0.0, 0.6, 0.3, 0.4),
        s(0.3, 0.6, 0.3, 0.4),
        s(0.6, 0.0, 0.4, 0.3),
        s(0.6, 0.3, 0.4, 0.7),
    ] },
];

/// Rounding mode for fraction → pixel conversion. Floor everywhere, so neighbouring
/// slots never overlap and any slack ends up on the right/bottom edge.
fn to_pixels(fraction: f32, extent: i32) -> i32 {
    (f64::from(fraction) * f64::from(extent) + FLOOR_NUDGE).floor() as i32
}

/// Resolves every slot of `layout` against a `screen_w` x `screen_h` screen.
pub fn resolve(layout: &Layout, screen_w: i32, screen_h: i32) -> Vec<PixelRect> {
    layout
        .slots
        .iter()
        .map(|slot| {
            PixelRect::new(
                to_pixels(slot.position.0, screen_w),
                to_pixels(slot.position.1, screen_h),
                to_pixels(slot.size.0, screen_w),
                to_pixels(slot.size.1, screen_h),
            )
        })
        .collect()
}

/// Catalog authoring check, run once at startup.
pub fn validate_catalog(catalog: &[Layout]) -> Result<()> {
    ensure!(!catalog.is_empty(), "layout catalog is empty");
    for (index, layout) in catalog.iter().enumerate() {
        ensure!(!layout.is_empty(), "layout {index} has no slots");
        for (slot_index, slot) in layout.slots.iter().enumerate() {
            let (x, y) = slot.position;
            let (w, h) = slot.size;
            let in_unit = |v: f32| (0.0..=1.0).contains(&v);
            ensure!(
                in_unit(x) && in_unit(y) && in_unit(w) && in_unit(h),
                "layout {index} slot {slot_index}: fractions must lie in [0, 1], got {slot:?}"
            );
            ensure!(
                w > 0.0 && h > 0.0,
                "layout {index} slot {slot_index}: size must be positive, got {slot:?}"
            );
            ensure!(
                x + w <= 1.0 + 1e-4 && y + h <= 1.0 + 1e-4,
                "layout {index} slot {slot_index}: extends past the screen edge, got {slot:?}"
            );
        }
    }
    Ok(())
}
