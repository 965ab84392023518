use rand::Rng;
use raylib::prelude::Vector2;
use tracing::warn;

use crate::constants::*;
use crate::display::Surface;
use crate::layout::PixelRect;
use crate::palette::Rgb;
use crate::state::TilePhase;

const BORDER_COLOR: Rgb = [0, 0, 0];

/// What a tile shows. `T` is the image handle: a CPU buffer while the cycle is
/// being built, a GPU texture once uploaded.
#[derive(Debug, Clone, PartialEq)]
pub enum TileContent<T> {
    Image(T),
    Fill(Rgb),
}

/// Motion constants shared by every tile of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub entry_speed: f32,
    pub exit_speed: f32,
    pub frame_time: f32,
    /// Frame cap for a phase whose convergence time cannot be estimated, and the
    /// lower bound of every phase's cap otherwise.
    pub max_frames: u32,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            entry_speed: ANIMATION_SPEED,
            exit_speed: ANIMATION_SPEED,
            frame_time: FRAME_TIME,
            max_frames: MAX_ANIMATION_FRAMES,
        }
    }
}

/// Screen edge a tile enters from or leaves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.random_range(0..4) {
            0 => Edge::Left,
            1 => Edge::Right,
            2 => Edge::Top,
            _ => Edge::Bottom,
        }
    }

    /// A point one full screen beyond this edge, keeping `anchor`'s other coordinate.
    pub fn off_screen(self, anchor: Vector2, screen: (i32, i32)) -> Vector2 {
        let (w, h) = (screen.0 as f32, screen.1 as f32);
        match self {
            Edge::Left => Vector2::new(-w, anchor.y),
            Edge::Right => Vector2::new(w, anchor.y),
            Edge::Top => Vector2::new(anchor.x, -h),
            Edge::Bottom => Vector2::new(anchor.x, h),
        }
    }
}

pub struct Tile<T> {
    content: TileContent<T>,
    rect: PixelRect,
    screen: (i32, i32),
    motion: Motion,

    position: Vector2,
    target: Vector2,
    speed_factor: f32,

    pub phase: TilePhase,
    pub done: bool,
    frames: u32,
    budget: u32,
}

impl<T> Tile<T> {
    /// Creates an entering tile that starts just past a random screen edge.
    pub fn new<R: Rng + ?Sized>(
        content: TileContent<T>,
        rect: PixelRect,
        screen: (i32, i32),
        motion: Motion,
        rng: &mut R,
    ) -> Self {
        let target = Vector2::new(rect.x as f32, rect.y as f32);
        let speed_factor = rng.random_range(ENTRY_SPEED_VARIANCE.0..=ENTRY_SPEED_VARIANCE.1);
        let position = Edge::random(rng).off_screen(target, screen);

        Self {
            content,
            rect,
            screen,
            motion,
            position,
            target,
            speed_factor,
            phase: TilePhase::Entering,
            done: false,
            frames: 0,
            budget: motion.max_frames,
        }
    }

    /// Aims the tile at a random off-screen point, measured from where it is now.
    pub fn begin_exit<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.speed_factor = rng.random_range(EXIT_SPEED_VARIANCE.0..=EXIT_SPEED_VARIANCE.1);
        self.target = Edge::random(rng).off_screen(self.position, self.screen);
        self.phase = TilePhase::Exiting;
        self.done = false;
        self.frames = 0;
    }

    /// Advances the tile by `dt` seconds.
    ///
    /// Each reference tick closes `1 / (speed * speed_factor)` of the remaining
    /// distance; other `dt` values are scaled to the same decay curve.
    pub fn update(&mut self, dt: f32) {
        if self.done {
            return;
        }
        self.frames += 1;

        let base = match self.phase {
            TilePhase::Exiting | TilePhase::Retired => self.motion.exit_speed,
            _ => self.motion.entry_speed,
        };
        let divisor = base * self.speed_factor;
        let keep = (1.0 - 1.0 / divisor).clamp(0.0, 1.0).powf(dt / self.motion.frame_time);
        if self.frames == 1 {
            self.budget = self.frame_budget(keep);
        }

        self.position.x = self.target.x + (self.position.x - self.target.x) * keep;
        self.position.y = self.target.y + (self.position.y - self.target.y) * keep;

        let dx = (self.target.x - self.position.x).abs();
        let dy = (self.target.y - self.position.y).abs();
        if dx < SETTLE_THRESHOLD && dy < SETTLE_THRESHOLD {
            self.settle();
        } else if !(dx.is_finite() && dy.is_finite()) || self.frames >= self.budget {
            warn!(
                phase = ?self.phase,
                frames = self.frames,
                budget = self.budget,
                x = self.position.x,
                y = self.position.y,
                "tile failed to converge, snapping to target"
            );
            self.settle();
        }
    }

    /// Twice the ticks the easing needs to close the current distance, never
    /// below `motion.max_frames`. Falls back to that floor when the estimate is
    /// not finite (a stalled `keep` of 1, or a non-finite position).
    fn frame_budget(&self, keep: f32) -> u32 {
        let floor = self.motion.max_frames;
        let distance = (self.target.x - self.position.x).abs().max((self.target.y - self.position.y).abs());
        if distance < SETTLE_THRESHOLD || keep <= 0.0 {
            return floor;
        }
        let needed = (distance / SETTLE_THRESHOLD).ln() / -keep.ln();
        if !needed.is_finite() {
            return floor;
        }
        (((needed.ceil() + 1.0) * 2.0) as u32).max(floor)
    }

    fn settle(&mut self) {
        self.position = self.target;
        self.done = true;
        self.phase = match self.phase {
            TilePhase::Entering | TilePhase::Settled => TilePhase::Settled,
            TilePhase::Exiting | TilePhase::Retired => TilePhase::Retired,
        };
    }

    /// Draws the content at the truncated current position, then the border.
    pub fn render<S>(&self, surface: &mut S, border_width: i32)
    where
        S: Surface<Texture = T> + ?Sized,
    {
        let bounds = self.bounds();
        match &self.content {
            TileContent::Image(texture) => surface.draw_texture(texture, bounds.x, bounds.y),
            TileContent::Fill(color) => surface.fill_rect(bounds, *color),
        }
        if border_width > 0 {
            surface.stroke_rect(bounds, border_width, BORDER_COLOR);
        }
    }

    /// Current on-screen rectangle.
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(self.position.x as i32, self.position.y as i32, self.rect.w, self.rect.h)
    }

    pub fn map_content<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Tile<U>, E> {
        let content = match self.content {
            TileContent::Image(image) => TileContent::Image(f(image)?),
            TileContent::Fill(color) => TileContent::Fill(color),
        };
        Ok(Tile {
            content,
            rect: self.rect,
            screen: self.screen,
            motion: self.motion,
            position: self.position,
            target: self.target,
            speed_factor: self.speed_factor,
            phase: self.phase,
            done: self.done,
            frames: self.frames,
            budget: self.budget,
        })
    }

    pub fn content(&self) -> &TileContent<T> {
        &self.content
    }

    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn target(&self) -> Vector2 {
        self.target
    }

    pub fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    pub fn is_fill(&self) -> bool {
        matches!(self.content, TileContent::Fill(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const SCREEN: (i32, i32) = (1920, 1080);

    fn fill_tile(rng: &mut StdRng, rect: PixelRect) -> Tile<()> {
        Tile::new(TileContent::Fill([1, 2, 3]), rect, SCREEN, Motion::default(), rng)
    }

    fn run_to_done(tile: &mut Tile<()>) -> u32 {
        let mut ticks = 0;
        while !tile.done {
            tile.update(FRAME_TIME);
            ticks += 1;
            assert!(ticks < 1000, "tile never settled");
        }
        ticks
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Surface for Recorder {
        type Texture = ();

        fn draw_texture(&mut self, _texture: &(), x: i32, y: i32) {
            self.calls.push(format!("texture {x},{y}"));
        }

        fn fill_rect(&mut self, rect: PixelRect, color: Rgb) {
            self.calls.push(format!("fill {rect:?} {color:?}"));
        }

        fn stroke_rect(&mut self, rect: PixelRect, width: i32, color: Rgb) {
            self.calls.push(format!("stroke {rect:?} {width} {color:?}"));
        }
    }

    #[test]
    fn starts_off_screen_on_the_target_axis() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let tile = fill_tile(&mut rng, PixelRect::new(100, 200, 300, 400));
            let p = tile.position();
            let horizontal = (p.x == -1920.0 || p.x == 1920.0) && p.y == 200.0;
            let vertical = (p.y == -1080.0 || p.y == 1080.0) && p.x == 100.0;
            assert!(horizontal || vertical, "unexpected start {p:?}");
            assert!((0.8..=1.2).contains(&tile.speed_factor()));
        }
    }

    #[test]
    fn converges_exactly_onto_target() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..20 {
            let mut tile = fill_tile(&mut rng, PixelRect::new(1152, 540, 768, 540));
            let ticks = run_to_done(&mut tile);
            // speed 15 * 1.2 = 18, at most two screen widths to cover
            assert!(ticks <= 18 * 10, "took {ticks} ticks");
            assert_eq!(tile.position(), tile.target());
            assert_eq!(tile.phase, TilePhase::Settled);
        }
    }

    #[test]
    fn exit_heads_off_screen_from_current_position() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut tile = fill_tile(&mut rng, PixelRect::new(960, 0, 960, 1080));
        run_to_done(&mut tile);

        tile.begin_exit(&mut rng);
        assert!(!tile.done);
        assert_eq!(tile.phase, TilePhase::Exiting);
        assert!((0.8..=1.1).contains(&tile.speed_factor()));
        let t = tile.target();
        assert!((t.x.abs() == 1920.0 && t.y == 0.0) || (t.y.abs() == 1080.0 && t.x == 960.0));

        run_to_done(&mut tile);
        assert_eq!(tile.phase, TilePhase::Retired);
        assert_eq!(tile.position(), t);
    }

    #[test]
    fn non_finite_positions_snap() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut tile = fill_tile(&mut rng, PixelRect::new(0, 0, 10, 10));
        tile.position = Vector2::new(f32::NAN, 0.0);
        tile.update(FRAME_TIME);
        assert!(tile.done);
        assert_eq!(tile.position(), Vector2::new(0.0, 0.0));
    }

    #[test]
    fn fast_configured_speeds_settle_without_a_forced_snap() {
        let screen = (3840, 2160);
        let motion = Motion { entry_speed: 100.0, exit_speed: 100.0, ..Motion::default() };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let rect = PixelRect::new(3800, 2100, 40, 60);
            let mut tile = Tile::new(TileContent::<()>::Fill([0, 0, 0]), rect, screen, motion, &mut rng);
            for exiting in [false, true] {
                if exiting {
                    tile.begin_exit(&mut rng);
                }
                let start = tile.position();
                let goal = tile.target();
                let distance = (goal.x - start.x).abs().max((goal.y - start.y).abs());
                let mut remaining = f32::INFINITY;
                let mut ticks = 0;
                while !tile.done {
                    let p = tile.position();
                    let t = tile.target();
                    remaining = (t.x - p.x).abs().max((t.y - p.y).abs());
                    tile.update(FRAME_TIME);
                    ticks += 1;
                    assert!(ticks < 10_000, "tile never settled");
                }
                // a natural settle starts its last tick barely above the threshold
                assert!(remaining < 1.05, "last step jumped {remaining}px after {ticks} ticks");
                if distance > 4000.0 {
                    assert!(ticks > MAX_ANIMATION_FRAMES as usize, "{distance}px settled in {ticks} ticks");
                }
            }
        }
    }

    #[test]
    fn frame_cap_forces_completion() {
        let mut rng = StdRng::seed_from_u64(5);
        // keep rounds to 1.0 in f32, so the tile never moves
        let motion = Motion { entry_speed: 1e9, max_frames: 3, ..Motion::default() };
        let mut tile = Tile::new(TileContent::<()>::Fill([0, 0, 0]), PixelRect::new(0, 0, 10, 10), SCREEN, motion, &mut rng);
        tile.update(FRAME_TIME);
        tile.update(FRAME_TIME);
        assert!(!tile.done);
        tile.update(FRAME_TIME);
        assert!(tile.done);
        assert_eq!(tile.position(), tile.target());
    }

    #[test]
    fn renders_content_then_border_at_truncated_position() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut tile = Tile::new(TileContent::Image(()), PixelRect::new(0, 0, 50, 60), SCREEN, Motion::default(), &mut rng);
        tile.position = Vector2::new(12.9, -3.7);
        let mut surface = Recorder::default();
        tile.render(&mut surface, 10);
        assert_eq!(
            surface.calls,
            vec![
                "texture 12,-3".to_string(),
                format!("stroke {:?} 10 [0, 0, 0]", PixelRect::new(12, -3, 50, 60)),
            ]
        );

        let fill = fill_tile(&mut rng, PixelRect::new(0, 0, 5, 5));
        let mut surface = Recorder::default();
        fill.render(&mut surface, 0);
        assert_eq!(surface.calls.len(), 1);
        assert!(surface.calls[0].starts_with("fill"));
    }
}
