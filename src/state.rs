/// Lifecycle of a single tile within one cycle.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub enum TilePhase {
    Entering, // Sliding in from off-screen towards its layout rect
    Settled,  // Resting on its layout rect while the layout is held
    Exiting,  // Sliding out towards a random off-screen position
    Retired,  // Off-screen, waiting to be dropped with the cycle
}

/// Lifecycle of one slideshow cycle.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CyclePhase {
    BuildTiles,   // Pick a layout, sample images, fit them
    AnimateEnter, // Tiles converge on their layout positions
    Hold,         // Composed frame shown for the hold duration
    AnimateExit,  // Tiles leave the screen
    Complete,     // Every tile retired, next cycle may start
}

/// How a cycle ended.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CycleOutcome {
    Completed,
    QuitRequested,
}
