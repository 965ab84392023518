use anyhow::Result;
use tracing::{debug, info};

use crate::display::Display;
use crate::engine::CycleEngine;
use crate::state::CycleOutcome;
use crate::texture_loader::ImageDecoder;

/// Repeats cycles on `display` until a quit is requested; returns the number
/// of cycles that ran to completion.
pub fn run<D: ImageDecoder, S: Display>(engine: &mut CycleEngine<D>, display: &mut S) -> Result<u64> {
    info!(images = engine.library().len(), "starting slideshow");
    let mut completed = 0;
    loop {
        match engine.run_cycle(display)? {
            CycleOutcome::Completed => {
                completed += 1;
                debug!(completed, "cycle complete");
            }
            CycleOutcome::QuitRequested => {
                info!(completed, "quit requested");
                return Ok(completed);
            }
        }
    }
}
