use std::path::{Path, PathBuf};

use anyhow::{Result, ensure};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::fit::FocusPoint;
use crate::subject_detection::FocusProvider;
use crate::texture_loader::probe_dimensions;

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryEntry {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub focus: Option<FocusPoint>,
}

/// The images available to the slideshow, drawn in shuffled passes.
///
/// Each pass hands out every image once in random order; when a pass runs dry
/// it is reshuffled. A single draw never returns the same image twice.
pub struct ImageLibrary {
    entries: Vec<LibraryEntry>,
    // Remaining indices of the current pass, drawn from the back.
    pool: Vec<usize>,
}

impl ImageLibrary {
    pub fn new(entries: Vec<LibraryEntry>) -> Self {
        Self { entries, pool: Vec::new() }
    }

    /// Probes every candidate and records its focus point; unreadable files are
    /// skipped. Fails when nothing usable remains.
    pub fn scan(paths: Vec<PathBuf>, focus: &mut dyn FocusProvider) -> Result<Self> {
        let candidates = paths.len();
        let mut entries = Vec::with_capacity(candidates);

        for path in paths {
            let (width, height) = match probe_dimensions(&path) {
                Ok(dims) => dims,
                Err(e) => {
                    warn!(path = %path.display(), "skipping image: {e:#}");
                    continue;
                }
            };
            let focus = focus.locate_focus(&path).unwrap_or_else(|e| {
                warn!(path = %path.display(), "focus detection failed, using center crop: {e:#}");
                None
            });
            debug!(path = %path.display(), width, height, ?focus, "image added");
            entries.push(LibraryEntry { path, width, height, focus });
        }

        ensure!(!entries.is_empty(), "none of the {candidates} image files could be read");
        info!(usable = entries.len(), skipped = candidates - entries.len(), "image library ready");
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    /// Draws up to `count` distinct images.
    pub fn draw<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Vec<LibraryEntry> {
        let count = count.min(self.entries.len());
        let mut picked: Vec<usize> = Vec::with_capacity(count);
        let mut deferred = Vec::new();

        while picked.len() < count {
            if self.pool.is_empty() {
                self.reshuffle(rng);
            }
            let Some(index) = self.pool.pop() else { break };
            if picked.contains(&index) {
                // Already shown this cycle via the previous pass, keep it for later.
                deferred.push(index);
            } else {
                picked.push(index);
            }
        }
        if !deferred.is_empty() {
            let rest = std::mem::replace(&mut self.pool, deferred);
            self.pool.extend(rest);
        }

        picked.into_iter().map(|index| self.entries[index].clone()).collect()
    }

    fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.pool = (0..self.entries.len()).collect();
        self.pool.shuffle(rng);
        debug!(images = self.pool.len(), "reshuffled image pool");
    }

    /// Drops an image for the rest of the run.
    pub fn exclude(&mut self, path: &Path) {
        let Some(removed) = self.entries.iter().position(|e| e.path == path) else {
            return;
        };
        self.entries.remove(removed);
        self.pool.retain(|&index| index != removed);
        for index in &mut self.pool {
            if *index > removed {
                *index -= 1;
            }
        }
        warn!(path = %path.display(), remaining = self.entries.len(), "image excluded from library");
    }
}
