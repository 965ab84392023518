//! Photo wall: lays images and color tiles out on a grid, slides them in,
//! holds the composition, slides them out and starts over.

pub mod config;
pub mod constants;
pub mod display;
pub mod engine;
pub mod fit;
pub mod layout;
pub mod library;
pub mod palette;
pub mod slideshow;
pub mod state;
pub mod subject_detection;
pub mod texture_loader;
pub mod tile;
