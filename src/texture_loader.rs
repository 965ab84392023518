use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageFormat, RgbaImage, imageops};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::constants::IMAGE_EXTENSIONS;

/// Turns an image file into upright RGBA pixels.
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<RgbaImage>;
}

/// One way of decoding encoded bytes.
pub trait Codec {
    fn name(&self) -> &'static str;
    fn decode(&self, path: &Path, bytes: &[u8]) -> Result<DynamicImage>;
}

/// Trusts the file extension.
pub struct ExtensionCodec;

impl Codec for ExtensionCodec {
    fn name(&self) -> &'static str {
        "extension"
    }

    fn decode(&self, path: &Path, bytes: &[u8]) -> Result<DynamicImage> {
        let format = ImageFormat::from_path(path)?;
        Ok(image::load_from_memory_with_format(bytes, format)?)
    }
}

/// Guesses the format from the leading bytes, for misnamed files.
pub struct SniffingCodec;

impl Codec for SniffingCodec {
    fn name(&self) -> &'static str {
        "content-sniffing"
    }

    fn decode(&self, _path: &Path, bytes: &[u8]) -> Result<DynamicImage> {
        Ok(image::load_from_memory(bytes)?)
    }
}

/// Codecs tried in order until one succeeds.
pub struct CodecChain {
    codecs: Vec<Box<dyn Codec>>,
}

impl CodecChain {
    pub fn new(codecs: Vec<Box<dyn Codec>>) -> Self {
        Self { codecs }
    }
}

impl Default for CodecChain {
    fn default() -> Self {
        Self::new(vec![Box::new(ExtensionCodec), Box::new(SniffingCodec)])
    }
}

impl ImageDecoder for CodecChain {
    fn decode(&self, path: &Path) -> Result<RgbaImage> {
        let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

        let mut failures = Vec::new();
        for codec in &self.codecs {
            match codec.decode(path, &bytes) {
                Ok(decoded) => {
                    trace!(codec = codec.name(), path = %path.display(), "decoded");
                    let rgba = decoded.to_rgba8();
                    if rgba.width() == 0 || rgba.height() == 0 {
                        bail!("{} decoded to an empty image", path.display());
                    }
                    return Ok(apply_orientation(rgba, read_orientation(&bytes)));
                }
                Err(e) => failures.push(format!("{}: {e}", codec.name())),
            }
        }
        Err(anyhow!("no codec could decode {} ({})", path.display(), failures.join("; ")))
    }
}

/// EXIF orientation tag, 1 (upright) when absent or unreadable.
pub fn read_orientation(bytes: &[u8]) -> u16 {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(e) => {
            trace!("no exif data: {e}");
            return 1;
        }
    };
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(|value| value as u16)
        .unwrap_or(1)
}

/// Rotates/flips `image` so that EXIF `orientation` becomes upright.
pub fn apply_orientation(image: RgbaImage, orientation: u16) -> RgbaImage {
    match orientation {
        2 => imageops::flip_horizontal(&image),
        3 => imageops::rotate180(&image),
        4 => imageops::flip_vertical(&image),
        5 => imageops::flip_horizontal(&imageops::rotate90(&image)), // transpose
        6 => imageops::rotate90(&image),
        7 => imageops::flip_horizontal(&imageops::rotate270(&image)), // transverse
        8 => imageops::rotate270(&image),
        _ => image,
    }
}

/// Upright dimensions without decoding pixel data.
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32)> {
    let (width, height) = image::ImageReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .with_guessed_format()?
        .into_dimensions()
        .with_context(|| format!("unreadable image header in {}", path.display()))?;
    if width == 0 || height == 0 {
        bail!("{} has no pixels", path.display());
    }

    let orientation = fs::read(path).map(|bytes| read_orientation(&bytes)).unwrap_or(1);
    if (5..=8).contains(&orientation) {
        debug!(orientation, path = %path.display(), "swapping dimensions for rotated image");
        Ok((height, width))
    } else {
        Ok((width, height))
    }
}

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

// --- Helper: Load and Sort Image Paths ---
pub fn load_sorted_image_paths(dir_path: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(dir_path)
        .with_context(|| format!("failed to read directory {}", dir_path.display()))?;
    if !metadata.is_dir() {
        bail!("{} is not a directory", dir_path.display());
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir_path).max_depth(max_depth).follow_links(true) {
        let entry = entry.with_context(|| format!("failed to read directory entry in {}", dir_path.display()))?;
        if entry.file_type().is_file() && is_image_path(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if paths.is_empty() {
        bail!("no image files found in directory {}", dir_path.display());
    }
    Ok(paths)
}
