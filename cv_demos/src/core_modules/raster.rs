// THEORY:
// The `raster` module is the acquisition layer. It decodes an image from disk,
// always as a 3-channel color raster (the demos never work on the file's native
// layout), reports the basic metadata a student is supposed to look at first,
// and offers the small "container" operations of the containers demo: resizing,
// saving, and walking the pixel buffer.
//
// Pixel walks are done over the raw, row-major buffer with `chunks_exact`,
// never with per-coordinate indexing.

use crate::error::Result;
use image::imageops::FilterType;
use image::{ImageEncoder, RgbImage};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Basic metadata of an acquired image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Number of interleaved channels per pixel.
    pub channels: u8,
}

/// Decodes `path` as a color image, converting grayscale or alpha inputs to
/// three channels.
pub fn load_color(path: &Path) -> Result<RgbImage> {
    let decoded = image::open(path)?;
    debug!(path = %path.display(), color = ?decoded.color(), "decoded image");
    Ok(decoded.to_rgb8())
}

pub fn describe(image: &RgbImage) -> ImageInfo {
    ImageInfo {
        width: image.width(),
        height: image.height(),
        channels: 3,
    }
}

/// Half-size copy using bilinear sampling.
pub fn resize_half(image: &RgbImage) -> RgbImage {
    let width = (image.width() / 2).max(1);
    let height = (image.height() / 2).max(1);
    image::imageops::resize(image, width, height, FilterType::Triangle)
}

/// Writes an RGB image as PNG.
pub fn save_png(path: &Path, image: &RgbImage) -> Result<()> {
    let output = std::fs::File::create(path)?;
    let encoder = image::codecs::png::PngEncoder::new(std::io::BufWriter::new(output));
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(())
}

/// Prints every pixel as `Pixel(row, col) = b g r`, in row-major order.
pub fn dump_pixels(image: &RgbImage, out: &mut dyn Write) -> std::io::Result<()> {
    let width = image.width() as usize;
    if width == 0 {
        return Ok(());
    }
    for (row, line) in image.as_raw().chunks_exact(width * 3).enumerate() {
        for (col, px) in line.chunks_exact(3).enumerate() {
            writeln!(out, "Pixel({}, {}) = {} {} {}", row, col, px[2], px[1], px[0])?;
        }
    }
    Ok(())
}
