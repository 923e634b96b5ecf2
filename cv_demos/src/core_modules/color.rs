// THEORY:
// Grayscale conversion uses the fixed-point Rec.601 luma weights that OpenCV
// uses for `COLOR_BGR2GRAY`:
//
//     Y = (4899 * R + 9617 * G + 1868 * B + 8192) >> 14
//
// The weights sum to 2^14, so a neutral gray pixel maps to itself exactly.
// Images decoded by `image` are RGB in memory, while frames grabbed by OpenCV are
// BGR; `ChannelOrder` names which one a raw buffer holds so the weights land on
// the right bytes.

use crate::error::{DemoError, Result};
use image::buffer::ConvertBuffer;
use image::{GrayImage, RgbImage};

const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;

/// Memory order of an interleaved 3-channel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((R_WEIGHT * r as u32 + G_WEIGHT * g as u32 + B_WEIGHT * b as u32 + (1 << (SHIFT - 1)))
        >> SHIFT) as u8
}

fn luma_buffer(raw: &[u8], order: ChannelOrder) -> Vec<u8> {
    raw.chunks_exact(3)
        .map(|px| match order {
            ChannelOrder::Rgb => luma(px[0], px[1], px[2]),
            ChannelOrder::Bgr => luma(px[2], px[1], px[0]),
        })
        .collect()
}

pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    let data = luma_buffer(image.as_raw(), ChannelOrder::Rgb);
    GrayImage::from_raw(image.width(), image.height(), data)
        .unwrap_or_else(|| GrayImage::new(image.width(), image.height()))
}

/// Converts a raw interleaved buffer of the given channel order.
pub fn to_grayscale_ordered(
    raw: &[u8],
    width: u32,
    height: u32,
    order: ChannelOrder,
) -> Result<GrayImage> {
    let expected = width as usize * height as usize * 3;
    if raw.len() != expected {
        return Err(DemoError::SizeMismatch(format!(
            "expected {} bytes for a {}x{} 3-channel frame, got {}",
            expected,
            width,
            height,
            raw.len()
        )));
    }
    GrayImage::from_raw(width, height, luma_buffer(raw, order)).ok_or_else(|| {
        DemoError::SizeMismatch(format!("cannot build a {}x{} gray image", width, height))
    })
}

/// Reorders an interleaved BGR buffer into an `RgbImage`.
pub fn rgb_from_bgr(raw: &[u8], width: u32, height: u32) -> Result<RgbImage> {
    let data: Vec<u8> = raw
        .chunks_exact(3)
        .flat_map(|px| [px[2], px[1], px[0]])
        .collect();
    RgbImage::from_raw(width, height, data).ok_or_else(|| {
        DemoError::SizeMismatch(format!(
            "{} bytes do not hold a {}x{} 3-channel frame",
            raw.len(),
            width,
            height
        ))
    })
}

/// Splits into single-channel planes in blue, green, red order.
pub fn split_channels(image: &RgbImage) -> [GrayImage; 3] {
    let (width, height) = image.dimensions();
    let plane = |channel: usize| {
        let data: Vec<u8> = image.as_raw().chunks_exact(3).map(|px| px[channel]).collect();
        GrayImage::from_raw(width, height, data).unwrap_or_else(|| GrayImage::new(width, height))
    };
    [plane(2), plane(1), plane(0)]
}

/// Replicates a gray image into three equal channels.
pub fn gray_to_rgb(image: &GrayImage) -> RgbImage {
    image.convert()
}
