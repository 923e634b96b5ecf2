// THEORY:
// Two ways of stretching the intensity distribution of an 8-bit gray image:
//
// 1.  **Equalization** maps each level through the normalized cumulative
//     histogram, so the output histogram is as flat as the discrete levels
//     allow. It is non-linear; an image that is already equalized is (nearly) a
//     fixed point.
// 2.  **Min-max normalization** is linear: the darkest observed level goes to
//     `lo`, the brightest to `hi`, and everything in between is scaled and
//     rounded. A flat image has no range to stretch and maps to `lo`.

use image::GrayImage;

pub fn equalize(image: &GrayImage) -> GrayImage {
    imageproc::contrast::equalize_histogram(image)
}

/// Darkest and brightest levels present, `None` for an empty image.
pub fn min_max(image: &GrayImage) -> Option<(u8, u8)> {
    let raw = image.as_raw();
    let min = raw.iter().copied().min()?;
    let max = raw.iter().copied().max()?;
    Some((min, max))
}

/// Linearly rescales `image` so its observed range becomes `lo..=hi`.
pub fn normalize_min_max(image: &GrayImage, lo: u8, hi: u8) -> GrayImage {
    let Some((min, max)) = min_max(image) else {
        return image.clone();
    };
    let (lo, hi) = (lo.min(hi) as f64, lo.max(hi) as f64);
    let span = (max - min) as f64;
    let scale = if span > 0.0 { (hi - lo) / span } else { 0.0 };
    let shift = lo - min as f64 * scale;

    let data: Vec<u8> = image
        .as_raw()
        .iter()
        .map(|&p| (p as f64 * scale + shift).round().clamp(0.0, 255.0) as u8)
        .collect();
    GrayImage::from_raw(image.width(), image.height(), data).unwrap_or_else(|| image.clone())
}
