use crate::core_modules::color::gray_to_rgb;
use crate::core_modules::region::{Stroke, draw_circle, draw_line};
use crate::error::Result;
use image::{GrayImage, Rgb, RgbImage};

/// A detected feature: a center, a diameter and, for oriented detectors, an
/// angle in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPoint {
    pub x: f32,
    pub y: f32,
    /// Diameter of the meaningful neighbourhood.
    pub size: f32,
    /// `None` for unoriented features such as blobs.
    pub angle: Option<f32>,
    pub response: f32,
}

impl KeyPoint {
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        Self {
            x,
            y,
            size,
            angle: None,
            response: 0.0,
        }
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

/// A feature detector working on gray images.
pub trait KeypointDetector {
    fn detect_keypoints(&mut self, image: &GrayImage) -> Result<Vec<KeyPoint>>;
}

/// Renders keypoints over a color copy of `image`: a circle of radius
/// `size / 2` per keypoint, plus a radius tick when the keypoint is oriented.
pub fn draw_keypoints(image: &GrayImage, keypoints: &[KeyPoint], color: Rgb<u8>) -> RgbImage {
    let mut canvas = gray_to_rgb(image);
    for kp in keypoints {
        let center = kp.center();
        let radius = (kp.size / 2.0).round().max(1.0);
        draw_circle(&mut canvas, center, radius as u32, color, Stroke::Outline(1));

        if let Some(angle) = kp.angle {
            let theta = angle.to_radians();
            let tip = (
                (kp.x + radius * theta.cos()).round() as i32,
                (kp.y + radius * theta.sin()).round() as i32,
            );
            draw_line(&mut canvas, center, tip, color, 1);
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::region::RED;
    use image::Luma;

    #[test]
    fn keypoint_circle_is_drawn_at_half_size() {
        let image = GrayImage::from_pixel(60, 60, Luma([255]));
        let canvas = draw_keypoints(&image, &[KeyPoint::new(30.0, 30.0, 20.0)], RED);

        assert_eq!(canvas.dimensions(), (60, 60));
        assert_eq!(canvas.get_pixel(40, 30), &RED);
        assert_eq!(canvas.get_pixel(30, 20), &RED);
        assert_eq!(canvas.get_pixel(30, 30), &Rgb([255, 255, 255]));
    }

    #[test]
    fn oriented_keypoints_get_a_tick() {
        let image = GrayImage::new(60, 60);
        let mut kp = KeyPoint::new(30.0, 30.0, 20.0);
        kp.angle = Some(0.0);

        let plain = draw_keypoints(&image, &[KeyPoint::new(30.0, 30.0, 20.0)], RED);
        let oriented = draw_keypoints(&image, &[kp], RED);

        assert_eq!(plain.get_pixel(35, 30), &Rgb([0, 0, 0]));
        assert_eq!(oriented.get_pixel(35, 30), &RED);
    }

    #[test]
    fn no_keypoints_is_just_a_color_copy() {
        let image = GrayImage::from_fn(4, 4, |x, y| Luma([(x * 10 + y) as u8]));
        let canvas = draw_keypoints(&image, &[], RED);
        assert_eq!(canvas.get_pixel(3, 2), &Rgb([32, 32, 32]));
    }
}
