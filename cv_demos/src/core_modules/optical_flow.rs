// THEORY:
// Dense optical flow assigns every pixel of the previous frame a displacement
// `(u, v)` such that `next(x + u, y + v) ~= prev(x, y)`.
//
// The flow itself is computed by the vision backend behind `FlowEstimator`
// (DIS optical flow, with the presets below). This module holds what the
// viewer needs around it: the `MotionField` the estimator fills in, and
// `flow_to_rgb`, which turns a field into something a window can show.

use crate::error::Result;
use image::{GrayImage, Rgb, RgbImage};
use serde::Deserialize;

/// Per-pixel displacement between two frames, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionField {
    /// Horizontal motion.
    pub u: Vec<f32>,
    /// Vertical motion.
    pub v: Vec<f32>,
    pub width: u32,
    pub height: u32,
}

impl MotionField {
    pub fn new(width: u32, height: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            u: vec![0.0; size],
            v: vec![0.0; size],
            width,
            height,
        }
    }

    pub fn get_motion(&self, x: u32, y: u32) -> (f32, f32) {
        let idx = (y * self.width + x) as usize;
        (self.u[idx], self.v[idx])
    }

    pub fn set_motion(&mut self, x: u32, y: u32, u: f32, v: f32) {
        let idx = (y * self.width + x) as usize;
        self.u[idx] = u;
        self.v[idx] = v;
    }

    pub fn magnitude(&self) -> Vec<f32> {
        self.u
            .iter()
            .zip(&self.v)
            .map(|(u, v)| u.hypot(*v))
            .collect()
    }

    /// Average displacement over the whole field.
    pub fn mean_motion(&self) -> (f32, f32) {
        if self.u.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.u.len() as f32;
        (self.u.iter().sum::<f32>() / n, self.v.iter().sum::<f32>() / n)
    }
}

/// Anything that turns two consecutive gray frames into a motion field.
pub trait FlowEstimator {
    fn calc(&mut self, prev: &GrayImage, next: &GrayImage) -> Result<MotionField>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPreset {
    UltraFast,
    Fast,
    #[default]
    Medium,
}

/// Renders a motion field as a color wheel: hue encodes direction, brightness
/// encodes magnitude normalized to the field's maximum.
pub fn flow_to_rgb(field: &MotionField) -> RgbImage {
    let magnitude = field.magnitude();
    let max = magnitude.iter().copied().fold(0.0f32, f32::max);

    let data: Vec<u8> = field
        .u
        .iter()
        .zip(&field.v)
        .zip(&magnitude)
        .flat_map(|((u, v), m)| {
            if max <= f32::EPSILON {
                return [0, 0, 0];
            }
            let hue = v.atan2(*u).to_degrees().rem_euclid(360.0);
            hsv_to_rgb(hue, 1.0, m / max).0
        })
        .collect();
    RgbImage::from_raw(field.width, field.height, data)
        .unwrap_or_else(|| RgbImage::new(field.width, field.height))
}

fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Rgb<u8> {
    let c = value * saturation;
    let h = hue / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = value - c;
    let to_byte = |channel: f32| ((channel + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb([to_byte(r), to_byte(g), to_byte(b)])
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Reports no motion at all; stands in for a real estimator in tests.
    pub struct StillFlow {
        pub calls: usize,
    }

    impl FlowEstimator for StillFlow {
        fn calc(&mut self, prev: &GrayImage, next: &GrayImage) -> Result<MotionField> {
            assert_eq!(prev.dimensions(), next.dimensions());
            self.calls += 1;
            Ok(MotionField::new(prev.width(), prev.height()))
        }

        fn name(&self) -> &str {
            "still"
        }
    }
}
