// THEORY:
// Blob detection itself is done by the vision backend's `SimpleBlobDetector`;
// this module only owns its parameter set, so the parameters can live in the
// demo configuration and be checked before they reach the backend.
//
// The detector the parameters drive is a multi-threshold contour analysis:
//
// 1.  **Threshold Sweep**: The gray image is binarized at every threshold from
//     `min_threshold` (inclusive) to `max_threshold` (exclusive) in steps of
//     `threshold_step`. Pixels of the configured blob color (dark for 0, bright
//     for 255) become foreground.
// 2.  **Filtering**: Each connected component is kept only if every enabled
//     descriptor lies in `[min, max)`: area, circularity (4 * pi * area /
//     perimeter^2), inertia ratio, and convexity (area / hull area). The color
//     filter checks the centroid pixel.
// 3.  **Grouping**: Centers closer than `min_dist_between_blobs` across
//     thresholds are merged; a group seen at least `min_repeatability` times
//     becomes one keypoint.

use crate::error::{DemoError, Result};
use serde::Deserialize;

pub mod blob_detector {
    use super::*; // Make structs from parent module available.

    /// An optional `[min, max)` acceptance window for one shape descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
    #[serde(default)]
    pub struct FilterRange {
        pub enabled: bool,
        pub min: f32,
        pub max: f32,
    }

    impl Default for FilterRange {
        fn default() -> Self {
            Self::new(true, 0.0, f32::MAX)
        }
    }

    impl FilterRange {
        pub const fn new(enabled: bool, min: f32, max: f32) -> Self {
            Self { enabled, min, max }
        }
    }

    /// `SimpleBlobDetector` parameters. `Default` is the backend's stock
    /// tuning; keys missing from a config table fall back to `demo_preset`.
    #[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
    #[serde(default = "BlobParams::demo_preset")]
    pub struct BlobParams {
        pub threshold_step: f32,
        pub min_threshold: f32,
        pub max_threshold: f32,
        /// How many thresholds a blob must survive to be reported.
        pub min_repeatability: usize,
        pub min_dist_between_blobs: f32,
        pub filter_by_color: bool,
        /// 0 detects dark blobs, 255 bright ones.
        pub blob_color: u8,
        pub area: FilterRange,
        pub circularity: FilterRange,
        pub inertia: FilterRange,
        pub convexity: FilterRange,
    }

    impl Default for BlobParams {
        fn default() -> Self {
            Self {
                threshold_step: 10.0,
                min_threshold: 50.0,
                max_threshold: 220.0,
                min_repeatability: 2,
                min_dist_between_blobs: 10.0,
                filter_by_color: true,
                blob_color: 0,
                area: FilterRange::new(true, 25.0, 5000.0),
                circularity: FilterRange::new(false, 0.8, f32::MAX),
                inertia: FilterRange::new(true, 0.1, f32::MAX),
                convexity: FilterRange::new(true, 0.95, f32::MAX),
            }
        }
    }

    impl BlobParams {
        /// The tuning used by the blob demo: a wide threshold sweep, large and
        /// loosely round blobs, no convexity requirement.
        pub fn demo_preset() -> Self {
            Self {
                min_threshold: 10.0,
                max_threshold: 250.0,
                area: FilterRange::new(true, 200.0, f32::MAX),
                circularity: FilterRange::new(true, 0.1, f32::MAX),
                convexity: FilterRange::new(false, 0.9, f32::MAX),
                inertia: FilterRange::new(true, 0.1, f32::MAX),
                ..Self::default()
            }
        }

        /// Rejects parameter sets whose threshold sweep would be empty or
        /// would never finish.
        pub fn validate(&self) -> Result<()> {
            let (min, max, step) = (self.min_threshold, self.max_threshold, self.threshold_step);
            if !(min.is_finite() && max.is_finite()) {
                return Err(DemoError::InvalidParameters(format!(
                    "thresholds must be finite, got {min}..{max}"
                )));
            }
            if !(step.is_finite() && step > 0.0) {
                return Err(DemoError::InvalidParameters(format!(
                    "threshold_step must be positive and finite, got {step}"
                )));
            }
            if min >= max {
                return Err(DemoError::InvalidParameters(format!(
                    "empty threshold range {min}..{max}"
                )));
            }
            // The sweep only advances if the step survives rounding at the
            // largest magnitude it visits.
            if min + step == min || max - step == max {
                return Err(DemoError::InvalidParameters(format!(
                    "threshold_step {step} is too small to advance from {min} to {max}"
                )));
            }
            if self.min_repeatability == 0 {
                return Err(DemoError::InvalidParameters(
                    "min_repeatability must be at least 1".to_string(),
                ));
            }
            Ok(())
        }
    }
}
