use super::{Outcome, acquire_image, image_path_arg, step};
use crate::config::DemoConfig;
use crate::core_modules::color::to_grayscale;
use crate::core_modules::keypoint::{KeypointDetector, draw_keypoints};
use crate::core_modules::region::RED;
use crate::error::Result;
use crate::presenter::{ImageRef, Presenter};
use std::io::Write;
use tracing::info;

/// Finds blobs in the gray version of the input with `detector` and draws them
/// on top of it.
pub fn run(
    args: &[String],
    config: &DemoConfig,
    presenter: &mut dyn Presenter,
    out: &mut dyn Write,
    detector: &mut dyn KeypointDetector,
) -> Result<Outcome> {
    let path = step!(image_path_arg(args, config, "cv_blob", out));
    let image = step!(acquire_image(&path, out));

    let gray = to_grayscale(&image);
    let keypoints = detector.detect_keypoints(&gray)?;
    info!(count = keypoints.len(), "blobs detected");
    let annotated = draw_keypoints(&gray, &keypoints, RED);

    let windows = &config.windows;
    presenter.show(&windows.input, ImageRef::Color(&image))?;
    presenter.show(&windows.gray, ImageRef::Gray(&gray))?;
    presenter.show(&windows.keypoints, ImageRef::Color(&annotated))?;
    presenter.wait_key(None)?;

    Ok(Outcome::Completed)
}
