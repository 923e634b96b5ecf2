// THEORY:
// Region-of-interest basics. The program loads the configured fixed input,
// reports its size, then walks through the ROI vocabulary one key press at a
// time:
// 1.  A 200x200 region centered on the image, given by two corners, is cropped
//     into its own image.
// 2.  The same region is outlined in red on the input (thickness 3).
// 3.  A blue circle of radius 100 (thickness 3) is drawn around the center.
// 4.  Black diagonals (thickness 3) are drawn from corner to corner.
// Every drawing step is followed by a refresh of the input window and a key
// wait, so the annotations accumulate on screen.

use super::{Outcome, acquire_image, print_info, step};
use crate::config::DemoConfig;
use crate::core_modules::raster::describe;
use crate::core_modules::region::{BLACK, BLUE, RED, Region, Stroke, draw_circle, draw_line, draw_rectangle};
use crate::error::Result;
use crate::presenter::{ImageRef, Presenter};
use std::io::Write;
use tracing::{info, warn};

const HALF_EXTENT: i32 = 100;
const THICKNESS: u32 = 3;

/// The annotation demo takes no positional arguments; `_args` is accepted for
/// a uniform entry signature.
pub fn run(
    _args: &[String],
    config: &DemoConfig,
    presenter: &mut dyn Presenter,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let windows = &config.windows;

    // --- 1. Acquisition ---
    let mut image = step!(acquire_image(&config.fixed_input, out));
    print_info(&describe(&image), out)?;
    presenter.show(&windows.input, ImageRef::Color(&image))?;
    presenter.wait_key(None)?;

    // --- 2. Region of interest ---
    let (cx, cy) = (image.width() as i32 / 2, image.height() as i32 / 2);
    let region = Region::from_corners(
        (cx - HALF_EXTENT, cy - HALF_EXTENT),
        (cx + HALF_EXTENT, cy + HALF_EXTENT),
    );
    match region.extract(&image) {
        Some(roi) => presenter.show(&windows.roi, ImageRef::Color(&roi))?,
        None => warn!(?region, "region lies outside the image, nothing to crop"),
    }
    presenter.wait_key(None)?;

    // --- 3. Annotations ---
    draw_rectangle(&mut image, region, RED, Stroke::Outline(THICKNESS));
    presenter.show(&windows.input, ImageRef::Color(&image))?;
    presenter.wait_key(None)?;

    draw_circle(&mut image, (cx, cy), HALF_EXTENT as u32, BLUE, Stroke::Outline(THICKNESS));
    presenter.show(&windows.input, ImageRef::Color(&image))?;
    presenter.wait_key(None)?;

    let (right, bottom) = (image.width() as i32 - 1, image.height() as i32 - 1);
    draw_line(&mut image, (0, 0), (right, bottom), BLACK, THICKNESS);
    draw_line(&mut image, (right, 0), (0, bottom), BLACK, THICKNESS);
    presenter.show(&windows.input, ImageRef::Color(&image))?;
    presenter.wait_key(None)?;

    info!(?region, "annotation demo finished");
    Ok(Outcome::Completed)
}
