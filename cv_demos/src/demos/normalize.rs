use super::{Outcome, acquire_image, image_path_arg, step};
use crate::config::DemoConfig;
use crate::core_modules::color::to_grayscale;
use crate::core_modules::histogram::{min_max, normalize_min_max};
use crate::error::Result;
use crate::presenter::{ImageRef, Presenter};
use image::GrayImage;
use std::io::Write;

fn print_range(image: &GrayImage, out: &mut dyn Write) -> Result<()> {
    let (min, max) = min_max(image).unwrap_or((0, 0));
    writeln!(out, "Minimum value: {min}")?;
    writeln!(out, "Maximum value: {max}")?;
    Ok(())
}

/// Prints the gray range before and after a 0..255 min-max normalization and
/// shows input, gray and normalized images.
pub fn run(
    args: &[String],
    config: &DemoConfig,
    presenter: &mut dyn Presenter,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let path = step!(image_path_arg(args, config, "cv_normalize", out));
    let image = step!(acquire_image(&path, out));

    let gray = to_grayscale(&image);
    print_range(&gray, out)?;

    let normalized = normalize_min_max(&gray, 0, 255);
    print_range(&normalized, out)?;

    let windows = &config.windows;
    presenter.show(&windows.input, ImageRef::Color(&image))?;
    presenter.show(&windows.gray, ImageRef::Gray(&gray))?;
    presenter.show(&windows.normalized, ImageRef::Gray(&normalized))?;
    presenter.wait_key(None)?;

    Ok(Outcome::Completed)
}
