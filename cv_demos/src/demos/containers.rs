// THEORY:
// A tour of the image container itself: its metadata, a color-space conversion,
// the per-channel planes (blue, green, red), a half-size resize that is also
// written to disk, and finally a full walk over the resized pixels.

use super::{Outcome, acquire_image, print_info, step};
use crate::config::DemoConfig;
use crate::core_modules::color::{split_channels, to_grayscale};
use crate::core_modules::raster::{describe, dump_pixels, resize_half, save_png};
use crate::error::Result;
use crate::presenter::{ImageRef, Presenter};
use std::io::Write;
use tracing::info;

pub fn run(
    _args: &[String],
    config: &DemoConfig,
    presenter: &mut dyn Presenter,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let windows = &config.windows;

    let image = step!(acquire_image(&config.fixed_input, out));
    let info = describe(&image);
    print_info(&info, out)?;
    let (width, height) = image.dimensions();
    writeln!(out, "image width: {width}")?;
    writeln!(out, "image height: {height}")?;
    presenter.show(&windows.input, ImageRef::Color(&image))?;
    presenter.wait_key(None)?;

    let gray = to_grayscale(&image);
    presenter.show(&windows.gray, ImageRef::Gray(&gray))?;
    presenter.wait_key(None)?;

    let channels = split_channels(&image);
    for (name, plane) in windows.channels.iter().zip(&channels) {
        presenter.show(name, ImageRef::Gray(plane))?;
    }
    presenter.wait_key(None)?;

    let resized = resize_half(&image);
    presenter.show(&windows.resized, ImageRef::Color(&resized))?;
    save_png(&config.resize_output, &resized)?;
    info!(path = %config.resize_output.display(), "wrote resized image");
    presenter.wait_key(None)?;

    if config.print_pixels {
        dump_pixels(&resized, out)?;
    }
    presenter.wait_key(None)?;

    Ok(Outcome::Completed)
}
