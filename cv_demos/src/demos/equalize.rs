use super::{Outcome, acquire_image, image_path_arg, step};
use crate::config::DemoConfig;
use crate::core_modules::color::to_grayscale;
use crate::core_modules::histogram::equalize;
use crate::error::Result;
use crate::presenter::{ImageRef, Presenter};
use std::io::Write;

/// Shows an image, its grayscale version and the histogram-equalized gray.
pub fn run(
    args: &[String],
    config: &DemoConfig,
    presenter: &mut dyn Presenter,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let path = step!(image_path_arg(args, config, "cv_equalize", out));
    let image = step!(acquire_image(&path, out));

    let gray = to_grayscale(&image);
    let equalized = equalize(&gray);

    let windows = &config.windows;
    presenter.show(&windows.input, ImageRef::Color(&image))?;
    presenter.show(&windows.gray, ImageRef::Gray(&gray))?;
    presenter.show(&windows.equalized, ImageRef::Gray(&equalized))?;
    presenter.wait_key(None)?;

    Ok(Outcome::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::fixtures::*;
    use crate::presenter::HeadlessPresenter;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn shows_three_windows_and_waits_once() {
        let dir = tempfile::tempdir().unwrap();
        let scene = RgbImage::from_fn(32, 16, |x, _| Rgb([100 + x as u8, 100 + x as u8, 100 + x as u8]));
        let input = write_png(dir.path(), "scene.png", &scene);
        let mut presenter = HeadlessPresenter::new().with_output_dir(dir.path().join("shown"));
        let mut out = Vec::new();

        let outcome = run(
            &args(&["cv_equalize", input.to_str().unwrap()]),
            &DemoConfig::default(),
            &mut presenter,
            &mut out,
        )
        .unwrap();

        assert_eq!(outcome, Outcome::Completed);
        assert!(out.is_empty());
        assert_eq!(presenter.windows(), ["imageIn", "imageGray", "imageEqualized"]);
        assert_eq!(presenter.waits(), 1);

        let equalized = image::open(presenter.path_for("imageEqualized").unwrap())
            .unwrap()
            .to_luma8();
        assert_eq!(equalized.get_pixel(31, 0), &Luma([255]));
    }

    #[test]
    fn wrong_arity_prints_usage() {
        let mut presenter = HeadlessPresenter::new();
        let mut out = Vec::new();

        let outcome = run(&args(&["cv_equalize"]), &DemoConfig::default(), &mut presenter, &mut out)
            .unwrap();

        assert!(matches!(outcome, Outcome::UsageError(_)));
        assert_eq!(text(out), "USAGE: cv_equalize <image_path> \n");
        assert_eq!(presenter.waits(), 0);
    }

    #[test]
    fn unreadable_path_prints_diagnostic() {
        let mut out = Vec::new();
        let outcome = run(
            &args(&["cv_equalize", "nope.png"]),
            &DemoConfig::default(),
            &mut HeadlessPresenter::new(),
            &mut out,
        )
        .unwrap();

        assert_eq!(outcome, Outcome::AcquisitionError("Error while opening file nope.png".into()));
        assert_eq!(text(out), "Error while opening file nope.png\n");
    }
}
