// THEORY:
// A `Presenter` is the display side of a demo: named windows that can be
// refreshed with an image, and a key poll that either blocks (`None` timeout) or
// gives up after a short delay. The demos only talk to this trait, so the same
// entry function runs against real windows or against the headless presenter
// used by tests and CI.
//
// `HeadlessPresenter` keeps the most recent image of every window as a PNG in an
// output directory (when one is configured) and answers key polls from a script.
// Once the script runs out, every poll reports "no key".

use crate::error::Result;
use image::{ExtendedColorType, GrayImage, ImageEncoder, RgbImage};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// A borrowed image of either layout the demos display.
#[derive(Debug, Clone, Copy)]
pub enum ImageRef<'a> {
    Color(&'a RgbImage),
    Gray(&'a GrayImage),
}

impl ImageRef<'_> {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ImageRef::Color(image) => image.dimensions(),
            ImageRef::Gray(image) => image.dimensions(),
        }
    }

    /// Encodes the image as PNG at `path`.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        let (width, height) = self.dimensions();
        let (raw, color) = match self {
            ImageRef::Color(image) => (image.as_raw().as_slice(), ExtendedColorType::Rgb8),
            ImageRef::Gray(image) => (image.as_raw().as_slice(), ExtendedColorType::L8),
        };
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(std::io::BufWriter::new(output));
        encoder.write_image(raw, width, height, color)?;
        Ok(())
    }
}

impl<'a> From<&'a RgbImage> for ImageRef<'a> {
    fn from(image: &'a RgbImage) -> Self {
        ImageRef::Color(image)
    }
}

impl<'a> From<&'a GrayImage> for ImageRef<'a> {
    fn from(image: &'a GrayImage) -> Self {
        ImageRef::Gray(image)
    }
}

pub trait Presenter {
    /// Creates (or reuses) a window titled `name`.
    fn named_window(&mut self, name: &str) -> Result<()>;

    /// Replaces the content of `window` with `image`, creating it if needed.
    fn show(&mut self, window: &str, image: ImageRef<'_>) -> Result<()>;

    /// Waits for a key press. `None` blocks until a key arrives; `Some(d)`
    /// returns `Ok(None)` if nothing was pressed within `d`.
    fn wait_key(&mut self, timeout: Option<Duration>) -> Result<Option<char>>;
}

#[derive(Debug, Default)]
pub struct HeadlessPresenter {
    output_dir: Option<PathBuf>,
    keys: VecDeque<Option<char>>,
    windows: Vec<String>,
    shows: Vec<String>,
    waits: usize,
}

impl HeadlessPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes every shown image to `<dir>/<window>.png`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Answers the next key polls in order; `None` entries are polls that time
    /// out.
    pub fn with_keys(mut self, keys: impl IntoIterator<Item = Option<char>>) -> Self {
        self.keys = keys.into_iter().collect();
        self
    }

    pub fn windows(&self) -> &[String] {
        &self.windows
    }

    /// Window names in the order images were shown.
    pub fn shows(&self) -> &[String] {
        &self.shows
    }

    pub fn show_count(&self, window: &str) -> usize {
        self.shows.iter().filter(|name| *name == window).count()
    }

    pub fn waits(&self) -> usize {
        self.waits
    }

    /// File the latest image of `window` is written to, if saving is enabled.
    pub fn path_for(&self, window: &str) -> Option<PathBuf> {
        let file: String = window
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.output_dir
            .as_ref()
            .map(|dir| dir.join(format!("{file}.png")))
    }
}

impl Presenter for HeadlessPresenter {
    fn named_window(&mut self, name: &str) -> Result<()> {
        if !self.windows.iter().any(|w| w == name) {
            self.windows.push(name.to_string());
        }
        Ok(())
    }

    fn show(&mut self, window: &str, image: ImageRef<'_>) -> Result<()> {
        self.named_window(window)?;
        if let Some(path) = self.path_for(window) {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            image.save_png(&path)?;
            debug!(window, path = %path.display(), "saved window image");
        }
        self.shows.push(window.to_string());
        Ok(())
    }

    fn wait_key(&mut self, _timeout: Option<Duration>) -> Result<Option<char>> {
        self.waits += 1;
        Ok(self.keys.pop_front().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn scripted_keys_then_silence() {
        let mut presenter = HeadlessPresenter::new().with_keys([None, Some('q')]);
        assert_eq!(presenter.wait_key(Some(Duration::from_millis(1))).unwrap(), None);
        assert_eq!(presenter.wait_key(Some(Duration::from_millis(1))).unwrap(), Some('q'));
        assert_eq!(presenter.wait_key(None).unwrap(), None);
        assert_eq!(presenter.waits(), 3);
    }

    #[test]
    fn shown_images_are_written_per_window() {
        let dir = tempfile::tempdir().unwrap();
        let mut presenter = HeadlessPresenter::new().with_output_dir(dir.path());

        let color = RgbImage::from_pixel(6, 4, Rgb([1, 2, 3]));
        let gray = GrayImage::from_pixel(3, 5, Luma([9]));
        presenter.show("imageIn", (&color).into()).unwrap();
        presenter.show("channels[0] (blue)", (&gray).into()).unwrap();
        presenter.show("imageIn", (&color).into()).unwrap();

        assert_eq!(presenter.windows(), ["imageIn", "channels[0] (blue)"]);
        assert_eq!(presenter.show_count("imageIn"), 2);

        let gray_path = presenter.path_for("channels[0] (blue)").unwrap();
        assert_eq!(image::image_dimensions(&gray_path).unwrap(), (3, 5));
        let decoded = image::open(dir.path().join("imageIn.png")).unwrap();
        assert_eq!(decoded.to_rgb8().get_pixel(5, 3), &Rgb([1, 2, 3]));
    }

    #[test]
    fn without_output_dir_nothing_is_written() {
        let mut presenter = HeadlessPresenter::new();
        presenter.show("imageIn", (&RgbImage::new(2, 2)).into()).unwrap();
        assert!(presenter.path_for("imageIn").is_none());
        assert_eq!(presenter.shows(), ["imageIn"]);
    }
}
