// THEORY:
// The video viewer is a three-state machine driven by the frame source and the
// presenter's key poll:
//
//     Running --(quit key)--------> Stopped
//     Running --(end of stream)---> StoppedEof
//
// Every Running iteration reads one frame, converts it to gray, estimates the
// flow against the previous gray frame (when an estimator is configured and a
// previous frame exists), shows the frame and the flow visualization, and polls
// for a key with a short timeout. Only the previous gray frame survives from one
// iteration to the next.
//
// The frame source is owned by the viewer and released exactly once, whether
// the loop ends in a terminal state or a read fails. `release` consumes the
// source, so a second release cannot be written.

use crate::core_modules::color::to_grayscale;
use crate::core_modules::optical_flow::{FlowEstimator, flow_to_rgb};
use crate::core_modules::raster::load_color;
use crate::error::{DemoError, Result};
use crate::presenter::{ImageRef, Presenter};
use image::{AnimationDecoder, GrayImage, RgbImage};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// An open stream of color frames.
pub trait FrameSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Nominal frame rate, 0 when unknown.
    fn fps(&self) -> f64;
    /// Next frame, or `Ok(None)` once the stream is exhausted.
    fn read_frame(&mut self) -> Result<Option<RgbImage>>;
    /// Closes the stream.
    fn release(self: Box<Self>) -> Result<()>;
}

/// Frames of an animated GIF, decoded one at a time as they are read.
pub struct GifFrameSource {
    frames: image::Frames<'static>,
    pending: Option<RgbImage>,
    decoded: usize,
    width: u32,
    height: u32,
    fps: f64,
}

impl std::fmt::Debug for GifFrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifFrameSource")
            .field("decoded", &self.decoded)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("fps", &self.fps)
            .finish()
    }
}

impl GifFrameSource {
    /// Decodes only the first frame; the rest are decoded by `read_frame`.
    pub fn open(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let decoder = image::codecs::gif::GifDecoder::new(reader)?;
        let mut frames = decoder.into_frames();

        let Some(first) = frames.next().transpose()? else {
            return Err(DemoError::Capture(format!(
                "{} contains no frames",
                path.display()
            )));
        };
        let (numer, denom) = first.delay().numer_denom_ms();
        let fps = if numer == 0 {
            0.0
        } else {
            1000.0 * denom as f64 / numer as f64
        };
        let first = rgb_from_frame(first);
        let (width, height) = first.dimensions();

        Ok(Self {
            frames,
            pending: Some(first),
            decoded: 1,
            width,
            height,
            fps,
        })
    }
}

fn rgb_from_frame(frame: image::Frame) -> RgbImage {
    image::DynamicImage::ImageRgba8(frame.into_buffer()).to_rgb8()
}

impl FrameSource for GifFrameSource {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn read_frame(&mut self) -> Result<Option<RgbImage>> {
        if let Some(first) = self.pending.take() {
            return Ok(Some(first));
        }
        let Some(frame) = self.frames.next().transpose()? else {
            return Ok(None);
        };
        self.decoded += 1;
        Ok(Some(rgb_from_frame(frame)))
    }

    fn release(self: Box<Self>) -> Result<()> {
        debug!(decoded = self.decoded, "released gif source");
        Ok(())
    }
}

/// A directory of still images played back in file-name order.
#[derive(Debug)]
pub struct ImageSequenceSource {
    paths: std::vec::IntoIter<PathBuf>,
    width: u32,
    height: u32,
    fps: f64,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path) -> Result<Self> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && image::ImageFormat::from_path(path).is_ok())
            .collect();
        paths.sort();

        let Some(first) = paths.first() else {
            return Err(DemoError::Capture(format!(
                "{} contains no images",
                dir.display()
            )));
        };
        let (width, height) = image::image_dimensions(first)?;

        Ok(Self {
            paths: paths.into_iter(),
            width,
            height,
            fps: 0.0,
        })
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }
}

impl FrameSource for ImageSequenceSource {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn read_frame(&mut self) -> Result<Option<RgbImage>> {
        self.paths.next().map(|path| load_color(&path)).transpose()
    }

    fn release(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Opens `path` with the `image` crate readers: a directory becomes an image
/// sequence, a `.gif` an animation.
pub fn open_video(path: &Path) -> Result<Box<dyn FrameSource>> {
    if path.is_dir() {
        return Ok(Box::new(ImageSequenceSource::open(path)?));
    }
    let is_gif = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"));
    if is_gif {
        return Ok(Box::new(GifFrameSource::open(path)?));
    }
    Err(DemoError::Capture(format!(
        "no decoder for {}",
        path.display()
    )))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// The quit key was pressed.
    Stopped,
    /// The source ran out of frames.
    StoppedEof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopReport {
    pub frames_shown: usize,
    pub state: LoopState,
}

#[derive(Debug, Clone)]
pub struct ViewerSettings<'a> {
    pub video_window: &'a str,
    pub flow_window: &'a str,
    pub quit_key: char,
    pub frame_wait: Duration,
}

/// Plays `source` until the quit key or the end of the stream, then releases
/// it.
pub fn run_viewer(
    mut source: Box<dyn FrameSource>,
    presenter: &mut dyn Presenter,
    estimator: Option<&mut dyn FlowEstimator>,
    settings: &ViewerSettings<'_>,
) -> Result<LoopReport> {
    let outcome = drive(source.as_mut(), presenter, estimator, settings);
    let released = source.release();

    match (outcome, released) {
        (Ok(report), Ok(())) => {
            info!(frames = report.frames_shown, state = ?report.state, "viewer finished");
            Ok(report)
        }
        (Ok(_), Err(err)) => Err(err),
        (Err(err), released) => {
            if let Err(release_err) = released {
                warn!(error = %release_err, "release failed after a read error");
            }
            Err(err)
        }
    }
}

fn drive(
    source: &mut dyn FrameSource,
    presenter: &mut dyn Presenter,
    mut estimator: Option<&mut dyn FlowEstimator>,
    settings: &ViewerSettings<'_>,
) -> Result<LoopReport> {
    presenter.named_window(settings.video_window)?;
    if estimator.is_some() {
        presenter.named_window(settings.flow_window)?;
    }

    let mut state = LoopState::Running;
    let mut frames_shown = 0;
    let mut prev_gray: Option<GrayImage> = None;

    while state == LoopState::Running {
        let Some(frame) = source.read_frame()? else {
            warn!(frames = frames_shown, "end of stream reached before the quit key");
            state = LoopState::StoppedEof;
            break;
        };

        let gray = to_grayscale(&frame);
        if let (Some(estimator), Some(prev)) = (estimator.as_mut(), prev_gray.as_ref()) {
            let field = estimator.calc(prev, &gray)?;
            let (u, v) = field.mean_motion();
            debug!(frame = frames_shown, mean_u = u, mean_v = v, "flow computed");
            presenter.show(settings.flow_window, ImageRef::Color(&flow_to_rgb(&field)))?;
        }

        presenter.show(settings.video_window, ImageRef::Color(&frame))?;
        frames_shown += 1;

        if presenter.wait_key(Some(settings.frame_wait))? == Some(settings.quit_key) {
            state = LoopState::Stopped;
        }
        prev_gray = Some(gray);
    }

    Ok(LoopReport {
        frames_shown,
        state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::optical_flow::testing::StillFlow;
    use crate::presenter::HeadlessPresenter;
    use image::{Rgb, Rgba, RgbaImage};
    use std::cell::Cell;
    use std::rc::Rc;

    struct ScriptedSource {
        remaining: usize,
        fail_at: Option<usize>,
        read: usize,
        releases: Rc<Cell<usize>>,
    }

    impl ScriptedSource {
        fn boxed(frames: usize, releases: &Rc<Cell<usize>>) -> Box<dyn FrameSource> {
            Box::new(Self {
                remaining: frames,
                fail_at: None,
                read: 0,
                releases: Rc::clone(releases),
            })
        }
    }

    impl FrameSource for ScriptedSource {
        fn width(&self) -> u32 {
            16
        }

        fn height(&self) -> u32 {
            16
        }

        fn fps(&self) -> f64 {
            30.0
        }

        fn read_frame(&mut self) -> Result<Option<RgbImage>> {
            if self.fail_at == Some(self.read) {
                return Err(DemoError::Capture("decoder died".into()));
            }
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            let offset = self.read as u32;
            self.read += 1;
            Ok(Some(RgbImage::from_fn(16, 16, |x, y| {
                if (4 + offset..8 + offset).contains(&x) && (4..8).contains(&y) {
                    Rgb([255, 255, 255])
                } else {
                    Rgb([0, 0, 0])
                }
            })))
        }

        fn release(self: Box<Self>) -> Result<()> {
            self.releases.set(self.releases.get() + 1);
            Ok(())
        }
    }

    fn settings() -> ViewerSettings<'static> {
        ViewerSettings {
            video_window: "Video Frame",
            flow_window: "Optical Flow",
            quit_key: 'q',
            frame_wait: Duration::from_millis(1),
        }
    }

    #[test]
    fn quit_key_stops_after_the_third_frame() {
        let releases = Rc::new(Cell::new(0));
        let mut presenter = HeadlessPresenter::new().with_keys([None, None, Some('q')]);

        let report = run_viewer(ScriptedSource::boxed(10, &releases), &mut presenter, None, &settings())
            .unwrap();

        assert_eq!(report.frames_shown, 3);
        assert_eq!(report.state, LoopState::Stopped);
        assert_eq!(releases.get(), 1);
        assert_eq!(presenter.show_count("Video Frame"), 3);
    }

    #[test]
    fn end_of_stream_is_its_own_state() {
        let releases = Rc::new(Cell::new(0));
        let mut presenter = HeadlessPresenter::new();

        let report = run_viewer(ScriptedSource::boxed(10, &releases), &mut presenter, None, &settings())
            .unwrap();

        assert_eq!(report.frames_shown, 10);
        assert_eq!(report.state, LoopState::StoppedEof);
        assert_eq!(releases.get(), 1);
        assert_eq!(presenter.waits(), 10);
    }

    #[test]
    fn other_keys_do_not_stop_the_loop() {
        let releases = Rc::new(Cell::new(0));
        let mut presenter = HeadlessPresenter::new().with_keys([Some('x'), Some('Q'), Some('q')]);

        let report = run_viewer(ScriptedSource::boxed(10, &releases), &mut presenter, None, &settings())
            .unwrap();
        assert_eq!(report.frames_shown, 3);
    }

    #[test]
    fn read_errors_still_release_once() {
        let releases = Rc::new(Cell::new(0));
        let source = Box::new(ScriptedSource {
            remaining: 10,
            fail_at: Some(2),
            read: 0,
            releases: Rc::clone(&releases),
        });
        let mut presenter = HeadlessPresenter::new();

        let result = run_viewer(source, &mut presenter, None, &settings());

        assert!(matches!(result, Err(DemoError::Capture(_))));
        assert_eq!(releases.get(), 1);
        assert_eq!(presenter.show_count("Video Frame"), 2);
    }

    #[test]
    fn flow_is_shown_from_the_second_frame_on() {
        let releases = Rc::new(Cell::new(0));
        let mut presenter = HeadlessPresenter::new();
        let mut estimator = StillFlow { calls: 0 };

        let report = run_viewer(
            ScriptedSource::boxed(4, &releases),
            &mut presenter,
            Some(&mut estimator as &mut dyn FlowEstimator),
            &settings(),
        )
        .unwrap();

        assert_eq!(report.frames_shown, 4);
        assert_eq!(presenter.show_count("Optical Flow"), 3);
        assert_eq!(presenter.shows()[0], "Video Frame");
        assert_eq!(presenter.shows()[1], "Optical Flow");
        assert_eq!(estimator.calls, 3);
    }

    #[test]
    fn gif_frames_are_played_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.gif");
        {
            let file = File::create(&path).unwrap();
            let mut encoder = image::codecs::gif::GifEncoder::new(file);
            let frames = (0..3).map(|i| {
                let buffer = RgbaImage::from_pixel(12, 8, Rgba([i * 100, 0, 0, 255]));
                image::Frame::from_parts(buffer, 0, 0, image::Delay::from_numer_denom_ms(100, 1))
            });
            encoder.encode_frames(frames).unwrap();
        }

        let mut source = open_video(&path).unwrap();
        assert_eq!((source.width(), source.height()), (12, 8));
        assert!((source.fps() - 10.0).abs() < 1e-6);

        let mut count = 0;
        while let Some(frame) = source.read_frame().unwrap() {
            assert_eq!(frame.dimensions(), (12, 8));
            count += 1;
        }
        assert_eq!(count, 3);
        source.release().unwrap();
    }

    #[test]
    fn truncated_gif_plays_its_intact_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cut.gif");
        let mut bytes = Vec::new();
        {
            let mut encoder = image::codecs::gif::GifEncoder::new(&mut bytes);
            let frames = (0..20u32).map(|i| {
                let buffer = RgbaImage::from_fn(64, 64, |x, y| {
                    Rgba([
                        (x * 37 + y * 11 + i * 5) as u8,
                        (x * y + i) as u8,
                        ((x ^ y) * 7) as u8,
                        255,
                    ])
                });
                image::Frame::from_parts(buffer, 0, 0, image::Delay::from_numer_denom_ms(40, 1))
            });
            encoder.encode_frames(frames).unwrap();
        }
        bytes.truncate(bytes.len() - 200);
        std::fs::write(&path, &bytes).unwrap();

        let source = open_video(&path).unwrap();
        assert_eq!((source.width(), source.height()), (64, 64));

        let mut presenter = HeadlessPresenter::new();
        let result = run_viewer(source, &mut presenter, None, &settings());

        assert!(matches!(result, Err(DemoError::Image(_))));
        assert!(presenter.show_count("Video Frame") >= 10);
    }

    #[test]
    fn image_sequences_play_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for (name, value) in [("002.png", 20u8), ("001.png", 10), ("003.png", 30)] {
            RgbImage::from_pixel(4, 4, Rgb([value, value, value]))
                .save(dir.path().join(name))
                .unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

        let mut source = open_video(dir.path()).unwrap();
        let mut seen = Vec::new();
        while let Some(frame) = source.read_frame().unwrap() {
            seen.push(frame.get_pixel(0, 0).0[0]);
        }
        assert_eq!(seen, vec![10, 20, 30]);
    }

    #[test]
    fn unknown_or_missing_sources_fail_to_open() {
        assert!(open_video(Path::new("no/such/clip.gif")).is_err());
        assert!(open_video(Path::new("clip.mp4")).is_err());
        let empty = tempfile::tempdir().unwrap();
        assert!(matches!(open_video(empty.path()), Err(DemoError::Capture(_))));
    }
}
