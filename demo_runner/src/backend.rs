// THEORY:
// OpenCV-backed implementations of the seams `cv_demos` exposes. These are what
// the binaries run; the library only ever sees the traits.
// - `HighGuiPresenter`: real windows and key polling through `highgui`.
// - `OpenCvCapture`: FFmpeg video decoding through `videoio`.
// - `DisFlow`: OpenCV's DIS dense optical flow.
// - `OpenCvBlobDetector`: OpenCV's own `SimpleBlobDetector`.
//
// OpenCV hands out BGR frames; they are converted to the RGB layout of the
// library at this boundary, and RGB images are converted back to BGR before
// they are shown.

use cv_demos::core_modules::blob_detector::blob_detector::BlobParams;
use cv_demos::core_modules::color::rgb_from_bgr;
use cv_demos::core_modules::keypoint::{KeyPoint, KeypointDetector};
use cv_demos::core_modules::optical_flow::{FlowEstimator, FlowPreset, MotionField};
use cv_demos::core_modules::video::{FrameSource, open_video};
use cv_demos::{DemoError, ImageRef, Presenter};
use image::{GrayImage, RgbImage};
use opencv::core::{self, Mat, Ptr, Scalar, Vector};
use opencv::prelude::*;
use opencv::{features2d, highgui, video, videoio};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

type Result<T> = cv_demos::Result<T>;

fn backend_err(err: opencv::Error) -> DemoError {
    DemoError::Backend(err.to_string())
}

/// Copies an image into a freshly allocated 8-bit Mat (BGR for color).
fn to_mat(image: ImageRef<'_>) -> opencv::Result<Mat> {
    let (width, height) = image.dimensions();
    let (bytes, kind) = match image {
        ImageRef::Color(rgb) => {
            let bgr: Vec<u8> = rgb
                .as_raw()
                .chunks_exact(3)
                .flat_map(|px| [px[2], px[1], px[0]])
                .collect();
            (bgr, core::CV_8UC3)
        }
        ImageRef::Gray(gray) => (gray.as_raw().clone(), core::CV_8UC1),
    };
    let mut mat =
        Mat::new_rows_cols_with_default(height as i32, width as i32, kind, Scalar::all(0.0))?;
    mat.data_bytes_mut()?.copy_from_slice(&bytes);
    Ok(mat)
}

#[derive(Debug, Default)]
pub struct HighGuiPresenter {
    windows: Vec<String>,
}

impl HighGuiPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for HighGuiPresenter {
    fn named_window(&mut self, name: &str) -> Result<()> {
        if !self.windows.iter().any(|w| w == name) {
            highgui::named_window(name, highgui::WINDOW_AUTOSIZE).map_err(backend_err)?;
            self.windows.push(name.to_string());
        }
        Ok(())
    }

    fn show(&mut self, window: &str, image: ImageRef<'_>) -> Result<()> {
        self.named_window(window)?;
        let mat = to_mat(image).map_err(backend_err)?;
        highgui::imshow(window, &mat).map_err(backend_err)
    }

    fn wait_key(&mut self, timeout: Option<Duration>) -> Result<Option<char>> {
        let delay = timeout.map_or(0, |d| d.as_millis().clamp(1, i32::MAX as u128) as i32);
        let key = highgui::wait_key(delay).map_err(backend_err)?;
        if key < 0 {
            return Ok(None);
        }
        Ok(char::from_u32((key & 0xFF) as u32))
    }
}

impl Drop for HighGuiPresenter {
    fn drop(&mut self) {
        if self.windows.is_empty() {
            return;
        }
        if let Err(err) = highgui::destroy_all_windows() {
            debug!(error = %err, "failed to destroy windows");
        }
    }
}

/// A video file decoded by OpenCV's FFmpeg backend.
pub struct OpenCvCapture {
    capture: videoio::VideoCapture,
    width: u32,
    height: u32,
    fps: f64,
}

impl OpenCvCapture {
    pub fn open(path: &Path) -> Result<Self> {
        let name = path.to_string_lossy();
        let capture =
            videoio::VideoCapture::from_file(&name, videoio::CAP_FFMPEG).map_err(backend_err)?;
        if !capture.is_opened().map_err(backend_err)? {
            return Err(DemoError::Capture(format!("cannot open {name}")));
        }
        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH).map_err(backend_err)? as u32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT).map_err(backend_err)? as u32;
        let fps = capture.get(videoio::CAP_PROP_FPS).map_err(backend_err)?;
        Ok(Self {
            capture,
            width,
            height,
            fps,
        })
    }
}

impl FrameSource for OpenCvCapture {
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
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame).map_err(backend_err)? || frame.empty() {
            return Ok(None);
        }
        let bytes = frame.data_bytes().map_err(backend_err)?;
        rgb_from_bgr(bytes, frame.cols() as u32, frame.rows() as u32).map(Some)
    }

    fn release(self: Box<Self>) -> Result<()> {
        let mut this = *self;
        this.capture.release().map_err(backend_err)
    }
}

/// Image sequences and GIFs keep their `image` crate readers; everything else goes
/// through FFmpeg.
pub fn open_capture(path: &Path) -> Result<Box<dyn FrameSource>> {
    let is_gif = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"));
    if path.is_dir() || is_gif {
        return open_video(path);
    }
    Ok(Box::new(OpenCvCapture::open(path)?))
}

pub struct DisFlow {
    inner: Ptr<video::DISOpticalFlow>,
}

impl DisFlow {
    pub fn new(preset: FlowPreset) -> Result<Self> {
        let code = match preset {
            FlowPreset::UltraFast => video::DISOpticalFlow_PRESET_ULTRAFAST,
            FlowPreset::Fast => video::DISOpticalFlow_PRESET_FAST,
            FlowPreset::Medium => video::DISOpticalFlow_PRESET_MEDIUM,
        };
        let inner = video::DISOpticalFlow::create(code).map_err(backend_err)?;
        Ok(Self { inner })
    }
}

impl FlowEstimator for DisFlow {
    fn calc(&mut self, prev: &GrayImage, next: &GrayImage) -> Result<MotionField> {
        if prev.dimensions() != next.dimensions() {
            return Err(DemoError::SizeMismatch(format!(
                "flow frames differ: {:?} vs {:?}",
                prev.dimensions(),
                next.dimensions()
            )));
        }
        let prev_mat = to_mat(ImageRef::Gray(prev)).map_err(backend_err)?;
        let next_mat = to_mat(ImageRef::Gray(next)).map_err(backend_err)?;
        let mut flow = Mat::default();
        self.inner
            .calc(&prev_mat, &next_mat, &mut flow)
            .map_err(backend_err)?;

        let mut field = MotionField::new(prev.width(), prev.height());
        let vectors = flow.data_typed::<core::Vec2f>().map_err(backend_err)?;
        for (i, uv) in vectors.iter().enumerate() {
            field.u[i] = uv[0];
            field.v[i] = uv[1];
        }
        Ok(field)
    }

    fn name(&self) -> &str {
        "opencv-dis"
    }
}

pub struct OpenCvBlobDetector {
    inner: Ptr<features2d::SimpleBlobDetector>,
}

impl OpenCvBlobDetector {
    pub fn new(params: &BlobParams) -> Result<Self> {
        params.validate()?;
        let mut cv = features2d::SimpleBlobDetector_Params::default().map_err(backend_err)?;
        cv.threshold_step = params.threshold_step;
        cv.min_threshold = params.min_threshold;
        cv.max_threshold = params.max_threshold;
        cv.min_repeatability = params.min_repeatability;
        cv.min_dist_between_blobs = params.min_dist_between_blobs;
        cv.filter_by_color = params.filter_by_color;
        cv.blob_color = params.blob_color;
        cv.filter_by_area = params.area.enabled;
        cv.min_area = params.area.min;
        cv.max_area = params.area.max;
        cv.filter_by_circularity = params.circularity.enabled;
        cv.min_circularity = params.circularity.min;
        cv.max_circularity = params.circularity.max;
        cv.filter_by_inertia = params.inertia.enabled;
        cv.min_inertia_ratio = params.inertia.min;
        cv.max_inertia_ratio = params.inertia.max;
        cv.filter_by_convexity = params.convexity.enabled;
        cv.min_convexity = params.convexity.min;
        cv.max_convexity = params.convexity.max;

        let inner = features2d::SimpleBlobDetector::create(cv).map_err(backend_err)?;
        Ok(Self { inner })
    }
}

impl KeypointDetector for OpenCvBlobDetector {
    fn detect_keypoints(&mut self, image: &GrayImage) -> Result<Vec<KeyPoint>> {
        let mat = to_mat(ImageRef::Gray(image)).map_err(backend_err)?;
        let mut found = Vector::<core::KeyPoint>::new();
        self.inner
            .detect(&mat, &mut found, &core::no_array())
            .map_err(backend_err)?;

        Ok(found
            .iter()
            .map(|kp| {
                let pt = kp.pt();
                let angle = kp.angle();
                KeyPoint {
                    x: pt.x,
                    y: pt.y,
                    size: kp.size(),
                    angle: (angle >= 0.0).then_some(angle),
                    response: kp.response(),
                }
            })
            .collect())
    }
}
