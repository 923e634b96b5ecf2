// THEORY:
// The video demo opens a stream, reports its geometry, and hands it to the
// viewer loop in `core_modules::video`. Where frames come from and how flow is
// estimated are both injected: the binary passes the OpenCV capture and DIS
// flow, tests pass `open_video` and a stand-in estimator.

use super::{Outcome, program_name, step};
use crate::config::DemoConfig;
use crate::core_modules::optical_flow::FlowEstimator;
use crate::core_modules::video::{FrameSource, ViewerSettings, run_viewer};
use crate::error::Result;
use crate::presenter::Presenter;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Opens a frame source for a path.
pub type SourceOpener<'a> = &'a dyn Fn(&Path) -> Result<Box<dyn FrameSource>>;

fn file_path_arg(args: &[String], out: &mut dyn Write) -> Result<std::result::Result<PathBuf, Outcome>> {
    if args.len() != 2 {
        let usage = format!("USAGE:{} <file_path", program_name(args, "cv_optic_flow"));
        writeln!(out, "{usage}")?;
        return Ok(Err(Outcome::UsageError(usage)));
    }
    Ok(Ok(PathBuf::from(&args[1])))
}

/// Plays the video named on the command line, with flow when enabled.
pub fn run(
    args: &[String],
    config: &DemoConfig,
    presenter: &mut dyn Presenter,
    out: &mut dyn Write,
    open: SourceOpener<'_>,
    estimator: &mut dyn FlowEstimator,
) -> Result<Outcome> {
    // --- 1. Arguments ---
    let path = step!(file_path_arg(args, out));
    writeln!(out, "{}", path.display())?;

    // --- 2. Acquisition ---
    let source = match open(&path) {
        Ok(source) => source,
        Err(err) => {
            debug!(error = %err, "video acquisition failed");
            let message = "Unable to open video source, terminating program! ".to_string();
            writeln!(out, "{message}")?;
            return Ok(Outcome::AcquisitionError(message));
        }
    };
    writeln!(
        out,
        "Video source opened successfully (width={} height={} fps={})!",
        source.width(),
        source.height(),
        source.fps() as i64
    )?;

    // --- 3. Viewing loop ---
    writeln!(out, "Starting tracker, press '{}' to quit", config.quit_key)?;
    let settings = ViewerSettings {
        video_window: &config.windows.video,
        flow_window: &config.windows.flow,
        quit_key: config.quit_key,
        frame_wait: config.frame_wait(),
    };
    let estimator = config.flow.enabled.then_some(estimator);
    if let Some(estimator) = &estimator {
        info!(estimator = estimator.name(), "optical flow enabled");
    }
    let report = run_viewer(source, presenter, estimator, &settings)?;
    debug!(?report, "viewer report");

    Ok(Outcome::Completed)
}
