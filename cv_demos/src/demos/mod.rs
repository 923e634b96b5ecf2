// THEORY:
// Each submodule is one teaching program, written as a plain entry function:
//
//     run(args, config, presenter, out) -> Result<Outcome>
//
// The blob program also takes its keypoint detector, and the video program its
// frame source opener and flow estimator, as trailing parameters, so the
// binaries decide which backend does the work. `args` is the full argument
// vector, program name first. Whatever a program has to say to its user (usage
// lines, "Error while opening file ...", image metadata, min/max values) is
// written to `out`. The two expected failure modes, bad arity and an unreadable
// input, are *outcomes*, not errors: the program prints its message and ends
// normally. `DemoError` is reserved for everything else (a failed write, a
// broken presenter, bad detector parameters).

use crate::config::DemoConfig;
use crate::core_modules::raster::{ImageInfo, load_color};
use crate::error::Result;
use image::RgbImage;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod annotation;
pub mod blob;
pub mod containers;
pub mod equalize;
pub mod normalize;
pub mod optic_flow;

/// How a demo ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Wrong number of arguments; carries the printed usage line.
    UsageError(String),
    /// The input could not be opened; carries the printed diagnostic.
    AcquisitionError(String),
}

/// Unwraps the inner value of a `Result<Result<T, Outcome>>` step, returning
/// early with the outcome when the step ended the demo.
macro_rules! step {
    ($expr:expr) => {
        match $expr? {
            Ok(value) => value,
            Err(outcome) => return Ok(outcome),
        }
    };
}
pub(crate) use step;

pub(crate) fn program_name<'a>(args: &'a [String], fallback: &'a str) -> &'a str {
    args.first().map(String::as_str).unwrap_or(fallback)
}

/// The image path of a `<prog> <image_path>` demo, or its usage line.
pub(crate) fn image_path_arg(
    args: &[String],
    config: &DemoConfig,
    fallback_name: &str,
    out: &mut dyn Write,
) -> Result<std::result::Result<PathBuf, Outcome>> {
    if args.len() != config.expected_args + 1 {
        let usage = format!("USAGE: {} <image_path> ", program_name(args, fallback_name));
        writeln!(out, "{usage}")?;
        return Ok(Err(Outcome::UsageError(usage)));
    }
    Ok(Ok(PathBuf::from(&args[1])))
}

/// Decodes `path` as color, or prints the acquisition diagnostic.
pub(crate) fn acquire_image(
    path: &Path,
    out: &mut dyn Write,
) -> Result<std::result::Result<RgbImage, Outcome>> {
    match load_color(path) {
        Ok(image) => Ok(Ok(image)),
        Err(err) => {
            debug!(error = %err, "image acquisition failed");
            let message = format!("Error while opening file {}", path.display());
            writeln!(out, "{message}")?;
            Ok(Err(Outcome::AcquisitionError(message)))
        }
    }
}

pub(crate) fn print_info(info: &ImageInfo, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "image width: {}", info.width)?;
    writeln!(out, "image height: {}", info.height)?;
    writeln!(out, "image channels: {}", info.channels)?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn wrong_arity_prints_usage_with_program_name() {
        let config = DemoConfig::default();
        let mut out = Vec::new();

        let result = image_path_arg(&args(&["./cv_equalize"]), &config, "cv_equalize", &mut out)
            .unwrap();

        assert_eq!(
            result,
            Err(Outcome::UsageError("USAGE: ./cv_equalize <image_path> ".into()))
        );
        assert_eq!(text(out), "USAGE: ./cv_equalize <image_path> \n");
    }

    #[test]
    fn expected_arity_comes_from_config() {
        let config = DemoConfig {
            expected_args: 2,
            ..DemoConfig::default()
        };
        let mut out = Vec::new();

        let one = image_path_arg(&args(&["p", "a.png"]), &config, "p", &mut out).unwrap();
        assert!(matches!(one, Err(Outcome::UsageError(_))));

        let two = image_path_arg(&args(&["p", "a.png", "b"]), &config, "p", &mut out).unwrap();
        assert_eq!(two, Ok(PathBuf::from("a.png")));
    }

    #[test]
    fn empty_args_fall_back_to_the_known_name() {
        let mut out = Vec::new();
        image_path_arg(&[], &DemoConfig::default(), "cv_blob", &mut out).unwrap();
        assert_eq!(text(out), "USAGE: cv_blob <image_path> \n");
    }

    #[test]
    fn unreadable_file_prints_exact_diagnostic() {
        let mut out = Vec::new();
        let result = acquire_image(Path::new("missing.png"), &mut out).unwrap();
        assert_eq!(
            result,
            Err(Outcome::AcquisitionError("Error while opening file missing.png".into()))
        );
        assert_eq!(text(out), "Error while opening file missing.png\n");
    }
}
