// THEORY:
// Every fixed value a demo relies on (argument count, window titles, the fixed
// `test.png` input, the `'q'` quit key) is a field of `DemoConfig`. A config
// value is built once by the caller (defaults, optionally overlaid from a TOML
// file) and passed by reference into each demo's entry function. Tests
// construct their own values to vary these knobs.

use crate::core_modules::blob_detector::blob_detector::BlobParams;
use crate::core_modules::optical_flow::FlowPreset;
use crate::demos::Outcome;
use crate::error::{DemoError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How demo outcomes translate into a process exit status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitPolicy {
    /// Every outcome exits with 0, including usage and acquisition failures.
    #[default]
    Compatible,
    /// Usage errors exit with 2, acquisition errors with 1.
    Strict,
}

impl ExitPolicy {
    pub fn exit_code(&self, outcome: &Outcome) -> i32 {
        match (self, outcome) {
            (ExitPolicy::Compatible, _) => 0,
            (ExitPolicy::Strict, Outcome::Completed) => 0,
            (ExitPolicy::Strict, Outcome::AcquisitionError(_)) => 1,
            (ExitPolicy::Strict, Outcome::UsageError(_)) => 2,
        }
    }
}

/// Titles of the display surfaces the demos open.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowNames {
    pub input: String,
    pub gray: String,
    pub roi: String,
    pub resized: String,
    pub equalized: String,
    pub normalized: String,
    pub keypoints: String,
    /// Blue, green and red channel windows, in that order.
    pub channels: [String; 3],
    pub video: String,
    pub flow: String,
}

impl Default for WindowNames {
    fn default() -> Self {
        Self {
            input: "imageIn".into(),
            gray: "imageGray".into(),
            roi: "imageROI".into(),
            resized: "imageResized".into(),
            equalized: "imageEqualized".into(),
            normalized: "imageNormalized".into(),
            keypoints: "imageKeypoints".into(),
            channels: [
                "channels[0] (blue)".into(),
                "channels[1] (green)".into(),
                "channels[2] (red)".into(),
            ],
            video: "Video Frame".into(),
            flow: "Optical Flow".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// When false the viewer only shows raw frames and skips flow entirely.
    pub enabled: bool,
    pub preset: FlowPreset,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            preset: FlowPreset::Medium,
        }
    }
}

/// Configuration for the demos, passed explicitly into every entry function.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of positional arguments the path-taking demos require.
    pub expected_args: usize,
    /// Input used by the demos that take no arguments.
    pub fixed_input: PathBuf,
    /// Where the containers demo writes its half-size image.
    pub resize_output: PathBuf,
    /// Key that moves the video viewer from Running to Stopped.
    pub quit_key: char,
    /// Key polling timeout between video frames, in milliseconds.
    pub frame_wait_ms: u64,
    pub exit_policy: ExitPolicy,
    /// Dump every pixel of the resized image in the containers demo.
    pub print_pixels: bool,
    pub windows: WindowNames,
    /// Blob detector settings. Defaults to the demo's tuned values, and keys
    /// left out of a `[blob]` table keep those values. A nested filter table
    /// such as `[blob.area]` is read as a whole `FilterRange`.
    #[serde(default = "BlobParams::demo_preset")]
    pub blob: BlobParams,
    pub flow: FlowConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            expected_args: 1,
            fixed_input: PathBuf::from("test.png"),
            resize_output: PathBuf::from("OUTPUT.png"),
            quit_key: 'q',
            frame_wait_ms: 1,
            exit_policy: ExitPolicy::Compatible,
            print_pixels: true,
            windows: WindowNames::default(),
            blob: BlobParams::demo_preset(),
            flow: FlowConfig::default(),
        }
    }
}

impl DemoConfig {
    /// Reads a TOML config file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text).map_err(|source| DemoError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Defaults, or the given file when one is provided.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn frame_wait(&self) -> Duration {
        Duration::from_millis(self.frame_wait_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_programs() {
        let config = DemoConfig::default();
        assert_eq!(config.expected_args, 1);
        assert_eq!(config.fixed_input, PathBuf::from("test.png"));
        assert_eq!(config.resize_output, PathBuf::from("OUTPUT.png"));
        assert_eq!(config.quit_key, 'q');
        assert_eq!(config.windows.video, "Video Frame");
        assert_eq!(config.blob.min_threshold, 10.0);
        assert_eq!(config.blob.max_threshold, 250.0);
        assert!(!config.blob.convexity.enabled);
    }

    #[test]
    fn toml_overrides_only_what_it_names() {
        let config = DemoConfig::from_toml_str(
            r#"
            expected_args = 2
            quit_key = "x"
            exit_policy = "strict"

            [windows]
            video = "Clip"

            [flow]
            preset = "ultra_fast"
            "#,
        )
        .unwrap();

        assert_eq!(config.expected_args, 2);
        assert_eq!(config.quit_key, 'x');
        assert_eq!(config.exit_policy, ExitPolicy::Strict);
        assert_eq!(config.windows.video, "Clip");
        assert_eq!(config.windows.input, "imageIn");
        assert_eq!(config.flow.preset, FlowPreset::UltraFast);
        assert!(config.flow.enabled);
        assert_eq!(config.blob.area.min, 200.0);
    }

    #[test]
    fn partial_blob_table_keeps_the_demo_tuning() {
        let config = DemoConfig::from_toml_str(
            r#"
            [blob]
            min_threshold = 30.0
            "#,
        )
        .unwrap();

        let demo = BlobParams::demo_preset();
        assert_eq!(config.blob.min_threshold, 30.0);
        assert_eq!(config.blob.max_threshold, demo.max_threshold);
        assert_eq!(config.blob.area, demo.area);
        assert_eq!(config.blob.circularity, demo.circularity);
        assert!(!config.blob.convexity.enabled);
        assert!(config.blob.validate().is_ok());
    }

    #[test]
    fn compatible_policy_never_fails_the_process() {
        let policy = ExitPolicy::Compatible;
        assert_eq!(policy.exit_code(&Outcome::Completed), 0);
        assert_eq!(policy.exit_code(&Outcome::UsageError("usage".into())), 0);
        assert_eq!(policy.exit_code(&Outcome::AcquisitionError("missing".into())), 0);
    }

    #[test]
    fn strict_policy_distinguishes_failures() {
        let policy = ExitPolicy::Strict;
        assert_eq!(policy.exit_code(&Outcome::Completed), 0);
        assert_eq!(policy.exit_code(&Outcome::AcquisitionError("missing".into())), 1);
        assert_eq!(policy.exit_code(&Outcome::UsageError("usage".into())), 2);
    }

    #[test]
    fn bad_config_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.toml");
        std::fs::write(&path, "expected_args = \"one\"").unwrap();

        let err = DemoConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, DemoError::Config { .. }));
        assert!(err.to_string().contains("demo.toml"));
    }
}
