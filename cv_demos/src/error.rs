use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, DemoError>;

/// Failures that are not part of a demo's normal usage/acquisition contract.
///
/// Usage and acquisition problems are reported through [`crate::Outcome`]
/// instead, since the demos answer them with a printed message rather than an
/// error.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Image size mismatch: {0}")]
    SizeMismatch(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("video source error: {0}")]
    Capture(String),

    #[error("vision backend error: {0}")]
    Backend(String),
}
