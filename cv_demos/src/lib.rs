// THEORY:
// This file is the main entry point for the `cv_demos` library crate.
// Each teaching demo (annotation, containers, equalize, normalize, blob, optic
// flow) is a short, linear program. The programs themselves live in `demos`,
// and every one of them is an ordinary function that receives its arguments,
// an explicit `DemoConfig`, a `Presenter` to show images on, and an output sink
// for the human-readable diagnostics. Nothing is read from globals, so tests can
// drive a demo end to end and look at what it printed and what it showed.
//
// The image-level building blocks the demos call into are grouped under
// `core_modules`; they are thin, mostly delegating wrappers around `image` and
// `imageproc`. The binaries in the `demo_runner` crate are the only place that
// knows about real windows or OpenCV.

pub mod config;
pub mod core_modules;
pub mod demos;
pub mod error;
pub mod presenter;

pub use config::{DemoConfig, ExitPolicy};
pub use demos::Outcome;
pub use error::{DemoError, Result};
pub use presenter::{HeadlessPresenter, ImageRef, Presenter};
