// THEORY:
// Every binary in this crate is a one-liner around `launch`. `launch` owns the
// process-level concerns the demo entry functions stay out of:
// 1.  Logger initialization (`utils::init_logger`).
// 2.  Flag parsing (`cli::Cli`) and configuration loading.
// 3.  Choosing a presenter: OpenCV windows, or PNG files under
//     `--headless <dir>`.
// 4.  Mapping the demo's `Outcome` to a process exit status through the
//     configured `ExitPolicy`.

pub mod backend;
pub mod cli;
pub mod utils;

use anyhow::Result;
use clap::Parser;
use cv_demos::{DemoConfig, HeadlessPresenter, Outcome, Presenter};
use std::io::Write;
use tracing::{debug, info};

pub use cli::Cli;

/// Picks the display backend for this run.
pub fn presenter_for(cli: &Cli) -> Result<Box<dyn Presenter>> {
    if let Some(dir) = &cli.headless {
        info!(dir = %dir.display(), "headless mode, windows are written as PNG files");
        return Ok(Box::new(HeadlessPresenter::new().with_output_dir(dir)));
    }
    Ok(Box::new(backend::HighGuiPresenter::new()))
}

/// Runs one demo program as a process: parses flags, builds the presenter,
/// calls `entry`, and exits with the status the outcome maps to.
pub fn launch<F>(name: &str, entry: F) -> Result<()>
where
    F: FnOnce(&[String], &DemoConfig, &mut dyn Presenter, &mut dyn Write) -> cv_demos::Result<Outcome>,
{
    utils::init_logger();

    let cli = Cli::parse();
    let config = cli.demo_config()?;
    let program = std::env::args().next().unwrap_or_else(|| name.to_string());
    let argv = cli.argv(program);
    let mut presenter = presenter_for(&cli)?;
    debug!(?argv, policy = ?config.exit_policy, "starting {name}");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = entry(&argv, &config, presenter.as_mut(), &mut out)?;
    out.flush()?;
    drop(out);

    let code = config.exit_policy.exit_code(&outcome);
    info!(?outcome, code, "{name} finished");
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
