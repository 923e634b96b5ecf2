//! Flags shared by every demo binary.

use anyhow::{Context, Result};
use clap::Parser;
use cv_demos::{DemoConfig, ExitPolicy};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "OpenCV-style teaching demo")]
pub struct Cli {
    /// TOML file overriding the built-in demo configuration.
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,
    /// Exit with 2 on usage errors and 1 on unreadable inputs instead of 0.
    #[arg(long)]
    pub strict_exit: bool,
    /// Save every window as a PNG in DIR instead of opening windows.
    #[arg(long, value_name = "DIR")]
    pub headless: Option<PathBuf>,
    /// Positional inputs, handed to the demo unchanged. Flags may come before
    /// or after them.
    pub inputs: Vec<String>,
}

impl Cli {
    /// Loads the configuration and applies the flags that override it.
    pub fn demo_config(&self) -> Result<DemoConfig> {
        let mut config = DemoConfig::load(self.config.as_deref()).with_context(|| {
            format!(
                "failed to load config {}",
                self.config.as_deref().map(|p| p.display().to_string()).unwrap_or_default()
            )
        })?;
        if self.strict_exit {
            config.exit_policy = ExitPolicy::Strict;
        }
        Ok(config)
    }

    /// Argument vector as the demo sees it: program name, then the inputs.
    pub fn argv(&self, program: impl Into<String>) -> Vec<String> {
        std::iter::once(program.into())
            .chain(self.inputs.iter().cloned())
            .collect()
    }
}
