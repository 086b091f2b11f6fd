//! Command handlers behind the CLI.
//!
//! Each command loads the configuration itself so that `main` only deals with
//! process concerns (output sink, exit status).

pub mod run;
pub mod window;

use anyhow::{Context, Result};

use crate::args::RunOptions;
use crate::config::{self, Config};
use crate::time_source::{FixedTimeSource, RealTimeSource, TimeSource};

/// Print the header and load the configuration named by `options`.
pub(crate) fn load_config(options: &RunOptions) -> Result<Config> {
    log_version!();
    if options.debug_enabled {
        log_pipe!();
        log_debug!("Debug mode enabled");
    }

    let config = Config::load(options.config_path.as_deref()).context("Configuration failed")?;

    let source = options
        .config_path
        .clone()
        .or_else(|| config::default_config_path().filter(|path| path.exists()));
    config.log_config(source.as_deref());

    Ok(config)
}

/// The clock a command should use: pinned by `--at`, else the system clock.
pub(crate) fn time_source(options: &RunOptions) -> Box<dyn TimeSource> {
    match options.at {
        Some(at) => Box::new(FixedTimeSource::new(at)),
        None => Box::new(RealTimeSource),
    }
}
