//! `daylapse run`: build today's video for every configured camera.

use anyhow::Result;

use super::{load_config, time_source};
use crate::args::RunOptions;
use crate::daylapse::Daylapse;
use crate::encoder::FfmpegEncoder;

/// Returns the process exit status derived from the run summary.
pub fn handle_run_command(options: &RunOptions) -> Result<i32> {
    let config = load_config(options)?;
    let encoder = FfmpegEncoder::from_config(&config);

    if options.dry_run {
        log_block_start!("Dry run: no manifest is written and the encoder is not started");
    }

    let summary = Daylapse::new(config, Box::new(encoder))
        .with_time_source(time_source(options))
        .debug(options.debug_enabled)
        .dry_run(options.dry_run)
        .run()?;

    summary.log_summary();
    log_end!();

    Ok(summary.exit_code())
}
