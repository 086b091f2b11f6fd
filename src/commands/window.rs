//! `daylapse window`: print the window a run would use, touching no files.

use anyhow::{Context, Result};

use super::{load_config, time_source};
use crate::args::RunOptions;
use crate::common::constants::{TEMP_DIR_NAME, VIDEO_EXTENSION};
use crate::common::utils::private_path;
use crate::geo::{Window, log_window_details};

pub fn handle_window_command(options: &RunOptions) -> Result<Window> {
    let config = load_config(options)?;
    let now = time_source(options).now();

    let calculator = config.calculator();
    let window = calculator
        .compute_window(now)
        .context("Failed to compute the twilight window")?;

    // Partition keys are the point of this command, so always show them
    log_window_details(&calculator, &window, true);

    log_block_start!("Outputs:");
    for camera in &config.cameras {
        let output = config
            .camera_root(camera)
            .join(window.start.year_key())
            .join(TEMP_DIR_NAME)
            .join(format!("{}.{VIDEO_EXTENSION}", window.start.month_day_key()));
        log_indented!("{camera}: {}", private_path(&output));
    }
    log_end!();

    Ok(window)
}
