//! Display and formatting utilities for computed windows.

use chrono::{DateTime, Utc};

use super::window::{SolarWindowCalculator, Window};
use crate::frames::WindowFilter;

/// Log the window a run will select frames from.
///
/// The summary is always printed; with `debug_enabled` the partition keys
/// and normalized filter bounds are listed as well.
pub fn log_window_details(calculator: &SolarWindowCalculator, window: &Window, debug_enabled: bool) {
    log_block_start!("Twilight window ({})", calculator.twilight.as_str());
    log_indented!("Coordinates: {:.4}°, {:.4}°", calculator.latitude, calculator.longitude);
    log_indented!("       Dawn: {}", format_utc(window.dawn));
    log_indented!("       Dusk: {}", format_utc(window.dusk));
    log_indented!("   Duration: {}", format_duration(window));

    if calculator.hour_offset != 0.0 {
        log_indented!("Hour offset: {:+}h", calculator.hour_offset);
    }

    if debug_enabled {
        let filter = WindowFilter::from_window(window);

        log_pipe!();
        log_debug!("Partition keys:");
        log_indented!("      Start: {}", window.start);
        log_indented!("        End: {}", window.end);
        log_indented!(
            "   Day dirs: {}/{}* and {}/{}*",
            window.start.year_key(),
            window.start.month_day_key(),
            window.end.year_key(),
            window.end.month_day_key()
        );
        log_indented!(
            "     Bounds: >= {:04} in first hour, < {:04} in last hour",
            filter.lower_minute_second(),
            filter.upper_minute_second()
        );
        if calculator.month_offset_correction {
            log_indented!("Month keys are zero-based (month offset correction)");
        }
    }
}

fn format_utc(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn format_duration(window: &Window) -> String {
    let minutes = (window.dusk - window.dawn).num_minutes();
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}
