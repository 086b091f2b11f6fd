//! Configuration for daylapse.
//!
//! Settings come from a TOML file and may be overridden per key by
//! `DAYLAPSE_*` environment variables. The file is looked up at
//! `$XDG_CONFIG_HOME/daylapse/daylapse.toml` unless `--config` names one.
//!
//! ```toml
//! storage_root = "/srv/webcams"   # Directory holding one folder per camera
//! cameras = ["camA", "camB"]      # Camera ids, or a comma-separated string
//! latitude = 40.7128              # Geographic latitude (-90 to +90)
//! longitude = -74.0060            # Geographic longitude (-180 to +180)
//! hour_offset = 0.0               # Hours added to the clock before picking the date
//!
//! encoder = "ffmpeg"              # Encoder binary (name on PATH or absolute path)
//! frame_rate = 24                 # Output frames per second (1-240)
//! video_codec = "libx264"         # Value passed to -c:v
//! # video_filter = "scale=1280:-2" # Optional value passed to -vf
//!
//! twilight = "civil"              # "horizon", "civil", "nautical" or "astronomical"
//! month_offset_correction = false # Write month keys zero-based (legacy archives)
//! ```
//!
//! The resolved [`Config`] is immutable for the duration of a run.

pub mod loading;
pub mod validation;

use std::path::PathBuf;

use crate::common::utils::private_path;
use crate::geo::{SolarWindowCalculator, Twilight};

pub use loading::{ConfigFile, default_config_path, load, load_with};
pub use validation::validate_config;

/// Fully resolved and validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory containing one subdirectory per camera.
    pub storage_root: PathBuf,
    pub cameras: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub hour_offset: f64,
    pub encoder: PathBuf,
    pub frame_rate: u32,
    pub video_codec: String,
    pub video_filter: Option<String>,
    pub twilight: Twilight,
    pub month_offset_correction: bool,
}

impl Config {
    /// Load using the default lookup rules; see [`loading::load`].
    pub fn load(path: Option<&std::path::Path>) -> Result<Self, crate::error::ConfigError> {
        load(path)
    }

    /// Root of one camera's frame tree.
    pub fn camera_root(&self, camera: &str) -> PathBuf {
        self.storage_root.join(camera)
    }

    /// The window calculator these settings describe.
    pub fn calculator(&self) -> SolarWindowCalculator {
        SolarWindowCalculator::new(self.latitude, self.longitude)
            .with_hour_offset(self.hour_offset)
            .with_twilight(self.twilight)
            .with_month_offset_correction(self.month_offset_correction)
    }

    pub fn log_config(&self, source: Option<&std::path::Path>) {
        match source {
            Some(path) => log_block_start!("Loaded configuration from {}", private_path(path)),
            None => log_block_start!("Loaded configuration from environment"),
        }

        log_indented!("Storage root: {}", private_path(&self.storage_root));
        log_indented!("Cameras: {}", self.cameras.join(", "));
        log_indented!("Location: {:.4}°, {:.4}°", self.latitude, self.longitude);
        if self.hour_offset != 0.0 {
            log_indented!("Hour offset: {:+}h", self.hour_offset);
        }
        log_indented!("Twilight: {}", self.twilight.as_str());
        log_indented!(
            "Encoder: {} ({} @ {} fps)",
            self.encoder.display(),
            self.video_codec,
            self.frame_rate
        );
        if let Some(filter) = &self.video_filter {
            log_indented!("Video filter: {filter}");
        }
        if self.month_offset_correction {
            log_indented!("Month offset correction: enabled");
        }
    }
}

#[cfg(test)]
mod tests;
