//! Configuration validation.
//!
//! Rejects settings that cannot produce a usable run before any camera is
//! touched: out-of-range coordinates or rates, and camera ids that would
//! escape the storage root.

use super::Config;
use crate::common::constants::*;
use crate::error::ConfigError;

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.storage_root.as_os_str().is_empty() {
        return Err(ConfigError::Missing("storage_root"));
    }

    if config.cameras.is_empty() {
        return Err(ConfigError::Invalid {
            field: "cameras",
            reason: "at least one camera id is required".to_string(),
        });
    }
    for camera in &config.cameras {
        validate_camera_id(camera)?;
    }

    if !config.latitude.is_finite() || !(-90.0..=90.0).contains(&config.latitude) {
        return Err(ConfigError::Invalid {
            field: "latitude",
            reason: format!("must be between -90 and 90 degrees (got {})", config.latitude),
        });
    }
    if !config.longitude.is_finite() || !(-180.0..=180.0).contains(&config.longitude) {
        return Err(ConfigError::Invalid {
            field: "longitude",
            reason: format!(
                "must be between -180 and 180 degrees (got {})",
                config.longitude
            ),
        });
    }

    if !config.hour_offset.is_finite()
        || !(MINIMUM_HOUR_OFFSET..=MAXIMUM_HOUR_OFFSET).contains(&config.hour_offset)
    {
        return Err(ConfigError::Invalid {
            field: "hour_offset",
            reason: format!(
                "must be between {MINIMUM_HOUR_OFFSET} and {MAXIMUM_HOUR_OFFSET} hours (got {})",
                config.hour_offset
            ),
        });
    }

    if !(MINIMUM_FRAME_RATE..=MAXIMUM_FRAME_RATE).contains(&config.frame_rate) {
        return Err(ConfigError::Invalid {
            field: "frame_rate",
            reason: format!(
                "must be between {MINIMUM_FRAME_RATE} and {MAXIMUM_FRAME_RATE} (got {})",
                config.frame_rate
            ),
        });
    }

    if config.encoder.as_os_str().is_empty() {
        return Err(ConfigError::Invalid {
            field: "encoder",
            reason: "must not be empty".to_string(),
        });
    }
    if config.video_codec.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field: "video_codec",
            reason: "must not be empty".to_string(),
        });
    }

    Ok(())
}

/// A camera id names exactly one directory under the storage root.
pub(crate) fn validate_camera_id(camera: &str) -> Result<(), ConfigError> {
    let reason = if camera.is_empty() {
        Some("camera ids must not be empty".to_string())
    } else if camera == "." || camera == ".." {
        Some(format!("'{camera}' is not a valid camera id"))
    } else if camera.contains(['/', '\\']) {
        Some(format!("camera id '{camera}' must not contain path separators"))
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigError::Invalid {
            field: "cameras",
            reason,
        }),
        None => Ok(()),
    }
}
