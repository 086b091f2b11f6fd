//! Defaults, limits and exit codes.

// # Application Defaults

pub const DEFAULT_ENCODER: &str = "ffmpeg";
pub const DEFAULT_FRAME_RATE: u32 = 24;
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
pub const DEFAULT_HOUR_OFFSET: f64 = 0.0;

pub const CONFIG_DIR_NAME: &str = "daylapse";
pub const CONFIG_FILE_NAME: &str = "daylapse.toml";

/// Prefix for environment overrides, e.g. `DAYLAPSE_CAMERAS`.
pub const ENV_PREFIX: &str = "DAYLAPSE_";

// # Validation Limits

pub const MINIMUM_FRAME_RATE: u32 = 1;
pub const MAXIMUM_FRAME_RATE: u32 = 240;
pub const MINIMUM_HOUR_OFFSET: f64 = -24.0;
pub const MAXIMUM_HOUR_OFFSET: f64 = 24.0;

// # Storage Layout

/// Per-year working directory for manifests and rendered videos.
pub const TEMP_DIR_NAME: &str = "temp";
pub const MANIFEST_EXTENSION: &str = "txt";
pub const VIDEO_EXTENSION: &str = "mp4";
pub const LOCK_FILE_NAME: &str = ".daylapse.lock";

#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

// # Encoder

/// How many trailing stderr lines an encode failure keeps.
pub const STDERR_TAIL_LINES: usize = 20;

// # Exit Codes

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
/// The run finished but at least one camera failed.
pub const EXIT_PARTIAL: i32 = 2;
