//! Error taxonomy for a timelapse run.
//!
//! Only [`ConfigError`], [`WindowError`] and [`LockError`] are fatal to a run.
//! Everything a single camera can hit is folded into [`CameraError`] so the
//! orchestrator can log it and move on to the next camera.

use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting '{0}'")]
    Missing(&'static str),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read configuration from {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse configuration from {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("invalid coordinates: latitude={latitude}, longitude={longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// The sun never crosses the requested elevation on this date (polar day or night).
    #[error("{event} does not occur on {date} at latitude {latitude:.4}")]
    EventNotFound {
        event: &'static str,
        date: NaiveDate,
        latitude: f64,
    },

    #[error("hour offset {0}h is out of range")]
    OffsetOutOfRange(f64),
}

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("failed to scan {}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("failed to resolve absolute path for {}", .path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write manifest {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to start encoder '{}'", .binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("encoder exited with {}", describe_exit(.code))]
    Exit {
        code: Option<i32>,
        stderr_tail: Vec<String>,
    },

    #[error("failed waiting for encoder")]
    Wait(#[source] io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum CameraError {
    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error("failed to create temp directory {}", .path.display())]
    TempDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Playlist(#[from] PlaylistError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

#[derive(Debug, Error)]
pub enum LockError {
    #[error("another run already holds {}", .0.display())]
    AlreadyRunning(PathBuf),

    #[error("failed to open lock file {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
