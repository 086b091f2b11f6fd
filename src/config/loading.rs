//! Locating, reading and resolving the configuration.
//!
//! Resolution order, later sources winning per key:
//! 1. built-in defaults
//! 2. the TOML file
//! 3. `DAYLAPSE_*` environment variables

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;
use super::validation::validate_config;
use crate::common::constants::*;
use crate::error::ConfigError;
use crate::geo::Twilight;

/// Camera ids as written in the file: a TOML array or a comma-separated string.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum CameraList {
    List(Vec<String>),
    Csv(String),
}

impl CameraList {
    /// Trimmed ids with blank entries removed.
    pub fn ids(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            CameraList::List(items) => items.iter().map(String::as_str).collect(),
            CameraList::Csv(text) => text.split(',').collect(),
        };

        raw.into_iter()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// The configuration file as written, every key optional.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub storage_root: Option<PathBuf>,
    pub cameras: Option<CameraList>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub hour_offset: Option<f64>,
    pub encoder: Option<PathBuf>,
    pub frame_rate: Option<u32>,
    pub video_codec: Option<String>,
    pub video_filter: Option<String>,
    pub twilight: Option<Twilight>,
    pub month_offset_correction: Option<bool>,
}

impl ConfigFile {
    pub fn from_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay `DAYLAPSE_*` values obtained through `lookup`.
    ///
    /// `lookup` receives the key without prefix, e.g. `"CAMERAS"`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = var("STORAGE_ROOT") {
            self.storage_root = Some(PathBuf::from(value));
        }
        if let Some(value) = var("CAMERAS") {
            self.cameras = Some(CameraList::Csv(value));
        }
        if let Some(value) = var("LATITUDE") {
            self.latitude = Some(parse_env("latitude", &value)?);
        }
        if let Some(value) = var("LONGITUDE") {
            self.longitude = Some(parse_env("longitude", &value)?);
        }
        if let Some(value) = var("HOUR_OFFSET") {
            self.hour_offset = Some(parse_env("hour_offset", &value)?);
        }
        if let Some(value) = var("ENCODER") {
            self.encoder = Some(PathBuf::from(value));
        }
        if let Some(value) = var("FRAME_RATE") {
            self.frame_rate = Some(parse_env("frame_rate", &value)?);
        }
        if let Some(value) = var("VIDEO_CODEC") {
            self.video_codec = Some(value);
        }
        if let Some(value) = var("VIDEO_FILTER") {
            self.video_filter = Some(value);
        }
        if let Some(value) = var("TWILIGHT") {
            let twilight = value.parse::<Twilight>().map_err(|reason| ConfigError::Invalid {
                field: "twilight",
                reason,
            })?;
            self.twilight = Some(twilight);
        }
        if let Some(value) = var("MONTH_OFFSET_CORRECTION") {
            self.month_offset_correction = Some(parse_bool("month_offset_correction", &value)?);
        }

        Ok(())
    }

    /// Fill in defaults, check required keys and validate.
    pub fn resolve(self) -> Result<Config, ConfigError> {
        let config = Config {
            storage_root: self.storage_root.ok_or(ConfigError::Missing("storage_root"))?,
            cameras: self
                .cameras
                .ok_or(ConfigError::Missing("cameras"))?
                .ids(),
            latitude: self.latitude.ok_or(ConfigError::Missing("latitude"))?,
            longitude: self.longitude.ok_or(ConfigError::Missing("longitude"))?,
            hour_offset: self.hour_offset.unwrap_or(DEFAULT_HOUR_OFFSET),
            encoder: self
                .encoder
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ENCODER)),
            frame_rate: self.frame_rate.unwrap_or(DEFAULT_FRAME_RATE),
            video_codec: self
                .video_codec
                .unwrap_or_else(|| DEFAULT_VIDEO_CODEC.to_string()),
            video_filter: self.video_filter.filter(|f| !f.trim().is_empty()),
            twilight: self.twilight.unwrap_or_default(),
            month_offset_correction: self.month_offset_correction.unwrap_or(false),
        };

        validate_config(&config)?;
        Ok(config)
    }
}

/// `$XDG_CONFIG_HOME/daylapse/daylapse.toml` (or the platform equivalent).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load from `path` (or the default location) with process environment overrides.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_with(path, |key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
}

/// Like [`load`] but with an explicit environment lookup.
///
/// An explicit `path` must exist. The default file may be absent as long as
/// the environment provides every required key.
pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut file = match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            read_file(path)?
        }
        None => match default_config_path() {
            Some(default) if default.exists() => read_file(&default)?,
            _ => ConfigFile::default(),
        },
    };

    file.apply_env(lookup)?;
    file.resolve()
}

fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ConfigFile::from_toml(path, &content)
}

fn parse_env<T>(field: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        field,
        reason: format!("'{value}' ({e})"),
    })
}

fn parse_bool(field: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            field,
            reason: format!("'{value}' is not a boolean"),
        }),
    }
}
