//! Candidate discovery under a camera's `<year>/<MMDDHH>/<MMSS>.jpg` tree.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::{FrameRef, HourPartition};
use crate::error::LocateError;

static HOUR_FOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("hour folder pattern is valid"));

static FRAME_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-5]\d)([0-5]\d)\.jpg$").expect("frame file pattern is valid")
});

/// List every frame in `camera_root/<year>/` whose hour folder starts with
/// `month_day_prefix` (`MMDD`).
///
/// A missing year directory yields an empty list: not every camera has
/// footage for every year. Hour folders and files that don't follow the
/// fixed-width naming (including the `temp/` output directory) are ignored.
/// The result is sorted chronologically.
pub fn locate(
    camera_root: &Path,
    year: i32,
    month_day_prefix: &str,
) -> Result<Vec<FrameRef>, LocateError> {
    let year_dir = camera_root.join(format!("{year:04}"));

    let entries = match fs::read_dir(&year_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(LocateError::Scan {
                path: year_dir,
                source,
            });
        }
    };

    let mut frames = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|source| LocateError::Scan {
            path: year_dir.clone(),
            source,
        })?;

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !HOUR_FOLDER.is_match(name) || !name.starts_with(month_day_prefix) {
            continue;
        }

        let hour_dir = entry.path();
        if !hour_dir.is_dir() {
            continue;
        }

        // Six ASCII digits always fit
        let Ok(month_day_hour) = name.parse::<u32>() else {
            continue;
        };

        collect_hour(&hour_dir, HourPartition::new(year, month_day_hour), &mut frames)?;
    }

    frames.sort();
    Ok(frames)
}

fn collect_hour(
    hour_dir: &Path,
    partition: HourPartition,
    frames: &mut Vec<FrameRef>,
) -> Result<(), LocateError> {
    let entries = fs::read_dir(hour_dir).map_err(|source| LocateError::Scan {
        path: hour_dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| LocateError::Scan {
            path: hour_dir.to_path_buf(),
            source,
        })?;

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(caps) = FRAME_FILE.captures(name) else {
            continue;
        };
        if !entry.path().is_file() {
            continue;
        }

        let minute: u32 = caps[1].parse().unwrap_or(0);
        let second: u32 = caps[2].parse().unwrap_or(0);
        frames.push(FrameRef::new(partition, minute * 100 + second));
    }

    Ok(())
}
