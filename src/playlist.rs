//! Ordered frame list and its concat-demuxer manifest.
//!
//! Each manifest line has the form `file '<absolute path>'` followed by the
//! platform line terminator. Entries are written in chronological order.

use std::fs;
use std::path::{Path, PathBuf};

use crate::common::constants::LINE_ENDING;
use crate::error::PlaylistError;
use crate::frames::FrameRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    entries: Vec<PathBuf>,
}

impl Playlist {
    /// Sort `frames` chronologically and resolve them under `camera_root`.
    pub fn build(mut frames: Vec<FrameRef>, camera_root: &Path) -> Result<Self, PlaylistError> {
        let root = std::path::absolute(camera_root).map_err(|source| PlaylistError::Resolve {
            path: camera_root.to_path_buf(),
            source,
        })?;

        frames.sort_by(|a, b| {
            (a.partition.year, a.partition.month_day_hour, a.minute_second).cmp(&(
                b.partition.year,
                b.partition.month_day_hour,
                b.minute_second,
            ))
        });

        let entries = frames
            .iter()
            .map(|frame| root.join(&frame.relative_path))
            .collect();

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the manifest text.
    pub fn to_manifest(&self) -> String {
        self.entries.iter().map(|path| manifest_line(path)).collect()
    }

    /// Write the manifest to `path`, replacing any previous file.
    pub fn write_manifest(&self, path: &Path) -> Result<(), PlaylistError> {
        fs::write(path, self.to_manifest()).map_err(|source| PlaylistError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A single-quoted concat entry. A quote inside the path closes the string,
/// emits an escaped quote, and reopens it.
fn manifest_line(path: &Path) -> String {
    let quoted = path.to_string_lossy().replace('\'', r"'\''");
    format!("file '{quoted}'{LINE_ENDING}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::HourPartition;
    use tempfile::tempdir;

    fn frame(year: i32, month_day_hour: u32, minute_second: u32) -> FrameRef {
        FrameRef::new(HourPartition::new(year, month_day_hour), minute_second)
    }

    #[test]
    fn test_build_orders_chronologically() {
        let root = Path::new("/srv/webcams/camA");
        let playlist = Playlist::build(
            vec![
                frame(2024, 62120, 4400),
                frame(2025, 10100, 0),
                frame(2024, 62105, 1300),
                frame(2024, 62112, 0),
            ],
            root,
        )
        .unwrap();

        assert_eq!(
            playlist.entries(),
            &[
                root.join("2024/062105/1300.jpg"),
                root.join("2024/062112/0000.jpg"),
                root.join("2024/062120/4400.jpg"),
                root.join("2025/010100/0000.jpg"),
            ]
        );
        assert_eq!(playlist.len(), 4);
        assert!(!playlist.is_empty());
    }

    #[test]
    fn test_relative_root_is_made_absolute() {
        let playlist = Playlist::build(vec![frame(2024, 62105, 1300)], Path::new("camA")).unwrap();
        let entry = &playlist.entries()[0];
        assert!(entry.is_absolute());
        assert!(entry.ends_with("camA/2024/062105/1300.jpg"));
    }

    #[test]
    fn test_manifest_line_grammar() {
        let root = Path::new("/srv/webcams/camA");
        let playlist =
            Playlist::build(vec![frame(2024, 62112, 0), frame(2024, 62105, 1300)], root).unwrap();

        let expected = format!(
            "file '/srv/webcams/camA/2024/062105/1300.jpg'{LINE_ENDING}\
             file '/srv/webcams/camA/2024/062112/0000.jpg'{LINE_ENDING}"
        );
        assert_eq!(playlist.to_manifest(), expected);
    }

    #[test]
    fn test_manifest_escapes_single_quotes() {
        let line = manifest_line(Path::new("/srv/bob's cams/2024/062105/1300.jpg"));
        assert_eq!(
            line,
            format!("file '/srv/bob'\\''s cams/2024/062105/1300.jpg'{LINE_ENDING}")
        );
    }

    #[test]
    fn test_write_manifest() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("0621.txt");
        let playlist = Playlist::build(vec![frame(2024, 62105, 1300)], dir.path()).unwrap();

        playlist.write_manifest(&manifest).unwrap();

        let written = fs::read_to_string(&manifest).unwrap();
        assert_eq!(written, playlist.to_manifest());
        assert_eq!(written.lines().count(), 1);
    }

    #[test]
    fn test_write_manifest_into_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("missing").join("0621.txt");
        let playlist = Playlist::build(vec![frame(2024, 62105, 1300)], dir.path()).unwrap();

        let result = playlist.write_manifest(&manifest);
        assert!(matches!(result, Err(PlaylistError::Write { .. })));
    }
}
