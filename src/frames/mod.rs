//! Frame discovery and selection over the date-partitioned storage tree.
//!
//! - [`instant`]: fixed-width partition keys for a resolved instant
//! - [`locator`]: enumerates candidate frames for one calendar day
//! - [`filter`]: keeps the frames that fall inside the dawn/dusk window
//!
//! Nothing in here opens an image; selection is driven purely by path names.

pub mod filter;
pub mod instant;
pub mod locator;

use std::path::PathBuf;

pub use filter::WindowFilter;
pub use instant::{HourPartition, TimeInstant};
pub use locator::locate;

/// One captured frame, identified by its position in a camera's tree.
///
/// The derived ordering is chronological: partition first, then `MMSS`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameRef {
    pub partition: HourPartition,
    pub minute_second: u32,
    /// `<year>/<MMDDHH>/<MMSS>.jpg`, relative to the camera root.
    pub relative_path: PathBuf,
}

impl FrameRef {
    pub fn new(partition: HourPartition, minute_second: u32) -> Self {
        let relative_path = PathBuf::from(format!("{:04}", partition.year))
            .join(partition.folder_name())
            .join(format!("{minute_second:04}.jpg"));

        Self {
            partition,
            minute_second,
            relative_path,
        }
    }
}

/// Merge the dawn-day and dusk-day candidate lists into one sorted set.
///
/// When dawn and dusk fall on the same calendar day both lists are the same
/// partition, so duplicates are dropped here. Returns the merged list and the
/// number of duplicates removed.
pub fn merge_candidates(dawn_day: Vec<FrameRef>, dusk_day: Vec<FrameRef>) -> (Vec<FrameRef>, usize) {
    let mut merged = dawn_day;
    merged.extend(dusk_day);
    merged.sort();

    let before = merged.len();
    merged.dedup();
    let dropped = before - merged.len();

    (merged, dropped)
}
