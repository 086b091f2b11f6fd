//! Boundary-inclusive selection of frames inside a dawn/dusk window.
//!
//! Bounds are minute-granular. The lower bound is floored to the start of its
//! minute; the upper bound is floored and then advanced by one minute, and a
//! frame in the final hour must sit strictly below it. Both the first and the
//! last minute of the window are therefore kept whole.

use super::{FrameRef, HourPartition};
use crate::geo::Window;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFilter {
    min_partition: HourPartition,
    max_partition: HourPartition,
    /// Inclusive, `MMSS` floored to `MM00`.
    lower_minute_second: u32,
    /// Exclusive, one minute past the floored maximum.
    upper_minute_second: u32,
}

impl WindowFilter {
    pub fn new(
        min_partition: HourPartition,
        max_partition: HourPartition,
        min_minute_second: u32,
        max_minute_second: u32,
    ) -> Self {
        Self {
            min_partition,
            max_partition,
            lower_minute_second: floor_to_minute(min_minute_second),
            upper_minute_second: floor_to_minute(max_minute_second) + 100,
        }
    }

    pub fn from_window(window: &Window) -> Self {
        Self::new(
            window.start.hour_partition(),
            window.end.hour_partition(),
            window.start.minute_second(),
            window.end.minute_second(),
        )
    }

    pub fn lower_minute_second(&self) -> u32 {
        self.lower_minute_second
    }

    pub fn upper_minute_second(&self) -> u32 {
        self.upper_minute_second
    }

    /// Whether a frame falls inside the window.
    ///
    /// Frames in an hour strictly between the bounds are always kept. In the
    /// first hour a frame must be at or after the lower bound; in the last
    /// hour it must be before the upper bound. When the window starts and
    /// ends in the same hour both conditions must hold.
    pub fn includes(&self, frame: &FrameRef) -> bool {
        let partition = frame.partition;
        let minute_second = frame.minute_second;

        let from_start =
            partition == self.min_partition && minute_second >= self.lower_minute_second;
        let until_end =
            partition == self.max_partition && minute_second < self.upper_minute_second;

        if self.min_partition == self.max_partition {
            return from_start && until_end;
        }

        let interior = self.min_partition < partition && partition < self.max_partition;
        interior || from_start || until_end
    }

    /// Keep the candidates inside the window, preserving their order.
    pub fn apply<I>(&self, candidates: I) -> Vec<FrameRef>
    where
        I: IntoIterator<Item = FrameRef>,
    {
        candidates
            .into_iter()
            .filter(|frame| self.includes(frame))
            .collect()
    }
}

/// One-shot form of [`WindowFilter::apply`].
pub fn filter(
    candidates: Vec<FrameRef>,
    min_partition: HourPartition,
    max_partition: HourPartition,
    min_minute_second: u32,
    max_minute_second: u32,
) -> Vec<FrameRef> {
    WindowFilter::new(
        min_partition,
        max_partition,
        min_minute_second,
        max_minute_second,
    )
    .apply(candidates)
}

fn floor_to_minute(minute_second: u32) -> u32 {
    minute_second - minute_second % 100
}
