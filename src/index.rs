//! Time-bucket indexer.
//!
//! Takes the raw, unsorted datapoint list for a camera and produces the
//! structure the activity grid renders from: one 4x24 matrix per calendar
//! day, rows keyed by quarter-hour bin, columns by hour-of-day, each cell an
//! ordered list of datapoints. One global descending sort, then a single
//! O(n) bucketing pass.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::logging::{json_log, obj, v_str, Level};
use crate::timecode;

pub const QUARTER_BINS: usize = 4;
pub const HOURS: usize = 24;

/// One motion event as delivered by the datapoints endpoint. Immutable once
/// received; the indexer only reorders and copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datapoint {
    #[serde(rename = "DateTime")]
    pub date_time: String,
    #[serde(rename = "DavKey", default)]
    pub dav_key: String,
}

/// The 4x24 cell matrix for a single calendar day.
///
/// Every one of the 96 cells is its own independently owned `Vec`. Building
/// the matrix by cloning a single empty template would alias one allocation
/// across cells, so construction goes through `array::from_fn` with a fresh
/// `Vec` per coordinate.
#[derive(Debug, Clone, Default)]
pub struct DayGrid {
    cells: [[Vec<Datapoint>; HOURS]; QUARTER_BINS],
}

impl DayGrid {
    pub fn new() -> Self {
        Self {
            cells: std::array::from_fn(|_| std::array::from_fn(|_| Vec::new())),
        }
    }

    /// Contents of one cell; always present, possibly empty.
    pub fn cell(&self, quarter: usize, hour: usize) -> &[Datapoint] {
        &self.cells[quarter][hour]
    }

    fn push(&mut self, quarter: usize, hour: usize, dp: Datapoint) {
        self.cells[quarter][hour].push(dp);
    }

    /// Quarter-bin rows in grid order, for rendering.
    pub fn rows(&self) -> impl Iterator<Item = &[Vec<Datapoint>; HOURS]> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.iter().flatten().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Day -> quarter-bin -> hour-of-day index over one fetched batch.
///
/// Rebuilt from scratch on every fetch; the controller replaces its instance
/// wholesale rather than updating it in place.
#[derive(Debug, Clone, Default)]
pub struct TimeIndex {
    bins: HashMap<String, DayGrid>,
    date_set: Vec<String>,
}

impl TimeIndex {
    /// Build the index from a raw batch.
    ///
    /// Records whose timestamp code fails the codec are skipped with a
    /// logged warning; the rest of the batch survives. Sort is stable and
    /// descending by instant, which fixes both the day order of `date_set`
    /// and the relative order of datapoints within a cell.
    pub fn build(datapoints: Vec<Datapoint>) -> TimeIndex {
        let mut keyed = Vec::with_capacity(datapoints.len());
        for dp in datapoints {
            match Self::bucket_coords(&dp.date_time) {
                Ok(coords) => keyed.push((coords, dp)),
                Err(err) => json_log(
                    Level::Warn,
                    "index",
                    "datapoint_skipped",
                    obj(&[("error", v_str(&err.to_string()))]),
                ),
            }
        }
        keyed.sort_by(|a, b| b.0 .0.cmp(&a.0 .0));

        let mut index = TimeIndex::default();
        for ((_, quarter, hour), dp) in keyed {
            // Shape was validated by bucket_coords above.
            let date = &dp.date_time[..8];
            if !index.bins.contains_key(date) {
                index.date_set.push(date.to_string());
                index.bins.insert(date.to_string(), DayGrid::new());
            }
            if let Some(grid) = index.bins.get_mut(date) {
                grid.push(quarter, hour, dp);
            }
        }
        index
    }

    fn bucket_coords(code: &str) -> Result<(i64, usize, usize), timecode::MalformedTimestamp> {
        let instant = timecode::to_instant(code)?;
        let quarter = timecode::quarter_bin(code)?;
        let hour = timecode::hour_of_day(code)?;
        Ok((instant, quarter, hour))
    }

    /// Distinct day keys in first-seen order after the global descending
    /// sort, i.e. most recent day first.
    pub fn date_set(&self) -> &[String] {
        &self.date_set
    }

    pub fn day(&self, date_key: &str) -> Option<&DayGrid> {
        self.bins.get(date_key)
    }

    /// Total datapoints across all cells.
    pub fn len(&self) -> usize {
        self.bins.values().map(DayGrid::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}
