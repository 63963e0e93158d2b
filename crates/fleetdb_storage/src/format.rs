//! CSV row layouts.

use fleetdb_core::{DriverRecord, Location};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Header written by [`Snapshot::save`](crate::Snapshot::save).
pub const HEADER: [&str; 8] = [
    "id",
    "name",
    "rating",
    "x",
    "y",
    "totalRides",
    "ratingSum",
    "ratingCount",
];

/// Six-column header of older exports, without rating history.
pub const LEGACY_HEADER: [&str; 6] = ["ID", "Name", "Rating", "X", "Y", "TotalRides"];

/// Column layout of a snapshot, detected from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// [`HEADER`]: full records including rating history.
    Full,
    /// [`LEGACY_HEADER`]: rating history defaults to empty.
    Legacy,
}

impl SnapshotFormat {
    /// Matches a header row case-insensitively. Surrounding whitespace in
    /// each column name is ignored.
    pub fn detect<'a>(header: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let columns: Vec<&str> = header.into_iter().map(str::trim).collect();
        let matches = |expected: &[&str]| {
            columns.len() == expected.len()
                && columns
                    .iter()
                    .zip(expected)
                    .all(|(found, want)| found.eq_ignore_ascii_case(want))
        };
        if matches(&HEADER) {
            Some(Self::Full)
        } else if matches(&LEGACY_HEADER) {
            Some(Self::Legacy)
        } else {
            None
        }
    }
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

/// One data row, read by position.
///
/// The trailing history columns default to zero so the same struct reads
/// both layouts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct DriverRow {
    pub(crate) id: u64,
    pub(crate) name: String,
    pub(crate) rating: f64,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) total_rides: u64,
    #[serde(default)]
    pub(crate) rating_sum: u64,
    #[serde(default)]
    pub(crate) rating_count: u32,
}

impl DriverRow {
    pub(crate) fn into_record(self) -> DriverRecord {
        DriverRecord::new(self.id, self.name, Location::new(self.x, self.y))
            .with_rating(self.rating)
            .with_total_rides(self.total_rides)
            .with_rating_history(self.rating_sum, self.rating_count)
    }
}

/// One data row as written, borrowing from the record.
#[derive(Debug, Serialize)]
pub(crate) struct DriverRowRef<'a> {
    id: u64,
    name: &'a str,
    rating: f64,
    x: f64,
    y: f64,
    total_rides: u64,
    rating_sum: u64,
    rating_count: u32,
}

impl<'a> From<&'a DriverRecord> for DriverRowRef<'a> {
    fn from(record: &'a DriverRecord) -> Self {
        let location = record.location();
        Self {
            id: record.id().as_u64(),
            name: record.name(),
            rating: record.rating(),
            x: location.x,
            y: location.y,
            total_rides: record.total_rides(),
            rating_sum: record.rating_sum(),
            rating_count: record.rating_count(),
        }
    }
}
