//! Dated snapshot labels (`YYYYMM/DD`)

use crate::error::{Result, SnapError};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Label of one dated snapshot under the target root
///
/// On disk a label is two path segments: a six-digit year+month directory
/// and a two-digit day directory, e.g. `202401/07`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotLabel {
    date: NaiveDate,
}

impl SnapshotLabel {
    /// Label for a calendar date
    pub fn from_date(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Parse a `YYYYMM/DD` label
    ///
    /// The label must have exactly that shape and name a real calendar day.
    pub fn parse(label: &str) -> Result<Self> {
        let bytes = label.as_bytes();
        if bytes.len() != 9 {
            return Err(SnapError::invalid_label(label, "expected YYYYMM/DD"));
        }
        if bytes[6] != b'/' {
            return Err(SnapError::invalid_label(label, "expected '/' after YYYYMM"));
        }
        if !bytes[..6].iter().chain(&bytes[7..]).all(u8::is_ascii_digit) {
            return Err(SnapError::invalid_label(label, "segments must be numeric"));
        }

        // All nine bytes are ASCII at this point, so slicing is safe.
        let year: i32 = label[0..4]
            .parse()
            .map_err(|_| SnapError::invalid_label(label, "bad year"))?;
        let month: u32 = label[4..6]
            .parse()
            .map_err(|_| SnapError::invalid_label(label, "bad month"))?;
        let day: u32 = label[7..9]
            .parse()
            .map_err(|_| SnapError::invalid_label(label, "bad day"))?;

        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| SnapError::invalid_label(label, "not a calendar date"))?;

        Ok(Self { date })
    }

    /// Calendar date this label names
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The `YYYYMM` segment
    pub fn month_segment(&self) -> String {
        format!("{:04}{:02}", self.date.year(), self.date.month())
    }

    /// The `DD` segment
    pub fn day_segment(&self) -> String {
        format!("{:02}", self.date.day())
    }

    /// Path of this snapshot relative to the target root
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.month_segment()).join(self.day_segment())
    }

    /// Label `days` calendar days earlier
    pub fn days_before(&self, days: u64) -> Result<Self> {
        self.date
            .checked_sub_days(Days::new(days))
            .map(Self::from_date)
            .ok_or(SnapError::DateOutOfRange)
    }

    /// Label for the day before
    pub fn previous(&self) -> Result<Self> {
        self.days_before(1)
    }
}

impl fmt::Display for SnapshotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.month_segment(), self.day_segment())
    }
}

impl FromStr for SnapshotLabel {
    type Err = SnapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for SnapshotLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
