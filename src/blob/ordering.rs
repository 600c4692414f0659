//! Configurable total ordering over blob records.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::BlobRecord;

#[derive(Error, Debug)]
pub enum SortColumnError {
    #[error("cannot sort on column '{0}'; supported columns: name, lastModified, length")]
    Unknown(String),
}

/// Which record field to order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    LastModified,
    Length,
}

impl FromStr for SortColumn {
    type Err = SortColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" | "Name" => Ok(Self::Name),
            "lastModified" | "LastModified" | "last-modified" => Ok(Self::LastModified),
            "length" | "Length" => Ok(Self::Length),
            other => Err(SortColumnError::Unknown(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Build a comparison function over blob records for the given column
/// and direction.
///
/// Name comparison is ordinal (byte-value), not locale-aware, so sort
/// results are stable across environments. A missing last-modified
/// timestamp sorts as the maximum representable instant: a blob
/// without one is pending, aborted, or failed, and belongs after every
/// completed upload in ascending order. Descending negates the result.
pub fn comparator(
    column: SortColumn,
    direction: SortDirection,
) -> impl Fn(&BlobRecord, &BlobRecord) -> Ordering {
    move |a, b| {
        let ordering = match column {
            SortColumn::Name => a.name.as_bytes().cmp(b.name.as_bytes()),
            SortColumn::LastModified => effective_timestamp(a).cmp(&effective_timestamp(b)),
            SortColumn::Length => a.length_bytes.cmp(&b.length_bytes),
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

fn effective_timestamp(record: &BlobRecord) -> DateTime<Utc> {
    record.last_modified.unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Sort records in place by the given column and direction.
pub fn sort_blobs(records: &mut [BlobRecord], column: SortColumn, direction: SortDirection) {
    let compare = comparator(column, direction);
    records.sort_by(|a, b| compare(a, b));
}
