//! Blob listings and point-in-time container snapshots.
//!
//! A storage backend returns raw, string-typed [`ListingEntry`] values;
//! [`Snapshot::from_listing`] parses them once into typed [`BlobRecord`]s
//! so that malformed metadata surfaces at the boundary instead of deep
//! inside comparison logic.

mod ordering;

pub use ordering::{comparator, sort_blobs, SortColumn, SortColumnError, SortDirection};

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("listing entry has an empty blob name")]
    EmptyName,

    #[error("blob '{name}' has an unparsable last-modified timestamp '{value}'")]
    MalformedTimestamp { name: String, value: String },

    #[error("blob '{name}' has an unparsable content length '{value}'")]
    MalformedLength { name: String, value: String },
}

/// One item of a container listing, as delivered by a storage backend.
///
/// Listings interleave concrete blobs with virtual directory markers;
/// only blobs carry metadata, and that metadata arrives as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListingEntry {
    Blob {
        name: String,
        /// RFC 3339 timestamp, or `None` for a blob that was never
        /// modified (a pending, aborted, or failed upload).
        last_modified: Option<String>,
        content_length: String,
    },
    /// A virtual directory marker. Carries no blob metadata and never
    /// participates in reconciliation.
    Prefix { name: String },
}

/// Immutable snapshot of one blob's identity and metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobRecord {
    /// Unique key within a container snapshot.
    pub name: String,
    /// `None` means never modified / pending / unknown.
    pub last_modified: Option<DateTime<Utc>>,
    pub length_bytes: u64,
}

impl BlobRecord {
    pub fn new(
        name: impl Into<String>,
        last_modified: Option<DateTime<Utc>>,
        length_bytes: u64,
    ) -> Result<Self, SnapshotError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SnapshotError::EmptyName);
        }
        Ok(Self {
            name,
            last_modified,
            length_bytes,
        })
    }

    /// Zero-length entries stand in for virtual directories or empty
    /// markers and are excluded from reconciliation.
    pub fn is_placeholder(&self) -> bool {
        self.length_bytes == 0
    }
}

impl fmt::Display for BlobRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.last_modified {
            Some(ts) => write!(
                f,
                "Name: {} LastModified: {} Length: {}",
                self.name,
                ts.to_rfc3339(),
                self.length_bytes
            ),
            None => write!(
                f,
                "Name: {} LastModified: - Length: {}",
                self.name, self.length_bytes
            ),
        }
    }
}

/// Point-in-time collection of blob records for one container. No
/// ordering is implied, but the vector preserves listing order, which
/// the planner uses for deterministic action emission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub records: Vec<BlobRecord>,
}

impl Snapshot {
    pub fn new(records: Vec<BlobRecord>) -> Self {
        Self { records }
    }

    /// Parse a raw backend listing into typed records.
    ///
    /// Virtual directory markers are dropped here; zero-length blobs
    /// are kept (they are listable and sortable) and filtered later by
    /// the planner. Any unparsable timestamp or length aborts the
    /// whole snapshot: silently dropping a sync candidate would break
    /// convergence.
    pub fn from_listing(entries: Vec<ListingEntry>) -> Result<Self, SnapshotError> {
        let mut records = Vec::new();

        for entry in entries {
            let (name, last_modified, content_length) = match entry {
                ListingEntry::Prefix { .. } => continue,
                ListingEntry::Blob {
                    name,
                    last_modified,
                    content_length,
                } => (name, last_modified, content_length),
            };

            if name.is_empty() {
                return Err(SnapshotError::EmptyName);
            }

            let last_modified = match last_modified.as_deref() {
                None | Some("") => None,
                Some(raw) => Some(
                    DateTime::parse_from_rfc3339(raw)
                        .map_err(|_| SnapshotError::MalformedTimestamp {
                            name: name.clone(),
                            value: raw.to_string(),
                        })?
                        .with_timezone(&Utc),
                ),
            };

            let length_bytes =
                content_length
                    .parse::<u64>()
                    .map_err(|_| SnapshotError::MalformedLength {
                        name: name.clone(),
                        value: content_length.clone(),
                    })?;

            records.push(BlobRecord {
                name,
                last_modified,
                length_bytes,
            });
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn blob_entry(name: &str, last_modified: Option<&str>, content_length: &str) -> ListingEntry {
        ListingEntry::Blob {
            name: name.to_string(),
            last_modified: last_modified.map(str::to_string),
            content_length: content_length.to_string(),
        }
    }

    #[test]
    fn test_from_listing_parses_metadata() {
        let snapshot = Snapshot::from_listing(vec![blob_entry(
            "reports/q1.pdf",
            Some("2024-01-02T00:00:00Z"),
            "1024",
        )])
        .unwrap();

        assert_eq!(snapshot.len(), 1);
        let record = &snapshot.records[0];
        assert_eq!(record.name, "reports/q1.pdf");
        assert_eq!(
            record.last_modified,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(record.length_bytes, 1024);
    }

    #[test]
    fn test_from_listing_drops_prefix_entries() {
        let snapshot = Snapshot::from_listing(vec![
            ListingEntry::Prefix {
                name: "reports/".to_string(),
            },
            blob_entry("reports/q1.pdf", Some("2024-01-02T00:00:00Z"), "1024"),
        ])
        .unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.records[0].name, "reports/q1.pdf");
    }

    #[test]
    fn test_missing_timestamp_reads_as_none() {
        let snapshot =
            Snapshot::from_listing(vec![blob_entry("pending.bin", None, "10")]).unwrap();
        assert_eq!(snapshot.records[0].last_modified, None);
    }

    #[test]
    fn test_empty_timestamp_reads_as_none() {
        let snapshot =
            Snapshot::from_listing(vec![blob_entry("pending.bin", Some(""), "10")]).unwrap();
        assert_eq!(snapshot.records[0].last_modified, None);
    }

    #[test]
    fn test_malformed_timestamp_is_fatal() {
        let err = Snapshot::from_listing(vec![blob_entry("a.txt", Some("yesterday"), "10")])
            .unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::MalformedTimestamp { ref name, ref value }
                if name == "a.txt" && value == "yesterday"
        ));
    }

    #[test]
    fn test_malformed_length_is_fatal() {
        let err = Snapshot::from_listing(vec![blob_entry(
            "a.txt",
            Some("2024-01-02T00:00:00Z"),
            "many",
        )])
        .unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::MalformedLength { ref name, ref value }
                if name == "a.txt" && value == "many"
        ));
    }

    #[test]
    fn test_negative_length_is_fatal() {
        let err = Snapshot::from_listing(vec![blob_entry(
            "a.txt",
            Some("2024-01-02T00:00:00Z"),
            "-1",
        )])
        .unwrap_err();
        assert!(matches!(err, SnapshotError::MalformedLength { .. }));
    }

    #[test]
    fn test_empty_name_is_fatal() {
        let err = Snapshot::from_listing(vec![blob_entry("", None, "10")]).unwrap_err();
        assert!(matches!(err, SnapshotError::EmptyName));
    }

    #[test]
    fn test_record_construction_rejects_empty_name() {
        assert!(BlobRecord::new("", None, 10).is_err());
        assert!(BlobRecord::new("a", None, 10).is_ok());
    }

    #[test]
    fn test_placeholder_detection() {
        let record = BlobRecord::new("marker", None, 0).unwrap();
        assert!(record.is_placeholder());
        let record = BlobRecord::new("real", None, 1).unwrap();
        assert!(!record.is_placeholder());
    }

    #[test]
    fn test_display_rendering() {
        let record = BlobRecord::new(
            "a.txt",
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()),
            10,
        )
        .unwrap();
        assert_eq!(
            record.to_string(),
            "Name: a.txt LastModified: 2024-01-02T00:00:00+00:00 Length: 10"
        );

        let record = BlobRecord::new("pending.bin", None, 10).unwrap();
        assert_eq!(
            record.to_string(),
            "Name: pending.bin LastModified: - Length: 10"
        );
    }
}
