use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::issue::Issue;

pub const DEFAULT_SNAPSHOT_TYPE: &str = "Global Fetch";

/// Label attached to a snapshot when it is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotMeta {
    pub snapshot_type: String,
}

impl SnapshotMeta {
    pub fn new(snapshot_type: impl Into<String>) -> Self {
        Self {
            snapshot_type: snapshot_type.into(),
        }
    }
}

impl Default for SnapshotMeta {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_TYPE)
    }
}

/// Immutable point-in-time capture of every fetched issue.
///
/// `total_issues` always equals the number of issues: `Snapshot::new` sets it
/// and decoding rejects documents where it disagrees. There are no setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotDocument")]
pub struct Snapshot {
    id: Uuid,
    timestamp: DateTime<Utc>,
    snapshot_type: String,
    total_issues: usize,
    issues: Vec<Issue>,
}

impl Snapshot {
    pub fn new(meta: SnapshotMeta, issues: Vec<Issue>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            snapshot_type: meta.snapshot_type,
            total_issues: issues.len(),
            issues,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn snapshot_type(&self) -> &str {
        &self.snapshot_type
    }

    pub fn total_issues(&self) -> usize {
        self.total_issues
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            id: self.id,
            timestamp: self.timestamp,
            snapshot_type: self.snapshot_type.clone(),
            total_issues: self.total_issues,
        }
    }
}

/// Wire form of a stored snapshot, checked before it becomes a `Snapshot`.
#[derive(Deserialize)]
struct SnapshotDocument {
    id: Uuid,
    timestamp: DateTime<Utc>,
    snapshot_type: String,
    total_issues: usize,
    issues: Vec<Issue>,
}

impl TryFrom<SnapshotDocument> for Snapshot {
    type Error = String;

    fn try_from(doc: SnapshotDocument) -> Result<Self, Self::Error> {
        if doc.total_issues != doc.issues.len() {
            return Err(format!(
                "snapshot {} has total_issues {} but {} issues",
                doc.id,
                doc.total_issues,
                doc.issues.len()
            ));
        }
        Ok(Self {
            id: doc.id,
            timestamp: doc.timestamp,
            snapshot_type: doc.snapshot_type,
            total_issues: doc.total_issues,
            issues: doc.issues,
        })
    }
}

/// Snapshot metadata without the issue list, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub snapshot_type: String,
    pub total_issues: usize,
}
