use std::sync::Mutex;

use async_trait::async_trait;

use super::SnapshotStore;
use crate::error::StorageError;
use crate::model::issue::Issue;
use crate::model::snapshot::{Snapshot, SnapshotMeta};

/// Keeps snapshots in process memory, for exercising the pipeline.
#[derive(Default)]
pub struct MemoryStore {
    snapshots: Mutex<Vec<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.snapshots
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn persist(&self, meta: SnapshotMeta, issues: Vec<Issue>) -> Result<Snapshot, StorageError> {
        let snapshot = Snapshot::new(meta, issues);
        // Round-trip through JSON so a document the file store would reject fails here too.
        let document = serde_json::to_vec(&snapshot)?;
        let stored: Snapshot = serde_json::from_slice(&document)?;
        if let Ok(mut snapshots) = self.snapshots.lock() {
            snapshots.push(stored.clone());
        }
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_independent_snapshots() {
        let store = MemoryStore::new();
        let first = store
            .persist(SnapshotMeta::default(), vec![Issue::with_key("FD-1")])
            .await
            .unwrap();
        let second = store
            .persist(SnapshotMeta::new("Manual Trigger"), vec![])
            .await
            .unwrap();

        let stored = store.snapshots();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0], first);
        assert_eq!(stored[1], second);
        assert_eq!(stored[0].total_issues(), 1);
        assert_eq!(stored[1].snapshot_type(), "Manual Trigger");
    }
}
