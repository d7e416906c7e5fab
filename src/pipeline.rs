use chrono::Utc;
use serde::Serialize;

use crate::error::FetchError;
use crate::model::snapshot::{Snapshot, SnapshotMeta};
use crate::normalize::{normalize_issues, FieldIds};
use crate::providers::IssueSource;
use crate::store::SnapshotStore;

pub const SUCCESS_MESSAGE: &str = "Data fetched from Jira and saved";
pub const FAILURE_MESSAGE: &str = "Failed to fetch data";

/// Fetch once, normalize, persist once.
///
/// Provider and storage failures abort the whole run; nothing is stored when
/// the fetch fails.
pub async fn run_fetch(
    source: &dyn IssueSource,
    store: &dyn SnapshotStore,
    ids: &FieldIds,
    meta: SnapshotMeta,
) -> Result<Snapshot, FetchError> {
    let raw = source.fetch_issues().await?;
    let issues = normalize_issues(&raw, ids, Utc::now());
    let overdue = issues.iter().filter(|i| i.is_overdue).count();
    tracing::info!(
        source = source.name(),
        issues = issues.len(),
        overdue,
        "normalized issues"
    );
    let snapshot = store.persist(meta, issues).await?;
    Ok(snapshot)
}

/// Outcome of a fetch, shaped for whoever triggered it.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FetchResponse {
    Success {
        success: bool,
        message: String,
        count: usize,
        data: Snapshot,
    },
    Failure {
        success: bool,
        message: String,
        error: String,
    },
}

impl FetchResponse {
    pub fn status_code(&self) -> u16 {
        match self {
            FetchResponse::Success { .. } => 200,
            FetchResponse::Failure { .. } => 500,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchResponse::Success { .. })
    }
}

impl From<Result<Snapshot, FetchError>> for FetchResponse {
    fn from(result: Result<Snapshot, FetchError>) -> Self {
        match result {
            Ok(snapshot) => FetchResponse::Success {
                success: true,
                message: SUCCESS_MESSAGE.into(),
                count: snapshot.total_issues(),
                data: snapshot,
            },
            Err(err) => FetchResponse::Failure {
                success: false,
                message: FAILURE_MESSAGE.into(),
                error: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::error::StorageError;
    use crate::model::issue::Issue;
    use crate::providers::tests::MockSource;
    use crate::store::MemoryStore;

    struct BrokenStore;

    #[async_trait]
    impl SnapshotStore for BrokenStore {
        async fn persist(&self, _meta: SnapshotMeta, _issues: Vec<Issue>) -> Result<Snapshot, StorageError> {
            Err(StorageError::io(
                std::path::Path::new("/snapshots"),
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            ))
        }
    }

    fn raw_issues() -> Vec<serde_json::Value> {
        vec![
            json!({ "key": "FD-1", "fields": { "summary": "First", "duedate": "2000-01-01" } }),
            json!({ "key": "FD-2", "fields": { "summary": "Second" } }),
        ]
    }

    #[tokio::test]
    async fn stores_normalized_snapshot() {
        let source = MockSource::new(raw_issues());
        let store = MemoryStore::new();

        let snapshot = run_fetch(&source, &store, &FieldIds::default(), SnapshotMeta::default())
            .await
            .unwrap();

        assert_eq!(snapshot.total_issues(), 2);
        assert_eq!(snapshot.issues()[0].key, "FD-1");
        assert!(snapshot.issues()[0].is_overdue);
        assert!(!snapshot.issues()[1].is_overdue);
        assert_eq!(store.snapshots(), vec![snapshot]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_payload_stores_empty_snapshot() {
        let source = MockSource::new(vec![]);
        let store = MemoryStore::new();

        let snapshot = run_fetch(&source, &store, &FieldIds::default(), SnapshotMeta::default())
            .await
            .unwrap();

        assert_eq!(snapshot.total_issues(), 0);
        assert_eq!(store.snapshots().len(), 1);
    }

    #[tokio::test]
    async fn provider_failure_stores_nothing() {
        let source = MockSource::failing(reqwest::StatusCode::UNAUTHORIZED);
        let store = MemoryStore::new();

        let err = run_fetch(&source, &store, &FieldIds::default(), SnapshotMeta::default())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Provider(_)));
        assert!(store.snapshots().is_empty());
    }

    #[tokio::test]
    async fn storage_failure_surfaces() {
        let source = MockSource::new(raw_issues());
        let err = run_fetch(&source, &BrokenStore, &FieldIds::default(), SnapshotMeta::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Storage(_)));
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn success_envelope() {
        let snapshot = Snapshot::new(SnapshotMeta::default(), vec![Issue::with_key("FD-1")]);
        let response = FetchResponse::from(Ok(snapshot));
        assert_eq!(response.status_code(), 200);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], SUCCESS_MESSAGE);
        assert_eq!(json["count"], 1);
        assert_eq!(json["data"]["total_issues"], 1);
    }

    #[test]
    fn failure_envelope() {
        let err = FetchError::Storage(StorageError::NotFound("abc".into()));
        let response = FetchResponse::from(Err(err));
        assert_eq!(response.status_code(), 500);
        assert!(!response.is_success());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], FAILURE_MESSAGE);
        assert_eq!(json["error"], "snapshot abc not found");
        assert!(json.get("data").is_none());
    }
}
