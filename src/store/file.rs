use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::SnapshotStore;
use crate::error::StorageError;
use crate::model::issue::Issue;
use crate::model::snapshot::{Snapshot, SnapshotMeta, SnapshotSummary};

/// One JSON document per snapshot in a directory.
///
/// Documents are written to a hidden temp file and renamed into place, so a
/// reader sees either the complete snapshot or nothing.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn document_name(snapshot: &Snapshot) -> String {
        format!(
            "{}-{}.json",
            snapshot.timestamp().format("%Y%m%dT%H%M%SZ"),
            snapshot.id()
        )
    }

    /// Load one stored snapshot by id.
    pub async fn load(&self, id: &str) -> Result<Snapshot, StorageError> {
        let suffix = format!("-{id}.json");
        let path = self
            .document_paths()
            .await?
            .into_iter()
            .find(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(&suffix))
            })
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        read_document(&path).await
    }

    /// Metadata of every stored snapshot, newest first.
    ///
    /// Documents that fail to parse are skipped.
    pub async fn list(&self) -> Result<Vec<SnapshotSummary>, StorageError> {
        let mut summaries = Vec::new();
        for path in self.document_paths().await? {
            match read_document(&path).await {
                Ok(snapshot) => summaries.push(snapshot.summary()),
                Err(err) => tracing::warn!(path = %path.display(), %err, "skipping unreadable snapshot"),
            }
        }
        summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(summaries)
    }

    async fn document_paths(&self) -> Result<Vec<PathBuf>, StorageError> {
        let mut paths = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(paths),
            Err(err) => return Err(StorageError::io(&self.dir, err)),
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io(&self.dir, e))?
        {
            let path = entry.path();
            let is_document = path.extension().is_some_and(|ext| ext == "json")
                && !path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.'));
            if is_document {
                paths.push(path);
            }
        }
        Ok(paths)
    }
}

async fn read_document(path: &Path) -> Result<Snapshot, StorageError> {
    let contents = tokio::fs::read(path)
        .await
        .map_err(|e| StorageError::io(path, e))?;
    serde_json::from_slice(&contents).map_err(|source| StorageError::Decode {
        path: path.display().to_string(),
        source,
    })
}

#[async_trait]
impl SnapshotStore for FileStore {
    async fn persist(&self, meta: SnapshotMeta, issues: Vec<Issue>) -> Result<Snapshot, StorageError> {
        let snapshot = Snapshot::new(meta, issues);
        let json = serde_json::to_vec_pretty(&snapshot)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StorageError::io(&self.dir, e))?;

        let name = Self::document_name(&snapshot);
        let final_path = self.dir.join(&name);
        let tmp_path = self.dir.join(format!(".{name}.tmp"));

        if let Err(err) = tokio::fs::write(&tmp_path, &json).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StorageError::io(&tmp_path, err));
        }
        if let Err(err) = tokio::fs::rename(&tmp_path, &final_path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StorageError::io(&final_path, err));
        }

        tracing::info!(
            id = %snapshot.id(),
            total = snapshot.total_issues(),
            path = %final_path.display(),
            "snapshot stored"
        );
        Ok(snapshot)
    }
}
