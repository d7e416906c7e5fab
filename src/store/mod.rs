//! Persistence for assembled snapshots.
//!
//! A snapshot is written once as a single nested document and never updated.

pub mod file;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::model::issue::Issue;
use crate::model::snapshot::{Snapshot, SnapshotMeta};

pub use file::FileStore;
#[cfg(test)]
pub use memory::MemoryStore;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Assemble a snapshot from `issues` and write it in one go.
    ///
    /// Either the whole document is stored or an error is returned and
    /// nothing is visible.
    async fn persist(&self, meta: SnapshotMeta, issues: Vec<Issue>) -> Result<Snapshot, StorageError>;
}
