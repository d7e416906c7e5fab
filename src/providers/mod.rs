pub mod jira;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderError;

/// One page of raw issues from a tracker.
///
/// The pipeline only needs the undecoded issue objects; normalizing them is
/// not the source's job.
#[async_trait]
pub trait IssueSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_issues(&self) -> Result<Vec<Value>, ProviderError>;
}
