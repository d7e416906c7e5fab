use thiserror::Error;

/// The single outbound Jira call failed.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Jira API request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Jira API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse Jira response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Writing or reading a snapshot document failed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("snapshot store I/O failed at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to decode snapshot at {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot {0} not found")]
    NotFound(String),
}

impl StorageError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
