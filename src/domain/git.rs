use serde_derive::{Deserialize, Serialize};

use crate::domain::{FetchError, Timestamp};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GitCommit {
    pub sha: String,
    pub message: String,
    pub author: Option<String>,
    pub url: String,
    pub authored_at: Option<Timestamp>,
}

#[async_trait::async_trait]
pub trait GitCommitService: Send + Sync {
    /// Returns at most `limit` commits, newest first.
    async fn recent_commits(&self, limit: usize) -> Result<Vec<GitCommit>, FetchError>;

    async fn commit(&self, sha: &str) -> Result<Option<GitCommit>, FetchError>;
}
