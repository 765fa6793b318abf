use serde_derive::{Deserialize, Serialize};

use crate::domain::FetchError;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CurrentlyPlaying {
    pub track: String,
    pub artists: Vec<String>,
    pub is_playing: bool,
    pub progress_ms: Option<u64>,
    pub duration_ms: Option<u64>,
}

#[async_trait::async_trait]
pub trait MusicService: Send + Sync {
    /// What is playing right now, if anything.
    async fn current(&self) -> Result<Option<CurrentlyPlaying>, FetchError>;
}
