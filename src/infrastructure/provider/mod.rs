pub mod github_commit_service;
pub mod http_music_service;

pub use self::github_commit_service::GithubCommitService;
pub use self::http_music_service::HttpMusicService;

use crate::domain::FetchError;

/// Payloads that fail to decode are upstream shape problems, everything else
/// is a failed call.
impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::unexpected_value(e.to_string())
        } else {
            FetchError::fetch(e.to_string())
        }
    }
}
