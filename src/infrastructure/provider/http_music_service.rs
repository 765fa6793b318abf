use reqwest::{Client, StatusCode};
use serde_derive::Deserialize;

use crate::domain::{CurrentlyPlaying, FetchError, MusicService, Url};

/// Reads a Spotify-style "currently playing" endpoint.
#[derive(Debug)]
pub struct HttpMusicService {
    client: Client,
    url: Url,
    token: Option<String>,
}

impl HttpMusicService {
    pub fn new(url: Url, token: Option<String>) -> Self {
        let client = Client::new();
        Self { client, url, token }
    }
}

#[async_trait::async_trait]
impl MusicService for HttpMusicService {
    async fn current(&self) -> Result<Option<CurrentlyPlaying>, FetchError> {
        let mut request = self.client.get(self.url.as_str());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let playing: PlayingResponse = response.json().await?;
        Ok(playing.into())
    }
}

#[derive(Deserialize, Debug)]
struct PlayingResponse {
    is_playing: bool,
    progress_ms: Option<u64>,
    item: Option<Track>,
}

#[derive(Deserialize, Debug)]
struct Track {
    name: String,
    duration_ms: Option<u64>,
    #[serde(default)]
    artists: Vec<Artist>,
}

#[derive(Deserialize, Debug)]
struct Artist {
    name: String,
}

impl From<PlayingResponse> for Option<CurrentlyPlaying> {
    fn from(r: PlayingResponse) -> Self {
        let PlayingResponse {
            is_playing,
            progress_ms,
            item,
        } = r;
        // Ads and local files come without an item.
        let track = item?;

        Some(CurrentlyPlaying {
            track: track.name,
            artists: track.artists.into_iter().map(|x| x.name).collect(),
            is_playing,
            progress_ms,
            duration_ms: track.duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_a_playing_track() {
        let payload = r#"{
            "is_playing": true,
            "progress_ms": 42000,
            "item": {
                "name": "Windowlicker",
                "duration_ms": 367000,
                "artists": [{ "name": "Aphex Twin" }]
            }
        }"#;

        let playing: Option<CurrentlyPlaying> =
            serde_json::from_str::<PlayingResponse>(payload).unwrap().into();
        assert_eq!(
            playing,
            Some(CurrentlyPlaying {
                track: "Windowlicker".to_owned(),
                artists: vec!["Aphex Twin".to_owned()],
                is_playing: true,
                progress_ms: Some(42000),
                duration_ms: Some(367000),
            })
        );
    }

    #[test]
    fn missing_item_means_nothing_playing() {
        let payload = r#"{ "is_playing": true, "progress_ms": null, "item": null }"#;
        let playing: Option<CurrentlyPlaying> =
            serde_json::from_str::<PlayingResponse>(payload).unwrap().into();
        assert_eq!(playing, None);
    }
}
