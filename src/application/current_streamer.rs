use std::sync::Arc;

use log::info;

use crate::application::{BroadcastStreamer, NoopStreamer, PollOptions, Streamer};
use crate::domain::{ConfigError, CurrentlyPlaying, MusicService, StreamerSettings};

pub type CurrentStreamer = Box<dyn Streamer<Option<CurrentlyPlaying>>>;

/// Streams what is currently playing, or a no-op stand-in when streaming is
/// disabled.
pub fn current_streamer<S>(
    service: Arc<S>,
    settings: &StreamerSettings,
) -> Result<CurrentStreamer, ConfigError>
where
    S: MusicService + 'static,
{
    if !settings.enabled {
        info!("[music]: currently-playing streamer is disabled");
        return Ok(Box::new(NoopStreamer::new("music")));
    }

    let fetch = move || {
        let service = service.clone();
        async move { service.current().await }
    };
    let options = PollOptions::new(settings.poll_interval).label("music");
    let streamer = BroadcastStreamer::with_options(fetch, options, settings.buffer)?;

    Ok(Box::new(streamer))
}
