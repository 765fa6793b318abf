pub mod broadcast_streamer;
pub mod commits_precacher;
pub mod current_streamer;
pub mod options;
pub mod poller;
pub mod refresh_cache;
pub mod traced_fetch;

pub use broadcast_streamer::{
    BroadcastStreamer, NoopStreamer, Streamer, Subscription, DEFAULT_SUBSCRIBER_BUFFER,
};
pub use commits_precacher::{CommitService, CommitsPrecacher};
pub use current_streamer::{current_streamer, CurrentStreamer};
pub use options::PollOptions;
pub use poller::Poller;
pub use refresh_cache::RefreshCache;
pub use traced_fetch::TracedFetch;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
