//! Pull-based cache over a periodically refreshed collection.
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use futures_util::{Stream, StreamExt};
use log::{debug, error, warn};

use crate::application::{lock, PollOptions, Poller};
use crate::domain::{ConfigError, Fetch, FetchError, Outcome, Timestamp};

/// Serves bounded reads of the latest polled collection without ever calling
/// the upstream fetch on the read path.
///
/// Every poll cycle replaces the cached outcome as a whole: a failed cycle
/// leaves no data behind, only its error, and a successful one clears the
/// error. Until the first cycle completes, reads return an empty collection.
#[derive(Debug)]
pub struct RefreshCache<T> {
    poller: Poller<Vec<T>>,
    state: Arc<Mutex<CacheState<T>>>,
    max_limit: usize,
    label: String,
}

#[derive(Debug)]
struct CacheState<T> {
    latest: Outcome<Vec<T>>,
    refreshed_at: Option<Timestamp>,
}

impl<T> Default for CacheState<T> {
    fn default() -> Self {
        Self {
            latest: Ok(Vec::new()),
            refreshed_at: None,
        }
    }
}

impl<T> RefreshCache<T>
where
    T: Clone + Send + 'static,
{
    pub fn new<F>(fetch: F, interval: Duration, max_limit: usize) -> Result<Self, ConfigError>
    where
        F: Fetch<Output = Vec<T>>,
    {
        Self::with_options(fetch, PollOptions::new(interval), max_limit)
    }

    pub fn with_options<F>(
        fetch: F,
        options: PollOptions,
        max_limit: usize,
    ) -> Result<Self, ConfigError>
    where
        F: Fetch<Output = Vec<T>>,
    {
        if max_limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }

        let mut poller = Poller::with_options(fetch, &options)?;
        let state = Arc::new(Mutex::new(CacheState::default()));
        tokio::spawn(populate(
            poller.stream(),
            state.clone(),
            options.label.clone(),
        ));

        Ok(Self {
            poller,
            state,
            max_limit,
            label: options.label,
        })
    }

    /// Returns at most `min(limit, max_limit)` items of the cached collection,
    /// or the error of the most recent poll cycle.
    pub fn read(&self, limit: usize) -> Result<Vec<T>, FetchError> {
        let mut limit = limit;
        if self.max_limit < limit {
            warn!(
                "[{}]: requested limit {limit} is greater than the internal limit {}",
                self.label, self.max_limit
            );
            limit = self.max_limit;
        }

        let state = lock(&self.state);
        match &state.latest {
            Ok(items) => Ok(items[..limit.min(items.len())].to_vec()),
            Err(why) => Err(why.clone()),
        }
    }
}

impl<T> RefreshCache<T> {
    pub fn stop(&self) {
        self.poller.stop();
    }

    pub fn max_limit(&self) -> usize {
        self.max_limit
    }

    /// When the cached outcome was last replaced, if ever.
    pub fn last_refreshed(&self) -> Option<Timestamp> {
        lock(&self.state).refreshed_at
    }
}

async fn populate<T>(
    outcomes: impl Stream<Item = Outcome<Vec<T>>>,
    state: Arc<Mutex<CacheState<T>>>,
    label: String,
) {
    tokio::pin!(outcomes);

    while let Some(outcome) = outcomes.next().await {
        match &outcome {
            Ok(items) => debug!("[{label}]: cached {} items", items.len()),
            Err(why) => error!("[{label}]: failed to refresh: {why}"),
        }

        {
            let mut cached = lock(&state);
            cached.latest = outcome;
            cached.refreshed_at = Some(Timestamp::now());
        }
    }
}
