//! Push-based fan-out of every poll outcome to live subscribers.
use std::{
    collections::HashMap,
    pin::Pin,
    sync::{Arc, Mutex, Weak},
    task::{Context, Poll},
    time::Duration,
};

use futures_util::{Stream, StreamExt};
use log::{debug, info, warn};
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::application::{lock, PollOptions, Poller};
use crate::domain::{ConfigError, Fetch, Outcome, SubscriberId};

/// Outcomes a subscriber may fall behind by before it is dropped.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 8;

/// Something subscribers can follow. Implemented by [`BroadcastStreamer`] and,
/// for when streaming is switched off, by [`NoopStreamer`].
pub trait Streamer<T>: Send + Sync {
    fn subscribe(&self) -> Subscription<T>;

    fn stop(&self);
}

/// Polls a "current state" fetch and forwards every outcome to all
/// subscribers registered at the time it arrives.
///
/// Forwarding never waits on a subscriber: each one gets a buffer of `buffer`
/// outcomes, and a subscriber whose buffer is full when the next outcome
/// arrives is dropped. Its stream yields what was buffered and then ends.
#[derive(Debug)]
pub struct BroadcastStreamer<T> {
    poller: Poller<T>,
    registry: Arc<Mutex<Registry<T>>>,
    buffer: usize,
    label: String,
}

#[derive(Debug)]
struct Registry<T> {
    subscribers: HashMap<SubscriberId, mpsc::Sender<Outcome<T>>>,
    stopped: bool,
}

impl<T> Registry<T> {
    fn close(&mut self) {
        self.stopped = true;
        self.subscribers.clear();
    }
}

impl<T> BroadcastStreamer<T>
where
    T: Clone + Send + 'static,
{
    pub fn new<F>(fetch: F, interval: Duration) -> Result<Self, ConfigError>
    where
        F: Fetch<Output = T>,
    {
        Self::with_options(fetch, PollOptions::new(interval), DEFAULT_SUBSCRIBER_BUFFER)
    }

    pub fn with_options<F>(fetch: F, options: PollOptions, buffer: usize) -> Result<Self, ConfigError>
    where
        F: Fetch<Output = T>,
    {
        if buffer == 0 {
            return Err(ConfigError::ZeroBuffer);
        }

        let mut poller = Poller::with_options(fetch, &options)?;
        let registry = Arc::new(Mutex::new(Registry {
            subscribers: HashMap::new(),
            stopped: false,
        }));
        tokio::spawn(fan_out(
            poller.stream(),
            registry.clone(),
            options.label.clone(),
        ));

        Ok(Self {
            poller,
            registry,
            buffer,
            label: options.label,
        })
    }
}

impl<T> BroadcastStreamer<T> {
    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).subscribers.len()
    }
}

impl<T> Streamer<T> for BroadcastStreamer<T>
where
    T: Clone + Send + 'static,
{
    fn subscribe(&self) -> Subscription<T> {
        let (outbound, inbound) = mpsc::channel(self.buffer);
        let id = SubscriberId::new();

        let mut registry = lock(&self.registry);
        if registry.stopped {
            debug!("[{}]: subscription {id} requested after stop", self.label);
        } else {
            debug!("[{}]: subscriber {id} registered", self.label);
            let _ = registry.subscribers.insert(id.clone(), outbound);
        }

        Subscription {
            id,
            inbound,
            registry: Arc::downgrade(&self.registry),
        }
    }

    fn stop(&self) {
        self.poller.stop();
        lock(&self.registry).close();
    }
}

async fn fan_out<T: Clone>(
    outcomes: impl Stream<Item = Outcome<T>>,
    registry: Arc<Mutex<Registry<T>>>,
    label: String,
) {
    tokio::pin!(outcomes);

    while let Some(outcome) = outcomes.next().await {
        let mut live = lock(&registry);
        live.subscribers
            .retain(|id, outbound| match outbound.try_send(outcome.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!("[{label}]: subscriber {id} fell behind, dropping it");
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("[{label}]: subscriber {id} went away");
                    false
                }
            });
    }

    lock(&registry).close();
    debug!("[{label}]: all subscriptions closed");
}

/// One subscriber's view of a [`Streamer`].
///
/// Dropping the subscription, or calling [`Subscription::cancel`],
/// deregisters it right away.
#[derive(Debug)]
pub struct Subscription<T> {
    id: SubscriberId,
    inbound: mpsc::Receiver<Outcome<T>>,
    registry: Weak<Mutex<Registry<T>>>,
}

impl<T> Subscription<T> {
    /// A subscription that has already ended.
    pub fn closed() -> Self {
        let (_, inbound) = mpsc::channel(1);
        Self {
            id: SubscriberId::new(),
            inbound,
            registry: Weak::new(),
        }
    }

    pub fn id(&self) -> &SubscriberId {
        &self.id
    }

    pub fn cancel(self) {
        drop(self)
    }
}

impl<T> Stream for Subscription<T> {
    type Item = Outcome<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inbound.poll_recv(cx)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let _ = lock(&registry).subscribers.remove(&self.id);
        }
    }
}

/// Stands in for a [`BroadcastStreamer`] when streaming is disabled: it never
/// fetches, and every subscription ends immediately.
#[derive(Debug, Clone)]
pub struct NoopStreamer {
    label: String,
}

impl NoopStreamer {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl<T> Streamer<T> for NoopStreamer {
    fn subscribe(&self) -> Subscription<T> {
        info!("[{}]: stream was requested, but streaming is disabled", self.label);
        Subscription::closed()
    }

    fn stop(&self) {}
}
