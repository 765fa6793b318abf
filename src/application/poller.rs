//! Periodic execution of a [`Fetch`] on a background task.
use std::time::Duration;

use futures_util::Stream;
use log::{debug, trace, warn};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time,
};

use crate::application::{PollOptions, TracedFetch};
use crate::domain::{ConfigError, Fetch, Outcome};

/// Runs a fetch operation every `interval` and emits one [`Outcome`] per cycle.
///
/// The poller starts running as soon as it is constructed and stops exactly
/// once, on [`Poller::stop`] or when it is dropped. After that the outcome
/// stream terminates.
#[derive(Debug)]
pub struct Poller<T> {
    stop: watch::Sender<bool>,
    outcomes: Option<mpsc::Receiver<Outcome<T>>>,
    handle: JoinHandle<()>,
    label: String,
}

impl<T: Send + 'static> Poller<T> {
    pub fn new<F>(fetch: F, interval: Duration) -> Result<Self, ConfigError>
    where
        F: Fetch<Output = T>,
    {
        Self::with_options(fetch, &PollOptions::new(interval))
    }

    pub fn with_options<F>(fetch: F, options: &PollOptions) -> Result<Self, ConfigError>
    where
        F: Fetch<Output = T>,
    {
        options.validate()?;

        let (stop, stopped) = watch::channel(false);
        // Capacity 1 is the closest tokio gets to a rendezvous channel; the
        // consumer is expected to keep up.
        let (outbound, inbound) = mpsc::channel(1);

        let label = options.label.clone();
        let interval = options.interval;
        let handle = if options.trace_fetches {
            let fetch = TracedFetch::new(fetch, label.clone());
            tokio::spawn(poll_loop(fetch, interval, stopped, outbound, label.clone()))
        } else {
            tokio::spawn(poll_loop(fetch, interval, stopped, outbound, label.clone()))
        };

        Ok(Self {
            stop,
            outcomes: Some(inbound),
            handle,
            label,
        })
    }

    /// Takes the outcome stream. Only the first call gets the real stream,
    /// later calls get one that is already terminated.
    pub fn stream(&mut self) -> impl Stream<Item = Outcome<T>> {
        let inbound = self.outcomes.take();
        if inbound.is_none() {
            warn!("[{}]: outcome stream was already taken", self.label);
        }

        async_stream::stream! {
            if let Some(mut inbound) = inbound {
                while let Some(x) = inbound.recv().await {
                    yield x
                }
            }
        }
    }
}

impl<T> Poller<T> {
    /// Stops polling. Calling this more than once has no further effect.
    pub fn stop(&self) {
        let was_stopped = self.stop.send_replace(true);
        if !was_stopped {
            debug!("[{}]: stop requested", self.label);
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop.borrow()
    }

    /// Whether the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop<F: Fetch>(
    fetch: F,
    interval: Duration,
    mut stopped: watch::Receiver<bool>,
    outbound: mpsc::Sender<Outcome<F::Output>>,
    label: String,
) {
    loop {
        tokio::select! {
            biased;
            _ = wait_stopped(&mut stopped) => break,
            _ = time::sleep(interval) => (),
        }

        // An in-flight fetch is never cancelled, only its outcome is discarded.
        let outcome = fetch.fetch().await;
        if let Err(why) = &outcome {
            debug!("[{label}]: poll cycle failed: {why}");
        }

        tokio::select! {
            biased;
            _ = wait_stopped(&mut stopped) => break,
            sent = outbound.send(outcome) => {
                if sent.is_err() {
                    trace!("[{label}]: no consumer left, shutting down");
                    break;
                }
            }
        }
    }

    debug!("[{label}]: poller stopped");
}

/// Resolves once a stop is requested or the poller handle is gone.
async fn wait_stopped(stopped: &mut watch::Receiver<bool>) {
    let _ = stopped.wait_for(|x| *x).await;
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use futures_util::StreamExt;

    use super::*;
    use crate::domain::FetchError;

    fn counting_fetch(calls: Arc<AtomicUsize>) -> impl Fetch<Output = usize> {
        move || {
            let calls = calls.clone();
            async move { Ok::<_, FetchError>(calls.fetch_add(1, Ordering::SeqCst) + 1) }
        }
    }

    #[tokio::test]
    async fn rejects_zero_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let result = Poller::new(counting_fetch(calls), Duration::ZERO);
        assert_eq!(result.err(), Some(ConfigError::ZeroInterval));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_one_interval_before_the_first_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let _poller = Poller::new(counting_fetch(calls.clone()), Duration::from_millis(10));

        time::sleep(Duration::from_millis(5)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_stop_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let fetch = move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            async move {
                if n % 2 == 0 {
                    Ok(n)
                } else {
                    Err(FetchError::fetch(format!("cycle {n}")))
                }
            }
        };

        let mut poller = Poller::new(fetch, Duration::from_millis(10)).unwrap();
        let outcomes: Vec<_> = poller.stream().take(4).collect().await;

        assert_eq!(
            outcomes,
            vec![
                Ok(0),
                Err(FetchError::fetch("cycle 1")),
                Ok(2),
                Err(FetchError::fetch("cycle 3")),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stream_is_consumable_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut poller = Poller::new(counting_fetch(calls), Duration::from_millis(10)).unwrap();

        let first = poller.stream();
        let second: Vec<_> = poller.stream().collect().await;
        assert!(second.is_empty());

        tokio::pin!(first);
        assert_eq!(first.next().await, Some(Ok(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_fetches_plateau() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut poller =
            Poller::new(counting_fetch(calls.clone()), Duration::from_millis(10)).unwrap();
        let outcomes = poller.stream();
        tokio::pin!(outcomes);

        assert_eq!(outcomes.next().await, Some(Ok(1)));
        assert_eq!(outcomes.next().await, Some(Ok(2)));

        poller.stop();
        poller.stop();
        assert!(poller.is_stopped());

        assert_eq!(outcomes.next().await, None);
        let seen = calls.load(Ordering::SeqCst);
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), seen);
        assert!(poller.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_unblocks_a_pending_emission() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut poller =
            Poller::new(counting_fetch(calls.clone()), Duration::from_millis(10)).unwrap();
        // Hold the stream without reading it: one outcome fills the channel and
        // the next send blocks.
        let _outcomes = poller.stream();

        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!poller.is_finished());

        poller.stop();
        time::sleep(Duration::from_millis(1)).await;
        assert!(poller.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_poller_stops_it() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut poller =
            Poller::new(counting_fetch(calls.clone()), Duration::from_millis(10)).unwrap();
        let outcomes = poller.stream();
        drop(poller);

        let outcomes: Vec<_> = outcomes.collect().await;
        assert!(outcomes.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
