use std::time::Instant;

use log::{debug, trace, warn};

use crate::domain::{Fetch, Outcome};

/// Wraps a [`Fetch`] and logs a span around every call.
#[derive(Debug)]
pub struct TracedFetch<F> {
    inner: F,
    label: String,
}

impl<F: Fetch> TracedFetch<F> {
    pub fn new(inner: F, label: impl Into<String>) -> Self {
        Self {
            inner,
            label: label.into(),
        }
    }
}

#[async_trait::async_trait]
impl<F: Fetch> Fetch for TracedFetch<F> {
    type Output = F::Output;

    async fn fetch(&self) -> Outcome<Self::Output> {
        let label = &self.label;
        trace!("[{label}]: fetch started");

        let started = Instant::now();
        let outcome = self.inner.fetch().await;
        let elapsed = started.elapsed();

        match &outcome {
            Ok(_) => debug!("[{label}]: fetch succeeded in {elapsed:?}"),
            Err(why) => warn!("[{label}]: fetch failed in {elapsed:?}: {why}"),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FetchError;

    #[tokio::test]
    async fn passes_outcomes_through_untouched() {
        let ok = TracedFetch::new(|| async { Ok::<_, FetchError>(7) }, "test");
        assert_eq!(ok.fetch().await, Ok(7));

        let err = TracedFetch::new(
            || async { Err::<u8, _>(FetchError::fetch("timed out")) },
            "test",
        );
        assert_eq!(err.fetch().await, Err(FetchError::fetch("timed out")));
    }
}
