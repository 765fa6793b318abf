use std::time::Duration;

use crate::domain::ConfigError;

/// Construction-time settings shared by every poller-backed component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    /// Minimum time between the end of one cycle and the next fetch.
    pub interval: Duration,
    /// Prefix for every log line the component writes.
    pub label: String,
    /// Log a span around every fetch, with its duration.
    pub trace_fetches: bool,
}

impl PollOptions {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            label: "poller".to_owned(),
            trace_fetches: false,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn trace_fetches(mut self, enabled: bool) -> Self {
        self.trace_fetches = enabled;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}
