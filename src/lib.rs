//! Background-refresh caching for slow upstream reads.
//!
//! A [`Poller`](application::Poller) runs a fetch on a fixed interval. A
//! [`RefreshCache`](application::RefreshCache) keeps its latest outcome for
//! bounded, non-blocking reads, and a
//! [`BroadcastStreamer`](application::BroadcastStreamer) forwards every outcome
//! to live subscribers.
pub mod application;
pub mod domain;
pub mod infrastructure;
