pub mod id;
pub mod timestamp;
pub mod url;

pub use self::id::SubscriberId;
pub use self::timestamp::Timestamp;
pub use self::url::Url;

use std::time::Duration;

/// How a read-heavy service is precached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecacherSettings {
    pub enabled: bool,
    pub interval: Duration,
    pub limit: usize,
    pub trace: bool,
}
impl Default for PrecacherSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(60),
            limit: 10,
            trace: false,
        }
    }
}

/// How a "current state" service is streamed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamerSettings {
    pub enabled: bool,
    pub poll_interval: Duration,
    pub buffer: usize,
}
impl Default for StreamerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval: Duration::from_secs(5),
            buffer: 8,
        }
    }
}
