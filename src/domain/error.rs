use std::fmt::Display;

/// Classifies why a poll cycle failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The upstream call itself failed.
    Fetch,
    /// The upstream answered, but with a payload of an unexpected shape.
    UnexpectedValue,
}

/// The failure half of an [`Outcome`](crate::domain::Outcome).
///
/// Failures are data: they are cached and broadcast like values, so this type
/// is cheap to clone and compares by kind and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: ErrorKind,
    message: String,
}

impl FetchError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fetch, message)
    }

    pub fn unexpected_value(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnexpectedValue, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ErrorKind::Fetch => f.write_fmt(format_args!("failed to fetch: {}", self.message)),
            ErrorKind::UnexpectedValue => {
                f.write_fmt(format_args!("unexpected upstream value: {}", self.message))
            }
        }
    }
}
impl std::error::Error for FetchError {}

/// Rejected construction-time settings. Nothing is spawned when one of these
/// is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroInterval,
    ZeroLimit,
    ZeroBuffer,
}
impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroInterval => f.write_str("poll interval must be greater than zero."),
            ConfigError::ZeroLimit => f.write_str("limit must be greater than zero."),
            ConfigError::ZeroBuffer => {
                f.write_str("subscriber buffer must hold at least one outcome.")
            }
        }
    }
}
impl std::error::Error for ConfigError {}
