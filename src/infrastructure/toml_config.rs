use std::{fmt::Display, time::Duration};

use serde_derive::Deserialize;

use crate::domain::{ConfigError, PrecacherSettings, StreamerSettings, Url};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub github: GithubConfig,
    pub commits: PrecacherSettings,
    /// `None` when no music provider is configured.
    pub music: Option<MusicConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GithubConfig {
    pub api_url: Url,
    pub owner: String,
    pub repo: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MusicConfig {
    pub url: Url,
    pub token: Option<String>,
    pub streamer: StreamerSettings,
}

#[derive(Deserialize, Debug)]
struct TomlConfig {
    server: Option<TomlServer>,
    github: TomlGithub,
    commits: Option<TomlPrecacher>,
    music: Option<TomlMusic>,
}

#[derive(Deserialize, Debug)]
struct TomlServer {
    port: Option<u16>,
}

#[derive(Deserialize, Debug)]
struct TomlGithub {
    api_url: Option<Url>,
    owner: String,
    repo: String,
    token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TomlPrecacher {
    enabled: Option<bool>,
    interval_secs: Option<u64>,
    limit: Option<usize>,
    trace: Option<bool>,
}

#[derive(Deserialize, Debug)]
struct TomlMusic {
    url: Url,
    token: Option<String>,
    streamer: Option<TomlStreamer>,
}

#[derive(Deserialize, Debug)]
struct TomlStreamer {
    enabled: Option<bool>,
    poll_interval_ms: Option<u64>,
    buffer: Option<usize>,
}

impl From<TomlPrecacher> for PrecacherSettings {
    fn from(c: TomlPrecacher) -> Self {
        let TomlPrecacher {
            enabled,
            interval_secs,
            limit,
            trace,
        } = c;
        let default = PrecacherSettings::default();
        Self {
            enabled: enabled.unwrap_or(default.enabled),
            interval: interval_secs
                .map(Duration::from_secs)
                .unwrap_or(default.interval),
            limit: limit.unwrap_or(default.limit),
            trace: trace.unwrap_or(default.trace),
        }
    }
}

impl From<TomlStreamer> for StreamerSettings {
    fn from(c: TomlStreamer) -> Self {
        let TomlStreamer {
            enabled,
            poll_interval_ms,
            buffer,
        } = c;
        let default = StreamerSettings::default();
        Self {
            enabled: enabled.unwrap_or(default.enabled),
            poll_interval: poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(default.poll_interval),
            buffer: buffer.unwrap_or(default.buffer),
        }
    }
}

impl TryFrom<TomlConfig> for AppConfig {
    type Error = ConfigError;

    fn try_from(c: TomlConfig) -> Result<Self, Self::Error> {
        let TomlConfig {
            server,
            github,
            commits,
            music,
        } = c;

        let api_url = github.api_url.unwrap_or_else(|| {
            Url::new(DEFAULT_GITHUB_API_URL.to_owned()).expect("default API URL is valid")
        });
        let commits: PrecacherSettings = commits.map(Into::into).unwrap_or_default();
        if commits.enabled {
            validate_precacher(&commits)?;
        }

        let music = match music {
            Some(m) => {
                let streamer: StreamerSettings = m.streamer.map(Into::into).unwrap_or_default();
                if streamer.enabled {
                    validate_streamer(&streamer)?;
                }
                Some(MusicConfig {
                    url: m.url,
                    token: m.token,
                    streamer,
                })
            }
            None => None,
        };

        Ok(Self {
            port: server.and_then(|x| x.port).unwrap_or(DEFAULT_PORT),
            github: GithubConfig {
                api_url,
                owner: github.owner,
                repo: github.repo,
                token: github.token,
            },
            commits,
            music,
        })
    }
}

fn validate_precacher(s: &PrecacherSettings) -> Result<(), ConfigError> {
    if s.interval.is_zero() {
        return Err(ConfigError::ZeroInterval);
    }
    if s.limit == 0 {
        return Err(ConfigError::ZeroLimit);
    }
    Ok(())
}

fn validate_streamer(s: &StreamerSettings) -> Result<(), ConfigError> {
    if s.poll_interval.is_zero() {
        return Err(ConfigError::ZeroInterval);
    }
    if s.buffer == 0 {
        return Err(ConfigError::ZeroBuffer);
    }
    Ok(())
}

/// Reads and validates the TOML configuration file at `path`.
pub async fn load(path: &str) -> Result<AppConfig, Error> {
    let toml = tokio::fs::read_to_string(path).await?;
    parse(&toml)
}

pub fn parse(toml: &str) -> Result<AppConfig, Error> {
    let config: TomlConfig = toml::from_str(toml)?;
    Ok(AppConfig::try_from(config)?)
}

#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    TomlError(toml::de::Error),
    InvalidConfig(ConfigError),
}
impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IoError(e) => f.write_fmt(format_args!("IO error: {e}")),
            Error::TomlError(e) => f.write_fmt(format_args!("Toml error: {e}")),
            Error::InvalidConfig(e) => f.write_fmt(format_args!("Invalid config: {e}")),
        }
    }
}
impl std::error::Error for Error {}
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e)
    }
}
impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::TomlError(e)
    }
}
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::InvalidConfig(e)
    }
}
