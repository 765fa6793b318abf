pub mod http_server;
pub mod provider;
pub mod toml_config;

pub use self::http_server::{serve, AppState};
pub use self::provider::*;
pub use self::toml_config::{AppConfig, GithubConfig, MusicConfig};
