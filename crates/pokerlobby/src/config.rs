//! Client configuration.

use std::time::Duration;

use pokerlobby_transport::DEFAULT_CONNECT_TIMEOUT;

use crate::ClientError;

/// Settings for a [`LobbyClient`](crate::LobbyClient) and its
/// [`ConnectionManager`](crate::ConnectionManager).
///
/// Build one with `ClientConfig::default()` and struct update syntax, with
/// [`ClientConfig::from_env`], or through
/// [`LobbyClientBuilder`](crate::LobbyClientBuilder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Lobby server host name or IP address.
    pub host: String,

    /// Lobby server TCP port.
    pub port: u16,

    /// Protocol version written into every request header.
    pub protocol_version: u8,

    /// How long a single TCP connect may take.
    pub connect_timeout: Duration,

    /// Total connect tries before giving up (at least 1). Only connecting
    /// is ever retried; requests are not, because the protocol can't tell
    /// a duplicate request from a new one.
    pub connect_attempts: u32,

    /// Pause between connect tries.
    pub retry_backoff: Duration,

    /// Upper bound on waiting for a reply. `None` waits as long as the
    /// socket stays open.
    pub response_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            protocol_version: 1,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            connect_attempts: 1,
            retry_backoff: Duration::from_millis(500),
            response_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Prefix shared by all environment variables read by [`from_env`](Self::from_env).
    pub const ENV_PREFIX: &'static str = "POKERLOBBY_";

    /// Starts from the defaults and applies any of these variables that
    /// are set:
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `POKERLOBBY_HOST` | `host` |
    /// | `POKERLOBBY_PORT` | `port` |
    /// | `POKERLOBBY_PROTOCOL_VERSION` | `protocol_version` |
    /// | `POKERLOBBY_CONNECT_TIMEOUT_MS` | `connect_timeout` |
    /// | `POKERLOBBY_CONNECT_ATTEMPTS` | `connect_attempts` |
    /// | `POKERLOBBY_RESPONSE_TIMEOUT_MS` | `response_timeout` |
    ///
    /// # Errors
    /// Returns [`ClientError::Config`] if a variable is set but doesn't
    /// parse.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{name}", Self::ENV_PREFIX));
        let mut config = Self::default();

        if let Some(host) = var("HOST") {
            config.host = host;
        }
        if let Some(port) = var("PORT") {
            config.port = parse("PORT", &port)?;
        }
        if let Some(version) = var("PROTOCOL_VERSION") {
            config.protocol_version = parse("PROTOCOL_VERSION", &version)?;
        }
        if let Some(ms) = var("CONNECT_TIMEOUT_MS") {
            config.connect_timeout = Duration::from_millis(parse("CONNECT_TIMEOUT_MS", &ms)?);
        }
        if let Some(attempts) = var("CONNECT_ATTEMPTS") {
            config.connect_attempts = parse("CONNECT_ATTEMPTS", &attempts)?;
        }
        if let Some(ms) = var("RESPONSE_TIMEOUT_MS") {
            config.response_timeout =
                Some(Duration::from_millis(parse("RESPONSE_TIMEOUT_MS", &ms)?));
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ClientError> {
    value.trim().parse().map_err(|_| {
        ClientError::Config(format!(
            "{}{name}: cannot parse {value:?}",
            ClientConfig::ENV_PREFIX
        ))
    })
}
