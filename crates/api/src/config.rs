use std::str::FromStr;
use std::time::Duration;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
}

/// Tuning knobs for the WebSocket broadcast relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Bound of each connection's outbound queue (default: `256`).
    pub queue_capacity: usize,
    /// Maximum time a single socket write may take before the connection
    /// is closed (default: `5000` ms).
    pub send_timeout: Duration,
    /// Largest inbound message accepted; bigger frames close the
    /// connection (default: `65536` bytes).
    pub max_message_bytes: usize,
    /// Messages a connection may drop on a full queue before it is
    /// disconnected. `0` never disconnects (default: `100`).
    pub max_drops: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            send_timeout: Duration::from_millis(5000),
            max_message_bytes: 64 * 1024,
            max_drops: 100,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for background tasks during shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Broadcast relay settings.
    pub relay: RelayConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                       |
    /// | `RELAY_QUEUE_CAPACITY`    | `256`                      |
    /// | `RELAY_SEND_TIMEOUT_MS`   | `5000`                     |
    /// | `RELAY_MAX_MESSAGE_BYTES` | `65536`                    |
    /// | `RELAY_MAX_DROPS`         | `100`                      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;
        let shutdown_timeout_secs: u64 = parse_or(&lookup, "SHUTDOWN_TIMEOUT_SECS", 30)?;

        let defaults = RelayConfig::default();
        let queue_capacity: usize =
            parse_or(&lookup, "RELAY_QUEUE_CAPACITY", defaults.queue_capacity)?;
        if queue_capacity == 0 {
            return Err(ConfigError::Zero {
                key: "RELAY_QUEUE_CAPACITY",
            });
        }
        let send_timeout_ms: u64 = parse_or(&lookup, "RELAY_SEND_TIMEOUT_MS", 5000)?;
        if send_timeout_ms == 0 {
            return Err(ConfigError::Zero {
                key: "RELAY_SEND_TIMEOUT_MS",
            });
        }
        let max_message_bytes: usize =
            parse_or(&lookup, "RELAY_MAX_MESSAGE_BYTES", defaults.max_message_bytes)?;
        if max_message_bytes == 0 {
            return Err(ConfigError::Zero {
                key: "RELAY_MAX_MESSAGE_BYTES",
            });
        }
        let max_drops: u64 = parse_or(&lookup, "RELAY_MAX_DROPS", defaults.max_drops)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            relay: RelayConfig {
                queue_capacity,
                send_timeout: Duration::from_millis(send_timeout_ms),
                max_message_bytes,
                max_drops,
            },
        })
    }
}

/// Parse `key` if set, otherwise fall back to `default`.
fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
