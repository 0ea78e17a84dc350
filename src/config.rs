//! Client configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use thiserror::Error;

const SERVICE_URL_VAR: &str = "DATALENS_SERVICE_URL";
const STREAM_URL_VAR: &str = "DATALENS_STREAM_URL";
const REQUEST_TIMEOUT_VAR: &str = "DATALENS_REQUEST_TIMEOUT_SECS";

const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_STREAM_PATH: &str = "/eventbus";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the dataset service, always carrying a trailing slash.
    pub service_url: String,
    /// WebSocket address of the push event stream.
    pub stream_url: String,
    /// Per-request timeout for gateway calls.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from the environment (and a `.env` file when one
    /// is present).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_overrides(None, None)
    }

    /// Load configuration from the environment, letting explicit overrides
    /// (e.g. CLI flags) win over environment variables.
    pub fn from_env_with_overrides(
        service_url: Option<&str>,
        stream_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let raw_service_url = match service_url {
            Some(url) => url.to_string(),
            None => env::var(SERVICE_URL_VAR).unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string()),
        };
        let service_url = normalize_service_url(&raw_service_url)?;

        let stream_url = match stream_url {
            Some(url) => url.to_string(),
            None => match env::var(STREAM_URL_VAR) {
                Ok(url) => url,
                Err(_) => derive_stream_url(&service_url),
            },
        };

        let request_timeout = match env::var(REQUEST_TIMEOUT_VAR) {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    var: REQUEST_TIMEOUT_VAR,
                    reason: format!("'{}' is not a number of seconds", raw),
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(Self {
            service_url,
            stream_url,
            request_timeout,
        })
    }
}

/// Ensure the base URL is http(s) and carries a trailing slash, so endpoint
/// paths join below it instead of replacing its last path segment.
fn normalize_service_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(ConfigError::InvalidValue {
            var: SERVICE_URL_VAR,
            reason: format!("'{}' is not an http(s) url", raw),
        });
    }
    Ok(format!("{}/", trimmed))
}

/// Derive the event-stream address from the service URL: same host, port and
/// path prefix, ws(s) scheme, `/eventbus` path.
fn derive_stream_url(service_url: &str) -> String {
    let ws = if let Some(rest) = service_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = service_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        // normalize_service_url has already rejected anything else
        service_url.to_string()
    };
    format!("{}{}", ws.trim_end_matches('/'), DEFAULT_STREAM_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_url_gains_a_trailing_slash() {
        assert_eq!(
            normalize_service_url("http://localhost:8080").unwrap(),
            "http://localhost:8080/"
        );
        assert_eq!(
            normalize_service_url("http://localhost:8080/api///").unwrap(),
            "http://localhost:8080/api/"
        );
    }

    #[test]
    fn non_http_service_url_is_rejected() {
        assert!(normalize_service_url("ftp://example.com").is_err());
        assert!(normalize_service_url("localhost:8080").is_err());
    }

    #[test]
    fn stream_url_is_derived_from_the_service_url() {
        assert_eq!(
            derive_stream_url("http://localhost:8080/"),
            "ws://localhost:8080/eventbus"
        );
        assert_eq!(
            derive_stream_url("https://data.example.com/api/"),
            "wss://data.example.com/api/eventbus"
        );
    }
}
