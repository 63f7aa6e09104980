use std::env;
use std::time::Duration;

use dotenvy::dotenv;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_CART_BUFFER: usize = 32;

/// Client configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend origin without the `/api` prefix, e.g. `https://shop.example.com`.
    pub base_url: String,
    /// `None` leaves requests without a timeout.
    pub request_timeout: Option<Duration>,
    pub cart_buffer: usize,
    /// Bearer token to start the session with.
    pub initial_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout: None,
            cart_buffer: DEFAULT_CART_BUFFER,
            initial_token: None,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let base_url = normalize_base_url(
            get("STOREFRONT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        );

        let request_timeout = get("STOREFRONT_REQUEST_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| ConfigError::Invalid {
                        var: "STOREFRONT_REQUEST_TIMEOUT_SECS",
                        reason: e.to_string(),
                    })
            })
            .transpose()?;

        let cart_buffer = match get("STOREFRONT_CART_BUFFER") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        var: "STOREFRONT_CART_BUFFER",
                        reason: "must be greater than zero".to_string(),
                    })
                }
                Ok(size) => size,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: "STOREFRONT_CART_BUFFER",
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_CART_BUFFER,
        };

        let initial_token = get("STOREFRONT_TOKEN");

        tracing::info!(
            base_url = %base_url,
            timeout = ?request_timeout,
            cart_buffer,
            has_token = initial_token.is_some(),
            "Client configuration loaded"
        );

        Ok(Self {
            base_url,
            request_timeout,
            cart_buffer,
            initial_token,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.initial_token = Some(token.into());
        self
    }
}

fn normalize_base_url(raw: String) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.cart_buffer, DEFAULT_CART_BUFFER);
        assert_eq!(config.initial_token, None);
    }

    #[test]
    fn reads_and_normalizes_values() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("STOREFRONT_API_URL", "https://shop.example.com/ "),
            ("STOREFRONT_REQUEST_TIMEOUT_SECS", "15"),
            ("STOREFRONT_CART_BUFFER", "8"),
            ("STOREFRONT_TOKEN", "abc"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://shop.example.com");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.cart_buffer, 8);
        assert_eq!(config.initial_token.as_deref(), Some("abc"));
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = ApiConfig::from_lookup(lookup(&[("STOREFRONT_REQUEST_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { var: "STOREFRONT_REQUEST_TIMEOUT_SECS", .. }
        ));

        let err = ApiConfig::from_lookup(lookup(&[("STOREFRONT_CART_BUFFER", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "STOREFRONT_CART_BUFFER", .. }));
    }
}
