//! Server Configuration
//!
//! Loads configuration from environment variables.

use anyhow::{Context, Result};
use std::env;

use crate::connection::{ConnectionOptions, Transport, DEFAULT_MAX_BODY_SIZE};
use crate::webhooks::types::DEFAULT_API_BASE;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080")
    pub bind_address: String,

    /// Hex-encoded Ed25519 application public key
    pub public_key: String,

    /// Bot token for webhook calls (optional)
    pub token: Option<String>,

    /// HTTP transport: "axum" (default) or "hyper"
    pub transport: Transport,

    /// REST API base for webhook calls
    pub api_base: String,

    /// Maximum request body size in bytes (default: 1MB)
    pub max_body_size: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            public_key: env::var("DISCORD_PUBLIC_KEY")
                .context("DISCORD_PUBLIC_KEY must be set")?,
            token: env::var("DISCORD_TOKEN").ok().filter(|t| !t.is_empty()),
            transport: match env::var("HTTP_TRANSPORT") {
                Ok(v) => v.parse().context("Invalid HTTP_TRANSPORT")?,
                Err(_) => Transport::default(),
            },
            api_base: env::var("DISCORD_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into()),
            max_body_size: env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_SIZE),
        })
    }

    /// Options for the interaction [`Connection`](crate::Connection).
    #[must_use]
    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            transport: self.transport,
            public_key: self.public_key.clone(),
            token: self.token.clone().unwrap_or_default(),
            api_base: self.api_base.clone(),
            max_body_size: self.max_body_size,
        }
    }

    /// Create a default configuration for testing.
    ///
    /// The public key is the one from RFC 8032 test vector 1.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:0".into(),
            public_key: "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a".into(),
            token: None,
            transport: Transport::Axum,
            api_base: DEFAULT_API_BASE.into(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    const VARS: [&str; 6] = [
        "BIND_ADDRESS",
        "DISCORD_PUBLIC_KEY",
        "DISCORD_TOKEN",
        "HTTP_TRANSPORT",
        "DISCORD_API_BASE",
        "MAX_BODY_SIZE",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn set(var: &str, value: &str) {
        env::set_var(var, value);
    }

    #[test]
    #[serial]
    fn public_key_is_required() {
        clear_env();
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("DISCORD_PUBLIC_KEY"));
    }

    #[test]
    #[serial]
    fn defaults_apply() {
        clear_env();
        set("DISCORD_PUBLIC_KEY", "abc");

        let config = Config::from_env().unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.token, None);
        assert_eq!(config.transport, Transport::Axum);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.max_body_size, DEFAULT_MAX_BODY_SIZE);
        clear_env();
    }

    #[test]
    #[serial]
    fn overrides_are_read() {
        clear_env();
        set("DISCORD_PUBLIC_KEY", "abc");
        set("DISCORD_TOKEN", "secret");
        set("HTTP_TRANSPORT", "hyper");
        set("MAX_BODY_SIZE", "2048");

        let config = Config::from_env().unwrap();
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.transport, Transport::Hyper);
        assert_eq!(config.max_body_size, 2048);

        let options = config.connection_options();
        assert_eq!(options.token, "secret");
        assert_eq!(options.transport, Transport::Hyper);
        clear_env();
    }

    #[test]
    #[serial]
    fn unknown_transport_fails() {
        clear_env();
        set("DISCORD_PUBLIC_KEY", "abc");
        set("HTTP_TRANSPORT", "carrier-pigeon");
        assert!(Config::from_env().is_err());
        clear_env();
    }
}
