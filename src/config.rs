//! Configuration for gangway
//!
//! CLI arguments and environment variable handling using clap.
//! Pattern follows the connector deployment layout: a provider connector
//! whose management API we administrate, a consumer connector whose IDS
//! endpoints we negotiate through, and a broker reachable from the consumer.

use clap::Parser;
use std::time::Duration;

/// Gangway - graph resolution engine for dataspace connector dashboards
#[derive(Parser, Debug, Clone)]
#[command(name = "gangway")]
#[command(about = "Resource-graph resolution and contract negotiation for dataspace connectors")]
pub struct Args {
    /// Base URL of the local (provider) connector management API
    #[arg(long, env = "CONNECTOR_API_URL", default_value = "http://localhost:8080/api")]
    pub connector_api_url: String,

    /// Base URL of the consuming connector API that proxies IDS multipart
    /// calls (description requests, contract negotiation)
    #[arg(long, env = "CONSUMER_API_URL", default_value = "http://localhost:8081/api")]
    pub consumer_api_url: String,

    /// Recipient IRI of the broker's infrastructure endpoint
    #[arg(
        long,
        env = "BROKER_RECIPIENT",
        default_value = "https://broker-reverseproxy/infrastructure"
    )]
    pub broker_recipient: String,

    /// Host under which provider connectors publish canonical catalog URLs;
    /// rewritten to a connector's resolved access URL before remote fetches
    #[arg(long, env = "PROVIDER_DEFAULT_HOST", default_value = "https://localhost:8080")]
    pub provider_default_host: String,

    /// Request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validate cross-field constraints before startup.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("CONNECTOR_API_URL", &self.connector_api_url),
            ("CONSUMER_API_URL", &self.consumer_api_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(format!("{} must be an http(s) URL, got '{}'", name, value));
            }
        }
        if self.broker_recipient.is_empty() {
            return Err("BROKER_RECIPIENT must not be empty".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }
        Ok(())
    }
}
