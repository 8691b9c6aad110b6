/*
[INPUT]:  YAML configuration file
[OUTPUT]: REST client, stream config and log settings
[POS]:    Configuration layer - wiring from file to clients
[UPDATE]: When adding new configuration options
*/

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http::{BetaexClient, BetaexError, ClientConfig, Credentials, Result};
use crate::logging::LogSettings;
use crate::ws::{Channel, DEFAULT_WS_BASE_URL, ReconnectBackoff, StreamConfig};

/// Top-level adapter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdapterConfig {
    pub rest: RestSettings,
    #[serde(default)]
    pub stream: StreamSettings,
    #[serde(default)]
    pub log: LogSettings,
}

/// REST endpoint and credentials
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RestSettings {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Stream endpoint and timing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StreamSettings {
    #[serde(default = "default_ws_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_silence_secs")]
    pub max_silence_secs: u64,
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    #[serde(default = "default_handshake_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Active `PING` period; absent means no pinging
    #[serde(default)]
    pub keep_alive_secs: Option<u64>,
    #[serde(default = "default_backoff_initial_ms")]
    pub backoff_initial_ms: u64,
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
    #[serde(default = "default_backoff_jitter_ms")]
    pub backoff_jitter_ms: u64,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            base_url: default_ws_base_url(),
            max_silence_secs: default_max_silence_secs(),
            check_interval_secs: default_check_interval_secs(),
            connect_timeout_secs: default_handshake_timeout_secs(),
            keep_alive_secs: None,
            backoff_initial_ms: default_backoff_initial_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            backoff_jitter_ms: default_backoff_jitter_ms(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_ws_base_url() -> String {
    DEFAULT_WS_BASE_URL.to_string()
}

fn default_max_silence_secs() -> u64 {
    30
}

fn default_check_interval_secs() -> u64 {
    10
}

fn default_handshake_timeout_secs() -> u64 {
    5
}

fn default_backoff_initial_ms() -> u64 {
    1_000
}

fn default_backoff_max_ms() -> u64 {
    30_000
}

fn default_backoff_jitter_ms() -> u64 {
    250
}

impl AdapterConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            BetaexError::Config(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|err| BetaexError::Config(err.to_string()))
    }
}

impl RestSettings {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }

    /// Both key and secret, or nothing
    pub fn credentials(&self) -> Result<Option<Credentials>> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) => Ok(Some(Credentials::new(key.clone(), secret.as_bytes()))),
            (None, None) => Ok(None),
            _ => Err(BetaexError::Config(
                "api_key and api_secret must be set together".to_string(),
            )),
        }
    }

    pub fn build_client(&self) -> Result<BetaexClient> {
        BetaexClient::with_config(self.client_config(), &self.base_url, self.credentials()?)
    }
}

impl StreamSettings {
    pub fn stream_config(&self, channel: &Channel) -> Result<StreamConfig> {
        let mut config = StreamConfig::for_channel(&self.base_url, channel)?;
        config.max_silence = Duration::from_secs(self.max_silence_secs);
        config.check_interval = Duration::from_secs(self.check_interval_secs);
        config.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        config.keep_alive_interval = self.keep_alive_secs.map(Duration::from_secs);
        config.backoff = ReconnectBackoff::new(
            Duration::from_millis(self.backoff_initial_ms),
            Duration::from_millis(self.backoff_max_ms),
            2.0,
            self.backoff_jitter_ms,
        );
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
rest:
  base_url: "https://api.example.com"
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AdapterConfig::from_yaml_str(MINIMAL).unwrap();
        assert_eq!(config.rest.timeout_secs, 30);
        assert_eq!(config.stream, StreamSettings::default());
        assert_eq!(config.log, LogSettings::default());
        assert!(config.rest.credentials().unwrap().is_none());

        let stream = config.stream.stream_config(&Channel::trade("BTC_USDT")).unwrap();
        assert_eq!(stream.url, "wss://ws.betaex.com/sub?id=trade.BTC_USDT");
        assert_eq!(stream.max_silence, Duration::from_secs(30));
        assert_eq!(stream.check_interval, Duration::from_secs(10));
        assert!(stream.keep_alive_interval.is_none());
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
rest:
  base_url: "https://api.example.com"
  api_key: "key-1"
  api_secret: "secret-1"
  timeout_secs: 5
stream:
  base_url: "wss://ws.example.com/sub"
  max_silence_secs: 60
  check_interval_secs: 5
  keep_alive_secs: 20
log:
  directory: "/tmp/betaex"
  level: "debug"
"#;
        let config = AdapterConfig::from_yaml_str(yaml).unwrap();
        let credentials = config.rest.credentials().unwrap().expect("credentials");
        assert_eq!(credentials.api_key(), "key-1");
        assert_eq!(config.rest.client_config().timeout, Duration::from_secs(5));

        let client = config.rest.build_client().unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.example.com/");

        let stream = config.stream.stream_config(&Channel::order_book("ETH_USDT")).unwrap();
        assert_eq!(stream.url, "wss://ws.example.com/sub?id=orderbook.ETH_USDT.L20");
        assert_eq!(stream.keep_alive_interval, Some(Duration::from_secs(20)));
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.max_files, 30);
    }

    #[test]
    fn test_half_credentials_rejected() {
        let yaml = r#"
rest:
  base_url: "https://api.example.com"
  api_key: "key-only"
"#;
        let config = AdapterConfig::from_yaml_str(yaml).unwrap();
        assert!(matches!(config.rest.credentials(), Err(BetaexError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("betaex-config-{}.yaml", uuid::Uuid::new_v4()));
        std::fs::write(&path, MINIMAL).unwrap();

        let config = AdapterConfig::from_file(&path).unwrap();
        assert_eq!(config.rest.base_url, "https://api.example.com");

        std::fs::remove_file(path).unwrap();
        assert!(matches!(AdapterConfig::from_file("/nonexistent/betaex.yaml"), Err(BetaexError::Config(_))));
    }
}
