use serde::Deserialize;
use std::fs::File;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;
use trends::client::GoogleTrendsConfig;
use trends::query::DEFAULT_MAX_KEYWORDS;
use url::Url;

const DEFAULT_PORT: u16 = 8000;

// Parsed once; the literal is a constant, so this cannot fail at runtime.
static DEFAULT_UPSTREAM_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://trends.google.com/").expect("constant URL parses"));

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid PORT value: {0}")]
    InvalidPortEnv(String),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("max_keywords must be at least 1")]
    InvalidMaxKeywords,

    #[error("upstream timeout must be at least 1 second")]
    InvalidTimeout,
}

/// Gateway configuration
#[derive(Clone, Debug, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Listener for incoming requests
    pub listener: Listener,
    /// Static API-key auth
    pub auth: AuthConfig,
    /// Upstream trends provider
    pub upstream: UpstreamConfig,
    /// Optional statsd metrics sink
    pub metrics: Option<MetricsConfig>,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }

    /// Applies environment overrides: `API_KEY` (shared secret) and `PORT`.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Same as [`apply_env`](Self::apply_env), with an injectable lookup so
    /// tests stay off the process environment.
    pub fn apply_env_from<F>(&mut self, get: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = get("API_KEY") {
            self.auth.api_key = Some(api_key);
        }
        if let Some(port) = get("PORT") {
            self.listener.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidPortEnv(port))?;
        }
        Ok(())
    }

    /// Validates the gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.listener.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.upstream.max_keywords == 0 {
            return Err(ValidationError::InvalidMaxKeywords);
        }
        if self.upstream.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Static API-key auth configuration
///
/// Auth is enforced only when a non-empty key is present (from the file or
/// the `API_KEY` environment variable). A single global secret, no scoping.
#[derive(Clone, Debug, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub api_key: Option<String>,
}

/// Upstream trends provider configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the trends provider
    pub base_url: Url,
    /// Host language sent on every upstream call
    pub hl: String,
    /// Minute offset from UTC sent on every upstream call
    pub tz: i32,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
    /// Keyword ceiling per query. The upstream rejects larger comparison
    /// payloads; raise this only if the provider does.
    pub max_keywords: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.clone(),
            hl: "en-US".to_string(),
            tz: 360,
            timeout_secs: 30,
            max_keywords: DEFAULT_MAX_KEYWORDS,
        }
    }
}

impl From<&UpstreamConfig> for GoogleTrendsConfig {
    fn from(config: &UpstreamConfig) -> Self {
        GoogleTrendsConfig {
            base_url: config.base_url.clone(),
            hl: config.hl.clone(),
            tz: config.tz,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Statsd sink configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}
