//! Client configuration and its resolution into an immutable effective form.
//!
//! # Design
//! `ClientConfig` is what callers write: only the API key is required, every
//! other field is optional. `EffectiveConfig::resolve` fills in the defaults
//! and validates the result once, at construction. After that the client only
//! ever reads the effective values.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Origin used when the caller does not supply a base URL.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Per-request timeout used when the caller does not supply one.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

pub const ENV_API_KEY: &str = "SDK_API_KEY";
pub const ENV_BASE_URL: &str = "SDK_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "SDK_TIMEOUT_MS";

const REDACTED: &str = "<redacted>";

/// Caller-supplied configuration.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Add a header sent with every request made by the client.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Load configuration from `SDK_API_KEY`, `SDK_BASE_URL` and
    /// `SDK_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY).ok_or(ConfigError::MissingApiKey)?;
        let timeout_ms = match lookup(ENV_TIMEOUT_MS) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidEnv {
                name: ENV_TIMEOUT_MS,
                reason: e.to_string(),
            })?),
            None => None,
        };
        Ok(Self {
            api_key,
            base_url: lookup(ENV_BASE_URL),
            timeout_ms,
            headers: None,
        })
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &REDACTED)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("headers", &self.headers)
            .finish()
    }
}

/// Fully resolved configuration. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    api_key: String,
    base_url: String,
    timeout_ms: u64,
    headers: BTreeMap<String, String>,
}

impl fmt::Debug for EffectiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectiveConfig")
            .field("api_key", &REDACTED)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("headers", &self.headers)
            .finish()
    }
}

impl EffectiveConfig {
    /// Apply defaults to `config`.
    ///
    /// An empty `base_url` and a zero `timeout_ms` count as unset and fall
    /// back to their defaults, so the resolved timeout is always positive.
    pub fn resolve(config: ClientConfig) -> Result<Self, ConfigError> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        let timeout_ms = match config.timeout_ms {
            Some(0) | None => DEFAULT_TIMEOUT_MS,
            Some(ms) => ms,
        };
        let base_url = config
            .base_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key: config.api_key,
            base_url,
            timeout_ms,
            headers: config.headers.unwrap_or_default(),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_apply_when_only_api_key_given() {
        let config = EffectiveConfig::resolve(ClientConfig::new("key")).unwrap();
        assert_eq!(config.api_key(), "key");
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout_ms(), 5000);
        assert_eq!(config.timeout(), Duration::from_millis(5000));
        assert!(config.headers().is_empty());
    }

    #[test]
    fn supplied_values_win_over_defaults() {
        let input = ClientConfig::new("key")
            .base_url("http://localhost:3000")
            .timeout_ms(250)
            .header("X-Custom-Header", "custom-value");
        let config = EffectiveConfig::resolve(input).unwrap();
        assert_eq!(config.base_url(), "http://localhost:3000");
        assert_eq!(config.timeout_ms(), 250);
        assert_eq!(config.headers()["X-Custom-Header"], "custom-value");
    }

    #[test]
    fn empty_base_url_falls_back_to_default() {
        let config = EffectiveConfig::resolve(ClientConfig::new("key").base_url("")).unwrap();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = EffectiveConfig::resolve(ClientConfig::new("")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));

        let err = EffectiveConfig::resolve(ClientConfig::new("   ")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn zero_timeout_falls_back_to_default() {
        let config = EffectiveConfig::resolve(ClientConfig::new("key").timeout_ms(0)).unwrap();
        assert_eq!(config.timeout_ms(), DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn debug_output_hides_api_key() {
        let input = ClientConfig::new("s3cret-key").base_url("http://localhost:3000");
        let rendered = format!("{input:?}");
        assert!(!rendered.contains("s3cret-key"));
        assert!(rendered.contains("localhost:3000"));

        let rendered = format!("{:?}", EffectiveConfig::resolve(input).unwrap());
        assert!(!rendered.contains("s3cret-key"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("5000"));
    }

    #[test]
    fn deserializes_with_optional_fields_missing() {
        let config: ClientConfig = serde_json::from_str(r#"{"api_key":"k"}"#).unwrap();
        assert_eq!(config, ClientConfig::new("k"));

        let config: ClientConfig = serde_json::from_str(
            r#"{"api_key":"k","timeout_ms":10,"headers":{"X-A":"1"}}"#,
        )
        .unwrap();
        assert_eq!(config.timeout_ms, Some(10));
        assert_eq!(config.headers.unwrap()["X-A"], "1");
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn from_lookup_reads_all_variables() {
        let config = ClientConfig::from_lookup(env(&[
            (ENV_API_KEY, "env-key"),
            (ENV_BASE_URL, "http://example.test"),
            (ENV_TIMEOUT_MS, "1500"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.base_url.as_deref(), Some("http://example.test"));
        assert_eq!(config.timeout_ms, Some(1500));
    }

    #[test]
    fn from_lookup_requires_api_key() {
        let err = ClientConfig::from_lookup(env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn from_lookup_rejects_unparseable_timeout() {
        let err = ClientConfig::from_lookup(env(&[(ENV_API_KEY, "k"), (ENV_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: ENV_TIMEOUT_MS, .. }));
    }
}
