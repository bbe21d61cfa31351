//! Provider-specific settings normalized into a single [`ClientConfig`].

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;

/// Overrides the configured API key for any provider.
pub const API_KEY_ENV_VAR: &str = "GPTCOMET_API_KEY";

/// Overrides the configured per-attempt timeout, in seconds.
pub const TIMEOUT_ENV_VAR: &str = "GPTCOMET_TIMEOUT";

pub const DEFAULT_RETRIES: u32 = 2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Supported completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Groq,
}

impl ProviderKind {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "groq" => Ok(ProviderKind::Groq),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }

    /// Name of the provider's config section.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Groq => "groq",
        }
    }

    pub fn default_api_base(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Groq => "https://api.groq.com/openai/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Groq => "llama-3.1-8b-instant",
        }
    }

    /// Conventional environment variable holding the provider's key.
    pub fn key_env_var(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Groq => "GROQ_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra headers may be written as a TOML table or as a JSON object string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExtraHeaders {
    Table(BTreeMap<String, String>),
    Json(String),
}

impl ExtraHeaders {
    fn into_map(self) -> Result<BTreeMap<String, String>, ConfigError> {
        match self {
            ExtraHeaders::Table(map) => Ok(map),
            ExtraHeaders::Json(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            ExtraHeaders::Json(text) => serde_json::from_str(&text)
                .map_err(|e| ConfigError::InvalidExtraHeaders(format!("{}: {}", e, text))),
        }
    }
}

/// Settings shared by every provider section; unset fields take defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub api_base: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub retries: Option<u32>,
    /// Per-attempt timeout in seconds.
    pub timeout: Option<u64>,
    pub proxy: Option<String>,
    pub extra_headers: Option<ExtraHeaders>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// The selected provider together with its settings.
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    OpenAi(ProviderSettings),
    Groq(ProviderSettings),
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind, settings: ProviderSettings) -> Self {
        match kind {
            ProviderKind::OpenAi => ProviderConfig::OpenAi(settings),
            ProviderKind::Groq => ProviderConfig::Groq(settings),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderConfig::OpenAi(_) => ProviderKind::OpenAi,
            ProviderConfig::Groq(_) => ProviderKind::Groq,
        }
    }

    pub fn settings(&self) -> &ProviderSettings {
        match self {
            ProviderConfig::OpenAi(s) | ProviderConfig::Groq(s) => s,
        }
    }

    /// Resolve provider defaults and environment overrides into a client config.
    pub fn client_config(&self, debug: bool) -> Result<ClientConfig, ConfigError> {
        let kind = self.kind();
        let settings = self.settings().clone();

        let api_key = resolve_api_key(kind, settings.api_key.as_deref()).ok_or_else(|| {
            ConfigError::MissingApiKey {
                provider: kind.to_string(),
                env_var: kind.key_env_var().to_string(),
            }
        })?;

        let extra_headers = match settings.extra_headers {
            Some(headers) => headers.into_map()?,
            None => BTreeMap::new(),
        };

        let configured_timeout = match settings.timeout {
            Some(0) => {
                warn!("Ignoring timeout = 0, using {}s", DEFAULT_TIMEOUT_SECS);
                DEFAULT_TIMEOUT_SECS
            }
            Some(secs) => secs,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(ClientConfig {
            provider: kind,
            api_base: non_empty(settings.api_base)
                .unwrap_or_else(|| kind.default_api_base().to_string()),
            api_key,
            model: non_empty(settings.model).unwrap_or_else(|| kind.default_model().to_string()),
            timeout: Duration::from_secs(timeout_override(configured_timeout)),
            retries: settings.retries.unwrap_or(DEFAULT_RETRIES),
            proxy: non_empty(settings.proxy),
            extra_headers,
            debug,
            temperature: Some(settings.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
            top_p: settings.top_p,
            max_tokens: settings.max_tokens,
        })
    }
}

/// Everything the completion client needs for one workflow run.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub provider: ProviderKind,
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    /// Per-attempt connect + read timeout.
    pub timeout: Duration,
    /// Additional attempts after the first; total attempts = `retries + 1`.
    pub retries: u32,
    pub proxy: Option<String>,
    pub extra_headers: BTreeMap<String, String>,
    pub debug: bool,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_non_empty(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|v| non_empty(Some(v)))
}

/// `GPTCOMET_API_KEY`, then the configured key, then the provider's variable.
fn resolve_api_key(kind: ProviderKind, configured: Option<&str>) -> Option<String> {
    env_non_empty(API_KEY_ENV_VAR)
        .or_else(|| non_empty(configured.map(str::to_string)))
        .or_else(|| env_non_empty(kind.key_env_var()))
}

/// Apply `GPTCOMET_TIMEOUT`, keeping `configured` when the value is invalid.
fn timeout_override(configured: u64) -> u64 {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                warn!(
                    "Invalid {} value '{}', using {}s",
                    TIMEOUT_ENV_VAR, v, configured
                );
                configured
            }
        },
        _ => configured,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn settings_with_key(key: &str) -> ProviderSettings {
        ProviderSettings {
            api_key: Some(key.to_string()),
            ..Default::default()
        }
    }

    fn without_env<F: FnOnce()>(f: F) {
        temp_env::with_vars_unset(
            [
                API_KEY_ENV_VAR,
                TIMEOUT_ENV_VAR,
                "OPENAI_API_KEY",
                "GROQ_API_KEY",
            ],
            f,
        );
    }

    #[test]
    fn test_parse_provider_kind() {
        assert_eq!(ProviderKind::parse("openai").unwrap(), ProviderKind::OpenAi);
        assert_eq!(ProviderKind::parse(" Groq ").unwrap(), ProviderKind::Groq);
        assert!(matches!(
            ProviderKind::parse("anthropic"),
            Err(ConfigError::UnknownProvider(name)) if name == "anthropic"
        ));
    }

    #[test]
    #[serial]
    fn test_client_config_fills_provider_defaults() {
        without_env(|| {
            let provider = ProviderConfig::new(ProviderKind::Groq, settings_with_key("gsk"));
            let config = provider.client_config(false).unwrap();

            assert_eq!(config.provider, ProviderKind::Groq);
            assert_eq!(config.api_base, "https://api.groq.com/openai/v1");
            assert_eq!(config.model, "llama-3.1-8b-instant");
            assert_eq!(config.retries, DEFAULT_RETRIES);
            assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
            assert_eq!(config.temperature, Some(DEFAULT_TEMPERATURE));
            assert!(config.proxy.is_none());
            assert!(config.extra_headers.is_empty());
        });
    }

    #[test]
    #[serial]
    fn test_blank_proxy_treated_as_unset() {
        without_env(|| {
            let settings = ProviderSettings {
                proxy: Some("  ".to_string()),
                ..settings_with_key("sk")
            };
            let config = ProviderConfig::new(ProviderKind::OpenAi, settings)
                .client_config(false)
                .unwrap();
            assert!(config.proxy.is_none());
        });
    }

    #[test]
    #[serial]
    fn test_missing_api_key_fails() {
        without_env(|| {
            let provider = ProviderConfig::new(ProviderKind::OpenAi, ProviderSettings::default());
            let result = provider.client_config(false);
            assert!(matches!(
                result,
                Err(ConfigError::MissingApiKey { ref env_var, .. }) if env_var == "OPENAI_API_KEY"
            ));
        });
    }

    #[test]
    #[serial]
    fn test_api_key_env_override_wins() {
        without_env(|| {
            temp_env::with_var(API_KEY_ENV_VAR, Some("from-env"), || {
                let provider =
                    ProviderConfig::new(ProviderKind::OpenAi, settings_with_key("from-file"));
                let config = provider.client_config(false).unwrap();
                assert_eq!(config.api_key, "from-env");
            });
        });
    }

    #[test]
    #[serial]
    fn test_provider_env_var_used_when_key_unset() {
        without_env(|| {
            temp_env::with_var("GROQ_API_KEY", Some("gsk-env"), || {
                let provider = ProviderConfig::new(ProviderKind::Groq, ProviderSettings::default());
                let config = provider.client_config(false).unwrap();
                assert_eq!(config.api_key, "gsk-env");
            });
        });
    }

    #[test]
    #[serial]
    fn test_timeout_env_override() {
        without_env(|| {
            temp_env::with_var(TIMEOUT_ENV_VAR, Some("90"), || {
                let config = ProviderConfig::new(ProviderKind::OpenAi, settings_with_key("k"))
                    .client_config(false)
                    .unwrap();
                assert_eq!(config.timeout, Duration::from_secs(90));
            });
        });
    }

    #[test]
    #[serial]
    fn test_invalid_timeout_env_keeps_configured() {
        without_env(|| {
            temp_env::with_var(TIMEOUT_ENV_VAR, Some("soon"), || {
                let settings = ProviderSettings {
                    timeout: Some(12),
                    ..settings_with_key("k")
                };
                let config = ProviderConfig::new(ProviderKind::OpenAi, settings)
                    .client_config(false)
                    .unwrap();
                assert_eq!(config.timeout, Duration::from_secs(12));
            });
        });
    }

    #[test]
    #[serial]
    fn test_zero_configured_timeout_uses_default() {
        without_env(|| {
            let settings = ProviderSettings {
                timeout: Some(0),
                ..settings_with_key("k")
            };
            let config = ProviderConfig::new(ProviderKind::OpenAi, settings)
                .client_config(false)
                .unwrap();
            assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        });
    }

    #[test]
    fn test_extra_headers_from_json_string() {
        let headers = ExtraHeaders::Json(r#"{"X-Title": "gptcomet"}"#.to_string())
            .into_map()
            .unwrap();
        assert_eq!(headers.get("X-Title").map(String::as_str), Some("gptcomet"));
    }

    #[test]
    fn test_extra_headers_invalid_json() {
        let result = ExtraHeaders::Json("not json".to_string()).into_map();
        assert!(matches!(result, Err(ConfigError::InvalidExtraHeaders(_))));
    }
}
