//! Read-only configuration loaded from a TOML file.
//!
//! The file selects a provider and carries one section per provider:
//!
//! ```toml
//! provider = "openai"
//! file_ignore = ["*.lock"]
//!
//! [openai]
//! api_key = "sk-..."
//! model = "gpt-4o-mini"
//! retries = 2
//! ```

pub mod provider;

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::commit::prompt::{PromptBuilder, PromptVariant};
use crate::error::ConfigError;

pub use provider::{ClientConfig, ProviderConfig, ProviderKind, ProviderSettings};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "GPTCOMET_CONFIG";

const DEFAULT_PROVIDER: &str = "openai";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptSection {
    pub brief_commit_message: Option<String>,
    pub rich_commit_message: Option<String>,
}

/// On-disk layout. Provider sections are collected by name and only the
/// selected one is interpreted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    provider: Option<String>,
    file_ignore: Vec<String>,
    debug: bool,
    output: OutputSection,
    prompt: PromptSection,
    #[serde(flatten)]
    sections: BTreeMap<String, toml::Value>,
}

/// Loaded configuration for one workflow run.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderConfig,
    pub file_ignore: Vec<String>,
    pub debug: bool,
    pub output: OutputSection,
    pub prompt: PromptSection,
}

impl Config {
    /// Load from `explicit`, `$GPTCOMET_CONFIG`, or the user config directory.
    ///
    /// A missing default file yields defaults; a missing explicitly named
    /// file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => match env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
                Some(path) => (PathBuf::from(path), true),
                None => (default_config_path()?, false),
            },
        };

        if !required && !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Self::from_toml_str("", &path);
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content, &path)
    }

    /// Parse configuration text; `path` is only used in error messages.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut raw: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let kind = ProviderKind::parse(raw.provider.as_deref().unwrap_or(DEFAULT_PROVIDER))?;
        let settings = match raw.sections.remove(kind.as_str()) {
            Some(value) => value.try_into::<ProviderSettings>().map_err(|source| {
                ConfigError::InvalidProviderSection {
                    provider: kind.to_string(),
                    source,
                }
            })?,
            None => ProviderSettings::default(),
        };

        Ok(Config {
            provider: ProviderConfig::new(kind, settings),
            file_ignore: raw.file_ignore,
            debug: raw.debug,
            output: raw.output,
            prompt: raw.prompt,
        })
    }

    /// Client settings for the selected provider; `debug_flag` forces debug on.
    pub fn client_config(&self, debug_flag: bool) -> Result<ClientConfig, ConfigError> {
        self.provider.client_config(self.debug || debug_flag)
    }

    /// Prompt builder with any configured template overrides and language.
    pub fn prompt_builder(&self) -> PromptBuilder {
        let mut builder = PromptBuilder::default();
        if let Some(template) = &self.prompt.brief_commit_message {
            builder = builder.with_template(PromptVariant::Brief, template);
        }
        if let Some(template) = &self.prompt.rich_commit_message {
            builder = builder.with_template(PromptVariant::Rich, template);
        }
        if let Some(lang) = &self.output.lang {
            builder = builder.with_language(lang);
        }
        builder
    }
}

fn default_config_path() -> Result<PathBuf, ConfigError> {
    let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(dir.join("gptcomet").join("config.toml"))
}
