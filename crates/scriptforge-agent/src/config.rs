//! Runtime configuration
//!
//! Resolution order: defaults, then `scriptforge.toml` (or an explicit path),
//! then environment variables. The credential itself is read lazily so a
//! missing key surfaces at the first generation call.

use scriptforge_core::{ForgeError, Result};
use scriptforge_sandbox::Validator;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::gateway::{Gateway, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::providers::OpenAICompatibleClient;

/// Looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "scriptforge.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeConfig {
    pub model: String,
    pub base_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub max_tokens: u32,
    pub temperature: Option<f64>,
    pub request_timeout_secs: u64,
    /// Minimum pre-call delay; 0 disables pacing
    pub pacing_delay_secs: u64,
    pub artifact_root: PathBuf,
    pub interpreter: String,
    pub validation_timeout_secs: u64,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            request_timeout_secs: 120,
            pacing_delay_secs: 0,
            artifact_root: PathBuf::from("generated_scripts"),
            interpreter: "python3".to_string(),
            validation_timeout_secs: 300,
        }
    }
}

impl ForgeConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] when present, then
    /// apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ForgeError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| ForgeError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ForgeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Timeouts must be positive; only pacing treats 0 as "off".
    pub fn validate(&self) -> Result<()> {
        if self.validation_timeout_secs == 0 {
            return Err(ForgeError::Config(
                "validation_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ForgeError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply `SCRIPTFORGE_MODEL` and `OPENAI_BASE_URL` from `lookup`
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(model) = lookup("SCRIPTFORGE_MODEL").filter(|v| !v.is_empty()) {
            self.model = model;
        }
        if let Some(base_url) = lookup("OPENAI_BASE_URL").filter(|v| !v.is_empty()) {
            self.base_url = base_url;
        }
        self
    }

    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn build_gateway(&self) -> anyhow::Result<Gateway> {
        let mut client = OpenAICompatibleClient::new(
            "OpenAI",
            self.api_key(),
            self.api_key_env.clone(),
            self.base_url.clone(),
        )
        .with_timeout(Duration::from_secs(self.request_timeout_secs))?;
        if let Some(temperature) = self.temperature {
            client = client.with_temperature(temperature);
        }

        Ok(Gateway::new(Arc::new(client))
            .with_model(self.model.clone())
            .with_max_tokens(self.max_tokens)
            .with_pacing(Duration::from_secs(self.pacing_delay_secs)))
    }

    pub fn validator(&self) -> Validator {
        Validator::new(self.interpreter.clone())
            .with_timeout(Duration::from_secs(self.validation_timeout_secs))
    }
}
