use serde::{Deserialize, Serialize};

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Missing API key for {provider_name}: set {env_var}")]
    MissingApiKey {
        provider_name: String,
        env_var: &'static str,
    },

    #[error("Gateway API URL is not configured: set VIDEOSUM_API_URL or api_url in the config file")]
    MissingGatewayUrl,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI-compatible endpoint served by the scraping gateway.
    #[default]
    Gateway,
    Grok,
    Openai,
    Gemini,
}

/// Everything needed to call a chat-completions endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderConfig {
    pub api_url: String,
    pub model: String,
    pub api_key: String,
}

impl Provider {
    fn default_model(&self) -> &'static str {
        match self {
            Provider::Gateway => "gpt-4o-mini",
            Provider::Grok => "grok-4-fast",
            Provider::Openai => "gpt-5.1",
            Provider::Gemini => "gemini-3-pro",
        }
    }

    pub fn env_var(&self) -> &'static str {
        match self {
            Provider::Gateway => "VIDEOSUM_API_KEY",
            Provider::Grok => "XAI_API_KEY",
            Provider::Openai => "OPENAI_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gateway => "Gateway",
            Provider::Grok => "Grok",
            Provider::Openai => "OpenAI",
            Provider::Gemini => "Gemini",
        }
    }

    fn api_url(&self, settings: &Config) -> Result<String, ProviderError> {
        Ok(match self {
            Provider::Gateway => {
                let base = settings
                    .api_url
                    .as_deref()
                    .ok_or(ProviderError::MissingGatewayUrl)?;
                format!("{}/v1/chat/completions", base.trim_end_matches('/'))
            }
            Provider::Grok => "https://api.x.ai/v1/chat/completions".to_string(),
            Provider::Openai => "https://api.openai.com/v1/chat/completions".to_string(),
            Provider::Gemini => {
                "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
                    .to_string()
            }
        })
    }

    /// Validate that an API key is available for this provider. The gateway
    /// key may also come from the config file.
    pub fn validate_api_key(&self, settings: &Config) -> Result<String, ProviderError> {
        let from_settings = match self {
            Provider::Gateway => settings.api_key.clone(),
            _ => None,
        };
        std::env::var(self.env_var())
            .ok()
            .filter(|k| !k.is_empty())
            .or(from_settings)
            .ok_or_else(|| ProviderError::MissingApiKey {
                provider_name: self.name().to_string(),
                env_var: self.env_var(),
            })
    }

    pub fn config(&self, settings: &Config) -> Result<ProviderConfig, ProviderError> {
        Ok(ProviderConfig {
            api_url: self.api_url(settings)?,
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| self.default_model().to_string()),
            api_key: self.validate_api_key(settings)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_endpoint_uses_configured_base() {
        let settings = Config {
            api_url: Some("https://gw.example.com/".into()),
            api_key: Some("k".into()),
            model: Some("custom-model".into()),
            ..Config::default()
        };
        let cfg = Provider::Gateway.config(&settings).unwrap();
        assert_eq!(cfg.api_url, "https://gw.example.com/v1/chat/completions");
        assert_eq!(cfg.model, "custom-model");
    }

    #[test]
    fn gateway_without_url_is_rejected() {
        let settings = Config {
            api_key: Some("k".into()),
            ..Config::default()
        };
        assert!(matches!(
            Provider::Gateway.config(&settings),
            Err(ProviderError::MissingGatewayUrl)
        ));
    }
}
