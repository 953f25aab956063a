use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Result, VideosumError},
    provider::Provider,
};

pub const DEFAULT_CHUNK_DURATION_SECS: f64 = 300.0;

/// Which backend translates subtitles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Translator {
    #[default]
    Llm,
    Deepl,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub provider: Provider,
    /// Base URL of the scraping gateway.
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub bilibili_api_url: Option<String>,
    pub model: Option<String>,
    /// Prefix wrapping third-party media URLs, e.g. `https://proxy.example.com/media`.
    pub media_proxy: Option<String>,
    pub language: String,
    pub chunk_duration_secs: f64,
    pub translator: Translator,
    pub generate_xhs_image: bool,
    /// Append every persistable pipeline event to `events.jsonl` in the cache dir.
    pub journal: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_url: None,
            api_key: None,
            bilibili_api_url: None,
            model: None,
            media_proxy: None,
            language: "en".to_string(),
            chunk_duration_secs: DEFAULT_CHUNK_DURATION_SECS,
            translator: Translator::default(),
            generate_xhs_image: true,
            journal: false,
        }
    }
}

impl Config {
    /// Load config from `<config_dir>/videosum/config.toml` if it exists, then
    /// apply `VIDEOSUM_*` environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&config_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file found at {}", path.display());
            return Ok(Config::default());
        }
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| VideosumError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("VIDEOSUM_API_URL") {
            self.api_url = Some(v);
        }
        if let Some(v) = get("VIDEOSUM_API_KEY") {
            self.api_key = Some(v);
        }
        if let Some(v) = get("VIDEOSUM_BILIBILI_API_URL") {
            self.bilibili_api_url = Some(v);
        }
        if let Some(v) = get("VIDEOSUM_MODEL") {
            self.model = Some(v);
        }
        if let Some(v) = get("VIDEOSUM_MEDIA_PROXY") {
            self.media_proxy = Some(v);
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("videosum")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
provider = "openai"
api_url = "https://gw.example.com"
bilibili_api_url = "https://bili.example.com"
language = "zh-CN"
chunk_duration_secs = 120.0
translator = "deepl"
generate_xhs_image = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider, Provider::Openai);
        assert_eq!(config.api_url.as_deref(), Some("https://gw.example.com"));
        assert_eq!(config.language, "zh-CN");
        assert_eq!(config.chunk_duration_secs, 120.0);
        assert_eq!(config.translator, Translator::Deepl);
        assert!(!config.generate_xhs_image);
    }

    #[test]
    fn parse_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.chunk_duration_secs, DEFAULT_CHUNK_DURATION_SECS);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config {
            api_url: Some("https://file.example.com".into()),
            ..Config::default()
        };
        config.apply_env(|key| match key {
            "VIDEOSUM_API_URL" => Some("https://env.example.com".into()),
            "VIDEOSUM_MODEL" => Some("   ".into()),
            _ => None,
        });
        assert_eq!(config.api_url.as_deref(), Some("https://env.example.com"));
        assert!(config.model.is_none());
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "chunk_duration_secs = \"long\"").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, VideosumError::Config { .. }));
    }
}
