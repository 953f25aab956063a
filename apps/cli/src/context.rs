use std::sync::Arc;

use videosum_core::{
    CompletionClient, Config, OpenAiCompatClient, Provider, Resolver, SessionStore, StopHandle,
    TranslationBackend, Translator,
};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("No completion endpoint configured for {provider}")]
    NoCompletionClient { provider: &'static str },

    #[error("Pipeline stopped before finishing")]
    Interrupted,
}

/// Shared by every worker of one run.
pub struct AppContext {
    pub config: Config,
    pub resolver: Resolver,
    pub store: SessionStore,
    pub stop: StopHandle,
    client: Option<Arc<dyn CompletionClient>>,
}

impl AppContext {
    pub fn new(config: Config, store: SessionStore) -> Self {
        Self {
            resolver: Resolver::from_config(&config),
            config,
            store,
            stop: StopHandle::new(),
            client: None,
        }
    }

    /// Build the completion client for the configured provider. Fails early
    /// when its endpoint or key is missing.
    pub fn with_completion(mut self) -> anyhow::Result<Self> {
        let provider_config = self.config.provider.config(&self.config)?;
        self.client = Some(Arc::new(OpenAiCompatClient::new(provider_config)?));
        Ok(self)
    }

    pub fn provider(&self) -> Provider {
        self.config.provider
    }

    pub fn completion(&self) -> Result<Arc<dyn CompletionClient>, CliError> {
        self.client.clone().ok_or(CliError::NoCompletionClient {
            provider: self.config.provider.name(),
        })
    }

    pub fn translation_backend(&self) -> Result<TranslationBackend, CliError> {
        Ok(match self.config.translator {
            Translator::Deepl => TranslationBackend::Deepl(self.resolver.gateway().clone()),
            Translator::Llm => TranslationBackend::Llm(self.completion()?),
        })
    }
}
