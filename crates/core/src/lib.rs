pub mod article;
pub mod cache;
pub mod chat;
pub mod chunking;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod gateway;
pub mod llm;
pub mod media;
pub mod platform;
pub mod prompts;
pub mod provider;
pub mod queues;
pub mod resolver;
pub mod routes;
pub mod session;
pub mod stop;
pub mod summary;
pub mod translation;
pub mod types;
pub mod workers;

pub use article::{ArticlePipeline, ArticleProgress, ArticleRequest, ArticleStage};
pub use config::{Config, Translator};
pub use error::{PlatformError, Result, VideosumError};
pub use format::{SubtitleFormat, format_subtitles, format_timestamp};
pub use gateway::{GatewayClient, transcript::Transcript};
pub use llm::{CompletionClient, CompletionRequest, DeltaSink, OpenAiCompatClient};
pub use platform::Platform;
pub use provider::{Provider, ProviderConfig};
pub use resolver::Resolver;
pub use session::{Session, SessionStore};
pub use stop::StopHandle;
pub use translation::{TranslationBackend, TranslationProgress, translate_subtitles};
pub use types::{
    Article, ArticleType, AudioType, Background, ChatMessage, MediaKind, Sender, Subtitle,
    VideoInfo,
};
