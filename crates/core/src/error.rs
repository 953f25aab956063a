use std::{fmt, path::PathBuf};

use thiserror::Error;

use crate::provider::ProviderError;

/// Failure talking to one of the platform gateways.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Failed to get video URL from {platform}: {message}")]
pub struct PlatformError {
    pub platform: String,
    pub message: String,
    pub code: Option<i64>,
}

impl PlatformError {
    pub fn new(platform: impl fmt::Display, message: impl Into<String>) -> Self {
        Self {
            platform: platform.to_string(),
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }
}

#[derive(Error, Debug)]
pub enum VideosumError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("Unsupported platform for {url}")]
    UnsupportedPlatform { url: String },

    #[error("Transcript request failed for {url}: {reason}")]
    TranscriptFailed { url: String, reason: String },

    #[error("Subtitle #{index} ends before it starts ({start} > {end})")]
    InvalidSubtitle { index: usize, start: f64, end: f64 },

    #[error("No subtitles available")]
    NoSubtitles,

    #[error("Completion request failed: {reason}")]
    Completion { reason: String },

    #[error("Completion for {stage} returned no content")]
    EmptyCompletion { stage: &'static str },

    #[error("Translation failed: {reason}")]
    Translation { reason: String },

    #[error("Generation stopped")]
    Cancelled,

    #[error("Session {id} not found")]
    SessionNotFound { id: String },

    #[error("Invalid config at {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, VideosumError>;
