use std::{
    fmt,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::platform::Platform;

/// One subtitle line. Times are seconds from the start of the media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtitle {
    pub index: usize,
    #[serde(alias = "startTime")]
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_id: Option<u32>,
}

impl Subtitle {
    pub fn new(index: usize, start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            index,
            start,
            end,
            text: text.into(),
            speaker_id: None,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }
}

/// Join subtitle texts one per line, the shape every prompt expects.
pub fn subtitle_lines(subtitles: &[Subtitle]) -> String {
    subtitles
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioType {
    #[serde(rename = "audio/mpeg")]
    Mpeg,
    #[serde(rename = "audio/ogg")]
    Ogg,
    #[serde(rename = "audio/3gp")]
    ThreeGp,
    #[serde(rename = "audio/mp4")]
    Mp4,
    #[serde(rename = "audio/webm")]
    Webm,
    #[serde(rename = "audio/flac")]
    Flac,
    #[serde(rename = "audio/wav")]
    Wav,
    #[serde(rename = "audio/aac")]
    Aac,
    #[serde(rename = "audio/m4a")]
    M4a,
    #[serde(rename = "audio/opus")]
    Opus,
}

impl AudioType {
    const CONTENT_TYPES: &'static [(&'static str, AudioType)] = &[
        ("audio/mpeg", AudioType::Mpeg),
        ("audio/ogg", AudioType::Ogg),
        ("audio/3gp", AudioType::ThreeGp),
        ("audio/mp4", AudioType::Mp4),
        ("audio/webm", AudioType::Webm),
        ("audio/flac", AudioType::Flac),
        ("audio/wav", AudioType::Wav),
        ("audio/x-wav", AudioType::Wav),
        ("audio/wave", AudioType::Wav),
        ("audio/x-pn-wav", AudioType::Wav),
        ("audio/aac", AudioType::Aac),
        ("audio/m4a", AudioType::M4a),
        ("audio/x-m4a", AudioType::M4a),
        ("audio/opus", AudioType::Opus),
    ];

    /// Map a `Content-Type` header value to a supported audio type.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let content_type = content_type.trim().to_lowercase();
        Self::CONTENT_TYPES
            .iter()
            .find(|(prefix, _)| content_type.starts_with(prefix))
            .map(|(_, ty)| *ty)
    }

    pub fn mime(&self) -> &'static str {
        match self {
            AudioType::Mpeg => "audio/mpeg",
            AudioType::Ogg => "audio/ogg",
            AudioType::ThreeGp => "audio/3gp",
            AudioType::Mp4 => "audio/mp4",
            AudioType::Webm => "audio/webm",
            AudioType::Flac => "audio/flac",
            AudioType::Wav => "audio/wav",
            AudioType::Aac => "audio/aac",
            AudioType::M4a => "audio/m4a",
            AudioType::Opus => "audio/opus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Video(Platform),
    Audio(AudioType),
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video(platform) => write!(f, "{platform}"),
            MediaKind::Audio(audio) => f.write_str(audio.mime()),
        }
    }
}

/// What a platform lookup yields for one submitted URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub video_url: String,
    pub audio_url: Option<String>,
    pub title: String,
    pub platform: Platform,
    pub description: Option<String>,
    pub cover: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleType {
    List,
    Regular,
    Timeline,
    Brief,
    Summary,
    Tutorial,
    Press,
    Podcast,
    Quotes,
    Xhs,
    Custom,
}

impl ArticleType {
    pub const ALL: [ArticleType; 11] = [
        ArticleType::List,
        ArticleType::Regular,
        ArticleType::Timeline,
        ArticleType::Brief,
        ArticleType::Summary,
        ArticleType::Tutorial,
        ArticleType::Press,
        ArticleType::Podcast,
        ArticleType::Quotes,
        ArticleType::Xhs,
        ArticleType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleType::List => "list",
            ArticleType::Regular => "regular",
            ArticleType::Timeline => "timeline",
            ArticleType::Brief => "brief",
            ArticleType::Summary => "summary",
            ArticleType::Tutorial => "tutorial",
            ArticleType::Press => "press",
            ArticleType::Podcast => "podcast",
            ArticleType::Quotes => "quotes",
            ArticleType::Xhs => "xhs",
            ArticleType::Custom => "custom",
        }
    }
}

impl fmt::Display for ArticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArticleType::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown article type: {s}"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleChunk {
    pub content: String,
    pub time_range: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub chunks: std::collections::BTreeMap<usize, ArticleChunk>,
    pub merged_content: String,
}

/// The generated content a chat is grounded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Background {
    DetailSummary,
    Article(ArticleType),
}

impl From<Background> for String {
    fn from(value: Background) -> Self {
        match value {
            Background::DetailSummary => "detailSummary".to_string(),
            Background::Article(ty) => ty.as_str().to_string(),
        }
    }
}

impl TryFrom<String> for Background {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Background {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "detailSummary" | "detail" => Ok(Background::DetailSummary),
            other => other.parse::<ArticleType>().map(Background::Article),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub content: String,
    pub timestamp: u64,
}

impl ChatMessage {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            content: content.into(),
            timestamp: now_millis(),
        }
    }
}

/// Milliseconds since the unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtitle_accepts_gateway_field_names() {
        let json = r#"{"index": 3, "startTime": 1.5, "end": 4.0, "text": "hi", "speaker_id": 2}"#;
        let sub: Subtitle = serde_json::from_str(json).unwrap();
        assert_eq!(sub.start, 1.5);
        assert_eq!(sub.speaker_id, Some(2));
        assert!(sub.is_well_formed());
    }

    #[test]
    fn audio_type_maps_aliases() {
        assert_eq!(AudioType::from_content_type("audio/x-wav"), Some(AudioType::Wav));
        assert_eq!(
            AudioType::from_content_type("Audio/MPEG; charset=binary"),
            Some(AudioType::Mpeg)
        );
        assert_eq!(AudioType::from_content_type("video/mp4"), None);
    }

    #[test]
    fn background_round_trips_through_strings() {
        let bg: Background = serde_json::from_str("\"detailSummary\"").unwrap();
        assert_eq!(bg, Background::DetailSummary);
        let bg: Background = serde_json::from_str("\"podcast\"").unwrap();
        assert_eq!(bg, Background::Article(ArticleType::Podcast));
        assert_eq!(serde_json::to_string(&bg).unwrap(), "\"podcast\"");
        assert!(serde_json::from_str::<Background>("\"nonsense\"").is_err());
    }
}
