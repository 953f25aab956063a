//! Sessions and the JSON-file session store.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    error::{Result, VideosumError},
    gateway::transcript::Transcript,
    types::{
        Article, ArticleType, Background, ChatMessage, MediaKind, Subtitle, VideoInfo, now_millis,
    },
};

/// Everything generated for one submitted URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub original_video_url: String,
    pub real_video_url: Option<String>,
    pub title: String,
    pub poster: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub media_kind: MediaKind,
    pub language: String,
    pub original_subtitles: Vec<Subtitle>,
    #[serde(default)]
    pub translated_subtitles: BTreeMap<String, Vec<Subtitle>>,
    #[serde(default)]
    pub brief: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub background: Option<Background>,
    #[serde(default)]
    pub custom_article_prompt: Option<String>,
    #[serde(default)]
    pub chat_messages: Vec<ChatMessage>,
    #[serde(default)]
    pub articles: BTreeMap<ArticleType, Article>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Session {
    /// A fresh session for a resolved submission. `info` is `None` for audio.
    pub fn from_submission(
        url: &str,
        media_kind: MediaKind,
        info: Option<VideoInfo>,
        transcript: Transcript,
        language: &str,
    ) -> Self {
        let now = now_millis();
        let id = transcript
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let (title, poster, description, real_video_url) = match info {
            Some(info) => (
                Some(info.title).filter(|t| !t.is_empty()).or(transcript.title),
                info.cover.or(transcript.cover),
                info.description,
                Some(info.video_url),
            ),
            None => (Some(audio_title(url)), transcript.cover, None, Some(url.to_string())),
        };

        Self {
            id,
            original_video_url: url.to_string(),
            real_video_url,
            title: title.unwrap_or_else(|| url.to_string()),
            poster,
            description,
            media_kind,
            language: language.to_string(),
            original_subtitles: transcript.subtitles,
            translated_subtitles: BTreeMap::new(),
            brief: None,
            detail: None,
            background: None,
            custom_article_prompt: None,
            chat_messages: Vec::new(),
            articles: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at);
    }

    /// The translation for the session language, falling back to the originals.
    pub fn current_subtitles(&self) -> &[Subtitle] {
        match self.translated_subtitles.get(&self.language) {
            Some(translated) if !translated.is_empty() => translated,
            _ => &self.original_subtitles,
        }
    }

    pub fn set_translation(&mut self, language: &str, subtitles: Vec<Subtitle>) {
        self.translated_subtitles.insert(language.to_string(), subtitles);
        self.touch();
    }

    pub fn set_article(&mut self, ty: ArticleType, article: Article) {
        self.articles.insert(ty, article);
        self.touch();
    }
}

/// Last path segment of an audio URL.
fn audio_title(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|segment| !segment.is_empty())
        .unwrap_or_else(|| "Audio File".to_string())
}

/// One JSON file per session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data_dir>/videosum/sessions`
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("videosum")
            .join("sessions")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file a session id maps to. Ids are percent-encoded, so distinct
    /// ids never share a file.
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(id)))
    }

    /// Insert or replace. Written to a temp file and renamed into place.
    /// Returns the session's file.
    pub async fn save(&self, session: &Session) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(&session.id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(session)?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(id = %session.id, path = %path.display(), "session saved");
        Ok(path)
    }

    pub async fn get(&self, id: &str) -> Result<Session> {
        let path = self.path_for(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VideosumError::SessionNotFound { id: id.to_string() });
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Continue the stored session with `fresh`'s id, taking the new media
    /// URL, subtitles and language and keeping everything generated so far.
    /// With nothing stored under that id, `fresh` itself is the session.
    pub async fn resume(&self, fresh: Session) -> Result<Session> {
        match self.get(&fresh.id).await {
            Ok(mut stored) => {
                debug!(id = %stored.id, "continuing stored session");
                stored.real_video_url = fresh.real_video_url;
                stored.original_subtitles = fresh.original_subtitles;
                stored.language = fresh.language;
                stored.touch();
                Ok(stored)
            }
            Err(VideosumError::SessionNotFound { .. }) => Ok(fresh),
            Err(e) => Err(e),
        }
    }

    /// Every readable session, most recently updated first.
    pub async fn list(&self) -> Result<Vec<Session>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut sessions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let parsed = tokio::fs::read(&path)
                .await
                .map_err(VideosumError::from)
                .and_then(|bytes| Ok(serde_json::from_slice::<Session>(&bytes)?));
            match parsed {
                Ok(session) => sessions.push(session),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable session"),
            }
        }

        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(VideosumError::SessionNotFound { id: id.to_string() })
            }
            Err(e) => Err(e.into()),
        }
    }
}
