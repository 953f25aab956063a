use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

static BILIBILI_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"BV\w+").expect("valid regex"));
static XHS_NOTE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"items/(\w+)").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Bilibili,
    Youtube,
    Xiaohongshu,
    Douyin,
    Tiktok,
}

impl Platform {
    /// Detect the platform from the URL host. First match wins.
    pub fn detect(url: &str) -> Option<Self> {
        if url.contains("douyin.com") {
            Some(Platform::Douyin)
        } else if url.contains("tiktok.com") {
            Some(Platform::Tiktok)
        } else if url.contains("youtube.com") || url.contains("youtu.be") {
            Some(Platform::Youtube)
        } else if url.contains("bilibili.com") {
            Some(Platform::Bilibili)
        } else if url.contains("xiaohongshu.com") {
            Some(Platform::Xiaohongshu)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Bilibili => "bilibili",
            Platform::Youtube => "youtube",
            Platform::Xiaohongshu => "xiaohongshu",
            Platform::Douyin => "douyin",
            Platform::Tiktok => "tiktok",
        }
    }

    /// Media from these platforms is played directly, everything else goes
    /// through the media proxy.
    pub fn needs_proxy(&self) -> bool {
        !matches!(self, Platform::Bilibili | Platform::Youtube)
    }

    /// The identifier the platform gateway expects for this URL.
    pub fn extract_id(&self, url: &str) -> Result<String, PlatformError> {
        match self {
            Platform::Bilibili => BILIBILI_ID
                .find(url)
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| PlatformError::new(self, "Invalid Bilibili URL")),
            Platform::Youtube => {
                youtube_id(url).ok_or_else(|| PlatformError::new(self, "Invalid YouTube URL"))
            }
            Platform::Xiaohongshu => XHS_NOTE_ID
                .captures(url)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| PlatformError::new(self, "Invalid Xiaohongshu URL")),
            Platform::Douyin | Platform::Tiktok => Ok(url.to_string()),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn youtube_id(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    if parsed.host_str().is_some_and(|h| h.ends_with("youtu.be")) {
        return parsed
            .path_segments()?
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }
    parsed
        .query_pairs()
        .find(|(k, _)| k == "v")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}
