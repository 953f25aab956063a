//! Media URL probing and media-proxy URL handling.

use std::time::Duration;

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, RANGE};
use tracing::{error, warn};

use crate::types::AudioType;

const VIDEO_CONTENT_TYPES: &[&str] = &[
    "video/",
    "url-media",
    "application/octet-stream",
    "application/x-mpegurl",
    "application/vnd.apple.mpegurl",
];

pub fn is_video_content_type(content_type: &str) -> bool {
    let content_type = content_type.to_lowercase();
    VIDEO_CONTENT_TYPES
        .iter()
        .any(|prefix| content_type.starts_with(prefix))
}

/// `{proxy}?url=<encoded>`, or the URL unchanged when no proxy is configured.
pub fn proxy_url(proxy: Option<&str>, url: &str) -> String {
    match proxy {
        Some(proxy) => format!("{proxy}?url={}", urlencoding::encode(url)),
        None => url.to_string(),
    }
}

/// Recover the wrapped URL from a media-proxy URL.
pub fn unwrap_proxy_url(proxy: Option<&str>, url: &str) -> String {
    let Some(proxy) = proxy else {
        return url.to_string();
    };
    let Some(query) = url.strip_prefix(proxy).and_then(|rest| rest.strip_prefix("?")) else {
        return url.to_string();
    };
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("url="))
        .and_then(|encoded| urlencoding::decode(encoded).ok())
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|| url.to_string())
}

#[derive(Clone)]
pub struct MediaProbe {
    http: reqwest::Client,
    proxy: Option<String>,
}

impl MediaProbe {
    pub fn new(http: reqwest::Client, proxy: Option<String>) -> Self {
        Self { http, proxy }
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// HEAD first, then a one-byte ranged GET for servers that refuse HEAD.
    async fn head_or_range(&self, url: &str) -> Option<reqwest::Response> {
        let timeout = Duration::from_secs(10);
        let head = self.http.head(url).timeout(timeout).send().await;
        let response = match head {
            Ok(r) if r.status().is_success() => r,
            _ => self
                .http
                .get(url)
                .header(RANGE, "bytes=0-0")
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| error!(url, error = %e, "media check failed"))
                .ok()?,
        };

        if !response.status().is_success() {
            warn!(url, status = %response.status(), "URL check failed");
            return None;
        }
        Some(response)
    }

    /// The audio type behind `url`, or `None` if it is not a usable audio file.
    pub async fn probe_audio(&self, url: &str) -> Option<AudioType> {
        let response = self.head_or_range(url).await?;
        let content_type = header(&response, CONTENT_TYPE.as_str())?;
        let Some(audio) = AudioType::from_content_type(&content_type) else {
            warn!(url, %content_type, "unsupported content type");
            return None;
        };
        if has_zero_length(&response) {
            warn!(url, "empty content length");
            return None;
        }
        Some(audio)
    }

    pub async fn is_video_url_usable(&self, url: &str) -> bool {
        if url.contains("youtube.com") || url.contains("youtu.be") {
            return true;
        }
        let unwrapped = unwrap_proxy_url(self.proxy(), url);
        let url = unwrapped.as_str();

        if self.probe_audio(url).await.is_some() {
            return true;
        }

        let Some(response) = self.head_or_range(url).await else {
            return false;
        };
        let content_type = header(&response, CONTENT_TYPE.as_str()).unwrap_or_default();
        if !is_video_content_type(&content_type) {
            warn!(url, %content_type, "invalid content type");
            return false;
        }
        if has_zero_length(&response) {
            warn!(url, "empty content length");
            return false;
        }
        true
    }
}

fn header(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn has_zero_length(response: &reqwest::Response) -> bool {
    header(response, CONTENT_LENGTH.as_str())
        .and_then(|len| len.trim().parse::<u64>().ok())
        == Some(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_content_types() {
        assert!(is_video_content_type("video/mp4"));
        assert!(is_video_content_type("Application/vnd.apple.mpegurl"));
        assert!(is_video_content_type("application/octet-stream"));
        assert!(!is_video_content_type("text/html; charset=utf-8"));
    }

    #[test]
    fn proxy_round_trip() {
        let proxy = Some("https://proxy.example.com/media");
        let raw = "https://cdn.example.com/v.mp4?sig=a&b=1";
        let wrapped = proxy_url(proxy, raw);
        assert_eq!(
            wrapped,
            "https://proxy.example.com/media?url=https%3A%2F%2Fcdn.example.com%2Fv.mp4%3Fsig%3Da%26b%3D1"
        );
        assert_eq!(unwrap_proxy_url(proxy, &wrapped), raw);
    }

    #[test]
    fn no_proxy_leaves_urls_alone() {
        assert_eq!(proxy_url(None, "https://a/b"), "https://a/b");
        assert_eq!(unwrap_proxy_url(None, "https://a/b"), "https://a/b");
        assert_eq!(
            unwrap_proxy_url(Some("https://proxy"), "https://other/x?url=y"),
            "https://other/x?url=y"
        );
    }
}
