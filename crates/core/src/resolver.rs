use std::time::Duration;

use tracing::{error, info, warn};

use crate::{
    config::Config,
    error::{PlatformError, Result, VideosumError},
    gateway::{GatewayClient, aweme, bilibili, xiaohongshu, youtube},
    media::{MediaProbe, proxy_url},
    platform::Platform,
    session::Session,
    types::{MediaKind, VideoInfo},
};

const REFRESH_ATTEMPTS: u32 = 3;

/// Turns submitted URLs into playable media.
#[derive(Clone)]
pub struct Resolver {
    gateway: GatewayClient,
    probe: MediaProbe,
    refresh_delay: Duration,
}

impl Resolver {
    pub fn new(gateway: GatewayClient, probe: MediaProbe) -> Self {
        Self {
            gateway,
            probe,
            refresh_delay: Duration::from_secs(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let gateway = GatewayClient::new(config);
        let probe = MediaProbe::new(gateway.http().clone(), config.media_proxy.clone());
        Self::new(gateway, probe)
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn gateway(&self) -> &GatewayClient {
        &self.gateway
    }

    pub fn probe(&self) -> &MediaProbe {
        &self.probe
    }

    fn wrap(&self, platform: Platform, url: &str) -> String {
        if platform.needs_proxy() {
            proxy_url(self.probe.proxy(), url)
        } else {
            url.to_string()
        }
    }

    /// Known platform hosts are videos. Anything else must answer as audio.
    pub async fn detect_media(&self, url: &str) -> Result<MediaKind> {
        if let Some(platform) = Platform::detect(url) {
            return Ok(MediaKind::Video(platform));
        }
        match self.probe.probe_audio(url).await {
            Some(audio) => Ok(MediaKind::Audio(audio)),
            None => Err(VideosumError::UnsupportedPlatform {
                url: url.to_string(),
            }),
        }
    }

    pub async fn resolve_video_info(&self, url: &str) -> Result<VideoInfo> {
        let platform = Platform::detect(url).ok_or_else(|| VideosumError::UnsupportedPlatform {
            url: url.to_string(),
        })?;
        let id = platform.extract_id(url)?;

        let info = match platform {
            Platform::Bilibili => {
                let (video_url, details) = tokio::try_join!(
                    bilibili::fetch_play_url(&self.gateway, &id),
                    bilibili::fetch_info(&self.gateway, &id)
                )?;
                VideoInfo {
                    video_url: validated_url(platform, Some(&video_url))?,
                    audio_url: None,
                    title: details.title,
                    platform,
                    description: details.description,
                    cover: details.cover.map(|c| proxy_url(self.probe.proxy(), &c)),
                }
            }
            Platform::Youtube => {
                let video = youtube::fetch_video(&self.gateway, &id).await?;
                VideoInfo {
                    video_url: url.to_string(),
                    audio_url: None,
                    title: video.title.unwrap_or_else(|| id.clone()),
                    platform,
                    description: video.description,
                    cover: video.thumbnail,
                }
            }
            Platform::Xiaohongshu => {
                let note = xiaohongshu::fetch_note(&self.gateway, &id).await?;
                let video_url = validated_url(platform, Some(&note.video_url))?;
                VideoInfo {
                    video_url: self.wrap(platform, &video_url),
                    audio_url: None,
                    title: note.title.unwrap_or_else(|| id.clone()),
                    platform,
                    description: note.description,
                    cover: note.thumbnail,
                }
            }
            Platform::Douyin | Platform::Tiktok => {
                let video = if platform == Platform::Douyin {
                    aweme::fetch_douyin(&self.gateway, &id).await?
                } else {
                    aweme::fetch_tiktok(&self.gateway, &id).await?
                };
                let video_url = validated_url(platform, Some(&video.play_url))?;
                VideoInfo {
                    video_url: self.wrap(platform, &video_url),
                    audio_url: video.audio_url.map(|a| self.wrap(platform, &a)),
                    title: video.title.unwrap_or_else(|| url.to_string()),
                    platform,
                    description: video.description,
                    cover: None,
                }
            }
        };

        info!(%platform, title = %info.title, "video info resolved");
        Ok(info)
    }

    /// A fresh playable URL for an id (or share URL for Douyin and TikTok).
    pub async fn real_url_for(
        &self,
        platform: Platform,
        id_or_url: &str,
    ) -> std::result::Result<String, PlatformError> {
        let url = match platform {
            Platform::Bilibili => bilibili::fetch_play_url(&self.gateway, id_or_url).await?,
            Platform::Youtube => {
                youtube::fetch_video(&self.gateway, id_or_url).await?;
                return Ok(youtube::watch_url(id_or_url));
            }
            Platform::Xiaohongshu => xiaohongshu::fetch_note(&self.gateway, id_or_url).await?.video_url,
            Platform::Douyin => aweme::fetch_douyin(&self.gateway, id_or_url).await?.play_url,
            Platform::Tiktok => aweme::fetch_tiktok(&self.gateway, id_or_url).await?.play_url,
        };
        let url = validated_url(platform, Some(&url))?;
        Ok(self.wrap(platform, &url))
    }

    /// Check the stored playable URL and look up a new one when it has gone
    /// stale. `Ok(None)` means the current URL is fine.
    pub async fn refresh_playable_url(
        &self,
        media: MediaKind,
        original_url: &str,
        current_url: Option<&str>,
    ) -> Result<Option<String>> {
        let url = current_url.filter(|u| !u.is_empty()).unwrap_or(original_url);
        if url.contains("youtube.com") || media == MediaKind::Video(Platform::Youtube) {
            return Ok(None);
        }
        if self.probe.is_video_url_usable(url).await {
            return Ok(None);
        }

        let MediaKind::Video(platform) = media else {
            return Err(VideosumError::UnsupportedPlatform {
                url: original_url.to_string(),
            });
        };
        let id_or_url = match platform {
            Platform::Douyin | Platform::Tiktok => original_url.to_string(),
            _ => platform.extract_id(original_url)?,
        };

        let mut last_error = None;
        for attempt in 1..=REFRESH_ATTEMPTS {
            match self.real_url_for(platform, &id_or_url).await {
                Ok(url) if self.probe.is_video_url_usable(&url).await => {
                    info!(attempt, "playable URL refreshed");
                    return Ok(Some(url));
                }
                Ok(url) => warn!(attempt, %url, "refreshed URL is not usable"),
                Err(e) => {
                    error!(attempt, error = %e, "refresh attempt failed");
                    last_error = Some(e);
                }
            }
            if attempt < REFRESH_ATTEMPTS {
                tokio::time::sleep(self.refresh_delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| PlatformError::new(platform, "No usable video URL found"))
            .into())
    }

    /// Refresh a session's playable URL in place. Returns whether it changed.
    pub async fn refresh_session(&self, session: &mut Session) -> Result<bool> {
        let refreshed = self
            .refresh_playable_url(
                session.media_kind,
                &session.original_video_url,
                session.real_video_url.as_deref(),
            )
            .await?;
        match refreshed {
            Some(url) => {
                session.real_video_url = Some(url);
                session.touch();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn validated_url(
    platform: Platform,
    url: Option<&str>,
) -> std::result::Result<String, PlatformError> {
    let url = url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| PlatformError::new(platform, "URL is empty or undefined"))?;
    reqwest::Url::parse(url).map_err(|_| PlatformError::new(platform, "Invalid URL format"))?;
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_validation() {
        assert!(validated_url(Platform::Douyin, Some("https://v/1.mp4")).is_ok());
        assert_eq!(
            validated_url(Platform::Douyin, Some("not a url")).unwrap_err().message,
            "Invalid URL format"
        );
        assert_eq!(
            validated_url(Platform::Douyin, None).unwrap_err().message,
            "URL is empty or undefined"
        );
    }

    #[tokio::test]
    async fn youtube_never_needs_a_refresh() {
        let resolver = Resolver::from_config(&Config::default());
        let refreshed = resolver
            .refresh_playable_url(
                MediaKind::Video(Platform::Youtube),
                "https://www.youtube.com/watch?v=abc",
                None,
            )
            .await
            .unwrap();
        assert_eq!(refreshed, None);
    }

    #[tokio::test]
    async fn unknown_hosts_without_audio_are_unsupported() {
        let resolver = Resolver::from_config(&Config::default());
        assert!(matches!(
            resolver.resolve_video_info("https://vimeo.com/1").await,
            Err(VideosumError::UnsupportedPlatform { .. })
        ));
    }
}
