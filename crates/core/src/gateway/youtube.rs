use serde_json::Value;
use tracing::error;

use crate::{
    error::PlatformError,
    gateway::{GatewayClient, code_ok, response_code},
    platform::Platform,
};

const PLATFORM: Platform = Platform::Youtube;

#[derive(Debug, Clone, PartialEq)]
pub struct YoutubeVideo {
    pub video_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

fn failed(response: &Value, message: &str) -> PlatformError {
    let err = PlatformError::new(PLATFORM, message);
    match response_code(response) {
        Some(code) => err.with_code(code),
        None => err,
    }
}

pub fn validate_info(response: &Value) -> Result<YoutubeVideo, PlatformError> {
    if !code_ok(response) {
        return Err(failed(response, "Video info API request failed"));
    }
    let data = &response["data"];
    let video_id = data["video_id"]
        .as_str()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| PlatformError::new(PLATFORM, "No video ID found in response"))?;

    let text = |v: &Value| v.as_str().filter(|s| !s.is_empty()).map(str::to_string);
    Ok(YoutubeVideo {
        video_id: video_id.to_string(),
        title: text(&data["title"]),
        description: text(&data["description"]),
        thumbnail: text(&data["thumbnails"][0]["url"]),
    })
}

pub fn validate_streams(response: &Value) -> Result<(), PlatformError> {
    if !code_ok(response) {
        return Err(failed(response, "Video stream API request failed"));
    }
    match response["data"].as_array() {
        Some(streams) if !streams.is_empty() => Ok(()),
        _ => Err(PlatformError::new(PLATFORM, "No video streams found in response")),
    }
}

/// Look up the video and confirm it has streams. The watch URL itself is what
/// gets played.
pub async fn fetch_video(gateway: &GatewayClient, id: &str) -> Result<YoutubeVideo, PlatformError> {
    if id.is_empty() {
        return Err(PlatformError::new(PLATFORM, "Missing video ID"));
    }

    let result: Result<YoutubeVideo, PlatformError> = async {
        let info = gateway
            .get("tools/youtube/web/get_video_info", &[("video_id", id)])
            .await
            .map_err(|e| e.into_platform(PLATFORM))?;
        let video = validate_info(&info)?;

        let streams = gateway
            .get(
                "tools/youtube/web/get_video_stream",
                &[("video_id", video.video_id.as_str())],
            )
            .await
            .map_err(|e| e.into_platform(PLATFORM))?;
        validate_streams(&streams)?;
        Ok(video)
    }
    .await;

    if let Err(e) = &result {
        error!(id, error = %e.message, "YouTube video URL retrieval failed");
    }
    result
}

pub fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={id}")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn info_validation() {
        let ok = json!({
            "code": 200,
            "data": {"video_id": "abc", "title": "Hi", "thumbnails": [{"url": "https://t/1.jpg"}]}
        });
        let video = validate_info(&ok).unwrap();
        assert_eq!(video.video_id, "abc");
        assert_eq!(video.thumbnail.as_deref(), Some("https://t/1.jpg"));
        assert_eq!(video.description, None);

        let bad = json!({"code": 500, "data": {}});
        assert_eq!(validate_info(&bad).unwrap_err().code, Some(500));

        let no_id = json!({"code": 0, "data": {"video_id": ""}});
        assert!(validate_info(&no_id).is_err());
    }

    #[test]
    fn stream_validation() {
        assert!(validate_streams(&json!({"code": 0, "data": [{"url": "x"}]})).is_ok());
        assert!(validate_streams(&json!({"code": 0, "data": []})).is_err());
        assert!(validate_streams(&json!({"code": 403})).is_err());
    }
}
